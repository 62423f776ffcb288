//! bibdoi CLI entrypoint.
//!
//! Thin wrapper over the `cli` module: parse args, run the pipeline and exit
//! with the resulting status. For programmatic use, prefer the library API.

use clap::Parser;
use std::process::ExitCode;

mod cli;

fn main() -> ExitCode {
    let args = cli::CliArgs::parse();
    cli::run(args)
}
