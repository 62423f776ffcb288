//! Command Line Interface (CLI) layer for bibdoi.
//!
//! Argument parsing lives in `args`, the read → parse → resolve → output
//! flow in `runner`.
pub mod args;
pub mod runner;

pub use args::CliArgs;
pub use runner::run;
