use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "bibdoi",
    version,
    about = "Parse a BibTeX file and optionally save the output as JSON"
)]
pub struct CliArgs {
    /// The file path to the .bib file
    pub file_path: PathBuf,

    /// Save the output to parsed_bibtex.json in the working directory instead
    /// of printing it to the console
    #[arg(long, default_value_t = false)]
    pub save: bool,

    /// Save the output to this file (implies --save)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Skip DOI lookups
    #[arg(long, default_value_t = false)]
    pub no_doi: bool,

    /// Treat a non-2xx status at the end of a DOI redirect chain as a failure
    #[arg(long, default_value_t = false)]
    pub strict_status: bool,

    /// Number of concurrent DOI lookups (1 = sequential)
    #[arg(short, long, default_value_t = 1)]
    pub jobs: usize,

    /// Timeout for each DOI lookup, in seconds
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Log level (error, warn, info, debug, trace); RUST_LOG takes precedence
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

impl CliArgs {
    /// Where to save the output, or `None` to print it.
    pub fn output_path(&self) -> Option<PathBuf> {
        match (&self.output, self.save) {
            (Some(path), _) => Some(path.clone()),
            (None, true) => Some(PathBuf::from(bibdoi::output::DEFAULT_OUTPUT_FILE)),
            (None, false) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        CliArgs::command().debug_assert();
    }

    #[test]
    fn test_output_path() {
        let args = CliArgs::parse_from(["bibdoi", "refs.bib"]);
        assert_eq!(args.output_path(), None);
        assert_eq!(args.jobs, 1);

        let args = CliArgs::parse_from(["bibdoi", "refs.bib", "--save"]);
        assert_eq!(args.output_path(), Some(PathBuf::from("parsed_bibtex.json")));

        let args = CliArgs::parse_from(["bibdoi", "refs.bib", "-o", "out.json"]);
        assert_eq!(args.output_path(), Some(PathBuf::from("out.json")));
    }
}
