use std::process::ExitCode;
use std::time::Duration;

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use bibdoi::{
    BibtexParser, DoiEnricher, EnrichConfig, HttpDoiResolver, ResolverConfig, output,
};

use super::args::CliArgs;

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    // a subscriber may already be installed when running under a test harness
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

pub fn run(args: CliArgs) -> ExitCode {
    init_logging(&args.log_level);

    let mut entries = match BibtexParser::new().parse_file(&args.file_path) {
        Ok(entries) => entries,
        Err(e) => {
            error!("{e}");
            return ExitCode::FAILURE;
        }
    };

    if args.no_doi {
        info!("Skipping DOI lookups");
    } else {
        let config = ResolverConfig {
            timeout: args.timeout.map(Duration::from_secs),
            require_success: args.strict_status,
            ..Default::default()
        };
        let resolver = match HttpDoiResolver::with_config(config) {
            Ok(resolver) => resolver,
            Err(e) => {
                error!("Failed to set up DOI resolver: {e}");
                return ExitCode::FAILURE;
            }
        };
        DoiEnricher::new(resolver)
            .with_config(EnrichConfig {
                run_in_parallel: args.jobs > 1,
                max_workers: args.jobs,
            })
            .enrich(&mut entries);
    }

    info!(
        "{} entries extracted from {}",
        entries.len(),
        args.file_path.display()
    );

    let written = match args.output_path() {
        Some(path) => output::write_json(&entries, path),
        None => output::to_json_string(&entries).map(|json| println!("{json}")),
    };
    if let Err(e) = written {
        error!("Failed to write output: {e}");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::io::Write;
    use tempfile::{Builder, tempdir};

    fn bib_file() -> tempfile::NamedTempFile {
        let mut file = Builder::new().suffix(".bib").tempfile().unwrap();
        write!(file, "@book{{b1, title = {{X}}}}").unwrap();
        file
    }

    fn run_with(extra: &[&str], file: &std::path::Path) -> ExitCode {
        let mut argv = vec!["bibdoi".to_string(), file.display().to_string()];
        argv.extend(extra.iter().map(|s| s.to_string()));
        run(CliArgs::parse_from(argv))
    }

    fn is_failure(code: ExitCode) -> bool {
        format!("{code:?}") == format!("{:?}", ExitCode::FAILURE)
    }

    #[test]
    fn test_run_writes_output_file() {
        let file = bib_file();
        let dir = tempdir().unwrap();
        let out = dir.path().join("out.json");

        let code = run_with(&["--no-doi", "-o", out.to_str().unwrap()], file.path());

        assert!(!is_failure(code));
        assert!(std::fs::read_to_string(&out).unwrap().contains("\"title\": \"X\""));
    }

    #[test]
    fn test_run_reports_unwritable_output() {
        let file = bib_file();
        let dir = tempdir().unwrap();
        let out = dir.path().join("missing").join("out.json");

        let code = run_with(&["--no-doi", "-o", out.to_str().unwrap()], file.path());

        assert!(is_failure(code));
        assert!(!out.exists());
    }

    #[test]
    fn test_run_reports_wrong_extension() {
        let file = Builder::new().suffix(".txt").tempfile().unwrap();
        assert!(is_failure(run_with(&["--no-doi"], file.path())));
    }
}
