//! varminer: ClinVar release importer.
//! Entry point for the command-line binary.
//!
//! Each FILE is imported in order into the configured SQLite database. Files
//! whose names are not `ClinVarFullRelease_YYYY-MM.xml` are skipped; any
//! other failure stops the run with a non-zero exit status.

mod config;

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use varminer_ingestion::{ImportOutcome, ImportPipeline};

/// Import ClinVar full releases, classify conflicting interpretations and
/// resolve conditions against the MONDO ontology.
#[derive(Parser, Debug)]
#[command(name = "varminer")]
#[command(version)]
#[command(about, long_about = None)]
struct Cli {
    /// Configuration file (default: $VARMINER_CONFIG, then ./varminer.toml)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// SQLite database to import into
    #[arg(long, value_name = "PATH")]
    db: Option<PathBuf>,

    /// Ontology document (OWL RDF/XML)
    #[arg(long, value_name = "PATH")]
    ontology: Option<PathBuf>,

    /// Extraction threads; 1 disables parallel extraction
    #[arg(long, value_name = "N")]
    workers: Option<usize>,

    /// Release documents, e.g. ClinVarFullRelease_2019-01.xml
    #[arg(value_name = "FILE", required = true)]
    files: Vec<PathBuf>,
}

impl Cli {
    fn overrides(&self) -> config::CliOverrides {
        config::CliOverrides {
            config: self.config.clone(),
            db: self.db.clone(),
            ontology: self.ontology.clone(),
            workers: self.workers,
        }
    }
}

fn main() -> ExitCode {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("varminer=info,info")),
        )
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(&cli) {
        error!("{e:#}");
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    info!("varminer {}", env!("CARGO_PKG_VERSION"));

    let (config, source) = config::load(&cli.overrides())?;
    info!(
        config = %source.path.display(),
        found = source.path.exists(),
        database = %config.database.path.display(),
        ontology = %config.sources.ontology.display(),
        "Configuration loaded"
    );

    let pipeline = ImportPipeline::from_config(config)?;
    let db = pipeline.open_database()?;

    let total = cli.files.len();
    let mut imported = 0;
    for (i, path) in cli.files.iter().enumerate() {
        info!(file = %path.display(), "[{}/{}]", i + 1, total);
        let outcome = pipeline
            .import_file(&db, path)
            .with_context(|| format!("Import of {} failed", path.display()))?;
        if let ImportOutcome::Imported(_) = outcome {
            imported += 1;
        }
    }

    let stats = db.stats()?;
    info!(
        imported,
        skipped = total - imported,
        submissions = stats.submissions,
        comparisons = stats.comparisons,
        condition_terms = stats.condition_terms,
        releases = stats.dates,
        "Done"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_flags_map_to_overrides() {
        let cli = Cli::try_parse_from([
            "varminer",
            "--db",
            "out.db",
            "--workers",
            "2",
            "ClinVarFullRelease_2019-01.xml",
            "ClinVarFullRelease_2019-02.xml",
        ])
        .unwrap();
        assert_eq!(cli.files.len(), 2);
        let overrides = cli.overrides();
        assert_eq!(overrides.db, Some(PathBuf::from("out.db")));
        assert_eq!(overrides.workers, Some(2));
        assert_eq!(overrides.config, None);
    }

    #[test]
    fn test_files_are_required() {
        assert!(Cli::try_parse_from(["varminer", "--db", "out.db"]).is_err());
    }
}
