//! Configuration loading for varminer.
//!
//! The file is `--config`, else `VARMINER_CONFIG`, else `./varminer.toml`.
//! A missing default file means built-in defaults; a file that was asked for
//! explicitly must exist. `VARMINER_DB` and `VARMINER_WORKERS` override the
//! file, and command-line flags override everything.

use std::path::{Path, PathBuf};
use varminer_common::{ImportConfig, VarminerError};

pub const CONFIG_ENV: &str = "VARMINER_CONFIG";
pub const DB_ENV: &str = "VARMINER_DB";
pub const WORKERS_ENV: &str = "VARMINER_WORKERS";
pub const DEFAULT_CONFIG_FILE: &str = "varminer.toml";

/// Settings given on the command line.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub config: Option<PathBuf>,
    pub db: Option<PathBuf>,
    pub ontology: Option<PathBuf>,
    pub workers: Option<usize>,
}

/// Where the configuration comes from and whether it has to exist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigSource {
    pub path: PathBuf,
    pub explicit: bool,
}

impl ConfigSource {
    pub fn resolve(cli: Option<&Path>, env: Option<String>) -> Self {
        match (cli, env.filter(|p| !p.is_empty())) {
            (Some(path), _) => Self {
                path: path.to_path_buf(),
                explicit: true,
            },
            (None, Some(path)) => Self {
                path: PathBuf::from(path),
                explicit: true,
            },
            (None, None) => Self {
                path: PathBuf::from(DEFAULT_CONFIG_FILE),
                explicit: false,
            },
        }
    }

    pub fn read(&self) -> varminer_common::Result<ImportConfig> {
        if !self.path.exists() {
            if self.explicit {
                return Err(VarminerError::Config(format!(
                    "Config file not found: {}",
                    self.path.display()
                )));
            }
            return Ok(ImportConfig::default());
        }
        let content = std::fs::read_to_string(&self.path)?;
        ImportConfig::from_toml_str(&content)
    }
}

/// Apply `VARMINER_DB` / `VARMINER_WORKERS` as seen through `lookup`.
pub fn apply_env(
    config: &mut ImportConfig,
    lookup: impl Fn(&str) -> Option<String>,
) -> varminer_common::Result<()> {
    if let Some(db) = lookup(DB_ENV).filter(|v| !v.is_empty()) {
        config.database.path = PathBuf::from(db);
    }
    if let Some(workers) = lookup(WORKERS_ENV).filter(|v| !v.is_empty()) {
        let n = workers.trim().parse::<usize>().map_err(|_| {
            VarminerError::Config(format!("{WORKERS_ENV} must be a positive integer, got {workers:?}"))
        })?;
        config.import.workers = Some(n);
    }
    Ok(())
}

pub fn apply_cli(config: &mut ImportConfig, cli: &CliOverrides) {
    if let Some(db) = &cli.db {
        config.database.path = db.clone();
    }
    if let Some(ontology) = &cli.ontology {
        config.sources.ontology = ontology.clone();
    }
    if let Some(workers) = cli.workers {
        config.import.workers = Some(workers);
    }
}

/// Resolve the full configuration from the process environment and `cli`.
pub fn load(cli: &CliOverrides) -> anyhow::Result<(ImportConfig, ConfigSource)> {
    let env = |key: &str| std::env::var(key).ok();
    let source = ConfigSource::resolve(cli.config.as_deref(), env(CONFIG_ENV));
    let mut config = source.read()?;
    apply_env(&mut config, env)?;
    apply_cli(&mut config, cli);
    Ok((config, source))
}

#[cfg(test)]
mod tests;
