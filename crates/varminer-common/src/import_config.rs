//! Import configuration.
//!
//! Every section is optional in `varminer.toml`; an empty file yields the
//! same configuration as running without one.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Complete import configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImportConfig {
    /// Local relational store
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Auxiliary lookup inputs
    #[serde(default)]
    pub sources: SourcesConfig,

    /// Execution options
    #[serde(default)]
    pub import: ImportOptions,
}

impl ImportConfig {
    pub fn from_toml_str(content: &str) -> crate::Result<Self> {
        Ok(toml::from_str(content)?)
    }
}

// ── Database ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// SQLite file; created on first import
    #[serde(default = "default_db_path")]
    pub path: PathBuf,

    /// Upper bound on waiting for the write lock before an import fails
    #[serde(default = "default_busy_timeout")]
    pub busy_timeout_secs: u64,
}

fn default_db_path() -> PathBuf { PathBuf::from("clinvar.db") }
fn default_busy_timeout() -> u64 { 600 }

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
            busy_timeout_secs: default_busy_timeout(),
        }
    }
}

// ── Sources ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourcesConfig {
    /// Ontology document (OWL RDF/XML)
    #[serde(default = "default_ontology")]
    pub ontology: PathBuf,

    /// Extra significance synonyms (TSV: term, canonical term).
    /// Extends and overrides the built-in table.
    #[serde(default)]
    pub significance_terms: Option<PathBuf>,

    /// Submitter directory (TSV: id, name, country code)
    #[serde(default)]
    pub submitter_info: Option<PathBuf>,

    /// Only classes whose OBO IRI carries this prefix become terms
    #[serde(default = "default_ontology_prefix")]
    pub ontology_prefix: String,

    /// Returned by the lowest-common-ancestor query when inputs share nothing
    #[serde(default = "default_ontology_root")]
    pub ontology_root: String,
}

fn default_ontology() -> PathBuf { PathBuf::from("mondo.owl") }
fn default_ontology_prefix() -> String { "MONDO".to_string() }
fn default_ontology_root() -> String { "MONDO:0000001".to_string() }

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            ontology: default_ontology(),
            significance_terms: None,
            submitter_info: None,
            ontology_prefix: default_ontology_prefix(),
            ontology_root: default_ontology_root(),
        }
    }
}

// ── Execution ─────────────────────────────────────────────────────────────────

/// What the ontology-aware conflict level becomes when one side's condition
/// could not be resolved to an ontology term.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnresolvedConditionPolicy {
    /// Leave the level NULL
    #[default]
    Unset,
    /// Copy the plain conflict level
    PlainLevel,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportOptions {
    /// Extraction threads; `None` uses the available parallelism
    #[serde(default)]
    pub workers: Option<usize>,

    /// Parallel extraction needs this many times the document size in free memory
    #[serde(default = "default_memory_factor")]
    pub memory_factor: f64,

    #[serde(default)]
    pub unresolved_condition_policy: UnresolvedConditionPolicy,

    /// Rebuild the `current_*` tables after each import
    #[serde(default = "default_true")]
    pub refresh_current: bool,

    /// Rebuild `gene_links` / `normalized_gene_links` after each import
    #[serde(default = "default_true")]
    pub gene_links: bool,
}

fn default_memory_factor() -> f64 { 3.0 }
fn default_true() -> bool { true }

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            workers: None,
            memory_factor: default_memory_factor(),
            unresolved_condition_policy: UnresolvedConditionPolicy::default(),
            refresh_current: true,
            gene_links: true,
        }
    }
}
