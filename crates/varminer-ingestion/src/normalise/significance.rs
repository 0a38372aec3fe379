//! Non-standard clinical significance wording → canonical term.
//!
//! ClinVar submitters describe significance in free text ("probably
//! pathogenic", "VUS", "non-pathogenic"). The table maps the lower-cased
//! wording onto the five-tier vocabulary; anything not listed is kept as is.
//!
//! A built-in table ships with the crate. An external TSV
//! (`term<TAB>canonical term`) configured under `[sources]` extends it and
//! wins on conflicts.

use crate::error::Result;
use ahash::AHashMap;
use anyhow::Context;
use std::path::Path;
use tracing::info;

const BUILTIN_TERMS: &str = include_str!("../../data/nonstandard_significance_terms.tsv");

#[derive(Debug, Clone, Default)]
pub struct SignificanceTable {
    terms: AHashMap<String, String>,
}

impl SignificanceTable {
    // ── Constructors ──────────────────────────────────────────────────────────

    pub fn builtin() -> Result<Self> {
        Self::from_tsv(BUILTIN_TERMS)
    }

    /// Built-in table, extended by `path` when given.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let mut table = Self::builtin().context("built-in significance table")?;
        if let Some(path) = path {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Cannot read significance terms: {}", path.display()))?;
            let extra = Self::from_tsv(&content)
                .with_context(|| format!("Cannot parse significance terms: {}", path.display()))?;
            info!(path = %path.display(), terms = extra.len(), "Loaded extra significance terms");
            table.terms.extend(extra.terms);
        }
        Ok(table)
    }

    pub fn from_tsv(tsv: &str) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(b'\t')
            .has_headers(false)
            .flexible(true)
            .quoting(false)
            .from_reader(tsv.as_bytes());

        let mut terms = AHashMap::new();
        for record in reader.records() {
            let record = record?;
            let (Some(term), Some(canonical)) = (record.get(0), record.get(1)) else {
                continue;
            };
            let term = term.trim().to_lowercase();
            if term.is_empty() {
                continue;
            }
            terms.insert(term, canonical.trim().to_lowercase());
        }
        Ok(Self { terms })
    }

    // ── Lookup ────────────────────────────────────────────────────────────────

    /// Canonical form of an already lower-cased significance.
    pub fn normalize<'a>(&'a self, significance: &'a str) -> &'a str {
        self.terms
            .get(significance)
            .map(String::as_str)
            .unwrap_or(significance)
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }
}
