//! Submitter directory: organisation id → country code.
//!
//! TSV with three columns (`id`, `name`, `country code`) and no header, as
//! produced by the submitter-info scrape. Unknown submitters get `""`.

use crate::error::Result;
use ahash::AHashMap;
use anyhow::Context;
use std::path::Path;
use tracing::{info, warn};

#[derive(Debug, Clone, Default)]
pub struct SubmitterDirectory {
    countries: AHashMap<i64, String>,
}

impl SubmitterDirectory {
    /// Empty directory when no file is configured.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Cannot read submitter info: {}", path.display()))?;
        let directory = Self::from_tsv(&content)
            .with_context(|| format!("Cannot parse submitter info: {}", path.display()))?;
        info!(path = %path.display(), submitters = directory.len(), "Loaded submitter info");
        Ok(directory)
    }

    pub fn from_tsv(tsv: &str) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(b'\t')
            .has_headers(false)
            .flexible(true)
            .quoting(false)
            .from_reader(tsv.as_bytes());

        let mut countries = AHashMap::new();
        for (line, record) in reader.records().enumerate() {
            let record = record?;
            let Some(id) = record.get(0).and_then(|id| id.trim().parse::<i64>().ok()) else {
                warn!(line = line + 1, "submitter row without a numeric id, skipped");
                continue;
            };
            let code = record.get(2).unwrap_or("").trim();
            if !code.is_empty() {
                countries.insert(id, code.to_string());
            }
        }
        Ok(Self { countries })
    }

    pub fn country_code(&self, submitter_id: i64) -> &str {
        self.countries
            .get(&submitter_id)
            .map(String::as_str)
            .unwrap_or("")
    }

    pub fn len(&self) -> usize {
        self.countries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.countries.is_empty()
    }
}
