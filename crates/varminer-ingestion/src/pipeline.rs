//! End-to-end import of one release document.
//!
//! Orchestrates the full flow for a single file:
//!   1. Identify the release month from the file name
//!   2. Memory-map the document and split it into `ClinVarSet` fragments
//!   3. Extract submissions from every fragment, in parallel when memory allows
//!   4. Reconcile primary ontology terms within each variant
//!   5. Derive condition ↔ term rows
//!   6. Write submissions, comparisons and condition terms in one transaction
//!   7. Refresh the `current_*` tables and the newest release's gene links
//!
//! Auxiliary tables and the ontology are loaded once and reused for every
//! file of a run.

use crate::error::{ExtractError, Result};
use crate::extraction::Extractor;
use crate::fragments::split_fragments;
use crate::normalise::{SignificanceTable, SubmitterDirectory};
use crate::release::Release;
use anyhow::Context;
use memmap2::Mmap;
use rayon::prelude::*;
use std::fs::File;
use std::path::Path;
use std::time::{Duration, Instant};
use sysinfo::System;
use tracing::{debug, info, instrument, warn};
use varminer_common::ImportConfig;
use varminer_db::{
    latest_date, rebuild_gene_links, refresh_current_tables, ComparisonRepository,
    ConditionTermRepository, Database, Submission, SubmissionRepository,
};
use varminer_kg::{condition_term_rows, ComparisonBuilder, Ontology};

// ── Result summary ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct ImportSummary {
    pub date: String,
    pub fragments: usize,
    /// Fragments dropped because they could not be parsed or lacked an accession
    pub skipped_fragments: usize,
    pub submissions: usize,
    pub comparisons: usize,
    pub condition_terms: usize,
    /// Submissions whose primary term was lifted to a related term
    pub reconciled: usize,
    pub parallel: bool,
    pub duration_ms: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ImportOutcome {
    /// File name is not a recognizable release; nothing was read
    Skipped,
    Imported(ImportSummary),
}

// ── Pipeline ──────────────────────────────────────────────────────────────────

pub struct ImportPipeline {
    config: ImportConfig,
    ontology: Ontology,
    significance: SignificanceTable,
    submitters: SubmitterDirectory,
}

impl ImportPipeline {
    /// Load the ontology and lookup tables named in `config`.
    pub fn from_config(config: ImportConfig) -> anyhow::Result<Self> {
        let ontology = varminer_kg::load_from_config(&config.sources)?;
        let significance = SignificanceTable::load(config.sources.significance_terms.as_deref())?;
        let submitters = SubmitterDirectory::load(config.sources.submitter_info.as_deref())?;
        Ok(Self::new(config, ontology, significance, submitters))
    }

    pub fn new(
        config: ImportConfig,
        ontology: Ontology,
        significance: SignificanceTable,
        submitters: SubmitterDirectory,
    ) -> Self {
        Self {
            config,
            ontology,
            significance,
            submitters,
        }
    }

    /// Open the configured database and make sure the schema exists.
    pub fn open_database(&self) -> anyhow::Result<Database> {
        let db_config = &self.config.database;
        let db = Database::open(&db_config.path, Duration::from_secs(db_config.busy_timeout_secs))
            .with_context(|| format!("Cannot open database: {}", db_config.path.display()))?;
        db.initialize().context("Cannot create database schema")?;
        Ok(db)
    }

    /// Import one release document.
    ///
    /// Unrecognized file names are skipped. Everything the file contributes
    /// is written in a single transaction; on error nothing is committed.
    #[instrument(skip(self, db), fields(file = %path.display()))]
    pub fn import_file(&self, db: &Database, path: &Path) -> anyhow::Result<ImportOutcome> {
        let started = Instant::now();

        let release = match Release::from_path(path) {
            Ok(release) => release,
            Err(e @ (ExtractError::UnrecognizedFilename(_) | ExtractError::InvalidDate(_))) => {
                warn!(error = %e, "Skipped unrecognized filename");
                return Ok(ImportOutcome::Skipped);
            }
            Err(e) => return Err(e.into()),
        };
        info!(date = %release.date, "Importing release");

        let file = File::open(path)
            .with_context(|| format!("Cannot open release file: {}", path.display()))?;
        let len = file.metadata()?.len();
        if len == 0 {
            return Err(ExtractError::EmptyDocument(path.to_path_buf()).into());
        }
        // SAFETY: the release is read-only input; nothing in this process writes it.
        let document = unsafe { Mmap::map(&file) }
            .with_context(|| format!("Cannot map release file: {}", path.display()))?;

        release.check_dated(&document);
        let fragments = split_fragments(&document);
        if fragments.is_empty() {
            return Err(ExtractError::EmptyDocument(path.to_path_buf()).into());
        }
        debug!(fragments = fragments.len(), bytes = len, "split document");

        let parallel = self.use_parallel(len);
        let (mut submissions, skipped_fragments) =
            self.extract_all(&release.date, &fragments, parallel)?;

        let builder =
            ComparisonBuilder::new(&self.ontology, self.config.import.unresolved_condition_policy);
        let reconciled = builder.reconcile_primary_terms(&mut submissions);
        let term_rows = condition_term_rows(&self.ontology, &release.date, &submissions);

        let date = release.date.as_str();
        let options = &self.config.import;
        let (comparisons, condition_terms) = db
            .write_batch(|conn| {
                let submission_repo = SubmissionRepository::new(conn);
                // accessions dropped from a re-imported release must not linger
                submission_repo.delete_for_date(date)?;
                submission_repo.upsert_batch(&submissions)?;
                let comparisons =
                    ComparisonRepository::new(conn).replace_for_date(date, builder.comparisons(&submissions))?;
                let condition_terms = ConditionTermRepository::new(conn).replace_for_date(date, &term_rows)?;

                if options.refresh_current {
                    refresh_current_tables(conn)?;
                }
                if options.gene_links {
                    // links follow the newest release, not necessarily this one
                    if let Some(latest) = latest_date(conn)? {
                        rebuild_gene_links(conn, &latest)?;
                    }
                }
                Ok((comparisons, condition_terms))
            })
            .with_context(|| format!("Cannot store release {date}"))?;

        let summary = ImportSummary {
            date: release.date.clone(),
            fragments: fragments.len(),
            skipped_fragments,
            submissions: submissions.len(),
            comparisons,
            condition_terms,
            reconciled,
            parallel,
            duration_ms: started.elapsed().as_millis() as u64,
        };
        info!(
            date = %summary.date,
            submissions = summary.submissions,
            comparisons = summary.comparisons,
            condition_terms = summary.condition_terms,
            skipped_fragments = summary.skipped_fragments,
            duration_ms = summary.duration_ms,
            "Import complete"
        );
        Ok(ImportOutcome::Imported(summary))
    }

    fn worker_count(&self) -> usize {
        self.config
            .import
            .workers
            .or_else(|| std::thread::available_parallelism().ok().map(|n| n.get()))
            .unwrap_or(1)
            .max(1)
    }

    /// Fan-out keeps every worker's extracted records in memory at once, so
    /// it needs headroom proportional to the document size.
    fn use_parallel(&self, document_len: u64) -> bool {
        if self.worker_count() <= 1 {
            return false;
        }
        let mut system = System::new();
        system.refresh_memory();
        let available = system.available_memory();
        let required = (document_len as f64 * self.config.import.memory_factor) as u64;
        if available < required {
            warn!(
                available_mb = available / (1024 * 1024),
                required_mb = required / (1024 * 1024),
                "Not enough free memory for parallel extraction; using one thread"
            );
            return false;
        }
        true
    }

    /// Submissions of every usable fragment, in document order, plus the
    /// number of fragments that had to be skipped.
    fn extract_all(
        &self,
        date: &str,
        fragments: &[&[u8]],
        parallel: bool,
    ) -> anyhow::Result<(Vec<Submission>, usize)> {
        let extractor = Extractor::new(&self.ontology, &self.significance, &self.submitters);

        let results: Vec<Result<Vec<Submission>>> = if parallel {
            let workers = self.worker_count();
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(workers)
                .build()
                .context("Cannot start extraction workers")?;
            debug!(workers, "extracting in parallel");
            pool.install(|| {
                fragments
                    .par_iter()
                    .map(|fragment| extractor.extract_fragment(date, fragment))
                    .collect()
            })
        } else {
            fragments
                .iter()
                .map(|fragment| extractor.extract_fragment(date, fragment))
                .collect()
        };

        let mut submissions = Vec::new();
        let mut skipped = 0;
        for (index, result) in results.into_iter().enumerate() {
            match result {
                Ok(batch) => submissions.extend(batch),
                Err(e) => {
                    warn!(fragment = index, error = %e, "Skipped unusable ClinVarSet");
                    skipped += 1;
                }
            }
        }
        Ok((submissions, skipped))
    }
}
