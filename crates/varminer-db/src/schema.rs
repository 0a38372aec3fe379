//! Row types and DDL for the SQLite store.
//!
//! Every table is keyed by the release `date` (`YYYY-MM`). The `current_*`
//! tables are rebuilt copies of the newest date and carry the same indexes
//! as their source tables.

use varminer_common::{ConflictLevel, GeneMultiplicity};

pub const TABLE_SUBMISSIONS: &str = "submissions";
pub const TABLE_COMPARISONS: &str = "comparisons";
pub const TABLE_CONDITION_TERMS: &str = "condition_term_relationships";
pub const TABLE_GENE_LINKS: &str = "gene_links";
pub const TABLE_NORMALIZED_GENE_LINKS: &str = "normalized_gene_links";

/// Prefix of the tables holding only the newest release.
pub const CURRENT_PREFIX: &str = "current_";

/// Separator of the stored `condition_xrefs` set.
pub const XREF_SEPARATOR: char = ';';

// =============================================================================
// Submission
// =============================================================================

/// One interpretation by one submitter about one variant, as of one release.
#[derive(Debug, Clone, PartialEq)]
pub struct Submission {
    pub date: String,
    pub variant_id: i64,
    pub variant_name: String,
    pub allele_frequency: Option<f64>,
    pub rsid: String,
    pub gene: String,
    pub gene_type: GeneMultiplicity,
    pub normalized_gene: String,
    pub normalized_gene_type: GeneMultiplicity,
    pub submitter_id: i64,
    pub submitter_name: String,
    pub submitter_country_code: String,
    pub rcv: String,
    pub scv: String,
    pub significance: String,
    pub normalized_significance: String,
    pub last_eval: String,
    pub review_status: String,
    pub star_level: u8,
    pub condition_name: String,
    /// Sorted, de-duplicated
    pub condition_xrefs: Vec<String>,
    pub condition_term_id: Option<String>,
    pub method: String,
    pub normalized_method: String,
    pub comment: String,
}

impl Submission {
    pub fn condition_xrefs_joined(&self) -> String {
        self.condition_xrefs.join(&XREF_SEPARATOR.to_string())
    }

    pub fn split_xrefs(joined: &str) -> Vec<String> {
        joined
            .split(XREF_SEPARATOR)
            .filter(|x| !x.is_empty())
            .map(str::to_string)
            .collect()
    }
}

pub(crate) const CREATE_SUBMISSIONS: &str = "
CREATE TABLE IF NOT EXISTS submissions (
    date                    TEXT    NOT NULL,
    variant_id              INTEGER NOT NULL,
    variant_name            TEXT    NOT NULL,
    allele_frequency        REAL,
    rsid                    TEXT    NOT NULL,
    gene                    TEXT    NOT NULL,
    gene_type               INTEGER NOT NULL,
    normalized_gene         TEXT    NOT NULL,
    normalized_gene_type    INTEGER NOT NULL,
    submitter_id            INTEGER NOT NULL,
    submitter_name          TEXT    NOT NULL,
    submitter_country_code  TEXT    NOT NULL,
    rcv                     TEXT    NOT NULL,
    scv                     TEXT    NOT NULL,
    significance            TEXT    NOT NULL,
    normalized_significance TEXT    NOT NULL,
    last_eval               TEXT    NOT NULL,
    review_status           TEXT    NOT NULL,
    star_level              INTEGER NOT NULL,
    condition_name          TEXT    NOT NULL,
    condition_xrefs         TEXT    NOT NULL,
    condition_term_id       TEXT,
    method                  TEXT    NOT NULL,
    normalized_method       TEXT    NOT NULL,
    comment                 TEXT    NOT NULL,
    PRIMARY KEY (date, scv)
)";

pub(crate) const SUBMISSION_INDEXES: &[&str] = &[
    "date",
    "variant_name",
    "rsid",
    "gene",
    "gene_type",
    "normalized_gene",
    "normalized_gene_type",
    "submitter_id",
    "submitter_name",
    "submitter_country_code",
    "rcv",
    "scv",
    "significance",
    "normalized_significance",
    "star_level",
    "condition_name",
    "condition_term_id",
    "method",
    "normalized_method",
];

// =============================================================================
// Comparison
// =============================================================================

/// Ordered pair of submissions about the same variant in the same release.
///
/// Borrows both sides so the full cross product can be streamed into the
/// insert statement without cloning rows.
#[derive(Debug, Clone, Copy)]
pub struct Comparison<'a> {
    pub subject: &'a Submission,
    pub other: &'a Submission,
    pub conflict_level: ConflictLevel,
    pub normalized_conflict_level: Option<ConflictLevel>,
}

pub(crate) const CREATE_COMPARISONS: &str = "
CREATE TABLE IF NOT EXISTS comparisons (
    date                     TEXT    NOT NULL,
    variant_id               INTEGER NOT NULL,
    variant_name             TEXT    NOT NULL,
    allele_frequency         REAL,
    rsid                     TEXT    NOT NULL,
    gene                     TEXT    NOT NULL,
    gene_type                INTEGER NOT NULL,
    normalized_gene          TEXT    NOT NULL,
    normalized_gene_type     INTEGER NOT NULL,
    submitter1_id            INTEGER NOT NULL,
    submitter1_name          TEXT    NOT NULL,
    submitter1_country_code  TEXT    NOT NULL,
    rcv1                     TEXT    NOT NULL,
    scv1                     TEXT    NOT NULL,
    significance1            TEXT    NOT NULL,
    normalized_significance1 TEXT    NOT NULL,
    last_eval1               TEXT    NOT NULL,
    review_status1           TEXT    NOT NULL,
    star_level1              INTEGER NOT NULL,
    condition1_name          TEXT    NOT NULL,
    condition1_xrefs         TEXT    NOT NULL,
    condition1_term_id       TEXT,
    method1                  TEXT    NOT NULL,
    normalized_method1       TEXT    NOT NULL,
    comment1                 TEXT    NOT NULL,
    submitter2_id            INTEGER NOT NULL,
    submitter2_name          TEXT    NOT NULL,
    scv2                     TEXT    NOT NULL,
    significance2            TEXT    NOT NULL,
    normalized_significance2 TEXT    NOT NULL,
    star_level2              INTEGER NOT NULL,
    condition2_name          TEXT    NOT NULL,
    condition2_term_id       TEXT,
    normalized_method2       TEXT    NOT NULL,
    conflict_level           INTEGER NOT NULL,
    normalized_conflict_level INTEGER,
    PRIMARY KEY (date, scv1, scv2)
)";

pub(crate) const COMPARISON_INDEXES: &[&str] = &[
    "date",
    "variant_name",
    "rsid",
    "gene",
    "gene_type",
    "normalized_gene",
    "normalized_gene_type",
    "submitter1_id",
    "submitter1_name",
    "submitter1_country_code",
    "rcv1",
    "scv1",
    "significance1",
    "normalized_significance1",
    "star_level1",
    "condition1_name",
    "condition1_term_id",
    "method1",
    "normalized_method1",
    "submitter2_id",
    "submitter2_name",
    "scv2",
    "normalized_significance2",
    "star_level2",
    "condition2_term_id",
    "normalized_method2",
    "conflict_level",
    "normalized_conflict_level",
];

// =============================================================================
// Condition ↔ ontology term
// =============================================================================

/// A ClinVar condition name linked to a term it matches or to one of that
/// term's ancestors.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ConditionTermRow {
    pub date: String,
    pub term_id: String,
    pub term_name: String,
    pub condition_name: String,
}

pub(crate) const CREATE_CONDITION_TERMS: &str = "
CREATE TABLE IF NOT EXISTS condition_term_relationships (
    date           TEXT NOT NULL,
    term_id        TEXT NOT NULL,
    term_name      TEXT NOT NULL,
    condition_name TEXT NOT NULL,
    PRIMARY KEY (date, term_id, condition_name)
)";

pub(crate) const CONDITION_TERM_INDEXES: &[&str] = &["date", "term_id", "condition_name"];

// =============================================================================
// Gene links
// =============================================================================

pub(crate) const CREATE_GENE_LINKS: &str = "
CREATE TABLE IF NOT EXISTS gene_links (
    gene     TEXT NOT NULL,
    see_also TEXT NOT NULL,
    PRIMARY KEY (gene, see_also)
);
CREATE TABLE IF NOT EXISTS normalized_gene_links (
    gene     TEXT NOT NULL,
    see_also TEXT NOT NULL,
    PRIMARY KEY (gene, see_also)
)";

/// `CREATE INDEX` statements for `table`, one per column.
pub(crate) fn index_statements(table: &str, columns: &[&str]) -> String {
    columns
        .iter()
        .map(|col| format!("CREATE INDEX IF NOT EXISTS {table}__{col} ON {table} ({col});"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Indexed columns of each date-keyed table.
pub(crate) fn indexed_tables() -> [(&'static str, &'static [&'static str]); 3] {
    [
        (TABLE_SUBMISSIONS, SUBMISSION_INDEXES),
        (TABLE_COMPARISONS, COMPARISON_INDEXES),
        (TABLE_CONDITION_TERMS, CONDITION_TERM_INDEXES),
    ]
}
