//! Submission repository.
//!
//! Rows are keyed by `(date, scv)`. A re-imported release first drops its
//! old rows so that the stored set matches the latest document exactly.

use crate::error::Result;
use crate::schema::Submission;
use rusqlite::{params, Connection, Row};
use tracing::debug;
use varminer_common::GeneMultiplicity;

const UPSERT_SUBMISSION: &str = "
INSERT INTO submissions (
    date, variant_id, variant_name, allele_frequency, rsid,
    gene, gene_type, normalized_gene, normalized_gene_type,
    submitter_id, submitter_name, submitter_country_code,
    rcv, scv, significance, normalized_significance,
    last_eval, review_status, star_level,
    condition_name, condition_xrefs, condition_term_id,
    method, normalized_method, comment
) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19, ?20, ?21, ?22, ?23, ?24, ?25)
ON CONFLICT(date, scv) DO UPDATE SET
    variant_id = excluded.variant_id,
    variant_name = excluded.variant_name,
    allele_frequency = excluded.allele_frequency,
    rsid = excluded.rsid,
    gene = excluded.gene,
    gene_type = excluded.gene_type,
    normalized_gene = excluded.normalized_gene,
    normalized_gene_type = excluded.normalized_gene_type,
    submitter_id = excluded.submitter_id,
    submitter_name = excluded.submitter_name,
    submitter_country_code = excluded.submitter_country_code,
    rcv = excluded.rcv,
    significance = excluded.significance,
    normalized_significance = excluded.normalized_significance,
    last_eval = excluded.last_eval,
    review_status = excluded.review_status,
    star_level = excluded.star_level,
    condition_name = excluded.condition_name,
    condition_xrefs = excluded.condition_xrefs,
    condition_term_id = excluded.condition_term_id,
    method = excluded.method,
    normalized_method = excluded.normalized_method,
    comment = excluded.comment";

const SELECT_SUBMISSION: &str = "
SELECT date, variant_id, variant_name, allele_frequency, rsid,
       gene, gene_type, normalized_gene, normalized_gene_type,
       submitter_id, submitter_name, submitter_country_code,
       rcv, scv, significance, normalized_significance,
       last_eval, review_status, star_level,
       condition_name, condition_xrefs, condition_term_id,
       method, normalized_method, comment
FROM submissions";

/// Repository for submission rows, bound to one connection or transaction.
pub struct SubmissionRepository<'c> {
    conn: &'c Connection,
}

impl<'c> SubmissionRepository<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        Self { conn }
    }

    /// Insert or update every row; returns the number written.
    pub fn upsert_batch(&self, submissions: &[Submission]) -> Result<usize> {
        let mut stmt = self.conn.prepare_cached(UPSERT_SUBMISSION)?;
        for s in submissions {
            stmt.execute(params![
                s.date,
                s.variant_id,
                s.variant_name,
                s.allele_frequency,
                s.rsid,
                s.gene,
                s.gene_type.code(),
                s.normalized_gene,
                s.normalized_gene_type.code(),
                s.submitter_id,
                s.submitter_name,
                s.submitter_country_code,
                s.rcv,
                s.scv,
                s.significance,
                s.normalized_significance,
                s.last_eval,
                s.review_status,
                s.star_level,
                s.condition_name,
                s.condition_xrefs_joined(),
                s.condition_term_id,
                s.method,
                s.normalized_method,
                s.comment,
            ])?;
        }
        Ok(submissions.len())
    }

    /// Remove every submission of `date`; returns the number removed.
    pub fn delete_for_date(&self, date: &str) -> Result<usize> {
        let removed = self
            .conn
            .execute("DELETE FROM submissions WHERE date = ?1", params![date])?;
        debug!(date, removed, "cleared submissions");
        Ok(removed)
    }

    /// Find one submission by accession.
    pub fn find(&self, date: &str, scv: &str) -> Result<Option<Submission>> {
        let mut stmt = self
            .conn
            .prepare_cached(&format!("{SELECT_SUBMISSION} WHERE date = ?1 AND scv = ?2"))?;
        let mut rows = stmt.query(params![date, scv])?;
        match rows.next()? {
            Some(row) => Ok(Some(submission_from_row(row)?)),
            None => Ok(None),
        }
    }

    /// All submissions of one release, ordered by variant then accession.
    pub fn list_for_date(&self, date: &str) -> Result<Vec<Submission>> {
        let mut stmt = self.conn.prepare_cached(&format!(
            "{SELECT_SUBMISSION} WHERE date = ?1 ORDER BY variant_id, scv"
        ))?;
        let rows = stmt.query_map(params![date], submission_from_row)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    pub fn count_for_date(&self, date: &str) -> Result<u64> {
        let n: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM submissions WHERE date = ?1",
            params![date],
            |row| row.get(0),
        )?;
        Ok(n as u64)
    }
}

fn gene_multiplicity(row: &Row<'_>, idx: usize) -> rusqlite::Result<GeneMultiplicity> {
    let code: i64 = row.get(idx)?;
    u8::try_from(code)
        .ok()
        .and_then(GeneMultiplicity::from_code)
        .ok_or(rusqlite::Error::IntegralValueOutOfRange(idx, code))
}

fn submission_from_row(row: &Row<'_>) -> rusqlite::Result<Submission> {
    let xrefs: String = row.get(20)?;
    Ok(Submission {
        date: row.get(0)?,
        variant_id: row.get(1)?,
        variant_name: row.get(2)?,
        allele_frequency: row.get(3)?,
        rsid: row.get(4)?,
        gene: row.get(5)?,
        gene_type: gene_multiplicity(row, 6)?,
        normalized_gene: row.get(7)?,
        normalized_gene_type: gene_multiplicity(row, 8)?,
        submitter_id: row.get(9)?,
        submitter_name: row.get(10)?,
        submitter_country_code: row.get(11)?,
        rcv: row.get(12)?,
        scv: row.get(13)?,
        significance: row.get(14)?,
        normalized_significance: row.get(15)?,
        last_eval: row.get(16)?,
        review_status: row.get(17)?,
        star_level: row.get(18)?,
        condition_name: row.get(19)?,
        condition_xrefs: Submission::split_xrefs(&xrefs),
        condition_term_id: row.get(21)?,
        method: row.get(22)?,
        normalized_method: row.get(23)?,
        comment: row.get(24)?,
    })
}
