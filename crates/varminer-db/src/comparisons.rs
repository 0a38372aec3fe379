//! Comparison repository.
//!
//! Comparisons are derived data: a release's rows are always rebuilt as a
//! whole, never patched.

use crate::error::{DbError, Result};
use crate::schema::{Comparison, TABLE_COMPARISONS};
use rusqlite::{params, Connection};
use tracing::debug;
use varminer_common::ConflictLevel;

const INSERT_COMPARISON: &str = "
INSERT OR REPLACE INTO comparisons (
    date, variant_id, variant_name, allele_frequency, rsid,
    gene, gene_type, normalized_gene, normalized_gene_type,
    submitter1_id, submitter1_name, submitter1_country_code,
    rcv1, scv1, significance1, normalized_significance1,
    last_eval1, review_status1, star_level1,
    condition1_name, condition1_xrefs, condition1_term_id,
    method1, normalized_method1, comment1,
    submitter2_id, submitter2_name, scv2, significance2, normalized_significance2,
    star_level2, condition2_name, condition2_term_id, normalized_method2,
    conflict_level, normalized_conflict_level
) VALUES (
    ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18,
    ?19, ?20, ?21, ?22, ?23, ?24, ?25, ?26, ?27, ?28, ?29, ?30, ?31, ?32, ?33, ?34,
    ?35, ?36
)";

/// Repository for comparison rows, bound to one connection or transaction.
pub struct ComparisonRepository<'c> {
    conn: &'c Connection,
}

impl<'c> ComparisonRepository<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        Self { conn }
    }

    /// Drop every comparison of `date`, then insert `comparisons`.
    pub fn replace_for_date<'a>(
        &self,
        date: &str,
        comparisons: impl IntoIterator<Item = Comparison<'a>>,
    ) -> Result<usize> {
        let removed = self
            .conn
            .execute("DELETE FROM comparisons WHERE date = ?1", params![date])?;
        debug!(date, removed, "cleared comparisons");

        let mut stmt = self.conn.prepare_cached(INSERT_COMPARISON)?;
        let mut written = 0;
        for c in comparisons {
            let (s, o) = (c.subject, c.other);
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
                o.submitter_id,
                o.submitter_name,
                o.scv,
                o.significance,
                o.normalized_significance,
                o.star_level,
                o.condition_name,
                o.condition_term_id,
                o.normalized_method,
                c.conflict_level.code(),
                c.normalized_conflict_level.map(ConflictLevel::code),
            ])?;
            written += 1;
        }
        Ok(written)
    }

    /// Plain and ontology-aware levels of one ordered pair.
    pub fn levels(
        &self,
        date: &str,
        scv1: &str,
        scv2: &str,
    ) -> Result<Option<(ConflictLevel, Option<ConflictLevel>)>> {
        let mut stmt = self.conn.prepare_cached(
            "SELECT conflict_level, normalized_conflict_level FROM comparisons
             WHERE date = ?1 AND scv1 = ?2 AND scv2 = ?3",
        )?;
        let mut rows = stmt.query(params![date, scv1, scv2])?;
        let Some(row) = rows.next()? else {
            return Ok(None);
        };
        let plain: i8 = row.get(0)?;
        let normalized: Option<i8> = row.get(1)?;
        Ok(Some((
            level_from_code("conflict_level", plain)?,
            normalized
                .map(|code| level_from_code("normalized_conflict_level", code))
                .transpose()?,
        )))
    }

    pub fn count_for_date(&self, date: &str) -> Result<u64> {
        let n: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM comparisons WHERE date = ?1",
            params![date],
            |row| row.get(0),
        )?;
        Ok(n as u64)
    }

    /// Number of non-self pairs of `date` at or above `min_level`.
    pub fn count_conflicts(&self, date: &str, min_level: ConflictLevel) -> Result<u64> {
        let n: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM comparisons WHERE date = ?1 AND conflict_level >= ?2",
            params![date, min_level.code().max(ConflictLevel::NoConflict.code())],
            |row| row.get(0),
        )?;
        Ok(n as u64)
    }
}

fn level_from_code(column: &'static str, code: i8) -> Result<ConflictLevel> {
    ConflictLevel::from_code(code).ok_or_else(|| DbError::InvalidValue {
        table: TABLE_COMPARISONS,
        column,
        value: code.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::Database;
    use crate::schema::Submission;
    use crate::submissions::tests::sample;

    fn pair<'a>(subject: &'a Submission, other: &'a Submission, level: ConflictLevel) -> Comparison<'a> {
        Comparison {
            subject,
            other,
            conflict_level: level,
            normalized_conflict_level: Some(level),
        }
    }

    #[test]
    fn test_replace_for_date_drops_stale_pairs() {
        let db = Database::open_in_memory().unwrap();
        db.initialize().unwrap();
        let repo = ComparisonRepository::new(db.connection());

        let a = sample("2019-01", 1, "SCV1", "benign");
        let b = sample("2019-01", 1, "SCV2", "pathogenic");
        let first = vec![
            pair(&a, &a, ConflictLevel::SelfComparison),
            pair(&a, &b, ConflictLevel::ClinicallySignificant),
            pair(&b, &a, ConflictLevel::ClinicallySignificant),
            pair(&b, &b, ConflictLevel::SelfComparison),
        ];
        assert_eq!(repo.replace_for_date("2019-01", first).unwrap(), 4);

        let second = vec![pair(&a, &a, ConflictLevel::SelfComparison)];
        repo.replace_for_date("2019-01", second).unwrap();
        assert_eq!(repo.count_for_date("2019-01").unwrap(), 1);
        assert!(repo.levels("2019-01", "SCV1", "SCV2").unwrap().is_none());
    }

    #[test]
    fn test_levels_keep_null_normalized_level() {
        let db = Database::open_in_memory().unwrap();
        db.initialize().unwrap();
        let repo = ComparisonRepository::new(db.connection());

        let a = sample("2019-01", 1, "SCV1", "likely pathogenic");
        let b = sample("2019-01", 1, "SCV2", "pathogenic");
        let rows = vec![Comparison {
            subject: &a,
            other: &b,
            conflict_level: ConflictLevel::Confidence,
            normalized_conflict_level: None,
        }];
        repo.replace_for_date("2019-01", rows).unwrap();

        let (plain, normalized) = repo.levels("2019-01", "SCV1", "SCV2").unwrap().unwrap();
        assert_eq!(plain, ConflictLevel::Confidence);
        assert_eq!(normalized, None);
        assert_eq!(repo.count_conflicts("2019-01", ConflictLevel::Confidence).unwrap(), 1);
        assert_eq!(
            repo.count_conflicts("2019-01", ConflictLevel::BenignVsUncertain).unwrap(),
            0
        );
    }
}
