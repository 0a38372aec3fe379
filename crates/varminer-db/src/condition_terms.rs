//! Condition ↔ ontology term relationship repository.

use crate::error::Result;
use crate::schema::ConditionTermRow;
use rusqlite::{params, Connection};

/// Repository for `condition_term_relationships`.
pub struct ConditionTermRepository<'c> {
    conn: &'c Connection,
}

impl<'c> ConditionTermRepository<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        Self { conn }
    }

    /// Rebuild the relationships of `date` from `rows`.
    pub fn replace_for_date(&self, date: &str, rows: &[ConditionTermRow]) -> Result<usize> {
        self.conn.execute(
            "DELETE FROM condition_term_relationships WHERE date = ?1",
            params![date],
        )?;

        let mut stmt = self.conn.prepare_cached(
            "INSERT OR IGNORE INTO condition_term_relationships
                 (date, term_id, term_name, condition_name)
             VALUES (?1, ?2, ?3, ?4)",
        )?;
        let mut written = 0;
        for row in rows {
            written += stmt.execute(params![
                row.date,
                row.term_id,
                row.term_name,
                row.condition_name
            ])?;
        }
        Ok(written)
    }

    /// Term ids linked to a condition name, sorted.
    pub fn terms_for_condition(&self, date: &str, condition_name: &str) -> Result<Vec<String>> {
        let mut stmt = self.conn.prepare_cached(
            "SELECT term_id FROM condition_term_relationships
             WHERE date = ?1 AND condition_name = ?2
             ORDER BY term_id",
        )?;
        let rows = stmt.query_map(params![date, condition_name], |row| row.get(0))?;
        Ok(rows.collect::<rusqlite::Result<Vec<String>>>()?)
    }
}
