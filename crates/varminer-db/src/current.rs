//! `current_*` tables: copies of the newest release, rebuilt after an import.

use crate::error::Result;
use crate::schema::{self, CURRENT_PREFIX};
use rusqlite::Connection;
use tracing::info;

/// Newest release date present in `submissions`.
pub fn latest_date(conn: &Connection) -> Result<Option<String>> {
    let date: Option<String> =
        conn.query_row("SELECT MAX(date) FROM submissions", [], |row| row.get(0))?;
    Ok(date)
}

/// Recreate every `current_*` table from the newest date in `submissions`.
///
/// Returns the date the tables now hold, or `None` when nothing has been
/// imported yet.
pub fn refresh_current_tables(conn: &Connection) -> Result<Option<String>> {
    let Some(latest) = latest_date(conn)? else {
        return Ok(None);
    };

    for (table, columns) in schema::indexed_tables() {
        let current = format!("{CURRENT_PREFIX}{table}");
        conn.execute_batch(&format!(
            "DROP TABLE IF EXISTS {current};
             CREATE TABLE {current} AS
                 SELECT * FROM {table} WHERE date = (SELECT MAX(date) FROM submissions);"
        ))?;
        conn.execute_batch(&schema::index_statements(&current, columns))?;
    }

    info!(date = %latest, "current tables refreshed");
    Ok(Some(latest))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::Database;
    use crate::submissions::tests::sample;
    use crate::submissions::SubmissionRepository;

    #[test]
    fn test_current_holds_only_newest_release() {
        let db = Database::open_in_memory().unwrap();
        db.initialize().unwrap();
        assert_eq!(refresh_current_tables(db.connection()).unwrap(), None);

        let repo = SubmissionRepository::new(db.connection());
        repo.upsert_batch(&[
            sample("2018-12", 1, "SCV1", "benign"),
            sample("2018-12", 1, "SCV2", "benign"),
            sample("2019-01", 1, "SCV1", "pathogenic"),
        ])
        .unwrap();

        let date = refresh_current_tables(db.connection()).unwrap();
        assert_eq!(date.as_deref(), Some("2019-01"));

        let n: i64 = db
            .connection()
            .query_row("SELECT COUNT(*) FROM current_submissions", [], |r| r.get(0))
            .unwrap();
        assert_eq!(n, 1);
        assert!(db.table_exists("current_comparisons").unwrap());
        assert!(db.table_exists("current_condition_term_relationships").unwrap());

        // second refresh replaces rather than appends
        refresh_current_tables(db.connection()).unwrap();
        let n: i64 = db
            .connection()
            .query_row("SELECT COUNT(*) FROM current_submissions", [], |r| r.get(0))
            .unwrap();
        assert_eq!(n, 1);
    }
}
