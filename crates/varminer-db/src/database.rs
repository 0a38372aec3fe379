//! Database connection, schema setup and the write transaction.

use crate::current;
use crate::error::{DbError, Result};
use crate::schema;
use rusqlite::Connection;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

const INITIAL_BACKOFF: Duration = Duration::from_millis(50);
const MAX_BACKOFF: Duration = Duration::from_secs(10);

/// How long one statement may wait on the SQLite busy handler before the
/// caller's own retry loop takes over.
const STATEMENT_BUSY_WAIT: Duration = Duration::from_secs(5);

/// Main database handle.
pub struct Database {
    conn: Connection,
    path: PathBuf,
    busy_timeout: Duration,
}

impl Database {
    /// Open or create a database at the specified path.
    ///
    /// `busy_timeout` bounds how long [`Database::write_batch`] waits for the
    /// write lock before giving up.
    pub fn open(path: impl AsRef<Path>, busy_timeout: Duration) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(&path)?;
        conn.busy_timeout(busy_timeout.min(STATEMENT_BUSY_WAIT))?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;

        Ok(Self {
            conn,
            path,
            busy_timeout,
        })
    }

    /// Private in-memory database, used by tests.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Self {
            conn,
            path: PathBuf::from(":memory:"),
            busy_timeout: Duration::from_secs(1),
        })
    }

    /// Get the underlying connection.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Get the database path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Create tables and indexes that don't exist yet.
    pub fn initialize(&self) -> Result<()> {
        self.conn.execute_batch(schema::CREATE_SUBMISSIONS)?;
        self.conn.execute_batch(schema::CREATE_COMPARISONS)?;
        self.conn.execute_batch(schema::CREATE_CONDITION_TERMS)?;
        self.conn.execute_batch(schema::CREATE_GENE_LINKS)?;

        for (table, columns) in schema::indexed_tables() {
            self.conn
                .execute_batch(&schema::index_statements(table, columns))?;
        }
        debug!(path = %self.path.display(), "schema ready");
        Ok(())
    }

    /// Check if a table exists.
    pub fn table_exists(&self, name: &str) -> Result<bool> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
            [name],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    /// Run `f` inside one `BEGIN IMMEDIATE` transaction.
    ///
    /// Acquiring the write lock is retried with exponential back-off until the
    /// configured busy timeout elapses, then [`DbError::LockTimeout`] is
    /// returned. Any error from `f` rolls the whole batch back.
    pub fn write_batch<T>(&self, f: impl FnOnce(&Connection) -> Result<T>) -> Result<T> {
        self.begin_immediate()?;

        let outcome = f(&self.conn).and_then(|value| {
            self.conn.execute_batch("COMMIT")?;
            Ok(value)
        });

        if outcome.is_err() && !self.conn.is_autocommit() {
            if let Err(e) = self.conn.execute_batch("ROLLBACK") {
                warn!(error = %e, "rollback failed");
            }
        }
        outcome
    }

    fn begin_immediate(&self) -> Result<()> {
        let started = Instant::now();
        let mut backoff = INITIAL_BACKOFF;

        loop {
            match self.conn.execute_batch("BEGIN IMMEDIATE") {
                Ok(()) => return Ok(()),
                Err(e) if DbError::is_busy(&e) => {
                    let waited = started.elapsed();
                    if waited >= self.busy_timeout {
                        return Err(DbError::LockTimeout {
                            waited_secs: waited.as_secs(),
                        });
                    }
                    let pause = backoff.min(self.busy_timeout - waited);
                    warn!(
                        waited_ms = waited.as_millis() as u64,
                        retry_in_ms = pause.as_millis() as u64,
                        "database is locked, retrying"
                    );
                    thread::sleep(pause);
                    backoff = (backoff * 2).min(MAX_BACKOFF);
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// Newest release date present in `submissions`.
    pub fn latest_date(&self) -> Result<Option<String>> {
        current::latest_date(&self.conn)
    }

    /// Get database statistics.
    pub fn stats(&self) -> Result<DatabaseStats> {
        let count = |table: &str| -> Result<u64> {
            let n: i64 =
                self.conn
                    .query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| row.get(0))?;
            Ok(n as u64)
        };

        Ok(DatabaseStats {
            submissions: count(schema::TABLE_SUBMISSIONS)?,
            comparisons: count(schema::TABLE_COMPARISONS)?,
            condition_terms: count(schema::TABLE_CONDITION_TERMS)?,
            dates: {
                let n: i64 = self.conn.query_row(
                    "SELECT COUNT(DISTINCT date) FROM submissions",
                    [],
                    |row| row.get(0),
                )?;
                n as u64
            },
        })
    }
}

/// Database statistics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DatabaseStats {
    pub submissions: u64,
    pub comparisons: u64,
    pub condition_terms: u64,
    pub dates: u64,
}
