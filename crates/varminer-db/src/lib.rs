//! Varminer Database Layer
//!
//! Embedded SQLite store for ClinVar submissions, pairwise comparisons and
//! condition ↔ ontology term relationships.
//!
//! Repositories borrow a [`rusqlite::Connection`], so the same code runs
//! against the plain connection or inside [`Database::write_batch`].
//!
//! # Example
//!
//! ```rust,no_run
//! use std::time::Duration;
//! use varminer_db::{Database, SubmissionRepository};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let db = Database::open("./clinvar.db", Duration::from_secs(600))?;
//!     db.initialize()?;
//!
//!     let n = db.write_batch(|conn| SubmissionRepository::new(conn).upsert_batch(&[]))?;
//!     println!("{n} rows");
//!     Ok(())
//! }
//! ```

pub mod comparisons;
pub mod condition_terms;
pub mod current;
pub mod database;
pub mod error;
pub mod gene_links;
pub mod schema;
pub mod submissions;

pub use comparisons::ComparisonRepository;
pub use condition_terms::ConditionTermRepository;
pub use current::{latest_date, refresh_current_tables};
pub use database::{Database, DatabaseStats};
pub use error::{DbError, Result};
pub use gene_links::rebuild_gene_links;
pub use schema::{
    Comparison, ConditionTermRow, Submission, TABLE_COMPARISONS, TABLE_CONDITION_TERMS,
    TABLE_GENE_LINKS, TABLE_NORMALIZED_GENE_LINKS, TABLE_SUBMISSIONS,
};
pub use submissions::SubmissionRepository;
