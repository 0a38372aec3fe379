//! Lookup tables and normalisers applied while extracting submissions.

pub mod gene;
pub mod significance;
pub mod submitter;

pub use gene::{normalize_gene_symbol, GeneSet};
pub use significance::SignificanceTable;
pub use submitter::SubmitterDirectory;
