//! varminer-ingestion: ClinVar release import.
//! - Release identification from the file name
//! - Fragmenting the memory-mapped document into `ClinVarSet` elements
//! - Per-fragment extraction of submission records
//! - Significance synonyms, submitter countries and gene normalisation
//! - Parallel fan-out and the single-transaction write

pub mod error;
pub mod extraction;
pub mod fragments;
pub mod normalise;
pub mod pipeline;
pub mod release;
pub mod xml_tree;

pub use error::{ExtractError, Result};
pub use extraction::{map_condition_xref, Extractor};
pub use pipeline::{ImportOutcome, ImportPipeline, ImportSummary};
pub use release::Release;
