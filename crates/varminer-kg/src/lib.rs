//! varminer-kg: disease ontology and conflict analysis.
//!
//! Loads the ontology term graph, resolves ClinVar conditions onto it and
//! turns a release's submissions into classified comparison rows.

pub mod comparison;
pub mod conflict;
pub mod ontology;
pub mod relationships;

pub use comparison::{partition, ComparisonBuilder};
pub use conflict::{classify, classify_submissions, SignificanceCall};
pub use ontology::{load_from_config, load_ontology, Ontology, TermId};
pub use relationships::condition_term_rows;
