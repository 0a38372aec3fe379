//! Disease ontology: term graph, OWL loader and resolver queries.

pub mod graph;
pub mod loader;
pub mod resolver;

pub use graph::{Ontology, OntologyBuilder, Term, TermId};
pub use loader::{iri_to_curie, load_from_config, load_ontology, parse_ontology};
