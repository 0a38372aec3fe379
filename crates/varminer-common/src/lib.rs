//! varminer-common: Shared vocabularies, errors, and configuration used across all varminer crates.

pub mod error;
pub mod vocabulary;
pub mod import_config;

// Re-export commonly used types
pub use error::{Result, VarminerError};
pub use import_config::{
    DatabaseConfig, ImportConfig, ImportOptions, SourcesConfig, UnresolvedConditionPolicy,
};
pub use vocabulary::{
    normalize_method, star_level, ConflictLevel, GeneMultiplicity, SignificanceClass,
};
