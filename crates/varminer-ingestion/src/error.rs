//! Extraction error types.

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ExtractError>;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("Unrecognized release file name: {0}")]
    UnrecognizedFilename(String),

    #[error("Invalid release date {0}")]
    InvalidDate(String),

    #[error("Release document contains no ClinVarSet elements: {}", .0.display())]
    EmptyDocument(PathBuf),

    #[error("Missing required element: {0}")]
    MissingElement(&'static str),

    #[error("Malformed fragment: {0}")]
    Malformed(String),

    #[error("TSV error: {0}")]
    Tsv(#[from] csv::Error),
}
