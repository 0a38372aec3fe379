//! Release identification: `ClinVarFullRelease_YYYY-MM.xml` → `YYYY-MM`.

use crate::error::{ExtractError, Result};
use chrono::NaiveDate;
use regex::bytes::Regex as BytesRegex;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tracing::warn;

fn filename_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^ClinVarFullRelease_(\d{4}-\d{2})\.xml$").unwrap())
}

fn dated_regex() -> &'static BytesRegex {
    static RE: OnceLock<BytesRegex> = OnceLock::new();
    RE.get_or_init(|| {
        BytesRegex::new(r#"<ReleaseSet\b[^>]*?\bDated="(\d{4}-\d{2})"#).unwrap()
    })
}

/// How far into the document the `ReleaseSet` start tag is looked for.
const HEADER_SCAN_BYTES: usize = 4096;

/// One release document and the month it describes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Release {
    pub path: PathBuf,
    /// `YYYY-MM`
    pub date: String,
}

impl Release {
    /// Identify a release by its file name; the directory part is ignored.
    pub fn from_path(path: &Path) -> Result<Self> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let date = filename_regex()
            .captures(&name)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().to_string())
            .ok_or_else(|| ExtractError::UnrecognizedFilename(path.display().to_string()))?;

        validate_month(&date)?;
        Ok(Self {
            path: path.to_path_buf(),
            date,
        })
    }

    /// Compare the month in the root element's `Dated` attribute with the
    /// file name. A mismatch is logged; the file name stays authoritative.
    pub fn check_dated(&self, document: &[u8]) -> Option<String> {
        let head = &document[..document.len().min(HEADER_SCAN_BYTES)];
        let dated = dated_regex()
            .captures(head)
            .and_then(|c| c.get(1))
            .map(|m| String::from_utf8_lossy(m.as_bytes()).into_owned())?;
        if dated != self.date {
            warn!(
                file = %self.path.display(),
                filename_date = %self.date,
                dated = %dated,
                "ReleaseSet date disagrees with file name; using file name"
            );
        }
        Some(dated)
    }
}

fn validate_month(date: &str) -> Result<()> {
    NaiveDate::parse_from_str(&format!("{date}-01"), "%Y-%m-%d")
        .map(|_| ())
        .map_err(|_| ExtractError::InvalidDate(date.to_string()))
}
