//! Splitting a release document into `ClinVarSet` fragments.
//!
//! Release files are several gigabytes. Rather than stream the whole document
//! through one parser, the memory-mapped bytes are cut into one slice per
//! `ClinVarSet` element and each slice is parsed on its own.

use regex::bytes::Regex;
use std::sync::OnceLock;

fn clinvar_set_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)<ClinVarSet[\s>].*?</ClinVarSet>").unwrap())
}

/// Byte slices of every `<ClinVarSet …>…</ClinVarSet>` element, in document order.
pub fn split_fragments(document: &[u8]) -> Vec<&[u8]> {
    clinvar_set_regex()
        .find_iter(document)
        .map(|m| m.as_bytes())
        .collect()
}
