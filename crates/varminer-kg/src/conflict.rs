//! Pairwise conflict classification of clinical significance calls.
//!
//! Rules are tried in order and the first match wins; every asymmetric rule
//! is checked in both directions, so `classify(a, b) == classify(b, a)`.

use varminer_common::{ConflictLevel, SignificanceClass};
use varminer_db::Submission;

/// The parts of a submission the classifier looks at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignificanceCall<'a> {
    pub scv: &'a str,
    /// Lower-cased, as submitted
    pub significance: &'a str,
    /// After the synonym table
    pub normalized: &'a str,
}

impl<'a> From<&'a Submission> for SignificanceCall<'a> {
    fn from(s: &'a Submission) -> Self {
        Self {
            scv: &s.scv,
            significance: &s.significance,
            normalized: &s.normalized_significance,
        }
    }
}

impl SignificanceCall<'_> {
    fn class(&self) -> SignificanceClass {
        SignificanceClass::from_normalized(self.normalized)
    }
}

/// Either order of (`a` satisfies `left`, `b` satisfies `right`).
fn either_way(
    a: SignificanceClass,
    b: SignificanceClass,
    left: fn(SignificanceClass) -> bool,
    right: fn(SignificanceClass) -> bool,
) -> bool {
    (left(a) && right(b)) || (left(b) && right(a))
}

fn is_uncertain(c: SignificanceClass) -> bool {
    c == SignificanceClass::UncertainSignificance
}

fn is_not_pathogenic(c: SignificanceClass) -> bool {
    c.is_benign_side() || is_uncertain(c)
}

pub fn classify(a: SignificanceCall<'_>, b: SignificanceCall<'_>) -> ConflictLevel {
    let (x, y) = (a.class(), b.class());

    if a.scv == b.scv {
        ConflictLevel::SelfComparison
    } else if a.significance == b.significance
        || x == SignificanceClass::NotProvided
        || y == SignificanceClass::NotProvided
    {
        ConflictLevel::NoConflict
    } else if a.normalized == b.normalized {
        ConflictLevel::Synonymous
    } else if (x.is_benign_side() && y.is_benign_side())
        || (x.is_pathogenic_side() && y.is_pathogenic_side())
    {
        // normalized values differ, so this is the strong vs likely pair
        ConflictLevel::Confidence
    } else if either_way(x, y, SignificanceClass::is_benign_side, is_uncertain) {
        ConflictLevel::BenignVsUncertain
    } else if either_way(x, y, is_not_pathogenic, SignificanceClass::is_pathogenic_side) {
        ConflictLevel::ClinicallySignificant
    } else {
        ConflictLevel::Category
    }
}

/// Classify two stored submissions.
pub fn classify_submissions(a: &Submission, b: &Submission) -> ConflictLevel {
    classify(a.into(), b.into())
}
