//! Closed vocabularies shared by the extractor and the conflict classifier.
//!
//! ClinVar free text is lower-cased and run through the significance synonym
//! table before it reaches these helpers, so matching here is exact.

use serde::{Deserialize, Serialize};

pub const PATHOGENIC: &str = "pathogenic";
pub const LIKELY_PATHOGENIC: &str = "likely pathogenic";
pub const UNCERTAIN_SIGNIFICANCE: &str = "uncertain significance";
pub const LIKELY_BENIGN: &str = "likely benign";
pub const BENIGN: &str = "benign";
pub const NOT_PROVIDED: &str = "not provided";

/// Condition name used when a reference assertion carries no preferred trait name.
pub const NOT_SPECIFIED: &str = "not specified";

/// Methods kept verbatim by [`normalize_method`]; everything else becomes `other`.
pub const STANDARD_METHODS: &[&str] = &[
    "clinical testing",
    "curation",
    "literature only",
    "research",
];

pub const OTHER_METHOD: &str = "other";

/// Coarse class of a normalized significance value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignificanceClass {
    Pathogenic,
    LikelyPathogenic,
    UncertainSignificance,
    LikelyBenign,
    Benign,
    NotProvided,
    /// drug response, risk factor, protective, association, …
    Other,
}

impl SignificanceClass {
    pub fn from_normalized(normalized: &str) -> Self {
        match normalized {
            PATHOGENIC => Self::Pathogenic,
            LIKELY_PATHOGENIC => Self::LikelyPathogenic,
            UNCERTAIN_SIGNIFICANCE => Self::UncertainSignificance,
            LIKELY_BENIGN => Self::LikelyBenign,
            BENIGN => Self::Benign,
            NOT_PROVIDED => Self::NotProvided,
            _ => Self::Other,
        }
    }

    pub fn is_benign_side(self) -> bool {
        matches!(self, Self::Benign | Self::LikelyBenign)
    }

    pub fn is_pathogenic_side(self) -> bool {
        matches!(self, Self::Pathogenic | Self::LikelyPathogenic)
    }
}

/// Severity of the disagreement between two submissions, lowest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ConflictLevel {
    /// Same accession on both sides; excluded from conflict counts.
    SelfComparison = -1,
    NoConflict = 0,
    /// Normalized terms agree, raw wording differs.
    Synonymous = 1,
    /// Benign vs likely benign, pathogenic vs likely pathogenic.
    Confidence = 2,
    /// Benign or likely benign vs uncertain significance.
    BenignVsUncertain = 3,
    Category = 4,
    /// Benign, likely benign or uncertain vs pathogenic or likely pathogenic.
    ClinicallySignificant = 5,
}

impl ConflictLevel {
    pub fn code(self) -> i8 {
        self as i8
    }

    pub fn from_code(code: i8) -> Option<Self> {
        Some(match code {
            -1 => Self::SelfComparison,
            0 => Self::NoConflict,
            1 => Self::Synonymous,
            2 => Self::Confidence,
            3 => Self::BenignVsUncertain,
            4 => Self::Category,
            5 => Self::ClinicallySignificant,
            _ => return None,
        })
    }
}

/// How many genes a variant touches and why.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GeneMultiplicity {
    Intergenic = 0,
    SingleGene = 1,
    /// Several genes close together or overlapping under a small variant
    OverlappingGenes = 2,
    /// Several genes because the variant itself is large
    LargeVariant = 3,
}

impl GeneMultiplicity {
    pub fn classify(gene_count: usize, small_variant: bool) -> Self {
        match gene_count {
            0 => Self::Intergenic,
            1 => Self::SingleGene,
            _ if small_variant => Self::OverlappingGenes,
            _ => Self::LargeVariant,
        }
    }

    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn from_code(code: u8) -> Option<Self> {
        Some(match code {
            0 => Self::Intergenic,
            1 => Self::SingleGene,
            2 => Self::OverlappingGenes,
            3 => Self::LargeVariant,
            _ => return None,
        })
    }
}

/// Review-status text → star level (0–4). Unknown statuses, including
/// "no assertion criteria provided", earn no stars.
pub fn star_level(review_status: &str) -> u8 {
    match review_status {
        "criteria provided, single submitter"
        | "criteria provided, conflicting interpretations"
        | "criteria provided, conflicting classifications" => 1,
        "criteria provided, multiple submitters, no conflicts" => 2,
        "reviewed by expert panel" => 3,
        "practice guideline" => 4,
        _ => 0,
    }
}

/// Collapse a collection-method string onto the small reporting vocabulary.
pub fn normalize_method(method: &str) -> &'static str {
    STANDARD_METHODS
        .iter()
        .copied()
        .find(|m| *m == method)
        .unwrap_or(OTHER_METHOD)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_star_levels_are_monotonic_in_trust() {
        let ordered = [
            "no assertion criteria provided",
            "criteria provided, single submitter",
            "criteria provided, multiple submitters, no conflicts",
            "reviewed by expert panel",
            "practice guideline",
        ];
        let stars: Vec<u8> = ordered.iter().map(|s| star_level(s)).collect();
        assert_eq!(stars, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_conflicting_status_earns_one_star() {
        assert_eq!(star_level("criteria provided, conflicting interpretations"), 1);
        assert_eq!(star_level(""), 0);
    }

    #[test]
    fn test_normalize_method() {
        assert_eq!(normalize_method("clinical testing"), "clinical testing");
        assert_eq!(normalize_method("literature only"), "literature only");
        assert_eq!(normalize_method("not provided"), "other");
        assert_eq!(normalize_method("phenotyping only"), "other");
    }

    #[test]
    fn test_conflict_level_codes_round_trip_through_sql_integers() {
        for code in -1..=5 {
            let level = ConflictLevel::from_code(code).unwrap();
            assert_eq!(level.code(), code);
        }
        assert!(ConflictLevel::from_code(6).is_none());
        assert!(ConflictLevel::ClinicallySignificant > ConflictLevel::Category);
    }

    #[test]
    fn test_gene_multiplicity() {
        assert_eq!(GeneMultiplicity::classify(0, true), GeneMultiplicity::Intergenic);
        assert_eq!(GeneMultiplicity::classify(1, false), GeneMultiplicity::SingleGene);
        assert_eq!(GeneMultiplicity::classify(2, true).code(), 2);
        assert_eq!(GeneMultiplicity::classify(3, false).code(), 3);
        assert_eq!(GeneMultiplicity::from_code(2), Some(GeneMultiplicity::OverlappingGenes));
        assert_eq!(GeneMultiplicity::from_code(4), None);
    }

    #[test]
    fn test_significance_class() {
        assert_eq!(SignificanceClass::from_normalized("likely benign"), SignificanceClass::LikelyBenign);
        assert_eq!(SignificanceClass::from_normalized("drug response"), SignificanceClass::Other);
        assert!(SignificanceClass::Benign.is_benign_side());
        assert!(SignificanceClass::LikelyPathogenic.is_pathogenic_side());
        assert!(!SignificanceClass::UncertainSignificance.is_pathogenic_side());
    }
}
