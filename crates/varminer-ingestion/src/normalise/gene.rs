//! Gene symbols attached to a variant and their multiplicity.

use crate::xml_tree::XmlNode;
use std::collections::BTreeSet;
use varminer_common::GeneMultiplicity;

const OVERLAPPED_BY_VARIANT: &str = "genes overlapped by variant";

/// Antisense transcripts (`X-AS`, `X-AS1` … `X-AS9`) are folded into `X`.
pub fn normalize_gene_symbol(symbol: &str) -> &str {
    match symbol.rsplit_once('-') {
        Some((head, tail)) if !head.is_empty() && is_antisense_suffix(tail) => head,
        _ => symbol,
    }
}

fn is_antisense_suffix(tail: &str) -> bool {
    match tail.strip_prefix("AS") {
        Some("") => true,
        Some(digit) => matches!(digit.as_bytes(), [b'1'..=b'9']),
        None => false,
    }
}

/// Genes of one (possibly compound) variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneSet {
    pub genes: BTreeSet<String>,
    /// False once any measure is known to span several genes on its own.
    pub small_variant: bool,
}

impl Default for GeneSet {
    fn default() -> Self {
        Self {
            genes: BTreeSet::new(),
            small_variant: true,
        }
    }
}

impl GeneSet {
    /// Collect preferred gene symbols from each `Measure`'s relationships.
    ///
    /// Every measure of a small compound variant is annotated with the same
    /// genes; a measure whose set differs from the first marks the variant
    /// large, as does an explicit "genes overlapped by variant" relationship.
    pub fn from_measures(measures: &[&XmlNode]) -> Self {
        let mut set = Self::default();
        let mut first: Option<BTreeSet<String>> = None;

        for measure in measures {
            let mut measure_genes = BTreeSet::new();
            for relationship in measure.children("MeasureRelationship") {
                if relationship.attr("Type") == Some(OVERLAPPED_BY_VARIANT) {
                    set.small_variant = false;
                }
                let symbol = relationship
                    .find_with(&["Symbol", "ElementValue"], "Type", "Preferred")
                    .and_then(XmlNode::text);
                // blank in old releases
                if let Some(symbol) = symbol {
                    measure_genes.insert(symbol.to_string());
                }
            }

            match &first {
                None => first = Some(measure_genes.clone()),
                Some(expected) if *expected != measure_genes => set.small_variant = false,
                Some(_) => {}
            }
            set.genes.extend(measure_genes);
        }
        set
    }

    pub fn joined(&self) -> String {
        self.genes.iter().map(String::as_str).collect::<Vec<_>>().join(", ")
    }

    pub fn multiplicity(&self) -> GeneMultiplicity {
        GeneMultiplicity::classify(self.genes.len(), self.small_variant)
    }

    /// Same variant with antisense symbols merged into their sense gene.
    pub fn normalized(&self) -> Self {
        Self {
            genes: self
                .genes
                .iter()
                .map(|g| normalize_gene_symbol(g).to_string())
                .collect(),
            small_variant: self.small_variant,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xml_tree::parse_fragment;

    fn measures(xml: &str) -> XmlNode {
        parse_fragment(xml.as_bytes()).unwrap()
    }

    fn relationship(symbol: &str, kind: &str) -> String {
        format!(
            r#"<MeasureRelationship Type="{kind}"><Symbol><ElementValue Type="Preferred">{symbol}</ElementValue></Symbol></MeasureRelationship>"#
        )
    }

    #[test]
    fn test_antisense_symbols() {
        assert_eq!(normalize_gene_symbol("BRCA1"), "BRCA1");
        assert_eq!(normalize_gene_symbol("KCNQ1-AS"), "KCNQ1");
        assert_eq!(normalize_gene_symbol("HOXA-AS3"), "HOXA");
        assert_eq!(normalize_gene_symbol("FOO-AS10"), "FOO-AS10");
        assert_eq!(normalize_gene_symbol("FOO-AS0"), "FOO-AS0");
        assert_eq!(normalize_gene_symbol("-AS1"), "-AS1");
        assert_eq!(normalize_gene_symbol("MIR-BAR-AS2"), "MIR-BAR");
        assert_eq!(normalize_gene_symbol("HLA-DRB1"), "HLA-DRB1");
    }

    #[test]
    fn test_multiplicity_cases() {
        let none = GeneSet::default();
        assert_eq!(none.multiplicity(), GeneMultiplicity::Intergenic);

        let root = measures(&format!(
            "<MeasureSet><Measure>{}{}</Measure></MeasureSet>",
            relationship("KCNQ1", "within single gene"),
            relationship("KCNQ1OT1", "within multiple genes by overlap"),
        ));
        let set = GeneSet::from_measures(&root.find_all(&["Measure"]));
        assert_eq!(set.joined(), "KCNQ1, KCNQ1OT1");
        assert_eq!(set.multiplicity(), GeneMultiplicity::OverlappingGenes);

        let root = measures(&format!(
            "<MeasureSet><Measure>{}{}</Measure></MeasureSet>",
            relationship("BRCA1", OVERLAPPED_BY_VARIANT),
            relationship("NBR2", OVERLAPPED_BY_VARIANT),
        ));
        let set = GeneSet::from_measures(&root.find_all(&["Measure"]));
        assert_eq!(set.multiplicity(), GeneMultiplicity::LargeVariant);
    }

    #[test]
    fn test_differing_measures_mark_variant_large() {
        let root = measures(&format!(
            "<MeasureSet><Measure>{}</Measure><Measure>{}</Measure></MeasureSet>",
            relationship("CFTR", "within single gene"),
            relationship("PKD1", "within single gene"),
        ));
        let set = GeneSet::from_measures(&root.find_all(&["Measure"]));
        assert!(!set.small_variant);
        assert_eq!(set.multiplicity(), GeneMultiplicity::LargeVariant);

        let root = measures(&format!(
            "<MeasureSet><Measure>{}</Measure><Measure>{}</Measure></MeasureSet>",
            relationship("CFTR", "within single gene"),
            relationship("CFTR", "within single gene"),
        ));
        let set = GeneSet::from_measures(&root.find_all(&["Measure"]));
        assert!(set.small_variant);
        assert_eq!(set.multiplicity(), GeneMultiplicity::SingleGene);
    }

    #[test]
    fn test_identical_multi_gene_measures_stay_overlapping() {
        let genes = format!(
            "{}{}",
            relationship("KCNQ1", "within single gene"),
            relationship("KCNQ1OT1", "within multiple genes by overlap"),
        );
        let root = measures(&format!(
            "<MeasureSet><Measure>{genes}</Measure><Measure>{genes}</Measure></MeasureSet>"
        ));
        let set = GeneSet::from_measures(&root.find_all(&["Measure"]));
        assert!(set.small_variant);
        assert_eq!(set.joined(), "KCNQ1, KCNQ1OT1");
        assert_eq!(set.multiplicity(), GeneMultiplicity::OverlappingGenes);
        assert_eq!(set.multiplicity().code(), 2);
    }

    #[test]
    fn test_normalized_merges_antisense_and_recounts() {
        let root = measures(&format!(
            "<MeasureSet><Measure>{}{}</Measure></MeasureSet>",
            relationship("KCNQ1", "within single gene"),
            relationship("KCNQ1-AS1", "within multiple genes by overlap"),
        ));
        let set = GeneSet::from_measures(&root.find_all(&["Measure"]));
        assert_eq!(set.multiplicity(), GeneMultiplicity::OverlappingGenes);

        let normalized = set.normalized();
        assert_eq!(normalized.joined(), "KCNQ1");
        assert_eq!(normalized.multiplicity(), GeneMultiplicity::SingleGene);
    }

    #[test]
    fn test_blank_symbols_are_ignored() {
        let root = measures(
            r#"<MeasureSet><Measure><MeasureRelationship Type="variant in gene"><Symbol><ElementValue Type="Preferred"></ElementValue></Symbol></MeasureRelationship></Measure></MeasureSet>"#,
        );
        let set = GeneSet::from_measures(&root.find_all(&["Measure"]));
        assert!(set.genes.is_empty());
    }
}
