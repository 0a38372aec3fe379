//! `ClinVarSet` fragment → submission records.
//!
//! Every field that older release schemas lack falls back to a documented
//! default. Only a `ClinVarAssertion` without an SCV accession (or a set
//! without a reference assertion) makes the whole fragment unusable.

use crate::error::{ExtractError, Result};
use crate::normalise::{GeneSet, SignificanceTable, SubmitterDirectory};
use crate::xml_tree::{parse_fragment, XmlNode};
use std::collections::BTreeSet;
use varminer_common::vocabulary::{NOT_PROVIDED, NOT_SPECIFIED};
use varminer_common::{normalize_method, star_level};
use varminer_db::Submission;
use varminer_kg::Ontology;

/// Map a ClinVar `XRef` onto the CURIE form the ontology indexes.
///
/// `db` is compared case-insensitively. Vocabularies outside the list are
/// dropped.
pub fn map_condition_xref(db: &str, id: &str) -> Option<String> {
    let prefix = match db.to_lowercase().as_str() {
        "medgen" => "UMLS:",
        "omim" => "OMIM:",
        "orphanet" => "ORPHANET:",
        // ids already carry their prefix
        "human phenotype ontology" | "mondo" => "",
        "snomed ct" => "SNOMEDCT_US:",
        "mesh" => "MESH:",
        "uniprotkb/swiss-prot" => "UNIPROT:",
        "efo" => "EFO:",
        _ => return None,
    };
    Some(format!("{prefix}{id}"))
}

/// Variant-level attributes shared by every assertion of a set.
#[derive(Debug, Clone, PartialEq)]
struct VariantInfo {
    id: i64,
    name: String,
    rsid: String,
    allele_frequency: Option<f64>,
    genes: GeneSet,
}

/// Condition-level attributes shared by every assertion of a set.
#[derive(Debug, Clone, PartialEq)]
struct ConditionInfo {
    name: String,
    xrefs: Vec<String>,
    primary_term: Option<String>,
}

/// Read-only extraction context, shared across worker threads.
#[derive(Clone, Copy)]
pub struct Extractor<'a> {
    ontology: &'a Ontology,
    significance: &'a SignificanceTable,
    submitters: &'a SubmitterDirectory,
}

impl<'a> Extractor<'a> {
    pub fn new(
        ontology: &'a Ontology,
        significance: &'a SignificanceTable,
        submitters: &'a SubmitterDirectory,
    ) -> Self {
        Self {
            ontology,
            significance,
            submitters,
        }
    }

    /// All submissions of one raw `ClinVarSet` fragment.
    pub fn extract_fragment(&self, date: &str, fragment: &[u8]) -> Result<Vec<Submission>> {
        let set = parse_fragment(fragment)?;
        self.extract_set(date, &set)
    }

    pub fn extract_set(&self, date: &str, set: &XmlNode) -> Result<Vec<Submission>> {
        let reference = set
            .child("ReferenceClinVarAssertion")
            .ok_or(ExtractError::MissingElement("ReferenceClinVarAssertion"))?;

        let rcv = reference
            .find_with(&["ClinVarAccession"], "Type", "RCV")
            .and_then(|el| el.attr("Acc"))
            .unwrap_or("")
            .to_string();
        let variant = variant_info(reference);
        let condition = self.condition_info(reference);

        set.children("ClinVarAssertion")
            .map(|assertion| self.submission(date, &rcv, &variant, &condition, assertion))
            .collect()
    }

    fn condition_info(&self, reference: &XmlNode) -> ConditionInfo {
        let names: Vec<&str> = reference
            .find_all(&["TraitSet", "Trait", "Name", "ElementValue"])
            .into_iter()
            .filter(|el| el.attr("Type") == Some("Preferred"))
            .filter_map(XmlNode::text)
            .collect();
        let name = if names.is_empty() {
            NOT_SPECIFIED.to_string()
        } else {
            names.join("; ")
        };

        let mut xrefs: BTreeSet<String> = BTreeSet::new();
        for xref in trait_xrefs(reference) {
            if xref.attr("Type") == Some("secondary") {
                continue;
            }
            let (Some(db), Some(id)) = (xref.attr("DB"), xref.attr("ID")) else {
                continue;
            };
            if let Some(mapped) = map_condition_xref(db, id) {
                xrefs.insert(mapped);
            }
        }

        let external: Vec<String> = xrefs.iter().cloned().collect();
        for term in self.ontology.matches(&name, &external) {
            xrefs.insert(self.ontology.curie(term).to_string());
        }
        let xrefs: Vec<String> = xrefs.into_iter().collect();

        let primary_term = self
            .ontology
            .primary_term(&name, &xrefs)
            .map(|t| self.ontology.curie(t).to_string());

        ConditionInfo {
            name,
            xrefs,
            primary_term,
        }
    }

    fn submission(
        &self,
        date: &str,
        rcv: &str,
        variant: &VariantInfo,
        condition: &ConditionInfo,
        assertion: &XmlNode,
    ) -> Result<Submission> {
        let accession = assertion
            .find_with(&["ClinVarAccession"], "Type", "SCV")
            .ok_or(ExtractError::MissingElement("SCV accession"))?;
        let scv = accession
            .attr("Acc")
            .ok_or(ExtractError::MissingElement("SCV accession"))?
            .to_string();

        let submitter_id = accession
            .attr("OrgID")
            .and_then(|id| id.trim().parse::<i64>().ok())
            .unwrap_or(0);
        let submitter_name = assertion
            .child("ClinVarSubmissionID")
            .and_then(|el| el.attr("submitter"))
            .unwrap_or("")
            .to_string();

        let clinical = assertion.child("ClinicalSignificance");
        let clinical_text = |name: &str| clinical.and_then(|c| c.child(name)).and_then(XmlNode::text);

        let significance = clinical_text("Description")
            .map(str::to_lowercase)
            .unwrap_or_else(|| NOT_PROVIDED.to_string());
        let normalized_significance = self.significance.normalize(&significance).to_string();
        let review_status = clinical_text("ReviewStatus").unwrap_or("").to_string();
        let comment = clinical_text("Comment").unwrap_or("").to_string();
        let last_eval = clinical
            .and_then(|c| c.attr("DateLastEvaluated"))
            .unwrap_or("")
            .to_string();

        let method = assertion
            .find_all(&["ObservedIn", "Method", "MethodType"])
            .into_iter()
            .find_map(XmlNode::text)
            .unwrap_or(NOT_PROVIDED)
            .to_string();

        let normalized_genes = variant.genes.normalized();
        Ok(Submission {
            date: date.to_string(),
            variant_id: variant.id,
            variant_name: variant.name.clone(),
            allele_frequency: variant.allele_frequency,
            rsid: variant.rsid.clone(),
            gene: variant.genes.joined(),
            gene_type: variant.genes.multiplicity(),
            normalized_gene: normalized_genes.joined(),
            normalized_gene_type: normalized_genes.multiplicity(),
            submitter_id,
            submitter_country_code: self.submitters.country_code(submitter_id).to_string(),
            submitter_name,
            rcv: rcv.to_string(),
            scv,
            significance,
            normalized_significance,
            last_eval,
            star_level: star_level(&review_status),
            review_status,
            condition_name: condition.name.clone(),
            condition_xrefs: condition.xrefs.clone(),
            condition_term_id: condition.primary_term.clone(),
            normalized_method: normalize_method(&method).to_string(),
            method,
            comment,
        })
    }
}

fn trait_xrefs(reference: &XmlNode) -> Vec<&XmlNode> {
    let mut out = Vec::new();
    for trait_el in reference.find_all(&["TraitSet", "Trait"]) {
        trait_el.descendants("XRef", &mut out);
    }
    out
}

fn preferred_name(node: &XmlNode) -> Option<&str> {
    node.find_with(&["Name", "ElementValue"], "Type", "Preferred")
        .and_then(XmlNode::text)
}

fn variant_info(reference: &XmlNode) -> VariantInfo {
    // compound genotypes wrap one MeasureSet per haplotype
    let (id, name, measures) = match reference.child("GenotypeSet") {
        Some(genotype) => (
            parse_id(genotype),
            preferred_name(genotype),
            genotype.find_all(&["MeasureSet", "Measure"]),
        ),
        None => match reference.child("MeasureSet") {
            Some(measure_set) => (
                parse_id(measure_set),
                preferred_name(measure_set),
                measure_set.find_all(&["Measure"]),
            ),
            None => (0, None, Vec::new()),
        },
    };

    let single = match measures.as_slice() {
        [only] => Some(*only),
        _ => None,
    };
    let rsid = single
        .and_then(|m| m.find_with(&["XRef"], "Type", "rs"))
        .and_then(|x| x.attr("ID"))
        .map(|id| format!("rs{id}"))
        .unwrap_or_default();
    let allele_frequency = single.and_then(allele_frequency);

    VariantInfo {
        id,
        name: name.map(str::to_string).unwrap_or_else(|| id.to_string()),
        rsid,
        allele_frequency,
        genes: GeneSet::from_measures(&measures),
    }
}

fn parse_id(node: &XmlNode) -> i64 {
    node.attr("ID")
        .and_then(|id| id.trim().parse().ok())
        .unwrap_or(0)
}

/// Global minor allele frequency, else the largest per-population frequency.
fn allele_frequency(measure: &XmlNode) -> Option<f64> {
    let value = |el: &XmlNode| el.attr("Value").and_then(|v| v.trim().parse::<f64>().ok());

    if let Some(global) = measure.child("GlobalMinorAlleleFrequency").and_then(value) {
        return Some(global);
    }
    let mut frequencies = Vec::new();
    measure.descendants("AlleleFrequency", &mut frequencies);
    frequencies
        .into_iter()
        .filter_map(value)
        .filter(|f| f.is_finite())
        .fold(None, |max: Option<f64>, f| Some(max.map_or(f, |m| m.max(f))))
}
