//! Condition name ↔ ontology term rows.
//!
//! Each distinct (condition name, cross-reference set) of a release is linked
//! to every term it matches exactly and to every named, non-deprecated
//! ancestor of those terms, so a report on "cardiomyopathy" also finds
//! submissions filed under "dilated cardiomyopathy".

use crate::ontology::{Ontology, TermId};
use std::collections::BTreeSet;
use varminer_db::{ConditionTermRow, Submission};

pub fn condition_term_rows(
    ontology: &Ontology,
    date: &str,
    submissions: &[Submission],
) -> Vec<ConditionTermRow> {
    let conditions: BTreeSet<(&str, &[String])> = submissions
        .iter()
        .filter(|s| s.date == date)
        .map(|s| (s.condition_name.as_str(), s.condition_xrefs.as_slice()))
        .collect();

    let mut rows = BTreeSet::new();
    for (condition_name, xrefs) in conditions {
        for matched in ontology.matches(condition_name, xrefs) {
            let mut linked: Vec<TermId> = ontology.ancestors(matched).into_iter().collect();
            linked.push(matched);

            for term_id in linked {
                let term = ontology.term(term_id);
                let Some(term_name) = &term.name else {
                    continue;
                };
                if term.deprecated {
                    continue;
                }
                rows.insert(ConditionTermRow {
                    date: date.to_string(),
                    term_id: term.curie.clone(),
                    term_name: term_name.clone(),
                    condition_name: condition_name.to_string(),
                });
            }
        }
    }
    rows.into_iter().collect()
}
