//! Pairwise comparison rows for submissions about the same variant.
//!
//! A partition is every submission sharing (date, variant id, variant name).
//! Each partition yields its full ordered cross product, self pairs included,
//! so `n` submissions give `n²` rows.
//!
//! Before pairing, primary ontology terms are reconciled inside each
//! partition: a term with an ancestor elsewhere in the partition is lifted
//! to the most general such ancestor. Two labs calling the same variant
//! against "cardiomyopathy" and "dilated cardiomyopathy" then share a term
//! and get an ontology-aware conflict level.

use crate::conflict::classify_submissions;
use crate::ontology::{Ontology, TermId};
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;
use varminer_common::UnresolvedConditionPolicy;
use varminer_db::{Comparison, Submission};

/// Indices of `submissions` grouped by (date, variant id, variant name), in key order.
pub fn partition(submissions: &[Submission]) -> Vec<Vec<usize>> {
    let mut groups: BTreeMap<(&str, i64, &str), Vec<usize>> = BTreeMap::new();
    for (i, s) in submissions.iter().enumerate() {
        groups
            .entry((s.date.as_str(), s.variant_id, s.variant_name.as_str()))
            .or_default()
            .push(i);
    }
    groups.into_values().collect()
}

pub struct ComparisonBuilder<'o> {
    ontology: &'o Ontology,
    policy: UnresolvedConditionPolicy,
}

impl<'o> ComparisonBuilder<'o> {
    pub fn new(ontology: &'o Ontology, policy: UnresolvedConditionPolicy) -> Self {
        Self { ontology, policy }
    }

    /// Lift descendant terms to the most general related term of their
    /// partition. Returns how many submissions changed.
    pub fn reconcile_primary_terms(&self, submissions: &mut [Submission]) -> usize {
        let mut changed = 0;
        for group in partition(submissions) {
            let terms: BTreeSet<TermId> = group
                .iter()
                .filter_map(|&i| self.term_of(&submissions[i]))
                .collect();
            if terms.len() < 2 {
                continue;
            }

            for &i in &group {
                let Some(current) = self.term_of(&submissions[i]) else {
                    continue;
                };
                let general = self.most_general_ancestor_in(current, &terms);
                if general != current {
                    submissions[i].condition_term_id = Some(self.ontology.curie(general).to_string());
                    changed += 1;
                }
            }
        }
        debug!(changed, "reconciled primary terms");
        changed
    }

    fn term_of(&self, submission: &Submission) -> Option<TermId> {
        submission
            .condition_term_id
            .as_deref()
            .and_then(|curie| self.ontology.id_of(curie))
    }

    /// `term` itself when nothing in `terms` is its ancestor.
    fn most_general_ancestor_in(&self, term: TermId, terms: &BTreeSet<TermId>) -> TermId {
        let onto = self.ontology;
        let related: Vec<TermId> = terms
            .iter()
            .copied()
            .filter(|&t| t == term || onto.is_descendant_of(term, t))
            .collect();

        related
            .iter()
            .copied()
            .filter(|&t| !related.iter().any(|&u| u != t && onto.is_descendant_of(t, u)))
            .min_by(|&a, &b| onto.curie(a).cmp(onto.curie(b)))
            .unwrap_or(term)
    }

    /// Classify one ordered pair.
    pub fn compare<'a>(&self, subject: &'a Submission, other: &'a Submission) -> Comparison<'a> {
        compare_with(self.policy, subject, other)
    }

    /// Every ordered pair of every partition, produced lazily.
    pub fn comparisons<'a>(
        &self,
        submissions: &'a [Submission],
    ) -> impl Iterator<Item = Comparison<'a>> + 'a {
        let policy = self.policy;
        partition(submissions).into_iter().flat_map(move |group| {
            let n = group.len();
            (0..n * n).map(move |k| {
                compare_with(policy, &submissions[group[k / n]], &submissions[group[k % n]])
            })
        })
    }
}

fn compare_with<'a>(
    policy: UnresolvedConditionPolicy,
    subject: &'a Submission,
    other: &'a Submission,
) -> Comparison<'a> {
    let conflict_level = classify_submissions(subject, other);
    let normalized_conflict_level = match (&subject.condition_term_id, &other.condition_term_id) {
        (Some(a), Some(b)) if a == b => Some(conflict_level),
        (Some(_), Some(_)) => None,
        _ => match policy {
            UnresolvedConditionPolicy::Unset => None,
            UnresolvedConditionPolicy::PlainLevel => Some(conflict_level),
        },
    };

    Comparison {
        subject,
        other,
        conflict_level,
        normalized_conflict_level,
    }
}
