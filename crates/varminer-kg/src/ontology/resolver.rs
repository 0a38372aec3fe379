//! Read-only queries over the term graph.
//!
//! All traversals are iterative and track visited terms, so a malformed
//! document with a parent cycle still terminates.

use super::graph::{Ontology, TermId};
use ahash::AHashSet;
use std::collections::BTreeSet;

impl Ontology {
    /// Term for a CURIE of this ontology or for an external cross-reference.
    /// Deprecated terms don't resolve.
    pub fn resolve_ref(&self, reference: &str) -> Option<TermId> {
        self.id_of(reference)
            .filter(|&id| {
                let term = self.term(id);
                term.defined && !term.deprecated
            })
            .or_else(|| self.by_xref.get(&reference.to_uppercase()).copied())
    }

    /// Exact matches: each cross-reference (an external id or a term id), plus
    /// the condition name compared case-insensitively against labels and
    /// exact synonyms.
    pub fn matches<S: AsRef<str>>(&self, condition_name: &str, xrefs: &[S]) -> BTreeSet<TermId> {
        let mut found: BTreeSet<TermId> = xrefs
            .iter()
            .filter_map(|x| self.resolve_ref(x.as_ref()))
            .collect();
        if let Some(&id) = self.by_name.get(&condition_name.to_lowercase()) {
            found.insert(id);
        }
        found
    }

    /// Every term reachable through one or more parent edges.
    pub fn ancestors(&self, term: TermId) -> AHashSet<TermId> {
        let mut seen = AHashSet::new();
        let mut stack: Vec<TermId> = self.parents(term).to_vec();
        while let Some(next) = stack.pop() {
            if seen.insert(next) {
                stack.extend_from_slice(self.parents(next));
            }
        }
        seen
    }

    /// True when `ancestor` is reachable from `descendant` via at least one
    /// parent edge. A term is not its own descendant.
    pub fn is_descendant_of(&self, descendant: TermId, ancestor: TermId) -> bool {
        let mut seen = AHashSet::new();
        let mut stack: Vec<TermId> = self.parents(descendant).to_vec();
        while let Some(next) = stack.pop() {
            if next == ancestor {
                return true;
            }
            if seen.insert(next) {
                stack.extend_from_slice(self.parents(next));
            }
        }
        false
    }

    /// Drop every term that is a proper ancestor of another term in the set.
    pub fn most_specific(&self, terms: &BTreeSet<TermId>) -> BTreeSet<TermId> {
        terms
            .iter()
            .copied()
            .filter(|&candidate| {
                !terms
                    .iter()
                    .any(|&other| other != candidate && self.is_descendant_of(other, candidate))
            })
            .collect()
    }

    pub fn most_specific_matches<S: AsRef<str>>(
        &self,
        condition_name: &str,
        xrefs: &[S],
    ) -> BTreeSet<TermId> {
        self.most_specific(&self.matches(condition_name, xrefs))
    }

    /// Most specific term shared by every input (a term counts as its own
    /// ancestor here).
    ///
    /// When several shared terms are equally specific the lexicographically
    /// smallest CURIE wins. Inputs with nothing in common give the root;
    /// an empty input gives `None`.
    pub fn lowest_common_ancestor(&self, terms: &[TermId]) -> Option<TermId> {
        let (&first, rest) = terms.split_first()?;

        let with_self = |t: TermId| {
            let mut set = self.ancestors(t);
            set.insert(t);
            set
        };

        let mut common = with_self(first);
        for &t in rest {
            let other = with_self(t);
            common.retain(|c| other.contains(c));
            if common.is_empty() {
                return Some(self.root());
            }
        }

        common
            .iter()
            .copied()
            .filter(|&c| {
                !common
                    .iter()
                    .any(|&d| d != c && self.is_descendant_of(d, c))
            })
            .min_by(|&a, &b| self.curie(a).cmp(self.curie(b)))
            .or(Some(self.root()))
    }

    /// The single term summarising a condition: the lowest common ancestor of
    /// its most specific matches.
    pub fn primary_term<S: AsRef<str>>(&self, condition_name: &str, xrefs: &[S]) -> Option<TermId> {
        let specific: Vec<TermId> = self
            .most_specific_matches(condition_name, xrefs)
            .into_iter()
            .collect();
        self.lowest_common_ancestor(&specific)
    }
}

#[cfg(test)]
mod tests {
    use super::super::graph::{OntologyBuilder, Term};
    use super::super::loader::tests::sample_ontology;
    use super::*;

    fn id(onto: &Ontology, curie: &str) -> TermId {
        onto.id_of(curie).unwrap()
    }

    fn curies(onto: &Ontology, ids: impl IntoIterator<Item = TermId>) -> Vec<String> {
        let mut out: Vec<String> = ids.into_iter().map(|t| onto.curie(t).to_string()).collect();
        out.sort();
        out
    }

    #[test]
    fn test_matches_by_xref_name_and_term_id() {
        let onto = sample_ontology();
        let none: [&str; 0] = [];

        assert_eq!(
            curies(&onto, onto.matches("blank", &["omim:134640"])),
            vec!["MONDO:0005546"]
        );
        assert_eq!(
            curies(&onto, onto.matches("Fibromyalgia Syndrome", &none)),
            vec!["MONDO:0005546"]
        );
        assert_eq!(
            curies(&onto, onto.matches("disease involving pain", &["MONDO:0100094"])),
            vec!["MONDO:0021668", "MONDO:0100094"]
        );
        assert!(onto.matches("fibromyalgi", &none).is_empty());
    }

    #[test]
    fn test_deprecated_terms_never_match() {
        let onto = sample_ontology();
        let none: [&str; 0] = [];
        assert!(onto.matches("obsolete pain disorder", &none).is_empty());
        assert!(onto.matches("x", &["OMIM:999999", "MONDO:0000099"]).is_empty());
    }

    #[test]
    fn test_ancestors_are_transitive_and_diamond_safe() {
        let onto = sample_ontology();
        let fibro = id(&onto, "MONDO:0005546");
        let ancestors = onto.ancestors(fibro);
        assert_eq!(
            curies(&onto, ancestors.iter().copied()),
            vec!["MONDO:0000001", "MONDO:0002254", "MONDO:0021668"]
        );
        for &a in &ancestors {
            for b in onto.ancestors(a) {
                assert!(ancestors.contains(&b));
            }
        }
        assert!(onto.ancestors(onto.root()).is_empty());
    }

    #[test]
    fn test_is_descendant_of() {
        let onto = sample_ontology();
        let pain = id(&onto, "MONDO:0021668");
        let fibro = id(&onto, "MONDO:0005546");
        let chs = id(&onto, "MONDO:0100094");

        assert!(onto.is_descendant_of(chs, pain));
        assert!(onto.is_descendant_of(fibro, pain));
        assert!(!onto.is_descendant_of(pain, chs));
        assert!(!onto.is_descendant_of(fibro, chs));
        assert!(!onto.is_descendant_of(fibro, fibro));
    }

    #[test]
    fn test_most_specific_matches_is_an_antichain_and_idempotent() {
        let onto = sample_ontology();
        let refs = ["MONDO:0000001", "MONDO:0021668", "MONDO:0005546", "UMLS:C3534069"];
        let specific = onto.most_specific_matches("syndromic disease", &refs);
        assert_eq!(
            curies(&onto, specific.iter().copied()),
            vec!["MONDO:0005546", "MONDO:0100094"]
        );
        for &a in &specific {
            for &b in &specific {
                assert!(!onto.is_descendant_of(a, b));
            }
        }
        assert_eq!(onto.most_specific(&specific), specific);
    }

    #[test]
    fn test_lca_of_ancestor_descendant_pair_is_the_ancestor() {
        let onto = sample_ontology();
        let pain = id(&onto, "MONDO:0021668");
        let fibro = id(&onto, "MONDO:0005546");
        assert_eq!(onto.lowest_common_ancestor(&[fibro, pain]), Some(pain));
        assert_eq!(onto.lowest_common_ancestor(&[fibro]), Some(fibro));
        assert_eq!(onto.lowest_common_ancestor(&[]), None);
    }

    #[test]
    fn test_lca_of_siblings() {
        let onto = sample_ontology();
        let fibro = id(&onto, "MONDO:0005546");
        let chs = id(&onto, "MONDO:0100094");
        let lca = onto.lowest_common_ancestor(&[fibro, chs]).unwrap();
        assert_eq!(onto.curie(lca), "MONDO:0021668");
    }

    #[test]
    fn test_lca_falls_back_to_root_when_nothing_is_shared() {
        let mut b = OntologyBuilder::new("MONDO:0000001");
        for curie in ["MONDO:0000002", "MONDO:0000003"] {
            b.define(
                Term {
                    curie: curie.into(),
                    ..Default::default()
                },
                &[],
            );
        }
        let onto = b.build();
        let lca = onto
            .lowest_common_ancestor(&[id(&onto, "MONDO:0000002"), id(&onto, "MONDO:0000003")])
            .unwrap();
        assert_eq!(lca, onto.root());
    }

    #[test]
    fn test_lca_tie_breaks_on_smallest_curie() {
        // two unrelated parents shared by both children
        let mut b = OntologyBuilder::new("MONDO:0000001");
        let t = |c: &str| Term {
            curie: c.into(),
            ..Default::default()
        };
        let parents = vec!["MONDO:0000020".to_string(), "MONDO:0000010".to_string()];
        b.define(t("MONDO:0000020"), &[]);
        b.define(t("MONDO:0000010"), &[]);
        b.define(t("MONDO:0000031"), &parents);
        b.define(t("MONDO:0000032"), &parents);
        let onto = b.build();

        let lca = onto
            .lowest_common_ancestor(&[id(&onto, "MONDO:0000031"), id(&onto, "MONDO:0000032")])
            .unwrap();
        assert_eq!(onto.curie(lca), "MONDO:0000010");
    }

    #[test]
    fn test_primary_term() {
        let onto = sample_ontology();
        let none: [&str; 0] = [];
        let primary = onto
            .primary_term("fibromyalgia", &["UMLS:C3534069", "MONDO:0021668"])
            .unwrap();
        assert_eq!(onto.curie(primary), "MONDO:0021668");
        assert!(onto.primary_term("not specified", &none).is_none());
    }

    #[test]
    fn test_cycle_terminates() {
        let mut b = OntologyBuilder::new("MONDO:0000001");
        let t = |c: &str| Term {
            curie: c.into(),
            ..Default::default()
        };
        b.define(t("MONDO:0000002"), &["MONDO:0000003".to_string()]);
        b.define(t("MONDO:0000003"), &["MONDO:0000002".to_string()]);
        let onto = b.build();
        let a = id(&onto, "MONDO:0000002");
        assert_eq!(onto.ancestors(a).len(), 2);
        assert!(!onto.is_descendant_of(a, onto.root()));
    }
}
