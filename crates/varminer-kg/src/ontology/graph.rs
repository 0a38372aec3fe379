//! Arena-backed ontology term graph.
//!
//! Terms are interned into a dense `Vec` and addressed by [`TermId`]; parent
//! edges are adjacency lists indexed the same way. The graph is immutable once
//! built and is shared by reference across extraction workers.

use ahash::AHashMap;

/// Dense index of a term in its [`Ontology`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TermId(u32);

impl TermId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// One ontology class.
#[derive(Debug, Clone, Default)]
pub struct Term {
    /// Compact id, e.g. `MONDO:0005546`
    pub curie: String,
    pub name: Option<String>,
    pub synonyms: Vec<String>,
    /// External ids, e.g. `OMIM:114480`, as written in the document
    pub xrefs: Vec<String>,
    pub deprecated: bool,
    /// False for ids only seen as parent references
    pub defined: bool,
}

/// Term graph with lookup indices.
#[derive(Debug)]
pub struct Ontology {
    pub(crate) terms: Vec<Term>,
    pub(crate) parents: Vec<Vec<TermId>>,
    pub(crate) by_curie: AHashMap<String, TermId>,
    /// Upper-cased external id → term
    pub(crate) by_xref: AHashMap<String, TermId>,
    /// Lower-cased label or exact synonym → term
    pub(crate) by_name: AHashMap<String, TermId>,
    pub(crate) root: TermId,
}

impl Ontology {
    pub fn term(&self, id: TermId) -> &Term {
        &self.terms[id.index()]
    }

    pub fn curie(&self, id: TermId) -> &str {
        &self.terms[id.index()].curie
    }

    pub fn name(&self, id: TermId) -> Option<&str> {
        self.terms[id.index()].name.as_deref()
    }

    pub fn parents(&self, id: TermId) -> &[TermId] {
        &self.parents[id.index()]
    }

    pub fn id_of(&self, curie: &str) -> Option<TermId> {
        self.by_curie.get(curie).copied()
    }

    /// Returned by [`Ontology::lowest_common_ancestor`] when inputs share nothing.
    pub fn root(&self) -> TermId {
        self.root
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn xref_count(&self) -> usize {
        self.by_xref.len()
    }

    pub fn name_count(&self) -> usize {
        self.by_name.len()
    }
}

// ── Builder ──────────────────────────────────────────────────────────────────

/// Collects classes in document order, then freezes them into an [`Ontology`].
#[derive(Debug)]
pub struct OntologyBuilder {
    terms: Vec<Term>,
    parents: Vec<Vec<TermId>>,
    by_curie: AHashMap<String, TermId>,
    root: TermId,
}

impl OntologyBuilder {
    /// `root_curie` is always interned, whether or not the document defines it.
    pub fn new(root_curie: &str) -> Self {
        let mut builder = Self {
            terms: Vec::new(),
            parents: Vec::new(),
            by_curie: AHashMap::new(),
            root: TermId(0),
        };
        builder.root = builder.intern(root_curie);
        builder
    }

    /// Id for `curie`, creating a placeholder term on first sight.
    pub fn intern(&mut self, curie: &str) -> TermId {
        if let Some(&id) = self.by_curie.get(curie) {
            return id;
        }
        let id = TermId(self.terms.len() as u32);
        self.terms.push(Term {
            curie: curie.to_string(),
            ..Term::default()
        });
        self.parents.push(Vec::new());
        self.by_curie.insert(curie.to_string(), id);
        id
    }

    /// Record a class definition. A repeated definition merges into the first.
    pub fn define(&mut self, term: Term, parent_curies: &[String]) -> TermId {
        let id = self.intern(&term.curie);
        let parent_ids: Vec<TermId> = parent_curies.iter().map(|p| self.intern(p)).collect();

        let slot = &mut self.terms[id.index()];
        if slot.name.is_none() {
            slot.name = term.name;
        }
        slot.synonyms.extend(term.synonyms);
        slot.xrefs.extend(term.xrefs);
        slot.deprecated |= term.deprecated;
        slot.defined = true;

        let edges = &mut self.parents[id.index()];
        for parent in parent_ids {
            if parent != id && !edges.contains(&parent) {
                edges.push(parent);
            }
        }
        id
    }

    pub fn build(self) -> Ontology {
        let mut by_xref = AHashMap::new();
        let mut by_name = AHashMap::new();

        let live = self
            .terms
            .iter()
            .enumerate()
            .filter(|(_, t)| t.defined && !t.deprecated)
            .map(|(i, t)| (TermId(i as u32), t));

        // Labels first so a synonym never displaces another term's label.
        for (id, term) in live.clone() {
            if let Some(name) = &term.name {
                by_name.insert(name.to_lowercase(), id);
            }
        }
        for (id, term) in live {
            for synonym in &term.synonyms {
                by_name.entry(synonym.to_lowercase()).or_insert(id);
            }
            for xref in &term.xrefs {
                by_xref.entry(xref.to_uppercase()).or_insert(id);
            }
        }

        Ontology {
            terms: self.terms,
            parents: self.parents,
            by_curie: self.by_curie,
            by_xref,
            by_name,
            root: self.root,
        }
    }
}
