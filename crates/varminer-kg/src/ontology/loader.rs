//! OWL (RDF/XML) ontology loader.
//!
//! Reads the document as a stream of events and keeps only what the resolver
//! needs from each top-level `owl:Class`:
//!
//! - `rdf:about` IRI, turned into a CURIE when it carries the configured prefix
//! - `rdfs:label`, `oboInOwl:hasExactSynonym`, `oboInOwl:hasDbXref`
//! - `rdfs:subClassOf rdf:resource=…` as a parent edge (restrictions ignored)
//! - `owl:deprecated`

use super::graph::{Ontology, OntologyBuilder, Term};
use anyhow::{Context, Result};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::info;
use varminer_common::SourcesConfig;

const OBO_IRI_BASE: &str = "http://purl.obolibrary.org/obo/";

/// `http://purl.obolibrary.org/obo/MONDO_0005546` → `MONDO:0005546`.
pub fn iri_to_curie(iri: &str, prefix: &str) -> Option<String> {
    let local = iri
        .strip_prefix(OBO_IRI_BASE)?
        .strip_prefix(prefix)?
        .strip_prefix('_')?;
    if local.is_empty() {
        return None;
    }
    Some(format!("{prefix}:{local}"))
}

/// Load the ontology named in the sources configuration.
pub fn load_from_config(sources: &SourcesConfig) -> Result<Ontology> {
    load_ontology(&sources.ontology, &sources.ontology_prefix, &sources.ontology_root)
}

pub fn load_ontology(path: &Path, prefix: &str, root: &str) -> Result<Ontology> {
    let file = File::open(path)
        .with_context(|| format!("Cannot open ontology file: {}", path.display()))?;
    let ontology = parse_ontology(BufReader::new(file), prefix, root)
        .with_context(|| format!("Cannot parse ontology file: {}", path.display()))?;
    info!(
        path = %path.display(),
        terms = ontology.len(),
        xrefs = ontology.xref_count(),
        names = ontology.name_count(),
        "Loaded ontology"
    );
    Ok(ontology)
}

/// Class element currently being read, plus the direct child whose text we want.
#[derive(Default)]
struct ClassState {
    term: Option<Term>,
    parents: Vec<String>,
    field: Option<Field>,
    text: String,
}

#[derive(Clone, Copy)]
enum Field {
    Label,
    Synonym,
    Xref,
    Deprecated,
}

impl Field {
    fn from_tag(tag: &[u8]) -> Option<Self> {
        match tag {
            b"rdfs:label" => Some(Self::Label),
            b"oboInOwl:hasExactSynonym" => Some(Self::Synonym),
            b"oboInOwl:hasDbXref" => Some(Self::Xref),
            b"owl:deprecated" => Some(Self::Deprecated),
            _ => None,
        }
    }
}

pub fn parse_ontology<R: BufRead>(reader: R, prefix: &str, root: &str) -> Result<Ontology> {
    let mut xml = Reader::from_reader(reader);
    xml.config_mut().trim_text(true);

    let mut builder = OntologyBuilder::new(root);
    let mut state = ClassState::default();
    // 0 outside rdf:RDF, 1 for its direct children
    let mut depth = 0usize;
    let mut buf = Vec::new();

    loop {
        match xml.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => {
                depth += 1;
                match depth {
                    2 if e.name().as_ref() == b"owl:Class" => {
                        state = ClassState::default();
                        state.term = class_term(&e, prefix)?;
                    }
                    3 if state.term.is_some() => {
                        state.field = Field::from_tag(e.name().as_ref());
                        state.text.clear();
                        if e.name().as_ref() == b"rdfs:subClassOf" {
                            push_parent(&e, prefix, &mut state.parents)?;
                        }
                    }
                    _ => {}
                }
            }
            Ok(Event::Empty(e)) => {
                if depth == 2 && state.term.is_some() && e.name().as_ref() == b"rdfs:subClassOf" {
                    push_parent(&e, prefix, &mut state.parents)?;
                }
            }
            Ok(Event::Text(e)) => {
                if depth == 3 && state.field.is_some() {
                    state.text.push_str(&e.unescape()?);
                }
            }
            Ok(Event::CData(e)) => {
                if depth == 3 && state.field.is_some() {
                    state.text.push_str(&String::from_utf8_lossy(&e));
                }
            }
            Ok(Event::End(_)) => {
                match depth {
                    3 => finish_field(&mut state),
                    2 => {
                        if let Some(term) = state.term.take() {
                            builder.define(term, &state.parents);
                        }
                    }
                    _ => {}
                }
                depth = depth.saturating_sub(1);
            }
            Ok(Event::Eof) => break,
            Err(e) => anyhow::bail!(
                "XML parsing error at byte {}: {:?}",
                xml.buffer_position(),
                e
            ),
            _ => {}
        }
        buf.clear();
    }

    Ok(builder.build())
}

fn class_term(e: &BytesStart<'_>, prefix: &str) -> Result<Option<Term>> {
    let Some(about) = attribute(e, b"rdf:about")? else {
        return Ok(None);
    };
    Ok(iri_to_curie(&about, prefix).map(|curie| Term {
        curie,
        ..Term::default()
    }))
}

fn push_parent(e: &BytesStart<'_>, prefix: &str, parents: &mut Vec<String>) -> Result<()> {
    if let Some(resource) = attribute(e, b"rdf:resource")? {
        if let Some(parent) = iri_to_curie(&resource, prefix) {
            parents.push(parent);
        }
    }
    Ok(())
}

fn attribute(e: &BytesStart<'_>, key: &[u8]) -> Result<Option<String>> {
    for attr in e.attributes() {
        let attr = attr?;
        if attr.key.as_ref() == key {
            return Ok(Some(attr.unescape_value()?.into_owned()));
        }
    }
    Ok(None)
}

fn finish_field(state: &mut ClassState) {
    let (Some(field), Some(term)) = (state.field.take(), state.term.as_mut()) else {
        return;
    };
    let text = std::mem::take(&mut state.text);
    let text = text.trim();
    if text.is_empty() {
        return;
    }
    match field {
        Field::Label => {
            if term.name.is_none() {
                term.name = Some(text.to_string());
            }
        }
        Field::Synonym => term.synonyms.push(text.to_string()),
        Field::Xref => term.xrefs.push(text.to_string()),
        Field::Deprecated => term.deprecated = text.eq_ignore_ascii_case("true"),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Small excerpt in the shape of mondo.owl:
    ///
    /// ```text
    /// 0000001 disease
    /// ├── 0021668 disease involving pain
    /// │   ├── 0002254 syndromic disease ── 0005546 fibromyalgia
    /// │   └── 0100094 cannabinoid hyperemesis syndrome
    /// └── 0002254 syndromic disease
    /// 0000099 obsolete (deprecated)
    /// ```
    pub(crate) const SAMPLE_OWL: &str = r#"<?xml version="1.0"?>
<rdf:RDF xmlns="http://purl.obolibrary.org/obo/mondo.owl#"
     xmlns:owl="http://www.w3.org/2002/07/owl#"
     xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#"
     xmlns:rdfs="http://www.w3.org/2000/01/rdf-schema#"
     xmlns:oboInOwl="http://www.geneontology.org/formats/oboInOwl#">
    <owl:Ontology rdf:about="http://purl.obolibrary.org/obo/mondo.owl"/>
    <owl:Class rdf:about="http://purl.obolibrary.org/obo/MONDO_0000001">
        <rdfs:label>disease</rdfs:label>
    </owl:Class>
    <owl:Class rdf:about="http://purl.obolibrary.org/obo/MONDO_0021668">
        <rdfs:subClassOf rdf:resource="http://purl.obolibrary.org/obo/MONDO_0000001"/>
        <rdfs:label>disease involving pain</rdfs:label>
    </owl:Class>
    <owl:Class rdf:about="http://purl.obolibrary.org/obo/MONDO_0002254">
        <rdfs:subClassOf rdf:resource="http://purl.obolibrary.org/obo/MONDO_0000001"/>
        <rdfs:subClassOf rdf:resource="http://purl.obolibrary.org/obo/MONDO_0021668"/>
        <rdfs:label>syndromic disease</rdfs:label>
    </owl:Class>
    <owl:Class rdf:about="http://purl.obolibrary.org/obo/MONDO_0005546">
        <rdfs:subClassOf rdf:resource="http://purl.obolibrary.org/obo/MONDO_0002254"/>
        <rdfs:subClassOf>
            <owl:Restriction>
                <owl:onProperty rdf:resource="http://purl.obolibrary.org/obo/RO_0002573"/>
                <owl:someValuesFrom rdf:resource="http://purl.obolibrary.org/obo/MONDO_0021668"/>
            </owl:Restriction>
        </rdfs:subClassOf>
        <oboInOwl:hasDbXref rdf:datatype="http://www.w3.org/2001/XMLSchema#string">OMIM:134640</oboInOwl:hasDbXref>
        <oboInOwl:hasDbXref rdf:datatype="http://www.w3.org/2001/XMLSchema#string">UMLS:C0016053</oboInOwl:hasDbXref>
        <oboInOwl:hasExactSynonym rdf:datatype="http://www.w3.org/2001/XMLSchema#string">fibromyalgia syndrome</oboInOwl:hasExactSynonym>
        <rdfs:label rdf:datatype="http://www.w3.org/2001/XMLSchema#string">fibromyalgia</rdfs:label>
    </owl:Class>
    <owl:Class rdf:about="http://purl.obolibrary.org/obo/MONDO_0100094">
        <rdfs:subClassOf rdf:resource="http://purl.obolibrary.org/obo/MONDO_0021668"/>
        <oboInOwl:hasDbXref>UMLS:C3534069</oboInOwl:hasDbXref>
        <rdfs:label>cannabinoid hyperemesis syndrome</rdfs:label>
    </owl:Class>
    <owl:Class rdf:about="http://purl.obolibrary.org/obo/MONDO_0000099">
        <rdfs:subClassOf rdf:resource="http://purl.obolibrary.org/obo/MONDO_0021668"/>
        <oboInOwl:hasDbXref>OMIM:999999</oboInOwl:hasDbXref>
        <owl:deprecated rdf:datatype="http://www.w3.org/2001/XMLSchema#boolean">true</owl:deprecated>
        <rdfs:label>obsolete pain disorder</rdfs:label>
    </owl:Class>
    <owl:Class rdf:about="http://purl.obolibrary.org/obo/HP_0000118">
        <rdfs:label>phenotypic abnormality</rdfs:label>
    </owl:Class>
    <owl:Axiom>
        <owl:annotatedSource rdf:resource="http://purl.obolibrary.org/obo/MONDO_0005546"/>
        <rdfs:label>not a class label</rdfs:label>
    </owl:Axiom>
</rdf:RDF>
"#;

    pub(crate) fn sample_ontology() -> Ontology {
        parse_ontology(SAMPLE_OWL.as_bytes(), "MONDO", "MONDO:0000001").unwrap()
    }

    #[test]
    fn test_iri_to_curie() {
        assert_eq!(
            iri_to_curie("http://purl.obolibrary.org/obo/MONDO_0005546", "MONDO").as_deref(),
            Some("MONDO:0005546")
        );
        assert_eq!(iri_to_curie("http://purl.obolibrary.org/obo/HP_0000118", "MONDO"), None);
        assert_eq!(iri_to_curie("http://example.org/MONDO_1", "MONDO"), None);
        assert_eq!(iri_to_curie("http://purl.obolibrary.org/obo/MONDO_", "MONDO"), None);
    }

    #[test]
    fn test_parse_sample() {
        let onto = sample_ontology();
        // six MONDO classes; HP class and axiom skipped
        assert_eq!(onto.len(), 6);

        let fibro = onto.id_of("MONDO:0005546").unwrap();
        assert_eq!(onto.name(fibro), Some("fibromyalgia"));
        assert_eq!(onto.term(fibro).xrefs, vec!["OMIM:134640", "UMLS:C0016053"]);
        assert_eq!(onto.term(fibro).synonyms, vec!["fibromyalgia syndrome"]);
        // restriction filler is not a parent
        assert_eq!(onto.parents(fibro).len(), 1);
        assert_eq!(onto.curie(onto.parents(fibro)[0]), "MONDO:0002254");

        let syndromic = onto.id_of("MONDO:0002254").unwrap();
        assert_eq!(onto.parents(syndromic).len(), 2);

        let obsolete = onto.id_of("MONDO:0000099").unwrap();
        assert!(onto.term(obsolete).deprecated);
        assert_eq!(onto.curie(onto.root()), "MONDO:0000001");
    }

    #[test]
    fn test_malformed_document_is_an_error() {
        let broken = "<rdf:RDF><owl:Class rdf:about=\"x\"></rdf:RDF>";
        assert!(parse_ontology(broken.as_bytes(), "MONDO", "MONDO:0000001").is_err());
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let err = load_ontology(Path::new("/nonexistent/mondo.owl"), "MONDO", "MONDO:0000001")
            .unwrap_err();
        assert!(err.to_string().contains("Cannot open ontology file"));
    }
}
