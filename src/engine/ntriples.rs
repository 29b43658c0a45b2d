//! N-Triples reader

use super::curie::contract;
use super::kgx::{GraphBuilder, KgxEdge};
use super::traits::EngineError;
use oxrdf::{Subject, Term};
use oxrdfio::{RdfFormat, RdfParser};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

const RDF_TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";
const RDFS_LABEL: &str = "http://www.w3.org/2000/01/rdf-schema#label";
const RDFS_SUBCLASS_OF: &str = "http://www.w3.org/2000/01/rdf-schema#subClassOf";
const SKOS_PREF_LABEL: &str = "http://www.w3.org/2004/02/skos/core#prefLabel";
const SKOS_ALT_LABEL: &str = "http://www.w3.org/2004/02/skos/core#altLabel";
const DESCRIPTIONS: &[&str] = &[
    "http://purl.org/dc/terms/description",
    "http://www.w3.org/2004/02/skos/core#definition",
    "http://purl.obolibrary.org/obo/IAO_0000115",
];

fn subject_id(subject: &Subject) -> Option<String> {
    match subject {
        Subject::NamedNode(n) => Some(contract(n.as_str())),
        Subject::BlankNode(b) => Some(format!("_:{}", b.as_str())),
        #[allow(unreachable_patterns)]
        _ => None,
    }
}

fn predicate(iri: &str) -> &'static str {
    match iri {
        RDFS_SUBCLASS_OF => "biolink:subclass_of",
        _ => "biolink:related_to",
    }
}

/// Load N-Triples into `builder`.
///
/// Every subject becomes a node. `rdf:type` fills the category, labels and
/// definitions fill name and description, and any other triple whose object
/// is a resource becomes an edge. Remaining literals are dropped.
pub(crate) fn load(path: &Path, builder: &mut GraphBuilder) -> Result<(), EngineError> {
    let file = File::open(path).map_err(EngineError::io(path))?;

    for quad in RdfParser::from_format(RdfFormat::NTriples).for_reader(BufReader::new(file)) {
        let quad = quad.map_err(|e| EngineError::GraphParse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let Some(subject) = subject_id(&quad.subject) else {
            continue;
        };
        let pred = quad.predicate.as_str();

        let object = match &quad.object {
            Term::NamedNode(n) => contract(n.as_str()),
            Term::BlankNode(b) => format!("_:{}", b.as_str()),
            Term::Literal(literal) => {
                let value = literal.value().to_string();
                let node = builder.node_mut(&subject);
                match pred {
                    RDFS_LABEL | SKOS_PREF_LABEL => {
                        node.name.get_or_insert(value);
                    }
                    SKOS_ALT_LABEL => node.synonym.push(value),
                    p if DESCRIPTIONS.contains(&p) => {
                        node.description.get_or_insert(value);
                    }
                    _ => {}
                }
                continue;
            }
            #[allow(unreachable_patterns)]
            _ => continue,
        };

        if pred == RDF_TYPE {
            let node = builder.node_mut(&subject);
            if !node.category.contains(&object) {
                node.category.push(object);
            }
            continue;
        }

        builder.node_mut(&subject);
        builder.add_edge(KgxEdge {
            subject,
            predicate: predicate(pred).to_string(),
            object,
            relation: contract(pred),
        });
    }
    Ok(())
}
