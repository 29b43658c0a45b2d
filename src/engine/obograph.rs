//! OBO Graph JSON reader

use super::curie::contract;
use super::kgx::{GraphBuilder, KgxEdge};
use super::traits::EngineError;
use serde::Deserialize;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

#[derive(Debug, Deserialize)]
struct GraphDocument {
    #[serde(default)]
    graphs: Vec<OboGraph>,
}

#[derive(Debug, Deserialize)]
struct OboGraph {
    #[serde(default)]
    nodes: Vec<OboNode>,
    #[serde(default)]
    edges: Vec<OboEdge>,
}

#[derive(Debug, Deserialize)]
struct OboNode {
    id: String,
    lbl: Option<String>,
    #[serde(rename = "type")]
    node_type: Option<String>,
    meta: Option<OboMeta>,
}

#[derive(Debug, Default, Deserialize)]
struct OboMeta {
    definition: Option<Value>,
    #[serde(default)]
    synonyms: Vec<Value>,
    #[serde(default)]
    xrefs: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct Value {
    val: String,
}

#[derive(Debug, Deserialize)]
struct OboEdge {
    sub: String,
    pred: String,
    obj: String,
}

fn category(node_type: Option<&str>) -> &'static str {
    match node_type {
        Some("CLASS") => "biolink:OntologyClass",
        _ => "biolink:NamedThing",
    }
}

/// Biolink predicate and original relation for an OBO Graph predicate.
fn predicate(pred: &str) -> (String, String) {
    match pred {
        "is_a" => ("biolink:subclass_of".to_string(), "rdfs:subClassOf".to_string()),
        other => {
            let relation = contract(other);
            let predicate = match relation.as_str() {
                "BFO:0000050" => "biolink:part_of",
                "BFO:0000051" => "biolink:has_part",
                _ => "biolink:related_to",
            };
            (predicate.to_string(), relation)
        }
    }
}

/// Load every graph in an OBO Graph JSON document into `builder`.
///
/// Property nodes describe the ontology's relations rather than entities
/// and are not emitted.
pub(crate) fn load(path: &Path, builder: &mut GraphBuilder) -> Result<(), EngineError> {
    let file = File::open(path).map_err(EngineError::io(path))?;
    let document: GraphDocument =
        serde_json::from_reader(BufReader::new(file)).map_err(|source| EngineError::Json {
            path: path.to_path_buf(),
            source,
        })?;

    for graph in document.graphs {
        for node in graph.nodes {
            if node.node_type.as_deref() == Some("PROPERTY") {
                continue;
            }
            let id = contract(&node.id);
            let entry = builder.node_mut(&id);
            let class = category(node.node_type.as_deref()).to_string();
            if !entry.category.contains(&class) {
                entry.category.push(class);
            }
            if node.lbl.is_some() {
                entry.name = node.lbl;
            }
            let meta = node.meta.unwrap_or_default();
            if let Some(definition) = meta.definition {
                entry.description = Some(definition.val);
            }
            entry.synonym.extend(meta.synonyms.into_iter().map(|s| s.val));
            entry.xref.extend(meta.xrefs.into_iter().map(|x| x.val));
        }

        for edge in graph.edges {
            let (predicate, relation) = predicate(&edge.pred);
            builder.add_edge(KgxEdge {
                subject: contract(&edge.sub),
                predicate,
                object: contract(&edge.obj),
                relation,
            });
        }
    }
    Ok(())
}
