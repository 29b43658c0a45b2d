//! KGX TSV output
//!
//! Node and edge tables are tab-separated with a header row, multi-valued
//! cells joined with `|`. Rows keep first-seen order so the same input
//! always produces byte-identical tables.

use super::traits::{EngineError, OutputTables};
use crate::convert::staging::{commit, staging_file};
use std::collections::HashMap;
use std::io::{BufWriter, Write};
use std::path::Path;

pub const NODES_FILE: &str = "nodes.tsv";
pub const EDGES_FILE: &str = "edges.tsv";

/// Columns written by the graph engine.
pub const NODE_COLUMNS: &[&str] = &[
    "id",
    "category",
    "name",
    "description",
    "synonym",
    "xref",
    "provided_by",
];
pub const EDGE_COLUMNS: &[&str] = &[
    "id",
    "subject",
    "predicate",
    "object",
    "relation",
    "primary_knowledge_source",
];

// UUID v5 namespace for generated edge ids
const EDGE_NS: uuid::Uuid = uuid::Uuid::from_bytes([
    0x3f, 0x0d, 0x5a, 0x8e, 0x61, 0x2b, 0x4c, 0x1a, 0x9e, 0x47, 0x0b, 0x6c, 0x2d, 0x81, 0xf3, 0x55,
]);

/// Deterministic id from a list of parts.
pub(crate) fn hash_id(parts: &[&str]) -> String {
    uuid::Uuid::new_v5(&EDGE_NS, parts.join("|").as_bytes()).to_string()
}

/// Keep a cell on one line and inside its column.
fn sanitize(value: &str) -> String {
    value
        .chars()
        .map(|c| if matches!(c, '\t' | '\n' | '\r') { ' ' } else { c })
        .collect()
}

/// Write one table atomically, returning the number of data rows.
pub(crate) fn write_table<S: AsRef<str>>(
    path: &Path,
    columns: &[S],
    rows: &[Vec<String>],
) -> Result<usize, EngineError> {
    let mut staged = staging_file(path).map_err(EngineError::io(path))?;
    {
        let mut out = BufWriter::new(staged.as_file_mut());
        let header: Vec<&str> = columns.iter().map(|c| c.as_ref()).collect();
        writeln!(out, "{}", header.join("\t")).map_err(EngineError::io(path))?;
        for row in rows {
            let cells: Vec<String> = row.iter().map(|v| sanitize(v)).collect();
            writeln!(out, "{}", cells.join("\t")).map_err(EngineError::io(path))?;
        }
        out.flush().map_err(EngineError::io(path))?;
    }
    commit(staged, path).map_err(EngineError::io(path))?;
    Ok(rows.len())
}

/// Write the node and edge tables into `dir`.
pub(crate) fn write_tables<S: AsRef<str>>(
    dir: &Path,
    node_columns: &[S],
    node_rows: &[Vec<String>],
    edge_columns: &[S],
    edge_rows: &[Vec<String>],
) -> Result<OutputTables, EngineError> {
    let nodes = dir.join(NODES_FILE);
    let edges = dir.join(EDGES_FILE);
    let node_rows = write_table(&nodes, node_columns, node_rows)?;
    let edge_rows = write_table(&edges, edge_columns, edge_rows)?;
    Ok(OutputTables {
        nodes,
        edges,
        node_rows,
        edge_rows,
    })
}

/// A node accumulated by the graph engine.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct KgxNode {
    pub id: String,
    pub category: Vec<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub synonym: Vec<String>,
    pub xref: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct KgxEdge {
    pub subject: String,
    pub predicate: String,
    pub object: String,
    pub relation: String,
}

/// Collects nodes (merged by id) and edges in first-seen order.
#[derive(Debug)]
pub(crate) struct GraphBuilder {
    provided_by: String,
    nodes: Vec<KgxNode>,
    index: HashMap<String, usize>,
    edges: Vec<KgxEdge>,
}

impl GraphBuilder {
    pub fn new(provided_by: impl Into<String>) -> Self {
        Self {
            provided_by: provided_by.into(),
            nodes: Vec::new(),
            index: HashMap::new(),
            edges: Vec::new(),
        }
    }

    /// The node with `id`, created empty if not yet seen.
    pub fn node_mut(&mut self, id: &str) -> &mut KgxNode {
        let i = match self.index.get(id) {
            Some(&i) => i,
            None => {
                self.nodes.push(KgxNode {
                    id: id.to_string(),
                    ..KgxNode::default()
                });
                self.index.insert(id.to_string(), self.nodes.len() - 1);
                self.nodes.len() - 1
            }
        };
        &mut self.nodes[i]
    }

    pub fn add_edge(&mut self, edge: KgxEdge) {
        self.edges.push(edge);
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn write(self, dir: &Path) -> Result<OutputTables, EngineError> {
        let node_rows: Vec<Vec<String>> = self
            .nodes
            .iter()
            .map(|n| {
                vec![
                    n.id.clone(),
                    n.category.join("|"),
                    n.name.clone().unwrap_or_default(),
                    n.description.clone().unwrap_or_default(),
                    n.synonym.join("|"),
                    n.xref.join("|"),
                    self.provided_by.clone(),
                ]
            })
            .collect();
        let edge_rows: Vec<Vec<String>> = self
            .edges
            .iter()
            .map(|e| {
                vec![
                    hash_id(&[e.subject.as_str(), e.predicate.as_str(), e.object.as_str()]),
                    e.subject.clone(),
                    e.predicate.clone(),
                    e.object.clone(),
                    e.relation.clone(),
                    self.provided_by.clone(),
                ]
            })
            .collect();
        write_tables(dir, NODE_COLUMNS, &node_rows, EDGE_COLUMNS, &edge_rows)
    }
}
