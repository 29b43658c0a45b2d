//! Engine contracts: what the dispatcher hands to the target stage

use crate::convert::Format;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors raised by a mapping or graph engine.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("IO error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot read {}: {source}", .path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("invalid JSON in {}: {source}", .path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid YAML in {}: {source}", .path.display())]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("invalid mapping configuration {}: {message}", .path.display())]
    Config { path: PathBuf, message: String },

    #[error("template error: {0}")]
    Template(String),

    #[error("term '{0}' is not in the translation table")]
    UnknownTerm(String),

    #[error("cannot parse graph {}: {message}", .path.display())]
    GraphParse { path: PathBuf, message: String },

    #[error("{0} input is not supported by this engine")]
    UnsupportedFormat(Format),
}

impl EngineError {
    pub(crate) fn io(path: &Path) -> impl FnOnce(io::Error) -> Self + '_ {
        move |source| Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Output serialization requested from an engine. Only TSV is produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Tsv,
}

impl OutputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Tsv => "tsv",
        }
    }
}

/// A final intermediate file handed to the target stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappingArtifact {
    pub path: PathBuf,
    pub format: Format,
    /// Name of the source that produced it
    pub provenance: String,
}

impl MappingArtifact {
    pub fn new(path: impl Into<PathBuf>, format: Format, provenance: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            format,
            provenance: provenance.into(),
        }
    }

    /// The artifact exists and is not empty.
    pub fn is_ready(&self) -> bool {
        fs::metadata(&self.path)
            .map(|m| m.is_file() && m.len() > 0)
            .unwrap_or(false)
    }
}

/// The node and edge tables an engine wrote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputTables {
    pub nodes: PathBuf,
    pub edges: PathBuf,
    pub node_rows: usize,
    pub edge_rows: usize,
}

/// Everything the record-mapping engine needs for one source.
#[derive(Debug, Clone, Copy)]
pub struct MappingRequest<'a> {
    pub source: &'a str,
    pub artifacts: &'a [MappingArtifact],
    /// Per-source mapping configuration
    pub config: &'a Path,
    /// Directory the tables are written into
    pub output_dir: &'a Path,
    pub output_format: OutputFormat,
    /// Shared vocabulary table
    pub global_table: &'a Path,
    pub local_table: Option<&'a Path>,
}

/// Everything the graph conversion engine needs for one source.
#[derive(Debug, Clone, Copy)]
pub struct GraphRequest<'a> {
    pub source: &'a str,
    pub inputs: &'a [MappingArtifact],
    pub input_format: Format,
    pub output_dir: &'a Path,
    pub output_format: OutputFormat,
}

/// Converts structured records into node/edge tables under a mapping configuration.
pub trait MappingEngine: Send + Sync {
    fn transform(&self, request: &MappingRequest<'_>) -> Result<OutputTables, EngineError>;
}

/// Converts a serialized graph (OBO Graph JSON, N-Triples) into node/edge tables.
pub trait GraphEngine: Send + Sync {
    fn transform(&self, request: &GraphRequest<'_>) -> Result<OutputTables, EngineError>;
}
