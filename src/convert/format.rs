//! Artifact format tags

use serde::{Deserialize, Serialize};
use std::fmt;

/// The serialization of an artifact on disk.
///
/// Formats key the converter registry and describe each source's raw
/// inputs, so the set is closed: adding a format means adding a variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    /// gzip-compressed single file
    Gzip,
    Csv,
    Tsv,
    Turtle,
    RdfXml,
    NTriples,
    /// OWL ontology in any serialization the ontology toolkit accepts
    Owl,
    /// OBO Graph JSON
    OboJson,
}

impl Format {
    /// The tag used in configuration files and log output.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Gzip => "gzip",
            Self::Csv => "csv",
            Self::Tsv => "tsv",
            Self::Turtle => "turtle",
            Self::RdfXml => "rdfxml",
            Self::NTriples => "ntriples",
            Self::Owl => "owl",
            Self::OboJson => "obojson",
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
