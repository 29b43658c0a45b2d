//! Source descriptors

use crate::convert::Format;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

fn default_translation_table() -> PathBuf {
    PathBuf::from("translation_table.yaml")
}

/// One conversion step in a source's chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StageSpec {
    pub from: Format,
    pub to: Format,
}

impl StageSpec {
    pub fn new(from: Format, to: Format) -> Self {
        Self { from, to }
    }
}

/// The stage that turns a source's final artifact into node/edge tables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TargetStage {
    /// Record mapping driven by a mapping configuration and the shared
    /// translation table. Both paths are relative to the mapping directory.
    Mapping {
        config: PathBuf,
        #[serde(default = "default_translation_table")]
        translation_table: PathBuf,
    },
    /// Graph conversion of an ontology or RDF artifact; the input format is
    /// the format of the final artifact.
    OntologyGraph,
}

impl TargetStage {
    pub fn mapping(config: impl Into<PathBuf>) -> Self {
        Self::Mapping {
            config: config.into(),
            translation_table: default_translation_table(),
        }
    }

    /// Name used in logs and failure reports.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Mapping { .. } => "record-mapping",
            Self::OntologyGraph => "ontology-graph",
        }
    }
}

/// A registered data source.
///
/// Descriptors are built once at startup and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceDescriptor {
    /// Unique key; also the name of the source's output directory
    pub name: String,
    /// Raw input file names, relative to the input directory
    pub inputs: Vec<String>,
    /// Format of the raw inputs
    pub format: Format,
    /// Conversion chain, run in order on every input
    #[serde(default)]
    pub stages: Vec<StageSpec>,
    pub target: TargetStage,
}

impl SourceDescriptor {
    pub fn new(name: impl Into<String>, format: Format, target: TargetStage) -> Self {
        Self {
            name: name.into(),
            inputs: Vec::new(),
            format,
            stages: Vec::new(),
            target,
        }
    }

    pub fn with_input(mut self, file: impl Into<String>) -> Self {
        self.inputs.push(file.into());
        self
    }

    pub fn with_stage(mut self, from: Format, to: Format) -> Self {
        self.stages.push(StageSpec::new(from, to));
        self
    }

    /// Format of the artifact handed to the target stage.
    pub fn final_format(&self) -> Format {
        self.stages.last().map(|s| s.to).unwrap_or(self.format)
    }

    /// Find the first stage whose input format does not follow on from the
    /// previous format, returning (position, expected, found).
    pub fn chain_break(&self) -> Option<(usize, Format, Format)> {
        let mut current = self.format;
        for (i, stage) in self.stages.iter().enumerate() {
            if stage.from != current {
                return Some((i, current, stage.from));
            }
            current = stage.to;
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn final_format_follows_chain() {
        let direct = SourceDescriptor::new("hp", Format::OboJson, TargetStage::OntologyGraph);
        assert_eq!(direct.final_format(), Format::OboJson);

        let chained = SourceDescriptor::new("atc", Format::Gzip, TargetStage::mapping("atc.yaml"))
            .with_stage(Format::Gzip, Format::Csv);
        assert_eq!(chained.final_format(), Format::Csv);
    }

    #[test]
    fn chain_break_reports_first_mismatch() {
        let ok = SourceDescriptor::new("x", Format::Gzip, TargetStage::OntologyGraph)
            .with_stage(Format::Gzip, Format::Turtle)
            .with_stage(Format::Turtle, Format::NTriples);
        assert_eq!(ok.chain_break(), None);

        let broken = SourceDescriptor::new("x", Format::Gzip, TargetStage::OntologyGraph)
            .with_stage(Format::Gzip, Format::Turtle)
            .with_stage(Format::Owl, Format::OboJson);
        assert_eq!(broken.chain_break(), Some((1, Format::Turtle, Format::Owl)));
    }

    #[test]
    fn descriptor_from_yaml() {
        let yaml = r#"
name: chebi
inputs: [chebi.owl]
format: owl
stages:
  - { from: owl, to: obojson }
target: { kind: ontology_graph }
"#;
        let desc: SourceDescriptor = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(desc.name, "chebi");
        assert_eq!(desc.stages, vec![StageSpec::new(Format::Owl, Format::OboJson)]);
        assert_eq!(desc.target, TargetStage::OntologyGraph);

        let yaml = r#"
name: atc
inputs: [atc.csv.gz]
format: gzip
stages: [{ from: gzip, to: csv }]
target: { kind: mapping, config: atc-classes.yaml }
"#;
        let desc: SourceDescriptor = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(desc.target, TargetStage::mapping("atc-classes.yaml"));
    }
}
