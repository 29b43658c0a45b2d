//! Pipeline configuration
//!
//! Loaded from YAML; every key is optional:
//!
//! ```yaml
//! input_dir: data/raw
//! output_dir: data/transformed
//! mapping_dir: config
//! deduplicate: true
//! robot:
//!   command: robot
//!   args: []
//! sources:
//!   - name: chebi
//!     inputs: [chebi.owl]
//!     format: owl
//!     stages: [{ from: owl, to: obojson }]
//!     target: { kind: ontology_graph }
//! ```

use crate::convert::{ConverterRegistry, ToolConfig};
use crate::registry::{SourceDescriptor, SourceRegistry};
use crate::transform::{RunOptions, TransformDispatcher, TransformError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// File name looked up under the user configuration directory.
pub const CONFIG_FILE: &str = "config.yaml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid config {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Raw inputs, one file set per source
    pub input_dir: PathBuf,
    /// Node/edge tables are written to `<output_dir>/<source>/`
    pub output_dir: PathBuf,
    /// Mapping configurations and translation tables
    pub mapping_dir: PathBuf,
    pub deduplicate: bool,
    /// Ontology toolkit invocation
    pub robot: ToolConfig,
    /// Sources registered after the built-ins
    pub sources: Vec<SourceDescriptor>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("data/raw"),
            output_dir: PathBuf::from("data/transformed"),
            mapping_dir: PathBuf::from("config"),
            deduplicate: true,
            robot: ToolConfig::default(),
            sources: Vec::new(),
        }
    }
}

impl PipelineConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_yaml_str(text: &str) -> Result<Self, serde_yaml::Error> {
        // An empty document deserializes to unit, not an empty mapping.
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(text)
    }

    /// `<config dir>/kg-enp/config.yaml` (e.g. ~/.config/kg-enp/config.yaml)
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("kg-enp").join(CONFIG_FILE))
    }

    /// Load `explicit` if given, else the default path if that file exists,
    /// else built-in defaults.
    pub fn discover(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        match explicit {
            Some(path) => Self::load(path),
            None => match Self::default_path().filter(|p| p.is_file()) {
                Some(path) => Self::load(&path),
                None => Ok(Self::default()),
            },
        }
    }

    pub fn run_options(&self, force: bool) -> RunOptions {
        RunOptions {
            force,
            deduplicate: self.deduplicate,
        }
    }

    /// Build a dispatcher for the built-in sources plus the configured ones.
    pub fn build_dispatcher(&self, force: bool) -> Result<TransformDispatcher, TransformError> {
        let registry = SourceRegistry::with_extra(self.sources.clone())?;
        let converters = ConverterRegistry::with_defaults(self.robot.clone());
        Ok(TransformDispatcher::new(registry, converters)?
            .with_mapping_dir(&self.mapping_dir)
            .with_options(self.run_options(force)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convert::Format;
    use crate::registry::RegistryError;

    #[test]
    fn empty_document_gives_defaults() {
        assert_eq!(PipelineConfig::from_yaml_str("").unwrap(), PipelineConfig::default());
        assert_eq!(PipelineConfig::from_yaml_str("{}").unwrap(), PipelineConfig::default());
    }

    #[test]
    fn partial_document_keeps_other_defaults() {
        let config = PipelineConfig::from_yaml_str(
            "output_dir: /tmp/kg\ndeduplicate: false\nrobot: { command: /opt/robot/robot, args: [-Xmx8G] }\n",
        )
        .unwrap();
        assert_eq!(config.output_dir, PathBuf::from("/tmp/kg"));
        assert_eq!(config.input_dir, PathBuf::from("data/raw"));
        assert!(!config.deduplicate);
        assert_eq!(config.robot.command, "/opt/robot/robot");
        assert_eq!(config.robot.args, vec!["-Xmx8G"]);
        assert!(!config.run_options(true).deduplicate);
    }

    #[test]
    fn extra_sources_are_registered_after_builtins() {
        let config = PipelineConfig::from_yaml_str(
            r#"
sources:
  - name: chebi
    inputs: [chebi.owl]
    format: owl
    stages: [{ from: owl, to: obojson }]
    target: { kind: ontology_graph }
"#,
        )
        .unwrap();
        let dispatcher = config.build_dispatcher(false).unwrap();
        assert_eq!(
            dispatcher.registry().all_sources(),
            vec!["hp", "envo", "atc", "chembl", "chebi"]
        );
    }

    #[test]
    fn source_without_converter_fails_to_build() {
        let config = PipelineConfig {
            sources: vec![SourceDescriptor::new(
                "odd",
                Format::Csv,
                crate::registry::TargetStage::OntologyGraph,
            )
            .with_input("odd.csv")
            .with_stage(Format::Csv, Format::Turtle)],
            ..PipelineConfig::default()
        };
        assert!(matches!(
            config.build_dispatcher(false).unwrap_err(),
            TransformError::NoConverter { .. }
        ));
    }

    #[test]
    fn duplicate_extra_source_fails_to_build() {
        let config = PipelineConfig::from_yaml_str(
            "sources:\n  - { name: hp, inputs: [x.json], format: obojson, target: { kind: ontology_graph } }\n",
        )
        .unwrap();
        assert!(matches!(
            config.build_dispatcher(false).unwrap_err(),
            TransformError::Registry(RegistryError::DuplicateSource(_))
        ));
    }

    #[test]
    fn source_name_escaping_the_output_dir_fails_to_build() {
        let config = PipelineConfig::from_yaml_str(
            "sources:\n  - name: ../escape\n    inputs: [x.json]\n    format: obojson\n    target: { kind: ontology_graph }\n",
        )
        .unwrap();
        assert!(matches!(
            config.build_dispatcher(false).unwrap_err(),
            TransformError::Registry(RegistryError::InvalidName(ref name)) if name == "../escape"
        ));
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = PipelineConfig::discover(Some(&dir.path().join("nope.yaml"))).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn load_reports_parse_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(&path, "deduplicate: [").unwrap();
        assert!(matches!(
            PipelineConfig::load(&path).unwrap_err(),
            ConfigError::Parse { .. }
        ));
    }
}
