//! kg-enp: Source-to-Graph Transform Pipeline
//!
//! Normalizes heterogeneous bioentity datasets (compressed chemical
//! classification tables, RDF dumps, OBO Graph JSON ontologies) into KGX
//! node/edge TSV tables ready for graph-database loading.
//!
//! # Core Concepts
//!
//! - **Sources**: Named datasets with raw input files, a chain of conversion
//!   stages and a target stage that emits the node/edge tables
//! - **Converters**: One per (input format, output format) pair; registered
//!   by key so the dispatcher never branches on source names
//! - **Stage cache**: A conversion stage whose output already exists is skipped
//! - **Dispatcher**: Runs requested sources one at a time, isolating failures
//!   per source except for a broken toolchain, which stops the run
//!
//! # Example
//!
//! ```no_run
//! use kg_enp::{ConverterRegistry, SourceRegistry, ToolConfig, TransformDispatcher};
//! use std::path::Path;
//!
//! let registry = SourceRegistry::builtin().unwrap();
//! let converters = ConverterRegistry::with_defaults(ToolConfig::default());
//! let dispatcher = TransformDispatcher::new(registry, converters).unwrap();
//! let report = dispatcher
//!     .run(&["hp".to_string()], Path::new("data/raw"), Path::new("data/transformed"))
//!     .unwrap();
//! assert!(report.failed.is_empty());
//! ```

pub mod config;
pub mod convert;
pub mod engine;
pub mod manifest;
pub mod registry;
pub mod transform;

pub use config::{ConfigError, PipelineConfig};
pub use convert::{
    ConversionResult, ConversionStage, ConvertError, ConvertOptions, Converter,
    ConverterRegistry, Format, ToolConfig,
};
pub use engine::{
    DeclarativeMapper, EngineError, GraphEngine, GraphRequest, KgxConverter, MappingArtifact,
    MappingEngine, MappingRequest, OutputFormat, OutputTables,
};
pub use manifest::{archive_targets, DownloadTarget, ManifestError};
pub use registry::{RegistryError, SourceDescriptor, SourceRegistry, StageSpec, TargetStage};
pub use transform::{
    deduplicate, DedupReport, PostProcessError, RunOptions, RunReport, SourceFailure,
    SourceReport, StageCacheGuard, TransformDispatcher, TransformError,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
