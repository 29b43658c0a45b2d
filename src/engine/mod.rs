//! Target-stage engines
//!
//! The last stage of every source hands its artifacts to one of two engines:
//! a record-mapping engine driven by a per-source YAML configuration, or a
//! graph conversion engine for serialized ontologies and RDF. Both write a
//! KGX node table and edge table into the source's output directory.

pub mod curie;
mod graph;
mod kgx;
mod mapping;
mod ntriples;
mod obograph;
mod template;
mod traits;

pub use graph::KgxConverter;
pub use kgx::{EDGES_FILE, EDGE_COLUMNS, NODES_FILE, NODE_COLUMNS};
pub use mapping::{
    DeclarativeMapper, FieldTemplate, MappingConfig, RecordTemplate, TranslationTable,
};
pub use traits::{
    EngineError, GraphEngine, GraphRequest, MappingArtifact, MappingEngine, MappingRequest,
    OutputFormat, OutputTables,
};
