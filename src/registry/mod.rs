//! Source registry
//!
//! Maps logical source names to descriptors: which raw files a source needs,
//! which conversion stages turn them into a mappable artifact, and which
//! target stage emits the node/edge tables.

mod builtin;
mod descriptor;
mod table;

pub use descriptor::{SourceDescriptor, StageSpec, TargetStage};
pub use table::{RegistryError, SourceRegistry};
