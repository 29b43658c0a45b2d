//! Format converter adapters
//!
//! Each converter turns one artifact into another (decompression, RDF
//! re-serialization, ontology format conversion). Converters are registered
//! against an (input format, output format) key; the dispatcher looks them
//! up by key and never needs to know which converter it is running.

mod decompress;
mod format;
mod graph_serialize;
mod ontology_convert;
mod registry;
pub(crate) mod staging;
mod traits;

pub use decompress::Decompress;
pub use format::Format;
pub use graph_serialize::GraphSerialize;
pub use ontology_convert::{OntologyConvert, ToolConfig};
pub use registry::ConverterRegistry;
pub use traits::{ConversionResult, ConversionStage, ConvertError, ConvertOptions, Converter};
