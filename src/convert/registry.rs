//! Converter registry keyed by (input format, output format)

use super::decompress::Decompress;
use super::format::Format;
use super::graph_serialize::GraphSerialize;
use super::ontology_convert::{OntologyConvert, ToolConfig};
use super::traits::Converter;
use std::collections::HashMap;
use std::sync::Arc;

/// Looks up the converter for a format pair.
///
/// One converter may serve several keys (decompression handles any
/// gzip-wrapped format). Registering a key twice replaces the earlier
/// converter.
#[derive(Clone, Default)]
pub struct ConverterRegistry {
    converters: HashMap<(Format, Format), Arc<dyn Converter>>,
}

impl ConverterRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in converters.
    pub fn with_defaults(tool: ToolConfig) -> Self {
        let mut registry = Self::new();

        let decompress: Arc<dyn Converter> = Arc::new(Decompress);
        for to in [
            Format::Csv,
            Format::Tsv,
            Format::Turtle,
            Format::NTriples,
            Format::OboJson,
        ] {
            registry.register(Format::Gzip, to, decompress.clone());
        }

        let serialize: Arc<dyn Converter> = Arc::new(GraphSerialize);
        registry.register(Format::Turtle, Format::NTriples, serialize.clone());
        registry.register(Format::RdfXml, Format::NTriples, serialize);

        registry.register(Format::Owl, Format::OboJson, Arc::new(OntologyConvert::new(tool)));

        registry
    }

    /// Register a converter, returning the one it replaced.
    pub fn register(
        &mut self,
        from: Format,
        to: Format,
        converter: Arc<dyn Converter>,
    ) -> Option<Arc<dyn Converter>> {
        self.converters.insert((from, to), converter)
    }

    pub fn get(&self, from: Format, to: Format) -> Option<&Arc<dyn Converter>> {
        self.converters.get(&(from, to))
    }

    pub fn contains(&self, from: Format, to: Format) -> bool {
        self.converters.contains_key(&(from, to))
    }

    pub fn len(&self) -> usize {
        self.converters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.converters.is_empty()
    }
}

impl std::fmt::Debug for ConverterRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut keys: Vec<String> = self
            .converters
            .iter()
            .map(|((from, to), c)| format!("{}->{} ({})", from, to, c.id()))
            .collect();
        keys.sort();
        f.debug_struct("ConverterRegistry").field("converters", &keys).finish()
    }
}
