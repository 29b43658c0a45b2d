//! SourceRegistry: name → descriptor lookup in registration order

use super::builtin;
use super::descriptor::SourceDescriptor;
use crate::convert::Format;
use std::collections::HashMap;
use std::path::{Component, Path};
use thiserror::Error;

/// Errors raised while building or querying the registry.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("unknown source: {0}")]
    UnknownSource(String),

    #[error("source name '{0}' must be a single path component")]
    InvalidName(String),

    #[error("source '{0}' is registered more than once")]
    DuplicateSource(String),

    #[error("source '{0}' declares no input files")]
    NoInputs(String),

    #[error(
        "source '{name}' stage {position} expects {found} input but the chain provides {expected}"
    )]
    BrokenChain {
        name: String,
        position: usize,
        expected: Format,
        found: Format,
    },
}

/// Read-only table of registered sources.
///
/// Lookups are exact and case-sensitive. Iteration follows registration
/// order so repeated full runs log and write in the same order.
#[derive(Debug, Clone)]
pub struct SourceRegistry {
    sources: Vec<SourceDescriptor>,
    index: HashMap<String, usize>,
}

impl SourceRegistry {
    /// Build a registry, validating every descriptor.
    pub fn new(sources: Vec<SourceDescriptor>) -> Result<Self, RegistryError> {
        let mut index = HashMap::with_capacity(sources.len());
        for (i, source) in sources.iter().enumerate() {
            if !is_plain_name(&source.name) {
                return Err(RegistryError::InvalidName(source.name.clone()));
            }
            if index.insert(source.name.clone(), i).is_some() {
                return Err(RegistryError::DuplicateSource(source.name.clone()));
            }
            if source.inputs.is_empty() {
                return Err(RegistryError::NoInputs(source.name.clone()));
            }
            if let Some((position, expected, found)) = source.chain_break() {
                return Err(RegistryError::BrokenChain {
                    name: source.name.clone(),
                    position,
                    expected,
                    found,
                });
            }
        }
        Ok(Self { sources, index })
    }

    /// The built-in sources.
    pub fn builtin() -> Result<Self, RegistryError> {
        Self::new(builtin::sources())
    }

    /// The built-in sources followed by `extra`, in order.
    pub fn with_extra(extra: Vec<SourceDescriptor>) -> Result<Self, RegistryError> {
        let mut sources = builtin::sources();
        sources.extend(extra);
        Self::new(sources)
    }

    /// Look up a source by exact name.
    pub fn resolve(&self, name: &str) -> Result<&SourceDescriptor, RegistryError> {
        self.index
            .get(name)
            .map(|&i| &self.sources[i])
            .ok_or_else(|| RegistryError::UnknownSource(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Every registered name, in registration order.
    pub fn all_sources(&self) -> Vec<&str> {
        self.sources.iter().map(|s| s.name.as_str()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SourceDescriptor> {
        self.sources.iter()
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}

/// Source names become output directories, so each must be exactly one
/// ordinary path component.
fn is_plain_name(name: &str) -> bool {
    let mut parts = Path::new(name).components();
    matches!(
        (parts.next(), parts.next()),
        (Some(Component::Normal(_)), None)
    ) && !name.contains(['/', '\\'])
}
