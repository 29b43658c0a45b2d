//! DeclarativeMapper: YAML-driven record mapping
//!
//! Interprets a mapping configuration against delimited record files. Each
//! configured node or edge template is applied to every row; rendered
//! fields fill the configured output columns. Example:
//!
//! ```yaml
//! name: atc-classes
//! delimiter: ","
//! node_properties: [id, category, name, provided_by]
//! edge_properties: [id, subject, predicate, object, primary_knowledge_source]
//! nodes:
//!   - require: ["Class ID"]
//!     id: "{row.Class ID | local_id | prefix:ATC:}"
//!     category: "{'chemical entity' | translate}"
//!     name: "{row.Preferred Label}"
//!     provided_by: "{source}"
//! edges:
//!   - require: ["Class ID", "Parents"]
//!     id: { hash: ["{row.Class ID}", "{row.Parents}"] }
//!     subject: "{row.Class ID | local_id | prefix:ATC:}"
//!     predicate: "{'subclass of' | translate}"
//!     object: "{row.Parents | local_id | prefix:ATC:}"
//!     primary_knowledge_source: "{source}"
//! ```

use super::kgx::{hash_id, write_tables};
use super::template::{render_template, TemplateContext};
use super::traits::{EngineError, MappingEngine, MappingRequest, OutputTables};
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;
use tracing::{debug, info};

fn default_delimiter() -> String {
    ",".to_string()
}

/// How one output field is produced.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum FieldTemplate {
    /// String interpolation: `"ATC:{row.code}"`
    Template(String),
    /// Content hash (UUID v5) over the rendered templates
    Hash { hash: Vec<String> },
}

/// A node or edge template applied to every row.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RecordTemplate {
    /// Columns that must be non-empty for this template to emit a record
    #[serde(default)]
    pub require: Vec<String>,
    #[serde(flatten)]
    pub fields: BTreeMap<String, FieldTemplate>,
}

/// A per-source mapping configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MappingConfig {
    pub name: String,
    #[serde(default = "default_delimiter")]
    pub delimiter: String,
    pub node_properties: Vec<String>,
    pub edge_properties: Vec<String>,
    #[serde(default)]
    pub nodes: Vec<RecordTemplate>,
    #[serde(default)]
    pub edges: Vec<RecordTemplate>,
}

impl MappingConfig {
    /// Load and validate a mapping configuration.
    pub fn load(path: &Path) -> Result<Self, EngineError> {
        let text = fs::read_to_string(path).map_err(EngineError::io(path))?;
        let config: Self = serde_yaml::from_str(&text).map_err(|source| EngineError::Yaml {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate(path)?;
        Ok(config)
    }

    fn validate(&self, path: &Path) -> Result<(), EngineError> {
        let invalid = |message: String| EngineError::Config {
            path: path.to_path_buf(),
            message,
        };
        self.delimiter_byte().ok_or_else(|| {
            invalid(format!("delimiter must be a single ASCII character, got '{}'", self.delimiter))
        })?;
        for (kind, templates, columns) in [
            ("node", &self.nodes, &self.node_properties),
            ("edge", &self.edges, &self.edge_properties),
        ] {
            for template in templates {
                if let Some(field) = template.fields.keys().find(|f| !columns.contains(f)) {
                    return Err(invalid(format!(
                        "{} template sets '{}', which is not a declared {} property",
                        kind, field, kind
                    )));
                }
            }
        }
        Ok(())
    }

    fn delimiter_byte(&self) -> Option<u8> {
        match self.delimiter.as_bytes() {
            [b] if b.is_ascii() => Some(*b),
            _ => None,
        }
    }
}

/// The shared vocabulary table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TranslationTable {
    #[serde(default)]
    pub global_table: HashMap<String, String>,
    #[serde(default)]
    pub local_table: HashMap<String, String>,
}

impl TranslationTable {
    pub fn load(path: &Path) -> Result<Self, EngineError> {
        let text = fs::read_to_string(path).map_err(EngineError::io(path))?;
        serde_yaml::from_str(&text).map_err(|source| EngineError::Yaml {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Global terms overlaid with local ones.
    fn merged(mut self, local: Option<TranslationTable>) -> HashMap<String, String> {
        self.global_table.extend(self.local_table);
        if let Some(local) = local {
            self.global_table.extend(local.global_table);
            self.global_table.extend(local.local_table);
        }
        self.global_table
    }
}

/// Render one template against one row, or `None` if a required column is empty.
fn render_record(
    template: &RecordTemplate,
    columns: &[String],
    ctx: &TemplateContext,
) -> Result<Option<Vec<String>>, EngineError> {
    let satisfied = template
        .require
        .iter()
        .all(|c| ctx.row.get(c.as_str()).is_some_and(|v| !v.trim().is_empty()));
    if !satisfied {
        return Ok(None);
    }

    let mut record = Vec::with_capacity(columns.len());
    for column in columns {
        let value = match template.fields.get(column) {
            None => String::new(),
            Some(FieldTemplate::Template(t)) => render_template(t, ctx)?,
            Some(FieldTemplate::Hash { hash }) => {
                let parts = hash
                    .iter()
                    .map(|t| render_template(t, ctx))
                    .collect::<Result<Vec<_>, _>>()?;
                let refs: Vec<&str> = parts.iter().map(String::as_str).collect();
                hash_id(&refs)
            }
        };
        record.push(value);
    }
    Ok(Some(record))
}

/// Built-in record-mapping engine.
#[derive(Debug, Default, Clone, Copy)]
pub struct DeclarativeMapper;

impl DeclarativeMapper {
    pub fn new() -> Self {
        Self
    }
}

impl MappingEngine for DeclarativeMapper {
    fn transform(&self, request: &MappingRequest<'_>) -> Result<OutputTables, EngineError> {
        let config = MappingConfig::load(request.config)?;
        let local = request.local_table.map(TranslationTable::load).transpose()?;
        let translation = TranslationTable::load(request.global_table)?.merged(local);
        let delimiter = config.delimiter_byte().unwrap_or(b',');

        let mut node_rows = Vec::new();
        let mut edge_rows = Vec::new();

        for artifact in request.artifacts {
            let path = artifact.path.as_path();
            let csv_error = |source| EngineError::Csv {
                path: path.to_path_buf(),
                source,
            };
            let mut reader = csv::ReaderBuilder::new()
                .delimiter(delimiter)
                .flexible(true)
                .from_path(path)
                .map_err(csv_error)?;
            let headers = reader.headers().map_err(csv_error)?.clone();

            let mut rows = 0usize;
            for record in reader.records() {
                let record = record.map_err(csv_error)?;
                let row: HashMap<&str, &str> = headers.iter().zip(record.iter()).collect();
                let ctx = TemplateContext {
                    row: &row,
                    source: request.source,
                    translation: &translation,
                };
                for template in &config.nodes {
                    if let Some(r) = render_record(template, &config.node_properties, &ctx)? {
                        node_rows.push(r);
                    }
                }
                for template in &config.edges {
                    if let Some(r) = render_record(template, &config.edge_properties, &ctx)? {
                        edge_rows.push(r);
                    }
                }
                rows += 1;
            }
            debug!(source = request.source, path = %path.display(), rows, "mapped records");
        }

        info!(
            source = request.source,
            config = %config.name,
            output_format = request.output_format.as_str(),
            nodes = node_rows.len(),
            edges = edge_rows.len(),
            "writing mapped tables"
        );
        write_tables(
            request.output_dir,
            &config.node_properties,
            &node_rows,
            &config.edge_properties,
            &edge_rows,
        )
    }
}
