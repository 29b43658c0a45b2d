//! TransformDispatcher: runs requested sources through their stage chains
//!
//! For each requested source:
//! 1. Resolve the name against the source registry (unknown names are skipped)
//! 2. Run every conversion stage on every raw input, skipping stages whose
//!    output already exists
//! 3. Hand the final artifacts to the mapping or graph engine
//! 4. De-duplicate the emitted node and edge tables
//!
//! Failures are isolated per source, except for a broken external toolchain,
//! which stops the run.

use super::cache::StageCacheGuard;
use super::postprocess::{deduplicate, PostProcessError};
use crate::convert::{ConversionStage, ConvertError, ConverterRegistry, Format};
use crate::engine::{
    DeclarativeMapper, EngineError, GraphEngine, GraphRequest, KgxConverter, MappingArtifact,
    MappingEngine, MappingRequest, OutputFormat, OutputTables,
};
use crate::registry::{RegistryError, SourceDescriptor, SourceRegistry, TargetStage};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error, info, warn};

/// Errors that stop a run or prevent a dispatcher from being built.
#[derive(Debug, Error)]
pub enum TransformError {
    /// The environment is unusable (e.g. the ontology toolkit is missing)
    #[error("{stage} failed for source '{source_name}', stopping the run: {error}")]
    Environment {
        source_name: String,
        stage: String,
        #[source]
        error: ConvertError,
    },

    #[error("source '{source_name}' needs a {from} -> {to} converter but none is registered")]
    NoConverter {
        source_name: String,
        from: Format,
        to: Format,
    },

    /// Two sources, or two stages, would read or write the same file
    #[error(
        "source '{source_name}' plans to write {} which is already used by source '{owner}'",
        .path.display()
    )]
    PathCollision {
        source_name: String,
        owner: String,
        path: PathBuf,
    },

    #[error(transparent)]
    Registry(#[from] RegistryError),
}

/// Why one source failed. Never crosses the source boundary.
#[derive(Debug, Error)]
enum SourceError {
    #[error(transparent)]
    Convert(#[from] ConvertError),

    #[error("mapping artifact {} is missing or empty", .0.display())]
    MissingArtifact(PathBuf),

    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error(transparent)]
    PostProcess(#[from] PostProcessError),
}

#[derive(Debug)]
struct StageError {
    stage: String,
    error: SourceError,
}

impl StageError {
    fn new(stage: impl Into<String>, error: impl Into<SourceError>) -> Self {
        Self {
            stage: stage.into(),
            error: error.into(),
        }
    }
}

/// Per-run switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunOptions {
    /// Re-run every conversion stage even if its output exists
    pub force: bool,
    /// De-duplicate the emitted tables
    pub deduplicate: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            force: false,
            deduplicate: true,
        }
    }
}

/// A source that completed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceReport {
    pub name: String,
    pub stages_run: usize,
    pub stages_skipped: usize,
    /// Row counts are after de-duplication
    pub tables: OutputTables,
    pub duplicates_removed: usize,
}

/// A source that failed, with the stage it failed in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFailure {
    pub name: String,
    pub stage: String,
    pub message: String,
}

/// Outcome of a run that was not stopped by a fatal error.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    pub completed: Vec<SourceReport>,
    pub failed: Vec<SourceFailure>,
    /// Requested names with no registry entry
    pub unknown: Vec<String>,
}

impl RunReport {
    pub fn has_failures(&self) -> bool {
        !self.failed.is_empty()
    }

    pub fn stages_run(&self) -> usize {
        self.completed.iter().map(|s| s.stages_run).sum()
    }

    pub fn stages_skipped(&self) -> usize {
        self.completed.iter().map(|s| s.stages_skipped).sum()
    }

    pub fn source(&self, name: &str) -> Option<&SourceReport> {
        self.completed.iter().find(|s| s.name == name)
    }
}

fn stage_label(converter: &str, from: Format, to: Format) -> String {
    format!("{} ({} -> {})", converter, from, to)
}

/// Every raw input and planned stage output, relative to the input
/// directory, must belong to exactly one source. A stage output may not
/// shadow anything: the stage cache would treat it as already done.
fn check_paths(
    registry: &SourceRegistry,
    converters: &ConverterRegistry,
) -> Result<(), TransformError> {
    let mut owners: HashMap<PathBuf, &str> = HashMap::new();
    let collision = |source: &SourceDescriptor, owner: &str, path: PathBuf| {
        TransformError::PathCollision {
            source_name: source.name.clone(),
            owner: owner.to_string(),
            path,
        }
    };

    for source in registry.iter() {
        for input in &source.inputs {
            let owner = *owners
                .entry(PathBuf::from(input))
                .or_insert(source.name.as_str());
            if owner != source.name {
                return Err(collision(source, owner, PathBuf::from(input)));
            }
        }
    }

    for source in registry.iter() {
        let mut planned = HashSet::new();
        for input in source.inputs.iter().filter(|i| planned.insert(i.as_str())) {
            let mut current = PathBuf::from(input);
            for spec in &source.stages {
                let Some(converter) = converters.get(spec.from, spec.to) else {
                    break;
                };
                // Unplannable inputs fail at run time with a proper stage label.
                let Ok(output) = converter.output_path(&current) else {
                    break;
                };
                if let Some(&owner) = owners.get(&output) {
                    return Err(collision(source, owner, output));
                }
                owners.insert(output.clone(), source.name.as_str());
                current = output;
            }
        }
    }
    Ok(())
}

/// Runs sources sequentially: one source at a time, one stage at a time.
pub struct TransformDispatcher {
    registry: SourceRegistry,
    converters: ConverterRegistry,
    mapping_engine: Arc<dyn MappingEngine>,
    graph_engine: Arc<dyn GraphEngine>,
    mapping_dir: PathBuf,
    options: RunOptions,
}

impl TransformDispatcher {
    /// Build a dispatcher with the built-in engines.
    ///
    /// Fails if any registered stage has no converter for its format pair,
    /// or if a planned stage output lands on a path another source or stage
    /// already uses.
    pub fn new(
        registry: SourceRegistry,
        converters: ConverterRegistry,
    ) -> Result<Self, TransformError> {
        for source in registry.iter() {
            if let Some(stage) = source
                .stages
                .iter()
                .find(|s| !converters.contains(s.from, s.to))
            {
                return Err(TransformError::NoConverter {
                    source_name: source.name.clone(),
                    from: stage.from,
                    to: stage.to,
                });
            }
        }
        check_paths(&registry, &converters)?;
        Ok(Self {
            registry,
            converters,
            mapping_engine: Arc::new(DeclarativeMapper::new()),
            graph_engine: Arc::new(KgxConverter::new()),
            mapping_dir: PathBuf::from("config"),
            options: RunOptions::default(),
        })
    }

    pub fn with_mapping_engine(mut self, engine: Arc<dyn MappingEngine>) -> Self {
        self.mapping_engine = engine;
        self
    }

    pub fn with_graph_engine(mut self, engine: Arc<dyn GraphEngine>) -> Self {
        self.graph_engine = engine;
        self
    }

    /// Directory mapping configurations and translation tables are resolved against.
    pub fn with_mapping_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.mapping_dir = dir.into();
        self
    }

    pub fn with_options(mut self, options: RunOptions) -> Self {
        self.options = options;
        self
    }

    pub fn registry(&self) -> &SourceRegistry {
        &self.registry
    }

    pub fn options(&self) -> RunOptions {
        self.options
    }

    /// Run `requested` sources (every registered source if empty).
    ///
    /// Names run in request order, each at most once. Returns `Err` only
    /// when a fatal environment error stops the run.
    pub fn run(
        &self,
        requested: &[String],
        input_dir: &Path,
        output_dir: &Path,
    ) -> Result<RunReport, TransformError> {
        let names: Vec<&str> = if requested.is_empty() {
            self.registry.all_sources()
        } else {
            let mut seen = HashSet::new();
            requested
                .iter()
                .map(String::as_str)
                .filter(|name| seen.insert(*name))
                .collect()
        };

        info!(
            sources = names.len(),
            input_dir = %input_dir.display(),
            output_dir = %output_dir.display(),
            force = self.options.force,
            "starting transform run"
        );

        let mut report = RunReport::default();
        for name in names {
            let source = match self.registry.resolve(name) {
                Ok(source) => source,
                Err(e) => {
                    warn!(source = name, error = %e, "skipping unknown source");
                    report.unknown.push(name.to_string());
                    continue;
                }
            };

            match self.run_source(source, input_dir, output_dir) {
                Ok(done) => {
                    info!(
                        source = name,
                        stages_run = done.stages_run,
                        stages_skipped = done.stages_skipped,
                        nodes = done.tables.node_rows,
                        edges = done.tables.edge_rows,
                        "source complete"
                    );
                    report.completed.push(done);
                }
                Err(StageError {
                    stage,
                    error: SourceError::Convert(error),
                }) if error.is_fatal() => {
                    error!(
                        source = name,
                        stage = %stage,
                        error = %error,
                        "environment failure, stopping run"
                    );
                    return Err(TransformError::Environment {
                        source_name: name.to_string(),
                        stage,
                        error,
                    });
                }
                Err(StageError { stage, error }) => {
                    error!(source = name, stage = %stage, error = %error, "source failed");
                    report.failed.push(SourceFailure {
                        name: name.to_string(),
                        stage,
                        message: error.to_string(),
                    });
                }
            }
        }

        info!(
            completed = report.completed.len(),
            failed = report.failed.len(),
            unknown = report.unknown.len(),
            "transform run finished"
        );
        Ok(report)
    }

    fn run_source(
        &self,
        source: &SourceDescriptor,
        input_dir: &Path,
        output_dir: &Path,
    ) -> Result<SourceReport, StageError> {
        let guard = if self.options.force {
            StageCacheGuard::forced()
        } else {
            StageCacheGuard::new()
        };
        let mut stages_run = 0;
        let mut stages_skipped = 0;
        let mut artifacts = Vec::with_capacity(source.inputs.len());

        for input in &source.inputs {
            let mut current = input_dir.join(input);
            for spec in &source.stages {
                let Some(converter) = self.converters.get(spec.from, spec.to) else {
                    let label = stage_label("unregistered", spec.from, spec.to);
                    return Err(StageError::new(
                        label,
                        ConvertError::UnsupportedInput {
                            path: current,
                            reason: "no converter registered for this stage".to_string(),
                        },
                    ));
                };
                let label = stage_label(converter.id(), spec.from, spec.to);
                let stage = ConversionStage::plan(converter.as_ref(), spec.from, spec.to, &current)
                    .map_err(|e| StageError::new(label.as_str(), e))?;

                // A forced re-run cannot redo a stage whose input was consumed.
                let consumed = !stage.input.exists() && stage.output.exists();
                if guard.should_run(&stage.output) && !consumed {
                    info!(
                        source = %source.name,
                        stage = %label,
                        path = %stage.input.display(),
                        "running conversion stage"
                    );
                    stage
                        .execute(converter.as_ref())
                        .map_err(|e| StageError::new(label.as_str(), e))?;
                    stages_run += 1;
                } else {
                    debug!(
                        source = %source.name,
                        stage = %label,
                        path = %stage.output.display(),
                        "output exists, skipping stage"
                    );
                    stages_skipped += 1;
                }
                current = stage.output;
            }
            artifacts.push(MappingArtifact::new(current, source.final_format(), &source.name));
        }

        let label = source.target.label();
        if let Some(missing) = artifacts.iter().find(|a| !a.is_ready()) {
            return Err(StageError::new(
                label,
                SourceError::MissingArtifact(missing.path.clone()),
            ));
        }

        let source_dir = output_dir.join(&source.name);
        info!(
            source = %source.name,
            stage = label,
            artifacts = artifacts.len(),
            "running target stage"
        );
        let mut tables = match &source.target {
            TargetStage::Mapping {
                config,
                translation_table,
            } => self.mapping_engine.transform(&MappingRequest {
                source: &source.name,
                artifacts: &artifacts,
                config: &self.mapping_dir.join(config),
                output_dir: &source_dir,
                output_format: OutputFormat::Tsv,
                global_table: &self.mapping_dir.join(translation_table),
                local_table: None,
            }),
            TargetStage::OntologyGraph => self.graph_engine.transform(&GraphRequest {
                source: &source.name,
                inputs: &artifacts,
                input_format: source.final_format(),
                output_dir: &source_dir,
                output_format: OutputFormat::Tsv,
            }),
        }
        .map_err(|e| StageError::new(label, e))?;

        let mut duplicates_removed = 0;
        if self.options.deduplicate {
            let nodes = deduplicate(&tables.nodes).map_err(|e| StageError::new("deduplicate", e))?;
            let edges = deduplicate(&tables.edges).map_err(|e| StageError::new("deduplicate", e))?;
            tables.node_rows = nodes.rows_after;
            tables.edge_rows = edges.rows_after;
            duplicates_removed = nodes.removed() + edges.removed();
            debug!(source = %source.name, removed = duplicates_removed, "de-duplicated tables");
        }

        Ok(SourceReport {
            name: source.name.clone(),
            stages_run,
            stages_skipped,
            tables,
            duplicates_removed,
        })
    }
}

impl std::fmt::Debug for TransformDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransformDispatcher")
            .field("sources", &self.registry.all_sources())
            .field("converters", &self.converters)
            .field("mapping_dir", &self.mapping_dir)
            .field("options", &self.options)
            .finish()
    }
}
