//! kg-enp CLI: transform raw source files into KGX node/edge tables.
//!
//! Usage:
//!   kg-enp transform [-i dir] [-o dir] [-s source]... [--force] [--no-dedup]
//!   kg-enp sources
//!   kg-enp manifest [path] [-o dir]

use clap::{Parser, Subcommand};
use kg_enp::{archive_targets, ConfigError, PipelineConfig, RunReport, TransformError};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "kg-enp",
    version,
    about = "Normalize bioentity datasets into KGX node/edge tables"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    /// Pipeline configuration file (default: <config dir>/kg-enp/config.yaml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// More log output (-v debug, -vv trace); overrides RUST_LOG
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Transform sources into node/edge tables
    Transform {
        /// Directory holding the raw inputs
        #[arg(short, long)]
        input_dir: Option<PathBuf>,
        /// Directory the tables are written to
        #[arg(short, long)]
        output_dir: Option<PathBuf>,
        /// Source to transform (repeatable; default: all)
        #[arg(short, long = "source")]
        sources: Vec<String>,
        /// Re-run conversion stages even if their output exists
        #[arg(long)]
        force: bool,
        /// Skip de-duplication of the emitted tables
        #[arg(long)]
        no_dedup: bool,
        /// Directory holding mapping configurations and translation tables
        #[arg(long)]
        mapping_dir: Option<PathBuf>,
    },
    /// List registered sources
    Sources,
    /// Print archive download targets listed in a dataset manifest
    Manifest {
        /// Manifest file
        #[arg(default_value = "enpkg.yaml")]
        path: PathBuf,
        /// Directory archives would be written to (default: input_dir)
        #[arg(short, long)]
        output_dir: Option<PathBuf>,
    },
}

fn init_logging(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        1 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(path: Option<&Path>) -> Result<PipelineConfig, ConfigError> {
    let config = PipelineConfig::discover(path)?;
    tracing::debug!(?config, "configuration loaded");
    Ok(config)
}

fn print_report(report: &RunReport) {
    for done in &report.completed {
        println!(
            "ok      {:<10} nodes={} edges={} stages run={} skipped={} duplicates removed={}",
            done.name,
            done.tables.node_rows,
            done.tables.edge_rows,
            done.stages_run,
            done.stages_skipped,
            done.duplicates_removed
        );
    }
    for failure in &report.failed {
        println!("failed  {:<10} [{}] {}", failure.name, failure.stage, failure.message);
    }
    for name in &report.unknown {
        println!("unknown {}", name);
    }
}

fn cmd_transform(
    mut config: PipelineConfig,
    input_dir: Option<PathBuf>,
    output_dir: Option<PathBuf>,
    sources: &[String],
    force: bool,
    no_dedup: bool,
    mapping_dir: Option<PathBuf>,
) -> i32 {
    if let Some(dir) = input_dir {
        config.input_dir = dir;
    }
    if let Some(dir) = output_dir {
        config.output_dir = dir;
    }
    if let Some(dir) = mapping_dir {
        config.mapping_dir = dir;
    }
    if no_dedup {
        config.deduplicate = false;
    }

    let dispatcher = match config.build_dispatcher(force) {
        Ok(d) => d,
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    };

    let result = dispatcher.run(sources, &config.input_dir, &config.output_dir);
    match &result {
        Ok(report) => print_report(report),
        Err(e @ TransformError::Environment { .. }) => eprintln!("Fatal: {}", e),
        Err(e) => eprintln!("Error: {}", e),
    }
    exit_code(&result)
}

/// 0 when every source completed, 1 when some source failed, 2 when a broken
/// environment stopped the run.
fn exit_code(result: &Result<RunReport, TransformError>) -> i32 {
    match result {
        Ok(report) if report.has_failures() => 1,
        Ok(_) => 0,
        Err(TransformError::Environment { .. }) => 2,
        Err(_) => 1,
    }
}

fn cmd_sources(config: &PipelineConfig) -> i32 {
    let dispatcher = match config.build_dispatcher(false) {
        Ok(d) => d,
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    };
    for source in dispatcher.registry().iter() {
        let mut chain = vec![source.format.to_string()];
        chain.extend(source.stages.iter().map(|s| s.to.to_string()));
        println!(
            "{:<10} {:<24} {:<24} {}",
            source.name,
            source.inputs.join(","),
            chain.join(" -> "),
            source.target.label()
        );
    }
    0
}

fn cmd_manifest(config: &PipelineConfig, path: &Path, output_dir: Option<PathBuf>) -> i32 {
    let output_dir = output_dir.unwrap_or_else(|| config.input_dir.clone());
    match archive_targets(path, &output_dir) {
        Ok(targets) => {
            for target in targets {
                println!("{}\t{}", target.url, target.path.display());
            }
            0
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = match load_config(cli.config.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    let code = match cli.command {
        Commands::Transform {
            input_dir,
            output_dir,
            sources,
            force,
            no_dedup,
            mapping_dir,
        } => cmd_transform(config, input_dir, output_dir, &sources, force, no_dedup, mapping_dir),
        Commands::Sources => cmd_sources(&config),
        Commands::Manifest { path, output_dir } => cmd_manifest(&config, &path, output_dir),
    };
    std::process::exit(code);
}
