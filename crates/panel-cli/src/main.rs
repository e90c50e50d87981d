//! panel CLI - replay an operation history through the recompute pipeline.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde_json::json;

use op_store::OperationStore;
use panel_kernel::{BoxedKernel, MockKernel};
use panel_types::OperationKind;
use recompute_bridge::{compute_version, RecomputeClient, RecomputeConfig, RecomputeResult};

#[derive(Parser)]
#[command(name = "panel")]
#[command(about = "Build a parametric panel from an operation list", long_about = None)]
struct Cli {
    /// JSON config file (tolerance, cut depth, default panel)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Recompute the mesh for an operation list
    Build {
        /// JSON array of operations, e.g. [{"type":"resize","w":600,"h":400,"t":18}]
        ops: PathBuf,
        /// Number of operations to undo before building
        #[arg(long, default_value_t = 0)]
        undo: usize,
        /// Override the tessellation tolerance
        #[arg(long)]
        tolerance: Option<f64>,
        /// Start from the default panel when the list is empty
        #[arg(long)]
        seed_default: bool,
        /// Use the deterministic mock kernel instead of truck
        #[arg(long)]
        mock: bool,
        #[arg(long, value_enum, default_value_t = OutputFormat::Summary)]
        format: OutputFormat,
        /// Give up waiting for the worker after this many seconds
        #[arg(long, default_value_t = 60)]
        timeout_secs: u64,
    },
    /// Print the version hash of an operation list
    Version {
        ops: PathBuf,
    },
    /// Print the effective configuration
    Config,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// Counts and bounding box
    Summary,
    /// The full result, including mesh buffers and edge pairs
    Json,
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => RecomputeConfig::from_path(path)?,
        None => RecomputeConfig::default(),
    };

    match cli.command {
        Commands::Build {
            ops,
            undo,
            tolerance,
            seed_default,
            mock,
            format,
            timeout_secs,
        } => {
            let mut config = config;
            if let Some(tolerance) = tolerance {
                config.tessellation_tolerance = tolerance;
                config.validate()?;
            }
            let store = load_store(&ops, undo, seed_default.then_some(&config))?;
            build(&store, &config, mock, format, Duration::from_secs(timeout_secs))?;
        }
        Commands::Version { ops } => {
            let store = load_store(&ops, 0, None)?;
            println!("{}", compute_version(store.active_operations()));
        }
        Commands::Config => {
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
    }

    Ok(())
}

fn init_tracing() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Replay the drafts through a fresh store, then step back `undo` times.
fn load_store(
    path: &Path,
    undo: usize,
    seed: Option<&RecomputeConfig>,
) -> Result<OperationStore> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let drafts: Vec<OperationKind> = serde_json::from_str(&json)
        .with_context(|| format!("{} is not a list of operations", path.display()))?;

    let mut store = OperationStore::new();
    if let Some(config) = seed {
        store.ensure_initialized(config.default_panel);
    }
    for draft in drafts {
        store.add_op(draft);
    }
    for _ in 0..undo {
        if !store.undo() {
            break;
        }
    }

    tracing::info!(
        total = store.len(),
        active = store.active_operations().len(),
        "history loaded"
    );
    Ok(store)
}

fn build(
    store: &OperationStore,
    config: &RecomputeConfig,
    mock: bool,
    format: OutputFormat,
    timeout: Duration,
) -> Result<()> {
    let options = config.build_options();
    let client = if mock {
        RecomputeClient::spawn_with(|| Ok(Box::new(MockKernel::new()) as BoxedKernel), options)?
    } else {
        RecomputeClient::spawn_truck(options)?
    };

    let pending = client.request(store.snapshot());
    tracing::info!(version = %pending.version(), "recompute requested");
    let result = pending.wait_timeout(timeout)?;

    match format {
        OutputFormat::Summary => println!("{}", serde_json::to_string_pretty(&summary(&result))?),
        OutputFormat::Json => println!("{}", serde_json::to_string(&result)?),
    }

    if let Some(error) = &result.error {
        bail!("recompute failed: {error}");
    }
    Ok(())
}

fn summary(result: &RecomputeResult) -> serde_json::Value {
    let mesh = result.mesh.as_ref();
    json!({
        "version": result.version,
        "vertices": mesh.map_or(0, |m| m.vertex_count()),
        "triangles": mesh.map_or(0, |m| m.triangle_count()),
        "edges": result.edges.as_ref().map_or(0, Vec::len),
        "bounds": mesh.and_then(|m| m.bounding_box()).map(|(min, max)| json!({
            "min": min,
            "max": max,
        })),
        "error": result.error,
    })
}
