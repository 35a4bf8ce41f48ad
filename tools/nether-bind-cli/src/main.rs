//! nether-bind - mesh & skeleton import tool
//!
//! Runs the import binder on glTF/GLB files and reports what the renderer
//! would receive (representation, submeshes, skeleton, bones).

mod report;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use nether_bind::{CpuBackend, ImportConfig, import_scene, load_gltf};

#[derive(Parser)]
#[command(name = "nether-bind")]
#[command(about = "Mesh & skeleton import binder")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Import a glTF/GLB file and print a summary
    Import {
        /// Input glTF/GLB file
        input: PathBuf,

        /// Import config (TOML)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Write a JSON report to this path
        #[arg(short, long)]
        report: Option<PathBuf>,

        /// Skip smooth normal synthesis
        #[arg(long)]
        no_smooth_normals: bool,

        /// Flatten meshes on one thread
        #[arg(long)]
        sequential: bool,
    },

    /// Print the breadth-first skeleton of a glTF/GLB file
    Skeleton {
        /// Input glTF/GLB file
        input: PathBuf,

        /// Import config (TOML)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Import {
            input,
            config,
            report,
            no_smooth_normals,
            sequential,
        } => {
            let mut config = resolve_config(config.as_deref())?;
            if no_smooth_normals {
                config.smooth_normals = false;
            }
            if sequential {
                config.parallel = false;
            }

            let scene = load_gltf(&input)?;
            let model = import_scene(&scene, &CpuBackend::new(), &config)
                .with_context(|| format!("Failed to import {:?}", input))?;

            let stats = model.stats();
            tracing::info!("Representation: {}", model.representation());
            tracing::info!(
                "Geometry: {} vertices ({} bytes/vertex), {} indices, {} submeshes",
                stats.vertices,
                model.vertex_stride(),
                stats.indices,
                stats.submeshes
            );
            tracing::info!("Skeleton: {} nodes, {} bones", stats.skeleton_nodes, stats.bones);
            let bounds = model.bounds();
            tracing::info!("Bounds: {:?} .. {:?}", bounds.min, bounds.max);
            if stats.fallback_vertices > 0 {
                tracing::warn!("{} vertices fell back to bone 0", stats.fallback_vertices);
            }

            if let Some(path) = report {
                report::ImportReport::new(&input, &model).write(&path)?;
                tracing::info!("Report written to {:?}", path);
            }
        }

        Commands::Skeleton { input, config } => {
            let config = resolve_config(config.as_deref())?;
            let scene = load_gltf(&input)?;
            let model = import_scene(&scene, &CpuBackend::new(), &config)
                .with_context(|| format!("Failed to import {:?}", input))?;

            tracing::info!("Skeleton of {:?} ({}):", input, model.representation());
            for row in report::skeleton_rows(&model) {
                let parent = row
                    .parent
                    .map_or_else(|| "-".to_string(), |p| p.to_string());
                let marker = if row.is_bone { " [bone]" } else { "" };
                tracing::info!("  [{}] '{}' parent={}{}", row.index, row.name, parent, marker);
            }
        }
    }

    Ok(())
}

fn resolve_config(path: Option<&Path>) -> Result<ImportConfig> {
    match path {
        Some(path) => report::load_config(path),
        None => Ok(ImportConfig::default()),
    }
}
