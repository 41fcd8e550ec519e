//! voxkit - greedy chunk mesher demo
//!
//! Builds a small demo world, meshes every chunk, toggles one door to show a
//! single-chunk remesh and writes mesh metrics as JSON.

mod config;
mod driver;
mod scene;

use std::path::PathBuf;
use std::time::Instant;

use anyhow::Result;
use clap::Parser;
use config::{AppConfig, DEFAULT_BLOCKS_PATH, DEFAULT_CONFIG_PATH};
use driver::{ChunkMeshDriver, MeshPass};
use tracing::info;
use voxkit_world::{ChunkPos, VoxelQuery};

#[derive(Parser, Debug)]
#[command(author, version, about = "Mesh a demo voxel world and report batch statistics", long_about = None)]
struct Args {
    /// Block pack (JSON)
    #[arg(long, default_value = DEFAULT_BLOCKS_PATH)]
    blocks: PathBuf,
    /// Mesher and demo settings (TOML)
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,
    /// Where to write the mesh metrics report
    #[arg(long, default_value = "target/mesh_metrics.json")]
    mesh_metrics: PathBuf,
    /// Chunks generated in each direction around the origin (overrides the config)
    #[arg(long)]
    radius: Option<i32>,
    /// Mesh on the calling thread instead of the rayon pool
    #[arg(long)]
    sequential: bool,
    /// Write the effective settings as TOML before meshing
    #[arg(long)]
    save_config: Option<PathBuf>,
}

fn main() -> Result<()> {
    // WARN by default; RUST_LOG overrides.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let args = Args::parse();
    info!("Starting voxkit v{}", env!("CARGO_PKG_VERSION"));

    let mut app = AppConfig::load_from_path(&args.config);
    if let Some(radius) = args.radius {
        app.demo.chunk_radius = radius.max(0);
    }
    if args.sequential {
        app.demo.parallel = false;
    }
    if let Some(path) = &args.save_config {
        app.save_to_path(path)?;
        info!(path = %path.display(), "saved settings");
    }
    let registry = config::load_block_registry(&args.blocks);
    info!(blocks = registry.len(), "block pack ready");

    let mut world = scene::build_demo_world(&registry, &app.demo);
    let mut driver =
        ChunkMeshDriver::new(&mut world, &registry, &app.mesher).with_parallel(app.demo.parallel);

    let start = Instant::now();
    let first = driver.process();
    let first_time = start.elapsed();
    print_pass("initial", &first, first_time);

    // Flip the origin chunk's door; only that chunk should be rebuilt.
    let door = scene::door_position(ChunkPos::new(0, 0), &app.demo);
    let open = driver.storage_mut().is_panel_open(door[0], door[1], door[2]);
    driver.storage_mut().set_panel_open(door, !open);
    let start = Instant::now();
    let second = driver.process();
    print_pass("door toggle", &second, start.elapsed());

    let report = ChunkMeshDriver::write_metrics_to_file("demo", &first, &args.mesh_metrics)?;
    println!(
        "Wrote metrics for {} chunks ({} triangles) to {}",
        report.chunks_meshed,
        report.total_triangles,
        args.mesh_metrics.display()
    );

    if !first.failed.is_empty() || !second.failed.is_empty() {
        anyhow::bail!(
            "{} chunk(s) failed to mesh",
            first.failed.len() + second.failed.len()
        );
    }
    Ok(())
}

fn print_pass(label: &str, pass: &MeshPass, elapsed: std::time::Duration) {
    let quads: usize = pass.stats.iter().map(|s| s.quads).sum();
    let batches: usize = pass
        .stats
        .iter()
        .map(|s| s.opaque_batches + s.transparent_batches)
        .sum();
    println!(
        "{label}: {} chunk(s) meshed, {quads} quads in {batches} batches ({:.2?})",
        pass.stats.len(),
        elapsed
    );
    for stat in &pass.stats {
        info!(
            chunk = %stat.position,
            quads = stat.quads,
            vertices = stat.vertices,
            opaque = stat.opaque_batches,
            transparent = stat.transparent_batches,
            hash = %stat.hash,
            "chunk mesh"
        );
    }
    for (pos, err) in &pass.failed {
        tracing::error!(chunk = %pos, error = %err, "chunk mesh failed");
    }
}
