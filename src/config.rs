use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};
use tracing::warn;
use voxkit_assets::{
    registry_from_file, BlockColors, BlockDescriptor, BlockRegistry, DetailPattern, ShapeKind,
};
use voxkit_mesh::MesherConfig;

pub const DEFAULT_CONFIG_PATH: &str = "config/voxkit.toml";
pub const DEFAULT_BLOCKS_PATH: &str = "config/blocks.json";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct AppConfig {
    pub mesher: MesherConfig,
    pub demo: DemoConfig,
}

/// Shape of the generated demo world.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DemoConfig {
    /// Chunks generated in each direction around the origin chunk.
    pub chunk_radius: i32,
    /// Terrain surface height in voxels.
    pub ground_height: usize,
    /// Open every door placed in an odd chunk.
    pub open_doors: bool,
    /// Mesh chunks on the rayon pool.
    pub parallel: bool,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            chunk_radius: 2,
            ground_height: 40,
            open_doors: true,
            parallel: true,
        }
    }
}

impl AppConfig {
    /// Load configuration from an explicit path, falling back to defaults on errors.
    pub fn load_from_path(path: &Path) -> Self {
        let config = match fs::read_to_string(path) {
            Ok(contents) => match toml::from_str::<AppConfig>(&contents) {
                Ok(cfg) => cfg,
                Err(err) => {
                    warn!("Failed to parse {}: {err}. Using defaults", path.display());
                    AppConfig::default()
                }
            },
            Err(err) => {
                if path != Path::new(DEFAULT_CONFIG_PATH)
                    || err.kind() != std::io::ErrorKind::NotFound
                {
                    warn!("Failed to read {}: {err}. Using defaults", path.display());
                } else {
                    warn!("Config not found at {}. Using defaults", path.display());
                }
                AppConfig::default()
            }
        };
        config.sanitized()
    }

    /// Save configuration to an explicit path.
    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        let toml = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, toml)?;
        Ok(())
    }

    fn sanitized(mut self) -> Self {
        let mesher = self.mesher.sanitized();
        if mesher != self.mesher {
            warn!(
                requested = self.mesher.max_batch_vertices,
                used = mesher.max_batch_vertices,
                "Batch limits out of range; clamped"
            );
        }
        self.mesher = mesher;
        self.demo.chunk_radius = self.demo.chunk_radius.max(0);
        self
    }
}

/// Load the block registry from a JSON pack, falling back to the built-in pack.
pub fn load_block_registry(path: &Path) -> BlockRegistry {
    match registry_from_file(path) {
        Ok(registry) => registry,
        Err(err) => {
            warn!(
                "Failed to load block pack {}: {err:#}. Using defaults",
                path.display()
            );
            default_block_registry()
        }
    }
}

pub fn default_block_registry() -> BlockRegistry {
    BlockRegistry::new(vec![
        BlockDescriptor::air(),
        BlockDescriptor::cube("stone", [0.5, 0.5, 0.52]),
        BlockDescriptor::cube("dirt", [0.45, 0.32, 0.2]),
        BlockDescriptor::cube("grass", [0.3, 0.65, 0.2]).with_colors(BlockColors {
            top: [0.3, 0.65, 0.2],
            side: [0.45, 0.4, 0.22],
            bottom: [0.45, 0.32, 0.2],
        }),
        BlockDescriptor::cube("sand", [0.86, 0.8, 0.55])
            .with_detail(DetailPattern::Speckle { amplitude: 0.12 }),
        BlockDescriptor::glass("glass", [0.8, 0.92, 1.0]),
        BlockDescriptor::shaped("oak_fence", ShapeKind::FencePost, [0.6, 0.45, 0.28]),
        BlockDescriptor::shaped("oak_door_lower", ShapeKind::DoorLower, [0.55, 0.4, 0.24]),
        BlockDescriptor::shaped("oak_door_upper", ShapeKind::DoorUpper, [0.55, 0.4, 0.24]),
        BlockDescriptor::shaped("stone_stairs", ShapeKind::StairStep, [0.5, 0.5, 0.52]),
        BlockDescriptor::shaped("ladder", ShapeKind::Ladder, [0.62, 0.47, 0.3]),
        BlockDescriptor::shaped("stone_slab", ShapeKind::HalfSlab, [0.5, 0.5, 0.52]),
    ])
}
