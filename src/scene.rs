//! Procedural demo world: rolling ground, sand speckles, a glass wall and one
//! of every shaped block per chunk.

use voxkit_assets::{hash3d, BlockRegistry};
use voxkit_world::{BlockId, ChunkPos, ChunkStorage, BLOCK_AIR, CHUNK_HEIGHT, CHUNK_SIZE};

use crate::config::DemoConfig;

/// Block ids the generator places, resolved by name.
struct Palette {
    dirt: BlockId,
    grass: BlockId,
    sand: BlockId,
    glass: BlockId,
    fence: BlockId,
    door_lower: BlockId,
    door_upper: BlockId,
    stairs: BlockId,
    ladder: BlockId,
    slab: BlockId,
}

impl Palette {
    fn resolve(registry: &BlockRegistry) -> Self {
        let id = |name: &str| {
            registry.id_by_name(name).unwrap_or_else(|| {
                tracing::warn!(block = name, "block missing from pack; leaving it out");
                BLOCK_AIR
            })
        };
        Self {
            dirt: id("dirt"),
            grass: id("grass"),
            sand: id("sand"),
            glass: id("glass"),
            fence: id("oak_fence"),
            door_lower: id("oak_door_lower"),
            door_upper: id("oak_door_upper"),
            stairs: id("stone_stairs"),
            ladder: id("ladder"),
            slab: id("stone_slab"),
        }
    }
}

const DOOR_LOCAL: [usize; 2] = [4, 4];

fn ground_height(config: &DemoConfig) -> usize {
    config.ground_height.clamp(1, CHUNK_HEIGHT - 8)
}

/// World position of the lower door half placed in `chunk`.
pub fn door_position(chunk: ChunkPos, config: &DemoConfig) -> [i32; 3] {
    let [ox, _, oz] = chunk.world_origin();
    [
        ox + DOOR_LOCAL[0] as i32,
        (ground_height(config) + 4) as i32,
        oz + DOOR_LOCAL[1] as i32,
    ]
}

/// Generate every chunk within `chunk_radius` of the origin.
pub fn build_demo_world(registry: &BlockRegistry, config: &DemoConfig) -> ChunkStorage {
    let palette = Palette::resolve(registry);
    let radius = config.chunk_radius;
    let side = (2 * radius + 1) as usize;
    let mut storage = ChunkStorage::new(side * side);
    let ground = ground_height(config);

    for cz in -radius..=radius {
        for cx in -radius..=radius {
            let pos = ChunkPos::new(cx, cz);
            let [ox, _, oz] = pos.world_origin();
            let chunk = storage.ensure_chunk(pos);

            for z in 0..CHUNK_SIZE {
                for x in 0..CHUNK_SIZE {
                    let (wx, wz) = (ox + x as i32, oz + z as i32);
                    let bump = (hash3d(wx.div_euclid(4), 0, wz.div_euclid(4)) * 3.0) as usize;
                    let top = ground + bump;
                    chunk.fill([x, 0, z], [x + 1, top - 1, z + 1], palette.dirt);
                    let surface = if hash3d(wx, 1, wz) > 0.85 {
                        palette.sand
                    } else {
                        palette.grass
                    };
                    chunk.set_block(x, top - 1, z, surface);
                }
            }

            let base = ground + 4;
            chunk.fill([1, base, 12], [9, base + 3, 13], palette.glass);
            chunk.set_block(2, base, 4, palette.fence);
            let [dx, dz] = DOOR_LOCAL;
            chunk.set_block(dx, base, dz, palette.door_lower);
            chunk.set_block(dx, base + 1, dz, palette.door_upper);
            chunk.set_block(6, base, 4, palette.stairs);
            chunk.set_block(8, base, 4, palette.ladder);
            chunk.set_block(10, base, 4, palette.slab);

            if config.open_doors && (cx + cz).rem_euclid(2) == 1 {
                storage.set_panel_open(door_position(pos, config), true);
            }
        }
    }
    tracing::debug!(chunks = storage.len(), "demo world generated");
    storage
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::default_block_registry;
    use voxkit_world::VoxelQuery;

    #[test]
    fn builds_square_of_chunks_with_shapes() {
        let registry = default_block_registry();
        let config = DemoConfig {
            chunk_radius: 1,
            ..DemoConfig::default()
        };
        let world = build_demo_world(&registry, &config);
        assert_eq!(world.len(), 9);

        let door = registry.id_by_name("oak_door_lower").unwrap();
        let [x, y, z] = door_position(ChunkPos::new(0, 0), &config);
        assert_eq!([x, y, z], [4, config.ground_height as i32 + 4, 4]);
        assert_eq!(world.block_at(x, y, z), door);
        assert!(!world.is_panel_open(x, y, z));
        let [x, y, z] = door_position(ChunkPos::new(1, 0), &config);
        assert!(world.is_panel_open(x, y, z));
    }

    #[test]
    fn generation_is_deterministic() {
        let registry = default_block_registry();
        let config = DemoConfig::default();
        let a = build_demo_world(&registry, &config);
        let b = build_demo_world(&registry, &config);
        for (ca, cb) in a.iter_chunks().zip(b.iter_chunks()) {
            assert_eq!(ca.blocks(), cb.blocks());
        }
    }
}
