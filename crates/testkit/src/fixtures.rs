//! Canned block packs and chunk layouts shared by mesher tests.

use voxkit_assets::{
    BlockColors, BlockDescriptor, BlockRegistry, DetailPattern, ShapeKind,
};
use voxkit_world::{BlockId, Chunk, ChunkPos, BLOCK_AIR, CHUNK_SIZE};

/// Ids in [`reference_registry`].
pub mod ids {
    use voxkit_world::BlockId;

    /// Air.
    pub const AIR: BlockId = 0;
    /// Opaque gray cube.
    pub const STONE: BlockId = 1;
    /// Opaque cube with distinct top/side/bottom colors.
    pub const GRASS: BlockId = 2;
    /// Opaque cube with a speckle pattern; never merged.
    pub const SAND: BlockId = 3;
    /// Transparent cube.
    pub const GLASS: BlockId = 4;
    /// Fence post.
    pub const FENCE: BlockId = 5;
    /// Lower door half.
    pub const DOOR_LOWER: BlockId = 6;
    /// Upper door half.
    pub const DOOR_UPPER: BlockId = 7;
    /// Stair.
    pub const STAIR: BlockId = 8;
    /// Ladder.
    pub const LADDER: BlockId = 9;
    /// Half slab.
    pub const SLAB: BlockId = 10;
    /// Block whose shape the mesher does not know.
    pub const TORCH: BlockId = 11;
    /// Opaque cube, second material for merge-boundary tests.
    pub const DIRT: BlockId = 12;
}

/// Registry covering every shape kind plus glass and a detail block.
pub fn reference_registry() -> BlockRegistry {
    BlockRegistry::new(vec![
        BlockDescriptor::air(),
        BlockDescriptor::cube("stone", [0.5, 0.5, 0.5]),
        BlockDescriptor::cube("grass", [0.3, 0.7, 0.2]).with_colors(BlockColors {
            top: [0.3, 0.7, 0.2],
            side: [0.5, 0.4, 0.2],
            bottom: [0.4, 0.3, 0.2],
        }),
        BlockDescriptor::cube("sand", [0.9, 0.8, 0.5])
            .with_detail(DetailPattern::Speckle { amplitude: 0.2 }),
        BlockDescriptor::glass("glass", [0.8, 0.9, 1.0]),
        BlockDescriptor::shaped("fence", ShapeKind::FencePost, [0.6, 0.45, 0.3]),
        BlockDescriptor::shaped("door_lower", ShapeKind::DoorLower, [0.55, 0.4, 0.25]),
        BlockDescriptor::shaped("door_upper", ShapeKind::DoorUpper, [0.55, 0.4, 0.25]),
        BlockDescriptor::shaped("stair", ShapeKind::StairStep, [0.5, 0.5, 0.5]),
        BlockDescriptor::shaped("ladder", ShapeKind::Ladder, [0.6, 0.45, 0.3]),
        BlockDescriptor::shaped("slab", ShapeKind::HalfSlab, [0.5, 0.5, 0.5]),
        BlockDescriptor::shaped("torch", ShapeKind::Unsupported, [1.0, 0.8, 0.3]),
        BlockDescriptor::cube("dirt", [0.4, 0.3, 0.2]),
    ])
}

/// Chunk at the origin with the listed voxels set.
pub fn chunk_with(cells: &[([usize; 3], BlockId)]) -> Chunk {
    let mut chunk = Chunk::new(ChunkPos::new(0, 0));
    for &([x, y, z], id) in cells {
        chunk.set_block(x, y, z, id);
    }
    chunk
}

/// Chunk filled with a 3D checkerboard of `id` over `layers` bottom layers.
///
/// No two filled voxels share a face, so nothing merges and every filled
/// voxel shows six faces.
pub fn checkerboard_chunk(id: BlockId, layers: usize) -> Chunk {
    let mut chunk = Chunk::new(ChunkPos::new(0, 0));
    for y in 0..layers {
        for z in 0..CHUNK_SIZE {
            for x in 0..CHUNK_SIZE {
                let cell = if (x + y + z) % 2 == 0 { id } else { BLOCK_AIR };
                chunk.set_block(x, y, z, cell);
            }
        }
    }
    chunk
}
