use rayon::prelude::*;
use voxkit_assets::BlockRegistry;
use voxkit_world::{Chunk, ChunkPos, VoxelQuery};

use crate::greedy::MeshScratch;
use crate::mesher::build_with_scratch;
use crate::{MeshBatchContainer, MeshError, MesherConfig};

/// Result of meshing one chunk on the pool.
pub type ChunkMeshResult = (ChunkPos, Result<MeshBatchContainer, MeshError>);

/// Mesh many chunks on the rayon pool.
///
/// Every worker thread gets its own [`MeshScratch`]; chunks, registry and
/// adapter are only read. Output order matches `chunks`.
pub fn build_chunks_parallel(
    chunks: &[&Chunk],
    registry: &BlockRegistry,
    world: Option<&(dyn VoxelQuery + Sync)>,
    config: &MesherConfig,
) -> Vec<ChunkMeshResult> {
    let config = config.sanitized();
    chunks
        .par_iter()
        .map_init(MeshScratch::new, |scratch, chunk| {
            let world = world.map(|w| w as &dyn VoxelQuery);
            let mesh = build_with_scratch(&config, scratch, chunk, registry, world);
            (chunk.position(), mesh)
        })
        .collect()
}
