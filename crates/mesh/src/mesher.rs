use voxkit_assets::{BlockFace, BlockRegistry, Rgb};
use voxkit_world::{BlockId, Chunk, VoxelQuery, BLOCK_AIR};

use crate::greedy::{GreedyMesher, MeshScratch};
use crate::shapes::emit_shaped_voxels;
use crate::{MeshBatchContainer, MeshError, MesherConfig};

/// Read-only view shared by both meshing stages.
pub(crate) struct MeshContext<'a> {
    pub chunk: &'a Chunk,
    pub registry: &'a BlockRegistry,
    world: Option<&'a dyn VoxelQuery>,
    origin: [i32; 3],
}

impl<'a> MeshContext<'a> {
    pub fn new(
        chunk: &'a Chunk,
        registry: &'a BlockRegistry,
        world: Option<&'a dyn VoxelQuery>,
    ) -> Self {
        Self {
            chunk,
            registry,
            world,
            origin: chunk.world_origin(),
        }
    }

    /// Block at an in-chunk position.
    pub fn chunk_block(&self, pos: [i32; 3]) -> BlockId {
        self.chunk
            .block_checked(pos[0], pos[1], pos[2])
            .unwrap_or(BLOCK_AIR)
    }

    /// Block at a chunk-local position that may lie outside the chunk.
    ///
    /// Out-of-chunk lookups go through the world adapter, or read as air
    /// without one.
    pub fn block_at_local(&self, pos: [i32; 3]) -> BlockId {
        match self.chunk.block_checked(pos[0], pos[1], pos[2]) {
            Some(id) => id,
            None => self.world.map_or(BLOCK_AIR, |world| {
                let [x, y, z] = self.world_pos(pos);
                world.block_at(x, y, z)
            }),
        }
    }

    pub fn world_pos(&self, local: [i32; 3]) -> [i32; 3] {
        [
            self.origin[0] + local[0],
            self.origin[1] + local[1],
            self.origin[2] + local[2],
        ]
    }

    pub fn is_panel_open(&self, world: [i32; 3]) -> bool {
        self.world
            .is_some_and(|w| w.is_panel_open(world[0], world[1], world[2]))
    }

    pub fn has_detail(&self, id: BlockId) -> bool {
        self.registry
            .descriptor(id)
            .is_some_and(|desc| desc.has_detail())
    }

    /// Color and pass for a face of the voxel at chunk-local `voxel`.
    pub fn surface(&self, id: BlockId, face: BlockFace, voxel: [i32; 3]) -> (Rgb, bool) {
        match self.registry.descriptor(id) {
            Some(desc) => (
                desc.color_for(face, self.world_pos(voxel)),
                desc.transparent,
            ),
            None => ([1.0, 0.0, 1.0], false),
        }
    }
}

/// Chunk mesher owning its batch limits and slice scratch.
///
/// One mesher per worker; see [`crate::build_chunks_parallel`] for the pooled
/// variant.
#[derive(Debug, Default)]
pub struct ChunkMesher {
    config: MesherConfig,
    scratch: MeshScratch,
}

impl ChunkMesher {
    /// Mesher with the given (sanitized) limits.
    pub fn new(config: MesherConfig) -> Self {
        Self {
            config: config.sanitized(),
            scratch: MeshScratch::new(),
        }
    }

    /// Limits in effect.
    pub fn config(&self) -> &MesherConfig {
        &self.config
    }

    /// Mesh one chunk. `world` answers lookups past the chunk border and
    /// door panel state; without it neighbors read as air and doors as closed.
    pub fn build(
        &mut self,
        chunk: &Chunk,
        registry: &BlockRegistry,
        world: Option<&dyn VoxelQuery>,
    ) -> Result<MeshBatchContainer, MeshError> {
        build_with_scratch(&self.config, &mut self.scratch, chunk, registry, world)
    }
}

/// Mesh one chunk with default limits and no neighbor adapter.
pub fn build(chunk: &Chunk, registry: &BlockRegistry) -> Result<MeshBatchContainer, MeshError> {
    ChunkMesher::default().build(chunk, registry, None)
}

/// Mesh one chunk with default limits, consulting `world` at chunk borders.
pub fn build_with_world(
    chunk: &Chunk,
    registry: &BlockRegistry,
    world: &dyn VoxelQuery,
) -> Result<MeshBatchContainer, MeshError> {
    ChunkMesher::default().build(chunk, registry, Some(world))
}

pub(crate) fn build_with_scratch(
    config: &MesherConfig,
    scratch: &mut MeshScratch,
    chunk: &Chunk,
    registry: &BlockRegistry,
    world: Option<&dyn VoxelQuery>,
) -> Result<MeshBatchContainer, MeshError> {
    let mut out = MeshBatchContainer::new(config);
    let ctx = MeshContext::new(chunk, registry, world);

    GreedyMesher::mesh(&ctx, scratch, &mut out)?;
    let cube_faces = out.face_count();
    emit_shaped_voxels(&ctx, &mut out)?;

    tracing::debug!(
        chunk = %chunk.position(),
        cube_faces,
        shaped_faces = out.face_count() - cube_faces,
        "chunk meshed"
    );
    out.seal();
    Ok(out)
}
