#![warn(missing_docs)]
//! Chunk meshing: greedy merging for full cubes, fixed geometry for shaped
//! blocks, and 16-bit-index batches split by render pass.

mod batch;
mod config;
mod greedy;
mod mesher;
mod parallel;
mod shapes;
mod vertex;

pub use batch::{BatchStream, MeshBatch, MeshBatchContainer, MeshHash, MAX_BATCH_VERTICES};
pub use config::MesherConfig;
pub use greedy::MeshScratch;
pub use mesher::{build, build_with_world, ChunkMesher};
pub use parallel::{build_chunks_parallel, ChunkMeshResult};
pub use shapes::{
    shape_quad_count, DOOR_THICKNESS, FENCE_POST_MAX, FENCE_POST_MIN, LADDER_OFFSET,
    LADDER_RAIL_WIDTH, LADDER_RUNGS, LADDER_RUNG_HEIGHT, SLAB_HEIGHT,
};
pub use vertex::{MeshVertex, Quad, EXTRA_TRANSPARENT_BIT};

use thiserror::Error;

/// Errors raised while filling a batch container.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum MeshError {
    /// Geometry was appended after the container had been read.
    #[error("mesh batches are finalized; no more quads can be appended")]
    Finalized,
    /// A quad-local index did not address one of the quad's four vertices.
    #[error("quad-local index {0} is out of range 0..4")]
    QuadIndexOutOfRange(u16),
}
