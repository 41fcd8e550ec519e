use crate::{BlockId, Chunk, BLOCK_AIR};

/// Read-only voxel lookups in world coordinates.
///
/// Implementations must return [`BLOCK_AIR`] for any position that is not
/// backed by loaded data.
pub trait VoxelQuery {
    /// Block id at a world position.
    fn block_at(&self, x: i32, y: i32, z: i32) -> BlockId;

    /// Whether the hinged panel whose lower half sits at this world position is open.
    fn is_panel_open(&self, _x: i32, _y: i32, _z: i32) -> bool {
        false
    }
}

impl<T: VoxelQuery + ?Sized> VoxelQuery for &T {
    fn block_at(&self, x: i32, y: i32, z: i32) -> BlockId {
        (**self).block_at(x, y, z)
    }

    fn is_panel_open(&self, x: i32, y: i32, z: i32) -> bool {
        (**self).is_panel_open(x, y, z)
    }
}

/// Adapter over a single chunk: everything outside it reads as air.
pub struct ChunkQuery<'a> {
    chunk: &'a Chunk,
}

impl<'a> ChunkQuery<'a> {
    /// Wrap a chunk.
    pub fn new(chunk: &'a Chunk) -> Self {
        Self { chunk }
    }
}

impl VoxelQuery for ChunkQuery<'_> {
    fn block_at(&self, x: i32, y: i32, z: i32) -> BlockId {
        let [ox, oy, oz] = self.chunk.world_origin();
        self.chunk
            .block_checked(x - ox, y - oy, z - oz)
            .unwrap_or(BLOCK_AIR)
    }
}

/// Adapter built from a closure, handy for tests and ad-hoc worlds.
pub struct FnQuery<F> {
    block_at: F,
}

impl<F> FnQuery<F>
where
    F: Fn(i32, i32, i32) -> BlockId,
{
    /// Wrap a `(x, y, z) -> BlockId` sampler.
    pub fn new(block_at: F) -> Self {
        Self { block_at }
    }
}

impl<F> VoxelQuery for FnQuery<F>
where
    F: Fn(i32, i32, i32) -> BlockId,
{
    fn block_at(&self, x: i32, y: i32, z: i32) -> BlockId {
        (self.block_at)(x, y, z)
    }
}
