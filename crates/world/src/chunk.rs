use std::fmt;

use thiserror::Error;

/// Chunk width along X and depth along Z, in voxels.
pub const CHUNK_SIZE: usize = 16;
/// Chunk height (Y axis) in voxels.
pub const CHUNK_HEIGHT: usize = 256;
/// Total voxel count per chunk.
pub const CHUNK_VOLUME: usize = CHUNK_SIZE * CHUNK_HEIGHT * CHUNK_SIZE;
/// Per-axis extents indexed by axis (0 = X, 1 = Y, 2 = Z).
pub const CHUNK_EXTENT: [usize; 3] = [CHUNK_SIZE, CHUNK_HEIGHT, CHUNK_SIZE];

/// Block identifier referencing the block registry.
pub type BlockId = u16;

/// Reserved ID for air.
pub const BLOCK_AIR: BlockId = 0;

/// Errors raised when chunk data does not match the configured dimensions.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ChunkError {
    /// The supplied block array has the wrong number of voxels.
    #[error("chunk block array has {actual} voxels, expected {expected}")]
    DimensionMismatch {
        /// Voxel count required by `CHUNK_VOLUME`.
        expected: usize,
        /// Voxel count that was supplied.
        actual: usize,
    },
}

/// Chunk-local position (X, Y, Z).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LocalPos {
    pub x: usize,
    pub y: usize,
    pub z: usize,
}

impl LocalPos {
    /// Convert to a linear index into the block array.
    pub fn index(self) -> usize {
        debug_assert!(self.x < CHUNK_SIZE);
        debug_assert!(self.y < CHUNK_HEIGHT);
        debug_assert!(self.z < CHUNK_SIZE);
        (self.y * CHUNK_SIZE + self.z) * CHUNK_SIZE + self.x
    }
}

/// Chunk coordinate (X,Z) in chunk space.
/// Implements Ord for deterministic iteration in BTreeMap/BTreeSet (sorts by x, then z).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
pub struct ChunkPos {
    pub x: i32,
    pub z: i32,
}

impl ChunkPos {
    pub const fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    /// Chunk containing the given world column.
    pub fn containing(world_x: i32, world_z: i32) -> Self {
        let size = CHUNK_SIZE as i32;
        Self {
            x: world_x.div_euclid(size),
            z: world_z.div_euclid(size),
        }
    }

    /// World coordinates of this chunk's (0, 0, 0) voxel.
    pub fn world_origin(self) -> [i32; 3] {
        [self.x * CHUNK_SIZE as i32, 0, self.z * CHUNK_SIZE as i32]
    }
}

impl fmt::Display for ChunkPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.z)
    }
}

bitflags::bitflags! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    /// Dirty flags set whenever chunk data changes.
    pub struct DirtyFlags: u8 {
        const MESH = 0b0000_0001;
    }
}

impl Default for DirtyFlags {
    fn default() -> Self {
        DirtyFlags::empty()
    }
}

/// Fixed-size column of block ids plus dirty flags.
///
/// The mesher only reads chunks; callers must not mutate a chunk while it is
/// being meshed.
#[derive(Clone)]
pub struct Chunk {
    position: ChunkPos,
    blocks: Vec<BlockId>,
    dirty: DirtyFlags,
}

impl Chunk {
    /// Allocate a fresh chunk filled with air.
    pub fn new(position: ChunkPos) -> Self {
        Self {
            position,
            blocks: vec![BLOCK_AIR; CHUNK_VOLUME],
            dirty: DirtyFlags::all(),
        }
    }

    /// Wrap an existing block array laid out by [`LocalPos::index`].
    pub fn from_blocks(position: ChunkPos, blocks: Vec<BlockId>) -> Result<Self, ChunkError> {
        if blocks.len() != CHUNK_VOLUME {
            return Err(ChunkError::DimensionMismatch {
                expected: CHUNK_VOLUME,
                actual: blocks.len(),
            });
        }
        Ok(Self {
            position,
            blocks,
            dirty: DirtyFlags::all(),
        })
    }

    #[inline]
    pub fn position(&self) -> ChunkPos {
        self.position
    }

    /// World coordinates of the chunk's local origin.
    #[inline]
    pub fn world_origin(&self) -> [i32; 3] {
        self.position.world_origin()
    }

    fn index(x: usize, y: usize, z: usize) -> usize {
        LocalPos { x, y, z }.index()
    }

    /// Block id at a chunk-local position.
    #[inline]
    pub fn block(&self, x: usize, y: usize, z: usize) -> BlockId {
        self.blocks[Self::index(x, y, z)]
    }

    /// Block id at a signed chunk-local position, or `None` outside the chunk.
    #[inline]
    pub fn block_checked(&self, x: i32, y: i32, z: i32) -> Option<BlockId> {
        if x < 0
            || y < 0
            || z < 0
            || x >= CHUNK_SIZE as i32
            || y >= CHUNK_HEIGHT as i32
            || z >= CHUNK_SIZE as i32
        {
            return None;
        }
        Some(self.block(x as usize, y as usize, z as usize))
    }

    /// Set a block and mark the mesh dirty when it changes.
    pub fn set_block(&mut self, x: usize, y: usize, z: usize, id: BlockId) {
        let idx = Self::index(x, y, z);
        if self.blocks[idx] != id {
            self.blocks[idx] = id;
            self.dirty.insert(DirtyFlags::MESH);
        }
    }

    /// Fill an inclusive-exclusive box of local positions with one block.
    pub fn fill(&mut self, min: [usize; 3], max: [usize; 3], id: BlockId) {
        for y in min[1]..max[1].min(CHUNK_HEIGHT) {
            for z in min[2]..max[2].min(CHUNK_SIZE) {
                for x in min[0]..max[0].min(CHUNK_SIZE) {
                    self.set_block(x, y, z, id);
                }
            }
        }
    }

    /// Borrow raw block storage.
    pub fn blocks(&self) -> &[BlockId] {
        &self.blocks
    }

    /// True when every voxel is air.
    pub fn is_empty(&self) -> bool {
        self.blocks.iter().all(|&id| id == BLOCK_AIR)
    }

    /// Flag the chunk for rebuild without touching its blocks.
    pub fn mark_dirty(&mut self, flags: DirtyFlags) {
        self.dirty.insert(flags);
    }

    /// Consume and return the current dirty flags.
    pub fn take_dirty_flags(&mut self) -> DirtyFlags {
        let flags = self.dirty;
        self.dirty = DirtyFlags::empty();
        flags
    }
}
