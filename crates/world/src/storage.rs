use std::collections::{BTreeMap, BTreeSet};
use std::num::NonZeroUsize;

use lru::LruCache;

use crate::{BlockId, Chunk, ChunkPos, DirtyFlags, VoxelQuery, BLOCK_AIR};

/// In-memory chunk arena with an LRU eviction policy.
/// Uses BTreeMap for deterministic iteration order.
///
/// Also records which hinged panels (doors) are open, keyed by the world
/// position of the panel's lower half.
pub struct ChunkStorage {
    chunks: BTreeMap<ChunkPos, Chunk>,
    lru: LruCache<ChunkPos, ()>,
    capacity: usize,
    open_panels: BTreeSet<[i32; 3]>,
}

impl ChunkStorage {
    /// Create a storage with the desired maximum chunk count.
    pub fn new(capacity: usize) -> Self {
        let cap = NonZeroUsize::new(capacity.max(1)).unwrap_or(NonZeroUsize::MIN);
        Self {
            chunks: BTreeMap::new(),
            lru: LruCache::new(cap),
            capacity: cap.get(),
            open_panels: BTreeSet::new(),
        }
    }

    /// Number of resident chunks.
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    /// Returns true when no chunks are currently stored.
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Obtain mutable access to a chunk, creating it if necessary.
    pub fn ensure_chunk(&mut self, pos: ChunkPos) -> &mut Chunk {
        if !self.chunks.contains_key(&pos) {
            self.evict_if_needed();
            tracing::trace!(%pos, "allocating chunk");
        }
        self.touch(pos);
        self.chunks.entry(pos).or_insert_with(|| Chunk::new(pos))
    }

    /// Insert a fully built chunk, replacing any previous one at the same position.
    pub fn insert(&mut self, chunk: Chunk) {
        let pos = chunk.position();
        if !self.chunks.contains_key(&pos) {
            self.evict_if_needed();
        }
        self.chunks.insert(pos, chunk);
        self.touch(pos);
    }

    /// Attempt to fetch a chunk immutably.
    pub fn get(&self, pos: ChunkPos) -> Option<&Chunk> {
        self.chunks.get(&pos)
    }

    /// Fetch a chunk mutably (without creating it).
    pub fn get_mut(&mut self, pos: ChunkPos) -> Option<&mut Chunk> {
        if self.chunks.contains_key(&pos) {
            self.touch(pos);
        }
        self.chunks.get_mut(&pos)
    }

    /// Iterate over currently resident chunk positions.
    pub fn iter_positions(&self) -> impl Iterator<Item = ChunkPos> + '_ {
        self.chunks.keys().copied()
    }

    /// Iterate over resident chunks in position order.
    pub fn iter_chunks(&self) -> impl Iterator<Item = &Chunk> + '_ {
        self.chunks.values()
    }

    /// Open or close the panel whose lower half sits at `pos`.
    ///
    /// Returns true when the stored state changed.
    pub fn set_panel_open(&mut self, pos: [i32; 3], open: bool) -> bool {
        let changed = if open {
            self.open_panels.insert(pos)
        } else {
            self.open_panels.remove(&pos)
        };
        if changed {
            let chunk_pos = ChunkPos::containing(pos[0], pos[2]);
            if let Some(chunk) = self.chunks.get_mut(&chunk_pos) {
                // Panel state lives outside the block array.
                chunk.mark_dirty(DirtyFlags::MESH);
            }
        }
        changed
    }

    fn touch(&mut self, pos: ChunkPos) {
        self.lru.put(pos, ());
    }

    fn evict_if_needed(&mut self) {
        while self.chunks.len() >= self.capacity {
            if let Some((oldest, _)) = self.lru.pop_lru() {
                tracing::debug!(pos = %oldest, "evicting chunk");
                self.chunks.remove(&oldest);
            } else {
                break;
            }
        }
    }
}

impl VoxelQuery for ChunkStorage {
    fn block_at(&self, x: i32, y: i32, z: i32) -> BlockId {
        let pos = ChunkPos::containing(x, z);
        let Some(chunk) = self.chunks.get(&pos) else {
            return BLOCK_AIR;
        };
        let [ox, oy, oz] = pos.world_origin();
        chunk.block_checked(x - ox, y - oy, z - oz).unwrap_or(BLOCK_AIR)
    }

    fn is_panel_open(&self, x: i32, y: i32, z: i32) -> bool {
        self.open_panels.contains(&[x, y, z])
    }
}
