//! Vertex/index batches capped at a 16-bit index range.
//!
//! Quads stream into an active batch. When the next quad would push the
//! active batch past its vertex ceiling, the batch is sealed and a fresh one
//! starts; indices are always local to their batch. The last, partially
//! filled batch is sealed either by [`MeshBatchContainer::seal`], which moves
//! it out of the active buffer, or lazily the first time any reader asks for
//! it. Either way the stream rejects further quads afterwards.

use std::cell::OnceCell;
use std::fmt;

use blake3::Hasher;

use crate::{MeshError, MeshVertex, MesherConfig, Quad};

/// Largest vertex count a batch may hold: the biggest multiple of 4 whose
/// indices all fit below `u16::MAX`.
pub const MAX_BATCH_VERTICES: usize = 65532;

const QUAD_VERTICES: usize = 4;
const QUAD_INDICES: usize = 6;

/// Stable hash of every batch in a container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MeshHash(pub [u8; 32]);

impl fmt::Display for MeshHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

/// One draw-call worth of geometry.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshBatch {
    /// Vertex buffer.
    pub vertices: Vec<MeshVertex>,
    /// Triangle list indexing into `vertices`.
    pub indices: Vec<u16>,
}

impl MeshBatch {
    fn with_capacity(vertices: usize) -> Self {
        Self {
            vertices: Vec::with_capacity(vertices),
            indices: Vec::with_capacity(vertices / QUAD_VERTICES * QUAD_INDICES),
        }
    }

    /// Number of quads stored.
    pub fn quad_count(&self) -> usize {
        self.vertices.len() / QUAD_VERTICES
    }

    fn compacted(mut self) -> Self {
        self.vertices.shrink_to_fit();
        self.indices.shrink_to_fit();
        self
    }
}

/// Append-only sequence of batches for one render pass.
#[derive(Debug)]
pub struct BatchStream {
    ceiling: usize,
    initial_capacity: usize,
    sealed: Vec<MeshBatch>,
    active: MeshBatch,
    tail: OnceCell<Option<MeshBatch>>,
    quads: usize,
}

impl Default for BatchStream {
    fn default() -> Self {
        Self::new(&MesherConfig::default())
    }
}

impl BatchStream {
    /// Empty stream using the (sanitized) limits from `config`.
    pub fn new(config: &MesherConfig) -> Self {
        let config = config.sanitized();
        Self {
            ceiling: config.max_batch_vertices,
            initial_capacity: config.initial_batch_vertices,
            sealed: Vec::new(),
            active: MeshBatch::default(),
            tail: OnceCell::new(),
            quads: 0,
        }
    }

    /// Vertex ceiling per batch.
    pub fn ceiling(&self) -> usize {
        self.ceiling
    }

    /// Append one quad given its four vertices and six quad-local indices (0..4).
    pub fn push_quad(
        &mut self,
        vertices: [MeshVertex; 4],
        local_indices: [u16; 6],
    ) -> Result<(), MeshError> {
        if self.is_finalized() {
            return Err(MeshError::Finalized);
        }
        if let Some(&index) = local_indices
            .iter()
            .find(|&&i| usize::from(i) >= QUAD_VERTICES)
        {
            return Err(MeshError::QuadIndexOutOfRange(index));
        }
        if self.active.vertices.len() + QUAD_VERTICES > self.ceiling {
            self.seal_active();
        }
        self.reserve_quad();

        // Ceiling <= 65532 keeps every base + 3 inside u16.
        let base = self.active.vertices.len() as u16;
        self.active.vertices.extend_from_slice(&vertices);
        self.active
            .indices
            .extend(local_indices.iter().map(|&i| base + i));
        self.quads += 1;
        Ok(())
    }

    fn seal_active(&mut self) {
        let fresh = MeshBatch::with_capacity(self.initial_capacity);
        let full = std::mem::replace(&mut self.active, fresh);
        self.sealed.push(full.compacted());
        tracing::trace!(sealed = self.sealed.len(), "batch reached vertex ceiling");
    }

    /// Double the active batch's capacity when the next quad would not fit.
    fn reserve_quad(&mut self) {
        let len = self.active.vertices.len();
        let capacity = self.active.vertices.capacity();
        if len + QUAD_VERTICES <= capacity {
            return;
        }
        let target = (capacity * 2)
            .max(self.initial_capacity)
            .max(len + QUAD_VERTICES)
            .min(self.ceiling);
        self.active.vertices.reserve_exact(target - len);
        let index_target = target / QUAD_VERTICES * QUAD_INDICES;
        let index_len = self.active.indices.len();
        self.active
            .indices
            .reserve_exact(index_target.saturating_sub(index_len));
    }

    fn tail(&self) -> Option<&MeshBatch> {
        self.tail
            .get_or_init(|| {
                (!self.active.vertices.is_empty()).then(|| self.active.clone().compacted())
            })
            .as_ref()
    }

    /// Seal the trailing batch by moving it out of the active buffer, so the
    /// geometry is held once. No-op when already finalized.
    pub fn seal(&mut self) {
        if self.is_finalized() {
            return;
        }
        let active = std::mem::take(&mut self.active);
        let tail = (!active.vertices.is_empty()).then(|| active.compacted());
        let _ = self.tail.set(tail);
    }

    /// Seal the trailing batch through a shared reference. The tail is a
    /// compacted copy; prefer [`BatchStream::seal`] when the stream is owned.
    pub fn finalize(&self) {
        let _ = self.tail();
    }

    /// True once the trailing batch has been sealed.
    pub fn is_finalized(&self) -> bool {
        self.tail.get().is_some()
    }

    /// Number of non-empty batches.
    pub fn batch_count(&self) -> usize {
        self.sealed.len() + usize::from(self.tail().is_some())
    }

    /// Batch `index`, or `None` past the end.
    pub fn batch(&self, index: usize) -> Option<&MeshBatch> {
        match index.cmp(&self.sealed.len()) {
            std::cmp::Ordering::Less => self.sealed.get(index),
            std::cmp::Ordering::Equal => self.tail(),
            std::cmp::Ordering::Greater => None,
        }
    }

    /// Vertices of batch `index`.
    pub fn vertices_of(&self, index: usize) -> Option<&[MeshVertex]> {
        self.batch(index).map(|batch| batch.vertices.as_slice())
    }

    /// Indices of batch `index`; each one is local to that batch.
    pub fn indices_of(&self, index: usize) -> Option<&[u16]> {
        self.batch(index).map(|batch| batch.indices.as_slice())
    }

    /// Every batch in emission order.
    pub fn batches(&self) -> impl Iterator<Item = &MeshBatch> + '_ {
        self.sealed.iter().chain(self.tail())
    }

    /// Number of quads pushed so far.
    pub fn quad_count(&self) -> usize {
        self.quads
    }

    /// Total vertices across batches.
    pub fn vertex_count(&self) -> usize {
        self.quads * QUAD_VERTICES
    }

    /// True when no quad was ever pushed.
    pub fn is_empty(&self) -> bool {
        self.quads == 0
    }

    fn hash_into(&self, hasher: &mut Hasher) {
        hasher.update(&(self.batch_count() as u64).to_le_bytes());
        for batch in self.batches() {
            hasher.update(&(batch.vertices.len() as u64).to_le_bytes());
            hasher.update(bytemuck::cast_slice(&batch.vertices));
            hasher.update(bytemuck::cast_slice(&batch.indices));
        }
    }
}

/// Per-chunk mesh output: an opaque stream plus a transparent sibling.
#[derive(Debug, Default)]
pub struct MeshBatchContainer {
    opaque: BatchStream,
    transparent: BatchStream,
}

impl MeshBatchContainer {
    /// Empty container using the limits from `config`.
    pub fn new(config: &MesherConfig) -> Self {
        Self {
            opaque: BatchStream::new(config),
            transparent: BatchStream::new(config),
        }
    }

    /// Route a quad to the opaque or transparent stream.
    pub fn push_quad(&mut self, quad: &Quad) -> Result<(), MeshError> {
        if self.is_finalized() {
            return Err(MeshError::Finalized);
        }
        let stream = if quad.transparent {
            &mut self.transparent
        } else {
            &mut self.opaque
        };
        stream.push_quad(quad.vertices(), quad.local_indices())
    }

    /// Append raw opaque geometry.
    pub fn push_opaque_quad(
        &mut self,
        vertices: [MeshVertex; 4],
        local_indices: [u16; 6],
    ) -> Result<(), MeshError> {
        if self.is_finalized() {
            return Err(MeshError::Finalized);
        }
        self.opaque.push_quad(vertices, local_indices)
    }

    /// Append raw transparent geometry.
    pub fn push_transparent_quad(
        &mut self,
        vertices: [MeshVertex; 4],
        local_indices: [u16; 6],
    ) -> Result<(), MeshError> {
        if self.is_finalized() {
            return Err(MeshError::Finalized);
        }
        self.transparent.push_quad(vertices, local_indices)
    }

    /// Seal both streams, releasing their active buffers.
    pub fn seal(&mut self) {
        self.opaque.seal();
        self.transparent.seal();
    }

    /// Seal both streams through a shared reference.
    pub fn finalize(&self) {
        self.opaque.finalize();
        self.transparent.finalize();
    }

    /// True once either stream has been sealed or read.
    pub fn is_finalized(&self) -> bool {
        self.opaque.is_finalized() || self.transparent.is_finalized()
    }

    fn sealed(&self) -> &Self {
        self.finalize();
        self
    }

    /// Opaque batch count.
    pub fn batch_count(&self) -> usize {
        self.sealed().opaque.batch_count()
    }

    /// Vertices of opaque batch `index`.
    pub fn vertices_of(&self, index: usize) -> Option<&[MeshVertex]> {
        self.sealed().opaque.vertices_of(index)
    }

    /// Indices of opaque batch `index`.
    pub fn indices_of(&self, index: usize) -> Option<&[u16]> {
        self.sealed().opaque.indices_of(index)
    }

    /// Opaque pass, sealed.
    pub fn opaque_batches(&self) -> &BatchStream {
        &self.sealed().opaque
    }

    /// Transparent pass, sealed.
    pub fn transparent_batches(&self) -> &BatchStream {
        &self.sealed().transparent
    }

    /// Quads across both streams.
    pub fn face_count(&self) -> usize {
        self.opaque.quad_count() + self.transparent.quad_count()
    }

    /// Vertices across both streams.
    pub fn vertex_count(&self) -> usize {
        self.opaque.vertex_count() + self.transparent.vertex_count()
    }

    /// True when neither stream holds geometry.
    pub fn is_empty(&self) -> bool {
        self.opaque.is_empty() && self.transparent.is_empty()
    }

    /// Blake3 over both streams; finalizes the container.
    pub fn hash(&self) -> MeshHash {
        self.finalize();
        let mut hasher = Hasher::new();
        self.opaque.hash_into(&mut hasher);
        self.transparent.hash_into(&mut hasher);
        MeshHash(*hasher.finalize().as_bytes())
    }
}
