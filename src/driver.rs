use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result};
use voxkit_assets::BlockRegistry;
use voxkit_mesh::{
    build_chunks_parallel, ChunkMesher, MeshBatchContainer, MeshError, MeshHash, MesherConfig,
};
use voxkit_testkit::{ChunkMeshMetric, MeshMetricSink, MeshRunReport};
use voxkit_world::{Chunk, ChunkPos, ChunkStorage, DirtyFlags, VoxelQuery};

/// Mesh stats for one rebuilt chunk.
#[derive(Debug, Clone)]
pub struct ChunkMeshStat {
    /// Chunk position this mesh belongs to.
    pub position: ChunkPos,
    /// Quads across both passes.
    pub quads: usize,
    /// Triangles across both passes.
    pub triangles: usize,
    /// Vertices across both passes.
    pub vertices: usize,
    /// Opaque batch count.
    pub opaque_batches: usize,
    /// Transparent batch count.
    pub transparent_batches: usize,
    /// Mesh hash for determinism comparisons.
    pub hash: MeshHash,
    /// Build time; only measured on the sequential path.
    pub mesh_time_us: Option<u64>,
}

impl ChunkMeshStat {
    fn from_mesh(position: ChunkPos, mesh: &MeshBatchContainer, mesh_time_us: Option<u64>) -> Self {
        let quads = mesh.face_count();
        Self {
            position,
            quads,
            triangles: quads * 2,
            vertices: mesh.vertex_count(),
            opaque_batches: mesh.opaque_batches().batch_count(),
            transparent_batches: mesh.transparent_batches().batch_count(),
            hash: mesh.hash(),
            mesh_time_us,
        }
    }
}

/// Outcome of one driver pass.
#[derive(Debug, Default)]
pub struct MeshPass {
    /// Successfully rebuilt chunks, in position order.
    pub stats: Vec<ChunkMeshStat>,
    /// Chunks whose build failed.
    pub failed: Vec<(ChunkPos, MeshError)>,
}

/// Rebuilds meshes for chunks flagged [`DirtyFlags::MESH`].
pub struct ChunkMeshDriver<'a> {
    storage: &'a mut ChunkStorage,
    registry: &'a BlockRegistry,
    mesher: ChunkMesher,
    parallel: bool,
}

impl<'a> ChunkMeshDriver<'a> {
    /// Create a driver spanning storage and registry.
    pub fn new(
        storage: &'a mut ChunkStorage,
        registry: &'a BlockRegistry,
        config: &MesherConfig,
    ) -> Self {
        Self {
            storage,
            registry,
            mesher: ChunkMesher::new(config.clone()),
            parallel: true,
        }
    }

    /// Choose between the rayon pool and the calling thread.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Mutable access to the storage, e.g. to toggle panels between passes.
    pub fn storage_mut(&mut self) -> &mut ChunkStorage {
        &mut *self.storage
    }

    /// Mesh every dirty chunk and clear its flag.
    pub fn process(&mut self) -> MeshPass {
        let dirty = self.take_dirty();
        if dirty.is_empty() {
            return MeshPass::default();
        }

        let storage: &ChunkStorage = &*self.storage;
        let chunks: Vec<&Chunk> = dirty.iter().filter_map(|pos| storage.get(*pos)).collect();
        let results: Vec<(ChunkPos, Result<MeshBatchContainer, MeshError>, Option<u64>)> =
            if self.parallel {
                let world: &(dyn VoxelQuery + Sync) = storage;
                build_chunks_parallel(&chunks, self.registry, Some(world), self.mesher.config())
                    .into_iter()
                    .map(|(pos, mesh)| (pos, mesh, None))
                    .collect()
            } else {
                chunks
                    .iter()
                    .map(|chunk| {
                        let start = Instant::now();
                        let world: &dyn VoxelQuery = storage;
                        let mesh = self.mesher.build(chunk, self.registry, Some(world));
                        let elapsed = start.elapsed().as_micros() as u64;
                        (chunk.position(), mesh, Some(elapsed))
                    })
                    .collect()
            };

        let mut pass = MeshPass::default();
        for (pos, mesh, elapsed) in results {
            match mesh {
                Ok(mesh) => pass.stats.push(ChunkMeshStat::from_mesh(pos, &mesh, elapsed)),
                Err(err) => {
                    tracing::warn!(chunk = %pos, error = %err, "chunk mesh failed");
                    pass.failed.push((pos, err));
                }
            }
        }
        tracing::debug!(
            rebuilt = pass.stats.len(),
            failed = pass.failed.len(),
            parallel = self.parallel,
            "mesh pass complete"
        );
        pass
    }

    fn take_dirty(&mut self) -> Vec<ChunkPos> {
        let positions: Vec<_> = self.storage.iter_positions().collect();
        positions
            .into_iter()
            .filter(|pos| {
                self.storage
                    .get_mut(*pos)
                    .is_some_and(|chunk| chunk.take_dirty_flags().contains(DirtyFlags::MESH))
            })
            .collect()
    }

    /// Convert stats into serializable metrics for CI artifacts.
    pub fn stats_to_metrics(stats: &[ChunkMeshStat]) -> Vec<ChunkMeshMetric> {
        stats
            .iter()
            .map(|stat| ChunkMeshMetric {
                chunk: [stat.position.x, stat.position.z],
                quads: stat.quads,
                triangles: stat.triangles,
                vertices: stat.vertices,
                opaque_batches: stat.opaque_batches,
                transparent_batches: stat.transparent_batches,
                hash: stat.hash.to_string(),
                mesh_time_us: stat.mesh_time_us,
            })
            .collect()
    }

    /// Write a pass report to disk using the testkit sink.
    pub fn write_metrics_to_file<P: AsRef<Path>>(
        run_name: &str,
        pass: &MeshPass,
        path: P,
    ) -> Result<MeshRunReport> {
        let path = path.as_ref();
        let report = MeshRunReport::new(
            run_name,
            Self::stats_to_metrics(&pass.stats),
            pass.failed.len(),
        );
        let sink = MeshMetricSink::create(path)
            .with_context(|| format!("preparing metrics output {}", path.display()))?;
        sink.write(&report)?;
        Ok(report)
    }
}
