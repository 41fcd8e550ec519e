//! Mesh metrics exported as JSON for CI artifacts.
//!
//! Each run writes one [`MeshRunReport`]: a timestamped summary plus one
//! [`ChunkMeshMetric`] per chunk so regressions in face counts, batch
//! splitting or mesh hashes show up as diffs.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Mesh metric snapshot for a chunk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkMeshMetric {
    /// Chunk coordinates [x, z].
    pub chunk: [i32; 2],
    /// Quads emitted across both passes.
    pub quads: usize,
    /// Triangle count across both passes.
    pub triangles: usize,
    /// Vertex count across both passes.
    pub vertices: usize,
    /// Opaque batch count.
    pub opaque_batches: usize,
    /// Transparent batch count.
    pub transparent_batches: usize,
    /// Mesh hash (hex string) for deterministic comparisons.
    pub hash: String,
    /// Wall time spent meshing, in microseconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mesh_time_us: Option<u64>,
}

/// Aggregated results of one meshing run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeshRunReport {
    /// Run identifier.
    pub run_name: String,
    /// When the report was built (RFC 3339).
    pub timestamp: String,
    /// Chunks meshed successfully.
    pub chunks_meshed: usize,
    /// Chunks whose build returned an error.
    pub chunks_failed: usize,
    /// Total triangles generated.
    pub total_triangles: usize,
    /// Total vertices generated.
    pub total_vertices: usize,
    /// Average triangles per meshed chunk.
    pub avg_triangles_per_chunk: f64,
    /// Per-chunk detail.
    pub chunks: Vec<ChunkMeshMetric>,
}

impl MeshRunReport {
    /// Summarize per-chunk metrics.
    pub fn new(run_name: impl Into<String>, chunks: Vec<ChunkMeshMetric>, failed: usize) -> Self {
        let total_triangles = chunks.iter().map(|c| c.triangles).sum();
        let total_vertices = chunks.iter().map(|c| c.vertices).sum();
        let avg_triangles_per_chunk = if chunks.is_empty() {
            0.0
        } else {
            total_triangles as f64 / chunks.len() as f64
        };
        Self {
            run_name: run_name.into(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            chunks_meshed: chunks.len(),
            chunks_failed: failed,
            total_triangles,
            total_vertices,
            avg_triangles_per_chunk,
            chunks,
        }
    }
}

/// Writes mesh reports to JSON.
pub struct MeshMetricSink {
    path: PathBuf,
}

impl MeshMetricSink {
    /// Create a sink pointed at the supplied path, creating parent dirs if needed.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        Ok(Self { path })
    }

    /// Target file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Persist the report as pretty JSON.
    pub fn write(&self, report: &MeshRunReport) -> Result<()> {
        let json = serde_json::to_string_pretty(report)?;
        let mut file = File::create(&self.path)?;
        file.write_all(json.as_bytes())?;
        tracing::debug!(path = %self.path.display(), chunks = report.chunks_meshed, "wrote mesh metrics");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn metric(x: i32, triangles: usize) -> ChunkMeshMetric {
        ChunkMeshMetric {
            chunk: [x, 0],
            quads: triangles / 2,
            triangles,
            vertices: triangles * 2,
            opaque_batches: 1,
            transparent_batches: 0,
            hash: "deadbeef".into(),
            mesh_time_us: None,
        }
    }

    #[test]
    fn report_aggregates_chunks() {
        let report = MeshRunReport::new("demo", vec![metric(0, 12), metric(1, 4)], 1);
        assert_eq!(report.chunks_meshed, 2);
        assert_eq!(report.chunks_failed, 1);
        assert_eq!(report.total_triangles, 16);
        assert_eq!(report.total_vertices, 32);
        assert!((report.avg_triangles_per_chunk - 8.0).abs() < f64::EPSILON);
    }

    #[test]
    fn empty_report_has_zero_average() {
        let report = MeshRunReport::new("empty", Vec::new(), 0);
        assert_eq!(report.avg_triangles_per_chunk, 0.0);
    }

    #[test]
    fn mesh_metric_sink_writes_file() {
        let path = std::env::temp_dir()
            .join(format!(
                "voxkit-metrics-{}",
                SystemTime::now()
                    .duration_since(UNIX_EPOCH)
                    .unwrap()
                    .as_nanos()
            ))
            .join("mesh_metrics.json");
        let sink = MeshMetricSink::create(&path).expect("sink create");
        let report = MeshRunReport::new("sink", vec![metric(0, 12)], 0);
        sink.write(&report).expect("write succeeds");

        let contents = fs::read_to_string(&path).expect("file readable");
        assert!(contents.contains("deadbeef"));
        assert!(contents.contains("total_triangles"));
        assert!(!contents.contains("mesh_time_us"));
        let parsed: MeshRunReport = serde_json::from_str(&contents).unwrap();
        assert_eq!(parsed.chunks, report.chunks);
    }
}
