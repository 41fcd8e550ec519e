use serde::{Deserialize, Serialize};

use crate::batch::MAX_BATCH_VERTICES;

/// Tunables for batch sizing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MesherConfig {
    /// Vertex ceiling per batch; clamped to a multiple of 4 no larger than 65532.
    pub max_batch_vertices: usize,
    /// Vertex capacity reserved for a fresh batch before doubling kicks in.
    pub initial_batch_vertices: usize,
}

impl Default for MesherConfig {
    fn default() -> Self {
        Self {
            max_batch_vertices: MAX_BATCH_VERTICES,
            initial_batch_vertices: 1024,
        }
    }
}

impl MesherConfig {
    /// Copy with both limits forced into their legal ranges.
    pub fn sanitized(&self) -> Self {
        let ceiling = (self.max_batch_vertices.min(MAX_BATCH_VERTICES) / 4 * 4).max(4);
        Self {
            max_batch_vertices: ceiling,
            initial_batch_vertices: self.initial_batch_vertices.clamp(4, ceiling),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_use_full_ceiling() {
        let config = MesherConfig::default();
        assert_eq!(config.max_batch_vertices, 65532);
        assert_eq!(config.sanitized(), config);
    }

    #[test]
    fn sanitized_clamps_out_of_range_values() {
        let config = MesherConfig {
            max_batch_vertices: 70_000,
            initial_batch_vertices: 0,
        }
        .sanitized();
        assert_eq!(config.max_batch_vertices, MAX_BATCH_VERTICES);
        assert_eq!(config.initial_batch_vertices, 4);

        let config = MesherConfig {
            max_batch_vertices: 10,
            initial_batch_vertices: 64,
        }
        .sanitized();
        assert_eq!(config.max_batch_vertices, 8);
        assert_eq!(config.initial_batch_vertices, 8);
    }

    #[test]
    fn parses_partial_toml() {
        let config: MesherConfig = toml::from_str("max_batch_vertices = 4096").unwrap();
        assert_eq!(config.max_batch_vertices, 4096);
        assert_eq!(config.initial_batch_vertices, 1024);
    }
}
