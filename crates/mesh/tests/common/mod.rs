#![allow(dead_code)]

use voxkit_assets::BlockFace;
use voxkit_mesh::{BatchStream, MeshBatchContainer, MeshVertex};
use voxkit_testkit::{unit_faces_of_quad, FaceSet, UnitFace};

/// Every quad of a stream as its four vertices.
pub fn quads(stream: &BatchStream) -> Vec<[MeshVertex; 4]> {
    stream
        .batches()
        .flat_map(|batch| batch.vertices.chunks_exact(4))
        .map(|q| [q[0], q[1], q[2], q[3]])
        .collect()
}

/// Quads from both passes.
pub fn all_quads(mesh: &MeshBatchContainer) -> Vec<[MeshVertex; 4]> {
    let mut out = quads(mesh.opaque_batches());
    out.extend(quads(mesh.transparent_batches()));
    out
}

pub fn face_of(normal: [f32; 3]) -> BlockFace {
    BlockFace::from_normal(normal).expect("axis-aligned normal")
}

/// Merged quad size read back from the surface coordinate of its far corner.
pub fn quad_size(quad: &[MeshVertex; 4]) -> [f32; 2] {
    quad[2].uv
}

/// Unit faces covered by every quad, plus how many were covered twice.
pub fn covered_faces(mesh: &MeshBatchContainer) -> (FaceSet, usize) {
    let mut set = FaceSet::new();
    let mut duplicates = 0;
    for quad in all_quads(mesh) {
        let corners = [
            quad[0].position,
            quad[1].position,
            quad[2].position,
            quad[3].position,
        ];
        for face in unit_faces_of_quad(quad[0].block_id, face_of(quad[0].normal), &corners) {
            if !set.insert(face) {
                duplicates += 1;
            }
        }
    }
    (set, duplicates)
}

pub fn unit_face(voxel: [i32; 3], face: BlockFace, block: u16) -> UnitFace {
    UnitFace { voxel, face, block }
}
