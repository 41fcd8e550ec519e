//! Unmerged per-voxel face enumeration used as an oracle for the greedy mesher.

use std::collections::HashSet;

use voxkit_assets::{BlockFace, BlockRegistry};
use voxkit_world::{BlockId, Chunk, VoxelQuery, BLOCK_AIR, CHUNK_EXTENT};

/// One exposed unit face of one voxel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UnitFace {
    /// Chunk-local voxel that owns the face.
    pub voxel: [i32; 3],
    /// Direction the face points.
    pub face: BlockFace,
    /// Block id of the owning voxel.
    pub block: BlockId,
}

/// Set of unit faces.
pub type FaceSet = HashSet<UnitFace>;

/// Every visible full-cube face in `chunk`, one entry per voxel face.
pub fn naive_face_set(
    chunk: &Chunk,
    registry: &BlockRegistry,
    world: Option<&dyn VoxelQuery>,
) -> FaceSet {
    let origin = chunk.world_origin();
    let lookup = |pos: [i32; 3]| -> BlockId {
        chunk
            .block_checked(pos[0], pos[1], pos[2])
            .unwrap_or_else(|| match world {
                Some(world) => {
                    world.block_at(origin[0] + pos[0], origin[1] + pos[1], origin[2] + pos[2])
                }
                None => BLOCK_AIR,
            })
    };

    let mut faces = FaceSet::new();
    for y in 0..CHUNK_EXTENT[1] as i32 {
        for z in 0..CHUNK_EXTENT[2] as i32 {
            for x in 0..CHUNK_EXTENT[0] as i32 {
                let id = lookup([x, y, z]);
                let Some(desc) = registry.descriptor(id) else {
                    continue;
                };
                if id == BLOCK_AIR || !desc.shape.is_full_cube() || !desc.is_visible() {
                    continue;
                }
                for face in BlockFace::ALL {
                    let n = face.normal();
                    let neighbor = [x + n[0] as i32, y + n[1] as i32, z + n[2] as i32];
                    if !registry.occludes(lookup(neighbor)) {
                        faces.insert(UnitFace {
                            voxel: [x, y, z],
                            face,
                            block: id,
                        });
                    }
                }
            }
        }
    }
    faces
}

/// Split an axis-aligned, integer-cornered quad back into unit faces.
pub fn unit_faces_of_quad(block: BlockId, face: BlockFace, corners: &[[f32; 3]; 4]) -> Vec<UnitFace> {
    let axis = face.axis();
    let u_axis = (axis + 1) % 3;
    let v_axis = (axis + 2) % 3;

    let plane = corners[0][axis].round() as i32;
    let layer = if face.is_positive() { plane - 1 } else { plane };

    let span = |a: usize| {
        let lo = corners.iter().map(|c| c[a]).fold(f32::MAX, f32::min).round() as i32;
        let hi = corners.iter().map(|c| c[a]).fold(f32::MIN, f32::max).round() as i32;
        lo..hi
    };

    let mut out = Vec::new();
    for v in span(v_axis) {
        for u in span(u_axis) {
            let mut voxel = [0; 3];
            voxel[axis] = layer;
            voxel[u_axis] = u;
            voxel[v_axis] = v;
            out.push(UnitFace { voxel, face, block });
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{chunk_with, ids, reference_registry};

    #[test]
    fn lone_cube_shows_six_faces() {
        let registry = reference_registry();
        let chunk = chunk_with(&[([1, 1, 1], ids::STONE)]);
        assert_eq!(naive_face_set(&chunk, &registry, None).len(), 6);
    }

    #[test]
    fn adjacent_glass_keeps_inner_faces() {
        let registry = reference_registry();
        let chunk = chunk_with(&[([1, 1, 1], ids::GLASS), ([2, 1, 1], ids::GLASS)]);
        assert_eq!(naive_face_set(&chunk, &registry, None).len(), 12);
    }

    #[test]
    fn shaped_blocks_are_not_cube_faces() {
        let registry = reference_registry();
        let chunk = chunk_with(&[([1, 1, 1], ids::STAIR), ([2, 1, 1], ids::STONE)]);
        // The stair does not hide the stone's -X face.
        assert_eq!(naive_face_set(&chunk, &registry, None).len(), 6);
    }

    #[test]
    fn quad_splits_into_cells() {
        let corners = [
            [0.0, 3.0, 0.0],
            [0.0, 3.0, 2.0],
            [4.0, 3.0, 2.0],
            [4.0, 3.0, 0.0],
        ];
        let faces = unit_faces_of_quad(1, BlockFace::Up, &corners);
        assert_eq!(faces.len(), 8);
        assert!(faces.iter().all(|f| f.voxel[1] == 2));

        let faces = unit_faces_of_quad(1, BlockFace::Down, &corners);
        assert!(faces.iter().all(|f| f.voxel[1] == 3));
    }
}
