//! Fixed geometry for non-cube block shapes.
//!
//! Shaped voxels never merge and never cull: every face of every piece is
//! emitted, in the voxel's local unit cube.

use voxkit_assets::{BlockFace, ShapeKind};
use voxkit_world::{BlockId, BLOCK_AIR, CHUNK_HEIGHT, CHUNK_SIZE};

use crate::mesher::MeshContext;
use crate::{MeshBatchContainer, MeshError, Quad};

/// Door panel thickness.
pub const DOOR_THICKNESS: f32 = 3.0 / 16.0;
/// Fence post footprint start on X and Z.
pub const FENCE_POST_MIN: f32 = 6.0 / 16.0;
/// Fence post footprint end on X and Z.
pub const FENCE_POST_MAX: f32 = 10.0 / 16.0;
/// Slab and stair lower-step height.
pub const SLAB_HEIGHT: f32 = 0.5;
/// Ladder plane distance from the north face.
pub const LADDER_OFFSET: f32 = 1.0 / 16.0;
/// Ladder rail width.
pub const LADDER_RAIL_WIDTH: f32 = 2.0 / 16.0;
/// Ladder rung count.
pub const LADDER_RUNGS: usize = 4;
/// Ladder rung height.
pub const LADDER_RUNG_HEIGHT: f32 = 1.0 / 16.0;

const FACE_UP: u8 = 1 << 0;
const FACE_DOWN: u8 = 1 << 1;
const FACE_NORTH: u8 = 1 << 2;
const FACE_SOUTH: u8 = 1 << 3;
const FACE_EAST: u8 = 1 << 4;
const FACE_WEST: u8 = 1 << 5;
const FACES_ALL: u8 = FACE_UP | FACE_DOWN | FACE_NORTH | FACE_SOUTH | FACE_EAST | FACE_WEST;

/// Quads emitted for one voxel of the given shape.
pub fn shape_quad_count(shape: ShapeKind) -> usize {
    match shape {
        ShapeKind::FullCube | ShapeKind::Unsupported => 0,
        ShapeKind::FencePost
        | ShapeKind::DoorLower
        | ShapeKind::DoorUpper
        | ShapeKind::HalfSlab => 6,
        ShapeKind::StairStep => 10,
        ShapeKind::Ladder => 4 + 2 * LADDER_RUNGS,
    }
}

/// One shaped voxel being emitted.
struct ShapedVoxel<'c, 'a> {
    ctx: &'c MeshContext<'a>,
    id: BlockId,
    local: [i32; 3],
    base: [f32; 3],
}

impl ShapedVoxel<'_, '_> {
    fn push_face(
        &self,
        out: &mut MeshBatchContainer,
        face: BlockFace,
        min: [f32; 3],
        max: [f32; 3],
    ) -> Result<(), MeshError> {
        let (color, transparent) = self.ctx.surface(self.id, face, self.local);
        let corners = face_corners(face, self.offset(min), self.offset(max));
        out.push_quad(&Quad {
            block_id: self.id,
            face,
            corners,
            color,
            transparent,
        })
    }

    fn push_box(
        &self,
        out: &mut MeshBatchContainer,
        min: [f32; 3],
        max: [f32; 3],
        faces: u8,
    ) -> Result<(), MeshError> {
        for (bit, face) in [
            (FACE_WEST, BlockFace::West),
            (FACE_EAST, BlockFace::East),
            (FACE_NORTH, BlockFace::North),
            (FACE_SOUTH, BlockFace::South),
            (FACE_DOWN, BlockFace::Down),
            (FACE_UP, BlockFace::Up),
        ] {
            if faces & bit != 0 {
                self.push_face(out, face, min, max)?;
            }
        }
        Ok(())
    }

    fn offset(&self, p: [f32; 3]) -> [f32; 3] {
        [self.base[0] + p[0], self.base[1] + p[1], self.base[2] + p[2]]
    }
}

/// Corners of `face` on the box `min..max`, ordered so the cross product of
/// the first two edges points along the face's positive axis.
fn face_corners(face: BlockFace, min: [f32; 3], max: [f32; 3]) -> [[f32; 3]; 4] {
    let (x0, y0, z0) = (min[0], min[1], min[2]);
    let (x1, y1, z1) = (max[0], max[1], max[2]);
    match face {
        BlockFace::West => [[x0, y0, z0], [x0, y1, z0], [x0, y1, z1], [x0, y0, z1]],
        BlockFace::East => [[x1, y0, z0], [x1, y1, z0], [x1, y1, z1], [x1, y0, z1]],
        BlockFace::North => [[x0, y0, z0], [x1, y0, z0], [x1, y1, z0], [x0, y1, z0]],
        BlockFace::South => [[x0, y0, z1], [x1, y0, z1], [x1, y1, z1], [x0, y1, z1]],
        BlockFace::Down => [[x0, y0, z0], [x0, y0, z1], [x1, y0, z1], [x1, y0, z0]],
        BlockFace::Up => [[x0, y1, z0], [x0, y1, z1], [x1, y1, z1], [x1, y1, z0]],
    }
}

/// Emit geometry for every non-cube voxel in the chunk.
pub(crate) fn emit_shaped_voxels(
    ctx: &MeshContext<'_>,
    out: &mut MeshBatchContainer,
) -> Result<(), MeshError> {
    for y in 0..CHUNK_HEIGHT {
        for z in 0..CHUNK_SIZE {
            for x in 0..CHUNK_SIZE {
                let id = ctx.chunk.block(x, y, z);
                if id == BLOCK_AIR {
                    continue;
                }
                let Some(desc) = ctx.registry.descriptor(id) else {
                    continue;
                };
                if desc.shape.is_full_cube() {
                    continue;
                }
                let voxel = ShapedVoxel {
                    ctx,
                    id,
                    local: [x as i32, y as i32, z as i32],
                    base: [x as f32, y as f32, z as f32],
                };
                emit_shape(&voxel, desc.shape, out)?;
            }
        }
    }
    Ok(())
}

fn emit_shape(
    voxel: &ShapedVoxel<'_, '_>,
    shape: ShapeKind,
    out: &mut MeshBatchContainer,
) -> Result<(), MeshError> {
    match shape {
        ShapeKind::FullCube => Ok(()),
        ShapeKind::FencePost => voxel.push_box(
            out,
            [FENCE_POST_MIN, 0.0, FENCE_POST_MIN],
            [FENCE_POST_MAX, 1.0, FENCE_POST_MAX],
            FACES_ALL,
        ),
        ShapeKind::DoorLower => emit_door(voxel, voxel.local, out),
        ShapeKind::DoorUpper => {
            let [x, y, z] = voxel.local;
            emit_door(voxel, [x, y - 1, z], out)
        }
        ShapeKind::StairStep => emit_stair(voxel, out),
        ShapeKind::Ladder => emit_ladder(voxel, out),
        ShapeKind::HalfSlab => {
            voxel.push_box(out, [0.0, 0.0, 0.0], [1.0, SLAB_HEIGHT, 1.0], FACES_ALL)
        }
        ShapeKind::Unsupported => {
            tracing::trace!(block = voxel.id, "skipping block with unsupported shape");
            Ok(())
        }
    }
}

/// Both door halves follow the open state stored on the lower half.
fn emit_door(
    voxel: &ShapedVoxel<'_, '_>,
    lower_local: [i32; 3],
    out: &mut MeshBatchContainer,
) -> Result<(), MeshError> {
    let open = voxel.ctx.is_panel_open(voxel.ctx.world_pos(lower_local));
    let (min, max) = if open {
        ([0.0, 0.0, 0.0], [DOOR_THICKNESS, 1.0, 1.0])
    } else {
        ([0.0, 0.0, 0.0], [1.0, 1.0, DOOR_THICKNESS])
    };
    voxel.push_box(out, min, max, FACES_ALL)
}

/// Lower slab across the footprint plus an upper step over the north half.
fn emit_stair(voxel: &ShapedVoxel<'_, '_>, out: &mut MeshBatchContainer) -> Result<(), MeshError> {
    let h = SLAB_HEIGHT;
    let lower = ([0.0, 0.0, 0.0], [1.0, h, 1.0]);
    let upper = ([0.0, h, 0.0], [1.0, 1.0, 0.5]);

    voxel.push_face(out, BlockFace::Down, lower.0, lower.1)?;
    // Exposed strip of the lower slab's top in front of the step.
    voxel.push_face(out, BlockFace::Up, [0.0, 0.0, 0.5], lower.1)?;
    voxel.push_face(out, BlockFace::South, upper.0, upper.1)?;
    voxel.push_face(out, BlockFace::Up, upper.0, upper.1)?;
    // Back wall spans both parts.
    voxel.push_face(out, BlockFace::North, [0.0, 0.0, 0.0], [1.0, 1.0, 1.0])?;
    voxel.push_face(out, BlockFace::South, lower.0, lower.1)?;
    for face in [BlockFace::West, BlockFace::East] {
        voxel.push_face(out, face, lower.0, lower.1)?;
        voxel.push_face(out, face, upper.0, upper.1)?;
    }
    Ok(())
}

/// Two rails and evenly spaced rungs on a plane just off the north face,
/// each piece visible from both sides.
fn emit_ladder(voxel: &ShapedVoxel<'_, '_>, out: &mut MeshBatchContainer) -> Result<(), MeshError> {
    let z = LADDER_OFFSET;
    let half = LADDER_RUNG_HEIGHT / 2.0;
    let panels: [([f32; 2], [f32; 2]); 2 + LADDER_RUNGS] = std::array::from_fn(|i| match i {
        0 => ([0.0, 0.0], [LADDER_RAIL_WIDTH, 1.0]),
        1 => ([1.0 - LADDER_RAIL_WIDTH, 0.0], [1.0, 1.0]),
        rung => {
            let center = ((rung - 2) as f32 + 0.5) / LADDER_RUNGS as f32;
            (
                [LADDER_RAIL_WIDTH, center - half],
                [1.0 - LADDER_RAIL_WIDTH, center + half],
            )
        }
    });

    for (min, max) in panels {
        let min = [min[0], min[1], z];
        let max = [max[0], max[1], z];
        voxel.push_face(out, BlockFace::South, min, max)?;
        voxel.push_face(out, BlockFace::North, min, max)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use voxkit_assets::{BlockDescriptor, BlockRegistry};
    use voxkit_world::{Chunk, ChunkPos, VoxelQuery};

    const SHAPES: [ShapeKind; 7] = [
        ShapeKind::FencePost,
        ShapeKind::DoorLower,
        ShapeKind::DoorUpper,
        ShapeKind::StairStep,
        ShapeKind::Ladder,
        ShapeKind::HalfSlab,
        ShapeKind::Unsupported,
    ];

    fn registry() -> BlockRegistry {
        let mut blocks = vec![BlockDescriptor::air()];
        for (i, shape) in SHAPES.iter().enumerate() {
            blocks.push(BlockDescriptor::shaped(&format!("shape{i}"), *shape, [0.6; 3]));
        }
        BlockRegistry::new(blocks)
    }

    fn emit(
        chunk: &Chunk,
        registry: &BlockRegistry,
        world: Option<&dyn VoxelQuery>,
    ) -> MeshBatchContainer {
        let ctx = MeshContext::new(chunk, registry, world);
        let mut out = MeshBatchContainer::default();
        emit_shaped_voxels(&ctx, &mut out).unwrap();
        out
    }

    fn bounds(out: &MeshBatchContainer) -> ([f32; 3], [f32; 3]) {
        let mut min = [f32::MAX; 3];
        let mut max = [f32::MIN; 3];
        for batch in out.opaque_batches().batches() {
            for v in &batch.vertices {
                for a in 0..3 {
                    min[a] = min[a].min(v.position[a]);
                    max[a] = max[a].max(v.position[a]);
                }
            }
        }
        (min, max)
    }

    /// Every emitted quad as its face plus corner bounds.
    fn pieces(out: &MeshBatchContainer) -> Vec<(BlockFace, [f32; 3], [f32; 3])> {
        out.opaque_batches()
            .batches()
            .flat_map(|b| b.vertices.chunks_exact(4))
            .map(|quad| {
                let mut min = [f32::MAX; 3];
                let mut max = [f32::MIN; 3];
                for v in quad {
                    for a in 0..3 {
                        min[a] = min[a].min(v.position[a]);
                        max[a] = max[a].max(v.position[a]);
                    }
                }
                (BlockFace::from_normal(quad[0].normal).unwrap(), min, max)
            })
            .collect()
    }

    fn single(id: BlockId) -> Vec<(BlockFace, [f32; 3], [f32; 3])> {
        let registry = registry();
        let mut chunk = Chunk::new(ChunkPos::new(0, 0));
        chunk.set_block(0, 0, 0, id);
        pieces(&emit(&chunk, &registry, None))
    }

    #[test]
    fn each_shape_emits_its_quad_count() {
        let registry = registry();
        for (i, shape) in SHAPES.iter().enumerate() {
            let mut chunk = Chunk::new(ChunkPos::new(0, 0));
            chunk.set_block(4, 10, 4, i as BlockId + 1);
            let out = emit(&chunk, &registry, None);
            assert_eq!(out.face_count(), shape_quad_count(*shape), "{shape:?}");
        }
    }

    #[test]
    fn fence_post_is_centered() {
        let registry = registry();
        let mut chunk = Chunk::new(ChunkPos::new(0, 0));
        chunk.set_block(0, 0, 0, 1);
        let (min, max) = bounds(&emit(&chunk, &registry, None));
        assert_eq!(min, [0.375, 0.0, 0.375]);
        assert_eq!(max, [0.625, 1.0, 0.625]);
    }

    struct OpenAt([i32; 3]);

    impl VoxelQuery for OpenAt {
        fn block_at(&self, _x: i32, _y: i32, _z: i32) -> BlockId {
            BLOCK_AIR
        }

        fn is_panel_open(&self, x: i32, y: i32, z: i32) -> bool {
            [x, y, z] == self.0
        }
    }

    #[test]
    fn door_halves_follow_lower_panel_state() {
        let registry = registry();
        let mut chunk = Chunk::new(ChunkPos::new(0, 0));
        chunk.set_block(2, 5, 2, 2);
        chunk.set_block(2, 6, 2, 3);

        let closed = bounds(&emit(&chunk, &registry, None));
        assert_eq!(closed.0, [2.0, 5.0, 2.0]);
        assert_eq!(closed.1, [3.0, 7.0, 2.0 + DOOR_THICKNESS]);

        let world = OpenAt([2, 5, 2]);
        let open = bounds(&emit(&chunk, &registry, Some(&world)));
        assert_eq!(open.0, [2.0, 5.0, 2.0]);
        assert_eq!(open.1, [2.0 + DOOR_THICKNESS, 7.0, 3.0]);

        // State keyed on the upper voxel itself is ignored.
        let world = OpenAt([2, 6, 2]);
        let out = emit(&chunk, &registry, Some(&world));
        assert_eq!(bounds(&out).1, [3.0, 7.0, 2.0 + DOOR_THICKNESS]);
    }

    #[test]
    fn stair_top_faces_sit_at_both_heights() {
        let registry = registry();
        let mut chunk = Chunk::new(ChunkPos::new(0, 0));
        chunk.set_block(0, 0, 0, 4);
        let out = emit(&chunk, &registry, None);
        let mut tops: Vec<f32> = out
            .opaque_batches()
            .batches()
            .flat_map(|b| b.vertices.iter())
            .filter(|v| v.normal == [0.0, 1.0, 0.0])
            .map(|v| v.position[1])
            .collect();
        tops.sort_by(f32::total_cmp);
        tops.dedup();
        assert_eq!(tops, vec![0.5, 1.0]);
    }

    #[test]
    fn ladder_faces_share_one_plane() {
        let registry = registry();
        let mut chunk = Chunk::new(ChunkPos::new(0, 0));
        chunk.set_block(0, 0, 0, 5);
        let out = emit(&chunk, &registry, None);
        let (min, max) = bounds(&out);
        assert_eq!(min[2], LADDER_OFFSET);
        assert_eq!(max[2], LADDER_OFFSET);
        assert_eq!((min[0], max[0]), (0.0, 1.0));
    }

    #[test]
    fn half_slab_fills_lower_half() {
        let pieces = single(6);
        assert_eq!(pieces.len(), 6);
        for (face, min, max) in pieces {
            match face {
                BlockFace::Up => assert_eq!((min, max), ([0.0, 0.5, 0.0], [1.0, 0.5, 1.0])),
                BlockFace::Down => assert_eq!((min, max), ([0.0, 0.0, 0.0], [1.0, 0.0, 1.0])),
                _ => {
                    assert_eq!((min[1], max[1]), (0.0, SLAB_HEIGHT), "{face:?}");
                    let span = if face.axis() == 0 { 2 } else { 0 };
                    assert_eq!((min[span], max[span]), (0.0, 1.0), "{face:?}");
                }
            }
        }
    }

    #[test]
    fn stair_follows_l_profile() {
        let pieces = single(4);
        let expected = [
            (BlockFace::Down, [0.0, 0.0, 0.0], [1.0, 0.0, 1.0]),
            (BlockFace::Up, [0.0, 0.5, 0.5], [1.0, 0.5, 1.0]),
            (BlockFace::South, [0.0, 0.5, 0.5], [1.0, 1.0, 0.5]),
            (BlockFace::Up, [0.0, 1.0, 0.0], [1.0, 1.0, 0.5]),
            (BlockFace::North, [0.0, 0.0, 0.0], [1.0, 1.0, 0.0]),
            (BlockFace::South, [0.0, 0.0, 1.0], [1.0, 0.5, 1.0]),
            (BlockFace::West, [0.0, 0.0, 0.0], [0.0, 0.5, 1.0]),
            (BlockFace::West, [0.0, 0.5, 0.0], [0.0, 1.0, 0.5]),
            (BlockFace::East, [1.0, 0.0, 0.0], [1.0, 0.5, 1.0]),
            (BlockFace::East, [1.0, 0.5, 0.0], [1.0, 1.0, 0.5]),
        ];
        assert_eq!(pieces.len(), expected.len());
        for piece in &expected {
            assert!(pieces.contains(piece), "missing {piece:?}");
        }
    }

    #[test]
    fn ladder_rails_hug_edges_and_rungs_are_evenly_spaced() {
        let pieces = single(5);
        let front: Vec<_> = pieces
            .iter()
            .filter(|(face, ..)| *face == BlockFace::South)
            .collect();
        assert_eq!(front.len(), 2 + LADDER_RUNGS);
        // Every panel is two-sided.
        for (_, min, max) in &front {
            assert!(pieces.contains(&(BlockFace::North, *min, *max)));
        }

        let rails: Vec<_> = front.iter().filter(|(_, min, max)| max[1] - min[1] == 1.0).collect();
        assert_eq!(rails.len(), 2);
        assert!(rails.iter().any(|(_, min, max)| min[0] == 0.0 && max[0] == LADDER_RAIL_WIDTH));
        assert!(rails
            .iter()
            .any(|(_, min, max)| min[0] == 1.0 - LADDER_RAIL_WIDTH && max[0] == 1.0));

        let mut centers: Vec<f32> = front
            .iter()
            .filter(|(_, min, max)| max[1] - min[1] < 1.0)
            .map(|(_, min, max)| {
                assert_eq!((min[0], max[0]), (LADDER_RAIL_WIDTH, 1.0 - LADDER_RAIL_WIDTH));
                assert_eq!(max[1] - min[1], LADDER_RUNG_HEIGHT);
                (min[1] + max[1]) / 2.0
            })
            .collect();
        centers.sort_by(f32::total_cmp);
        assert_eq!(centers.len(), LADDER_RUNGS);
        let step = 1.0 / LADDER_RUNGS as f32;
        for (k, center) in centers.iter().enumerate() {
            assert!((center - (k as f32 + 0.5) * step).abs() < 1e-6, "rung {k} at {center}");
        }
    }
}
