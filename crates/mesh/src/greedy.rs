use voxkit_assets::BlockFace;
use voxkit_world::{BlockId, BLOCK_AIR, CHUNK_EXTENT, CHUNK_HEIGHT, CHUNK_SIZE};

use crate::mesher::MeshContext;
use crate::{MeshBatchContainer, MeshError, Quad};

/// Cells in the largest slice the passes ever sweep.
const SLICE_CELLS: usize = CHUNK_SIZE * max(CHUNK_SIZE, CHUNK_HEIGHT);

const fn max(a: usize, b: usize) -> usize {
    if a > b {
        a
    } else {
        b
    }
}

/// Per-worker slice buffers reused across chunks.
///
/// Holding one per worker keeps the hot loop allocation free; a scratch must
/// never be shared between two concurrent builds.
#[derive(Debug, Clone)]
pub struct MeshScratch {
    mask: Vec<Option<BlockId>>,
    merged: Vec<bool>,
}

impl Default for MeshScratch {
    fn default() -> Self {
        Self::new()
    }
}

impl MeshScratch {
    /// Allocate buffers sized for the largest slice.
    pub fn new() -> Self {
        Self {
            mask: vec![None; SLICE_CELLS],
            merged: vec![false; SLICE_CELLS],
        }
    }

    fn reset(&mut self, cells: usize) {
        self.mask[..cells].fill(None);
        self.merged[..cells].fill(false);
    }
}

/// Merges coplanar exposed full-cube faces into maximal rectangles.
pub(crate) struct GreedyMesher;

impl GreedyMesher {
    /// Run all six passes (three axes, both directions).
    pub fn mesh(
        ctx: &MeshContext<'_>,
        scratch: &mut MeshScratch,
        out: &mut MeshBatchContainer,
    ) -> Result<(), MeshError> {
        for axis in 0..3 {
            for positive in [true, false] {
                Self::mesh_pass(ctx, scratch, out, axis, positive)?;
            }
        }
        Ok(())
    }

    fn mesh_pass(
        ctx: &MeshContext<'_>,
        scratch: &mut MeshScratch,
        out: &mut MeshBatchContainer,
        axis: usize,
        positive: bool,
    ) -> Result<(), MeshError> {
        let u_axis = (axis + 1) % 3;
        let v_axis = (axis + 2) % 3;
        let width = CHUNK_EXTENT[u_axis];
        let height = CHUNK_EXTENT[v_axis];
        let cells = width * height;

        for slice in 0..=CHUNK_EXTENT[axis] {
            // The voxel owning faces in this plane sits behind it for +faces
            // and in front of it for -faces.
            let (current, neighbor) = if positive {
                (slice as i32 - 1, slice as i32)
            } else {
                (slice as i32, slice as i32 - 1)
            };
            if current < 0 || current >= CHUNK_EXTENT[axis] as i32 {
                continue;
            }

            scratch.reset(cells);
            let mut any = false;
            for v in 0..height {
                for u in 0..width {
                    let mut pos = [0i32; 3];
                    pos[axis] = current;
                    pos[u_axis] = u as i32;
                    pos[v_axis] = v as i32;
                    let face = Self::exposed_face(ctx, pos, axis, neighbor);
                    any |= face.is_some();
                    scratch.mask[v * width + u] = face;
                }
            }
            if !any {
                continue;
            }

            for j in 0..height {
                let mut i = 0;
                while i < width {
                    let idx = j * width + i;
                    let Some(id) = scratch.mask[idx] else {
                        i += 1;
                        continue;
                    };
                    if scratch.merged[idx] {
                        i += 1;
                        continue;
                    }

                    let (w, h) = if ctx.has_detail(id) {
                        (1, 1)
                    } else {
                        Self::grow_rect(scratch, width, height, i, j, id)
                    };
                    for dy in 0..h {
                        let row = (j + dy) * width + i;
                        scratch.merged[row..row + w].fill(true);
                    }

                    let mut voxel = [0i32; 3];
                    voxel[axis] = current;
                    voxel[u_axis] = i as i32;
                    voxel[v_axis] = j as i32;
                    let quad = Self::rect_quad(ctx, id, voxel, axis, positive, slice, [i, j], [w, h]);
                    out.push_quad(&quad)?;

                    i += w;
                }
            }
        }
        Ok(())
    }

    /// Block id whose face at `pos` toward the `neighbor` plane is visible.
    fn exposed_face(
        ctx: &MeshContext<'_>,
        pos: [i32; 3],
        axis: usize,
        neighbor: i32,
    ) -> Option<BlockId> {
        let id = ctx.chunk_block(pos);
        if id == BLOCK_AIR {
            return None;
        }
        let desc = ctx.registry.descriptor(id)?;
        if !desc.shape.is_full_cube() || !desc.is_visible() {
            return None;
        }
        let mut npos = pos;
        npos[axis] = neighbor;
        if ctx.registry.occludes(ctx.block_at_local(npos)) {
            return None;
        }
        Some(id)
    }

    /// Extend right along the row, then down while every cell of the next row matches.
    fn grow_rect(
        scratch: &MeshScratch,
        width: usize,
        height: usize,
        i: usize,
        j: usize,
        id: BlockId,
    ) -> (usize, usize) {
        let open = |cell: usize| scratch.mask[cell] == Some(id) && !scratch.merged[cell];

        let mut w = 1;
        while i + w < width && open(j * width + i + w) {
            w += 1;
        }

        let mut h = 1;
        'grow: while j + h < height {
            let row = (j + h) * width + i;
            for k in 0..w {
                if !open(row + k) {
                    break 'grow;
                }
            }
            h += 1;
        }
        (w, h)
    }

    #[allow(clippy::too_many_arguments)]
    fn rect_quad(
        ctx: &MeshContext<'_>,
        id: BlockId,
        voxel: [i32; 3],
        axis: usize,
        positive: bool,
        slice: usize,
        start: [usize; 2],
        size: [usize; 2],
    ) -> Quad {
        let u_axis = (axis + 1) % 3;
        let v_axis = (axis + 2) % 3;

        let mut origin = [0.0f32; 3];
        origin[axis] = slice as f32;
        origin[u_axis] = start[0] as f32;
        origin[v_axis] = start[1] as f32;
        let mut du = [0.0f32; 3];
        du[u_axis] = size[0] as f32;
        let mut dv = [0.0f32; 3];
        dv[v_axis] = size[1] as f32;

        let face = BlockFace::from_axis(axis, positive);
        let (color, transparent) = ctx.surface(id, face, voxel);
        Quad {
            block_id: id,
            face,
            corners: [
                origin,
                add(origin, du),
                add(add(origin, du), dv),
                add(origin, dv),
            ],
            color,
            transparent,
        }
    }
}

fn add(a: [f32; 3], b: [f32; 3]) -> [f32; 3] {
    [a[0] + b[0], a[1] + b[1], a[2] + b[2]]
}
