use voxkit_assets::{BlockFace, Rgb};
use voxkit_world::BlockId;

/// Set in [`MeshVertex::extra`] for vertices of the transparent pass.
pub const EXTRA_TRANSPARENT_BIT: u16 = 0x0001;

/// Packed vertex layout produced by the mesher.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MeshVertex {
    /// Position in chunk-local coordinates.
    pub position: [f32; 3],
    /// Face normal (unit length).
    pub normal: [f32; 3],
    /// Surface coordinate in block units: spans `[0, width] x [0, height]` of the quad.
    pub uv: [f32; 2],
    /// Linear RGB surface color.
    pub color: [f32; 3],
    /// Block identifier baked into the face for material lookup.
    pub block_id: u16,
    /// Per-vertex flags (see [`EXTRA_TRANSPARENT_BIT`]).
    pub extra: u16,
}

impl MeshVertex {
    /// True when the vertex belongs to the transparent pass.
    pub fn is_transparent(&self) -> bool {
        self.extra & EXTRA_TRANSPARENT_BIT != 0
    }
}

/// One planar rectangle ready for the batch container.
///
/// Corners are ordered so that `(c1 - c0) x (c2 - c0)` points along the
/// positive axis of `face`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quad {
    /// Block the quad belongs to.
    pub block_id: BlockId,
    /// Which way the quad faces.
    pub face: BlockFace,
    /// Corner positions in chunk-local space.
    pub corners: [[f32; 3]; 4],
    /// Surface color shared by all four corners.
    pub color: Rgb,
    /// Route to the transparent stream.
    pub transparent: bool,
}

impl Quad {
    /// Edge lengths `(c0 -> c1, c1 -> c2)`.
    pub fn extent(&self) -> [f32; 2] {
        [
            distance(self.corners[0], self.corners[1]),
            distance(self.corners[1], self.corners[2]),
        ]
    }

    /// Expand into four vertices with surface coordinates scaled to the extent.
    pub fn vertices(&self) -> [MeshVertex; 4] {
        let [w, h] = self.extent();
        let uvs = [[0.0, 0.0], [w, 0.0], [w, h], [0.0, h]];
        let normal = self.face.normal();
        let extra = if self.transparent {
            EXTRA_TRANSPARENT_BIT
        } else {
            0
        };
        std::array::from_fn(|i| MeshVertex {
            position: self.corners[i],
            normal,
            uv: uvs[i],
            color: self.color,
            block_id: self.block_id,
            extra,
        })
    }

    /// Two triangles over the four corners, wound counter-clockwise when seen
    /// from the side the normal points to.
    pub fn local_indices(&self) -> [u16; 6] {
        if self.face.is_positive() {
            [0, 1, 2, 0, 2, 3]
        } else {
            [0, 2, 1, 0, 3, 2]
        }
    }
}

fn distance(a: [f32; 3], b: [f32; 3]) -> f32 {
    let d = [b[0] - a[0], b[1] - a[1], b[2] - a[2]];
    (d[0] * d[0] + d[1] * d[1] + d[2] * d[2]).sqrt()
}
