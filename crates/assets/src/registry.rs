use std::collections::HashMap;

use serde::Deserialize;
use voxkit_world::BlockId;

use crate::{BlockColors, DetailPattern, Rgb};

/// Geometry a block type renders with.
///
/// Only [`ShapeKind::FullCube`] takes part in face merging; every other kind
/// is drawn by the shaped-voxel emitter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShapeKind {
    /// Unit cube.
    #[default]
    FullCube,
    /// Thin centered vertical post.
    FencePost,
    /// Lower half of a hinged panel (door).
    DoorLower,
    /// Upper half of a hinged panel (door).
    DoorUpper,
    /// L-shaped stair ascending toward the north.
    StairStep,
    /// Two rails and evenly spaced rungs against the north face.
    Ladder,
    /// Lower half of a cube.
    HalfSlab,
    /// Shape name not known to this build; renders nothing.
    #[serde(other)]
    Unsupported,
}

impl ShapeKind {
    /// True for the unit cube.
    pub fn is_full_cube(self) -> bool {
        matches!(self, ShapeKind::FullCube)
    }
}

/// Faces corresponding to the block's six sides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockFace {
    /// Positive Y / top face.
    Up,
    /// Negative Y / bottom face.
    Down,
    /// Negative Z face.
    North,
    /// Positive Z face.
    South,
    /// Positive X face.
    East,
    /// Negative X face.
    West,
}

impl BlockFace {
    /// All faces in a fixed order.
    pub const ALL: [BlockFace; 6] = [
        BlockFace::Up,
        BlockFace::Down,
        BlockFace::North,
        BlockFace::South,
        BlockFace::East,
        BlockFace::West,
    ];

    /// Face pointing along `axis` (0 = X, 1 = Y, 2 = Z) in the given direction.
    pub fn from_axis(axis: usize, positive: bool) -> Self {
        match (axis, positive) {
            (0, true) => BlockFace::East,
            (0, false) => BlockFace::West,
            (1, true) => BlockFace::Up,
            (1, false) => BlockFace::Down,
            (2, true) => BlockFace::South,
            _ => BlockFace::North,
        }
    }

    /// Face whose normal points along the dominant axis of `normal`.
    ///
    /// Returns `None` for the zero vector.
    pub fn from_normal(normal: [f32; 3]) -> Option<Self> {
        let axis = (0..3usize).max_by(|&a, &b| normal[a].abs().total_cmp(&normal[b].abs()))?;
        if normal[axis] == 0.0 {
            return None;
        }
        Some(Self::from_axis(axis, normal[axis] > 0.0))
    }

    /// Unit normal of the face.
    pub fn normal(self) -> [f32; 3] {
        match self {
            BlockFace::Up => [0.0, 1.0, 0.0],
            BlockFace::Down => [0.0, -1.0, 0.0],
            BlockFace::North => [0.0, 0.0, -1.0],
            BlockFace::South => [0.0, 0.0, 1.0],
            BlockFace::East => [1.0, 0.0, 0.0],
            BlockFace::West => [-1.0, 0.0, 0.0],
        }
    }

    /// Axis the face is perpendicular to.
    pub fn axis(self) -> usize {
        match self {
            BlockFace::East | BlockFace::West => 0,
            BlockFace::Up | BlockFace::Down => 1,
            BlockFace::North | BlockFace::South => 2,
        }
    }

    /// True when the normal points along the positive axis.
    pub fn is_positive(self) -> bool {
        matches!(self, BlockFace::Up | BlockFace::South | BlockFace::East)
    }
}

/// Render-relevant metadata for one block type.
#[derive(Debug, Clone)]
pub struct BlockDescriptor {
    /// Human-readable identifier (e.g., "stone").
    pub name: String,
    /// Whether the block has collision volume.
    pub solid: bool,
    /// Whether the block blocks vision.
    pub opaque: bool,
    /// Whether the block is drawn in the transparent pass.
    pub transparent: bool,
    /// Geometry kind.
    pub shape: ShapeKind,
    /// Base colors.
    pub colors: BlockColors,
    /// Position-dependent variation; `Some` disables merging.
    pub detail: Option<DetailPattern>,
}

impl BlockDescriptor {
    /// Construct descriptor from the JSON definition.
    pub fn from_definition(def: crate::BlockDefinition) -> Self {
        Self {
            name: def.name,
            solid: def.solid,
            opaque: def.opaque,
            transparent: def.transparent,
            shape: def.shape,
            colors: def.color.into(),
            detail: def.detail,
        }
    }

    /// Non-rendering placeholder for id 0.
    pub fn air() -> Self {
        Self {
            name: "air".to_string(),
            solid: false,
            opaque: false,
            transparent: false,
            shape: ShapeKind::FullCube,
            colors: BlockColors::uniform([0.0; 3]),
            detail: None,
        }
    }

    /// Solid, opaque full cube with one color.
    pub fn cube(name: &str, color: Rgb) -> Self {
        Self {
            name: name.to_string(),
            solid: true,
            opaque: true,
            transparent: false,
            shape: ShapeKind::FullCube,
            colors: BlockColors::uniform(color),
            detail: None,
        }
    }

    /// Solid, see-through full cube drawn in the transparent pass.
    pub fn glass(name: &str, color: Rgb) -> Self {
        Self {
            opaque: false,
            transparent: true,
            ..Self::cube(name, color)
        }
    }

    /// Solid, non-occluding block with a non-cube shape.
    pub fn shaped(name: &str, shape: ShapeKind, color: Rgb) -> Self {
        Self {
            opaque: false,
            shape,
            ..Self::cube(name, color)
        }
    }

    /// Attach a detail pattern.
    pub fn with_detail(mut self, pattern: DetailPattern) -> Self {
        self.detail = Some(pattern);
        self
    }

    /// Replace the colors.
    pub fn with_colors(mut self, colors: BlockColors) -> Self {
        self.colors = colors;
        self
    }

    /// True when the block renders per-position color and must not be merged.
    #[inline]
    pub fn has_detail(&self) -> bool {
        self.detail.is_some()
    }

    /// True when the block has any visible surface.
    #[inline]
    pub fn is_visible(&self) -> bool {
        self.opaque || self.transparent
    }

    /// True when this block hides the face of a neighbor pressed against it.
    ///
    /// Packs never mark a shaped block opaque (the loader rejects it), so
    /// only full cubes occlude.
    #[inline]
    pub fn occludes(&self) -> bool {
        self.opaque
    }

    /// Color of the +Y face at a world position.
    pub fn top_color(&self, world: [i32; 3]) -> Rgb {
        self.resolve(self.colors.top, world)
    }

    /// Color of a horizontal-facing face at a world position.
    pub fn side_color(&self, world: [i32; 3]) -> Rgb {
        self.resolve(self.colors.side, world)
    }

    /// Color of the -Y face at a world position.
    pub fn bottom_color(&self, world: [i32; 3]) -> Rgb {
        self.resolve(self.colors.bottom, world)
    }

    /// Color for `face` at a world position.
    pub fn color_for(&self, face: BlockFace, world: [i32; 3]) -> Rgb {
        match face {
            BlockFace::Up => self.top_color(world),
            BlockFace::Down => self.bottom_color(world),
            _ => self.side_color(world),
        }
    }

    fn resolve(&self, base: Rgb, world: [i32; 3]) -> Rgb {
        match &self.detail {
            Some(pattern) => pattern.apply(base, world),
            None => base,
        }
    }
}

/// Registry storing block descriptors keyed by id.
#[derive(Debug)]
pub struct BlockRegistry {
    descriptors: Vec<BlockDescriptor>,
    name_to_id: HashMap<String, BlockId>,
}

impl BlockRegistry {
    /// Construct a registry from the supplied descriptors; index = block id.
    pub fn new(descriptors: Vec<BlockDescriptor>) -> Self {
        let mut name_to_id = HashMap::new();
        for (id, desc) in descriptors.iter().enumerate() {
            name_to_id.insert(desc.name.clone(), id as BlockId);
        }
        Self {
            descriptors,
            name_to_id,
        }
    }

    /// Look up a descriptor by numeric id.
    #[inline]
    pub fn descriptor(&self, id: BlockId) -> Option<&BlockDescriptor> {
        self.descriptors.get(id as usize)
    }

    /// Resolve a block id by its name.
    pub fn id_by_name(&self, name: &str) -> Option<BlockId> {
        self.name_to_id.get(name).copied()
    }

    /// Number of registered block types (air included).
    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    /// True when no descriptors are registered.
    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    /// Iterate `(id, descriptor)` pairs in id order.
    pub fn iter(&self) -> impl Iterator<Item = (BlockId, &BlockDescriptor)> + '_ {
        self.descriptors
            .iter()
            .enumerate()
            .map(|(id, desc)| (id as BlockId, desc))
    }

    /// True when the id is registered and hides neighboring faces.
    #[inline]
    pub fn occludes(&self, id: BlockId) -> bool {
        self.descriptor(id).is_some_and(BlockDescriptor::occludes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> BlockRegistry {
        BlockRegistry::new(vec![
            BlockDescriptor::air(),
            BlockDescriptor::cube("stone", [0.5, 0.5, 0.5]),
            BlockDescriptor::glass("glass", [0.8, 0.9, 1.0]),
            BlockDescriptor::shaped("slab", ShapeKind::HalfSlab, [0.6, 0.6, 0.6]),
        ])
    }

    #[test]
    fn lookups_by_id_and_name() {
        let registry = registry();
        assert_eq!(registry.len(), 4);
        assert_eq!(registry.id_by_name("glass"), Some(2));
        assert_eq!(registry.descriptor(1).map(|d| d.name.as_str()), Some("stone"));
        assert!(registry.descriptor(99).is_none());
        assert_eq!(registry.iter().count(), 4);
    }

    #[test]
    fn faces_round_trip_through_normals() {
        for face in BlockFace::ALL {
            assert_eq!(BlockFace::from_normal(face.normal()), Some(face));
        }
        assert_eq!(BlockFace::from_normal([0.2, -0.9, 0.1]), Some(BlockFace::Down));
        assert_eq!(BlockFace::from_normal([0.0; 3]), None);
    }

    #[test]
    fn opaque_blocks_occlude() {
        let registry = registry();
        assert!(!registry.occludes(0));
        assert!(registry.occludes(1));
        assert!(!registry.occludes(2));
        assert!(!registry.occludes(3));
        assert!(!registry.occludes(200));

        let slab = BlockDescriptor::shaped("slab", ShapeKind::HalfSlab, [0.0; 3]);
        assert!(!slab.opaque);
    }

    #[test]
    fn air_is_invisible() {
        assert!(!BlockDescriptor::air().is_visible());
        assert!(BlockDescriptor::glass("glass", [1.0; 3]).is_visible());
    }

    #[test]
    fn colors_follow_face() {
        let desc = BlockDescriptor::cube("grass", [0.0; 3]).with_colors(BlockColors {
            top: [0.0, 1.0, 0.0],
            side: [0.5, 0.3, 0.1],
            bottom: [0.4, 0.2, 0.1],
        });
        let at = [1, 2, 3];
        assert_eq!(desc.color_for(BlockFace::Up, at), [0.0, 1.0, 0.0]);
        assert_eq!(desc.color_for(BlockFace::Down, at), [0.4, 0.2, 0.1]);
        for face in [BlockFace::North, BlockFace::South, BlockFace::East, BlockFace::West] {
            assert_eq!(desc.color_for(face, at), [0.5, 0.3, 0.1]);
        }
    }

    #[test]
    fn detail_blocks_vary_by_position() {
        let desc = BlockDescriptor::cube("sand", [0.8, 0.7, 0.5])
            .with_detail(DetailPattern::Speckle { amplitude: 0.3 });
        assert!(desc.has_detail());
        let colors: Vec<_> = (0..16).map(|x| desc.top_color([x, 0, 0])).collect();
        assert!(colors.iter().any(|c| *c != colors[0]));

        let plain = BlockDescriptor::cube("stone", [0.5; 3]);
        assert!(!plain.has_detail());
        assert_eq!(plain.top_color([0, 0, 0]), plain.top_color([9, 9, 9]));
    }

    #[test]
    fn face_axis_round_trips() {
        for face in BlockFace::ALL {
            assert_eq!(BlockFace::from_axis(face.axis(), face.is_positive()), face);
            let normal = face.normal();
            let sign = if face.is_positive() { 1.0 } else { -1.0 };
            assert_eq!(normal[face.axis()], sign);
        }
    }

    #[test]
    fn unknown_shape_names_deserialize_as_unsupported() {
        let shape: ShapeKind = serde_json::from_str("\"torch\"").unwrap();
        assert_eq!(shape, ShapeKind::Unsupported);
        let shape: ShapeKind = serde_json::from_str("\"stair_step\"").unwrap();
        assert_eq!(shape, ShapeKind::StairStep);
    }
}
