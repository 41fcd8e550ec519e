#![warn(missing_docs)]
//! Block descriptor table: per-type render flags, shape kinds and colors,
//! plus JSON block-pack loading and validation.

mod color;
mod loader;
mod registry;

pub use color::{hash3d, BlockColors, DetailPattern, Rgb};
pub use loader::{registry_from_file, registry_from_str};
pub use registry::{BlockDescriptor, BlockFace, BlockRegistry, ShapeKind};

use serde::Deserialize;
use thiserror::Error;

/// Block definition as it appears in a JSON pack.
#[derive(Debug, Clone, Deserialize)]
pub struct BlockDefinition {
    /// Human-readable identifier (e.g., "stone").
    pub name: String,
    /// Whether the block has collision volume.
    #[serde(default)]
    pub solid: bool,
    /// Whether the block hides the faces of its neighbors.
    #[serde(default)]
    pub opaque: bool,
    /// Whether the block is drawn in the transparent pass.
    #[serde(default)]
    pub transparent: bool,
    /// Geometry used to render the block (defaults to a full cube).
    #[serde(default)]
    pub shape: ShapeKind,
    /// Surface colors.
    #[serde(default)]
    pub color: ColorDefinition,
    /// Position-dependent color variation; disables face merging when set.
    #[serde(default)]
    pub detail: Option<DetailPattern>,
}

/// Color(s) of a block as written in JSON.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ColorDefinition {
    /// One color for every face.
    Uniform(Rgb),
    /// Separate top/side/bottom colors.
    PerFace {
        /// Color of the +Y face.
        top: Rgb,
        /// Color of the four horizontal-facing faces.
        side: Rgb,
        /// Color of the -Y face (defaults to the side color).
        #[serde(default)]
        bottom: Option<Rgb>,
    },
}

impl Default for ColorDefinition {
    fn default() -> Self {
        ColorDefinition::Uniform([0.5, 0.5, 0.5])
    }
}

impl From<ColorDefinition> for BlockColors {
    fn from(def: ColorDefinition) -> Self {
        match def {
            ColorDefinition::Uniform(c) => BlockColors::uniform(c),
            ColorDefinition::PerFace { top, side, bottom } => BlockColors {
                top,
                side,
                bottom: bottom.unwrap_or(side),
            },
        }
    }
}

/// Errors emitted during pack loading.
#[derive(Debug, Error)]
pub enum AssetError {
    /// Wrap IO errors when reading packs.
    #[error("failed to read asset pack: {0}")]
    Io(#[from] std::io::Error),
    /// Wrap serde parsing issues.
    #[error("failed to parse asset pack: {0}")]
    Parse(#[from] serde_json::Error),
    /// Two definitions share a name.
    #[error("duplicate block name {name:?}")]
    DuplicateName {
        /// The repeated name.
        name: String,
    },
    /// A definition breaks one of the descriptor invariants.
    #[error("invalid block {name:?}: {reason}")]
    Invalid {
        /// Offending block.
        name: String,
        /// What is wrong with it.
        reason: &'static str,
    },
}

/// Parse a JSON string into a list of blocks.
pub fn load_blocks_from_str(input: &str) -> Result<Vec<BlockDefinition>, AssetError> {
    Ok(serde_json::from_str(input)?)
}
