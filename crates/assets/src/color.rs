use serde::Deserialize;

/// Linear RGB color, each channel in `0.0..=1.0`.
pub type Rgb = [f32; 3];

/// Top/side/bottom colors of a block type.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlockColors {
    /// Color of the +Y face.
    pub top: Rgb,
    /// Color of the horizontal-facing faces.
    pub side: Rgb,
    /// Color of the -Y face.
    pub bottom: Rgb,
}

impl BlockColors {
    /// Same color on every face.
    pub const fn uniform(color: Rgb) -> Self {
        Self {
            top: color,
            side: color,
            bottom: color,
        }
    }

    pub(crate) fn channels(&self) -> impl Iterator<Item = f32> + '_ {
        self.top
            .iter()
            .chain(self.side.iter())
            .chain(self.bottom.iter())
            .copied()
    }
}

/// Position-dependent color variation.
///
/// Blocks carrying a pattern cannot be merged by the mesher: every voxel face
/// gets its own color.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DetailPattern {
    /// Brightness jitter in `1 ± amplitude`, keyed by world position.
    Speckle {
        /// Maximum relative brightness change.
        #[serde(default = "default_speckle_amplitude")]
        amplitude: f32,
    },
}

fn default_speckle_amplitude() -> f32 {
    0.12
}

impl Default for DetailPattern {
    fn default() -> Self {
        DetailPattern::Speckle {
            amplitude: default_speckle_amplitude(),
        }
    }
}

impl DetailPattern {
    /// Apply the pattern to `base` at a world position.
    pub fn apply(&self, base: Rgb, world: [i32; 3]) -> Rgb {
        match *self {
            DetailPattern::Speckle { amplitude } => {
                let jitter = hash3d(world[0], world[1], world[2]) * 2.0 - 1.0;
                let factor = 1.0 + amplitude * jitter;
                base.map(|c| (c * factor).clamp(0.0, 1.0))
            }
        }
    }
}

/// Deterministic hash of an integer position into `0.0..=1.0`.
#[inline]
pub fn hash3d(x: i32, y: i32, z: i32) -> f32 {
    let n = x
        .wrapping_mul(374_761_393)
        .wrapping_add(y.wrapping_mul(668_265_263))
        .wrapping_add(z.wrapping_mul(1_274_126_177));
    let n = (n ^ (n >> 13)).wrapping_mul(1_911_520_717);
    (n as u32) as f32 / u32::MAX as f32
}
