//! Color palettes for the particle population.
//!
//! Each particle draws one color from the palette at creation and keeps it for
//! its whole life.
//!
//! ```ignore
//! FluidConfig::new().with_palette(Palette::new(vec![
//!     Vec3::new(1.0, 0.2, 0.4),
//!     Vec3::new(0.2, 0.8, 1.0),
//! ]));
//! ```

use glam::Vec3;

/// Indigo, violet, cyan, pink, green and orange.
pub const PORTFOLIO_COLORS: [Vec3; 6] = [
    Vec3::new(0.39, 0.40, 0.97), // Indigo
    Vec3::new(0.55, 0.36, 0.97), // Violet
    Vec3::new(0.02, 0.71, 0.83), // Cyan
    Vec3::new(0.93, 0.28, 0.60), // Pink
    Vec3::new(0.06, 0.72, 0.51), // Green
    Vec3::new(0.96, 0.62, 0.04), // Orange
];

/// Color used when a palette has no entries.
pub const FALLBACK_COLOR: Vec3 = Vec3::ONE;

/// A fixed set of RGB colors (0.0-1.0) that particles are drawn from.
#[derive(Debug, Clone, PartialEq)]
pub struct Palette {
    colors: Vec<Vec3>,
}

impl Palette {
    /// Create a palette from explicit colors. Components are clamped to
    /// 0.0-1.0.
    pub fn new(colors: Vec<Vec3>) -> Self {
        Self {
            colors: colors
                .into_iter()
                .map(|c| c.clamp(Vec3::ZERO, Vec3::ONE))
                .collect(),
        }
    }

    /// The six-color palette the overlay ships with.
    pub fn portfolio() -> Self {
        Self::new(PORTFOLIO_COLORS.to_vec())
    }

    pub fn colors(&self) -> &[Vec3] {
        &self.colors
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// Color at `index`, or [`FALLBACK_COLOR`] if the palette is empty.
    /// Indices wrap around.
    pub fn get(&self, index: usize) -> Vec3 {
        if self.colors.is_empty() {
            FALLBACK_COLOR
        } else {
            self.colors[index % self.colors.len()]
        }
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::portfolio()
    }
}
