//! Overlay configuration.
//!
//! ```ignore
//! let config = FluidConfig::new()
//!     .with_particle_count(300)
//!     .with_seed(7)
//!     .with_step_mode(StepMode::RealTime { reference_hz: 60.0 });
//! ```

use crate::input::Viewport;
use crate::simulation::{FluidForces, StepMode};
use crate::visuals::Palette;

/// Default population size.
pub const DEFAULT_PARTICLE_COUNT: usize = 200;

/// Native window settings for the demo host.
#[derive(Debug, Clone, PartialEq)]
pub struct WindowOptions {
    pub title: String,
    /// Request a transparent surface so the overlay floats over the desktop.
    pub transparent: bool,
    pub decorations: bool,
    /// Let pointer clicks pass through to windows underneath.
    ///
    /// Off by default. With hit-testing disabled most platforms stop
    /// delivering cursor motion to the window, so the swirl no longer follows
    /// the pointer. Turn it on when the overlay only needs to be decorative.
    pub click_through: bool,
    /// Initial inner size in logical pixels.
    pub size: Viewport,
}

impl Default for WindowOptions {
    fn default() -> Self {
        Self {
            title: "fluid-cursor".to_string(),
            transparent: true,
            decorations: false,
            click_through: false,
            size: Viewport::new(1280, 720),
        }
    }
}

/// Everything needed to mount an overlay.
#[derive(Debug, Clone, PartialEq)]
pub struct FluidConfig {
    pub particle_count: usize,
    pub palette: Palette,
    pub forces: FluidForces,
    /// Fixed RNG seed; `None` seeds from entropy.
    pub seed: Option<u64>,
    pub step_mode: StepMode,
    pub window: WindowOptions,
}

impl FluidConfig {
    pub fn new() -> Self {
        Self {
            particle_count: DEFAULT_PARTICLE_COUNT,
            palette: Palette::default(),
            forces: FluidForces::default(),
            seed: None,
            step_mode: StepMode::default(),
            window: WindowOptions::default(),
        }
    }

    /// Set the number of particles.
    pub fn with_particle_count(mut self, count: usize) -> Self {
        self.particle_count = count;
        self
    }

    pub fn with_palette(mut self, palette: Palette) -> Self {
        self.palette = palette;
        self
    }

    pub fn with_forces(mut self, forces: FluidForces) -> Self {
        self.forces = forces;
        self
    }

    /// Seed spawning and turbulence for reproducible runs.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_step_mode(mut self, step_mode: StepMode) -> Self {
        self.step_mode = step_mode;
        self
    }

    pub fn with_window(mut self, window: WindowOptions) -> Self {
        self.window = window;
        self
    }
}

impl Default for FluidConfig {
    fn default() -> Self {
        Self::new()
    }
}
