//! # fluid-cursor
//!
//! A decorative particle overlay that swirls around the pointer.
//!
//! A fixed population of colored particles drifts over a transparent surface.
//! Near the pointer they pick up a vortex-like swirl and a gentle pull, bounce
//! off the surface edges, and leave short fading trails. Everything is drawn
//! as point sprites through a small WGSL program.
//!
//! ## Quick Start
//!
//! ```ignore
//! use fluid_cursor::prelude::*;
//!
//! fn main() -> Result<(), HostError> {
//!     let config = FluidConfig::new()
//!         .with_particle_count(200)
//!         .with_seed(42);
//!     fluid_cursor::window::run(config)
//! }
//! ```
//!
//! ## Embedding
//!
//! The window host is only one way to drive an [`Overlay`]. Any host that can
//! schedule display ticks ([`FrameScheduler`]) and build something that draws
//! frames ([`FrameSink`]) can mount it:
//!
//! ```ignore
//! let mut overlay = Overlay::new(&config);
//! overlay.mount(viewport, scheduler, |viewport| build_renderer(viewport));
//!
//! // From the host's event handlers:
//! overlay.pointer_moved(x, y);
//! overlay.resized(width, height);
//! overlay.on_frame();
//!
//! overlay.unmount();
//! ```
//!
//! Initialization failures never reach the host. They are logged and the
//! overlay stays inert.

pub mod config;
pub mod error;
pub mod gpu;
pub mod input;
pub mod overlay;
pub mod particle;
pub mod program;
pub mod shader;
pub mod simulation;
pub mod spawn;
pub mod time;
pub mod visuals;
pub mod window;

pub use config::{FluidConfig, WindowOptions};
pub use error::{HostError, OverlayError};
pub use glam::{Vec2, Vec3};
pub use gpu::GpuRenderer;
pub use input::{HostEvent, Pointer, Viewport};
pub use overlay::{FrameScheduler, FrameSink, Overlay, OverlayState};
pub use particle::{Particle, ParticleStore, Trail, TRAIL_LENGTH};
pub use program::{Program, ProgramBuilder, ProgramLayout, ShaderStage};
pub use simulation::{FluidForces, Simulation, StepMode};
pub use spawn::SpawnContext;
pub use time::FrameClock;
pub use visuals::Palette;

/// Convenient re-exports for common usage.
///
/// ```ignore
/// use fluid_cursor::prelude::*;
/// ```
pub mod prelude {
    pub use crate::config::{FluidConfig, WindowOptions};
    pub use crate::error::{HostError, OverlayError};
    pub use crate::input::{HostEvent, Pointer, Viewport};
    pub use crate::overlay::{FrameScheduler, FrameSink, Overlay, OverlayState};
    pub use crate::particle::ParticleStore;
    pub use crate::simulation::{FluidForces, StepMode};
    pub use crate::time::FrameClock;
    pub use crate::visuals::Palette;
    pub use crate::{Vec2, Vec3};
}
