//! Overlay lifecycle.
//!
//! [`Overlay`] owns the particle population, the pointer and viewport state,
//! and whatever draws the frames. The host feeds it events and display ticks;
//! the overlay never touches a window directly, so any host that can schedule
//! frames and build a [`FrameSink`] can embed it.

use crate::config::FluidConfig;
use crate::error::OverlayError;
use crate::input::{HostEvent, Pointer, Viewport};
use crate::particle::ParticleStore;
use crate::simulation::Simulation;
use crate::spawn::SpawnContext;
use crate::time::FrameClock;
use crate::visuals::Palette;

/// Seconds the layer takes to fade in after a successful mount.
pub const FADE_IN_SECS: f32 = 0.5;

/// Layer opacity `elapsed` seconds after mount, rising linearly from 0 to 1.
pub fn fade_in(elapsed: f32) -> f32 {
    if elapsed.is_nan() {
        return 1.0;
    }
    (elapsed / FADE_IN_SECS).clamp(0.0, 1.0)
}

/// Receives one frame of particles to display.
pub trait FrameSink {
    /// The drawable surface changed size. Never called with a zero area.
    fn resize(&mut self, viewport: Viewport);

    /// Draw the population. `time` is seconds since mount and `fade` the
    /// layer opacity in 0.0-1.0.
    fn draw(&mut self, particles: &ParticleStore, time: f32, fade: f32) -> Result<(), OverlayError>;
}

/// Schedules display-synchronized ticks.
pub trait FrameScheduler {
    /// Ask for [`Overlay::on_frame`] to be called on the next display tick.
    fn request_frame(&mut self);

    /// Withdraw an outstanding request.
    fn cancel_frame(&mut self);
}

/// Where the overlay is in its lifecycle.
///
/// `Uninitialized → Initializing → {Running | Failed}`, then `Stopped` on
/// unmount. `Stopped` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayState {
    Uninitialized,
    Initializing,
    Running,
    /// Initialization failed. The overlay stays inert until unmounted.
    Failed,
    Stopped,
}

/// A cursor-reactive particle overlay.
pub struct Overlay<R: FrameSink, S: FrameScheduler> {
    state: OverlayState,
    particle_count: usize,
    palette: Palette,
    seed: Option<u64>,
    simulation: Simulation,
    particles: ParticleStore,
    pointer: Pointer,
    viewport: Viewport,
    clock: FrameClock,
    renderer: Option<R>,
    scheduler: Option<S>,
    frame_pending: bool,
}

impl<R: FrameSink, S: FrameScheduler> Overlay<R, S> {
    pub fn new(config: &FluidConfig) -> Self {
        // Spawning and turbulence draw from separate streams so a seeded run
        // doesn't depend on the population size.
        let turbulence_seed = config.seed.map(|seed| seed.wrapping_add(1));
        Self {
            state: OverlayState::Uninitialized,
            particle_count: config.particle_count,
            palette: config.palette.clone(),
            seed: config.seed,
            simulation: Simulation::new(config.forces, config.step_mode, SpawnContext::new(turbulence_seed)),
            particles: ParticleStore::default(),
            pointer: Pointer::default(),
            viewport: Viewport::default(),
            clock: FrameClock::new(),
            renderer: None,
            scheduler: None,
            frame_pending: false,
        }
    }

    /// Replace the frame clock, e.g. with [`FrameClock::fixed`] for
    /// deterministic runs.
    pub fn with_clock(mut self, clock: FrameClock) -> Self {
        self.clock = clock;
        self
    }

    /// Start the overlay on a surface of size `viewport`.
    ///
    /// `build` creates the renderer for that size. Any failure, including a
    /// zero-area viewport, is logged and leaves the overlay [`OverlayState::Failed`].
    pub fn mount<F>(&mut self, viewport: Viewport, scheduler: S, build: F)
    where
        F: FnOnce(Viewport) -> Result<R, OverlayError>,
    {
        if self.state != OverlayState::Uninitialized {
            log::debug!("Ignoring mount in state {:?}", self.state);
            return;
        }
        self.state = OverlayState::Initializing;
        self.viewport = viewport;
        self.scheduler = Some(scheduler);

        match self.initialize(build) {
            Ok(renderer) => {
                self.renderer = Some(renderer);
                self.particles = ParticleStore::create(
                    self.particle_count,
                    &self.palette,
                    viewport,
                    &mut SpawnContext::new(self.seed),
                );
                self.clock.reset();
                self.state = OverlayState::Running;
                log::info!(
                    "Overlay mounted at {}x{} with {} particles",
                    viewport.width,
                    viewport.height,
                    self.particles.len()
                );
                self.request_frame();
            }
            Err(e) => {
                log::warn!("Particle overlay disabled: {}", e);
                self.state = OverlayState::Failed;
            }
        }
    }

    fn initialize<F>(&self, build: F) -> Result<R, OverlayError>
    where
        F: FnOnce(Viewport) -> Result<R, OverlayError>,
    {
        if self.viewport.is_empty() {
            return Err(OverlayError::DeviceUnavailable(format!(
                "surface has zero size ({}x{})",
                self.viewport.width, self.viewport.height
            )));
        }
        build(self.viewport)
    }

    pub fn handle(&mut self, event: HostEvent) {
        match event {
            HostEvent::PointerMoved(position) => self.pointer_moved(position.x, position.y),
            HostEvent::Resized(viewport) => self.resized(viewport.width, viewport.height),
        }
    }

    /// Record the latest pointer position in viewport pixels.
    pub fn pointer_moved(&mut self, x: f32, y: f32) {
        self.pointer.move_to(x, y);
    }

    /// Record the new surface size and pass it on to a running renderer.
    pub fn resized(&mut self, width: u32, height: u32) {
        self.viewport = Viewport::new(width, height);
        if self.viewport.is_empty() {
            return;
        }
        if self.state == OverlayState::Running {
            if let Some(renderer) = self.renderer.as_mut() {
                renderer.resize(self.viewport);
            }
        }
    }

    /// Run one display tick: advance the simulation, draw, and ask for the
    /// next tick. Does nothing unless running with a frame pending.
    pub fn on_frame(&mut self) {
        if self.state != OverlayState::Running || !self.frame_pending {
            return;
        }
        self.frame_pending = false;

        let (now, delta) = self.clock.tick();

        // A minimized surface keeps the last frame on screen.
        if !self.viewport.is_empty() {
            self.simulation
                .advance_timed(&mut self.particles, self.pointer, self.viewport, now, delta);

            if let Some(renderer) = self.renderer.as_mut() {
                if let Err(e) = renderer.draw(&self.particles, now, fade_in(now)) {
                    log::warn!("Skipping frame: {}", e);
                }
            }
        }

        self.request_frame();
    }

    /// Stop the overlay and release the renderer. Safe to call repeatedly;
    /// an overlay that was never mounted is left untouched.
    pub fn unmount(&mut self) {
        if matches!(self.state, OverlayState::Uninitialized | OverlayState::Stopped) {
            return;
        }
        if self.frame_pending {
            if let Some(scheduler) = self.scheduler.as_mut() {
                scheduler.cancel_frame();
            }
            self.frame_pending = false;
        }
        self.renderer = None;
        self.scheduler = None;
        log::debug!("Overlay {:?} -> Stopped", self.state);
        self.state = OverlayState::Stopped;
    }

    fn request_frame(&mut self) {
        if let Some(scheduler) = self.scheduler.as_mut() {
            scheduler.request_frame();
            self.frame_pending = true;
        }
    }

    pub fn state(&self) -> OverlayState {
        self.state
    }

    pub fn particles(&self) -> &ParticleStore {
        &self.particles
    }

    pub fn pointer(&self) -> Pointer {
        self.pointer
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn clock(&self) -> &FrameClock {
        &self.clock
    }

    pub fn renderer(&self) -> Option<&R> {
        self.renderer.as_ref()
    }

    pub fn is_frame_pending(&self) -> bool {
        self.frame_pending
    }
}

impl<R: FrameSink, S: FrameScheduler> Drop for Overlay<R, S> {
    fn drop(&mut self) {
        self.unmount();
    }
}
