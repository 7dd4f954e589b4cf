//! Pointer and viewport state fed to the overlay by its host.
//!
//! The host pushes raw events; the overlay keeps the latest [`Pointer`] and
//! [`Viewport`] and hands them to the simulation by value every tick.
//!
//! # Usage
//!
//! ```ignore
//! if let Some(event) = HostEvent::from_window_event(&event, window.scale_factor()) {
//!     overlay.handle(event);
//! }
//! ```

use glam::Vec2;
use winit::dpi::PhysicalSize;
use winit::event::WindowEvent;

/// Size of the drawing surface in logical pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// True when either dimension is zero. Nothing can be drawn into an
    /// empty viewport.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Size as a float vector, used for clamping and as the `resolution`
    /// uniform.
    #[inline]
    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width as f32, self.height as f32)
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        self.size() * 0.5
    }

    /// Logical size of a physical surface at `scale_factor`.
    pub fn from_physical(size: PhysicalSize<u32>, scale_factor: f64) -> Self {
        let logical = size.to_logical::<f64>(sanitize_scale(scale_factor));
        Viewport::new(logical.width.round() as u32, logical.height.round() as u32)
    }
}

fn sanitize_scale(scale_factor: f64) -> f64 {
    if scale_factor.is_finite() && scale_factor > 0.0 {
        scale_factor
    } else {
        1.0
    }
}

/// Last known pointer position in viewport coordinates.
///
/// Starts at the origin, so particles near the top-left corner swirl until
/// the first pointer event arrives.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Pointer {
    pub position: Vec2,
}

impl Pointer {
    pub fn new(x: f32, y: f32) -> Self {
        Self {
            position: Vec2::new(x, y),
        }
    }

    /// Record a new pointer position. Non-finite coordinates are ignored and
    /// the previous position is kept.
    pub fn move_to(&mut self, x: f32, y: f32) {
        if x.is_finite() && y.is_finite() {
            self.position = Vec2::new(x, y);
        }
    }
}

/// Events a host pushes into the overlay.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HostEvent {
    /// Pointer moved to a viewport-space position.
    PointerMoved(Vec2),
    /// The surface was resized.
    Resized(Viewport),
}

impl HostEvent {
    /// Translate a winit window event into logical pixels. Returns `None`
    /// for events the overlay does not care about.
    pub fn from_window_event(event: &WindowEvent, scale_factor: f64) -> Option<Self> {
        match event {
            WindowEvent::CursorMoved { position, .. } => {
                let logical = position.to_logical::<f64>(sanitize_scale(scale_factor));
                Some(HostEvent::PointerMoved(Vec2::new(logical.x as f32, logical.y as f32)))
            }
            WindowEvent::Resized(size) => Some(HostEvent::Resized(Viewport::from_physical(*size, scale_factor))),
            _ => None,
        }
    }
}
