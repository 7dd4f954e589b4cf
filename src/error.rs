//! Error types for the fluid cursor overlay.
//!
//! Every [`OverlayError`] is an initialization-time failure. The overlay
//! catches them at mount, logs them, and turns itself into an inert layer;
//! they never reach the end user. [`HostError`] covers the native window host.

use std::fmt;

use crate::program::ShaderStage;

/// Errors that can occur while bringing up the GPU side of the overlay.
#[derive(Debug)]
pub enum OverlayError {
    /// A shader stage failed to parse or validate.
    ShaderCompile {
        /// Which stage failed.
        stage: ShaderStage,
        /// Rendered compiler diagnostic.
        log: String,
    },
    /// The two stages could not be linked into one program, or an expected
    /// attribute or uniform is missing from the linked interface.
    ProgramLink {
        /// Description of the interface mismatch or pipeline error.
        log: String,
    },
    /// No usable GPU context could be obtained for the surface.
    DeviceUnavailable(String),
    /// The surface could not provide a frame.
    Surface(wgpu::SurfaceError),
}

impl fmt::Display for OverlayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OverlayError::ShaderCompile { stage, log } => {
                write!(f, "{} shader failed to compile:\n{}", stage, log)
            }
            OverlayError::ProgramLink { log } => write!(f, "Failed to link shader program: {}", log),
            OverlayError::DeviceUnavailable(reason) => write!(f, "GPU device unavailable: {}", reason),
            OverlayError::Surface(e) => write!(f, "Surface error: {}", e),
        }
    }
}

impl std::error::Error for OverlayError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            OverlayError::Surface(e) => Some(e),
            _ => None,
        }
    }
}

impl From<wgpu::CreateSurfaceError> for OverlayError {
    fn from(e: wgpu::CreateSurfaceError) -> Self {
        OverlayError::DeviceUnavailable(format!("failed to create surface: {}", e))
    }
}

impl From<wgpu::RequestDeviceError> for OverlayError {
    fn from(e: wgpu::RequestDeviceError) -> Self {
        OverlayError::DeviceUnavailable(format!("failed to create device: {}", e))
    }
}

impl From<wgpu::SurfaceError> for OverlayError {
    fn from(e: wgpu::SurfaceError) -> Self {
        OverlayError::Surface(e)
    }
}

/// Errors that can occur when running the native window host.
#[derive(Debug)]
pub enum HostError {
    /// Failed to create or run the event loop.
    EventLoop(winit::error::EventLoopError),
    /// Failed to create the overlay window.
    Window(winit::error::OsError),
}

impl fmt::Display for HostError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HostError::EventLoop(e) => write!(f, "Event loop error: {}", e),
            HostError::Window(e) => write!(f, "Failed to create window: {}", e),
        }
    }
}

impl std::error::Error for HostError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            HostError::EventLoop(e) => Some(e),
            HostError::Window(e) => Some(e),
        }
    }
}

impl From<winit::error::EventLoopError> for HostError {
    fn from(e: winit::error::EventLoopError) -> Self {
        HostError::EventLoop(e)
    }
}

impl From<winit::error::OsError> for HostError {
    fn from(e: winit::error::OsError) -> Self {
        HostError::Window(e)
    }
}
