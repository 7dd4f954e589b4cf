//! Native host: a transparent winit window carrying the overlay.

use std::sync::Arc;

use winit::{
    application::ApplicationHandler,
    dpi::LogicalSize,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    window::{Window, WindowId},
};

use crate::config::FluidConfig;
use crate::error::HostError;
use crate::gpu::GpuRenderer;
use crate::input::{HostEvent, Viewport};
use crate::overlay::{FrameScheduler, Overlay};
use crate::program::ProgramBuilder;

/// Schedules overlay ticks as window redraws.
pub struct WinitScheduler {
    window: Arc<Window>,
}

impl WinitScheduler {
    pub fn new(window: Arc<Window>) -> Self {
        Self { window }
    }
}

impl FrameScheduler for WinitScheduler {
    fn request_frame(&mut self) {
        self.window.request_redraw();
    }

    fn cancel_frame(&mut self) {
        // winit can't withdraw a redraw; the overlay drops ticks it didn't ask for.
    }
}

/// Frames between frame-rate log lines.
const FPS_LOG_INTERVAL: u64 = 300;

type WindowOverlay = Overlay<GpuRenderer, WinitScheduler>;

struct App {
    config: FluidConfig,
    window: Option<Arc<Window>>,
    overlay: WindowOverlay,
    error: Option<HostError>,
}

impl App {
    fn new(config: FluidConfig) -> Self {
        let overlay = Overlay::new(&config);
        Self {
            config,
            window: None,
            overlay,
            error: None,
        }
    }

    fn create_window(&self, event_loop: &ActiveEventLoop) -> Result<Arc<Window>, HostError> {
        let options = &self.config.window;
        let attrs = Window::default_attributes()
            .with_title(options.title.clone())
            .with_transparent(options.transparent)
            .with_decorations(options.decorations)
            .with_inner_size(LogicalSize::new(options.size.width, options.size.height));

        let window = Arc::new(event_loop.create_window(attrs)?);

        if options.click_through {
            if let Err(e) = window.set_cursor_hittest(false) {
                log::warn!("Click-through unavailable: {}", e);
            }
        }
        Ok(window)
    }

    fn mount(&mut self, window: Arc<Window>) {
        let viewport = Viewport::from_physical(window.inner_size(), window.scale_factor());
        let particle_count = self.config.particle_count;
        let scheduler = WinitScheduler::new(window.clone());

        self.overlay.mount(viewport, scheduler, |viewport| {
            let builder = ProgramBuilder::sprite();
            pollster::block_on(GpuRenderer::new(window, viewport, particle_count, &builder))
        });
    }

    fn log_frame_rate(&self) {
        let clock = self.overlay.clock();
        if clock.frame() > 0 && clock.frame() % FPS_LOG_INTERVAL == 0 {
            log::debug!("Overlay frame {}: {:.1} fps", clock.frame(), clock.fps());
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        match self.create_window(event_loop) {
            Ok(window) => {
                self.window = Some(window.clone());
                self.mount(window);
            }
            Err(e) => {
                log::error!("Failed to create window: {}", e);
                self.error = Some(e);
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                self.overlay.unmount();
                event_loop.exit();
            }
            WindowEvent::RedrawRequested => {
                self.overlay.on_frame();
                self.log_frame_rate();
            }
            other => {
                let scale_factor = self.window.as_ref().map_or(1.0, |w| w.scale_factor());
                if let Some(host_event) = HostEvent::from_window_event(&other, scale_factor) {
                    self.overlay.handle(host_event);
                }
            }
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        self.overlay.unmount();
    }
}

/// Open the overlay window and run until it is closed.
pub fn run(config: FluidConfig) -> Result<(), HostError> {
    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Wait);
    let mut app = App::new(config);
    event_loop.run_app(&mut app)?;

    match app.error.take() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
