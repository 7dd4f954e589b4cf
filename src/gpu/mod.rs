mod trails;

use std::sync::Arc;

use winit::window::Window;

pub use trails::{pack_trails, trail_alpha, TrailState, TRAIL_ALPHA};

use crate::error::OverlayError;
use crate::input::Viewport;
use crate::overlay::FrameSink;
use crate::particle::ParticleStore;
use crate::program::{Program, ProgramBuilder};
use crate::shader::PointInstance;

/// Vertices in one sprite quad (two triangles).
pub const QUAD_VERTICES: u32 = 6;

/// Fixed-capacity instance buffer, rewritten with a single upload per frame.
pub struct InstanceBuffer {
    buffer: wgpu::Buffer,
    capacity: usize,
    count: u32,
}

impl InstanceBuffer {
    pub fn new(device: &wgpu::Device, label: &str, capacity: usize) -> Self {
        // Zero-sized vertex buffers can't be bound
        let size = (capacity.max(1) as u64) * PointInstance::STRIDE;
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(label),
            size,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        Self {
            buffer,
            capacity,
            count: 0,
        }
    }

    /// Upload `instances`, truncated to capacity.
    pub fn upload(&mut self, queue: &wgpu::Queue, instances: &[PointInstance]) {
        let len = instances.len().min(self.capacity);
        self.count = len as u32;
        if len > 0 {
            queue.write_buffer(&self.buffer, 0, bytemuck::cast_slice(&instances[..len]));
        }
    }

    /// Bind to slot 0 and draw one quad per uploaded instance.
    pub fn draw(&self, render_pass: &mut wgpu::RenderPass<'_>) {
        if self.count == 0 {
            return;
        }
        render_pass.set_vertex_buffer(0, self.buffer.slice(..));
        render_pass.draw(0..QUAD_VERTICES, 0..self.count);
    }
}

/// Convert every particle into its sprite instance.
pub fn pack_particles(particles: &ParticleStore, out: &mut Vec<PointInstance>) {
    out.clear();
    out.extend(
        particles
            .iter()
            .map(|p| PointInstance::new(p.position, p.velocity, p.life, p.color())),
    );
}

/// Pick a surface format the overlay can blend over the desktop with.
/// Non-sRGB formats keep the palette colors as authored.
fn choose_format(formats: &[wgpu::TextureFormat]) -> Option<wgpu::TextureFormat> {
    formats
        .iter()
        .find(|f| !f.is_srgb())
        .or_else(|| formats.first())
        .copied()
}

/// Prefer an alpha mode that lets transparent pixels show what's beneath.
fn choose_alpha_mode(modes: &[wgpu::CompositeAlphaMode]) -> wgpu::CompositeAlphaMode {
    [
        wgpu::CompositeAlphaMode::PreMultiplied,
        wgpu::CompositeAlphaMode::PostMultiplied,
    ]
    .into_iter()
    .find(|mode| modes.contains(mode))
    .or_else(|| modes.first().copied())
    .unwrap_or(wgpu::CompositeAlphaMode::Auto)
}

/// Draws the particle population onto a window surface.
///
/// The overlay works in logical pixels. The surface is configured at the
/// window's physical size and the `resolution` uniform carries the logical
/// size, so sprite sizes and distances match on HiDPI displays.
pub struct GpuRenderer {
    window: Arc<Window>,
    viewport: Viewport,
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,
    program: Program,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    particles: InstanceBuffer,
    particle_staging: Vec<PointInstance>,
    trails: TrailState,
}

impl GpuRenderer {
    pub async fn new(
        window: Arc<Window>,
        viewport: Viewport,
        particle_count: usize,
        builder: &ProgramBuilder,
    ) -> Result<Self, OverlayError> {
        let physical = window.inner_size();
        if viewport.is_empty() || physical.width == 0 || physical.height == 0 {
            return Err(OverlayError::DeviceUnavailable(format!(
                "surface has zero size ({}x{})",
                physical.width, physical.height
            )));
        }

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });

        let surface = instance.create_surface(window.clone())?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::LowPower,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or_else(|| OverlayError::DeviceUnavailable("no compatible adapter".into()))?;

        log::info!("Using adapter: {}", adapter.get_info().name);

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("Device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::downlevel_webgl2_defaults()
                        .using_resolution(adapter.limits()),
                    memory_hints: Default::default(),
                },
                None,
            )
            .await?;

        let surface_caps = surface.get_capabilities(&adapter);
        let format = choose_format(&surface_caps.formats)
            .ok_or_else(|| OverlayError::DeviceUnavailable("surface reports no formats".into()))?;

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: physical.width,
            height: physical.height,
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: choose_alpha_mode(&surface_caps.alpha_modes),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let program = builder.build(&device, format)?;

        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Uniform Buffer"),
            size: program.layout.uniforms.size as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Uniform Bind Group"),
            layout: &program.bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: program.layout.uniforms.binding,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        let particles = InstanceBuffer::new(&device, "Particle Instance Buffer", particle_count);
        let trails = TrailState::new(&device, particle_count);

        log::debug!(
            "Renderer ready: {:?} {:?}, {} particles",
            config.format,
            config.alpha_mode,
            particle_count
        );

        Ok(Self {
            window,
            viewport,
            surface,
            device,
            queue,
            config,
            program,
            uniform_buffer,
            uniform_bind_group,
            particles,
            particle_staging: Vec::with_capacity(particle_count),
            trails,
        })
    }

    fn reconfigure(&mut self) {
        self.surface.configure(&self.device, &self.config);
    }

    fn update_uniforms(&self, time: f32, fade: f32) {
        let bytes = self.program.layout.uniforms.encode(self.viewport.size(), time, fade);
        self.queue.write_buffer(&self.uniform_buffer, 0, &bytes);
    }

    pub fn render(&mut self, particles: &ParticleStore, time: f32, fade: f32) -> Result<(), OverlayError> {
        let output = match self.surface.get_current_texture() {
            Ok(output) => output,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                log::debug!("Surface lost or outdated, reconfiguring");
                self.reconfigure();
                return Ok(());
            }
            Err(wgpu::SurfaceError::Timeout) => {
                log::warn!("Surface timed out, skipping frame");
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        };

        self.update_uniforms(time, fade);

        pack_particles(particles, &mut self.particle_staging);
        self.particles.upload(&self.queue, &self.particle_staging);
        self.trails.update(&self.queue, particles);

        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::TRANSPARENT),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            render_pass.set_viewport(
                0.0,
                0.0,
                self.config.width as f32,
                self.config.height as f32,
                0.0,
                1.0,
            );
            render_pass.set_pipeline(&self.program.pipeline);
            render_pass.set_bind_group(self.program.layout.uniforms.group, &self.uniform_bind_group, &[]);

            // Trails sit underneath the particles
            self.trails.draw(&mut render_pass);
            self.particles.draw(&mut render_pass);
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        Ok(())
    }
}

impl FrameSink for GpuRenderer {
    fn resize(&mut self, viewport: Viewport) {
        let physical = self.window.inner_size();
        if viewport.is_empty() || physical.width == 0 || physical.height == 0 {
            return;
        }
        self.viewport = viewport;
        self.config.width = physical.width;
        self.config.height = physical.height;
        self.reconfigure();
    }

    fn draw(&mut self, particles: &ParticleStore, time: f32, fade: f32) -> Result<(), OverlayError> {
        self.render(particles, time, fade)
    }
}
