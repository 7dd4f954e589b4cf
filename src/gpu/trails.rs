//! Trail rendering for particle motion history.
//!
//! Every stored trail point becomes one sprite instance. All trail points of
//! the population share a single pre-sized buffer that is rewritten once per
//! frame and drawn with one instanced call, underneath the particles.

use super::InstanceBuffer;
use crate::particle::{ParticleStore, TRAIL_LENGTH};
use crate::shader::PointInstance;
use glam::Vec2;

/// Alpha of the newest trail point.
pub const TRAIL_ALPHA: f32 = 0.3;

/// Alpha for the trail point at `index` (0 = newest) of a trail holding
/// `len` points. Fades linearly toward the oldest point.
#[inline]
pub fn trail_alpha(index: usize, len: usize) -> f32 {
    if len == 0 {
        return 0.0;
    }
    (1.0 - index as f32 / len as f32) * TRAIL_ALPHA
}

/// Write one instance per trail point into `out`, newest to oldest for each
/// particle. Trail points carry no velocity and use the alpha as `life`.
pub fn pack_trails(particles: &ParticleStore, out: &mut Vec<PointInstance>) {
    out.clear();
    for particle in particles.iter() {
        let len = particle.trail.len();
        let color = particle.color();
        out.extend(
            particle
                .trail
                .iter()
                .enumerate()
                .map(|(index, point)| PointInstance::new(point, Vec2::ZERO, trail_alpha(index, len), color)),
        );
    }
}

/// GPU resources for trail rendering.
pub struct TrailState {
    buffer: InstanceBuffer,
    staging: Vec<PointInstance>,
}

impl TrailState {
    /// Create a trail buffer sized for every particle's full trail.
    pub fn new(device: &wgpu::Device, num_particles: usize) -> Self {
        let capacity = num_particles * TRAIL_LENGTH;
        Self {
            buffer: InstanceBuffer::new(device, "Trail Instance Buffer", capacity),
            staging: Vec::with_capacity(capacity),
        }
    }

    /// Repack and upload the current trails.
    pub fn update(&mut self, queue: &wgpu::Queue, particles: &ParticleStore) {
        pack_trails(particles, &mut self.staging);
        self.buffer.upload(queue, &self.staging);
    }

    pub fn draw(&self, render_pass: &mut wgpu::RenderPass<'_>) {
        self.buffer.draw(render_pass);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::particle::Particle;
    use glam::Vec3;

    #[test]
    fn test_trail_alpha_fades() {
        assert!((trail_alpha(0, 10) - 0.3).abs() < 1e-6);
        assert!((trail_alpha(5, 10) - 0.15).abs() < 1e-6);
        assert!(trail_alpha(9, 10) > 0.0);
        assert_eq!(trail_alpha(0, 0), 0.0);
    }

    #[test]
    fn test_pack_trails_order_and_attributes() {
        let color = Vec3::new(0.1, 0.2, 0.3);
        let mut particle = Particle::new(Vec2::ZERO, Vec2::new(5.0, 5.0), 1.0, color);
        particle.trail.push_front(Vec2::new(1.0, 1.0));
        particle.trail.push_front(Vec2::new(2.0, 2.0));
        let store = ParticleStore::from_particles(vec![particle]);

        let mut out = Vec::new();
        pack_trails(&store, &mut out);

        assert_eq!(out.len(), 2);
        // Newest first
        assert_eq!(out[0].position, [2.0, 2.0]);
        assert_eq!(out[1].position, [1.0, 1.0]);
        assert!(out.iter().all(|i| i.velocity == [0.0, 0.0]));
        assert!(out.iter().all(|i| i.color == [0.1, 0.2, 0.3]));
        assert!((out[0].life - 0.3).abs() < 1e-6);
        assert!((out[1].life - 0.15).abs() < 1e-6);
    }

    #[test]
    fn test_pack_reuses_buffer() {
        let store = ParticleStore::from_particles(vec![Particle::new(Vec2::ZERO, Vec2::ZERO, 0.5, Vec3::ONE)]);
        let mut out = vec![PointInstance::new(Vec2::ONE, Vec2::ONE, 1.0, Vec3::ONE); 4];
        pack_trails(&store, &mut out);
        assert!(out.is_empty());
    }
}
