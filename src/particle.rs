//! Particle state and the fixed-size population that holds it.

use glam::{Vec2, Vec3};

use crate::input::Viewport;
use crate::spawn::SpawnContext;
use crate::visuals::Palette;

/// Maximum number of past positions kept per particle.
pub const TRAIL_LENGTH: usize = 10;

/// Half-width of the initial velocity range, in pixels per tick.
pub const INITIAL_SPEED: f32 = 0.25;

/// Bounded history of a particle's previous positions, newest first.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Trail {
    points: [Vec2; TRAIL_LENGTH],
    len: usize,
}

impl Trail {
    pub const fn new() -> Self {
        Self {
            points: [Vec2::ZERO; TRAIL_LENGTH],
            len: 0,
        }
    }

    /// Push `point` to the front, dropping the oldest entry once full.
    pub fn push_front(&mut self, point: Vec2) {
        // Shift back from the end, same as the GPU trail shift
        self.points.copy_within(0..TRAIL_LENGTH - 1, 1);
        self.points[0] = point;
        self.len = (self.len + 1).min(TRAIL_LENGTH);
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Points from newest (index 0) to oldest.
    pub fn iter(&self) -> impl Iterator<Item = Vec2> + '_ {
        self.points[..self.len].iter().copied()
    }

    /// Swap any NaN or infinite point for `fallback`, keeping the length.
    pub fn replace_non_finite(&mut self, fallback: Vec2) {
        for point in &mut self.points[..self.len] {
            if !point.is_finite() {
                *point = fallback;
            }
        }
    }
}

impl Default for Trail {
    fn default() -> Self {
        Self::new()
    }
}

/// One member of the population.
#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    /// Position in viewport pixels, Y down.
    pub position: Vec2,
    /// Velocity in pixels per tick.
    pub velocity: Vec2,
    /// Cosmetic pulse in 0.0-1.0 that drives sprite size and alpha.
    pub life: f32,
    color: Vec3,
    /// Recent positions, newest first.
    pub trail: Trail,
}

impl Particle {
    pub fn new(position: Vec2, velocity: Vec2, life: f32, color: Vec3) -> Self {
        Self {
            position,
            velocity,
            life: life.clamp(0.0, 1.0),
            color,
            trail: Trail::new(),
        }
    }

    /// Fixed RGB color assigned at creation.
    #[inline]
    pub fn color(&self) -> Vec3 {
        self.color
    }
}

/// The whole particle population. Its size is fixed at creation.
#[derive(Debug, Clone, Default)]
pub struct ParticleStore {
    particles: Vec<Particle>,
}

impl ParticleStore {
    /// Spawn `count` particles spread uniformly over `viewport`, with small
    /// random velocities, random life, and a random palette color each.
    pub fn create(count: usize, palette: &Palette, viewport: Viewport, ctx: &mut SpawnContext) -> Self {
        let particles = (0..count)
            .map(|_| {
                let position = ctx.random_in_viewport(viewport);
                let velocity = ctx.random_vec2(INITIAL_SPEED);
                let life = ctx.random();
                let color = if palette.is_empty() {
                    palette.get(0)
                } else {
                    palette.get(ctx.random_index(palette.len()))
                };
                Particle::new(position, velocity, life, color)
            })
            .collect();

        Self { particles }
    }

    /// Wrap an explicit set of particles.
    pub fn from_particles(particles: Vec<Particle>) -> Self {
        Self { particles }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.particles.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Particle> {
        self.particles.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Particle> {
        self.particles.iter_mut()
    }

    pub fn as_slice(&self) -> &[Particle] {
        &self.particles
    }

    /// Total trail points currently stored across the population.
    pub fn trail_point_count(&self) -> usize {
        self.particles.iter().map(|p| p.trail.len()).sum()
    }
}
