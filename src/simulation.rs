//! Per-tick particle update: pointer swirl, turbulence, bounce and drag.
//!
//! Every particle is advanced independently. There is no neighbor
//! interaction; the vortex look comes from each particle reacting to the
//! pointer on its own.

use std::f32::consts::FRAC_PI_2;

use glam::Vec2;

use crate::input::{Pointer, Viewport};
use crate::particle::{Particle, ParticleStore};
use crate::spawn::SpawnContext;

/// Below this pointer distance the radial direction is treated as undefined.
pub const MIN_DISTANCE: f32 = 1e-4;

/// Force constants for the fluid-like motion.
///
/// Defaults reproduce the overlay's stock behavior.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FluidForces {
    /// Pointer interaction radius in pixels.
    pub radius: f32,
    /// Tangential impulse scale at the pointer (force = 1).
    pub swirl: f32,
    /// Radial impulse scale toward the pointer (force = 1).
    pub attraction: f32,
    /// Half-width of the uniform noise added to each velocity component.
    pub turbulence: f32,
    /// Velocity factor applied on a wall hit (negative reflects).
    pub restitution: f32,
    /// Velocity multiplier applied every tick.
    pub damping: f32,
}

impl Default for FluidForces {
    fn default() -> Self {
        Self {
            radius: 150.0,
            swirl: 0.02,
            attraction: 0.01,
            turbulence: 0.0005,
            restitution: -0.8,
            damping: 0.99,
        }
    }
}

/// How a tick maps onto simulated time.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum StepMode {
    /// One unit step per display tick. Motion speed follows the refresh
    /// rate.
    #[default]
    PerTick,
    /// Scale each step by `delta * reference_hz`, so motion looks the same
    /// at any refresh rate as it does at `reference_hz` in `PerTick` mode.
    RealTime { reference_hz: f32 },
}

impl StepMode {
    /// Step scale for a frame that took `delta` seconds.
    pub fn scale(&self, delta: f32) -> f32 {
        match *self {
            StepMode::PerTick => 1.0,
            StepMode::RealTime { reference_hz } => {
                let scale = delta * reference_hz;
                if scale.is_finite() {
                    scale.clamp(0.0, 4.0)
                } else {
                    1.0
                }
            }
        }
    }
}

/// Advances a [`ParticleStore`] one frame at a time.
#[derive(Debug, Clone)]
pub struct Simulation {
    forces: FluidForces,
    step_mode: StepMode,
    rng: SpawnContext,
}

impl Simulation {
    pub fn new(forces: FluidForces, step_mode: StepMode, rng: SpawnContext) -> Self {
        Self {
            forces,
            step_mode,
            rng,
        }
    }

    /// Advance every particle by one tick.
    ///
    /// `now` is the absolute time in seconds and only affects the cosmetic
    /// `life` pulse.
    pub fn advance(&mut self, particles: &mut ParticleStore, pointer: Pointer, viewport: Viewport, now: f32) {
        self.advance_scaled(particles, pointer, viewport, now, 1.0);
    }

    /// Advance every particle using the configured [`StepMode`] for a frame
    /// that took `delta` seconds.
    pub fn advance_timed(
        &mut self,
        particles: &mut ParticleStore,
        pointer: Pointer,
        viewport: Viewport,
        now: f32,
        delta: f32,
    ) {
        let scale = self.step_mode.scale(delta);
        self.advance_scaled(particles, pointer, viewport, now, scale);
    }

    fn advance_scaled(
        &mut self,
        particles: &mut ParticleStore,
        pointer: Pointer,
        viewport: Viewport,
        now: f32,
        scale: f32,
    ) {
        let bounds = viewport.size();
        let damping = if scale == 1.0 {
            self.forces.damping
        } else {
            self.forces.damping.powf(scale)
        };

        for particle in particles.iter_mut() {
            particle.trail.push_front(particle.position);

            let impulse = self.pointer_impulse(particle.position, pointer.position);
            let noise = self.rng.random_vec2(self.forces.turbulence);
            particle.velocity += (impulse + noise) * scale;

            particle.position += particle.velocity * scale;

            reflect_axis(
                &mut particle.position.x,
                &mut particle.velocity.x,
                bounds.x,
                self.forces.restitution,
            );
            reflect_axis(
                &mut particle.position.y,
                &mut particle.velocity.y,
                bounds.y,
                self.forces.restitution,
            );

            particle.velocity *= damping;
            particle.life = pulse(now, particle.position.x);

            sanitize(particle, viewport);
        }
    }

    /// Velocity change from the pointer: a tangential swirl plus a weaker
    /// pull toward the pointer, fading linearly to zero at the radius.
    fn pointer_impulse(&self, position: Vec2, pointer: Vec2) -> Vec2 {
        let delta = pointer - position;
        let distance = delta.length();

        if !distance.is_finite() || distance >= self.forces.radius {
            return Vec2::ZERO;
        }

        let force = (self.forces.radius - distance) / self.forces.radius;
        let angle = delta.y.atan2(delta.x);

        let swirl = Vec2::new((angle + FRAC_PI_2).cos(), (angle + FRAC_PI_2).sin())
            * (force * self.forces.swirl);
        let radial = delta / distance.max(MIN_DISTANCE) * (force * self.forces.attraction);

        swirl + radial
    }
}

/// Reflect and damp one axis if the position left `[0, max]`.
#[inline]
fn reflect_axis(position: &mut f32, velocity: &mut f32, max: f32, restitution: f32) {
    if *position < 0.0 || *position > max {
        *velocity *= restitution;
        *position = position.clamp(0.0, max);
    }
}

/// Cosmetic life value in 0.0-1.0.
#[inline]
pub fn pulse(now: f32, x: f32) -> f32 {
    (now * 0.5 + x * 0.01).sin() * 0.5 + 0.5
}

/// Reset anything that went non-finite so it can't spread through later
/// ticks or reach the GPU.
fn sanitize(particle: &mut Particle, viewport: Viewport) {
    if !particle.velocity.is_finite() {
        particle.velocity = Vec2::ZERO;
    }
    if !particle.position.is_finite() {
        particle.position = viewport.center();
    }
    particle.trail.replace_non_finite(particle.position);
    particle.life = if particle.life.is_finite() {
        particle.life.clamp(0.0, 1.0)
    } else {
        0.5
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    fn calm_forces() -> FluidForces {
        FluidForces {
            turbulence: 0.0,
            ..FluidForces::default()
        }
    }

    fn single(position: Vec2, velocity: Vec2) -> ParticleStore {
        ParticleStore::from_particles(vec![Particle::new(position, velocity, 0.5, Vec3::ONE)])
    }

    #[test]
    fn test_reflects_off_right_wall() {
        let mut sim = Simulation::new(calm_forces(), StepMode::PerTick, SpawnContext::from_seed(0));
        let viewport = Viewport::new(800, 600);
        let mut store = single(Vec2::new(805.0, 300.0), Vec2::new(2.0, 0.0));

        sim.advance(&mut store, Pointer::new(-1000.0, -1000.0), viewport, 0.0);

        let p = &store.as_slice()[0];
        assert!(p.position.x >= 0.0 && p.position.x <= 800.0);
        assert!(p.velocity.x < 0.0);
        // 2.0 * -0.8 * 0.99
        assert!((p.velocity.x + 1.584).abs() < 1e-5);
    }

    #[test]
    fn test_swirl_inside_radius() {
        let mut sim = Simulation::new(calm_forces(), StepMode::PerTick, SpawnContext::from_seed(0));
        let viewport = Viewport::new(800, 600);
        let mut store = single(Vec2::new(100.0, 100.0), Vec2::ZERO);

        // Pointer 50px to the right: swirl is along +Y, pull along +X
        sim.advance(&mut store, Pointer::new(150.0, 100.0), viewport, 0.0);

        let v = store.as_slice()[0].velocity;
        let force = 100.0 / 150.0;
        assert!((v.y - force * 0.02 * 0.99).abs() < 1e-5);
        assert!((v.x - force * 0.01 * 0.99).abs() < 1e-5);
    }

    #[test]
    fn test_no_force_outside_radius() {
        let mut sim = Simulation::new(calm_forces(), StepMode::PerTick, SpawnContext::from_seed(0));
        let viewport = Viewport::new(800, 600);
        let mut store = single(Vec2::new(100.0, 100.0), Vec2::ZERO);

        sim.advance(&mut store, Pointer::new(400.0, 100.0), viewport, 0.0);

        assert_eq!(store.as_slice()[0].velocity, Vec2::ZERO);
    }

    #[test]
    fn test_pointer_on_particle_stays_finite() {
        let mut sim = Simulation::new(FluidForces::default(), StepMode::PerTick, SpawnContext::from_seed(9));
        let viewport = Viewport::new(800, 600);
        let mut store = single(Vec2::new(200.0, 200.0), Vec2::ZERO);

        sim.advance(&mut store, Pointer::new(200.0, 200.0), viewport, 1.0);

        let p = &store.as_slice()[0];
        assert!(p.velocity.is_finite());
        assert!(p.position.is_finite());
    }

    #[test]
    fn test_non_finite_state_is_reset() {
        let mut sim = Simulation::new(calm_forces(), StepMode::PerTick, SpawnContext::from_seed(0));
        let viewport = Viewport::new(400, 400);
        let mut store = single(Vec2::new(f32::NAN, 10.0), Vec2::new(f32::INFINITY, 0.0));

        sim.advance(&mut store, Pointer::default(), viewport, 0.0);

        let p = &store.as_slice()[0];
        assert!(p.position.is_finite());
        assert!(p.velocity.is_finite());
        assert!((0.0..=1.0).contains(&p.life));
    }

    #[test]
    fn test_reset_keeps_trail_length() {
        let mut sim = Simulation::new(calm_forces(), StepMode::PerTick, SpawnContext::from_seed(0));
        let viewport = Viewport::new(400, 400);
        let mut store = single(Vec2::new(f32::NAN, f32::NAN), Vec2::ZERO);

        for _ in 0..3 {
            sim.advance(&mut store, Pointer::new(-1000.0, -1000.0), viewport, 0.0);
        }

        let trail = &store.as_slice()[0].trail;
        assert_eq!(trail.len(), 3);
        assert!(trail.iter().all(|point| point.is_finite()));
    }

    #[test]
    fn test_pulse_range() {
        for i in 0..1000 {
            let life = pulse(i as f32 * 0.37, i as f32 * 3.1);
            assert!((0.0..=1.0).contains(&life));
        }
    }

    #[test]
    fn test_real_time_scale() {
        let mode = StepMode::RealTime { reference_hz: 60.0 };
        assert!((mode.scale(1.0 / 60.0) - 1.0).abs() < 1e-5);
        assert!((mode.scale(1.0 / 120.0) - 0.5).abs() < 1e-5);
        // Long stalls are capped
        assert_eq!(mode.scale(10.0), 4.0);
        assert_eq!(StepMode::PerTick.scale(0.5), 1.0);
    }
}
