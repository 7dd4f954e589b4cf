//! Integration tests for the simulation step.
//!
//! These run whole populations through many ticks and check the properties
//! every frame must satisfy before it reaches the GPU.

use fluid_cursor::prelude::*;
use fluid_cursor::{Particle, Simulation, SpawnContext, TRAIL_LENGTH};

fn population(count: usize, seed: u64, viewport: Viewport) -> ParticleStore {
    ParticleStore::create(count, &Palette::default(), viewport, &mut SpawnContext::from_seed(seed))
}

fn simulation(seed: u64) -> Simulation {
    Simulation::new(FluidForces::default(), StepMode::PerTick, SpawnContext::from_seed(seed))
}

// ============================================================================
// Invariants
// ============================================================================

#[test]
fn test_positions_and_life_stay_in_range() {
    let viewport = Viewport::new(640, 480);
    let mut store = population(200, 1, viewport);
    let mut sim = simulation(2);

    for tick in 0..600 {
        // Sweep the pointer across the surface
        let pointer = Pointer::new((tick % 640) as f32, 240.0);
        sim.advance(&mut store, pointer, viewport, tick as f32 / 60.0);

        for p in store.iter() {
            assert!(p.position.x >= 0.0 && p.position.x <= 640.0, "x out of range: {}", p.position.x);
            assert!(p.position.y >= 0.0 && p.position.y <= 480.0, "y out of range: {}", p.position.y);
            assert!((0.0..=1.0).contains(&p.life));
            assert!(p.velocity.is_finite());
        }
    }
}

#[test]
fn test_velocity_bounded_with_distant_pointer() {
    let viewport = Viewport::new(800, 600);
    let mut store = population(200, 5, viewport);
    let mut sim = simulation(6);
    let pointer = Pointer::new(-10_000.0, -10_000.0);

    for tick in 0..5000 {
        sim.advance(&mut store, pointer, viewport, tick as f32 / 60.0);
    }

    for p in store.iter() {
        assert!(p.velocity.length() < 1.0, "velocity grew to {}", p.velocity);
    }
}

#[test]
fn test_trail_length_is_min_of_ticks_and_capacity() {
    let viewport = Viewport::new(800, 600);
    let mut store = population(20, 7, viewport);
    let mut sim = simulation(8);

    assert!(store.iter().all(|p| p.trail.is_empty()));

    for tick in 1..=15 {
        sim.advance(&mut store, Pointer::default(), viewport, tick as f32 / 60.0);
        let expected = tick.min(TRAIL_LENGTH);
        assert!(store.iter().all(|p| p.trail.len() == expected));
    }
    assert_eq!(store.trail_point_count(), 20 * TRAIL_LENGTH);
}

#[test]
fn test_trail_records_previous_position() {
    let viewport = Viewport::new(800, 600);
    let mut store = ParticleStore::from_particles(vec![Particle::new(
        Vec2::new(400.0, 300.0),
        Vec2::new(1.0, 0.0),
        0.5,
        Vec3::ONE,
    )]);
    let mut sim = Simulation::new(
        FluidForces {
            turbulence: 0.0,
            ..FluidForces::default()
        },
        StepMode::PerTick,
        SpawnContext::from_seed(0),
    );

    sim.advance(&mut store, Pointer::new(-1000.0, -1000.0), viewport, 0.0);

    let p = &store.as_slice()[0];
    assert_eq!(p.trail.iter().next(), Some(Vec2::new(400.0, 300.0)));
    assert!((p.position.x - 401.0).abs() < 1e-5);
}

// ============================================================================
// Pointer interaction
// ============================================================================

#[test]
fn test_pointer_within_radius_imparts_swirl() {
    let viewport = Viewport::new(800, 600);
    let start = Vec2::new(300.0, 300.0);
    let mut store = ParticleStore::from_particles(vec![Particle::new(start, Vec2::ZERO, 0.5, Vec3::ONE)]);
    let mut sim = simulation(0);

    // 100px above the particle
    sim.advance(&mut store, Pointer::new(300.0, 200.0), viewport, 0.0);

    let v = store.as_slice()[0].velocity;
    // Tangential component dominates along x
    assert!(v.x.abs() > 0.005, "expected swirl, got {}", v);
}

#[test]
fn test_particle_at_pointer_stays_finite() {
    let viewport = Viewport::new(800, 600);
    let mut store = ParticleStore::from_particles(vec![Particle::new(
        Vec2::new(100.0, 100.0),
        Vec2::ZERO,
        0.5,
        Vec3::ONE,
    )]);
    let mut sim = simulation(0);

    for tick in 0..100 {
        let at = store.as_slice()[0].position;
        sim.advance(&mut store, Pointer::new(at.x, at.y), viewport, tick as f32);
    }

    let p = &store.as_slice()[0];
    assert!(p.position.is_finite());
    assert!(p.velocity.is_finite());
}

#[test]
fn test_empty_population() {
    let viewport = Viewport::new(800, 600);
    let mut store = population(0, 1, viewport);
    let mut sim = simulation(1);
    sim.advance(&mut store, Pointer::default(), viewport, 0.0);
    assert!(store.is_empty());
}

// ============================================================================
// Determinism
// ============================================================================

fn seeded_run() -> Vec<Particle> {
    let viewport = Viewport::new(1280, 720);
    let mut store = population(200, 42, viewport);
    let mut sim = simulation(43);
    for tick in 0..1000 {
        sim.advance(&mut store, Pointer::new(0.0, 0.0), viewport, tick as f32 / 60.0);
    }
    store.as_slice().to_vec()
}

#[test]
fn test_seeded_run_is_reproducible() {
    let first = seeded_run();
    let second = seeded_run();
    assert_eq!(first.len(), 200);
    assert_eq!(first, second);
}

#[test]
fn test_real_time_matches_per_tick_at_reference_rate() {
    let viewport = Viewport::new(800, 600);
    let mut per_tick_store = population(50, 11, viewport);
    let mut real_time_store = per_tick_store.clone();

    let mut per_tick = simulation(12);
    let mut real_time = Simulation::new(
        FluidForces::default(),
        StepMode::RealTime { reference_hz: 60.0 },
        SpawnContext::from_seed(12),
    );

    for tick in 0..60 {
        let now = tick as f32 / 60.0;
        let pointer = Pointer::new(-1000.0, -1000.0);
        per_tick.advance(&mut per_tick_store, pointer, viewport, now);
        real_time.advance_timed(&mut real_time_store, pointer, viewport, now, 1.0 / 60.0);
    }

    for (a, b) in per_tick_store.iter().zip(real_time_store.iter()) {
        assert!((a.position - b.position).length() < 0.5);
    }
}
