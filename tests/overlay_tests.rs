//! Integration tests for the overlay lifecycle.
//!
//! A mock sink and scheduler record what the overlay asks of its host, so the
//! state machine can be driven without a window or GPU.

use std::cell::Cell;
use std::rc::Rc;

use fluid_cursor::prelude::*;

#[derive(Default)]
struct Counters {
    built: Cell<usize>,
    frames: Cell<usize>,
    dropped: Cell<usize>,
    requests: Cell<usize>,
    cancels: Cell<usize>,
}

struct MockSink {
    counters: Rc<Counters>,
}

impl FrameSink for MockSink {
    fn resize(&mut self, _viewport: Viewport) {}

    fn draw(&mut self, _particles: &ParticleStore, _time: f32, _fade: f32) -> Result<(), OverlayError> {
        self.counters.frames.set(self.counters.frames.get() + 1);
        Ok(())
    }
}

impl Drop for MockSink {
    fn drop(&mut self) {
        self.counters.dropped.set(self.counters.dropped.get() + 1);
    }
}

struct MockScheduler {
    counters: Rc<Counters>,
}

impl FrameScheduler for MockScheduler {
    fn request_frame(&mut self) {
        self.counters.requests.set(self.counters.requests.get() + 1);
    }

    fn cancel_frame(&mut self) {
        self.counters.cancels.set(self.counters.cancels.get() + 1);
    }
}

type MockOverlay = Overlay<MockSink, MockScheduler>;

fn mount(viewport: Viewport) -> (MockOverlay, Rc<Counters>) {
    let counters = Rc::new(Counters::default());
    let config = FluidConfig::new().with_seed(1);
    let mut overlay = Overlay::new(&config).with_clock(FrameClock::fixed(1.0 / 60.0));

    let scheduler = MockScheduler {
        counters: counters.clone(),
    };
    let sink_counters = counters.clone();
    overlay.mount(viewport, scheduler, move |_| {
        sink_counters.built.set(sink_counters.built.get() + 1);
        Ok(MockSink {
            counters: sink_counters,
        })
    });
    (overlay, counters)
}

// ============================================================================
// Mount
// ============================================================================

#[test]
fn test_zero_surface_fails_quietly() {
    let (mut overlay, counters) = mount(Viewport::new(0, 0));

    assert_eq!(overlay.state(), OverlayState::Failed);
    assert_eq!(counters.built.get(), 0);
    assert_eq!(counters.requests.get(), 0);

    overlay.on_frame();
    assert_eq!(counters.frames.get(), 0);

    overlay.unmount();
    assert_eq!(overlay.state(), OverlayState::Stopped);
}

#[test]
fn test_mount_creates_default_population() {
    let (overlay, counters) = mount(Viewport::new(1280, 720));

    assert_eq!(overlay.state(), OverlayState::Running);
    assert_eq!(overlay.particles().len(), 200);
    assert_eq!(counters.built.get(), 1);
    assert_eq!(counters.requests.get(), 1);
}

#[test]
fn test_each_frame_requests_the_next() {
    let (mut overlay, counters) = mount(Viewport::new(800, 600));

    for _ in 0..30 {
        overlay.on_frame();
    }

    assert_eq!(counters.frames.get(), 30);
    assert_eq!(counters.requests.get(), 31);
}

// ============================================================================
// Unmount
// ============================================================================

#[test]
fn test_mount_then_immediate_unmount() {
    let (mut overlay, counters) = mount(Viewport::new(800, 600));
    overlay.unmount();

    assert_eq!(overlay.state(), OverlayState::Stopped);
    assert_eq!(counters.cancels.get(), 1);
    assert_eq!(counters.dropped.get(), 1);

    // A late tick from the host is ignored
    overlay.on_frame();
    assert_eq!(counters.frames.get(), 0);
}

#[test]
fn test_unmount_twice_releases_once() {
    let (mut overlay, counters) = mount(Viewport::new(800, 600));
    overlay.on_frame();
    overlay.unmount();
    overlay.unmount();

    assert_eq!(counters.dropped.get(), 1);
    assert_eq!(counters.cancels.get(), 1);
}

#[test]
fn test_drop_unmounts() {
    let (overlay, counters) = mount(Viewport::new(800, 600));
    drop(overlay);

    assert_eq!(counters.dropped.get(), 1);
    assert_eq!(counters.cancels.get(), 1);
}

// ============================================================================
// Input
// ============================================================================

#[test]
fn test_events_update_state_in_any_state() {
    let (mut overlay, _counters) = mount(Viewport::new(0, 0));

    overlay.handle(HostEvent::PointerMoved(Vec2::new(12.0, 34.0)));
    overlay.handle(HostEvent::Resized(Viewport::new(300, 200)));

    assert_eq!(overlay.pointer().position, Vec2::new(12.0, 34.0));
    assert_eq!(overlay.viewport(), Viewport::new(300, 200));
    assert_eq!(overlay.state(), OverlayState::Failed);
}

#[test]
fn test_particles_follow_resized_bounds() {
    let (mut overlay, _counters) = mount(Viewport::new(800, 600));
    overlay.resized(200, 100);

    for _ in 0..3 {
        overlay.on_frame();
    }

    for p in overlay.particles().iter() {
        assert!(p.position.x <= 200.0);
        assert!(p.position.y <= 100.0);
    }
}
