//! Frame timing for the overlay's animation loop.
//!
//! The clock starts when the overlay mounts. Its elapsed seconds feed both the
//! simulation's `now` and the shader's `time` uniform.
//!
//! # Example
//!
//! ```ignore
//! let mut clock = FrameClock::new();
//!
//! // Once per display tick:
//! let (elapsed, delta) = clock.tick();
//! ```

use std::time::{Duration, Instant};

/// Elapsed time, delta time, frame count and FPS for the animation loop.
#[derive(Debug, Clone)]
pub struct FrameClock {
    /// When the clock was started.
    start: Instant,
    /// When the last tick happened.
    last_tick: Instant,
    /// Seconds since start, as of the last tick.
    elapsed_secs: f32,
    /// Seconds between the last two ticks.
    delta_secs: f32,
    /// Ticks since start.
    frame_count: u64,
    fps: f32,
    fps_frame_count: u64,
    fps_update_time: Instant,
    fps_update_interval: Duration,
    /// When set, every tick advances by exactly this many seconds instead of
    /// wall-clock time.
    fixed_delta: Option<f32>,
}

impl FrameClock {
    /// Create a clock starting now.
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            start: now,
            last_tick: now,
            elapsed_secs: 0.0,
            delta_secs: 0.0,
            frame_count: 0,
            fps: 0.0,
            fps_frame_count: 0,
            fps_update_time: now,
            fps_update_interval: Duration::from_millis(500),
            fixed_delta: None,
        }
    }

    /// Clock that ignores wall time and advances `delta` seconds per tick.
    /// Makes simulation runs reproducible.
    pub fn fixed(delta: f32) -> Self {
        let mut clock = Self::new();
        clock.fixed_delta = Some(delta.max(0.0));
        clock
    }

    /// Advance one frame. Returns `(elapsed, delta)` in seconds.
    pub fn tick(&mut self) -> (f32, f32) {
        let now = Instant::now();
        self.frame_count += 1;

        match self.fixed_delta {
            Some(delta) => {
                self.delta_secs = delta;
                self.elapsed_secs += delta;
            }
            None => {
                self.delta_secs = now.duration_since(self.last_tick).as_secs_f32();
                self.elapsed_secs = now.duration_since(self.start).as_secs_f32();
            }
        }
        self.last_tick = now;

        let fps_elapsed = now.duration_since(self.fps_update_time);
        if fps_elapsed >= self.fps_update_interval {
            let frames_since = self.frame_count - self.fps_frame_count;
            self.fps = frames_since as f32 / fps_elapsed.as_secs_f32();
            self.fps_frame_count = self.frame_count;
            self.fps_update_time = now;
        }

        (self.elapsed_secs, self.delta_secs)
    }

    /// Seconds since start, as of the last tick.
    #[inline]
    pub fn elapsed(&self) -> f32 {
        self.elapsed_secs
    }

    #[inline]
    pub fn delta(&self) -> f32 {
        self.delta_secs
    }

    /// Ticks since start.
    #[inline]
    pub fn frame(&self) -> u64 {
        self.frame_count
    }

    /// Frames per second, refreshed twice a second.
    #[inline]
    pub fn fps(&self) -> f32 {
        self.fps
    }

    /// Restart from zero.
    pub fn reset(&mut self) {
        let fixed_delta = self.fixed_delta;
        *self = Self::new();
        self.fixed_delta = fixed_delta;
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}
