//! Time management utilities
//!
//! The host drives every `update`/`draw` pass with a [`GameTime`]. [`Timer`]
//! is a convenience for hosts that measure frames with the wall clock.

use std::time::{Duration, Instant};

/// Timing information for a single frame tick
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GameTime {
    /// Milliseconds elapsed since the previous tick
    pub elapsed_ms: f32,
    /// Milliseconds elapsed since the first tick
    pub total_ms: f64,
    /// Index of this tick (0 for the first one)
    pub frame: u64,
}

impl GameTime {
    /// Create a game time for a single tick
    pub fn new(elapsed_ms: f32, total_ms: f64, frame: u64) -> Self {
        Self { elapsed_ms, total_ms, frame }
    }

    /// Build a tick from a frame delta, e.g. for fixed-step hosts and tests
    pub fn from_delta(elapsed: Duration) -> Self {
        let elapsed_ms = elapsed.as_secs_f32() * 1000.0;
        Self::new(elapsed_ms, f64::from(elapsed_ms), 0)
    }

    /// Elapsed time in seconds
    pub fn elapsed_secs(&self) -> f32 {
        self.elapsed_ms / 1000.0
    }

    /// Advance by another frame of `elapsed_ms` milliseconds
    pub fn advance(&self, elapsed_ms: f32) -> Self {
        Self::new(elapsed_ms, self.total_ms + f64::from(elapsed_ms), self.frame + 1)
    }
}

/// High-precision timer for frame timing
#[derive(Debug)]
pub struct Timer {
    last_frame: Instant,
    time: GameTime,
    started: bool,
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}

impl Timer {
    /// Create a new timer
    pub fn new() -> Self {
        Self {
            last_frame: Instant::now(),
            time: GameTime::default(),
            started: false,
        }
    }

    /// Measure the frame that just ended and return its game time
    ///
    /// Should be called once per frame, before the update pass.
    pub fn tick(&mut self) -> GameTime {
        let now = Instant::now();
        let elapsed_ms = now.duration_since(self.last_frame).as_secs_f32() * 1000.0;
        self.last_frame = now;

        self.time = if self.started {
            self.time.advance(elapsed_ms)
        } else {
            self.started = true;
            GameTime::new(elapsed_ms, f64::from(elapsed_ms), 0)
        };
        self.time
    }

    /// The most recent game time produced by [`Timer::tick`]
    pub fn current(&self) -> GameTime {
        self.time
    }

    /// Get the current FPS (based on last frame time)
    pub fn current_fps(&self) -> f32 {
        if self.time.elapsed_ms > 0.0 {
            1000.0 / self.time.elapsed_ms
        } else {
            0.0
        }
    }
}
