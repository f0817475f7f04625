//! Frame timing
//!
//! Animators consume a [`FrameTime`] once per frame. [`FrameClock`] produces
//! one either from the wall clock or from explicit `advance` calls, which is
//! what headless hosts and tests use.
//!
//! ```rust
//! use pointfield_core::FrameClock;
//!
//! let mut clock = FrameClock::manual();
//! let frame = clock.advance(1.0 / 60.0);
//! assert_eq!(frame.frame, 1);
//! assert!(frame.elapsed > 0.0);
//! ```

use std::time::Instant;

/// Timing snapshot for a single frame
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FrameTime {
    /// Seconds since the clock started; never decreases
    pub elapsed: f32,
    /// Seconds since the previous frame
    pub delta: f32,
    /// Frames produced so far, this one included
    pub frame: u64,
}

impl FrameTime {
    pub fn new(elapsed: f32, delta: f32, frame: u64) -> Self {
        Self { elapsed, delta, frame }
    }

    /// Snapshot at a given elapsed time with no delta, as used for one-off evaluation
    pub fn at(elapsed: f32) -> Self {
        Self { elapsed, delta: 0.0, frame: 0 }
    }
}

#[derive(Debug)]
enum Source {
    Wall { last: Instant },
    Manual,
}

/// Monotonic frame clock with pause and time scaling
#[derive(Debug)]
pub struct FrameClock {
    source: Source,
    current: FrameTime,
    time_scale: f32,
    paused: bool,
}

impl FrameClock {
    /// Clock driven by [`Instant`]; call [`FrameClock::tick`] once per frame
    pub fn new() -> Self {
        Self::with_source(Source::Wall { last: Instant::now() })
    }

    /// Clock driven by [`FrameClock::advance`]
    pub fn manual() -> Self {
        Self::with_source(Source::Manual)
    }

    fn with_source(source: Source) -> Self {
        Self {
            source,
            current: FrameTime::default(),
            time_scale: 1.0,
            paused: false,
        }
    }

    /// Read the wall clock and produce the next frame.
    ///
    /// On a manual clock this produces a frame with zero delta.
    pub fn tick(&mut self) -> FrameTime {
        let raw = match &mut self.source {
            Source::Wall { last } => {
                let now = Instant::now();
                let raw = now.duration_since(*last).as_secs_f32();
                *last = now;
                raw
            }
            Source::Manual => 0.0,
        };
        self.step(raw)
    }

    /// Advance by `dt` seconds and produce the next frame. Negative or
    /// non-finite steps count as zero.
    pub fn advance(&mut self, dt: f32) -> FrameTime {
        if let Source::Wall { last } = &mut self.source {
            *last = Instant::now();
        }
        self.step(dt)
    }

    fn step(&mut self, raw: f32) -> FrameTime {
        let raw = if raw.is_finite() { raw.max(0.0) } else { 0.0 };
        let delta = if self.paused { 0.0 } else { raw * self.time_scale };
        self.current = FrameTime {
            elapsed: self.current.elapsed + delta,
            delta,
            frame: self.current.frame + 1,
        };
        self.current
    }

    /// The most recently produced frame
    pub fn current(&self) -> FrameTime {
        self.current
    }

    pub fn elapsed(&self) -> f32 {
        self.current.elapsed
    }

    pub fn pause(&mut self) {
        self.paused = true;
    }

    pub fn resume(&mut self) {
        self.paused = false;
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Set time scale multiplier (`1.0` = normal speed). Negative values clamp to 0.
    pub fn set_time_scale(&mut self, scale: f32) {
        self.time_scale = scale.max(0.0);
    }

    pub fn time_scale(&self) -> f32 {
        self.time_scale
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}
