//! Frame clock and per-frame timing.
//!
//! The clock is sampled exactly once per frame: the host passes the current
//! [`Instant`] to [`FrameClock::begin_frame`], and every decision taken during
//! that frame (timeout expiry, activation timestamps) uses that single sample.
//! Nothing re-reads the system clock mid-pass.
//!
//! # Design Principles
//!
//! - Counters use saturating arithmetic; a clock that goes backwards yields
//!   zero-length frames rather than a panic.
//! - Frames per second are counted over rolling one-second windows.

use std::time::{Duration, Instant};

/// Length of the window over which frames per second are counted.
const FPS_WINDOW: Duration = Duration::from_secs(1);

/// Read-only view of the current frame handed to module hooks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameInfo {
    /// Frame number, starting at 1 for the first frame.
    pub frame: u64,
    /// The instant sampled for this frame.
    pub now: Instant,
    /// Time since the first frame.
    pub elapsed: Duration,
    /// Time between the previous frame's sample and this one.
    pub last_frame_length: Duration,
    /// Frames counted during the last complete one-second window.
    pub fps: u32,
    /// Time spent in the previous frame's update pass.
    pub update_time: Duration,
    /// Time spent in the previous frame's render pass.
    pub render_time: Duration,
    /// Whether the engine is globally paused this frame.
    pub paused: bool,
}

/// Frame clock tracking the engine's temporal state.
#[derive(Debug, Clone)]
pub struct FrameClock {
    /// Current frame number (0 before the first frame).
    frame: u64,

    /// Sample taken at the first frame.
    started_at: Option<Instant>,

    /// Sample taken at the current frame.
    frame_start: Option<Instant>,

    /// Length of the current frame as measured against the previous sample.
    last_frame_length: Duration,

    /// Start of the running fps window.
    window_start: Option<Instant>,

    /// Frames seen in the running fps window.
    window_frames: u32,

    /// Frames seen in the last complete window.
    fps: u32,

    /// Update pass duration recorded for the previous frame.
    update_time: Duration,

    /// Render pass duration recorded for the previous frame.
    render_time: Duration,
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameClock {
    /// Create a clock that has not seen any frame yet.
    pub const fn new() -> Self {
        Self {
            frame: 0,
            started_at: None,
            frame_start: None,
            last_frame_length: Duration::ZERO,
            window_start: None,
            window_frames: 0,
            fps: 0,
            update_time: Duration::ZERO,
            render_time: Duration::ZERO,
        }
    }

    /// Advance to a new frame sampled at `now` and return its view.
    pub fn begin_frame(&mut self, now: Instant, paused: bool) -> FrameInfo {
        self.frame = self.frame.saturating_add(1);
        let started_at = *self.started_at.get_or_insert(now);

        self.last_frame_length = self
            .frame_start
            .map_or(Duration::ZERO, |previous| now.saturating_duration_since(previous));
        self.frame_start = Some(now);

        let window_start = *self.window_start.get_or_insert(now);
        self.window_frames = self.window_frames.saturating_add(1);
        if now.saturating_duration_since(window_start) >= FPS_WINDOW {
            self.fps = self.window_frames;
            self.window_frames = 0;
            self.window_start = Some(now);
        }

        FrameInfo {
            frame: self.frame,
            now,
            elapsed: now.saturating_duration_since(started_at),
            last_frame_length: self.last_frame_length,
            fps: self.fps,
            update_time: self.update_time,
            render_time: self.render_time,
            paused,
        }
    }

    /// Record how long this frame's update pass took.
    pub const fn record_update_time(&mut self, duration: Duration) {
        self.update_time = duration;
    }

    /// Record how long this frame's render pass took.
    pub const fn record_render_time(&mut self, duration: Duration) {
        self.render_time = duration;
    }

    /// Current frame number (0 before the first frame).
    pub const fn frame(&self) -> u64 {
        self.frame
    }

    /// Frames per second over the last complete window.
    pub const fn fps(&self) -> u32 {
        self.fps
    }

    /// Sample of the current frame, if any frame has started.
    pub const fn now(&self) -> Option<Instant> {
        self.frame_start
    }
}
