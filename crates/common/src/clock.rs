//! Frame timing utilities.
//!
//! Every still in the output video is placed on a fixed frame grid
//! derived from the target frame rate. This module provides utilities for:
//! - Converting between seconds and frame indices
//! - Checking durations against the one-frame tolerance
//! - Measuring stage wall time

use std::time::Instant;

/// Fixed frame-rate clock for the output video.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameClock {
    fps: u32,
}

impl FrameClock {
    /// Create a clock for the given frame rate. A zero rate is treated as 1.
    pub fn new(fps: u32) -> Self {
        Self { fps: fps.max(1) }
    }

    /// Frames per second.
    pub fn fps(&self) -> u32 {
        self.fps
    }

    /// Length of one frame in seconds.
    pub fn frame_interval_secs(&self) -> f64 {
        1.0 / self.fps as f64
    }

    /// Number of frames needed to cover `secs` (rounded to the nearest frame).
    pub fn frames_in(&self, secs: f64) -> u64 {
        (secs.max(0.0) * self.fps as f64).round() as u64
    }

    /// Whether two durations differ by at most one frame interval.
    pub fn within_one_frame(&self, a_secs: f64, b_secs: f64) -> bool {
        (a_secs - b_secs).abs() <= self.frame_interval_secs() + 1e-9
    }
}

/// Wall-clock stopwatch for logging stage durations.
#[derive(Debug, Clone)]
pub struct Stopwatch {
    started: Instant,
}

impl Stopwatch {
    pub fn start() -> Self {
        Self {
            started: Instant::now(),
        }
    }

    /// Seconds since start.
    pub fn elapsed_secs(&self) -> f64 {
        self.started.elapsed().as_secs_f64()
    }

    /// Milliseconds since start.
    pub fn elapsed_ms(&self) -> u128 {
        self.started.elapsed().as_millis()
    }
}
