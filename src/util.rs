//! Shared utilities

use std::collections::VecDeque;
use std::time::Instant;

/// Simulation rates are tuned against this update rate
pub const TARGET_FPS: f32 = 60.0;
/// Upper bound on a single frame's elapsed time, in target frames
pub const MAX_FRAME_DT: f32 = 3.0;

/// Linear interpolation between two colors, rounded to the nearest channel value.
///
/// Rounding rather than truncating makes `t = 0` and `t = 1` return the stop
/// colors exactly, so LUT endpoints match their palette stops.
#[inline]
pub fn lerp_color(c1: (u8, u8, u8), c2: (u8, u8, u8), t: f32) -> (u8, u8, u8) {
    let t = t.clamp(0.0, 1.0);
    let mix = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * t).round() as u8;
    (mix(c1.0, c2.0), mix(c1.1, c2.1), mix(c1.2, c2.2))
}

/// Convert seconds to target-frame units, clamped to [`MAX_FRAME_DT`]
#[inline]
pub fn frame_units(seconds: f32) -> f32 {
    (seconds * TARGET_FPS).clamp(0.0, MAX_FRAME_DT)
}

// ============================================================================
// Frame Clock
// ============================================================================

/// Frame timer with a rolling FPS average
pub struct FrameClock {
    frame_times: VecDeque<f32>,
    last_frame: Instant,
    sample_count: usize,
}

impl FrameClock {
    /// Create a new clock with the given sample window
    pub fn new(sample_count: usize) -> Self {
        Self {
            frame_times: VecDeque::with_capacity(sample_count),
            last_frame: Instant::now(),
            sample_count: sample_count.max(1),
        }
    }

    /// Call once per frame.
    /// Returns (elapsed time in clamped target-frame units, average fps)
    pub fn tick(&mut self) -> (f32, f32) {
        let now = Instant::now();
        let secs = (now - self.last_frame).as_secs_f32();
        self.last_frame = now;
        self.record(secs);
        (frame_units(secs), self.avg_fps())
    }

    fn record(&mut self, secs: f32) {
        self.frame_times.push_back(secs);
        if self.frame_times.len() > self.sample_count {
            self.frame_times.pop_front();
        }
    }

    /// Average frame time in milliseconds
    pub fn avg_frame_time_ms(&self) -> f32 {
        self.avg_dt() * 1000.0
    }

    pub fn avg_fps(&self) -> f32 {
        let avg_dt = self.avg_dt();
        if avg_dt > 0.0 {
            1.0 / avg_dt
        } else {
            0.0
        }
    }

    fn avg_dt(&self) -> f32 {
        self.frame_times.iter().sum::<f32>() / self.frame_times.len().max(1) as f32
    }

    /// Min/max FPS over the sample window
    pub fn min_max_fps(&self) -> (f32, f32) {
        if self.frame_times.is_empty() {
            return (0.0, 0.0);
        }
        let min_dt = self.frame_times.iter().copied().fold(f32::INFINITY, f32::min);
        let max_dt = self.frame_times.iter().copied().fold(0.0, f32::max);
        let max_fps = if min_dt > 0.0 { 1.0 / min_dt } else { 0.0 };
        let min_fps = if max_dt > 0.0 { 1.0 / max_dt } else { 0.0 };
        (min_fps, max_fps)
    }

    /// Frames currently in the sample window
    pub fn frame_count(&self) -> usize {
        self.frame_times.len()
    }
}
