//! Temporal smoothing of landmark frames.
//!
//! Adaptive exponential moving average: heavy smoothing while the hand is
//! near-stationary (stable poses), light smoothing during fast motion
//! (responsive swipes).  A dead zone holds the output entirely when the
//! mean displacement is below sensor-noise level.  Deterministic: the same
//! input sequence always yields the same output sequence.

use std::collections::VecDeque;

use crate::config::SmoothingConfig;
use crate::landmarks::{distance, HandFrame, LANDMARK_COUNT};

/// Frames of smoothed history retained per tracked hand.
const HISTORY_LEN: usize = 5;

/// A smoothed landmark frame with its tick identity.
#[derive(Debug, Clone)]
pub struct SmoothedFrame {
    /// Smoothed landmark positions, image coordinates.
    pub points: [[f32; 3]; LANDMARK_COUNT],
    /// Monotonically increasing sequence number.
    pub seq: u64,
    /// Capture timestamp in seconds.
    pub timestamp_s: f64,
}

/// Adaptive EMA smoother for one tracked hand.
#[derive(Debug)]
pub struct Smoother {
    config: SmoothingConfig,
    history: VecDeque<SmoothedFrame>,
    seq: u64,
}

impl Smoother {
    pub fn new(config: SmoothingConfig) -> Self {
        Self {
            config,
            history: VecDeque::with_capacity(HISTORY_LEN),
            seq: 0,
        }
    }

    /// Smooth one incoming frame.  The first frame after construction or
    /// a reset passes through unchanged.
    pub fn push(&mut self, frame: &HandFrame, timestamp_s: f64) -> SmoothedFrame {
        self.seq += 1;
        let points = match self.history.back() {
            None => frame.points,
            Some(prev) => self.blend(&prev.points, &frame.points),
        };

        let smoothed = SmoothedFrame {
            points,
            seq: self.seq,
            timestamp_s,
        };
        if self.history.len() >= HISTORY_LEN {
            self.history.pop_front();
        }
        self.history.push_back(smoothed.clone());
        smoothed
    }

    /// Blend the incoming points against the previous smoothed frame with
    /// a displacement-adaptive weight.
    fn blend(
        &self,
        prev: &[[f32; 3]; LANDMARK_COUNT],
        new: &[[f32; 3]; LANDMARK_COUNT],
    ) -> [[f32; 3]; LANDMARK_COUNT] {
        let displacement = mean_displacement(prev, new);

        // Stationary hand: hold the previous output, suppressing jitter.
        if displacement < self.config.dead_zone {
            return *prev;
        }

        let span = self.config.fast_cutoff - self.config.dead_zone;
        let t = ((displacement - self.config.dead_zone) / span).clamp(0.0, 1.0);
        let alpha = self.config.alpha_min + t * (self.config.alpha_max - self.config.alpha_min);

        let mut out = [[0.0f32; 3]; LANDMARK_COUNT];
        for i in 0..LANDMARK_COUNT {
            for c in 0..3 {
                out[i][c] = lerp(prev[i][c], new[i][c], alpha);
            }
        }
        out
    }

    /// Most recent smoothed frame, if any.
    pub fn latest(&self) -> Option<&SmoothedFrame> {
        self.history.back()
    }

    /// Drop history so the next frame cold-starts (hand loss).  Sequence
    /// numbers keep increasing across resets.
    pub fn reset(&mut self) {
        self.history.clear();
    }
}

/// Mean per-landmark displacement between two frames.
fn mean_displacement(
    a: &[[f32; 3]; LANDMARK_COUNT],
    b: &[[f32; 3]; LANDMARK_COUNT],
) -> f32 {
    let mut sum = 0.0;
    for i in 0..LANDMARK_COUNT {
        sum += distance(a[i], b[i]);
    }
    sum / LANDMARK_COUNT as f32
}

/// Linear interpolation helper.
fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

// ── Tests ──────────────────────────────────────────────────

#[cfg(test)]
fn uniform_frame(x: f32, y: f32) -> HandFrame {
    HandFrame::new([[x, y, 0.0]; LANDMARK_COUNT])
}
