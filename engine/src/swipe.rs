//! Trajectory-based swipe detection.
//!
//! Keeps a rolling window of hand-centroid positions, fits least-squares
//! lines to x-over-time and y-over-time, and rejects wobbly windows by
//! their fit residual: a deliberate swipe is straight, an erratic hand is
//! not.  Firing clears the window so one continuous motion cannot produce
//! a second event.

use std::collections::VecDeque;

use tracing::debug;

use crate::config::SwipeConfig;

// ── Swipe types ────────────────────────────────────────────

/// Direction of a detected swipe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SwipeDirection {
    Left,
    Right,
    Up,
    Down,
}

impl SwipeDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Right => "right",
            Self::Up => "up",
            Self::Down => "down",
        }
    }
}

/// A completed swipe over one trajectory window.
#[derive(Debug, Clone, PartialEq)]
pub struct SwipeEvent {
    pub direction: SwipeDirection,
    /// Net displacement along the dominant axis, image units.
    pub magnitude: f32,
    /// Worst mean-squared residual of the two linear fits.
    pub residual: f32,
}

// ── Trajectory engine ──────────────────────────────────────

#[derive(Debug, Clone, Copy)]
struct CentroidSample {
    t: f64,
    x: f32,
    y: f32,
}

/// Rolling-window swipe detector for one tracked hand.
#[derive(Debug)]
pub struct TrajectoryEngine {
    config: SwipeConfig,
    buffer: VecDeque<CentroidSample>,
}

impl TrajectoryEngine {
    pub fn new(config: SwipeConfig) -> Self {
        let capacity = config.window;
        Self {
            config,
            buffer: VecDeque::with_capacity(capacity),
        }
    }

    /// Append this tick's centroid.  Returns a swipe once the window is
    /// full and passes every gate; an under-filled window is never an
    /// error, just no event.
    pub fn push(&mut self, centroid: (f32, f32), timestamp_s: f64) -> Option<SwipeEvent> {
        if self.buffer.len() >= self.config.window {
            self.buffer.pop_front();
        }
        self.buffer.push_back(CentroidSample {
            t: timestamp_s,
            x: centroid.0,
            y: centroid.1,
        });

        if self.buffer.len() < self.config.window {
            return None;
        }

        let event = self.analyze()?;
        // A fired window is consumed: the next swipe needs a fully fresh
        // buffer, so one long motion cannot double-fire.
        self.buffer.clear();
        Some(event)
    }

    fn analyze(&self) -> Option<SwipeEvent> {
        let first = self.buffer.front()?;
        let last = self.buffer.back()?;

        let duration = last.t - first.t;
        if duration < self.config.min_duration_s {
            return None;
        }

        let dx = last.x - first.x;
        let dy = last.y - first.y;
        let horizontal = dx.abs() >= dy.abs();
        let net = if horizontal { dx } else { dy };

        if net.abs() < self.config.min_distance {
            return None;
        }
        let velocity = net.abs() / duration as f32;
        if velocity < self.config.min_velocity {
            debug!(
                "swipe rejected: velocity {:.2} below {:.2}",
                velocity, self.config.min_velocity
            );
            return None;
        }

        // Straightness gate: both coordinates must track a line over time.
        let ts: Vec<f64> = self.buffer.iter().map(|s| s.t - first.t).collect();
        let xs: Vec<f64> = self.buffer.iter().map(|s| s.x as f64).collect();
        let ys: Vec<f64> = self.buffer.iter().map(|s| s.y as f64).collect();
        let x_residual = fit_residual(&ts, &xs)?;
        let y_residual = fit_residual(&ts, &ys)?;
        let residual = x_residual.max(y_residual) as f32;

        if residual > self.config.max_residual {
            debug!(
                "swipe rejected: residual {:.5} above {:.5}",
                residual, self.config.max_residual
            );
            return None;
        }

        let direction = if horizontal {
            if dx > 0.0 {
                SwipeDirection::Right
            } else {
                SwipeDirection::Left
            }
        } else if dy > 0.0 {
            SwipeDirection::Down
        } else {
            SwipeDirection::Up
        };

        debug!(
            "swipe detected: {} magnitude {:.2} residual {:.5}",
            direction.as_str(),
            net.abs(),
            residual
        );
        Some(SwipeEvent {
            direction,
            magnitude: net.abs(),
            residual,
        })
    }

    /// Samples currently buffered.
    pub fn fill(&self) -> usize {
        self.buffer.len()
    }

    /// Drop the window (hand loss).
    pub fn reset(&mut self) {
        self.buffer.clear();
    }
}

/// Mean-squared residual of the least-squares line v = a*t + b.
/// `None` when the time samples carry no spread to fit against.
fn fit_residual(ts: &[f64], vs: &[f64]) -> Option<f64> {
    let n = ts.len() as f64;
    let t_mean = ts.iter().sum::<f64>() / n;
    let v_mean = vs.iter().sum::<f64>() / n;

    let mut cov = 0.0;
    let mut var_t = 0.0;
    for (t, v) in ts.iter().zip(vs.iter()) {
        cov += (t - t_mean) * (v - v_mean);
        var_t += (t - t_mean) * (t - t_mean);
    }
    if var_t < 1e-12 {
        return None;
    }

    let slope = cov / var_t;
    let intercept = v_mean - slope * t_mean;

    let mse = ts
        .iter()
        .zip(vs.iter())
        .map(|(t, v)| {
            let err = v - (slope * t + intercept);
            err * err
        })
        .sum::<f64>()
        / n;
    Some(mse)
}

// ── Tests ──────────────────────────────────────────────────
