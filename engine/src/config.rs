//! Engine configuration.
//!
//! One `EngineConfig` is supplied at pipeline construction and validated
//! there; invalid values refuse to start the pipeline.  Reloading means
//! rebuilding the pipeline with a new config.  Every section has tuned
//! defaults and de/serializes from the host's JSON config file.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Top-level engine configuration, one section per pipeline stage.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Hand presence and frame acceptance.
    pub tracking: TrackingConfig,
    /// Temporal smoothing.
    pub smoothing: SmoothingConfig,
    /// Static pose classification.
    pub pose: PoseConfig,
    /// Trajectory-based swipe detection.
    pub swipe: SwipeConfig,
    /// Custom template matching.
    pub template: TemplateConfig,
    /// Event arbitration and cooldown.
    pub arbiter: ArbiterConfig,
}

/// Hand presence and frame acceptance thresholds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackingConfig {
    /// Minimum palm width (image units) for a frame to count as a real
    /// hand.  Below this the frame is degenerate and the tick is skipped.
    pub min_palm_width: f32,
    /// Seconds without a detected hand before detector state is reset
    /// and recognition cold-starts on re-detection.
    pub hand_loss_timeout_s: f64,
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            min_palm_width: 0.01,
            hand_loss_timeout_s: 5.0,
        }
    }
}

/// Adaptive exponential smoothing parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SmoothingConfig {
    /// Mean per-landmark displacement (image units) below which the frame
    /// is treated as stationary and the previous output is held.
    pub dead_zone: f32,
    /// Blend weight of the new sample at the dead zone (slow motion —
    /// heavy smoothing).
    pub alpha_min: f32,
    /// Blend weight of the new sample at or above `fast_cutoff` (fast
    /// motion — near-direct tracking).
    pub alpha_max: f32,
    /// Displacement at which smoothing reaches `alpha_max`.
    pub fast_cutoff: f32,
}

impl Default for SmoothingConfig {
    fn default() -> Self {
        Self {
            dead_zone: 0.001,
            alpha_min: 0.2,
            alpha_max: 0.9,
            fast_cutoff: 0.1,
        }
    }
}

/// Static pose classifier thresholds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PoseConfig {
    /// Margin (palm-width units) by which a fingertip's wrist distance
    /// must exceed the PIP's wrist distance to count as extended.
    pub finger_margin: f32,
    /// Margin for the thumb's lateral check against the index base.
    pub thumb_margin: f32,
    /// Maximum thumb-tip-to-index-tip distance (palm-width units) for the
    /// OK sign's pinch.
    pub ok_pinch_distance: f32,
    /// Margin surplus that maps to full confidence; smaller surpluses
    /// scale linearly down to zero.
    pub confidence_scale: f32,
    /// Votes a label needs within the stabilizer window before it is
    /// confirmed.
    pub confirmation_frames: usize,
}

impl Default for PoseConfig {
    fn default() -> Self {
        Self {
            finger_margin: 0.05,
            thumb_margin: 0.04,
            ok_pinch_distance: 0.3,
            confidence_scale: 0.2,
            confirmation_frames: 2,
        }
    }
}

/// Swipe detection thresholds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SwipeConfig {
    /// Centroid samples per trajectory window.
    pub window: usize,
    /// Minimum net displacement (image units) along the dominant axis.
    pub min_distance: f32,
    /// Minimum implied velocity (image units per second).
    pub min_velocity: f32,
    /// Maximum mean-squared residual of the linear fits; wobblier windows
    /// are rejected as noise.
    pub max_residual: f32,
    /// Minimum window duration in seconds; shorter windows are timing
    /// glitches, not motion.
    pub min_duration_s: f64,
}

impl Default for SwipeConfig {
    fn default() -> Self {
        Self {
            window: 15,
            min_distance: 0.15,
            min_velocity: 0.5,
            max_residual: 0.004,
            min_duration_s: 0.05,
        }
    }
}

/// Custom template matching defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplateConfig {
    /// Match threshold (mean per-landmark distance, palm-width units)
    /// used when a recorded template does not carry its own.
    pub default_threshold: f32,
}

impl Default for TemplateConfig {
    fn default() -> Self {
        Self {
            default_threshold: 0.05,
        }
    }
}

/// Event arbitration parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ArbiterConfig {
    /// Seconds after a dispatched event during which all candidates are
    /// dropped.
    pub cooldown_s: f64,
    /// Minimum confirmed-pose confidence to enter arbitration.
    pub min_pose_confidence: f32,
}

impl Default for ArbiterConfig {
    fn default() -> Self {
        Self {
            cooldown_s: 0.4,
            min_pose_confidence: 0.5,
        }
    }
}

/// Stabilizer vote window; `confirmation_frames` may not exceed this.
pub const VOTE_WINDOW: usize = 5;

impl EngineConfig {
    /// Validate config values are within acceptable ranges.  Returns the
    /// first invalid field as a `Config` error; the pipeline refuses to
    /// start on any failure.
    pub fn validate(&self) -> Result<()> {
        if self.tracking.min_palm_width <= 0.0 {
            return Err(Error::Config(format!(
                "tracking.min_palm_width must be positive, got {}",
                self.tracking.min_palm_width
            )));
        }
        if self.tracking.hand_loss_timeout_s <= 0.0 {
            return Err(Error::Config(format!(
                "tracking.hand_loss_timeout_s must be positive, got {}",
                self.tracking.hand_loss_timeout_s
            )));
        }
        if self.smoothing.dead_zone < 0.0 {
            return Err(Error::Config(format!(
                "smoothing.dead_zone must be non-negative, got {}",
                self.smoothing.dead_zone
            )));
        }
        if self.smoothing.alpha_min <= 0.0
            || self.smoothing.alpha_max > 1.0
            || self.smoothing.alpha_min > self.smoothing.alpha_max
        {
            return Err(Error::Config(format!(
                "smoothing alphas must satisfy 0 < alpha_min <= alpha_max <= 1, got {} / {}",
                self.smoothing.alpha_min, self.smoothing.alpha_max
            )));
        }
        if self.smoothing.fast_cutoff <= self.smoothing.dead_zone {
            return Err(Error::Config(format!(
                "smoothing.fast_cutoff must exceed the dead zone, got {}",
                self.smoothing.fast_cutoff
            )));
        }
        if self.pose.finger_margin < 0.0 || self.pose.thumb_margin < 0.0 {
            return Err(Error::Config(
                "pose margins must be non-negative".to_string(),
            ));
        }
        if self.pose.ok_pinch_distance <= 0.0 {
            return Err(Error::Config(format!(
                "pose.ok_pinch_distance must be positive, got {}",
                self.pose.ok_pinch_distance
            )));
        }
        if self.pose.confidence_scale <= 0.0 {
            return Err(Error::Config(format!(
                "pose.confidence_scale must be positive, got {}",
                self.pose.confidence_scale
            )));
        }
        if self.pose.confirmation_frames == 0 || self.pose.confirmation_frames > VOTE_WINDOW {
            return Err(Error::Config(format!(
                "pose.confirmation_frames must be within 1..={}, got {}",
                VOTE_WINDOW, self.pose.confirmation_frames
            )));
        }
        if self.swipe.window < 2 {
            return Err(Error::Config(format!(
                "swipe.window needs at least 2 samples, got {}",
                self.swipe.window
            )));
        }
        if self.swipe.min_distance <= 0.0
            || self.swipe.min_velocity <= 0.0
            || self.swipe.max_residual <= 0.0
        {
            return Err(Error::Config(
                "swipe distance, velocity and residual thresholds must be positive".to_string(),
            ));
        }
        if self.swipe.min_duration_s <= 0.0 {
            return Err(Error::Config(format!(
                "swipe.min_duration_s must be positive, got {}",
                self.swipe.min_duration_s
            )));
        }
        if self.template.default_threshold <= 0.0 {
            return Err(Error::Config(format!(
                "template.default_threshold must be positive, got {}",
                self.template.default_threshold
            )));
        }
        if self.arbiter.cooldown_s < 0.0 {
            return Err(Error::Config(format!(
                "arbiter.cooldown_s must be non-negative, got {}",
                self.arbiter.cooldown_s
            )));
        }
        if !(0.0..=1.0).contains(&self.arbiter.min_pose_confidence) {
            return Err(Error::Config(format!(
                "arbiter.min_pose_confidence must be within [0, 1], got {}",
                self.arbiter.min_pose_confidence
            )));
        }
        Ok(())
    }
}
