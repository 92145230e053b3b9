//! The per-hand recognition pipeline.
//!
//! Wires the stages into one synchronous tick per camera frame:
//! degenerate gate → smoothing → {pose, swipe, template} → arbitration →
//! profile resolution.  All cross-tick state (smoother history, trajectory
//! window, template registry, cooldown, active profile) lives here, so a
//! host can run one pipeline per tracked hand without interference.

use tracing::{debug, info};

use crate::arbiter::{Arbiter, Gesture, TickCandidates};
use crate::config::EngineConfig;
use crate::error::{Error, Result};
use crate::landmarks::{centroid, HandFrame, NormalizedFrame};
use crate::pose::{self, PoseStabilizer};
use crate::profile::{ProfileSet, DEFAULT_CONTEXT};
use crate::smoother::Smoother;
use crate::swipe::TrajectoryEngine;
use crate::template::{GestureTemplate, TemplateRegistry};

// ── Pipeline IO ────────────────────────────────────────────

/// One tick's worth of input from the frame-acquisition collaborator.
#[derive(Debug, Clone)]
pub struct FrameInput {
    /// Monotonic capture timestamp, seconds.
    pub timestamp_s: f64,
    /// The detected hand, or `None` when no hand is present this frame.
    pub hand: Option<HandFrame>,
}

/// A resolved action, ready for the input-dispatch collaborator.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionEvent {
    pub action: String,
    pub gesture: Gesture,
    pub timestamp_s: f64,
}

// ── Pipeline ───────────────────────────────────────────────

/// Recognition pipeline for a single tracked hand.
pub struct Pipeline {
    config: EngineConfig,
    smoother: Smoother,
    stabilizer: PoseStabilizer,
    trajectory: TrajectoryEngine,
    templates: TemplateRegistry,
    profiles: ProfileSet,
    arbiter: Arbiter,
    context: String,
    last_seen_s: Option<f64>,
}

impl Pipeline {
    /// Build a pipeline from a validated configuration.  Invalid values
    /// refuse to start (`Error::Config`).
    pub fn new(config: EngineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            smoother: Smoother::new(config.smoothing.clone()),
            stabilizer: PoseStabilizer::new(config.pose.confirmation_frames),
            trajectory: TrajectoryEngine::new(config.swipe.clone()),
            templates: TemplateRegistry::new(),
            profiles: ProfileSet::new(),
            arbiter: Arbiter::new(config.arbiter.clone()),
            context: DEFAULT_CONTEXT.to_string(),
            last_seen_s: None,
            config,
        })
    }

    /// Process one camera frame.  At most one action per tick; absence of
    /// a gesture is the normal case, not an error.
    pub fn tick(&mut self, input: &FrameInput) -> Option<ActionEvent> {
        let now = input.timestamp_s;
        let Some(frame) = &input.hand else {
            self.note_absence(now);
            return None;
        };

        // Degenerate frames are detector noise: skip the tick entirely
        // rather than propagate a near-zero scale downstream.
        let width = frame.palm_width();
        if width < self.config.tracking.min_palm_width {
            debug!("degenerate frame skipped (palm width {:.4})", width);
            return None;
        }
        self.last_seen_s = Some(now);

        let smoothed = self.smoother.push(frame, now);
        let normalized =
            NormalizedFrame::from_points(&smoothed.points, self.config.tracking.min_palm_width)?;

        let swipe = self.trajectory.push(centroid(&smoothed.points), now);
        let pose = if swipe.is_some() {
            // A swipe interrupts any static pose being confirmed; stale
            // votes must not fire right after the motion ends.
            self.stabilizer.clear();
            None
        } else {
            let raw = pose::classify(&normalized, &self.config.pose);
            self.stabilizer.push(raw)
        };
        let template = self.templates.best_match(&normalized);

        let event = self.arbiter.arbitrate(
            TickCandidates {
                pose,
                swipe,
                template,
            },
            now,
        )?;

        let action = self.profiles.resolve(&self.context, &event.gesture)?.to_string();
        info!(
            "action '{}' ({} in context '{}')",
            action,
            event.gesture.name(),
            self.context
        );
        Some(ActionEvent {
            action,
            gesture: event.gesture,
            timestamp_s: now,
        })
    }

    fn note_absence(&mut self, now: f64) {
        if let Some(last) = self.last_seen_s {
            let absent = now - last;
            if absent >= self.config.tracking.hand_loss_timeout_s {
                debug!("hand absent for {:.1}s: resetting detector state", absent);
                self.reset_detectors();
                self.last_seen_s = None;
            }
        }
    }

    /// Drop all per-hand detector state; the next frame cold-starts.
    /// Templates, profiles and the cooldown survive.
    pub fn reset_detectors(&mut self) {
        self.smoother.reset();
        self.stabilizer.clear();
        self.trajectory.reset();
    }

    // ── Control surface ────────────────────────────────────

    /// Adopt the most recent application-context tag.
    pub fn set_context(&mut self, tag: impl Into<String>) {
        self.context = tag.into();
    }

    pub fn context(&self) -> &str {
        &self.context
    }

    /// Swap the profile set atomically between ticks.
    pub fn set_profiles(&mut self, profiles: ProfileSet) {
        self.profiles = profiles;
    }

    /// Record a template from a raw landmark snapshot, normalizing it the
    /// same way live frames are.  `None` threshold uses the configured
    /// default.
    pub fn record_template(
        &mut self,
        name: impl Into<String>,
        frame: &HandFrame,
        threshold: Option<f32>,
    ) -> Result<()> {
        let name = name.into();
        let normalized = frame
            .normalize(self.config.tracking.min_palm_width)
            .ok_or_else(|| Error::DegenerateTemplate(name.clone()))?;
        let threshold = threshold.unwrap_or(self.config.template.default_threshold);
        self.templates
            .add(GestureTemplate::new(name, &normalized, threshold))
    }

    /// Insert an already-normalized template (loaded from a file).
    pub fn insert_template(&mut self, template: GestureTemplate) -> Result<()> {
        self.templates.add(template)
    }

    /// Remove a template by name.  Returns true if one was removed.
    pub fn remove_template(&mut self, name: &str) -> bool {
        self.templates.remove(name)
    }

    pub fn templates(&self) -> &TemplateRegistry {
        &self.templates
    }
}

// ── Tests ──────────────────────────────────────────────────
