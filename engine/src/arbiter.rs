//! Event arbitration — one decision per tick.
//!
//! Merges the per-tick detector outputs into at most one event, by fixed
//! priority: swipes beat custom templates (fast motion is time-critical),
//! custom templates beat built-in poses (user intent overrides defaults).
//! A cooldown state machine then rate-limits dispatch: candidates arriving
//! while cooling are dropped, never queued.

use tracing::debug;

use crate::config::ArbiterConfig;
use crate::pose::{PoseLabel, PoseReading};
use crate::swipe::{SwipeDirection, SwipeEvent};
use crate::template::TemplateMatch;

// ── Gesture identity ───────────────────────────────────────

/// The winning gesture of a tick — the key profiles are looked up by.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Gesture {
    Pose(PoseLabel),
    Swipe(SwipeDirection),
    Custom(String),
}

impl Gesture {
    /// Canonical name, as used in profile bindings and logs.
    pub fn name(&self) -> &str {
        match self {
            Self::Pose(label) => label.as_str(),
            Self::Swipe(SwipeDirection::Left) => "swipe-left",
            Self::Swipe(SwipeDirection::Right) => "swipe-right",
            Self::Swipe(SwipeDirection::Up) => "swipe-up",
            Self::Swipe(SwipeDirection::Down) => "swipe-down",
            Self::Custom(name) => name,
        }
    }
}

/// The single arbitrated winner for a tick.
#[derive(Debug, Clone, PartialEq)]
pub struct ArbitratedEvent {
    pub gesture: Gesture,
    pub timestamp_s: f64,
}

/// Detector outputs gathered for one tick.
#[derive(Debug, Clone, Default)]
pub struct TickCandidates {
    pub pose: Option<PoseReading>,
    pub swipe: Option<SwipeEvent>,
    pub template: Option<TemplateMatch>,
}

// ── Cooldown state machine ─────────────────────────────────

/// Arbitration state: ready to fire, or cooling after a dispatch.  The
/// only transition out of `Cooling` is the timeout.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ArbiterState {
    Idle,
    Cooling { until_s: f64 },
}

/// Per-hand arbitrator.
#[derive(Debug)]
pub struct Arbiter {
    config: ArbiterConfig,
    state: ArbiterState,
}

impl Arbiter {
    pub fn new(config: ArbiterConfig) -> Self {
        Self {
            config,
            state: ArbiterState::Idle,
        }
    }

    /// Merge this tick's candidates into at most one event.  Dispatching
    /// starts the cooldown; during cooldown every candidate is dropped.
    pub fn arbitrate(
        &mut self,
        candidates: TickCandidates,
        now_s: f64,
    ) -> Option<ArbitratedEvent> {
        if let ArbiterState::Cooling { until_s } = self.state {
            if now_s < until_s {
                if candidates.swipe.is_some()
                    || candidates.template.is_some()
                    || candidates.pose.is_some()
                {
                    debug!("candidate dropped: cooling for {:.2}s more", until_s - now_s);
                }
                return None;
            }
            self.state = ArbiterState::Idle;
        }

        let gesture = self.pick(candidates)?;
        self.state = ArbiterState::Cooling {
            until_s: now_s + self.config.cooldown_s,
        };
        Some(ArbitratedEvent {
            gesture,
            timestamp_s: now_s,
        })
    }

    /// Priority selection: swipe, then custom template, then static pose
    /// above the confidence floor.
    fn pick(&self, candidates: TickCandidates) -> Option<Gesture> {
        if let Some(swipe) = candidates.swipe {
            return Some(Gesture::Swipe(swipe.direction));
        }
        if let Some(template) = candidates.template {
            return Some(Gesture::Custom(template.name));
        }
        let pose = candidates.pose?;
        if pose.confidence < self.config.min_pose_confidence {
            return None;
        }
        Some(Gesture::Pose(pose.label))
    }

    pub fn state(&self) -> ArbiterState {
        self.state
    }
}

// ── Tests ──────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn pose(label: PoseLabel, confidence: f32) -> Option<PoseReading> {
        Some(PoseReading { label, confidence })
    }

    fn swipe(direction: SwipeDirection) -> Option<SwipeEvent> {
        Some(SwipeEvent {
            direction,
            magnitude: 0.5,
            residual: 0.001,
        })
    }

    fn template(name: &str) -> Option<TemplateMatch> {
        Some(TemplateMatch {
            name: name.to_string(),
            distance: 0.02,
        })
    }

    #[test]
    fn test_swipe_beats_pose_and_template() {
        let mut arbiter = Arbiter::new(ArbiterConfig::default());
        let event = arbiter
            .arbitrate(
                TickCandidates {
                    pose: pose(PoseLabel::ThumbsUp, 0.95),
                    swipe: swipe(SwipeDirection::Right),
                    template: template("mute"),
                },
                1.0,
            )
            .expect("swipe should win");
        assert_eq!(event.gesture, Gesture::Swipe(SwipeDirection::Right));
    }

    #[test]
    fn test_template_beats_pose() {
        let mut arbiter = Arbiter::new(ArbiterConfig::default());
        let event = arbiter
            .arbitrate(
                TickCandidates {
                    pose: pose(PoseLabel::Fist, 0.95),
                    swipe: None,
                    template: template("mute"),
                },
                1.0,
            )
            .unwrap();
        assert_eq!(event.gesture, Gesture::Custom("mute".to_string()));
    }

    #[test]
    fn test_low_confidence_pose_filtered() {
        let mut arbiter = Arbiter::new(ArbiterConfig::default());
        let event = arbiter.arbitrate(
            TickCandidates {
                pose: pose(PoseLabel::ThumbsUp, 0.2),
                ..Default::default()
            },
            1.0,
        );
        assert!(event.is_none(), "weak pose must not fire, got {:?}", event);
        assert_eq!(
            arbiter.state(),
            ArbiterState::Idle,
            "a filtered candidate must not start the cooldown"
        );
    }

    #[test]
    fn test_cooldown_drops_candidates() {
        let mut arbiter = Arbiter::new(ArbiterConfig::default());
        let first = arbiter.arbitrate(
            TickCandidates {
                pose: pose(PoseLabel::ThumbsUp, 0.95),
                ..Default::default()
            },
            1.0,
        );
        assert!(first.is_some());

        // 0.1s later, same pose: cooldown (0.4s) is still running.
        let second = arbiter.arbitrate(
            TickCandidates {
                pose: pose(PoseLabel::ThumbsUp, 0.95),
                ..Default::default()
            },
            1.1,
        );
        assert!(second.is_none(), "candidate inside the cooldown must be dropped");

        // Dropped candidates are not queued: an empty tick after the
        // cooldown produces nothing either.
        let third = arbiter.arbitrate(TickCandidates::default(), 1.6);
        assert!(third.is_none());
    }

    #[test]
    fn test_cooldown_expires() {
        let mut arbiter = Arbiter::new(ArbiterConfig::default());
        arbiter
            .arbitrate(
                TickCandidates {
                    swipe: swipe(SwipeDirection::Left),
                    ..Default::default()
                },
                1.0,
            )
            .unwrap();

        let event = arbiter
            .arbitrate(
                TickCandidates {
                    swipe: swipe(SwipeDirection::Right),
                    ..Default::default()
                },
                1.45,
            )
            .expect("cooldown elapsed, next candidate fires");
        assert_eq!(event.gesture, Gesture::Swipe(SwipeDirection::Right));
    }

    #[test]
    fn test_cooldown_invariant_over_stream() {
        // Fire candidates every 50ms for 2 seconds; consecutive dispatches
        // must never be closer than the cooldown.
        let config = ArbiterConfig::default();
        let cooldown = config.cooldown_s;
        let mut arbiter = Arbiter::new(config);

        let mut fired = Vec::new();
        for i in 0..40 {
            let now = i as f64 * 0.05;
            if let Some(event) = arbiter.arbitrate(
                TickCandidates {
                    pose: pose(PoseLabel::OpenPalm, 0.9),
                    ..Default::default()
                },
                now,
            ) {
                fired.push(event.timestamp_s);
            }
        }

        assert!(!fired.is_empty());
        for pair in fired.windows(2) {
            assert!(
                pair[1] - pair[0] >= cooldown,
                "two dispatches {}s apart violate the {}s cooldown",
                pair[1] - pair[0],
                cooldown
            );
        }
    }

    #[test]
    fn test_gesture_names() {
        assert_eq!(Gesture::Pose(PoseLabel::ThumbsUp).name(), "thumbs-up");
        assert_eq!(Gesture::Swipe(SwipeDirection::Left).name(), "swipe-left");
        assert_eq!(Gesture::Custom("mute".to_string()).name(), "mute");
    }
}
