//! Static pose classification from normalized landmark geometry.
//!
//! Finger state is decided by rotation-independent distance comparisons:
//! a finger is extended when its tip sits farther from the wrist than its
//! PIP joint by a margin; the thumb uses a lateral check against the index
//! base because its kinematics differ.  The resulting extension vector is
//! matched against hand-coded patterns, most-specific first.  A small
//! voting stabilizer confirms labels across consecutive frames before they
//! reach arbitration.

use std::collections::VecDeque;

use crate::config::{PoseConfig, VOTE_WINDOW};
use crate::landmarks::{distance, HandLandmark, NormalizedFrame};

// ── Pose labels ────────────────────────────────────────────

/// Recognized static poses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PoseLabel {
    ThumbsUp,
    ThumbsDown,
    OpenPalm,
    VSign,
    IndexUp,
    OkSign,
    Spiderman,
    Fist,
}

impl PoseLabel {
    /// String representation for profiles and logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ThumbsUp => "thumbs-up",
            Self::ThumbsDown => "thumbs-down",
            Self::OpenPalm => "open-palm",
            Self::VSign => "v-sign",
            Self::IndexUp => "index-up",
            Self::OkSign => "ok-sign",
            Self::Spiderman => "spiderman",
            Self::Fist => "fist",
        }
    }
}

/// A classified pose with its confidence in [0, 1].  Absence of a pose is
/// `None` at the call site, not a label.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PoseReading {
    pub label: PoseLabel,
    pub confidence: f32,
}

// ── Classification ─────────────────────────────────────────

/// Signed extension scores per digit, thumb first.  Positive and above
/// the digit's margin means extended.
#[derive(Debug, Clone, Copy)]
struct ExtensionScores {
    scores: [f32; 5],
}

fn extension_scores(frame: &NormalizedFrame) -> ExtensionScores {
    let wrist = frame.point(HandLandmark::Wrist);
    let index_mcp = frame.point(HandLandmark::IndexMcp);

    // Thumb: lateral distance of tip vs IP from the index base.  A curled
    // thumb wraps over the folded fingers, pulling the tip in toward the
    // index base; an extended thumb pushes it well past the IP.
    let thumb = distance(frame.point(HandLandmark::ThumbTip), index_mcp)
        - distance(frame.point(HandLandmark::ThumbIp), index_mcp);

    let mut scores = [thumb, 0.0, 0.0, 0.0, 0.0];
    for (i, (tip, pip)) in HandLandmark::finger_joints().iter().enumerate() {
        scores[i + 1] = distance(frame.point(*tip), wrist) - distance(frame.point(*pip), wrist);
    }
    ExtensionScores { scores }
}

impl ExtensionScores {
    fn margins(config: &PoseConfig) -> [f32; 5] {
        [
            config.thumb_margin,
            config.finger_margin,
            config.finger_margin,
            config.finger_margin,
            config.finger_margin,
        ]
    }

    fn extended(&self, config: &PoseConfig) -> [bool; 5] {
        let margins = Self::margins(config);
        let mut ext = [false; 5];
        for i in 0..5 {
            ext[i] = self.scores[i] > margins[i];
        }
        ext
    }

    /// Confidence of an exact extension-vector match: the weakest digit's
    /// margin surplus, scaled and clamped to [0, 1].  `None` when the
    /// vector does not match.
    fn pattern_confidence(&self, pattern: [bool; 5], config: &PoseConfig) -> Option<f32> {
        if self.extended(config) != pattern {
            return None;
        }
        let margins = Self::margins(config);
        let mut weakest = f32::INFINITY;
        for i in 0..5 {
            let surplus = if pattern[i] {
                self.scores[i] - margins[i]
            } else {
                margins[i] - self.scores[i]
            };
            weakest = weakest.min(surplus);
        }
        Some((weakest / config.confidence_scale).clamp(0.0, 1.0))
    }
}

/// Extension patterns in priority order: thumb, index, middle, ring, pinky.
/// Spiderman and the OK sign are handled separately ahead of these because
/// their geometry overlaps the generic patterns.
const PATTERNS: [(PoseLabel, [bool; 5]); 4] = [
    (PoseLabel::VSign, [false, true, true, false, false]),
    (PoseLabel::IndexUp, [false, true, false, false, false]),
    (PoseLabel::OpenPalm, [true, true, true, true, true]),
    (PoseLabel::Fist, [false, false, false, false, false]),
];

const SPIDERMAN_PATTERN: [bool; 5] = [true, true, false, false, true];
const THUMB_ONLY_PATTERN: [bool; 5] = [true, false, false, false, false];

/// Classify a single normalized frame.  Stateless: purely a function of
/// the frame and config.
pub fn classify(frame: &NormalizedFrame, config: &PoseConfig) -> Option<PoseReading> {
    let scores = extension_scores(frame);

    // Most specific first: thumb+index+pinky must not fall through to a
    // partial-extension label.
    if let Some(confidence) = scores.pattern_confidence(SPIDERMAN_PATTERN, config) {
        return Some(PoseReading {
            label: PoseLabel::Spiderman,
            confidence,
        });
    }

    // OK sign: thumb and index tips pinched, outer three fingers up.  The
    // pinch makes the thumb/index extension bits unreliable, so this is
    // checked on its own geometry before the exact-vector patterns.
    let pinch = distance(
        frame.point(HandLandmark::ThumbTip),
        frame.point(HandLandmark::IndexTip),
    );
    let ext = scores.extended(config);
    if pinch < config.ok_pinch_distance && ext[2] && ext[3] && ext[4] {
        let weakest = (config.ok_pinch_distance - pinch)
            .min(scores.scores[2] - config.finger_margin)
            .min(scores.scores[3] - config.finger_margin)
            .min(scores.scores[4] - config.finger_margin);
        return Some(PoseReading {
            label: PoseLabel::OkSign,
            confidence: (weakest / config.confidence_scale).clamp(0.0, 1.0),
        });
    }

    for (label, pattern) in PATTERNS {
        if let Some(confidence) = scores.pattern_confidence(pattern, config) {
            return Some(PoseReading { label, confidence });
        }
    }

    // Thumb-only extension splits into up/down by tip orientation.
    // Image y grows downward, so the tip above the IP means thumbs up.
    if let Some(confidence) = scores.pattern_confidence(THUMB_ONLY_PATTERN, config) {
        let tip_y = frame.point(HandLandmark::ThumbTip)[1];
        let ip_y = frame.point(HandLandmark::ThumbIp)[1];
        let label = if tip_y < ip_y {
            PoseLabel::ThumbsUp
        } else {
            PoseLabel::ThumbsDown
        };
        return Some(PoseReading { label, confidence });
    }

    None
}

// ── Confirmation voting ────────────────────────────────────

/// Confirms raw classifier readings across a short window before they are
/// allowed to fire: a label needs `confirmation_frames` votes within the
/// last `VOTE_WINDOW` ticks.  Filters one-frame misclassifications the
/// smoother lets through.
#[derive(Debug)]
pub struct PoseStabilizer {
    votes: VecDeque<Option<PoseReading>>,
    confirmation_frames: usize,
}

impl PoseStabilizer {
    pub fn new(confirmation_frames: usize) -> Self {
        Self {
            votes: VecDeque::with_capacity(VOTE_WINDOW),
            confirmation_frames,
        }
    }

    /// Record this tick's raw reading and return the confirmed pose, if
    /// any.  The confirmed confidence is the strongest vote for the
    /// winning label.
    pub fn push(&mut self, reading: Option<PoseReading>) -> Option<PoseReading> {
        if self.votes.len() >= VOTE_WINDOW {
            self.votes.pop_front();
        }
        self.votes.push_back(reading);

        let mut best: Option<PoseReading> = None;
        let mut best_count = 0usize;
        for vote in self.votes.iter().flatten() {
            let count = self
                .votes
                .iter()
                .flatten()
                .filter(|v| v.label == vote.label)
                .count();
            if count > best_count {
                best_count = count;
                let confidence = self
                    .votes
                    .iter()
                    .flatten()
                    .filter(|v| v.label == vote.label)
                    .map(|v| v.confidence)
                    .fold(0.0f32, f32::max);
                best = Some(PoseReading {
                    label: vote.label,
                    confidence,
                });
            }
        }

        if best_count >= self.confirmation_frames {
            best
        } else {
            None
        }
    }

    /// Drop all votes: called on hand loss and after a swipe fires, so a
    /// stale pose cannot be confirmed across an interruption.
    pub fn clear(&mut self) {
        self.votes.clear();
    }
}

// ── Test helpers ───────────────────────────────────────────


// ── Tests ──────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;

    fn config() -> PoseConfig {
        PoseConfig::default()
    }

    #[test]
    fn test_thumbs_up_detection() {
        let frame = posed_frame(true, false, false, false, false);
        let reading = classify(&frame, &config()).expect("pose expected");
        assert_eq!(reading.label, PoseLabel::ThumbsUp);
        assert!(
            reading.confidence > 0.8,
            "clear thumbs-up should be high confidence, got {}",
            reading.confidence
        );
    }

    #[test]
    fn test_thumbs_down_detection() {
        let frame = flipped(&posed_frame(true, false, false, false, false));
        let reading = classify(&frame, &config()).expect("pose expected");
        assert_eq!(reading.label, PoseLabel::ThumbsDown);
    }

    #[test]
    fn test_open_palm_and_fist() {
        let open = classify(&posed_frame(true, true, true, true, true), &config()).unwrap();
        assert_eq!(open.label, PoseLabel::OpenPalm);

        let fist = classify(&posed_frame(false, false, false, false, false), &config()).unwrap();
        assert_eq!(fist.label, PoseLabel::Fist);
        assert!(
            fist.confidence >= 0.5,
            "clean fist should clear the arbitration floor, got {}",
            fist.confidence
        );
    }

    #[test]
    fn test_v_sign_and_index_up() {
        let v = classify(&posed_frame(false, true, true, false, false), &config()).unwrap();
        assert_eq!(v.label, PoseLabel::VSign);

        let idx = classify(&posed_frame(false, true, false, false, false), &config()).unwrap();
        assert_eq!(idx.label, PoseLabel::IndexUp);
    }

    #[test]
    fn test_spiderman_takes_priority() {
        // Thumb+index+pinky is its own label, not a near-miss of anything
        // more general.
        let reading =
            classify(&posed_frame(true, true, false, false, true), &config()).unwrap();
        assert_eq!(reading.label, PoseLabel::Spiderman);
    }

    #[test]
    fn test_ok_sign_detection() {
        let mut frame = posed_frame(false, false, true, true, true);
        // Pinch the thumb and index tips together.
        frame.points[HandLandmark::IndexTip.index()] = [-0.6, -1.1, 0.0];
        frame.points[HandLandmark::ThumbTip.index()] = [-0.63, -1.12, 0.0];
        frame.points[HandLandmark::ThumbIp.index()] = [-0.7, -0.9, 0.0];

        let reading = classify(&frame, &config()).expect("pose expected");
        assert_eq!(reading.label, PoseLabel::OkSign);
    }

    #[test]
    fn test_scale_invariance() {
        // Classification runs on normalized frames; scaling the raw input
        // must not change the label.
        let raw = raw_frame(true, false, false, false, false);
        let mut scaled = raw.clone();
        for p in &mut scaled.points {
            p[0] *= 2.4;
            p[1] *= 2.4;
            p[2] *= 2.4;
        }

        let a = classify(&raw.normalize(1e-4).unwrap(), &config()).unwrap();
        let b = classify(&scaled.normalize(1e-4).unwrap(), &config()).unwrap();
        assert_eq!(a.label, b.label);
        assert!(
            (a.confidence - b.confidence).abs() < 1e-4,
            "confidence should survive rescaling: {} vs {}",
            a.confidence,
            b.confidence
        );
    }

    #[test]
    fn test_ambiguous_hand_yields_none() {
        // Ring finger alone matches no declared pattern.
        let frame = posed_frame(false, false, false, true, false);
        assert!(classify(&frame, &config()).is_none());
    }

    #[test]
    fn test_stabilizer_confirms_on_second_vote() {
        let mut stabilizer = PoseStabilizer::new(2);
        let reading = PoseReading {
            label: PoseLabel::ThumbsUp,
            confidence: 0.9,
        };

        assert!(stabilizer.push(Some(reading)).is_none(), "one vote is not enough");
        let confirmed = stabilizer.push(Some(reading)).expect("second vote confirms");
        assert_eq!(confirmed.label, PoseLabel::ThumbsUp);
        assert!(confirmed.confidence > 0.8);
    }

    #[test]
    fn test_stabilizer_ignores_flicker() {
        let mut stabilizer = PoseStabilizer::new(2);
        let up = PoseReading {
            label: PoseLabel::ThumbsUp,
            confidence: 0.9,
        };
        let fist = PoseReading {
            label: PoseLabel::Fist,
            confidence: 0.9,
        };

        assert!(stabilizer.push(Some(up)).is_none());
        assert!(stabilizer.push(Some(fist)).is_none());
        // Second fist vote confirms fist, not the stale thumbs-up.
        let confirmed = stabilizer.push(Some(fist)).unwrap();
        assert_eq!(confirmed.label, PoseLabel::Fist);
    }

    #[test]
    fn test_stabilizer_clear() {
        let mut stabilizer = PoseStabilizer::new(2);
        let up = PoseReading {
            label: PoseLabel::ThumbsUp,
            confidence: 0.9,
        };
        stabilizer.push(Some(up));
        stabilizer.clear();
        assert!(
            stabilizer.push(Some(up)).is_none(),
            "votes must not survive a clear"
        );
    }

    #[test]
    fn test_label_as_str() {
        assert_eq!(PoseLabel::ThumbsUp.as_str(), "thumbs-up");
        assert_eq!(PoseLabel::OkSign.as_str(), "ok-sign");
        assert_eq!(PoseLabel::Spiderman.as_str(), "spiderman");
    }
}
