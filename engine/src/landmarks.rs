//! Hand landmark definitions and coordinate normalization.
//!
//! Models the 21 hand landmarks produced by the external detector
//! (wrist plus four joints per finger) and provides the wrist-centered,
//! palm-width-scaled frame that the shape detectors consume.

use serde::{Deserialize, Serialize};

// ── Landmark definitions ───────────────────────────────────

/// The 21 hand landmarks, in detector output order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandLandmark {
    Wrist,
    ThumbCmc,
    ThumbMcp,
    ThumbIp,
    ThumbTip,
    IndexMcp,
    IndexPip,
    IndexDip,
    IndexTip,
    MiddleMcp,
    MiddlePip,
    MiddleDip,
    MiddleTip,
    RingMcp,
    RingPip,
    RingDip,
    RingTip,
    PinkyMcp,
    PinkyPip,
    PinkyDip,
    PinkyTip,
}

/// Total number of landmarks per hand.
pub const LANDMARK_COUNT: usize = 21;

impl HandLandmark {
    /// Convert landmark enum to array index (0-20).
    pub fn index(&self) -> usize {
        *self as usize
    }

    /// String representation for logs and recorded files.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Wrist => "wrist",
            Self::ThumbCmc => "thumb-cmc",
            Self::ThumbMcp => "thumb-mcp",
            Self::ThumbIp => "thumb-ip",
            Self::ThumbTip => "thumb-tip",
            Self::IndexMcp => "index-mcp",
            Self::IndexPip => "index-pip",
            Self::IndexDip => "index-dip",
            Self::IndexTip => "index-tip",
            Self::MiddleMcp => "middle-mcp",
            Self::MiddlePip => "middle-pip",
            Self::MiddleDip => "middle-dip",
            Self::MiddleTip => "middle-tip",
            Self::RingMcp => "ring-mcp",
            Self::RingPip => "ring-pip",
            Self::RingDip => "ring-dip",
            Self::RingTip => "ring-tip",
            Self::PinkyMcp => "pinky-mcp",
            Self::PinkyPip => "pinky-pip",
            Self::PinkyDip => "pinky-dip",
            Self::PinkyTip => "pinky-tip",
        }
    }

    /// The (tip, pip) landmark pairs for the four non-thumb fingers,
    /// in index/middle/ring/pinky order.
    pub fn finger_joints() -> [(HandLandmark, HandLandmark); 4] {
        [
            (Self::IndexTip, Self::IndexPip),
            (Self::MiddleTip, Self::MiddlePip),
            (Self::RingTip, Self::RingPip),
            (Self::PinkyTip, Self::PinkyPip),
        ]
    }
}

// ── Raw frame ──────────────────────────────────────────────

/// One detector output: 21 ordered (x, y, z) points in image-normalized
/// coordinates (x and y in [0, 1], z depth-relative).  Immutable once
/// constructed; the capture timestamp travels separately with the tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HandFrame {
    pub points: [[f32; 3]; LANDMARK_COUNT],
}

impl HandFrame {
    pub fn new(points: [[f32; 3]; LANDMARK_COUNT]) -> Self {
        Self { points }
    }

    /// Position of a single landmark.
    pub fn point(&self, landmark: HandLandmark) -> [f32; 3] {
        self.points[landmark.index()]
    }

    /// Palm width: distance between the index and pinky finger bases.
    /// Near-zero values indicate detector noise rather than a real hand.
    pub fn palm_width(&self) -> f32 {
        palm_width(&self.points)
    }

    /// Project into the hand-relative frame (wrist at the origin, palm
    /// width 1.0).  Returns `None` for degenerate input.
    pub fn normalize(&self, min_palm_width: f32) -> Option<NormalizedFrame> {
        NormalizedFrame::from_points(&self.points, min_palm_width)
    }
}

/// Palm width of a raw point set.
pub fn palm_width(points: &[[f32; 3]; LANDMARK_COUNT]) -> f32 {
    distance(
        points[HandLandmark::IndexMcp.index()],
        points[HandLandmark::PinkyMcp.index()],
    )
}

/// Euclidean distance between two landmark points.
pub fn distance(a: [f32; 3], b: [f32; 3]) -> f32 {
    let dx = b[0] - a[0];
    let dy = b[1] - a[1];
    let dz = b[2] - a[2];
    (dx * dx + dy * dy + dz * dz).sqrt()
}

/// Centroid (x, y) of a point set.  The z component is ignored: trajectory
/// analysis works in the image plane.
pub fn centroid(points: &[[f32; 3]; LANDMARK_COUNT]) -> (f32, f32) {
    let mut cx = 0.0;
    let mut cy = 0.0;
    for p in points {
        cx += p[0];
        cy += p[1];
    }
    let n = LANDMARK_COUNT as f32;
    (cx / n, cy / n)
}

// ── Normalized frame ───────────────────────────────────────

/// A landmark set in the hand-relative frame: wrist at the origin, palm
/// width scaled to 1.0.  Invariant to hand position and distance from the
/// camera, so pose and template thresholds hold at any range.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedFrame {
    pub points: [[f32; 3]; LANDMARK_COUNT],
}

impl NormalizedFrame {
    /// Translate and scale a raw point set into the hand-relative frame.
    /// Returns `None` when the palm width is below `min_palm_width` —
    /// the degenerate marker; callers skip the tick instead of dividing
    /// toward NaN.
    pub fn from_points(
        points: &[[f32; 3]; LANDMARK_COUNT],
        min_palm_width: f32,
    ) -> Option<NormalizedFrame> {
        let width = palm_width(points);
        if !width.is_finite() || width < min_palm_width {
            return None;
        }

        let wrist = points[HandLandmark::Wrist.index()];
        let mut normalized = [[0.0f32; 3]; LANDMARK_COUNT];
        for (out, p) in normalized.iter_mut().zip(points.iter()) {
            *out = [
                (p[0] - wrist[0]) / width,
                (p[1] - wrist[1]) / width,
                (p[2] - wrist[2]) / width,
            ];
        }
        Some(NormalizedFrame { points: normalized })
    }

    /// Position of a single landmark.
    pub fn point(&self, landmark: HandLandmark) -> [f32; 3] {
        self.points[landmark.index()]
    }
}

// ── Tests ──────────────────────────────────────────────────

#[cfg(test)]
fn spread_points() -> [[f32; 3]; LANDMARK_COUNT] {
    // An arbitrary non-degenerate point set with a known palm width.
    let mut points = [[0.0f32; 3]; LANDMARK_COUNT];
    for (i, p) in points.iter_mut().enumerate() {
        *p = [0.4 + i as f32 * 0.01, 0.6 - i as f32 * 0.005, i as f32 * 0.002];
    }
    points
}
