//! User-recorded gesture templates and matching.
//!
//! A template is a named, normalized landmark snapshot with its own match
//! threshold.  The registry is copy-on-write: mutations swap in a freshly
//! built list, so a reader holding the previous snapshot for the duration
//! of a tick never observes a half-applied change.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::landmarks::{distance, NormalizedFrame, LANDMARK_COUNT};

// ── Template types ─────────────────────────────────────────

/// A recorded gesture: normalized landmarks plus the mean-distance
/// threshold under which a live frame counts as a match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GestureTemplate {
    pub name: String,
    pub points: [[f32; 3]; LANDMARK_COUNT],
    pub threshold: f32,
}

impl GestureTemplate {
    pub fn new(name: impl Into<String>, frame: &NormalizedFrame, threshold: f32) -> Self {
        Self {
            name: name.into(),
            points: frame.points,
            threshold,
        }
    }
}

/// A successful template match for one tick.
#[derive(Debug, Clone, PartialEq)]
pub struct TemplateMatch {
    pub name: String,
    pub distance: f32,
}

// ── Registry ───────────────────────────────────────────────

/// Copy-on-write template store.  Single writer; readers clone the inner
/// `Arc` and keep a consistent view for as long as they hold it.
#[derive(Debug, Clone, Default)]
pub struct TemplateRegistry {
    templates: Arc<Vec<GestureTemplate>>,
}

impl TemplateRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a template.  Re-adding an identical template (same name,
    /// points and threshold) is a no-op; a name collision with different
    /// content is a conflict and leaves the registry untouched.
    pub fn add(&mut self, template: GestureTemplate) -> Result<()> {
        if let Some(existing) = self.templates.iter().find(|t| t.name == template.name) {
            if *existing == template {
                debug!("template '{}' re-added unchanged", template.name);
                return Ok(());
            }
            return Err(Error::DuplicateTemplate(template.name));
        }

        let mut next = self.templates.as_ref().clone();
        info!("template '{}' registered (threshold {})", template.name, template.threshold);
        next.push(template);
        self.templates = Arc::new(next);
        Ok(())
    }

    /// Remove a template by name.  Returns true if one was removed.
    pub fn remove(&mut self, name: &str) -> bool {
        if !self.templates.iter().any(|t| t.name == name) {
            return false;
        }
        let mut next = self.templates.as_ref().clone();
        next.retain(|t| t.name != name);
        self.templates = Arc::new(next);
        info!("template '{}' removed", name);
        true
    }

    /// Consistent view of the registry for one tick.
    pub fn snapshot(&self) -> Arc<Vec<GestureTemplate>> {
        Arc::clone(&self.templates)
    }

    /// Best match for a live frame: smallest mean per-landmark distance,
    /// accepted only under that template's own threshold.
    pub fn best_match(&self, frame: &NormalizedFrame) -> Option<TemplateMatch> {
        let mut best: Option<(&GestureTemplate, f32)> = None;
        for template in self.templates.iter() {
            let d = mean_distance(&template.points, &frame.points);
            if best.map_or(true, |(_, bd)| d < bd) {
                best = Some((template, d));
            }
        }

        let (template, d) = best?;
        if d < template.threshold {
            Some(TemplateMatch {
                name: template.name.clone(),
                distance: d,
            })
        } else {
            None
        }
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

/// Mean per-landmark Euclidean distance between two normalized sets.
fn mean_distance(
    a: &[[f32; 3]; LANDMARK_COUNT],
    b: &[[f32; 3]; LANDMARK_COUNT],
) -> f32 {
    let mut sum = 0.0;
    for i in 0..LANDMARK_COUNT {
        sum += distance(a[i], b[i]);
    }
    sum / LANDMARK_COUNT as f32
}

// ── Tests ──────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn frame_at(offset: f32) -> NormalizedFrame {
        let mut points = [[0.0f32; 3]; LANDMARK_COUNT];
        for (i, p) in points.iter_mut().enumerate() {
            *p = [offset + i as f32 * 0.05, -(i as f32) * 0.04, 0.0];
        }
        NormalizedFrame { points }
    }

    #[test]
    fn test_add_and_match() {
        let mut registry = TemplateRegistry::new();
        registry
            .add(GestureTemplate::new("mute", &frame_at(0.0), 0.05))
            .unwrap();

        let hit = registry.best_match(&frame_at(0.0)).expect("exact frame matches");
        assert_eq!(hit.name, "mute");
        assert!(hit.distance < 1e-6);
    }

    #[test]
    fn test_threshold_rejects_distant_frame() {
        let mut registry = TemplateRegistry::new();
        registry
            .add(GestureTemplate::new("mute", &frame_at(0.0), 0.05))
            .unwrap();

        // Every landmark shifted by 0.2: mean distance 0.2 >> threshold.
        assert!(registry.best_match(&frame_at(0.2)).is_none());
    }

    #[test]
    fn test_nearest_template_wins() {
        let mut registry = TemplateRegistry::new();
        registry
            .add(GestureTemplate::new("near", &frame_at(0.0), 0.5))
            .unwrap();
        registry
            .add(GestureTemplate::new("far", &frame_at(0.4), 0.5))
            .unwrap();

        let hit = registry.best_match(&frame_at(0.05)).unwrap();
        assert_eq!(hit.name, "near", "closest template must win");
    }

    #[test]
    fn test_idempotent_re_add() {
        let mut registry = TemplateRegistry::new();
        let template = GestureTemplate::new("mute", &frame_at(0.0), 0.05);
        registry.add(template.clone()).unwrap();
        registry.add(template).expect("identical re-add is a no-op");
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_conflicting_duplicate_rejected() {
        let mut registry = TemplateRegistry::new();
        registry
            .add(GestureTemplate::new("mute", &frame_at(0.0), 0.05))
            .unwrap();

        let err = registry
            .add(GestureTemplate::new("mute", &frame_at(0.3), 0.05))
            .unwrap_err();
        assert!(
            matches!(err, Error::DuplicateTemplate(ref name) if name == "mute"),
            "expected a duplicate-template conflict, got {:?}",
            err
        );
        // The earlier template survives the failed add.
        assert!(registry.best_match(&frame_at(0.0)).is_some());
    }

    #[test]
    fn test_remove() {
        let mut registry = TemplateRegistry::new();
        registry
            .add(GestureTemplate::new("mute", &frame_at(0.0), 0.05))
            .unwrap();

        assert!(registry.remove("mute"));
        assert!(!registry.remove("mute"), "second removal finds nothing");
        assert!(registry.best_match(&frame_at(0.0)).is_none());
    }

    #[test]
    fn test_snapshot_survives_mutation() {
        let mut registry = TemplateRegistry::new();
        registry
            .add(GestureTemplate::new("mute", &frame_at(0.0), 0.05))
            .unwrap();

        let snapshot = registry.snapshot();
        registry.remove("mute");

        // The reader's view is the pre-mutation registry, never a torn one.
        assert_eq!(snapshot.len(), 1);
        assert!(registry.is_empty());
    }

    #[test]
    fn test_template_serde_roundtrip() {
        let template = GestureTemplate::new("mute", &frame_at(0.0), 0.05);
        let json = serde_json::to_string(&template).unwrap();
        let back: GestureTemplate = serde_json::from_str(&json).unwrap();
        assert_eq!(template, back);
    }
}
