//! Profiles — context-specific gesture-to-action mappings.
//!
//! A profile maps gesture names to action identifiers; a profile set keys
//! profiles by an application-context tag with a `"default"` fallback.
//! Context rules map externally supplied window metadata (title, process,
//! class) onto a context tag; the OS query itself lives outside the
//! engine.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::arbiter::Gesture;

/// Context tag used when nothing more specific applies.
pub const DEFAULT_CONTEXT: &str = "default";

// ── Profile ────────────────────────────────────────────────

/// Gesture-name → action-identifier bindings for one context.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Profile {
    bindings: HashMap<String, String>,
}

impl Profile {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a gesture name to an action, replacing any previous binding.
    pub fn bind(&mut self, gesture: impl Into<String>, action: impl Into<String>) {
        self.bindings.insert(gesture.into(), action.into());
    }

    /// Action bound to a gesture, if any.  Unmapped gestures are a silent
    /// no-op by design — a user may leave them unbound in this context.
    pub fn action_for(&self, gesture: &Gesture) -> Option<&str> {
        self.bindings.get(gesture.name()).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

// ── Profile set ────────────────────────────────────────────

/// All profiles, keyed by context tag.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProfileSet {
    profiles: HashMap<String, Profile>,
}

impl ProfileSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// The stock mapping shipped when the host provides no profile file:
    /// horizontal swipes page through slides in any context.
    pub fn with_default_bindings() -> Self {
        let mut default = Profile::new();
        default.bind("swipe-right", "right");
        default.bind("swipe-left", "left");

        let mut set = Self::new();
        set.insert(DEFAULT_CONTEXT, default);
        set
    }

    pub fn insert(&mut self, context: impl Into<String>, profile: Profile) {
        self.profiles.insert(context.into(), profile);
    }

    /// Resolve a gesture under a context tag.  An unknown tag falls back
    /// to the default profile; an unmapped gesture resolves to nothing.
    pub fn resolve(&self, context: &str, gesture: &Gesture) -> Option<&str> {
        let profile = self
            .profiles
            .get(context)
            .or_else(|| self.profiles.get(DEFAULT_CONTEXT))?;
        profile.action_for(gesture)
    }

    pub fn contexts(&self) -> impl Iterator<Item = &str> {
        self.profiles.keys().map(String::as_str)
    }
}

// ── Context rules ──────────────────────────────────────────

/// Active-window metadata supplied by the host.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowInfo {
    pub title: String,
    pub process: String,
    pub class: String,
}

/// One matching rule: the first rule whose present fields all match the
/// window selects the context.  Title matches by case-insensitive
/// substring; process and class match exactly, ignoring case.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContextRule {
    pub context: String,
    pub title: Option<String>,
    pub process: Option<String>,
    pub class: Option<String>,
}

impl ContextRule {
    fn matches(&self, window: &WindowInfo) -> bool {
        if let Some(title) = &self.title {
            if !window.title.to_lowercase().contains(&title.to_lowercase()) {
                return false;
            }
        }
        if let Some(process) = &self.process {
            if !window.process.eq_ignore_ascii_case(process) {
                return false;
            }
        }
        if let Some(class) = &self.class {
            if !window.class.eq_ignore_ascii_case(class) {
                return false;
            }
        }
        true
    }
}

/// Resolve window metadata to a context tag.  Rules are checked in order;
/// no match yields the default context.
pub fn resolve_context<'a>(rules: &'a [ContextRule], window: &WindowInfo) -> &'a str {
    rules
        .iter()
        .find(|rule| rule.matches(window))
        .map(|rule| rule.context.as_str())
        .unwrap_or(DEFAULT_CONTEXT)
}

// ── Tests ──────────────────────────────────────────────────
