//! Frame-log replay driver.
//!
//! Feeds newline-delimited JSON frame records through a pipeline and
//! writes each dispatched action to the output, one line per action.
//! This is the harness the binary runs; live camera capture and keystroke
//! dispatch belong to external collaborators.

use std::io::{BufRead, Write};

use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::landmarks::{HandFrame, LANDMARK_COUNT};
use crate::pipeline::{FrameInput, Pipeline};
use crate::profile::{resolve_context, ContextRule, ProfileSet, WindowInfo};

// ── Record formats ─────────────────────────────────────────

/// One recorded camera tick.
#[derive(Debug, Deserialize)]
pub struct FrameRecord {
    /// Capture timestamp, seconds.
    pub t: f64,
    /// Landmark points; absent when no hand was detected that frame.
    #[serde(default)]
    pub hand: Option<[[f32; 3]; LANDMARK_COUNT]>,
    /// Explicit context-tag override.
    #[serde(default)]
    pub context: Option<String>,
    /// Active-window metadata, resolved through the context rules.
    #[serde(default)]
    pub window: Option<WindowInfo>,
}

/// Profiles and context rules as loaded from the host's JSON file.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ProfileFile {
    pub profiles: ProfileSet,
    pub rules: Vec<ContextRule>,
}

/// Totals for a finished replay.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ReplaySummary {
    pub frames: u64,
    pub actions: u64,
}

// ── Driver ─────────────────────────────────────────────────

/// Replay a frame log.  Malformed lines are skipped with a warning; the
/// pipeline itself never errors on frame content.
pub fn run(
    pipeline: &mut Pipeline,
    rules: &[ContextRule],
    reader: impl BufRead,
    out: &mut impl Write,
) -> Result<ReplaySummary> {
    let mut summary = ReplaySummary::default();

    for (lineno, line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let record: FrameRecord = match serde_json::from_str(line) {
            Ok(record) => record,
            Err(err) => {
                warn!("line {}: skipping malformed record: {}", lineno + 1, err);
                continue;
            }
        };

        if let Some(window) = &record.window {
            let context = resolve_context(rules, window);
            if context != pipeline.context() {
                debug!("context -> '{}'", context);
                let context = context.to_string();
                pipeline.set_context(context);
            }
        }
        if let Some(tag) = record.context {
            pipeline.set_context(tag);
        }

        summary.frames += 1;
        let input = FrameInput {
            timestamp_s: record.t,
            hand: record.hand.map(HandFrame::new),
        };
        if let Some(event) = pipeline.tick(&input) {
            summary.actions += 1;
            writeln!(
                out,
                "{:.3}\t{}\t{}",
                event.timestamp_s,
                event.gesture.name(),
                event.action
            )?;
        }
    }

    info!(
        "replay finished: {} frames, {} actions",
        summary.frames, summary.actions
    );
    Ok(summary)
}

// ── Tests ──────────────────────────────────────────────────
