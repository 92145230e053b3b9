//! # Airgest Engine
//!
//! Turns a noisy per-frame stream of 21 three-dimensional hand landmarks
//! into discrete, debounced, context-aware control actions.  The external
//! detector hands in raw landmark frames; the engine hands out at most one
//! rate-limited action identifier per cooldown window for the host to
//! dispatch.
//!
//! ## Pipeline
//!
//! ```text
//! raw landmarks ─▶ degenerate gate ─▶ smoother ─┬▶ pose classifier ─┐
//!                                               ├▶ swipe engine ────┼▶ arbiter ─▶ profiles ─▶ action
//!                                               └▶ template matcher ┘
//! ```
//!
//! Data flows strictly forward; every stage is bounded, non-blocking, and
//! deterministic for a given input sequence.  One [`Pipeline`] tracks one
//! hand — instantiate one per hand, there is no shared ambient state.
//!
//! ## Quick start
//!
//! ```no_run
//! use airgest_engine::{EngineConfig, FrameInput, HandFrame, Pipeline};
//!
//! # fn frames() -> Vec<(f64, [[f32; 3]; 21])> { Vec::new() }
//! fn main() -> airgest_engine::Result<()> {
//!     let mut pipeline = Pipeline::new(EngineConfig::default())?;
//!     for (t, points) in frames() {
//!         let input = FrameInput {
//!             timestamp_s: t,
//!             hand: Some(HandFrame::new(points)),
//!         };
//!         if let Some(event) = pipeline.tick(&input) {
//!             println!("dispatch {}", event.action);
//!         }
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Modules
//!
//! - [`landmarks`]: landmark enumeration, raw frames, normalization
//! - [`smoother`]: adaptive EMA jitter removal
//! - [`pose`]: static pose classification and confirmation voting
//! - [`swipe`]: trajectory window, linear fit, residual rejection
//! - [`template`]: user-recorded gesture templates
//! - [`arbiter`]: priority merge and cooldown state machine
//! - [`profile`]: context-keyed gesture-to-action mappings
//! - [`pipeline`]: the assembled per-hand pipeline
//! - [`replay`]: frame-log replay driver for the CLI
//! - [`config`]: construction-time configuration and validation
//! - [`error`]: error taxonomy

pub mod arbiter;
pub mod config;
pub mod error;
pub mod landmarks;
pub mod pipeline;
pub mod pose;
pub mod profile;
pub mod replay;
pub mod smoother;
pub mod swipe;
pub mod template;

// Re-export the types a host needs for the common path.
pub use arbiter::{ArbitratedEvent, Gesture};
pub use config::EngineConfig;
pub use error::{Error, Result};
pub use landmarks::{HandFrame, HandLandmark, LANDMARK_COUNT};
pub use pipeline::{ActionEvent, FrameInput, Pipeline};
pub use pose::{PoseLabel, PoseReading};
pub use profile::{ContextRule, Profile, ProfileSet, WindowInfo};
pub use swipe::{SwipeDirection, SwipeEvent};
pub use template::{GestureTemplate, TemplateRegistry};
