//! Error types for the engine.
//!
//! Recognition itself never errors: a bad frame is skipped and a detector
//! that sees nothing returns `None`.  Errors are reserved for construction
//! (invalid configuration), registry mutation, and the replay driver's IO.

use thiserror::Error;

/// Result type alias for engine operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the engine.
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid configuration value, detected at pipeline construction.
    #[error("configuration error: {0}")]
    Config(String),

    /// A template with this name already exists with different content.
    #[error("template '{0}' already exists with different landmarks or threshold")]
    DuplicateTemplate(String),

    /// The landmark snapshot for a template was degenerate (near-zero palm width).
    #[error("degenerate landmark snapshot for template '{0}'")]
    DegenerateTemplate(String),

    /// IO error from the replay driver.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON de/serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
