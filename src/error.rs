//! Error types for ocr-labeler.

use thiserror::Error;

/// Errors raised by the adapters, configuration, and CLI.
///
/// The review controller never returns these to its caller: collaborator
/// failures are folded into the session's error banner instead.
#[derive(Error, Debug)]
pub enum LabelerError {
    /// Configuration could not be read, parsed, or written.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The `SQLite` label store failed.
    #[error("Database error: {0}")]
    Database(String),

    /// The image source could not list or hand out images.
    #[error("Image source error: {0}")]
    Source(String),

    /// The extraction engine could not be run.
    #[error("Extraction error: {0}")]
    Extraction(String),

    /// A label could not be recorded or read back.
    #[error("Label store error: {0}")]
    Store(String),

    /// A named image or file does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The terminal could not be set up or drawn.
    #[error("Terminal error: {0}")]
    Terminal(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Parse(#[from] serde_json::Error),
}

impl LabelerError {
    /// Whether retrying the same call later could succeed.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::Source(_) | Self::Extraction(_) | Self::Store(_) | Self::Database(_) | Self::Io(_)
        )
    }
}
