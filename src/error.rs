//! Error handling for scoretab.

use thiserror::Error;

/// Result type alias for scoretab operations
pub type Result<T> = std::result::Result<T, TabError>;

/// Main error type for score-to-tablature conversion
#[derive(Error, Debug)]
pub enum TabError {
    /// Tuning identifier is neither a named tuning nor 6 characters long
    #[error("No recognised tuning option provided: {0}")]
    UnrecognizedTuning(String),

    /// Staff-system name sequencer fed a malformed previous name
    #[error("Invalid staff-system name '{name}': {reason}")]
    InvalidSequencerState { name: String, reason: &'static str },

    /// External renderer exited abnormally or produced no output
    #[error("Renderer failed: {reason}")]
    RendererFailure { reason: String },

    /// Score file could not be interpreted
    #[error("Failed to parse score: {0}")]
    Parse(String),

    #[error("Invalid interval: {0}")]
    InvalidInterval(String),

    #[error("Invalid pitch: {0}")]
    InvalidPitch(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl TabError {
    pub(crate) fn renderer(reason: impl Into<String>) -> Self {
        TabError::RendererFailure {
            reason: reason.into(),
        }
    }
}
