//! Error types for Vela Core

use thiserror::Error;

/// Result type alias for player operations
pub type Result<T> = std::result::Result<T, Error>;

/// Player error types
#[derive(Error, Debug)]
pub enum Error {
    // Caller misuse
    #[error("Video URL is missing")]
    MissingUrl,

    #[error("Unknown rendition index {index} ({available} available)")]
    UnknownRendition { index: usize, available: usize },

    // State machine
    #[error("Invalid overlay state transition: {from} -> {to}")]
    InvalidStateTransition { from: String, to: String },

    // Platform errors
    #[error("View operation failed: {0}")]
    View(String),

    #[error("Streaming engine failed: {0}")]
    Engine(String),

    // Configuration errors
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Failed to decode configuration: {0}")]
    ConfigDecode(#[from] serde_json::Error),
}

impl Error {
    /// Create a view error
    pub fn view(msg: impl Into<String>) -> Self {
        Error::View(msg.into())
    }

    /// Create an engine error
    pub fn engine(msg: impl Into<String>) -> Self {
        Error::Engine(msg.into())
    }

    /// Returns true if the session can continue after this error
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Error::MissingUrl | Error::UnknownRendition { .. } | Error::View(_)
        )
    }

    /// Returns the error code reported to the console
    pub fn error_code(&self) -> &'static str {
        match self {
            Error::MissingUrl => "MISSING_URL",
            Error::UnknownRendition { .. } => "UNKNOWN_RENDITION",
            Error::InvalidStateTransition { .. } => "INVALID_STATE",
            Error::View(_) => "VIEW",
            Error::Engine(_) => "ENGINE",
            Error::InvalidConfig(_) => "INVALID_CONFIG",
            Error::ConfigDecode(_) => "CONFIG_DECODE",
        }
    }
}
