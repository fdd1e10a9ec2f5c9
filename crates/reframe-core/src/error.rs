//! Error types for the reframing core.

use thiserror::Error;

/// Result type for reframing operations.
pub type ReframeResult<T> = Result<T, ReframeError>;

/// Errors that can occur while planning a reframe.
#[derive(Debug, Error)]
pub enum ReframeError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("non-monotonic detector input: expected frame {expected}, got {got}")]
    NonMonotonicInput { expected: usize, got: usize },

    #[error("empty input: at least one frame of observations is required")]
    EmptyInput,

    #[error("invalid frame dimensions: {width}x{height}")]
    InvalidFrameSize { width: u32, height: u32 },

    #[error("configuration parse error: {0}")]
    ConfigParse(#[from] serde_json::Error),

    #[error("operation cancelled")]
    Cancelled,
}

impl ReframeError {
    /// Create an invalid configuration error.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig(message.into())
    }
}
