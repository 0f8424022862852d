use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("Model request failed: {0}")]
    Network(String),

    #[error("Model request timed out after {0:?}")]
    Timeout(Duration),

    #[error("Model API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Model returned malformed output: {0}")]
    MalformedOutput(String),

    #[error("Model client configuration error: {0}")]
    Config(String),
}

impl ExtractionError {
    /// Whether asking again with a stricter prompt could help.
    pub fn is_malformed_output(&self) -> bool {
        matches!(self, ExtractionError::MalformedOutput(_))
    }
}
