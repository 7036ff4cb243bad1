//! Error types for the generation client

use thiserror::Error;

/// Result type alias using GenerationError
pub type Result<T> = std::result::Result<T, GenerationError>;

/// Errors talking to the generation service
#[derive(Debug, Error)]
pub enum GenerationError {
    /// Connection, timeout or body decoding failure
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The service answered with a non-success status
    #[error("Generation API error ({status}): {body}")]
    Api { status: u16, body: String },

    /// The reply carried no message content
    #[error("Generation reply was empty")]
    EmptyReply,

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
