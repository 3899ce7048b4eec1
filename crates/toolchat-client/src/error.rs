//! Error types for the chat client.

use thiserror::Error;

/// Errors that can occur while talking to the chat endpoint.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Transport-level HTTP error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The endpoint answered with a non-success status.
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// A stream frame could not be decoded.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The server reported an error inside the stream.
    #[error("stream error: {0}")]
    Stream(String),
}
