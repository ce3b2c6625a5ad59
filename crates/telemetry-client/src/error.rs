//! Client error types.

use thiserror::Error;

/// Errors raised while configuring or constructing a client.
///
/// Emitting logs and metrics never fails; these only surface at setup time.
#[derive(Error, Debug)]
pub enum ClientError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Transport could not be built
    #[error("Transport error: {0}")]
    Transport(#[from] telemetry_transport::SetupError),

    /// Queue could not be started
    #[error("Queue error: {0}")]
    Queue(#[from] telemetry_queue::QueueError),
}

/// Result type alias using ClientError.
pub type ClientResult<T> = Result<T, ClientError>;
