//! Queue and transport error types.

use thiserror::Error;

/// Outcome of a single failed delivery attempt.
///
/// Every variant counts as one failed attempt; the queue retries all of them
/// the same way.
#[derive(Error, Debug)]
pub enum TransportError {
    /// Collector answered with a non-2xx status
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// Request exceeded its timeout and was aborted
    #[error("Request timed out")]
    Timeout,

    /// Connection or protocol failure before a status was received
    #[error("Request failed: {0}")]
    Request(String),

    /// Batch could not be encoded for the wire
    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Any other failure reported by a custom transport
    #[error("{0}")]
    Other(String),
}

impl TransportError {
    /// Whether the failure would most likely repeat on every retry.
    ///
    /// Client errors other than 408 and 429 fall in this bucket. This is only
    /// reported in diagnostics; such failures still consume the retry budget.
    pub fn looks_permanent(&self) -> bool {
        match self {
            Self::Status { status, .. } => {
                (400..500).contains(status) && *status != 408 && *status != 429
            }
            Self::Serialize(_) => true,
            _ => false,
        }
    }
}

/// Result type alias for transport calls.
pub type TransportResult<T> = Result<T, TransportError>;

/// Errors raised while setting up a queue.
#[derive(Error, Debug)]
pub enum QueueError {
    /// No tokio runtime was available to drive timers and deliveries
    #[error("No tokio runtime available: {0}")]
    NoRuntime(#[from] tokio::runtime::TryCurrentError),
}

/// Result type alias using QueueError.
pub type QueueResult<T> = Result<T, QueueError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_looks_permanent_for_client_errors() {
        let unauthorized = TransportError::Status {
            status: 401,
            body: String::new(),
        };
        assert!(unauthorized.looks_permanent());

        let throttled = TransportError::Status {
            status: 429,
            body: String::new(),
        };
        assert!(!throttled.looks_permanent());

        let unavailable = TransportError::Status {
            status: 503,
            body: String::new(),
        };
        assert!(!unavailable.looks_permanent());
        assert!(!TransportError::Timeout.looks_permanent());
    }

    #[test]
    fn test_error_display() {
        let err = TransportError::Status {
            status: 500,
            body: "boom".to_string(),
        };
        assert_eq!(err.to_string(), "HTTP 500: boom");
        assert_eq!(TransportError::Timeout.to_string(), "Request timed out");
    }
}
