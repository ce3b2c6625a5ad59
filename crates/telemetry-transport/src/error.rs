//! Errors raised while building a transport.

use thiserror::Error;

/// Transport setup error type.
#[derive(Error, Debug)]
pub enum SetupError {
    /// Collector host is not an absolute http(s) URL
    #[error("Invalid collector host: {0}")]
    InvalidHost(String),

    /// URL parsing error
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// HTTP client could not be built
    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),
}

/// Result type alias using SetupError.
pub type SetupResult<T> = Result<T, SetupError>;
