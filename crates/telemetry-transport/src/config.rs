//! Collector connection settings.

use crate::{SetupError, SetupResult};
use reqwest::Client;
use std::time::Duration;
use url::Url;

/// Default per-request timeout in milliseconds.
pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;

/// Header carrying the project API key.
pub const API_KEY_HEADER: &str = "project-api-key";

/// Transport configuration shared by the log and metric transports.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Collector base URL, e.g. `https://collector.example.com`.
    pub host: String,
    /// Project API key sent with every request.
    pub api_key: String,
    /// Per-request timeout in milliseconds.
    pub timeout_ms: u64,
}

impl TransportConfig {
    /// Create a config with the default timeout.
    pub fn new(host: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            api_key: api_key.into(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }

    /// Per-request timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Join the host and a path, dropping trailing slashes from the host.
    pub fn endpoint(&self, path: &str) -> String {
        let host = self.host.trim_end_matches('/');
        let path = path.trim_start_matches('/');
        format!("{host}/{path}")
    }

    /// Check that the host is an absolute http(s) URL.
    pub fn validate(&self) -> SetupResult<()> {
        let url = Url::parse(self.host.trim())?;
        match url.scheme() {
            "http" | "https" => Ok(()),
            other => Err(SetupError::InvalidHost(format!(
                "unsupported scheme '{other}' in {}",
                self.host
            ))),
        }
    }

    /// Build an HTTP client whose requests are bounded by the timeout.
    pub fn build_client(&self) -> SetupResult<Client> {
        let client = Client::builder().timeout(self.timeout()).build()?;
        Ok(client)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_config_default_timeout() {
        let config = TransportConfig::new("https://collector.example.com", "key");
        assert_eq!(config.timeout_ms, 10_000);
        assert_eq!(config.timeout(), Duration::from_secs(10));
    }

    #[test]
    fn test_endpoint_trims_slashes() {
        let config = TransportConfig::new("https://collector.example.com/", "key");
        assert_eq!(
            config.endpoint("/logs/batch"),
            "https://collector.example.com/logs/batch"
        );
        assert_eq!(config.endpoint("metrics"), "https://collector.example.com/metrics");
    }

    #[test]
    fn test_validate_rejects_bad_hosts() {
        assert!(TransportConfig::new("https://ok.example.com", "k").validate().is_ok());
        assert!(TransportConfig::new("http://localhost:8080", "k").validate().is_ok());
        assert!(TransportConfig::new("not a url", "k").validate().is_err());
        assert!(matches!(
            TransportConfig::new("ftp://files.example.com", "k").validate(),
            Err(SetupError::InvalidHost(_))
        ));
    }
}
