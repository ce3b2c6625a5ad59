//! Client configuration.

use crate::{ClientError, ClientResult};
use serde::{Deserialize, Serialize};
use std::path::Path;
use telemetry_queue::QueueConfig;
use telemetry_transport::{LogLevel, TransportConfig, DEFAULT_TIMEOUT_MS};

/// Environment variable overriding the collector host.
pub const ENV_HOST: &str = "TELEMETRY_HOST";
/// Environment variable overriding the project API key.
pub const ENV_API_KEY: &str = "TELEMETRY_API_KEY";
/// Environment variable overriding the default namespace.
pub const ENV_NAMESPACE: &str = "TELEMETRY_NAMESPACE";
/// Environment variable overriding the minimum forwarded log level.
pub const ENV_MIN_LEVEL: &str = "TELEMETRY_MIN_LEVEL";

/// Telemetry client configuration.
///
/// Only `host` and `api_key` have no usable default. Both queues use the
/// [`QueueConfig`] defaults unless overridden.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Collector base URL.
    #[serde(default)]
    pub host: String,
    /// Project API key.
    #[serde(default)]
    pub api_key: String,
    /// Namespace attached to every log and metric unless overridden.
    #[serde(default)]
    pub namespace: Option<String>,
    /// Log entries below this level are not forwarded.
    #[serde(default = "default_min_level")]
    pub min_level: LogLevel,
    /// Per-request timeout in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// Batching and retry for log entries.
    #[serde(default)]
    pub logs: QueueConfig,
    /// Batching and retry for metric updates.
    #[serde(default)]
    pub metrics: QueueConfig,
}

fn default_min_level() -> LogLevel {
    LogLevel::Debug
}

fn default_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT_MS
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            host: String::new(),
            api_key: String::new(),
            namespace: None,
            min_level: default_min_level(),
            timeout_ms: default_timeout_ms(),
            logs: QueueConfig::default(),
            metrics: QueueConfig::default(),
        }
    }
}

impl ClientConfig {
    /// Create a config for a collector with every tunable at its default.
    pub fn new(host: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            api_key: api_key.into(),
            ..Default::default()
        }
    }

    /// Load from an optional JSON file, then apply environment overrides.
    pub fn load(path: Option<&Path>) -> ClientResult<Self> {
        let mut config = match path {
            Some(path) => Self::load_from_file(path)?,
            None => Self::default(),
        };
        config.load_from_env();
        Ok(config)
    }

    /// Load configuration from a specific JSON file.
    pub fn load_from_file(path: &Path) -> ClientResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: ClientConfig = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Override fields from `TELEMETRY_*` environment variables.
    pub fn load_from_env(&mut self) {
        self.apply_overrides(|name| std::env::var(name).ok());
    }

    /// Override fields from a variable lookup; blank values are ignored.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |name: &str| lookup(name).and_then(non_empty);

        if let Some(host) = read(ENV_HOST) {
            self.host = host;
        }
        if let Some(api_key) = read(ENV_API_KEY) {
            self.api_key = api_key;
        }
        if let Some(namespace) = read(ENV_NAMESPACE) {
            self.namespace = Some(namespace);
        }
        if let Some(level) = read(ENV_MIN_LEVEL) {
            match level.parse() {
                Ok(level) => self.min_level = level,
                Err(e) => tracing::warn!(error = %e, "Ignoring {ENV_MIN_LEVEL}"),
            }
        }
    }

    /// Check that the collector host and API key are usable.
    pub fn validate(&self) -> ClientResult<()> {
        if self.host.trim().is_empty() {
            return Err(ClientError::Config("collector host is not set".to_string()));
        }
        if self.api_key.trim().is_empty() {
            return Err(ClientError::Config("project API key is not set".to_string()));
        }
        self.transport_config().validate()?;
        Ok(())
    }

    /// Connection settings handed to the HTTP transports.
    pub fn transport_config(&self) -> TransportConfig {
        TransportConfig {
            host: self.host.trim().to_string(),
            api_key: self.api_key.clone(),
            timeout_ms: self.timeout_ms,
        }
    }
}

fn non_empty(raw: String) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
