//! HTTP transports delivering telemetry batches to a remote collector.
//!
//! This crate provides:
//! - HttpBatchTransport: the whole batch in one request (`POST /logs/batch`)
//! - HttpItemTransport: one concurrent request per item (`PUT /metrics`)
//! - Wire types for log entries and metric updates
//!
//! Every request carries `Content-Type: application/json` and the
//! `project-api-key` header, and is bounded by the configured timeout.

mod batch;
mod config;
mod error;
mod http;
mod item;
mod wire;

pub use batch::{HttpBatchTransport, LOGS_BATCH_PATH, LOGS_ENVELOPE_KEY};
pub use config::{TransportConfig, API_KEY_HEADER, DEFAULT_TIMEOUT_MS};
pub use error::{SetupError, SetupResult};
pub use item::{HttpItemTransport, METRICS_PATH};
pub use wire::{LogEntry, LogLevel, MetricEvent, MetricOperation, ParseLogLevelError};
