//! # Telemetry Client
//!
//! Producer-facing facade over the telemetry delivery queues.
//!
//! Application code logs and records metrics through cheap handles; entries
//! are buffered, batched and forwarded to the collector in the background.
//! Emission never blocks and never fails. Delivery problems are retried,
//! then reported through `tracing` and dropped.
//!
//! ## Usage
//!
//! ```rust,ignore
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     telemetry_client::init_logging("info");
//!
//!     let config = telemetry_client::ClientConfig::load(None)?;
//!     let client = telemetry_client::TelemetryClient::new(config)?;
//!
//!     client.logger().info("service started");
//!     client.metrics().change("boots", 1.0);
//!
//!     // Drain before exit; destroy() alone discards buffered items.
//!     client.shutdown().await;
//!     Ok(())
//! }
//! ```

mod client;
mod config;
mod error;
mod logger;
mod logging;
mod metrics;

pub use client::{ClientStats, TelemetryClient};
pub use config::{ClientConfig, ENV_API_KEY, ENV_HOST, ENV_MIN_LEVEL, ENV_NAMESPACE};
pub use error::{ClientError, ClientResult};
pub use logger::Logger;
pub use logging::init_logging;
pub use metrics::Metrics;

pub use telemetry_queue::{QueueConfig, QueueStats};
pub use telemetry_transport::{LogEntry, LogLevel, MetricEvent, MetricOperation};
