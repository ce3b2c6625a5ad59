//! Asynchronous batching and retry queue for telemetry delivery.
//!
//! This crate provides:
//! - EventQueue: ordered buffer that cuts batches by size or time and delivers
//!   them through a transport with exponential-backoff retry
//! - Transport: the contract for one network exchange with a collector
//! - QueueConfig: batching and retry tunables, all defaulted
//!
//! Producers call `add()` and never wait on the network. Delivery failures
//! are retried up to the configured cap, then logged and dropped; they never
//! reach the producer.

mod config;
mod error;
mod queue;
mod transport;

pub use config::{
    QueueConfig, DEFAULT_BASE_RETRY_DELAY_MS, DEFAULT_BATCH_SIZE, DEFAULT_FLUSH_INTERVAL_MS,
    DEFAULT_MAX_RETRIES,
};
pub use error::{QueueError, QueueResult, TransportError, TransportResult};
pub use queue::{EventQueue, QueueStats};
pub use transport::{FnTransport, Transport, TransportHandle};
