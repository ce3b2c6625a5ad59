//! Queue tunables.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default number of items per batch.
pub const DEFAULT_BATCH_SIZE: usize = 25;

/// Default periodic flush interval in milliseconds.
pub const DEFAULT_FLUSH_INTERVAL_MS: u64 = 1000;

/// Default number of delivery attempts per batch.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Default delay before the first retry in milliseconds.
pub const DEFAULT_BASE_RETRY_DELAY_MS: u64 = 1000;

/// Batching and retry configuration for an [`EventQueue`](crate::EventQueue).
///
/// # Backoff Calculation
///
/// The delay before retry `k` (0 for the first retry) is
/// `base_retry_delay_ms * 2^k`, with no jitter and no cap. For the defaults:
/// - 1st retry: 1s
/// - 2nd retry: 2s
///
/// after which the third attempt fails the batch for good.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueueConfig {
    /// Maximum items per batch; also the buffer length that triggers a send.
    pub batch_size: usize,
    /// Interval of the periodic trigger.
    pub flush_interval_ms: u64,
    /// Total attempts per batch, the initial attempt included.
    pub max_retries: u32,
    /// Delay before the first retry.
    pub base_retry_delay_ms: u64,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            flush_interval_ms: DEFAULT_FLUSH_INTERVAL_MS,
            max_retries: DEFAULT_MAX_RETRIES,
            base_retry_delay_ms: DEFAULT_BASE_RETRY_DELAY_MS,
        }
    }
}

impl QueueConfig {
    /// Clamp degenerate values so the queue always makes progress.
    pub(crate) fn normalized(mut self) -> Self {
        self.batch_size = self.batch_size.max(1);
        self.flush_interval_ms = self.flush_interval_ms.max(1);
        self.max_retries = self.max_retries.max(1);
        self
    }

    /// Interval of the periodic trigger.
    pub fn flush_interval(&self) -> Duration {
        Duration::from_millis(self.flush_interval_ms)
    }

    /// Delay inserted before retry `k`, counting from zero.
    pub fn retry_delay(&self, k: u32) -> Duration {
        let factor = 1u64.checked_shl(k).unwrap_or(u64::MAX);
        Duration::from_millis(self.base_retry_delay_ms.saturating_mul(factor))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_queue_config_default() {
        let config = QueueConfig::default();
        assert_eq!(config.batch_size, 25);
        assert_eq!(config.flush_interval_ms, 1000);
        assert_eq!(config.max_retries, 3);
        assert_eq!(config.base_retry_delay_ms, 1000);
        assert_eq!(config.flush_interval(), Duration::from_secs(1));
    }

    #[test]
    fn test_retry_delay_doubles() {
        let config = QueueConfig {
            base_retry_delay_ms: 10,
            ..Default::default()
        };

        assert_eq!(config.retry_delay(0), Duration::from_millis(10));
        assert_eq!(config.retry_delay(1), Duration::from_millis(20));
        assert_eq!(config.retry_delay(2), Duration::from_millis(40));
        assert_eq!(config.retry_delay(5), Duration::from_millis(320));
    }

    #[test]
    fn test_retry_delay_saturates() {
        let config = QueueConfig {
            base_retry_delay_ms: u64::MAX / 2,
            ..Default::default()
        };

        assert_eq!(config.retry_delay(4), Duration::from_millis(u64::MAX));
        assert_eq!(config.retry_delay(200), Duration::from_millis(u64::MAX));
    }

    #[test]
    fn test_normalized_clamps_zero_values() {
        let config = QueueConfig {
            batch_size: 0,
            flush_interval_ms: 0,
            max_retries: 0,
            base_retry_delay_ms: 0,
        }
        .normalized();

        assert_eq!(config.batch_size, 1);
        assert_eq!(config.flush_interval_ms, 1);
        assert_eq!(config.max_retries, 1);
        assert_eq!(config.base_retry_delay_ms, 0);
    }

    #[test]
    fn test_deserialize_partial_config() {
        let config: QueueConfig = serde_json::from_str(r#"{"batch_size": 100}"#).unwrap();
        assert_eq!(config.batch_size, 100);
        assert_eq!(config.flush_interval_ms, DEFAULT_FLUSH_INTERVAL_MS);
        assert_eq!(config.max_retries, DEFAULT_MAX_RETRIES);
    }
}
