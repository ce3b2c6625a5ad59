//! Client owning the log and metric queues.

use crate::{ClientConfig, ClientResult, Logger, Metrics};
use std::sync::Arc;
use telemetry_queue::{EventQueue, QueueStats, TransportHandle};
use telemetry_transport::{HttpBatchTransport, HttpItemTransport, LogEntry, MetricEvent};
use tracing::info;

/// Delivery counters of both queues.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClientStats {
    pub logs: QueueStats,
    pub metrics: QueueStats,
}

/// Telemetry client: two independent delivery streams plus producer handles.
///
/// Logs are delivered in batches (`POST /logs/batch`); metrics are delivered
/// one request per update (`PUT /metrics`). The streams share nothing but the
/// HTTP client, so ordering holds within a stream only.
///
/// # Lifecycle
///
/// 1. Create with [`TelemetryClient::new()`] inside a tokio runtime
/// 2. Emit through [`logger()`](Self::logger) and [`metrics()`](Self::metrics)
/// 3. Call [`shutdown()`](Self::shutdown) (or `flush()` then `destroy()`)
///    before exit; anything still buffered at `destroy()` is lost
pub struct TelemetryClient {
    logs: EventQueue<LogEntry>,
    metric_queue: EventQueue<MetricEvent>,
    logger: Logger,
    metrics: Metrics,
}

impl TelemetryClient {
    /// Build HTTP transports for the configured collector and start both queues.
    pub fn new(config: ClientConfig) -> ClientResult<Self> {
        config.validate()?;

        let transport_config = config.transport_config();
        let http = transport_config.build_client()?;
        let logs: TransportHandle<LogEntry> = Arc::new(HttpBatchTransport::logs_with_client(
            http.clone(),
            &transport_config,
        ));
        let metrics: TransportHandle<MetricEvent> = Arc::new(
            HttpItemTransport::metrics_with_client(http, &transport_config),
        );

        let client = Self::with_transports(&config, logs, metrics)?;
        info!(host = %transport_config.host, "Telemetry client started");
        Ok(client)
    }

    /// Start both queues on custom transports.
    ///
    /// Connection settings in `config` are ignored; only the queue tunables,
    /// namespace and minimum level apply.
    pub fn with_transports(
        config: &ClientConfig,
        logs: TransportHandle<LogEntry>,
        metrics: TransportHandle<MetricEvent>,
    ) -> ClientResult<Self> {
        let log_queue = EventQueue::new("logs", logs, config.logs.clone())?;
        let metric_queue = EventQueue::new("metrics", metrics, config.metrics.clone())?;

        Ok(Self {
            logger: Logger::new(log_queue.clone(), config.namespace.clone(), config.min_level),
            metrics: Metrics::new(metric_queue.clone(), config.namespace.clone()),
            logs: log_queue,
            metric_queue,
        })
    }

    /// Log producer handle.
    pub fn logger(&self) -> &Logger {
        &self.logger
    }

    /// Metric producer handle.
    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    /// Send everything buffered in both streams and wait for delivery to settle.
    pub async fn flush(&self) {
        tokio::join!(self.logs.flush(), self.metric_queue.flush());
    }

    /// Stop both streams. Buffered items are discarded.
    pub fn destroy(&self) {
        self.logs.destroy();
        self.metric_queue.destroy();
    }

    /// Drain both streams, then stop them.
    pub async fn shutdown(&self) {
        self.flush().await;
        self.destroy();

        let stats = self.stats();
        info!(
            logs_delivered = stats.logs.delivered_items,
            logs_abandoned = stats.logs.abandoned_items,
            metrics_delivered = stats.metrics.delivered_items,
            metrics_abandoned = stats.metrics.abandoned_items,
            "Telemetry client shut down"
        );
    }

    /// Delivery counters of both streams.
    pub fn stats(&self) -> ClientStats {
        ClientStats {
            logs: self.logs.stats(),
            metrics: self.metric_queue.stats(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ClientError;
    use parking_lot::Mutex;
    use telemetry_queue::{FnTransport, QueueConfig, TransportError};
    use telemetry_transport::{LogLevel, MetricOperation};

    type Sent<T> = Arc<Mutex<Vec<Vec<T>>>>;

    fn recorder<T>() -> (TransportHandle<T>, Sent<T>)
    where
        T: Clone + Send + Sync + 'static,
    {
        let sent: Sent<T> = Arc::new(Mutex::new(Vec::new()));
        let sink = sent.clone();
        let transport = FnTransport::new(move |batch: Vec<T>| {
            let sink = sink.clone();
            async move {
                sink.lock().push(batch);
                Ok(())
            }
        });
        (Arc::new(transport), sent)
    }

    fn test_config() -> ClientConfig {
        ClientConfig {
            namespace: Some("app".to_string()),
            logs: QueueConfig {
                batch_size: 3,
                ..Default::default()
            },
            ..ClientConfig::new("https://collector.example.com", "key")
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_streams_are_independent() {
        let (logs, sent_logs) = recorder::<LogEntry>();
        let (metrics, sent_metrics) = recorder::<MetricEvent>();
        let client = TelemetryClient::with_transports(&test_config(), logs, metrics).unwrap();

        client.logger().info("a");
        client.logger().info("b");
        client.logger().info("c");
        client.metrics().change("jobs", 1.0);
        client.flush().await;

        let sent_logs = sent_logs.lock();
        assert_eq!(sent_logs.len(), 1);
        assert_eq!(sent_logs[0].len(), 3);
        assert!(sent_logs[0].iter().all(|e| e.namespace.as_deref() == Some("app")));

        let sent_metrics = sent_metrics.lock();
        assert_eq!(sent_metrics.len(), 1);
        assert_eq!(sent_metrics[0][0].operation, MetricOperation::Change);
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_drains_then_stops() {
        let (logs, sent_logs) = recorder::<LogEntry>();
        let (metrics, sent_metrics) = recorder::<MetricEvent>();
        let client = TelemetryClient::with_transports(&test_config(), logs, metrics).unwrap();

        client.logger().log(LogLevel::Error, "last words");
        client.metrics().set("uptime", 12.0);
        client.shutdown().await;

        assert_eq!(sent_logs.lock().len(), 1);
        assert_eq!(sent_metrics.lock().len(), 1);

        client.logger().info("too late");
        client.metrics().set("uptime", 13.0);
        client.flush().await;

        assert_eq!(sent_logs.lock().len(), 1);
        assert_eq!(sent_metrics.lock().len(), 1);
        assert_eq!(client.stats().logs.delivered_items, 1);
        assert_eq!(client.stats().metrics.delivered_items, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_delivery_never_reaches_producer() {
        let failing: TransportHandle<LogEntry> = Arc::new(FnTransport::new(|_batch: Vec<LogEntry>| async {
            Err(TransportError::Status {
                status: 401,
                body: "invalid key".to_string(),
            })
        }));
        let (metrics, _sent) = recorder::<MetricEvent>();
        let config = ClientConfig {
            logs: QueueConfig {
                base_retry_delay_ms: 10,
                ..Default::default()
            },
            ..test_config()
        };
        let client = TelemetryClient::with_transports(&config, failing, metrics).unwrap();

        client.logger().warn("lost");
        client.shutdown().await;

        let stats = client.stats();
        assert_eq!(stats.logs.abandoned_batches, 1);
        assert_eq!(stats.logs.failed_attempts, 3);
    }

    #[tokio::test]
    async fn test_new_rejects_incomplete_config() {
        let result = TelemetryClient::new(ClientConfig::new("https://collector.example.com", ""));
        assert!(matches!(result, Err(ClientError::Config(_))));
    }

    #[tokio::test]
    async fn test_new_builds_http_client() {
        let client = TelemetryClient::new(ClientConfig::new("http://127.0.0.1:9", "key")).unwrap();
        client.destroy();
    }
}
