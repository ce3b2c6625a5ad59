//! Log producer handle.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use telemetry_queue::EventQueue;
use telemetry_transport::{LogEntry, LogLevel};

/// Cheap, cloneable handle that turns log calls into queued [`LogEntry`]s.
///
/// Every accepted entry takes the next value of a sequence counter shared by
/// all loggers of the same client, so the collector can restore emission
/// order across batches.
#[derive(Clone)]
pub struct Logger {
    queue: EventQueue<LogEntry>,
    sequence: Arc<AtomicU64>,
    namespace: Option<String>,
    min_level: LogLevel,
}

impl Logger {
    pub(crate) fn new(
        queue: EventQueue<LogEntry>,
        namespace: Option<String>,
        min_level: LogLevel,
    ) -> Self {
        Self {
            queue,
            sequence: Arc::new(AtomicU64::new(0)),
            namespace,
            min_level,
        }
    }

    /// A logger sharing this one's queue and sequence, under another namespace.
    pub fn with_namespace(&self, namespace: impl Into<String>) -> Self {
        Self {
            namespace: Some(namespace.into()),
            ..self.clone()
        }
    }

    /// Namespace attached to entries from this logger.
    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    /// Minimum level that is forwarded.
    pub fn min_level(&self) -> LogLevel {
        self.min_level
    }

    /// Queue an entry. Returns immediately; entries below the minimum level
    /// are dropped.
    pub fn log(&self, level: LogLevel, message: impl Into<String>) {
        if level < self.min_level {
            return;
        }
        let sequence_number = self.sequence.fetch_add(1, Ordering::Relaxed);
        self.queue.add(LogEntry::new(
            level,
            message,
            sequence_number,
            self.namespace.clone(),
        ));
    }

    pub fn debug(&self, message: impl Into<String>) {
        self.log(LogLevel::Debug, message);
    }

    pub fn info(&self, message: impl Into<String>) {
        self.log(LogLevel::Info, message);
    }

    pub fn warn(&self, message: impl Into<String>) {
        self.log(LogLevel::Warn, message);
    }

    pub fn error(&self, message: impl Into<String>) {
        self.log(LogLevel::Error, message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use telemetry_queue::{FnTransport, QueueConfig};

    fn recording_logger(
        min_level: LogLevel,
    ) -> (Logger, EventQueue<LogEntry>, Arc<Mutex<Vec<LogEntry>>>) {
        let sent = Arc::new(Mutex::new(Vec::new()));
        let sink = sent.clone();
        let transport = FnTransport::new(move |batch: Vec<LogEntry>| {
            let sink = sink.clone();
            async move {
                sink.lock().extend(batch);
                Ok(())
            }
        });
        let queue = EventQueue::new("logs", Arc::new(transport), QueueConfig::default()).unwrap();
        (Logger::new(queue.clone(), None, min_level), queue, sent)
    }

    #[tokio::test(start_paused = true)]
    async fn test_sequence_numbers_are_shared_across_namespaces() {
        let (logger, queue, sent) = recording_logger(LogLevel::Debug);
        let child = logger.with_namespace("db");

        logger.info("one");
        child.warn("two");
        logger.error("three");
        queue.flush().await;

        let sent = sent.lock();
        let seqs: Vec<u64> = sent.iter().map(|e| e.sequence_number).collect();
        assert_eq!(seqs, vec![0, 1, 2]);
        assert_eq!(sent[0].namespace, None);
        assert_eq!(sent[1].namespace.as_deref(), Some("db"));
        assert_eq!(sent[1].level, LogLevel::Warn);
        assert_eq!(sent[2].message, "three");
    }

    #[tokio::test(start_paused = true)]
    async fn test_entries_below_min_level_are_dropped() {
        let (logger, queue, sent) = recording_logger(LogLevel::Warn);

        logger.debug("noise");
        logger.info("noise");
        logger.warn("kept");
        logger.error("kept too");
        queue.flush().await;

        let sent = sent.lock();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].sequence_number, 0);
        assert_eq!(sent[1].level, LogLevel::Error);
    }

    #[tokio::test(start_paused = true)]
    async fn test_child_namespace_does_not_change_parent() {
        let (logger, _queue, _sent) = recording_logger(LogLevel::Debug);
        let child = logger.with_namespace("http");

        assert_eq!(logger.namespace(), None);
        assert_eq!(child.namespace(), Some("http"));
        assert_eq!(child.min_level(), LogLevel::Debug);
    }
}
