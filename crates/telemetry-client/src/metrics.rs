//! Metric producer handle.

use telemetry_queue::EventQueue;
use telemetry_transport::{MetricEvent, MetricOperation};

/// Cheap, cloneable handle that turns metric calls into queued [`MetricEvent`]s.
#[derive(Clone)]
pub struct Metrics {
    queue: EventQueue<MetricEvent>,
    namespace: Option<String>,
}

impl Metrics {
    pub(crate) fn new(queue: EventQueue<MetricEvent>, namespace: Option<String>) -> Self {
        Self { queue, namespace }
    }

    /// A handle sharing this one's queue, under another namespace.
    pub fn with_namespace(&self, namespace: impl Into<String>) -> Self {
        Self {
            queue: self.queue.clone(),
            namespace: Some(namespace.into()),
        }
    }

    /// Namespace attached to updates from this handle.
    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    /// Replace the metric's value.
    pub fn set(&self, name: impl Into<String>, value: f64) {
        self.record(name, value, MetricOperation::Set);
    }

    /// Add `delta` to the metric's value.
    pub fn change(&self, name: impl Into<String>, delta: f64) {
        self.record(name, delta, MetricOperation::Change);
    }

    fn record(&self, name: impl Into<String>, value: f64, operation: MetricOperation) {
        self.queue
            .add(MetricEvent::new(name, value, operation, self.namespace.clone()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::Arc;
    use telemetry_queue::{FnTransport, QueueConfig};

    #[tokio::test(start_paused = true)]
    async fn test_set_and_change_build_events() {
        let sent = Arc::new(Mutex::new(Vec::new()));
        let sink = sent.clone();
        let transport = FnTransport::new(move |batch: Vec<MetricEvent>| {
            let sink = sink.clone();
            async move {
                sink.lock().extend(batch);
                Ok(())
            }
        });
        let queue = EventQueue::new("metrics", Arc::new(transport), QueueConfig::default()).unwrap();
        let metrics = Metrics::new(queue.clone(), Some("jobs".to_string()));

        metrics.set("depth", 4.0);
        metrics.with_namespace("mail").change("sent", 1.0);
        queue.flush().await;

        let sent = sent.lock();
        assert_eq!(
            *sent,
            vec![
                MetricEvent::new("depth", 4.0, MetricOperation::Set, Some("jobs".into())),
                MetricEvent::new("sent", 1.0, MetricOperation::Change, Some("mail".into())),
            ]
        );
    }
}
