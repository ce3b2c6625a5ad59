//! Batching buffer with periodic flushing and per-batch retry.

use crate::{QueueConfig, QueueResult, TransportHandle};
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn, Instrument, Span};

/// Counters describing what a queue has delivered so far.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QueueStats {
    /// Batches accepted by the transport.
    pub delivered_batches: u64,
    /// Batches dropped after exhausting their attempts.
    pub abandoned_batches: u64,
    /// Items contained in delivered batches.
    pub delivered_items: u64,
    /// Items contained in abandoned batches.
    pub abandoned_items: u64,
    /// Failed transport calls, retried or not.
    pub failed_attempts: u64,
}

#[derive(Default)]
struct Counters {
    delivered_batches: AtomicU64,
    abandoned_batches: AtomicU64,
    delivered_items: AtomicU64,
    abandoned_items: AtomicU64,
    failed_attempts: AtomicU64,
}

impl Counters {
    fn snapshot(&self) -> QueueStats {
        QueueStats {
            delivered_batches: self.delivered_batches.load(Ordering::Relaxed),
            abandoned_batches: self.abandoned_batches.load(Ordering::Relaxed),
            delivered_items: self.delivered_items.load(Ordering::Relaxed),
            abandoned_items: self.abandoned_items.load(Ordering::Relaxed),
            failed_attempts: self.failed_attempts.load(Ordering::Relaxed),
        }
    }
}

/// Why a batch was cut from the buffer.
#[derive(Debug, Clone, Copy)]
enum Trigger {
    Threshold,
    Timer,
    Flush,
}

impl Trigger {
    fn as_str(self) -> &'static str {
        match self {
            Self::Threshold => "threshold",
            Self::Timer => "timer",
            Self::Flush => "flush",
        }
    }
}

/// Terminal state of one batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    Delivered,
    Abandoned,
}

/// Buffered items and the one-way destroyed flag, guarded together.
struct BufferState<T> {
    buffer: VecDeque<T>,
    destroyed: bool,
}

/// A batch that has been cut and enrolled but not yet spawned.
struct Delivery<T> {
    id: u64,
    batch: Vec<T>,
    done: watch::Sender<bool>,
}

struct Inner<T> {
    name: String,
    config: QueueConfig,
    transport: TransportHandle<T>,
    runtime: Handle,
    state: Mutex<BufferState<T>>,
    /// Deliveries that have not reached a terminal state, keyed by batch id.
    in_flight: Mutex<HashMap<u64, watch::Receiver<bool>>>,
    next_batch_id: AtomicU64,
    timer: Mutex<Option<JoinHandle<()>>>,
    counters: Counters,
}

/// Ordered buffer that cuts batches by size or time and delivers them with
/// exponential-backoff retry.
///
/// # Triggers
///
/// - **Threshold**: `add()` cuts one batch from the head once the buffer
///   holds `batch_size` items.
/// - **Timer**: every `flush_interval_ms` one batch (up to `batch_size`) is
///   cut if the buffer is non-empty.
/// - **Flush**: `flush()` cuts everything that is buffered.
///
/// # Retry
///
/// Each batch is attempted at most `max_retries` times, the first attempt
/// included. Retry `k` (from zero) waits `base_retry_delay_ms * 2^k`. A batch
/// that runs out of attempts is logged and dropped; it is never put back into
/// the buffer.
///
/// # Thread Safety
///
/// The handle is cheap to clone and can be shared across tasks and threads:
/// - Buffer and destroyed flag share one mutex, so items are never lost or
///   cut twice
/// - Every batch is enrolled in the in-flight set before its task is spawned,
///   so `flush()` cannot miss a delivery it caused
/// - The periodic trigger holds only a weak reference and stops once the
///   queue is destroyed or every handle is dropped
pub struct EventQueue<T> {
    inner: Arc<Inner<T>>,
}

impl<T> Clone for EventQueue<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T> EventQueue<T>
where
    T: Send + Sync + 'static,
{
    /// Create a queue on the current tokio runtime and start its periodic trigger.
    ///
    /// # Errors
    ///
    /// Returns [`QueueError::NoRuntime`](crate::QueueError::NoRuntime) when
    /// called outside a tokio runtime.
    pub fn new(
        name: impl Into<String>,
        transport: TransportHandle<T>,
        config: QueueConfig,
    ) -> QueueResult<Self> {
        let runtime = Handle::try_current()?;
        Ok(Self::with_runtime(name, transport, config, runtime))
    }

    /// Create a queue whose timer and deliveries run on the given runtime.
    pub fn with_runtime(
        name: impl Into<String>,
        transport: TransportHandle<T>,
        config: QueueConfig,
        runtime: Handle,
    ) -> Self {
        let inner = Arc::new(Inner {
            name: name.into(),
            config: config.normalized(),
            transport,
            runtime,
            state: Mutex::new(BufferState {
                buffer: VecDeque::new(),
                destroyed: false,
            }),
            in_flight: Mutex::new(HashMap::new()),
            next_batch_id: AtomicU64::new(1),
            timer: Mutex::new(None),
            counters: Counters::default(),
        });

        Inner::start_timer(&inner);
        debug!(queue = %inner.name, "Event queue started");

        Self { inner }
    }

    /// Get the queue name used in diagnostics.
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Get the effective configuration.
    pub fn config(&self) -> &QueueConfig {
        &self.inner.config
    }

    /// Append an item to the tail of the buffer.
    ///
    /// Once the buffer holds `batch_size` items, exactly one batch is cut from
    /// the head and handed to a delivery task. Never waits on the network.
    /// After [`destroy()`](Self::destroy) this is a silent no-op.
    pub fn add(&self, item: T) {
        let delivery = {
            let mut state = self.inner.state.lock();
            if state.destroyed {
                return;
            }
            state.buffer.push_back(item);
            if state.buffer.len() >= self.inner.config.batch_size {
                self.inner.cut_batch(&mut state)
            } else {
                None
            }
        };

        if let Some(delivery) = delivery {
            Inner::spawn_delivery(&self.inner, delivery, Trigger::Threshold);
        }
    }

    /// Send everything that is buffered and wait for all tracked deliveries.
    ///
    /// Waits for every delivery in flight when the call is made, including
    /// ones still backing off between retries. Never fails: abandoned batches
    /// are only visible in the logs and in [`stats()`](Self::stats).
    pub async fn flush(&self) {
        let deliveries = {
            let mut state = self.inner.state.lock();
            let mut deliveries = Vec::new();
            while let Some(delivery) = self.inner.cut_batch(&mut state) {
                deliveries.push(delivery);
            }
            deliveries
        };

        for delivery in deliveries {
            Inner::spawn_delivery(&self.inner, delivery, Trigger::Flush);
        }

        let waiting: Vec<watch::Receiver<bool>> =
            self.inner.in_flight.lock().values().cloned().collect();
        if waiting.is_empty() {
            return;
        }

        debug!(queue = %self.inner.name, in_flight = waiting.len(), "Waiting for deliveries");
        for mut done in waiting {
            // A dropped sender also means the delivery is over.
            let _ = done.wait_for(|finished| *finished).await;
        }
    }

    /// Stop accepting items and cancel the periodic trigger.
    ///
    /// Idempotent. Deliveries already running are left to finish on their
    /// own; items still buffered are discarded. Call [`flush()`](Self::flush)
    /// first for a clean shutdown.
    pub fn destroy(&self) {
        let discarded = {
            let mut state = self.inner.state.lock();
            if state.destroyed {
                return;
            }
            state.destroyed = true;
            let discarded = state.buffer.len();
            state.buffer.clear();
            discarded
        };

        if let Some(timer) = self.inner.timer.lock().take() {
            timer.abort();
        }

        if discarded > 0 {
            warn!(queue = %self.inner.name, discarded, "Queue destroyed with buffered items");
        } else {
            info!(queue = %self.inner.name, "Queue destroyed");
        }
    }

    /// Whether [`destroy()`](Self::destroy) has been called.
    pub fn is_destroyed(&self) -> bool {
        self.inner.state.lock().destroyed
    }

    /// Get the number of buffered items not yet cut into a batch.
    pub fn pending_count(&self) -> usize {
        self.inner.state.lock().buffer.len()
    }

    /// Get the number of deliveries that have not reached a terminal state.
    pub fn in_flight_count(&self) -> usize {
        self.inner.in_flight.lock().len()
    }

    /// Get delivery counters.
    pub fn stats(&self) -> QueueStats {
        self.inner.counters.snapshot()
    }
}

impl<T> Inner<T>
where
    T: Send + Sync + 'static,
{
    /// Cut one batch from the head and enroll it in the in-flight set.
    ///
    /// Called with the buffer lock held, so enrollment is ordered with the
    /// cut itself.
    fn cut_batch(&self, state: &mut BufferState<T>) -> Option<Delivery<T>> {
        if state.destroyed || state.buffer.is_empty() {
            return None;
        }

        let size = std::cmp::min(state.buffer.len(), self.config.batch_size);
        let batch: Vec<T> = state.buffer.drain(..size).collect();

        let id = self.next_batch_id.fetch_add(1, Ordering::Relaxed);
        let (done, finished) = watch::channel(false);
        self.in_flight.lock().insert(id, finished);

        Some(Delivery { id, batch, done })
    }

    fn spawn_delivery(inner: &Arc<Self>, delivery: Delivery<T>, trigger: Trigger) {
        debug!(
            queue = %inner.name,
            batch_id = delivery.id,
            items = delivery.batch.len(),
            trigger = trigger.as_str(),
            "Dispatching batch"
        );

        // Delivery logs stay attached to the span that cut the batch.
        let owner = inner.clone();
        let delivery_task = async move {
            let Delivery { id, batch, done } = delivery;
            let _settled = SettledGuard {
                inner: owner.clone(),
                id,
                done,
            };
            owner.deliver(id, &batch).await;
        };
        inner.runtime.spawn(delivery_task.instrument(Span::current()));
    }

    /// Run the attempt sequence for one batch until it is delivered or abandoned.
    async fn deliver(&self, id: u64, batch: &[T]) -> Outcome {
        let items = batch.len() as u64;
        let mut attempt: u32 = 0;

        loop {
            attempt += 1;

            match self.transport.send(batch).await {
                Ok(()) => {
                    self.counters.delivered_batches.fetch_add(1, Ordering::Relaxed);
                    self.counters.delivered_items.fetch_add(items, Ordering::Relaxed);
                    debug!(
                        queue = %self.name,
                        batch_id = id,
                        attempt = attempt,
                        items = items,
                        "Batch delivered"
                    );
                    return Outcome::Delivered;
                }
                Err(e) => {
                    self.counters.failed_attempts.fetch_add(1, Ordering::Relaxed);

                    if attempt >= self.config.max_retries {
                        self.counters.abandoned_batches.fetch_add(1, Ordering::Relaxed);
                        self.counters.abandoned_items.fetch_add(items, Ordering::Relaxed);
                        error!(
                            queue = %self.name,
                            batch_id = id,
                            attempts = attempt,
                            items = items,
                            looks_permanent = e.looks_permanent(),
                            error = %e,
                            "Batch abandoned after max retries"
                        );
                        return Outcome::Abandoned;
                    }

                    let delay = self.config.retry_delay(attempt - 1);
                    warn!(
                        queue = %self.name,
                        batch_id = id,
                        attempt = attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "Batch send failed, retrying"
                    );

                    tokio::time::sleep(delay).await;
                }
            }
        }
    }

    /// Periodic trigger: cut one batch if anything is buffered.
    ///
    /// Returns false once the queue is destroyed.
    fn tick(inner: &Arc<Self>) -> bool {
        let delivery = {
            let mut state = inner.state.lock();
            if state.destroyed {
                return false;
            }
            inner.cut_batch(&mut state)
        };

        if let Some(delivery) = delivery {
            Self::spawn_delivery(inner, delivery, Trigger::Timer);
        }
        true
    }

    fn start_timer(inner: &Arc<Self>) {
        let weak: Weak<Self> = Arc::downgrade(inner);
        let period = inner.config.flush_interval();

        let handle = inner.runtime.spawn(async move {
            loop {
                tokio::time::sleep(period).await;

                let Some(inner) = weak.upgrade() else {
                    break;
                };
                if !Self::tick(&inner) {
                    break;
                }
            }
        });

        *inner.timer.lock() = Some(handle);
    }
}

/// Removes a delivery from the in-flight set and signals waiters when the
/// delivery task ends, whether it returned or panicked.
struct SettledGuard<T> {
    inner: Arc<Inner<T>>,
    id: u64,
    done: watch::Sender<bool>,
}

impl<T> Drop for SettledGuard<T> {
    fn drop(&mut self) {
        self.inner.in_flight.lock().remove(&self.id);
        let _ = self.done.send(true);
    }
}
