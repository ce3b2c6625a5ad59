//! Transport contract between the queue and the remote collector.

use crate::TransportResult;
use async_trait::async_trait;
use std::future::Future;
use std::marker::PhantomData;
use std::sync::Arc;

/// Performs one network exchange for a non-empty, ordered batch.
///
/// `Ok(())` means the collector durably accepted every item. Any error is
/// counted as one failed attempt by the queue.
#[async_trait]
pub trait Transport<T>: Send + Sync
where
    T: Send + Sync,
{
    /// Deliver the batch, preserving its order.
    async fn send(&self, batch: &[T]) -> TransportResult<()>;
}

/// Shared handle to a transport, as held by the queue and its delivery tasks.
pub type TransportHandle<T> = Arc<dyn Transport<T>>;

/// Adapts an async closure into a [`Transport`].
///
/// The closure receives an owned copy of the batch.
///
/// ```ignore
/// let transport = FnTransport::new(|batch: Vec<u32>| async move {
///     println!("sending {} items", batch.len());
///     Ok(())
/// });
/// ```
pub struct FnTransport<F, Fut> {
    f: F,
    _future: PhantomData<fn() -> Fut>,
}

impl<F, Fut> FnTransport<F, Fut> {
    /// Wrap a closure.
    pub fn new(f: F) -> Self {
        Self {
            f,
            _future: PhantomData,
        }
    }
}

#[async_trait]
impl<T, F, Fut> Transport<T> for FnTransport<F, Fut>
where
    T: Clone + Send + Sync + 'static,
    F: Fn(Vec<T>) -> Fut + Send + Sync,
    Fut: Future<Output = TransportResult<()>> + Send,
{
    async fn send(&self, batch: &[T]) -> TransportResult<()> {
        (self.f)(batch.to_vec()).await
    }
}
