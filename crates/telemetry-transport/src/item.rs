//! Fan-out transport: one concurrent request per item.

use crate::http::Endpoint;
use crate::{MetricEvent, SetupResult, TransportConfig};
use async_trait::async_trait;
use futures_util::stream::{FuturesUnordered, StreamExt};
use reqwest::{Client, Method};
use serde::Serialize;
use std::marker::PhantomData;
use telemetry_queue::{Transport, TransportError, TransportResult};

/// Route used for metric updates.
pub const METRICS_PATH: &str = "/metrics";

/// Sends every item of a batch as its own request, all at once.
///
/// Each request runs as its own task. The batch fails as soon as any request
/// fails; requests still running at that point are detached and finish on
/// their own, but their outcome is not reported.
pub struct HttpItemTransport<T> {
    endpoint: Endpoint,
    _items: PhantomData<fn(&T)>,
}

impl<T> HttpItemTransport<T> {
    /// Create a per-item transport for an arbitrary route.
    pub fn with_client(client: Client, config: &TransportConfig, method: Method, path: &str) -> Self {
        Self {
            endpoint: Endpoint::new(client, config, method, path),
            _items: PhantomData,
        }
    }

    /// Target URL of every request.
    pub fn url(&self) -> &str {
        self.endpoint.url()
    }
}

impl HttpItemTransport<MetricEvent> {
    /// `PUT <host>/metrics`, one metric per request.
    pub fn metrics(config: &TransportConfig) -> SetupResult<Self> {
        config.validate()?;
        Ok(Self::metrics_with_client(config.build_client()?, config))
    }

    /// Metric transport reusing an existing client.
    pub fn metrics_with_client(client: Client, config: &TransportConfig) -> Self {
        Self::with_client(client, config, Method::PUT, METRICS_PATH)
    }
}

#[async_trait]
impl<T> Transport<T> for HttpItemTransport<T>
where
    T: Serialize + Send + Sync,
{
    async fn send(&self, batch: &[T]) -> TransportResult<()> {
        let bodies = batch
            .iter()
            .map(serde_json::to_value)
            .collect::<Result<Vec<_>, _>>()?;

        let mut pending: FuturesUnordered<_> = bodies
            .into_iter()
            .map(|body| {
                let endpoint = self.endpoint.clone();
                tokio::spawn(async move { endpoint.send_json(&body).await })
            })
            .collect();

        while let Some(joined) = pending.next().await {
            match joined {
                Ok(Ok(())) => {}
                Ok(Err(e)) => return Err(e),
                Err(e) => return Err(TransportError::Other(format!("request task failed: {e}"))),
            }
        }
        Ok(())
    }
}
