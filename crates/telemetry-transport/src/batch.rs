//! Whole-batch transport: one request carries every item.

use crate::http::Endpoint;
use crate::{LogEntry, SetupResult, TransportConfig};
use async_trait::async_trait;
use reqwest::{Client, Method};
use serde::Serialize;
use serde_json::{Map, Value};
use std::marker::PhantomData;
use telemetry_queue::{Transport, TransportResult};

/// Route used for log batches.
pub const LOGS_BATCH_PATH: &str = "/logs/batch";

/// Envelope key wrapping log batches.
pub const LOGS_ENVELOPE_KEY: &str = "logs";

/// Sends a batch as `{"<envelope_key>": [item, ...]}` in a single request.
pub struct HttpBatchTransport<T> {
    endpoint: Endpoint,
    envelope_key: String,
    _items: PhantomData<fn(&T)>,
}

impl<T> HttpBatchTransport<T> {
    /// Create a batch transport for an arbitrary route.
    pub fn with_client(
        client: Client,
        config: &TransportConfig,
        method: Method,
        path: &str,
        envelope_key: impl Into<String>,
    ) -> Self {
        Self {
            endpoint: Endpoint::new(client, config, method, path),
            envelope_key: envelope_key.into(),
            _items: PhantomData,
        }
    }

    /// Target URL of every request.
    pub fn url(&self) -> &str {
        self.endpoint.url()
    }
}

impl HttpBatchTransport<LogEntry> {
    /// `POST <host>/logs/batch` with body `{"logs": [...]}`.
    pub fn logs(config: &TransportConfig) -> SetupResult<Self> {
        config.validate()?;
        Ok(Self::logs_with_client(config.build_client()?, config))
    }

    /// Log transport reusing an existing client.
    pub fn logs_with_client(client: Client, config: &TransportConfig) -> Self {
        Self::with_client(client, config, Method::POST, LOGS_BATCH_PATH, LOGS_ENVELOPE_KEY)
    }
}

#[async_trait]
impl<T> Transport<T> for HttpBatchTransport<T>
where
    T: Serialize + Send + Sync,
{
    async fn send(&self, batch: &[T]) -> TransportResult<()> {
        let mut body = Map::new();
        body.insert(self.envelope_key.clone(), serde_json::to_value(batch)?);
        self.endpoint.send_json(&Value::Object(body)).await
    }
}
