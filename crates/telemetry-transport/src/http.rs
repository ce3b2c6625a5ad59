//! Single JSON request against a collector endpoint.

use crate::{TransportConfig, API_KEY_HEADER};
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Method};
use serde::Serialize;
use telemetry_queue::{TransportError, TransportResult};
use tracing::debug;

/// Method, URL and credentials for one collector route.
#[derive(Debug, Clone)]
pub(crate) struct Endpoint {
    client: Client,
    method: Method,
    url: String,
    api_key: String,
}

impl Endpoint {
    pub(crate) fn new(client: Client, config: &TransportConfig, method: Method, path: &str) -> Self {
        Self {
            client,
            method,
            url: config.endpoint(path),
            api_key: config.api_key.clone(),
        }
    }

    pub(crate) fn url(&self) -> &str {
        &self.url
    }

    /// Send one JSON body; anything but a 2xx answer is a failure.
    pub(crate) async fn send_json<B>(&self, body: &B) -> TransportResult<()>
    where
        B: Serialize + ?Sized,
    {
        let payload = serde_json::to_vec(body)?;

        debug!(method = %self.method, url = %self.url, bytes = payload.len(), "Sending request");

        let response = self
            .client
            .request(self.method.clone(), &self.url)
            .header(CONTENT_TYPE, "application/json")
            .header(API_KEY_HEADER, &self.api_key)
            .body(payload)
            .send()
            .await
            .map_err(classify)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TransportError::Status {
                status: status.as_u16(),
                body,
            });
        }

        Ok(())
    }
}

fn classify(err: reqwest::Error) -> TransportError {
    if err.is_timeout() {
        TransportError::Timeout
    } else {
        TransportError::Request(err.to_string())
    }
}
