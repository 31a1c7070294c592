use once_cell::sync::Lazy;
use reqwest::{Client, ClientBuilder};
use serde_json::Value;

use super::SubmitError;
pub use crate::api::models::ScanRequest;

// Shared client so repeated submissions reuse connections. No timeout: a
// submission waits for as long as the transport does.
static CLIENT: Lazy<Client> = Lazy::new(|| {
    ClientBuilder::new()
        .pool_max_idle_per_host(10)
        .build()
        .expect("Failed to build HTTP client")
});

/// Talks to the scan service's `/scan` endpoint.
#[derive(Debug, Clone)]
pub struct ScanClient {
    client: Client,
    endpoint: String,
}

impl ScanClient {
    /// `base_url` is the service origin, e.g. `http://127.0.0.1:8000`.
    pub fn new(base_url: &str) -> Self {
        Self::with_client(CLIENT.clone(), base_url)
    }

    pub fn with_client(client: Client, base_url: &str) -> Self {
        ScanClient {
            client,
            endpoint: format!("{}/scan", base_url.trim_end_matches('/')),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Posts `request` and decodes the reply body as JSON.
    ///
    /// The HTTP status is not checked; only the transport and the body's
    /// syntax can fail the exchange.
    pub async fn start_scan(&self, request: &ScanRequest) -> Result<Value, SubmitError> {
        let response = self.client.post(&self.endpoint).json(request).send().await?;
        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }
}
