//! HTTP client for the Service A data endpoint.

use std::time::{Duration, Instant};

use serde_json::Value;
use tracing::{debug, instrument};

use crate::error::FetchError;
use crate::metrics;

use super::address::UpstreamAddress;
use super::types::ResponsePayload;

/// Time allowed for one fetch, connect through body.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Service A client. Cheap to clone; clones share the connection pool.
#[derive(Debug, Clone)]
pub struct ServiceAClient {
    /// HTTP client for API requests.
    http: reqwest::Client,
    /// Per-request timeout.
    timeout: Duration,
}

impl ServiceAClient {
    /// Create a client whose requests time out after `timeout`.
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { http, timeout })
    }

    /// Create a client with [`DEFAULT_TIMEOUT`].
    pub fn with_default_timeout() -> Result<Self, reqwest::Error> {
        Self::new(DEFAULT_TIMEOUT)
    }

    /// Per-request timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Fetch the data payload once. No retries.
    #[instrument(skip(self, address), fields(url = %address))]
    pub async fn fetch(&self, address: &UpstreamAddress) -> Result<ResponsePayload, FetchError> {
        let url = address.url();
        let start = Instant::now();

        let result = self.fetch_inner(&url).await;
        metrics::record_fetch_latency(start);

        match &result {
            Ok(payload) => debug!(
                "Fetched {} top-level keys from Service A in {:.1}ms",
                payload.as_map().len(),
                start.elapsed().as_secs_f64() * 1000.0
            ),
            Err(e) => metrics::inc_fetch_failures(e.kind()),
        }

        result
    }

    async fn fetch_inner(&self, url: &str) -> Result<ResponsePayload, FetchError> {
        let network = |source| FetchError::Network {
            url: url.to_string(),
            source,
        };

        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(network)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::UpstreamStatus {
                url: url.to_string(),
                status,
            });
        }

        let body = response.bytes().await.map_err(network)?;

        match serde_json::from_slice::<Value>(&body) {
            Ok(Value::Object(map)) => Ok(ResponsePayload::new(map)),
            Ok(other) => Err(FetchError::MalformedBody {
                url: url.to_string(),
                reason: format!("expected a JSON object, got {}", json_type_name(&other)),
            }),
            Err(e) => Err(FetchError::MalformedBody {
                url: url.to_string(),
                reason: e.to_string(),
            }),
        }
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
