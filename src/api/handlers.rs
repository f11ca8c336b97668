//! HTTP API handlers.

use std::fmt;
use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    Json,
};
use metrics_exporter_prometheus::PrometheusHandle;
use serde::Serialize;

use crate::config::Config;
use crate::error::Result;
use crate::upstream::address::SERVICE_A_PORT;
use crate::upstream::{ServiceAClient, UpstreamAddress};
use crate::view::{DataFetchHandler, Templates};

/// Application state shared with handlers.
#[derive(Clone)]
pub struct AppState {
    /// Loaded configuration.
    pub config: Arc<Config>,
    /// Shared Service A client.
    pub client: ServiceAClient,
    /// Page templates.
    pub templates: Arc<Templates>,
    /// Prometheus exporter handle, when a recorder is installed.
    pub prometheus: Option<PrometheusHandle>,
    upstream_port: u16,
}

impl AppState {
    /// Create new app state.
    pub fn new(config: Config, client: ServiceAClient, templates: Templates) -> Self {
        Self {
            config: Arc::new(config),
            client,
            templates: Arc::new(templates),
            prometheus: None,
            upstream_port: SERVICE_A_PORT,
        }
    }

    /// Attach a Prometheus handle for `/metrics`.
    pub fn with_prometheus(mut self, handle: PrometheusHandle) -> Self {
        self.prometheus = Some(handle);
        self
    }

    /// Point at a Service A listening on a non-standard port.
    pub fn with_upstream_port(mut self, port: u16) -> Self {
        self.upstream_port = port;
        self
    }

    /// Resolve the Service A address for one request.
    pub fn upstream_address(&self) -> UpstreamAddress {
        self.config.upstream_address().with_port(self.upstream_port)
    }
}

impl fmt::Debug for AppState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppState")
            .field("config", &self.config)
            .field("client", &self.client)
            .field("prometheus", &self.prometheus.is_some())
            .field("upstream_port", &self.upstream_port)
            .finish_non_exhaustive()
    }
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Status: "ok".
    pub status: &'static str,
}

/// Home page handler - renders Service A data, or an empty list when it is
/// unavailable.
pub async fn home(State(state): State<AppState>) -> Result<Html<String>> {
    let handler = DataFetchHandler::new(state.client.clone(), state.upstream_address());
    let html = handler.render(&state.templates).await?;
    Ok(Html(html))
}

/// Health check handler - always returns 200.
pub async fn health() -> impl IntoResponse {
    Json(HealthResponse { status: "ok" })
}

/// Metrics handler - Prometheus text format, 404 without a recorder.
pub async fn metrics(State(state): State<AppState>) -> Response {
    match &state.prometheus {
        Some(handle) => (
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            handle.render(),
        )
            .into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}
