//! Unified error types for the web app.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use tracing::error;

/// Unified error type for startup and page rendering.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration loading error.
    #[error("configuration error: {0}")]
    Config(#[from] envy::Error),

    /// Configuration loaded but failed validation.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Template loading or rendering error.
    #[error("template error: {0}")]
    Template(#[from] tera::Error),

    /// HTTP client construction error.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        error!("Request failed: {}", self);
        (StatusCode::INTERNAL_SERVER_ERROR, "internal server error").into_response()
    }
}

/// Ways a single fetch from Service A can fail.
///
/// All variants are handled the same way by the page handler.
#[derive(Error, Debug)]
pub enum FetchError {
    /// Connection refused, DNS failure or timeout.
    #[error("request to {url} failed: {source}")]
    Network {
        /// Requested URL.
        url: String,
        /// Underlying client error.
        #[source]
        source: reqwest::Error,
    },

    /// Upstream answered with a non-2xx status.
    #[error("{url} returned HTTP {status}")]
    UpstreamStatus {
        /// Requested URL.
        url: String,
        /// Status received.
        status: reqwest::StatusCode,
    },

    /// Body is not a JSON object.
    #[error("malformed response body from {url}: {reason}")]
    MalformedBody {
        /// Requested URL.
        url: String,
        /// Parser message.
        reason: String,
    },
}

impl FetchError {
    /// Stable label for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Network { source, .. } if source.is_timeout() => "timeout",
            Self::Network { .. } => "network",
            Self::UpstreamStatus { .. } => "upstream_status",
            Self::MalformedBody { .. } => "malformed_body",
        }
    }

    /// Whether the fetch ran out of time.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Network { source, .. } if source.is_timeout())
    }
}

/// Convenient Result type alias.
pub type Result<T> = std::result::Result<T, AppError>;
