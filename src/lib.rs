//! Service B web front.
//!
//! Renders a home page with data fetched from Service A. When Service A is
//! unreachable, slow, or answers with garbage, the page still renders with an
//! empty item list and the failure is logged.
//!
//! ```text
//! GET /  ->  GET http://{SERVICE_A_HOST}:8000/api/data/  (5s timeout)
//!        ->  home.html with data = payload | {"items": []}
//! ```
//!
//! # Modules
//!
//! - [`config`]: Configuration loading from environment
//! - [`error`]: Error types
//! - [`upstream`]: Service A address, payload, and client
//! - [`view`]: Templates and the home page handler
//! - [`api`]: HTTP routes
//! - [`metrics`]: Prometheus metrics
//! - [`utils`]: Utility functions

pub mod api;
pub mod config;
pub mod error;
pub mod metrics;
pub mod upstream;
pub mod utils;
pub mod view;

pub use config::Config;
pub use error::{AppError, FetchError, Result};
