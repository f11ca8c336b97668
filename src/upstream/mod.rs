//! Service A upstream module.
//!
//! This module handles:
//! - Resolving the Service A data URL
//! - The JSON payload passed through to the page
//! - The bounded-time HTTP fetch

pub mod address;
pub mod client;
pub mod types;

pub use address::UpstreamAddress;
pub use client::{ServiceAClient, DEFAULT_TIMEOUT};
pub use types::ResponsePayload;
