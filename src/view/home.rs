//! Home page: fetch from Service A, fall back to empty data, render.

use serde::Serialize;
use tera::Context;
use tracing::{error, instrument};

use crate::error::Result;
use crate::metrics;
use crate::upstream::{ResponsePayload, ServiceAClient, UpstreamAddress};

use super::templates::{Templates, HOME_TEMPLATE};

/// Variables available to `home.html`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HomeContext {
    /// Service A payload, or the fallback.
    pub data: ResponsePayload,
}

impl HomeContext {
    /// Convert into a tera context.
    ///
    /// Besides `data`, `items` holds `data.items` when it is an array and is
    /// empty otherwise, so templates can loop without checking its shape.
    pub fn to_tera(&self) -> Context {
        let mut context = Context::new();
        context.insert("data", &self.data);
        context.insert("items", self.data.items().map_or(&[][..], Vec::as_slice));
        context
    }
}

/// Handles one home page request.
///
/// Built per request; holds no state between requests.
#[derive(Debug, Clone)]
pub struct DataFetchHandler {
    client: ServiceAClient,
    address: UpstreamAddress,
}

impl DataFetchHandler {
    /// Create a handler fetching from `address`.
    pub fn new(client: ServiceAClient, address: UpstreamAddress) -> Self {
        Self { client, address }
    }

    /// Fetch the payload. Any failure is logged and replaced with
    /// `{"items": []}`.
    #[instrument(skip(self), fields(url = %self.address))]
    pub async fn load(&self) -> ResponsePayload {
        match self.client.fetch(&self.address).await {
            Ok(payload) => payload,
            Err(e) => {
                error!("Error connecting to Service A: {}", e);
                ResponsePayload::fallback()
            }
        }
    }

    /// Build the render context.
    pub async fn context(&self) -> HomeContext {
        HomeContext {
            data: self.load().await,
        }
    }

    /// Render `home.html`.
    ///
    /// If the fetched payload cannot be rendered, the page is rendered again
    /// with the fallback payload. Only a template that fails on the fallback
    /// too is returned as an error.
    pub async fn render(&self, templates: &Templates) -> Result<String> {
        let context = self.context().await;

        let html = match templates.render(HOME_TEMPLATE, &context.to_tera()) {
            Ok(html) => html,
            Err(e) if context.data != ResponsePayload::fallback() => {
                error!("Failed to render Service A data, rendering empty page: {}", e);
                let fallback = HomeContext {
                    data: ResponsePayload::fallback(),
                };
                templates.render(HOME_TEMPLATE, &fallback.to_tera())?
            }
            Err(e) => return Err(e),
        };

        metrics::inc_home_renders();
        Ok(html)
    }
}
