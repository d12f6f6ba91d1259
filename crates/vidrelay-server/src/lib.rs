//! vidrelay HTTP service
//!
//! Exposes the resolver and the download relay from `vidrelay-core` over
//! HTTP:
//!
//! - `GET|POST /api/resolve?url=<page>` returns a JSON summary with a
//!   `relayUrl`
//! - `GET /api/relay?url=<file>&filename=<name>&referer=<page>` streams the
//!   file back as an attachment
//! - `GET /health`

mod config;
mod error;
mod routes;

use anyhow::{Context, Result};
use axum::{Router, routing::get};
use tower_http::trace::TraceLayer;
use vidrelay_core::{MediaClient, MediaRelay, MediaResolver, RELAY_PATH, RequestContext};

pub use config::Config;
pub use error::{ApiError, ApiResult, ErrorBody};
pub use routes::{health_handler, relay_handler, resolve_get_handler, resolve_post_handler};

/// Path the resolver endpoint is served under
pub const RESOLVE_PATH: &str = "/api/resolve";

/// Shared, read-only application state
#[derive(Debug, Clone)]
pub struct AppState {
    pub resolver: MediaResolver,
    pub relay: MediaRelay,
    /// Fixed origin for relay links, when configured
    pub public_base: Option<RequestContext>,
}

impl AppState {
    /// Builds the state from configuration
    pub fn from_config(config: &Config) -> Result<Self> {
        let client = MediaClient::with_config(config.client_config())
            .context("Failed to build HTTP client")?;
        let public_base = config
            .public_base_url
            .as_deref()
            .map(RequestContext::from_base_url)
            .transpose()
            .context("PUBLIC_BASE_URL must be an absolute URL")?;

        Ok(Self {
            resolver: MediaResolver::with_client(client.clone())
                .enforce_host_allowlist(config.enforce_host_allowlist),
            relay: MediaRelay::with_client(client),
            public_base,
        })
    }
}

/// Build the Axum application router
pub fn build_app(state: AppState) -> Router {
    Router::new()
        .route(RESOLVE_PATH, get(resolve_get_handler).post(resolve_post_handler))
        .route(RELAY_PATH, get(relay_handler))
        .route("/health", get(health_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
