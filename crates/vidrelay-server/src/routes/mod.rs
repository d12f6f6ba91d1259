mod health;
mod relay;
mod resolve;

pub use health::health_handler;
pub use relay::relay_handler;
pub use resolve::{resolve_get_handler, resolve_post_handler};

use axum::http::HeaderMap;
use vidrelay_core::RequestContext;

use crate::AppState;

/// First value of `key` in a raw query string
///
/// Never fails: undecodable input just yields no value, so every handler
/// reports a missing parameter through its own JSON error.
pub(crate) fn query_param(raw: Option<&str>, key: &str) -> Option<String> {
    let raw = raw?;
    url::form_urlencoded::parse(raw.as_bytes())
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.into_owned())
}

/// Origin relay links point at for this request
pub(crate) fn request_context(state: &AppState, headers: &HeaderMap) -> RequestContext {
    if let Some(ctx) = &state.public_base {
        return ctx.clone();
    }

    let header = |name: &str| headers.get(name).and_then(|v| v.to_str().ok());
    RequestContext::from_headers(header("x-forwarded-proto"), header("host"))
}
