//! Resolver endpoint: page URL in, media summary out

use axum::{
    Json,
    body::Bytes,
    extract::{RawQuery, State},
    http::HeaderMap,
};
use serde::{Deserialize, Serialize};
use vidrelay_core::Resolution;

use crate::AppState;
use crate::error::ApiResult;
use crate::routes::{query_param, request_context};

/// Successful resolver response
#[derive(Debug, Serialize)]
pub struct ResolveResponse {
    pub ok: bool,
    #[serde(flatten)]
    pub resolution: Resolution,
}

#[derive(Debug, Deserialize)]
struct ResolveBody {
    url: Option<String>,
}

/// `GET /api/resolve?url=...`
pub async fn resolve_get_handler(
    State(state): State<AppState>,
    RawQuery(query): RawQuery,
    headers: HeaderMap,
) -> ApiResult<Json<ResolveResponse>> {
    let url = query_param(query.as_deref(), "url").unwrap_or_default();
    resolve(&state, &url, &headers).await
}

/// `POST /api/resolve` with `url` in the query, a JSON body or a form body
pub async fn resolve_post_handler(
    State(state): State<AppState>,
    RawQuery(query): RawQuery,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<Json<ResolveResponse>> {
    let url = query_param(query.as_deref(), "url")
        .filter(|u| !u.trim().is_empty())
        .or_else(|| url_from_body(&body))
        .unwrap_or_default();
    resolve(&state, &url, &headers).await
}

async fn resolve(state: &AppState, url: &str, headers: &HeaderMap) -> ApiResult<Json<ResolveResponse>> {
    let ctx = request_context(state, headers);
    let resolution = state.resolver.resolve(url, &ctx).await?;

    tracing::info!(
        page = %resolution.page_url,
        raw = %resolution.raw_url,
        kind = resolution.kind.extension(),
        "page resolved"
    );

    Ok(Json(ResolveResponse {
        ok: true,
        resolution,
    }))
}

/// Reads `url` from a JSON object or a form-encoded body
fn url_from_body(body: &[u8]) -> Option<String> {
    if body.is_empty() {
        return None;
    }

    if let Ok(parsed) = serde_json::from_slice::<ResolveBody>(body) {
        return parsed.url;
    }

    let text = std::str::from_utf8(body).ok()?;
    query_param(Some(text.trim()), "url")
}
