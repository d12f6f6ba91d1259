//! Relay endpoint: remote file in, forced download out

use axum::{
    body::Body,
    extract::{RawQuery, State},
    http::{StatusCode, header},
    response::Response,
};
use vidrelay_core::{RelayRequest, VidrelayError};

use crate::AppState;
use crate::error::ApiResult;
use crate::routes::query_param;

/// `GET /api/relay?url=...&filename=...&referer=...`
///
/// The upstream body is streamed through chunk by chunk.
pub async fn relay_handler(
    State(state): State<AppState>,
    RawQuery(query): RawQuery,
) -> ApiResult<Response> {
    let query = query.as_deref();
    let request = RelayRequest::from_params(
        query_param(query, "url").as_deref(),
        query_param(query, "filename").as_deref(),
        query_param(query, "referer").as_deref(),
    )?;

    let stream = state.relay.open(&request).await?;
    tracing::info!(
        url = %request.target,
        filename = %stream.filename,
        content_length = ?stream.content_length,
        "relaying"
    );

    let mut builder = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, stream.content_type.as_str())
        .header(header::CONTENT_DISPOSITION, stream.content_disposition())
        .header(header::ACCESS_CONTROL_ALLOW_ORIGIN, "*");
    if let Some(len) = stream.content_length {
        builder = builder.header(header::CONTENT_LENGTH, len);
    }

    let response = builder
        .body(Body::from_stream(stream.into_stream()))
        .map_err(|e| VidrelayError::Internal(format!("failed to build response: {}", e)))?;
    Ok(response)
}
