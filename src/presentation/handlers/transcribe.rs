use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, Uri};
use axum::response::IntoResponse;
use serde::{Deserialize, Serialize};

use crate::presentation::auth_guard::{verify_engine_auth, verify_signed};
use crate::presentation::error::ApiError;
use crate::presentation::state::AppState;

#[derive(Deserialize)]
pub struct TranscribeRequest {
    pub url: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TranscribeResponse {
    pub id: String,
    pub status: &'static str,
    pub submitted_at: String,
    pub estimated_processing_time: u32,
    pub url: String,
}

/// `POST /api/transcribe`: signed scheme. The signature covers the literal
/// wire body, so the body is taken as raw bytes and parsed only after the
/// guard passes.
#[tracing::instrument(skip(state, headers, body))]
pub async fn api_transcribe_handler(
    State(state): State<AppState>,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let api_key = verify_signed(&state, "POST", uri.path(), &headers, &body)?;

    state
        .limiter
        .acquire(&api_key)
        .map_err(|retry_after| ApiError::RateLimited { retry_after })?;

    let request = parse_body(&body)?;
    submit(&state, &request.url).await
}

/// `POST /transcribe`: shared-secret scheme. One shared credential means one
/// rate bucket for the whole family.
#[tracing::instrument(skip(state, headers, body))]
pub async fn transcribe_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    verify_engine_auth(&state, &headers)?;

    state
        .limiter
        .acquire("engine-shared")
        .map_err(|retry_after| ApiError::RateLimited { retry_after })?;

    let request = parse_body(&body)?;
    submit(&state, &request.url).await
}

fn parse_body(body: &[u8]) -> Result<TranscribeRequest, ApiError> {
    serde_json::from_slice(body)
        .map_err(|_| ApiError::InvalidUrl("body must be a JSON object with a url field".to_string()))
}

async fn submit(
    state: &AppState,
    url: &str,
) -> Result<(StatusCode, Json<TranscribeResponse>), ApiError> {
    let job = state.scheduler.submit(url).await?;

    // The 202 body always reads "queued": a cache hit is observable only
    // through polling latency and zero billing, never structurally.
    Ok((
        StatusCode::ACCEPTED,
        Json(TranscribeResponse {
            id: job.id.as_uuid().to_string(),
            status: "queued",
            submitted_at: job.submitted_at.to_rfc3339(),
            estimated_processing_time: job.estimated_processing_secs,
            url: job.source_url,
        }),
    ))
}
