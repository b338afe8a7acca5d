use axum::Json;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::IntoResponse;
use serde::Serialize;

use crate::application::services::{JobStatusView, project};
use crate::domain::JobStatus;
use crate::presentation::auth_guard::verify_engine_auth;
use crate::presentation::error::ApiError;
use crate::presentation::state::AppState;

#[derive(Serialize)]
pub struct JobListResponse {
    pub jobs: Vec<JobStatusView>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueStatusResponse {
    pub queued: u64,
    pub processing: u64,
    pub completed: u64,
    pub failed: u64,
    pub cancelled: u64,
    /// Jobs sitting in the handoff channel, not yet picked up by the runner.
    pub channel_depth: usize,
}

/// `GET /jobs`: operational listing of every known job.
#[tracing::instrument(skip(state, headers))]
pub async fn jobs_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    verify_engine_auth(&state, &headers)?;

    let jobs = state
        .store
        .list()
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    Ok(Json(JobListResponse {
        jobs: jobs.iter().map(project).collect(),
    }))
}

/// `GET /jobs/failed`: only failed jobs, newest first.
#[tracing::instrument(skip(state, headers))]
pub async fn failed_jobs_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    verify_engine_auth(&state, &headers)?;

    let jobs = state
        .store
        .list_by_status(JobStatus::Failed)
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    Ok(Json(JobListResponse {
        jobs: jobs.iter().map(project).collect(),
    }))
}

/// `GET /queue/status`: per-status counts plus handoff channel depth.
#[tracing::instrument(skip(state, headers))]
pub async fn queue_status_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    verify_engine_auth(&state, &headers)?;

    let counts = state
        .store
        .counts()
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    let channel_depth = state
        .queue_sender
        .max_capacity()
        .saturating_sub(state.queue_sender.capacity());

    Ok(Json(QueueStatusResponse {
        queued: counts.queued,
        processing: counts.processing,
        completed: counts.completed,
        failed: counts.failed,
        cancelled: counts.cancelled,
        channel_depth,
    }))
}
