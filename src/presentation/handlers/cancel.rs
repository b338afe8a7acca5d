use axum::Json;
use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::response::IntoResponse;
use uuid::Uuid;

use crate::application::services::project;
use crate::domain::JobId;
use crate::presentation::auth_guard::verify_engine_auth;
use crate::presentation::error::ApiError;
use crate::presentation::state::AppState;

/// `DELETE /transcribe/{id}`. Cancelling a terminal job is a no-op; the
/// response carries the job's projection either way.
#[tracing::instrument(skip(state, headers))]
pub async fn cancel_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(job_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    verify_engine_auth(&state, &headers)?;

    let uuid = Uuid::parse_str(&job_id).map_err(|_| ApiError::JobNotFound(job_id.clone()))?;
    let job = state.scheduler.cancel(JobId::from_uuid(uuid)).await?;

    Ok(Json(project(&job)))
}
