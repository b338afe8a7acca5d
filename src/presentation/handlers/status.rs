use axum::Json;
use axum::extract::{Path, State};
use axum::response::IntoResponse;
use uuid::Uuid;

use crate::application::services::project;
use crate::domain::JobId;
use crate::presentation::error::ApiError;
use crate::presentation::state::AppState;

/// `GET /status/{id}`. An unparseable id is treated the same as an unknown
/// one: the caller learns only that no such job exists.
#[tracing::instrument(skip(state))]
pub async fn status_handler(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let uuid = Uuid::parse_str(&job_id).map_err(|_| ApiError::JobNotFound(job_id.clone()))?;

    let job = state
        .scheduler
        .job(JobId::from_uuid(uuid))
        .await?
        .ok_or(ApiError::JobNotFound(job_id))?;

    Ok(Json(project(&job)))
}
