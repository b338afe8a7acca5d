use std::time::Duration;

use axum::Json;
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::application::services::SchedulerError;

/// Machine-readable error envelope: every failure carries a code and a
/// human-readable message, and no error ever rides on HTTP 200.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: &'static str,
    pub message: String,
}

#[derive(Debug)]
pub enum ApiError {
    InvalidUrl(String),
    Unauthorized,
    RateLimited { retry_after: Duration },
    JobNotFound(String),
    Internal(String),
}

impl ApiError {
    fn code(&self) -> &'static str {
        match self {
            ApiError::InvalidUrl(_) => "invalid_url",
            ApiError::Unauthorized => "unauthorized",
            ApiError::RateLimited { .. } => "rate_limited",
            ApiError::JobNotFound(_) => "job_not_found",
            ApiError::Internal(_) => "internal",
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidUrl(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            ApiError::JobNotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn message(&self) -> String {
        match self {
            ApiError::InvalidUrl(reason) => format!("URL rejected: {}", reason),
            // Deliberately uniform: no hint about which check failed.
            ApiError::Unauthorized => "request authentication failed".to_string(),
            ApiError::RateLimited { retry_after } => format!(
                "rate limit exceeded, retry in {}s",
                retry_after.as_secs().max(1)
            ),
            ApiError::JobNotFound(id) => format!("no job with id {}", id),
            ApiError::Internal(reason) => reason.clone(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code(),
                message: self.message(),
            },
        };

        let mut response = (self.status(), Json(body)).into_response();

        if let ApiError::RateLimited { retry_after } = self {
            let secs = retry_after.as_secs().max(1);
            if let Ok(value) = HeaderValue::from_str(&secs.to_string()) {
                response.headers_mut().insert(header::RETRY_AFTER, value);
            }
        }

        response
    }
}

impl From<SchedulerError> for ApiError {
    fn from(e: SchedulerError) -> Self {
        match e {
            SchedulerError::InvalidUrl(e) => ApiError::InvalidUrl(e.to_string()),
            SchedulerError::NotFound(id) => ApiError::JobNotFound(id),
            SchedulerError::Store(e) => {
                tracing::error!(error = %e, "Store failure surfaced to API");
                ApiError::Internal("persistence failure".to_string())
            }
        }
    }
}
