use axum::Router;
use axum::middleware;
use axum::routing::{delete, get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::infrastructure::observability::request_id_middleware;
use crate::presentation::handlers::{
    api_transcribe_handler, cancel_handler, failed_jobs_handler, health_handler, jobs_handler,
    queue_status_handler, status_handler, transcribe_handler, version_handler,
};
use crate::presentation::state::AppState;

pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_response(DefaultOnResponse::new().level(Level::INFO));

    Router::new()
        .route("/health", get(health_handler))
        .route("/version", get(version_handler))
        // Shared-secret family.
        .route("/transcribe", post(transcribe_handler))
        .route("/transcribe/{id}", delete(cancel_handler))
        // Signed family.
        .route("/api/transcribe", post(api_transcribe_handler))
        .route("/status/{id}", get(status_handler))
        // Operational surface.
        .route("/jobs", get(jobs_handler))
        .route("/jobs/failed", get(failed_jobs_handler))
        .route("/queue/status", get(queue_status_handler))
        .layer(middleware::from_fn(request_id_middleware))
        .layer(trace_layer)
        .layer(cors)
        .with_state(state)
}
