use axum::extract::{MatchedPath, Request};
use axum::http::HeaderValue;
use axum::middleware::Next;
use axum::response::Response;
use tracing::Instrument;
use uuid::Uuid;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Correlation id for one HTTP exchange, echoed back in the response so a
/// caller can tie a submission to its later status polls in the logs.
#[derive(Clone, Debug)]
pub struct RequestId(pub String);

/// A client-supplied id is kept only when it is short printable ASCII;
/// anything else gets replaced with a generated one.
fn usable_client_id(value: &str) -> bool {
    !value.is_empty() && value.len() <= 64 && value.bytes().all(|b| b.is_ascii_graphic())
}

pub async fn request_id_middleware(mut request: Request, next: Next) -> Response {
    let request_id = request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|v| usable_client_id(v))
        .map(String::from)
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    // The route pattern, not the concrete path: keeps job ids out of the
    // span so log aggregation groups by endpoint.
    let route = request
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_owned())
        .unwrap_or_else(|| request.uri().path().to_owned());

    let span = tracing::info_span!(
        "http_exchange",
        request_id = %request_id,
        method = %request.method(),
        route = %route,
    );

    request
        .extensions_mut()
        .insert(RequestId(request_id.clone()));

    let mut response = next.run(request).instrument(span).await;

    if let Ok(header_value) = HeaderValue::from_str(&request_id) {
        response
            .headers_mut()
            .insert(REQUEST_ID_HEADER, header_value);
    }

    response
}
