use axum::http::HeaderMap;
use chrono::Utc;

use crate::infrastructure::auth::shared_secret_matches;

use super::error::ApiError;
use super::state::AppState;

pub const API_KEY_HEADER: &str = "X-API-Key";
pub const TIMESTAMP_HEADER: &str = "X-Timestamp";
pub const SIGNATURE_HEADER: &str = "X-Signature";
pub const ENGINE_AUTH_HEADER: &str = "X-Engine-Auth";

/// Guard for the signed endpoint family. Verifies the HMAC over the literal
/// wire body and returns the authenticated API key for rate limiting.
/// Every failure collapses to `unauthorized`; no partial trust.
pub fn verify_signed(
    state: &AppState,
    method: &str,
    path: &str,
    headers: &HeaderMap,
    body: &[u8],
) -> Result<String, ApiError> {
    let api_key = header_str(headers, API_KEY_HEADER)?;
    let timestamp: i64 = header_str(headers, TIMESTAMP_HEADER)?
        .parse()
        .map_err(|_| unauthorized(TIMESTAMP_HEADER, "malformed timestamp header"))?;
    let signature = header_str(headers, SIGNATURE_HEADER)?;

    let secret = state
        .credentials
        .get(api_key)
        .ok_or_else(|| unauthorized(api_key, "unknown api key"))?;

    state
        .verifier
        .verify(
            method,
            path,
            body,
            timestamp,
            signature,
            secret,
            Utc::now().timestamp_millis(),
        )
        .map_err(|e| {
            tracing::warn!(error = %e, "Signed request rejected");
            ApiError::Unauthorized
        })?;

    Ok(api_key.to_string())
}

/// Guard for the shared-secret endpoint family.
pub fn verify_engine_auth(state: &AppState, headers: &HeaderMap) -> Result<(), ApiError> {
    let presented = header_str(headers, ENGINE_AUTH_HEADER)?;
    if shared_secret_matches(presented, &state.engine_secret) {
        Ok(())
    } else {
        tracing::warn!("Engine auth secret mismatch");
        Err(ApiError::Unauthorized)
    }
}

fn header_str<'a>(headers: &'a HeaderMap, name: &'static str) -> Result<&'a str, ApiError> {
    headers
        .get(name)
        .ok_or_else(|| unauthorized(name, "missing header"))?
        .to_str()
        .map_err(|_| unauthorized(name, "non-ascii header"))
}

fn unauthorized(context: &str, reason: &str) -> ApiError {
    // Context stays in the log, never in the response body.
    tracing::warn!(context = %context, reason = %reason, "Authentication rejected");
    ApiError::Unauthorized
}
