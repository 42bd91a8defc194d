use axum::extract::{Request, State};
use axum::http::{header, HeaderMap};
use axum::middleware::Next;
use axum::response::Response;
use tracing::warn;

use crate::errors::AppError;
use crate::state::AppState;

pub const API_KEY_HEADER: &str = "x-api-key";

/// Requires the configured shared secret on every request, sent either as
/// `Authorization: Bearer <key>` or as an `x-api-key` header. Open when no
/// key is configured.
pub async fn require_api_key(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    if let Some(expected) = state.config.api_key.as_deref() {
        if !presented_key_matches(request.headers(), expected) {
            warn!("Rejected {} {} - missing or invalid API key", request.method(), request.uri().path());
            return Err(AppError::Unauthorized);
        }
    }
    Ok(next.run(request).await)
}

fn presented_key_matches(headers: &HeaderMap, expected: &str) -> bool {
    let bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));
    let api_key = headers
        .get(API_KEY_HEADER)
        .and_then(|v| v.to_str().ok());

    bearer.or(api_key)
        .map_or(false, |key| constant_time_eq(key.trim().as_bytes(), expected.as_bytes()))
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
