//! Bearer token check for the admin routes.
//!
//! Expects `Authorization: Bearer <token>` with the configured admin token.

use axum::extract::{Request, State};
use axum::http::header::AUTHORIZATION;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use subtle::ConstantTimeEq;

use crate::api::error::ApiError;
use crate::api::types::AppState;

/// Reject the request unless it carries the admin bearer token.
pub async fn require_admin(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let token = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));

    match token {
        Some(token) if secure_eq(token, &state.admin.token) => next.run(req).await,
        _ => {
            tracing::warn!("Rejected admin request without a valid token");
            ApiError::Unauthorized.into_response()
        }
    }
}

/// Constant-time string comparison.
pub fn secure_eq(provided: &str, expected: &str) -> bool {
    provided.as_bytes().ct_eq(expected.as_bytes()).into()
}
