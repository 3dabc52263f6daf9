//! Liveness check.

use axum::Json;

use crate::api::types::HealthResponse;

/// `GET /api/health`
pub async fn check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "OK",
        message: "HealthSense Backend is running",
    })
}
