//! API error types with JSON responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::error::{AnalyzeError, ValidationError};

const INTERNAL_ERROR: &str = "Internal server error";
const INTERNAL_DETAILS: &str = "Something went wrong";

/// Error response body. `details` is only present on 500s.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// API-level errors with HTTP status mapping.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Failed to analyze report: {0}")]
    AnalysisFailed(String),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Request body too large")]
    PayloadTooLarge,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Unauthorized. Valid token required.")]
    Unauthorized,

    #[error("{0}")]
    NotFound(&'static str),

    /// `expose` decides whether `detail` reaches the client.
    #[error("Internal error: {detail}")]
    Internal { detail: String, expose: bool },
}

impl ApiError {
    pub fn internal(detail: impl Into<String>, expose: bool) -> Self {
        ApiError::Internal {
            detail: detail.into(),
            expose,
        }
    }

    /// Maps a failed analyze request. Model failures carry their short
    /// diagnostic; store failures are internal and follow `expose`.
    pub fn from_analyze(err: AnalyzeError, expose: bool) -> Self {
        match err {
            AnalyzeError::Validation(e) => ApiError::Validation(e),
            AnalyzeError::ExternalService(e) => ApiError::AnalysisFailed(e.to_string()),
            AnalyzeError::Store(e) => ApiError::internal(e.to_string(), expose),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error, details) = match self {
            ApiError::Validation(e) => (StatusCode::BAD_REQUEST, e.to_string(), None),
            ApiError::AnalysisFailed(detail) => {
                tracing::error!(%detail, "Analysis failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed to analyze report".to_string(),
                    Some(detail),
                )
            }
            ApiError::BadRequest(message) => (StatusCode::BAD_REQUEST, message, None),
            ApiError::PayloadTooLarge => (
                StatusCode::PAYLOAD_TOO_LARGE,
                "Request body too large".to_string(),
                None,
            ),
            ApiError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                "Invalid credentials".to_string(),
                None,
            ),
            ApiError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "Unauthorized. Valid token required.".to_string(),
                None,
            ),
            ApiError::NotFound(message) => (StatusCode::NOT_FOUND, message.to_string(), None),
            ApiError::Internal { detail, expose } => {
                tracing::error!(%detail, "API internal error");
                let details = if expose {
                    detail
                } else {
                    INTERNAL_DETAILS.to_string()
                };
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    INTERNAL_ERROR.to_string(),
                    Some(details),
                )
            }
        };

        (status, Json(ErrorBody { error, details })).into_response()
    }
}
