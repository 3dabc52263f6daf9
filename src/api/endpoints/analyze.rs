//! Lab report and health question analysis.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;

use crate::api::error::ApiError;
use crate::api::types::{AnalyzeRequest, AppState};
use crate::error::ValidationError;
use crate::models::StructuredResult;

/// `POST /api/analyze`, body `{"reportText": "..."}`.
///
/// A body that is not JSON, or has no string `reportText`, is treated the
/// same as an empty one.
pub async fn analyze(
    State(state): State<AppState>,
    body: Result<Json<AnalyzeRequest>, JsonRejection>,
) -> Result<Json<StructuredResult>, ApiError> {
    let text = match body {
        Ok(Json(request)) => request.report_text.unwrap_or_default(),
        Err(rejection) if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE => {
            return Err(ApiError::PayloadTooLarge);
        }
        Err(rejection) => {
            tracing::debug!("Unreadable analyze body: {}", rejection.body_text());
            return Err(ApiError::Validation(ValidationError::MissingText));
        }
    };

    let result = state
        .analyzer
        .analyze(&text)
        .await
        .map_err(|e| ApiError::from_analyze(e, state.expose_error_details))?;
    Ok(Json(result))
}
