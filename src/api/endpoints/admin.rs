//! Admin login and dashboard.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;

use crate::api::auth::secure_eq;
use crate::api::error::ApiError;
use crate::api::types::{AppState, DashboardResponse, LoginRequest, LoginResponse};
use crate::report::{self, DashboardReport};

/// `POST /api/admin/login`
pub async fn login(
    State(state): State<AppState>,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, ApiError> {
    let (username, password) = match body {
        Ok(Json(LoginRequest {
            username: Some(username),
            password: Some(password),
        })) if !username.is_empty() && !password.is_empty() => (username, password),
        _ => {
            return Err(ApiError::BadRequest(
                "Username and password are required".to_string(),
            ))
        }
    };

    // Evaluate both so timing does not reveal which one matched.
    let user_ok = secure_eq(&username, &state.admin.username);
    let pass_ok = secure_eq(&password, &state.admin.password);

    if !(user_ok & pass_ok) {
        tracing::warn!("Failed admin login attempt");
        return Err(ApiError::InvalidCredentials);
    }

    tracing::info!("Admin logged in");
    Ok(Json(LoginResponse {
        token: state.admin.token.clone(),
        message: "Login successful",
    }))
}

/// `GET /api/admin/interactions`
pub async fn interactions(
    State(state): State<AppState>,
) -> Result<Json<DashboardResponse>, ApiError> {
    let (interactions, analytics) = state
        .analyzer
        .dashboard()
        .await
        .map_err(|e| ApiError::internal(e.to_string(), state.expose_error_details))?;

    Ok(Json(DashboardResponse {
        interactions,
        analytics,
    }))
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    #[default]
    Markdown,
    Json,
}

#[derive(Debug, Default, Deserialize)]
pub struct ReportQuery {
    #[serde(default)]
    pub format: ReportFormat,
}

/// `GET /api/admin/report?format=markdown|json`
pub async fn report(
    State(state): State<AppState>,
    query: Result<Query<ReportQuery>, QueryRejection>,
) -> Result<Response, ApiError> {
    let Query(query) =
        query.map_err(|_| ApiError::BadRequest("Unsupported report format".to_string()))?;

    let (interactions, analytics) = state
        .analyzer
        .dashboard()
        .await
        .map_err(|e| ApiError::internal(e.to_string(), state.expose_error_details))?;
    let dashboard = DashboardReport::new(&analytics, &interactions);

    let response = match query.format {
        ReportFormat::Markdown => (
            [(header::CONTENT_TYPE, "text/markdown; charset=utf-8")],
            report::generate_markdown_report(&dashboard),
        )
            .into_response(),
        ReportFormat::Json => {
            let body = report::generate_json_report(&dashboard)
                .map_err(|e| ApiError::internal(e.to_string(), state.expose_error_details))?;
            ([(header::CONTENT_TYPE, "application/json")], body).into_response()
        }
    };

    Ok(response)
}
