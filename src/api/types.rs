//! Shared state and wire types for the HTTP layer.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::config::AdminConfig;
use crate::models::{AnalyticsSnapshot, Interaction};
use crate::pipeline::Analyzer;

/// State handed to every handler and to the admin middleware.
#[derive(Clone)]
pub struct AppState {
    pub analyzer: Analyzer,
    pub admin: Arc<AdminConfig>,
    /// Development mode: internal error details are returned to clients.
    pub expose_error_details: bool,
}

impl AppState {
    pub fn new(analyzer: Analyzer, admin: AdminConfig, expose_error_details: bool) -> Self {
        Self {
            analyzer,
            admin: Arc::new(admin),
            expose_error_details,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    #[serde(rename = "reportText", default)]
    pub report_text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub message: &'static str,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub message: &'static str,
}

/// Admin dashboard payload.
#[derive(Debug, Serialize)]
pub struct DashboardResponse {
    pub interactions: Vec<Interaction>,
    pub analytics: AnalyticsSnapshot,
}
