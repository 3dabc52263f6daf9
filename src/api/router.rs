//! HTTP router.
//!
//! API routes live under `/api/`. Admin routes sit behind the bearer token
//! middleware. Any other path is served from the static directory, and
//! misses there get a JSON 404.

use std::path::Path;

use axum::extract::DefaultBodyLimit;
use axum::handler::HandlerWithoutStateExt;
use axum::http::Uri;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;

use crate::api::auth;
use crate::api::endpoints;
use crate::api::error::ApiError;
use crate::api::types::AppState;

/// Build the application router.
pub fn build_router(state: AppState, static_dir: &Path, max_body_bytes: usize) -> Router {
    let admin = Router::new()
        .route("/api/admin/interactions", get(endpoints::admin::interactions))
        .route("/api/admin/report", get(endpoints::admin::report))
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            auth::require_admin,
        ));

    let static_files = ServeDir::new(static_dir)
        .call_fallback_on_method_not_allowed(true)
        .not_found_service(not_found.into_service());

    Router::new()
        .route("/api/health", get(endpoints::health::check))
        .route("/api/analyze", post(endpoints::analyze::analyze))
        .route("/api/admin/login", post(endpoints::admin::login))
        .merge(admin)
        .fallback_service(static_files)
        .with_state(state)
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .layer(CorsLayer::permissive())
}

async fn not_found(uri: Uri) -> ApiError {
    if uri.path().starts_with("/api/") {
        ApiError::NotFound("Endpoint not found")
    } else {
        ApiError::NotFound("Not found")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AdminConfig;
    use crate::pipeline::test_support::ScriptedGateway;
    use crate::pipeline::{Analyzer, PipelineConfig};
    use crate::models::Interaction;
    use crate::store::{InteractionStore, MemoryStore, StoreError};
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use axum::response::Response;
    use std::sync::Arc;
    use tower::ServiceExt;

    const REPLY: &str = r#"```json
{"summary": "Cholesterol is a little high.", "explanations": [{"test_name": "LDL", "result": "160 mg/dL", "reference_range": "<100 mg/dL", "status": "High", "explanation": "Bad cholesterol", "interpretation": "Above target"}], "key_findings": ["LDL high"], "recommendations": ["See your doctor"], "disclaimer": "Educational only."}
```"#;

    const TOKEN: &str = "secure-token-12345";

    fn app_with(gateway: ScriptedGateway, static_dir: &Path) -> (Router, Arc<ScriptedGateway>) {
        let gateway = Arc::new(gateway);
        let analyzer = Analyzer::new(
            gateway.clone(),
            Arc::new(MemoryStore::new()),
            PipelineConfig::default(),
        );
        let state = AppState::new(analyzer, AdminConfig::default(), false);
        (build_router(state, static_dir, 10 * 1024 * 1024), gateway)
    }

    fn app() -> (Router, Arc<ScriptedGateway>) {
        app_with(
            ScriptedGateway::replying(REPLY),
            Path::new("does-not-exist"),
        )
    }

    fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get_with_token(uri: &str, token: &str) -> Request<Body> {
        Request::builder()
            .uri(uri)
            .header(header::AUTHORIZATION, format!("Bearer {}", token))
            .body(Body::empty())
            .unwrap()
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let body = to_bytes(response.into_body(), 1024 * 1024).await.unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    fn lab_report() -> String {
        "Lipid panel: LDL 160 mg/dL (<100), HDL 45 mg/dL (>40), Triglycerides 140 mg/dL (<150)\n"
            .repeat(3)
    }

    #[tokio::test]
    async fn health_reports_ok() {
        let (app, _) = app();
        let response = app
            .oneshot(Request::builder().uri("/api/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["status"], "OK");
        assert_eq!(json["message"], "HealthSense Backend is running");
    }

    #[tokio::test]
    async fn analyze_returns_structured_result() {
        let (app, gateway) = app();
        let response = app
            .oneshot(post_json(
                "/api/analyze",
                serde_json::json!({ "reportText": lab_report() }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["summary"], "Cholesterol is a little high.");
        assert_eq!(json["explanations"][0]["test_name"], "LDL");
        assert_eq!(json["explanations"][0]["status"], "High");
        assert_eq!(gateway.call_count(), 1);
    }

    #[tokio::test]
    async fn analyze_without_report_text_is_rejected() {
        let (app, gateway) = app();
        let response = app
            .oneshot(post_json("/api/analyze", serde_json::json!({})))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert_eq!(json["error"], "Missing reportText in request body");
        assert_eq!(gateway.call_count(), 0);
    }

    #[tokio::test]
    async fn analyze_with_non_json_body_is_rejected() {
        let (app, _) = app();
        let request = Request::builder()
            .method("POST")
            .uri("/api/analyze")
            .body(Body::from("reportText=hello"))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert_eq!(json["error"], "Missing reportText in request body");
    }

    #[tokio::test]
    async fn analyze_rejects_oversized_report() {
        let (app, gateway) = app();
        let response = app
            .oneshot(post_json(
                "/api/analyze",
                serde_json::json!({ "reportText": "a".repeat(50_001) }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert_eq!(
            json["error"],
            "Report text too long. Maximum 50,000 characters allowed."
        );
        assert_eq!(gateway.call_count(), 0);
    }

    #[tokio::test]
    async fn analyze_reports_model_failure_as_500() {
        let (app, _) = app_with(ScriptedGateway::failing(429), Path::new("does-not-exist"));
        let response = app
            .oneshot(post_json(
                "/api/analyze",
                serde_json::json!({ "reportText": lab_report() }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json = body_json(response).await;
        assert_eq!(json["error"], "Failed to analyze report");
        assert_eq!(json["details"], "Model API error: 429");
    }

    struct BrokenStore;

    #[async_trait::async_trait]
    impl InteractionStore for BrokenStore {
        async fn record(&self, _interaction: Interaction) -> Result<(), StoreError> {
            Err(StoreError::LockPoisoned)
        }

        async fn all(&self) -> Result<Vec<Interaction>, StoreError> {
            Err(StoreError::LockPoisoned)
        }
    }

    #[tokio::test]
    async fn store_failure_does_not_leak_details() {
        let analyzer = Analyzer::new(
            Arc::new(ScriptedGateway::replying(REPLY)),
            Arc::new(BrokenStore),
            PipelineConfig::default(),
        );
        let state = AppState::new(analyzer, AdminConfig::default(), false);
        let app = build_router(state, Path::new("does-not-exist"), 1024 * 1024);

        let response = app
            .oneshot(post_json(
                "/api/analyze",
                serde_json::json!({ "reportText": lab_report() }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json = body_json(response).await;
        assert_eq!(json["error"], "Internal server error");
        assert_eq!(json["details"], "Something went wrong");
    }

    #[tokio::test]
    async fn login_returns_token() {
        let (app, _) = app();
        let response = app
            .oneshot(post_json(
                "/api/admin/login",
                serde_json::json!({ "username": "admin", "password": "health123" }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["token"], TOKEN);
        assert_eq!(json["message"], "Login successful");
    }

    #[tokio::test]
    async fn login_rejects_wrong_password() {
        let (app, _) = app();
        let response = app
            .oneshot(post_json(
                "/api/admin/login",
                serde_json::json!({ "username": "admin", "password": "guess" }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let json = body_json(response).await;
        assert_eq!(json["error"], "Invalid credentials");
    }

    #[tokio::test]
    async fn login_requires_both_fields() {
        let (app, _) = app();
        let response = app
            .oneshot(post_json(
                "/api/admin/login",
                serde_json::json!({ "username": "admin" }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert_eq!(json["error"], "Username and password are required");
    }

    #[tokio::test]
    async fn interactions_require_token() {
        let (app, _) = app();

        let missing = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/api/admin/interactions")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(missing.status(), StatusCode::UNAUTHORIZED);
        let json = body_json(missing).await;
        assert_eq!(json["error"], "Unauthorized. Valid token required.");

        let wrong = app
            .oneshot(get_with_token("/api/admin/interactions", "nope"))
            .await
            .unwrap();
        assert_eq!(wrong.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn interactions_include_recorded_analyses() {
        let (app, _) = app();

        let analyzed = app
            .clone()
            .oneshot(post_json(
                "/api/analyze",
                serde_json::json!({ "reportText": lab_report() }),
            ))
            .await
            .unwrap();
        assert_eq!(analyzed.status(), StatusCode::OK);

        let response = app
            .oneshot(get_with_token("/api/admin/interactions", TOKEN))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["interactions"].as_array().unwrap().len(), 1);
        assert_eq!(json["interactions"][0]["reportTextPreview"], lab_report());
        assert_eq!(json["analytics"]["totalReports"], 1);
        assert_eq!(json["analytics"]["commonTests"][0]["test"], "LDL");
        assert_eq!(json["analytics"]["commonTests"][0]["count"], 1);
    }

    #[tokio::test]
    async fn empty_dashboard_has_zero_analytics() {
        let (app, _) = app();
        let response = app
            .oneshot(get_with_token("/api/admin/interactions", TOKEN))
            .await
            .unwrap();

        let json = body_json(response).await;
        assert_eq!(json["interactions"], serde_json::json!([]));
        assert_eq!(json["analytics"]["totalReports"], 0);
        assert_eq!(json["analytics"]["commonTests"], serde_json::json!([]));
        assert_eq!(json["analytics"]["avgProcessingTime"], 0);
    }

    #[tokio::test]
    async fn report_defaults_to_markdown() {
        let (app, _) = app();
        let response = app
            .oneshot(get_with_token("/api/admin/report", TOKEN))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "text/markdown; charset=utf-8"
        );
        let body = to_bytes(response.into_body(), 1024 * 1024).await.unwrap();
        let text = String::from_utf8(body.to_vec()).unwrap();
        assert!(text.starts_with("# HealthSense Dashboard Report"));
    }

    #[tokio::test]
    async fn report_as_json() {
        let (app, _) = app();
        let response = app
            .oneshot(get_with_token("/api/admin/report?format=json", TOKEN))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["analytics"]["totalReports"], 0);
    }

    #[tokio::test]
    async fn report_rejects_unknown_format() {
        let (app, _) = app();
        let response = app
            .oneshot(get_with_token("/api/admin/report?format=pdf", TOKEN))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn unknown_api_route_is_json_404() {
        let (app, _) = app();
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/does-not-exist")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let json = body_json(response).await;
        assert_eq!(json["error"], "Endpoint not found");
    }

    #[tokio::test]
    async fn static_files_are_served() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("index.html"), "<h1>HealthSense</h1>").unwrap();
        let (app, _) = app_with(ScriptedGateway::replying(REPLY), dir.path());

        let response = app
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), 1024).await.unwrap();
        assert_eq!(&body[..], b"<h1>HealthSense</h1>");
    }

    #[tokio::test]
    async fn cors_allows_any_origin() {
        let (app, _) = app();
        let request = Request::builder()
            .uri("/api/health")
            .header(header::ORIGIN, "http://localhost:5173")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
    }
}
