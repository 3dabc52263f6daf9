//! HealthSense - educational lab report explainer
//!
//! An HTTP service that turns pasted lab reports and general health
//! questions into structured, plain-language explanations using a
//! generative language model, and keeps an in-memory log of every
//! analysis for the admin dashboard.
//!
//! Exit codes:
//!   0 - Clean shutdown
//!   1 - Startup error (bad arguments, config, bind failure, etc.)

mod analysis;
mod api;
mod cli;
mod config;
mod error;
mod gateway;
mod interpret;
mod models;
mod pipeline;
mod prompt;
mod report;
mod store;

use anyhow::{Context, Result};
use cli::Args;
use config::{Config, DEFAULT_CONFIG_FILE};
use gateway::GeminiGateway;
use pipeline::Analyzer;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use store::MemoryStore;
use tokio::net::TcpListener;
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    init_logging(&args)?;

    info!("HealthSense v{}", env!("CARGO_PKG_VERSION"));

    if let Err(e) = run_server(args).await {
        error!("Server failed: {:#}", e);
        eprintln!("\n❌ Error: {:#}", e);
        std::process::exit(1);
    }

    Ok(())
}

/// Handle --init-config: generate a default .healthsense.toml.
fn handle_init_config() -> Result<()> {
    let path = Path::new(DEFAULT_CONFIG_FILE);

    if path.exists() {
        eprintln!(
            "⚠️  {} already exists. Remove it first or edit it manually.",
            DEFAULT_CONFIG_FILE
        );
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content)
        .with_context(|| format!("Failed to write {}", DEFAULT_CONFIG_FILE))?;

    println!("✅ Created {} with default settings.", DEFAULT_CONFIG_FILE);
    println!("   Change the [admin] credentials before exposing the dashboard.");
    Ok(())
}

/// Initialize logging based on verbosity settings.
fn init_logging(args: &Args) -> Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(args.log_level())
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")
}

/// Build the pipeline and serve HTTP until Ctrl+C.
async fn run_server(args: Args) -> Result<()> {
    let mut config = load_config(&args)?;
    config.merge_with_args(&args);

    if !config.has_api_key() {
        warn!("GEMINI_API_KEY is not set; analyze requests will fail until a key is configured");
    }
    if config.uses_default_admin_credentials() {
        warn!(
            "Admin dashboard is using the built-in credentials; set [admin] in {}",
            DEFAULT_CONFIG_FILE
        );
    }
    if !config.server.static_dir.is_dir() {
        warn!(
            "Static directory {} not found; only the API will be served",
            config.server.static_dir.display()
        );
    }
    if config.server.expose_error_details {
        warn!("Internal error details will be returned to clients");
    }

    let gateway =
        GeminiGateway::new(config.gateway_config()).context("Failed to create model client")?;
    let analyzer = Analyzer::new(
        Arc::new(gateway),
        Arc::new(MemoryStore::new()),
        config.pipeline_config(),
    );

    let state = api::AppState::new(
        analyzer,
        config.admin.clone(),
        config.server.expose_error_details,
    );
    let app = api::build_router(
        state,
        &config.server.static_dir,
        config.server.max_body_bytes,
    );

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    if !args.quiet {
        println!("🩺 HealthSense backend running on port {}", config.server.port);
        println!("   Model: {}", config.model.name);
        println!("   Timeout: {}s", config.model.timeout_seconds);
        println!(
            "   Health check: http://localhost:{}/api/health",
            config.server.port
        );
    }
    info!("Listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;

    info!("Server stopped");
    Ok(())
}

/// Resolves on Ctrl+C.
async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received"),
        Err(e) => {
            warn!("Failed to listen for shutdown signal: {}", e);
            std::future::pending::<()>().await;
        }
    }
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<Config> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        info!("Loading config from: {}", config_path.display());
        return Config::load(config_path);
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => {
            info!("Loaded default config from {}", DEFAULT_CONFIG_FILE);
            Ok(config)
        }
        Ok(None) => {
            debug!("No config file found, using defaults");
            Ok(Config::default())
        }
        Err(e) => {
            warn!("Failed to load config: {:#}", e);
            Ok(Config::default())
        }
    }
}
