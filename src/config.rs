//! Configuration file handling.
//!
//! This module handles loading `.healthsense.toml` and merging it with
//! command-line arguments and environment variables.

use crate::gateway::GatewayConfig;
use crate::pipeline::PipelineConfig;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default configuration file name, looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = ".healthsense.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Generative model settings.
    #[serde(default)]
    pub model: ModelConfig,

    /// Dashboard credentials.
    #[serde(default)]
    pub admin: AdminConfig,

    /// Input and analytics limits.
    #[serde(default)]
    pub limits: LimitsConfig,
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_port")]
    pub port: u16,

    /// Directory served for non-API paths.
    #[serde(default = "default_static_dir")]
    pub static_dir: PathBuf,

    /// Largest accepted request body.
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,

    /// Include internal error details in 500 responses (development only).
    #[serde(default)]
    pub expose_error_details: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            static_dir: default_static_dir(),
            max_body_bytes: default_max_body_bytes(),
            expose_error_details: false,
        }
    }
}

fn default_port() -> u16 {
    3001
}

fn default_static_dir() -> PathBuf {
    PathBuf::from("public")
}

fn default_max_body_bytes() -> usize {
    10 * 1024 * 1024 // 10MB
}

/// Generative model settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Model name.
    #[serde(default = "default_model")]
    pub name: String,

    /// API base URL.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Service credential. Usually supplied via `GEMINI_API_KEY` instead.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Deadline for a single model call.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            name: default_model(),
            base_url: default_base_url(),
            api_key: None,
            timeout_seconds: default_timeout(),
        }
    }
}

fn default_model() -> String {
    "gemini-1.5-flash".to_string()
}

fn default_base_url() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}

fn default_timeout() -> u64 {
    60
}

/// Dashboard credentials.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminConfig {
    #[serde(default = "default_admin_username")]
    pub username: String,

    #[serde(default = "default_admin_password")]
    pub password: String,

    /// Bearer token handed out on login.
    #[serde(default = "default_admin_token")]
    pub token: String,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            username: default_admin_username(),
            password: default_admin_password(),
            token: default_admin_token(),
        }
    }
}

fn default_admin_username() -> String {
    "admin".to_string()
}

fn default_admin_password() -> String {
    "health123".to_string()
}

fn default_admin_token() -> String {
    "secure-token-12345".to_string()
}

/// Input and analytics limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LimitsConfig {
    /// Longest accepted input, in characters.
    #[serde(default = "default_max_text_chars")]
    pub max_text_chars: usize,

    /// Characters of input kept per interaction.
    #[serde(default = "default_preview_chars")]
    pub preview_chars: usize,

    /// Entries in the most-common-tests ranking.
    #[serde(default = "default_common_tests_limit")]
    pub common_tests_limit: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_text_chars: default_max_text_chars(),
            preview_chars: default_preview_chars(),
            common_tests_limit: default_common_tests_limit(),
        }
    }
}

fn default_max_text_chars() -> usize {
    50_000
}

fn default_preview_chars() -> usize {
    500
}

fn default_common_tests_limit() -> usize {
    5
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        let default_path = Path::new(DEFAULT_CONFIG_FILE);

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// Only values the CLI (or its environment variables) actually provide
    /// override the file.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(port) = args.port {
            self.server.port = port;
        }
        if let Some(ref dir) = args.static_dir {
            self.server.static_dir = dir.clone();
        }
        if let Some(ref key) = args.api_key {
            self.model.api_key = Some(key.clone());
        }
        if let Some(ref model) = args.model {
            self.model.name = model.clone();
        }
        if let Some(ref url) = args.model_url {
            self.model.base_url = url.clone();
        }
        if let Some(timeout) = args.timeout {
            self.model.timeout_seconds = timeout;
        }
    }

    /// Whether a usable model credential is configured.
    pub fn has_api_key(&self) -> bool {
        self.model
            .api_key
            .as_deref()
            .is_some_and(|k| !k.trim().is_empty())
    }

    /// Whether the dashboard still uses the built-in credentials.
    pub fn uses_default_admin_credentials(&self) -> bool {
        let defaults = AdminConfig::default();
        self.admin.password == defaults.password || self.admin.token == defaults.token
    }

    pub fn gateway_config(&self) -> GatewayConfig {
        GatewayConfig {
            base_url: self.model.base_url.clone(),
            model: self.model.name.clone(),
            api_key: self.model.api_key.clone(),
            timeout_seconds: self.model.timeout_seconds,
        }
    }

    pub fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig {
            max_text_chars: self.limits.max_text_chars,
            preview_chars: self.limits.preview_chars,
            model_timeout: Duration::from_secs(self.model.timeout_seconds),
            common_tests_limit: self.limits.common_tests_limit,
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}
