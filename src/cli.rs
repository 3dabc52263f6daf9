//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation. Values left unset here fall back to the
//! configuration file and then to built-in defaults.

use clap::Parser;
use std::path::PathBuf;

/// HealthSense - plain-language explanations of lab reports
///
/// Serves the analysis API and the static frontend. Submitted lab reports
/// and health questions are sent to a generative model and returned as a
/// structured, educational answer.
///
/// Examples:
///   healthsense
///   healthsense --port 8080 --static-dir ./public
///   GEMINI_API_KEY=... healthsense --model gemini-1.5-pro
///   healthsense --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Port to listen on
    #[arg(short, long, env = "PORT", value_name = "PORT")]
    pub port: Option<u16>,

    /// Generative model API key
    #[arg(long, env = "GEMINI_API_KEY", value_name = "KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Model to use for analysis
    ///
    /// Defaults to gemini-1.5-flash.
    #[arg(short, long, env = "HEALTHSENSE_MODEL")]
    pub model: Option<String>,

    /// Model API base URL
    #[arg(long, env = "HEALTHSENSE_MODEL_URL", value_name = "URL")]
    pub model_url: Option<String>,

    /// Model call timeout in seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Directory with the frontend's static files
    #[arg(long, value_name = "DIR")]
    pub static_dir: Option<PathBuf>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .healthsense.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (errors only)
    #[arg(short, long)]
    pub quiet: bool,

    /// Generate a default .healthsense.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        if self.init_config {
            return Ok(());
        }

        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if let Some(ref url) = self.model_url {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err("Model URL must start with 'http://' or 'https://'".to_string());
            }
        }

        if self.timeout == Some(0) {
            return Err("Timeout must be at least 1 second".to_string());
        }

        if let Some(ref dir) = self.static_dir {
            if dir.exists() && !dir.is_dir() {
                return Err(format!(
                    "Static path is not a directory: {}",
                    dir.display()
                ));
            }
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}
