//! Client for the Generative Language `generateContent` API.

use super::ModelGateway;
use crate::error::ExternalServiceError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error};

/// Connection settings for the generative model API.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub base_url: String,
    pub model: String,
    pub api_key: Option<String>,
    pub timeout_seconds: u64,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            base_url: "https://generativelanguage.googleapis.com".to_string(),
            model: "gemini-1.5-flash".to_string(),
            api_key: None,
            timeout_seconds: 60,
        }
    }
}

/// `generateContent` request body: one turn, one part.
#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    contents: [RequestContent<'a>; 1],
}

#[derive(Debug, Serialize)]
struct RequestContent<'a> {
    parts: [RequestPart<'a>; 1],
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
}

impl GenerateResponse {
    /// Text of the first part of the first candidate, if present.
    fn into_first_text(self) -> Option<String> {
        self.candidates
            .into_iter()
            .next()?
            .content?
            .parts
            .into_iter()
            .next()?
            .text
    }
}

/// [`ModelGateway`] backed by the Generative Language REST API.
pub struct GeminiGateway {
    config: GatewayConfig,
    http_client: reqwest::Client,
}

impl GeminiGateway {
    pub fn new(config: GatewayConfig) -> Result<Self, ExternalServiceError> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| ExternalServiceError::Transport(e.to_string()))?;

        Ok(Self {
            config,
            http_client,
        })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            self.config.model
        )
    }
}

#[async_trait]
impl ModelGateway for GeminiGateway {
    async fn invoke(&self, prompt: &str) -> Result<String, ExternalServiceError> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or(ExternalServiceError::MissingCredential)?;

        let request = GenerateRequest {
            contents: [RequestContent {
                parts: [RequestPart { text: prompt }],
            }],
        };

        debug!(
            "Sending {} character prompt to {}",
            prompt.chars().count(),
            self.config.model
        );

        let response = self
            .http_client
            .post(self.endpoint())
            .query(&[("key", api_key)])
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ExternalServiceError::Timeout(Duration::from_secs(self.config.timeout_seconds))
                } else if e.is_connect() {
                    ExternalServiceError::Transport(format!(
                        "cannot connect to {}",
                        self.config.base_url
                    ))
                } else {
                    ExternalServiceError::Transport(e.without_url().to_string())
                }
            })?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            error!("Model API error {}: {}", status, body);
            return Err(ExternalServiceError::Status { status, body });
        }

        let generated: GenerateResponse = response.json().await.map_err(|e| {
            error!("Model API returned an unreadable body: {}", e.without_url());
            ExternalServiceError::Malformed
        })?;

        generated
            .into_first_text()
            .ok_or(ExternalServiceError::Malformed)
    }

    fn name(&self) -> &str {
        &self.config.model
    }
}
