//! Gateway to the external text-generation service.
//!
//! The pipeline depends only on the [`ModelGateway`] trait. The default
//! implementation talks to a `generateContent`-style endpoint.

pub mod gemini;

pub use gemini::{GatewayConfig, GeminiGateway};

use crate::error::ExternalServiceError;
use async_trait::async_trait;

/// Sends a single prompt and returns the model's raw text reply.
///
/// Implementations make exactly one attempt per call. The returned text
/// is passed through untouched; interpreting it is not their job.
#[async_trait]
pub trait ModelGateway: Send + Sync {
    async fn invoke(&self, prompt: &str) -> Result<String, ExternalServiceError>;

    /// Short label for logs.
    fn name(&self) -> &str {
        "model"
    }
}
