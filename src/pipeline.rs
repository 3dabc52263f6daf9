//! The analysis pipeline.
//!
//! validate -> build prompt -> call model (with deadline) -> interpret ->
//! record. Only the model call suspends; everything else is synchronous.

use crate::analysis;
use crate::error::{AnalyzeError, ExternalServiceError, ValidationError};
use crate::gateway::ModelGateway;
use crate::interpret;
use crate::models::{AnalyticsSnapshot, Interaction, StructuredResult};
use crate::prompt;
use crate::store::InteractionStore;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Limits applied by the pipeline.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Longest accepted input, in characters.
    pub max_text_chars: usize,
    /// Characters of input kept in each interaction.
    pub preview_chars: usize,
    /// Deadline for a single model call.
    pub model_timeout: Duration,
    pub common_tests_limit: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_text_chars: 50_000,
            preview_chars: 500,
            model_timeout: Duration::from_secs(60),
            common_tests_limit: analysis::COMMON_TESTS_LIMIT,
        }
    }
}

/// Runs analyses against an injected model gateway and interaction store.
#[derive(Clone)]
pub struct Analyzer {
    gateway: Arc<dyn ModelGateway>,
    store: Arc<dyn InteractionStore>,
    config: PipelineConfig,
}

impl Analyzer {
    pub fn new(
        gateway: Arc<dyn ModelGateway>,
        store: Arc<dyn InteractionStore>,
        config: PipelineConfig,
    ) -> Self {
        Self {
            gateway,
            store,
            config,
        }
    }

    /// Reject empty or oversized input.
    pub fn validate(&self, text: &str) -> Result<(), ValidationError> {
        if text.is_empty() {
            return Err(ValidationError::MissingText);
        }

        let len = text.chars().count();
        if len > self.config.max_text_chars {
            return Err(ValidationError::TooLong {
                len,
                max: self.config.max_text_chars,
            });
        }

        Ok(())
    }

    /// Analyze `text` and record the interaction.
    ///
    /// Fails only on invalid input or when the model call fails or misses
    /// its deadline. Nothing is recorded in either case.
    pub async fn analyze(&self, text: &str) -> Result<StructuredResult, AnalyzeError> {
        let start = Instant::now();

        if let Err(e) = self.validate(text) {
            if let ValidationError::TooLong { len, max } = &e {
                warn!("Rejected {} character input (limit {})", len, max);
            }
            return Err(e.into());
        }

        let built = prompt::build(text);
        info!(
            "Analyzing {} ({} characters) with {}",
            built.kind,
            text.chars().count(),
            self.gateway.name()
        );

        let raw = self.invoke_with_deadline(&built.text).await?;
        let result = interpret::interpret(&raw, built.kind);

        let elapsed_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);
        self.store
            .record(Interaction::new(
                text,
                result.clone(),
                elapsed_ms,
                self.config.preview_chars,
            ))
            .await?;

        info!("Analysis completed in {}ms", elapsed_ms);
        Ok(result)
    }

    /// Recorded interactions together with their analytics snapshot.
    pub async fn dashboard(&self) -> Result<(Vec<Interaction>, AnalyticsSnapshot), AnalyzeError> {
        let interactions = self.store.all().await?;
        let snapshot =
            analysis::snapshot_with_limit(&interactions, self.config.common_tests_limit);
        Ok((interactions, snapshot))
    }

    async fn invoke_with_deadline(&self, prompt: &str) -> Result<String, ExternalServiceError> {
        let deadline = self.config.model_timeout;

        // Dropping the gateway future on expiry cancels the in-flight request.
        match tokio::time::timeout(deadline, self.gateway.invoke(prompt)).await {
            Ok(reply) => {
                if let Ok(text) = &reply {
                    debug!("Model replied with {} characters", text.chars().count());
                }
                reply
            }
            Err(_) => {
                warn!("Model call exceeded {}s deadline", deadline.as_secs());
                Err(ExternalServiceError::Timeout(deadline))
            }
        }
    }
}
