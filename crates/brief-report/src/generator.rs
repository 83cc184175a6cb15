//! Retrying report generation

use crate::digest::{SYSTEM_PROMPT, build_prompt, frame_report};
use crate::error::Result;
use crate::{ChatModel, CompletionRequest};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Generation settings for the report model
#[derive(Debug, Clone)]
pub struct ReportConfig {
    /// Model identifier passed to the backend
    pub model: String,

    /// Maximum tokens for the report body
    pub max_tokens: usize,

    /// Sampling temperature
    pub temperature: f32,

    /// Total attempts before giving up
    pub max_attempts: u32,

    /// Base delay for the linear retry backoff
    pub backoff_base: Duration,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".to_string(),
            max_tokens: 3000,
            temperature: 0.7,
            max_attempts: 3,
            backoff_base: Duration::from_secs(2),
        }
    }
}

/// Turns a digest into a framed narrative report, retrying transient
/// model failures with linearly increasing backoff
pub struct ReportGenerator {
    model: Arc<dyn ChatModel>,
    config: ReportConfig,
}

impl ReportGenerator {
    /// Create a generator over a chat backend
    pub fn new(model: Arc<dyn ChatModel>, config: ReportConfig) -> Self {
        Self { model, config }
    }

    /// Generate the full report for a digest, framed with header and footer
    pub async fn generate(&self, digest: &str, date: &str) -> Result<String> {
        let request = CompletionRequest::new(&self.config.model, build_prompt(digest, date))
            .with_system(SYSTEM_PROMPT)
            .with_max_tokens(self.config.max_tokens)
            .with_temperature(self.config.temperature);

        let mut last_error = None;
        for attempt in 1..=self.config.max_attempts {
            if attempt > 1 {
                let delay = self.config.backoff_base * (attempt - 1);
                warn!(attempt, delay_secs = delay.as_secs(), "retrying report generation");
                tokio::time::sleep(delay).await;
            }

            match self.model.complete(request.clone()).await {
                Ok(response) => {
                    info!(
                        backend = self.model.name(),
                        attempt,
                        output_tokens = response.usage.output_tokens,
                        "report generated"
                    );
                    return Ok(frame_report(&response.text, date));
                }
                Err(err) => {
                    warn!(attempt, error = %err, "report generation attempt failed");
                    last_error = Some(err);
                }
            }
        }

        // max_attempts >= 1, so at least one error was recorded
        Err(last_error.unwrap_or_else(|| {
            crate::ReportError::RequestFailed("no generation attempts were made".to_string())
        }))
    }
}
