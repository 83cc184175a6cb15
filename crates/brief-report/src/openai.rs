//! OpenAI-compatible chat completion backend
//!
//! Works against api.openai.com and any OpenAI-compatible deployment
//! through a custom base URL.

use crate::error::{ReportError, Result};
use crate::{ChatModel, CompletionRequest, CompletionResponse, TokenUsage};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, instrument};

const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";
const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Configuration for the OpenAI backend
#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    /// API key for authentication
    pub api_key: String,

    /// Base URL (default: "https://api.openai.com/v1")
    pub api_base: String,

    /// Request timeout in seconds (default: 120)
    pub timeout_secs: u64,
}

impl OpenAiConfig {
    /// Create a new config with the given API key and default settings
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_base: DEFAULT_API_BASE.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Create config from environment
    ///
    /// Reads the API key from `OPENAI_API_KEY`, and the base URL from
    /// `OPENAI_API_BASE` if set.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("OPENAI_API_KEY").map_err(|_| {
            ReportError::ConfigurationError("OPENAI_API_KEY environment variable not set".to_string())
        })?;

        let api_base =
            std::env::var("OPENAI_API_BASE").unwrap_or_else(|_| DEFAULT_API_BASE.to_string());

        Ok(Self {
            api_key,
            api_base,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        })
    }

    /// Set a custom API base URL
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    /// Set the request timeout in seconds
    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }
}

/// OpenAI-compatible chat backend
pub struct OpenAiModel {
    client: Client,
    config: OpenAiConfig,
}

impl OpenAiModel {
    /// Create a backend with custom configuration
    pub fn with_config(config: OpenAiConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { client, config })
    }

    /// Create a backend with an API key and default settings
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::with_config(OpenAiConfig::new(api_key))
    }

    /// Create a backend from environment variables
    pub fn from_env() -> Result<Self> {
        Self::with_config(OpenAiConfig::from_env()?)
    }

    /// Get the current configuration
    pub fn config(&self) -> &OpenAiConfig {
        &self.config
    }
}

#[async_trait]
impl ChatModel for OpenAiModel {
    #[instrument(skip(self, request), fields(model = %request.model, api_base = %self.config.api_base))]
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse> {
        debug!("Sending request to chat completions API");

        let mut messages = Vec::new();
        if let Some(system) = &request.system {
            messages.push(WireMessage {
                role: "system",
                content: system.clone(),
            });
        }
        messages.push(WireMessage {
            role: "user",
            content: request.prompt.clone(),
        });

        let wire_request = WireRequest {
            model: request.model.clone(),
            messages,
            max_tokens: request.max_tokens,
            temperature: request.temperature,
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.config.api_base))
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .header("Content-Type", "application/json")
            .json(&wire_request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await?;

            return Err(match status.as_u16() {
                401 => ReportError::AuthenticationFailed,
                429 => ReportError::RateLimitExceeded(error_text),
                400 => ReportError::InvalidRequest(error_text),
                _ => ReportError::RequestFailed(format!("HTTP {status}: {error_text}")),
            });
        }

        let wire_response: WireResponse = response.json().await.map_err(|e| {
            ReportError::UnexpectedResponse(format!("Failed to parse response: {e}"))
        })?;

        let choice = wire_response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| ReportError::UnexpectedResponse("No choices in response".to_string()))?;

        let usage = wire_response.usage.unwrap_or_default();
        debug!(
            "Received response - finish_reason: {}, tokens: {}/{}",
            choice.finish_reason.as_deref().unwrap_or("unknown"),
            usage.prompt_tokens,
            usage.completion_tokens
        );

        Ok(CompletionResponse {
            text: choice.message.content.unwrap_or_default(),
            usage: TokenUsage {
                input_tokens: usage.prompt_tokens,
                output_tokens: usage.completion_tokens,
            },
        })
    }

    fn name(&self) -> &'static str {
        "openai"
    }
}

// ============================================================================
// Wire types
// ============================================================================

#[derive(Debug, Serialize)]
struct WireRequest {
    model: String,
    messages: Vec<WireMessage>,
    max_tokens: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Serialize)]
struct WireMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct WireResponse {
    choices: Vec<WireChoice>,
    usage: Option<WireUsage>,
}

#[derive(Debug, Deserialize)]
struct WireChoice {
    message: WireResponseMessage,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct WireUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
}
