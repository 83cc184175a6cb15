//! Chat completion request and response types
//!
//! Text-only subset: one system prompt, one user prompt, one assistant
//! reply. Tool calls and multi-turn state have no place in this pipeline.

/// A single completion request
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    /// Model identifier (e.g. "gpt-4o-mini")
    pub model: String,

    /// Optional system prompt
    pub system: Option<String>,

    /// The user prompt
    pub prompt: String,

    /// Maximum tokens to generate
    pub max_tokens: usize,

    /// Sampling temperature
    pub temperature: Option<f32>,
}

impl CompletionRequest {
    /// Create a request with default generation settings
    pub fn new(model: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            system: None,
            prompt: prompt.into(),
            max_tokens: 3000,
            temperature: Some(0.7),
        }
    }

    /// Set the system prompt
    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    /// Set the maximum number of generated tokens
    pub fn with_max_tokens(mut self, max_tokens: usize) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Set the sampling temperature
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }
}

/// Token accounting for one completion
#[derive(Debug, Clone, Copy, Default)]
pub struct TokenUsage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

/// The assistant's reply
#[derive(Debug, Clone)]
pub struct CompletionResponse {
    /// Generated text
    pub text: String,

    /// Token usage reported by the provider
    pub usage: TokenUsage,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_builder() {
        let request = CompletionRequest::new("gpt-4o-mini", "hello")
            .with_system("be brief")
            .with_max_tokens(100)
            .with_temperature(0.2);

        assert_eq!(request.model, "gpt-4o-mini");
        assert_eq!(request.system.as_deref(), Some("be brief"));
        assert_eq!(request.max_tokens, 100);
        assert_eq!(request.temperature, Some(0.2));
    }
}
