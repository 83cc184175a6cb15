//! Chat model trait definition

use crate::{CompletionRequest, CompletionResponse, Result};
use async_trait::async_trait;

/// Trait for chat completion backends
///
/// Implementations provide access to an LLM service; the pipeline treats
/// the model as a black box that turns a digest prompt into prose.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Generate a completion for the request
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse>;

    /// Get the backend name (e.g. "openai")
    fn name(&self) -> &str;
}
