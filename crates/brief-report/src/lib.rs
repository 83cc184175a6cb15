//! Narrative report generation
//!
//! Turns a structured market digest into a long-form Telegram-HTML report
//! through an OpenAI-compatible chat backend. The backend is a black box to
//! the pipeline: transient failures are retried with linearly increasing
//! backoff, exhaustion surfaces as a run failure.

pub mod completion;
pub mod digest;
pub mod error;
pub mod generator;
pub mod model;
pub mod openai;

// Re-export main types for convenience
pub use completion::{CompletionRequest, CompletionResponse, TokenUsage};
pub use digest::{build_prompt, frame_report, render_digest};
pub use error::{ReportError, Result};
pub use generator::{ReportConfig, ReportGenerator};
pub use model::ChatModel;
pub use openai::{OpenAiConfig, OpenAiModel};
