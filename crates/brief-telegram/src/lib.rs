//! Chunked, failure-tolerant Telegram delivery
//!
//! A report of any length is split into provider-size-bounded segments and
//! sent strictly in order. Markup rejections are recovered locally with one
//! plain-text resend; everything else is a hard failure for the run.

pub mod channel;
pub mod error;
pub mod split;

// Re-export main types for convenience
pub use channel::{
    DeliveryChannel, MESSAGE_CEILING, MessageSink, ParseMode, SEGMENT_DELAY, TelegramApi,
    strip_markup,
};
pub use error::{DeliveryError, Result};
pub use split::split_message;
