//! Ordered, failure-tolerant report delivery
//!
//! Segments go out strictly in order with a fixed inter-segment delay. A
//! segment whose HTML markup is rejected by the channel is resent once with
//! all tags stripped; any other send failure is a hard failure for the run.

use crate::error::{DeliveryError, Result};
use crate::split::split_message;
use async_trait::async_trait;
use regex::Regex;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::{Arc, LazyLock};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{info, warn};

/// Telegram's hard per-message limit is 4096 chars; staying under it
/// leaves room for the part marker
pub const MESSAGE_CEILING: usize = 3800;

/// Delay between consecutive segment sends
pub const SEGMENT_DELAY: Duration = Duration::from_millis(1200);

static TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]+>").expect("tag pattern is valid"));

/// Remove all markup tags, keeping the inner text
pub fn strip_markup(text: &str) -> String {
    TAG_RE.replace_all(text, "").into_owned()
}

/// How a payload should be interpreted by the channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseMode {
    Html,
    Plain,
}

/// A message endpoint that can deliver one payload
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessageSink: Send + Sync {
    /// Send one payload, returning the channel's message id
    async fn send(&self, text: &str, mode: ParseMode) -> Result<i64>;
}

/// Telegram Bot API sendMessage client
pub struct TelegramApi {
    client: Client,
    token: String,
    chat_id: String,
}

#[derive(Debug, Serialize)]
struct SendMessageBody<'a> {
    chat_id: &'a str,
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    parse_mode: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct SendMessageResponse {
    ok: bool,
    result: Option<Value>,
    error_code: Option<i64>,
    description: Option<String>,
}

impl TelegramApi {
    /// Create a client for one bot token and chat target
    pub fn new(token: impl Into<String>, chat_id: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            token: token.into(),
            chat_id: chat_id.into(),
        }
    }
}

#[async_trait]
impl MessageSink for TelegramApi {
    async fn send(&self, text: &str, mode: ParseMode) -> Result<i64> {
        let url = format!("https://api.telegram.org/bot{}/sendMessage", self.token);
        let body = SendMessageBody {
            chat_id: &self.chat_id,
            text,
            parse_mode: match mode {
                ParseMode::Html => Some("HTML"),
                ParseMode::Plain => None,
            },
        };

        let response = self.client.post(&url).json(&body).send().await?;
        let parsed: SendMessageResponse = response
            .json()
            .await
            .map_err(|e| DeliveryError::UnexpectedResponse(e.to_string()))?;

        if !parsed.ok {
            let description = parsed.description.unwrap_or_else(|| "unknown".to_string());
            // A 400 with an entity-parse description means the markup, not
            // the message, was the problem
            if description.contains("can't parse entities") {
                return Err(DeliveryError::MarkupRejected(description));
            }
            return Err(DeliveryError::SendFailed {
                code: parsed.error_code,
                description,
            });
        }

        parsed
            .result
            .as_ref()
            .and_then(|r| r.get("message_id"))
            .and_then(Value::as_i64)
            .ok_or_else(|| {
                DeliveryError::UnexpectedResponse("missing message_id in result".to_string())
            })
    }
}

/// Splits a report into segments and delivers them in order
pub struct DeliveryChannel {
    sink: Arc<dyn MessageSink>,
    ceiling: usize,
    segment_delay: Duration,
}

impl DeliveryChannel {
    /// Create a channel over a message sink with default sizing
    pub fn new(sink: Arc<dyn MessageSink>) -> Self {
        Self::with_limits(sink, MESSAGE_CEILING, SEGMENT_DELAY)
    }

    /// Create a channel with explicit ceiling and inter-segment delay
    pub fn with_limits(sink: Arc<dyn MessageSink>, ceiling: usize, segment_delay: Duration) -> Self {
        Self {
            sink,
            ceiling,
            segment_delay,
        }
    }

    /// Deliver a full report, returning the message id of every segment
    pub async fn send_report(&self, text: &str) -> Result<Vec<i64>> {
        let segments = split_message(text, self.ceiling);
        let total = segments.len();
        info!(segments = total, "delivering report");

        let mut message_ids = Vec::with_capacity(total);
        for (i, segment) in segments.iter().enumerate() {
            if i > 0 {
                sleep(self.segment_delay).await;
            }

            let payload = if total > 1 {
                format!("{segment}\n\n<i>part {}/{total}</i>", i + 1)
            } else {
                segment.clone()
            };

            message_ids.push(self.send_segment(&payload).await?);
        }

        Ok(message_ids)
    }

    /// Send a short plain notification as a single segment
    pub async fn send_notification(&self, text: &str) -> Result<i64> {
        let mut end = text.len().min(self.ceiling);
        while end > 0 && !text.is_char_boundary(end) {
            end -= 1;
        }
        self.sink.send(&text[..end], ParseMode::Plain).await
    }

    /// One segment through the send state machine: HTML first, one plain
    /// retry when the markup is rejected
    async fn send_segment(&self, payload: &str) -> Result<i64> {
        match self.sink.send(payload, ParseMode::Html).await {
            Ok(id) => Ok(id),
            Err(DeliveryError::MarkupRejected(description)) => {
                warn!(%description, "markup rejected, resending as plain text");
                self.sink.send(&strip_markup(payload), ParseMode::Plain).await
            }
            Err(err) => Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Sink that records every send and answers from a scripted queue
    struct RecordingSink {
        sent: Mutex<Vec<(String, ParseMode)>>,
        failures: Mutex<Vec<DeliveryError>>,
    }

    impl RecordingSink {
        fn new() -> Self {
            Self {
                sent: Mutex::new(Vec::new()),
                failures: Mutex::new(Vec::new()),
            }
        }

        fn failing_first(errors: Vec<DeliveryError>) -> Self {
            Self {
                sent: Mutex::new(Vec::new()),
                failures: Mutex::new(errors),
            }
        }

        fn sent(&self) -> Vec<(String, ParseMode)> {
            self.sent.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl MessageSink for RecordingSink {
        async fn send(&self, text: &str, mode: ParseMode) -> Result<i64> {
            self.sent.lock().unwrap().push((text.to_string(), mode));
            let mut failures = self.failures.lock().unwrap();
            if failures.is_empty() {
                Ok(self.sent.lock().unwrap().len() as i64)
            } else {
                Err(failures.remove(0))
            }
        }
    }

    fn channel(sink: Arc<RecordingSink>) -> DeliveryChannel {
        DeliveryChannel::with_limits(sink, 100, Duration::ZERO)
    }

    #[test]
    fn test_strip_markup() {
        assert_eq!(
            strip_markup("<b>bold</b> and <i>italic</i>"),
            "bold and italic"
        );
        assert_eq!(strip_markup("no tags"), "no tags");
    }

    #[tokio::test]
    async fn test_single_segment_has_no_part_marker() {
        let sink = Arc::new(RecordingSink::new());
        let ids = channel(sink.clone()).send_report("short report").await.unwrap();

        assert_eq!(ids.len(), 1);
        let sent = sink.sent();
        assert_eq!(sent[0].0, "short report");
        assert_eq!(sent[0].1, ParseMode::Html);
    }

    #[tokio::test]
    async fn test_multi_segment_ordering_and_markers() {
        let text = format!("{}\n\n{}", "a".repeat(80), "b".repeat(80));
        let sink = Arc::new(RecordingSink::new());
        let ids = channel(sink.clone()).send_report(&text).await.unwrap();

        assert_eq!(ids, vec![1, 2]);
        let sent = sink.sent();
        assert!(sent[0].0.contains("part 1/2"));
        assert!(sent[1].0.contains("part 2/2"));
        assert!(sent[0].0.starts_with('a'));
        assert!(sent[1].0.starts_with('b'));
    }

    #[tokio::test]
    async fn test_markup_rejection_resends_plain_once() {
        let sink = Arc::new(RecordingSink::failing_first(vec![
            DeliveryError::MarkupRejected("can't parse entities".to_string()),
        ]));
        let ids = channel(sink.clone())
            .send_report("<b>broken <markup</b>")
            .await
            .unwrap();

        assert_eq!(ids.len(), 1);
        let sent = sink.sent();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].1, ParseMode::Html);
        assert_eq!(sent[1].1, ParseMode::Plain);
        assert!(!sent[1].0.contains("<b>"));
    }

    #[tokio::test]
    async fn test_plain_retry_failure_is_hard() {
        let sink = Arc::new(RecordingSink::failing_first(vec![
            DeliveryError::MarkupRejected("can't parse entities".to_string()),
            DeliveryError::SendFailed {
                code: Some(400),
                description: "still bad".to_string(),
            },
        ]));
        let result = channel(sink.clone()).send_report("<b>x</b>").await;

        assert!(result.is_err());
        assert_eq!(sink.sent().len(), 2);
    }

    #[tokio::test]
    async fn test_other_failure_propagates_without_retry() {
        let sink = Arc::new(RecordingSink::failing_first(vec![DeliveryError::SendFailed {
            code: Some(403),
            description: "bot was blocked".to_string(),
        }]));
        let result = channel(sink.clone()).send_report("hello").await;

        assert!(matches!(result, Err(DeliveryError::SendFailed { .. })));
        assert_eq!(sink.sent().len(), 1);
    }

    #[tokio::test]
    async fn test_notification_is_plain_and_bounded() {
        let sink = Arc::new(RecordingSink::new());
        let long = "n".repeat(500);
        channel(sink.clone()).send_notification(&long).await.unwrap();

        let sent = sink.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].1, ParseMode::Plain);
        assert_eq!(sent[0].0.len(), 100);
    }

    #[test]
    fn test_telegram_error_mapping() {
        let body = r#"{"ok": false, "error_code": 400, "description": "Bad Request: can't parse entities: unclosed tag"}"#;
        let parsed: SendMessageResponse = serde_json::from_str(body).unwrap();
        assert!(!parsed.ok);
        assert!(parsed.description.unwrap().contains("can't parse entities"));
        assert_eq!(parsed.error_code, Some(400));
    }

    #[test]
    fn test_telegram_success_payload() {
        let body = r#"{"ok": true, "result": {"message_id": 42, "chat": {"id": 1}}}"#;
        let parsed: SendMessageResponse = serde_json::from_str(body).unwrap();
        assert!(parsed.ok);
        assert_eq!(
            parsed.result.unwrap().get("message_id").unwrap().as_i64(),
            Some(42)
        );
    }
}
