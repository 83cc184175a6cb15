//! The daily brief pipeline
//!
//! Snapshot, aggregate, generate, deliver. Every run ends in exactly one of
//! three ways: a fully delivered report, an abort before generation when no
//! data could be fetched, or a failure with a best-effort notification.

use anyhow::{Context, Result};
use brief_market::{SnapshotBuilder, aggregate};
use brief_report::{ReportGenerator, render_digest};
use brief_telegram::DeliveryChannel;
use chrono::Utc;
use tracing::{error, info, warn};

/// How a run ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// Report fully delivered; carries one message id per segment
    Delivered { message_ids: Vec<i64> },
    /// Zero usable quotes across the universe; aborted before generation
    AbortedNoData,
}

/// One wired-up instance of the daily brief
pub struct DailyBrief {
    snapshot: SnapshotBuilder,
    generator: ReportGenerator,
    delivery: DeliveryChannel,
}

impl DailyBrief {
    /// Assemble the pipeline from its three stages
    pub fn new(
        snapshot: SnapshotBuilder,
        generator: ReportGenerator,
        delivery: DeliveryChannel,
    ) -> Self {
        Self {
            snapshot,
            generator,
            delivery,
        }
    }

    /// Execute one full run
    pub async fn run(&self) -> Result<RunOutcome> {
        info!("starting daily brief run");

        let snapshot = self.snapshot.build().await;
        if snapshot.is_empty() {
            error!("no usable quotes from any provider, aborting run");
            self.notify_best_effort(
                "⚠️ Daily brief aborted: no market data could be fetched from any provider.",
            )
            .await;
            return Ok(RunOutcome::AbortedNoData);
        }

        let aggregation = aggregate(&snapshot, Utc::now());
        let digest = render_digest(&snapshot, &aggregation);
        let date = snapshot.taken_at.format("%Y-%m-%d").to_string();

        let report = match self.generator.generate(&digest, &date).await {
            Ok(report) => report,
            Err(err) => {
                self.notify_best_effort(&format!(
                    "⚠️ Daily brief failed: report generation error:\n{err}"
                ))
                .await;
                return Err(err).context("report generation failed");
            }
        };

        match self.delivery.send_report(&report).await {
            Ok(message_ids) => {
                info!(segments = message_ids.len(), "daily brief delivered");
                Ok(RunOutcome::Delivered { message_ids })
            }
            Err(err) => {
                self.notify_best_effort(&format!("⚠️ Daily brief failed: delivery error:\n{err}"))
                    .await;
                Err(err).context("report delivery failed")
            }
        }
    }

    /// Send a failure notice, swallowing its own errors so they never mask
    /// the original failure
    async fn notify_best_effort(&self, text: &str) {
        if let Err(err) = self.delivery.send_notification(text).await {
            warn!(error = %err, "failed to send failure notification");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use brief_market::{
        MarketConfig, QuoteFetcher, QuoteProvider, QuoteSource, RawQuote, SeriesApi, SeriesSource,
        universe,
    };
    use brief_report::{
        ChatModel, CompletionRequest, CompletionResponse, ReportConfig, ReportError, TokenUsage,
    };
    use brief_telegram::{DeliveryError, MessageSink, ParseMode};
    use std::collections::HashSet;
    use std::sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    };
    use std::time::Duration;

    /// Quote endpoint that answers for an allowlist of symbols
    struct ScriptedQuotes {
        allowed: Option<HashSet<String>>,
    }

    impl ScriptedQuotes {
        fn all() -> Self {
            Self { allowed: None }
        }

        fn only(symbols: &[&str]) -> Self {
            Self {
                allowed: Some(symbols.iter().map(ToString::to_string).collect()),
            }
        }

        fn none() -> Self {
            Self {
                allowed: Some(HashSet::new()),
            }
        }
    }

    #[async_trait]
    impl QuoteFetcher for ScriptedQuotes {
        async fn fetch(&self, symbol: &str) -> brief_market::Result<RawQuote> {
            if let Some(allowed) = &self.allowed {
                if !allowed.contains(symbol) {
                    return Err(brief_market::MarketError::ApiError("down".to_string()));
                }
            }
            Ok(RawQuote {
                symbol: symbol.to_string(),
                price: Some(100.0),
                change: Some(0.5),
                change_percent: Some(f64::from(symbol.len() as u32)),
                ..RawQuote::default()
            })
        }
    }

    struct HealthySeries;

    #[async_trait]
    impl SeriesApi for HealthySeries {
        async fn daily_closes(
            &self,
            _symbol: &str,
            _lookback_days: u32,
        ) -> brief_market::Result<Vec<f64>> {
            Ok((1..=60).map(f64::from).collect())
        }
    }

    struct CountingModel {
        calls: Arc<AtomicUsize>,
        healthy: bool,
    }

    #[async_trait]
    impl ChatModel for CountingModel {
        async fn complete(
            &self,
            request: CompletionRequest,
        ) -> brief_report::Result<CompletionResponse> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if !self.healthy {
                return Err(ReportError::RequestFailed("model down".to_string()));
            }
            assert!(request.prompt.contains("INDICES"));
            Ok(CompletionResponse {
                text: "<b>📊 Index overview</b>\nA quiet session.".to_string(),
                usage: TokenUsage::default(),
            })
        }

        fn name(&self) -> &str {
            "fake"
        }
    }

    #[derive(Default)]
    struct RecordingSink {
        sent: Mutex<Vec<(String, ParseMode)>>,
        reject_all: bool,
    }

    #[async_trait]
    impl MessageSink for RecordingSink {
        async fn send(&self, text: &str, mode: ParseMode) -> brief_telegram::Result<i64> {
            self.sent.lock().unwrap().push((text.to_string(), mode));
            if self.reject_all && mode == ParseMode::Html {
                return Err(DeliveryError::SendFailed {
                    code: Some(403),
                    description: "bot was blocked".to_string(),
                });
            }
            Ok(self.sent.lock().unwrap().len() as i64)
        }
    }

    struct Fixture {
        brief: DailyBrief,
        sink: Arc<RecordingSink>,
        model_calls: Arc<AtomicUsize>,
    }

    fn fixture(
        primary: ScriptedQuotes,
        secondary: Option<ScriptedQuotes>,
        model_healthy: bool,
        sink: RecordingSink,
    ) -> Fixture {
        let config = MarketConfig::builder()
            .basket_pacing(Duration::ZERO)
            .series_pacing(Duration::ZERO)
            .build()
            .unwrap();

        let quotes = QuoteSource::new(
            Arc::new(primary),
            secondary.map(|s| Arc::new(s) as _),
            Duration::from_secs(1),
        );
        let series = SeriesSource::new(Arc::new(HealthySeries), config.lookback_days);
        let snapshot = SnapshotBuilder::new(quotes, series, &config);

        let model_calls = Arc::new(AtomicUsize::new(0));
        let generator = ReportGenerator::new(
            Arc::new(CountingModel {
                calls: model_calls.clone(),
                healthy: model_healthy,
            }),
            ReportConfig {
                backoff_base: Duration::from_millis(1),
                ..ReportConfig::default()
            },
        );

        let sink = Arc::new(sink);
        let delivery = DeliveryChannel::with_limits(sink.clone(), 3800, Duration::ZERO);

        Fixture {
            brief: DailyBrief::new(snapshot, generator, delivery),
            sink,
            model_calls,
        }
    }

    #[tokio::test]
    async fn test_healthy_run_delivers_report() {
        let f = fixture(
            ScriptedQuotes::all(),
            None,
            true,
            RecordingSink::default(),
        );

        let outcome = f.brief.run().await.unwrap();
        let RunOutcome::Delivered { message_ids } = outcome else {
            panic!("expected delivery");
        };
        assert!(!message_ids.is_empty());

        let sent = f.sink.sent.lock().unwrap().clone();
        assert!(sent[0].0.contains("US Market Daily"));
        assert_eq!(sent[0].1, ParseMode::Html);
    }

    #[tokio::test]
    async fn test_primary_down_secondary_carries_run() {
        let f = fixture(
            ScriptedQuotes::none(),
            Some(ScriptedQuotes::all()),
            true,
            RecordingSink::default(),
        );

        let outcome = f.brief.run().await.unwrap();
        assert!(matches!(outcome, RunOutcome::Delivered { .. }));
        assert_eq!(f.model_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_total_outage_aborts_before_generation() {
        let f = fixture(
            ScriptedQuotes::none(),
            Some(ScriptedQuotes::none()),
            true,
            RecordingSink::default(),
        );

        let outcome = f.brief.run().await.unwrap();
        assert_eq!(outcome, RunOutcome::AbortedNoData);
        assert_eq!(f.model_calls.load(Ordering::SeqCst), 0);

        // Exactly one plain notification segment
        let sent = f.sink.sent.lock().unwrap().clone();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].1, ParseMode::Plain);
        assert!(sent[0].0.contains("aborted"));
    }

    #[tokio::test]
    async fn test_generation_failure_notifies_and_errors() {
        let f = fixture(
            ScriptedQuotes::all(),
            None,
            false,
            RecordingSink::default(),
        );

        let result = f.brief.run().await;
        assert!(result.is_err());
        // 3 model attempts before giving up
        assert_eq!(f.model_calls.load(Ordering::SeqCst), 3);

        let sent = f.sink.sent.lock().unwrap().clone();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].1, ParseMode::Plain);
        assert!(sent[0].0.contains("report generation error"));
    }

    #[tokio::test]
    async fn test_delivery_failure_notification_errors_are_swallowed() {
        let f = fixture(
            ScriptedQuotes::all(),
            None,
            true,
            RecordingSink {
                reject_all: true,
                ..RecordingSink::default()
            },
        );

        // HTML sends fail hard; the plain failure notification succeeds
        let result = f.brief.run().await;
        assert!(result.is_err());

        let sent = f.sink.sent.lock().unwrap().clone();
        let plain: Vec<_> = sent.iter().filter(|(_, m)| *m == ParseMode::Plain).collect();
        assert_eq!(plain.len(), 1);
        assert!(plain[0].0.contains("delivery error"));
    }

    #[tokio::test]
    async fn test_bounded_universe_snapshot_shape() {
        // Only the indices and mega caps answer: the snapshot holds exactly
        // those 10 entries and every indicator target is one of them
        let ten: Vec<&str> = universe::INDICES
            .iter()
            .chain(universe::MEGA_CAPS.iter())
            .map(|info| info.symbol)
            .collect();

        let config = MarketConfig::builder()
            .basket_pacing(Duration::ZERO)
            .series_pacing(Duration::ZERO)
            .build()
            .unwrap();
        let quotes = QuoteSource::new(
            Arc::new(ScriptedQuotes::only(&ten)),
            None,
            Duration::from_secs(1),
        );
        let series = SeriesSource::new(Arc::new(HealthySeries), config.lookback_days);
        let snapshot = SnapshotBuilder::new(quotes, series, &config).build().await;

        assert_eq!(snapshot.indices.len(), 3);
        assert_eq!(snapshot.mega_caps.len(), 7);
        // Mega caps answer inside their sector baskets too; dedup happens
        // at aggregation
        let aggregation = aggregate(&snapshot, Utc::now());
        assert_eq!(aggregation.ranking.len(), 7);
        assert!(aggregation.earnings.is_empty());

        let bundles = snapshot
            .all_entries()
            .filter(|e| e.indicators.is_some())
            .count();
        assert!(bundles >= 10);
    }

    #[tokio::test]
    async fn test_fallback_tags_every_quote_secondary() {
        let config = MarketConfig::builder()
            .basket_pacing(Duration::ZERO)
            .series_pacing(Duration::ZERO)
            .build()
            .unwrap();
        let quotes = QuoteSource::new(
            Arc::new(ScriptedQuotes::none()),
            Some(Arc::new(ScriptedQuotes::all()) as _),
            Duration::from_secs(1),
        );
        let series = SeriesSource::new(Arc::new(HealthySeries), config.lookback_days);
        let snapshot = SnapshotBuilder::new(quotes, series, &config).build().await;

        assert!(!snapshot.is_empty());
        assert!(
            snapshot
                .all_entries()
                .all(|e| e.quote.source == QuoteProvider::Secondary)
        );
    }
}
