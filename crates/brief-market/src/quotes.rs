//! Quote retrieval with provider fallback
//!
//! The primary provider is raced against a fixed deadline; on timeout, error,
//! or an unusable payload the source takes a single fallback hop to the
//! secondary provider. Absence, not an error, is the contract with callers.

use crate::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

/// Which provider a quote came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuoteProvider {
    Primary,
    Secondary,
}

/// Partially-populated quote as returned by a provider, before validation
#[derive(Debug, Clone, Default)]
pub struct RawQuote {
    pub symbol: String,
    pub name: Option<String>,
    pub price: Option<f64>,
    pub change: Option<f64>,
    pub change_percent: Option<f64>,
    pub previous_close: Option<f64>,
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub volume: Option<u64>,
    pub average_volume: Option<u64>,
    pub market_cap: Option<f64>,
    pub week52_high: Option<f64>,
    pub week52_low: Option<f64>,
    pub earnings_timestamp: Option<DateTime<Utc>>,
}

/// Validated current quote for a single symbol
///
/// A `Quote` only exists with a usable price; callers never see a
/// null-mixed record. Fields the secondary provider does not report stay
/// absent and are not backfilled.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Quote {
    pub symbol: String,
    pub name: Option<String>,
    pub price: f64,
    pub change: f64,
    pub change_percent: f64,
    pub previous_close: Option<f64>,
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub volume: Option<u64>,
    pub average_volume: Option<u64>,
    pub market_cap: Option<f64>,
    pub week52_high: Option<f64>,
    pub week52_low: Option<f64>,
    pub earnings_timestamp: Option<DateTime<Utc>>,
    pub source: QuoteProvider,
}

impl Quote {
    /// Validate a provider payload into a quote
    ///
    /// A missing, non-finite, or exactly-zero price marks a symbol miss or
    /// stale data and yields `None` even when the call itself succeeded.
    pub fn from_raw(raw: RawQuote, source: QuoteProvider) -> Option<Self> {
        let price = raw.price.filter(|p| p.is_finite() && *p != 0.0)?;

        Some(Self {
            symbol: raw.symbol,
            name: raw.name,
            price,
            change: raw.change.unwrap_or(0.0),
            change_percent: raw.change_percent.unwrap_or(0.0),
            previous_close: raw.previous_close,
            open: raw.open,
            high: raw.high,
            low: raw.low,
            volume: raw.volume,
            average_volume: raw.average_volume,
            market_cap: raw.market_cap,
            week52_high: raw.week52_high,
            week52_low: raw.week52_low,
            earnings_timestamp: raw.earnings_timestamp,
            source,
        })
    }
}

/// A provider endpoint that can fetch one symbol's current quote
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait QuoteFetcher: Send + Sync {
    async fn fetch(&self, symbol: &str) -> Result<RawQuote>;
}

/// Quote retrieval with timeout and a single fallback hop
///
/// Failures are logged and swallowed here; callers decide whether absence
/// is fatal.
pub struct QuoteSource {
    primary: Arc<dyn QuoteFetcher>,
    secondary: Option<Arc<dyn QuoteFetcher>>,
    timeout: Duration,
}

impl QuoteSource {
    /// Create a quote source from provider endpoints
    pub fn new(
        primary: Arc<dyn QuoteFetcher>,
        secondary: Option<Arc<dyn QuoteFetcher>>,
        timeout: Duration,
    ) -> Self {
        Self {
            primary,
            secondary,
            timeout,
        }
    }

    /// Fetch the current quote for a symbol, or `None` when no provider
    /// produced a usable quote
    pub async fn fetch_quote(&self, symbol: &str) -> Option<Quote> {
        match tokio::time::timeout(self.timeout, self.primary.fetch(symbol)).await {
            Ok(Ok(raw)) => {
                if let Some(quote) = Quote::from_raw(raw, QuoteProvider::Primary) {
                    return Some(quote);
                }
                warn!(symbol, "primary returned an unusable quote payload");
            }
            Ok(Err(err)) => warn!(symbol, error = %err, "primary quote fetch failed"),
            Err(_) => warn!(
                symbol,
                timeout_secs = self.timeout.as_secs(),
                "primary quote fetch timed out"
            ),
        }

        let secondary = self.secondary.as_ref()?;
        match secondary.fetch(symbol).await {
            Ok(raw) => {
                let quote = Quote::from_raw(raw, QuoteProvider::Secondary);
                if quote.is_none() {
                    warn!(symbol, "secondary returned an unusable quote payload");
                }
                quote
            }
            Err(err) => {
                warn!(symbol, error = %err, "secondary quote fetch failed");
                None
            }
        }
    }
}
