//! Historical close-price series retrieval

use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::warn;

/// Minimum number of closes for a series to be usable at all
pub const MIN_SERIES_POINTS: usize = 15;

/// A provider endpoint that can fetch daily close history for one symbol
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SeriesApi: Send + Sync {
    /// Daily closing prices, oldest first
    async fn daily_closes(&self, symbol: &str, lookback_days: u32) -> Result<Vec<f64>>;
}

/// Close-price history source
///
/// Series shorter than [`MIN_SERIES_POINTS`] are treated as absent rather
/// than partially used; failures are logged, never propagated.
pub struct SeriesSource {
    api: Arc<dyn SeriesApi>,
    lookback_days: u32,
}

impl SeriesSource {
    /// Create a series source over a provider endpoint
    pub fn new(api: Arc<dyn SeriesApi>, lookback_days: u32) -> Self {
        Self { api, lookback_days }
    }

    /// Fetch daily closes for a symbol, or `None` when the series is
    /// unavailable or too short to use
    pub async fn fetch_closes(&self, symbol: &str) -> Option<Vec<f64>> {
        match self.api.daily_closes(symbol, self.lookback_days).await {
            Ok(closes) if closes.len() >= MIN_SERIES_POINTS => Some(closes),
            Ok(closes) => {
                warn!(
                    symbol,
                    points = closes.len(),
                    "series too short for indicators"
                );
                None
            }
            Err(err) => {
                warn!(symbol, error = %err, "series fetch failed");
                None
            }
        }
    }
}
