//! Market data acquisition and technical analysis
//!
//! This crate covers the data side of the daily brief:
//!
//! - Quote retrieval from Yahoo Finance with a Finnhub fallback hop
//! - Daily close-price history for indicator computation
//! - Pure technical indicators (RSI, moving averages, Bollinger position)
//! - The static symbol universe (indices, mega caps, sector baskets)
//! - Snapshot building with rate-limit-aware pacing
//! - Deduplicated rankings and the upcoming-earnings calendar
//!
//! Provider failures surface as absence, not errors: a symbol that cannot
//! produce a usable quote is dropped from the run, and a series too short
//! for indicators simply leaves the bundle unset.

pub mod aggregator;
pub mod api;
pub mod config;
pub mod error;
pub mod indicators;
pub mod quotes;
pub mod series;
pub mod snapshot;
pub mod universe;

// Re-export main types for convenience
pub use aggregator::{Aggregation, EarningsEvent, aggregate};
pub use config::MarketConfig;
pub use error::{MarketError, Result};
pub use indicators::{IndicatorBundle, RsiFlag};
pub use quotes::{Quote, QuoteFetcher, QuoteProvider, QuoteSource, RawQuote};
pub use series::{SeriesApi, SeriesSource};
pub use snapshot::{MarketSnapshot, SnapshotBuilder};
pub use universe::{Basket, UniverseEntry};

use std::sync::Arc;

/// Wire up a [`SnapshotBuilder`] from configuration: Yahoo as the primary
/// quote and series provider, Finnhub as the fallback when a key is set
pub fn snapshot_builder(config: &MarketConfig) -> Result<SnapshotBuilder> {
    let yahoo = Arc::new(api::YahooClient::new()?);

    let secondary: Option<Arc<dyn QuoteFetcher>> = config
        .finnhub_api_key
        .as_ref()
        .map(|key| {
            Arc::new(api::FinnhubClient::new(key, config.finnhub_rate_limit))
                as Arc<dyn QuoteFetcher>
        });

    let quotes = QuoteSource::new(yahoo.clone(), secondary, config.quote_timeout);
    let series = SeriesSource::new(yahoo, config.lookback_days);

    Ok(SnapshotBuilder::new(quotes, series, config))
}
