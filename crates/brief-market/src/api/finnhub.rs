//! Finnhub fallback quote client
//!
//! Finnhub's quote payload is sparser than Yahoo's: no volume, market cap,
//! 52-week range, or earnings fields. Those stay absent downstream.

use crate::error::{MarketError, Result};
use crate::quotes::{QuoteFetcher, RawQuote};
use async_trait::async_trait;
use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use reqwest::Client;
use serde::Deserialize;
use std::num::NonZeroU32;
use std::sync::Arc;
use tracing::debug;

const BASE_URL: &str = "https://finnhub.io/api/v1";

type SharedRateLimiter = Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>;

/// Finnhub quote payload
#[derive(Debug, Clone, Deserialize)]
pub struct FinnhubQuote {
    /// Current price
    #[serde(rename = "c")]
    pub current: Option<f64>,
    /// Change
    #[serde(rename = "d")]
    pub change: Option<f64>,
    /// Percent change
    #[serde(rename = "dp")]
    pub percent_change: Option<f64>,
    /// High price of the day
    #[serde(rename = "h")]
    pub high: Option<f64>,
    /// Low price of the day
    #[serde(rename = "l")]
    pub low: Option<f64>,
    /// Open price of the day
    #[serde(rename = "o")]
    pub open: Option<f64>,
    /// Previous close price
    #[serde(rename = "pc")]
    pub previous_close: Option<f64>,
}

/// Finnhub client for the quote API
pub struct FinnhubClient {
    client: Client,
    api_key: String,
    rate_limiter: SharedRateLimiter,
}

impl FinnhubClient {
    /// Create a new Finnhub client with rate limiting
    ///
    /// # Arguments
    /// * `api_key` - Finnhub API key
    /// * `rate_limit` - Requests per minute (free tier: 60, premium: 300+)
    pub fn new(api_key: impl Into<String>, rate_limit: u32) -> Self {
        let quota =
            Quota::per_minute(NonZeroU32::new(rate_limit).unwrap_or(NonZeroU32::new(60).unwrap()));
        let rate_limiter = Arc::new(RateLimiter::direct(quota));

        Self {
            client: Client::new(),
            api_key: api_key.into(),
            rate_limiter,
        }
    }

    /// Get the current quote for a symbol
    pub async fn get_quote(&self, symbol: &str) -> Result<FinnhubQuote> {
        self.rate_limiter.until_ready().await;

        let url = format!("{BASE_URL}/quote?symbol={symbol}&token={}", self.api_key);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| MarketError::FinnhubError(format!("request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(MarketError::FinnhubError(format!(
                "API error {status}: {body}"
            )));
        }

        let quote = response
            .json::<FinnhubQuote>()
            .await
            .map_err(|e| MarketError::FinnhubError(format!("failed to parse response: {e}")))?;

        debug!(symbol, price = ?quote.current, "fetched finnhub quote");
        Ok(quote)
    }
}

#[async_trait]
impl QuoteFetcher for FinnhubClient {
    async fn fetch(&self, symbol: &str) -> Result<RawQuote> {
        let quote = self.get_quote(symbol).await?;

        Ok(RawQuote {
            symbol: symbol.to_string(),
            price: quote.current,
            change: quote.change,
            change_percent: quote.percent_change,
            previous_close: quote.previous_close,
            open: quote.open,
            high: quote.high,
            low: quote.low,
            ..RawQuote::default()
        })
    }
}
