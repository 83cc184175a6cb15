//! Yahoo Finance client: quote endpoint and daily close history

use crate::error::{MarketError, Result};
use crate::quotes::{QuoteFetcher, RawQuote};
use crate::series::SeriesApi;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use time::OffsetDateTime;
use tracing::{debug, instrument};
use yahoo_finance_api as yahoo;

const QUOTE_URL: &str = "https://query1.finance.yahoo.com/v7/finance/quote";
const USER_AGENT: &str = "Mozilla/5.0 (compatible; marketbrief/0.1)";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Yahoo Finance client
///
/// Current quotes come from the v7 quote endpoint; close-price history goes
/// through the chart API via `yahoo_finance_api`.
pub struct YahooClient {
    client: Client,
}

#[derive(Debug, Deserialize)]
struct QuoteEnvelope {
    #[serde(rename = "quoteResponse")]
    quote_response: QuoteBody,
}

#[derive(Debug, Deserialize)]
struct QuoteBody {
    result: Vec<YahooQuoteRow>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct YahooQuoteRow {
    symbol: String,
    long_name: Option<String>,
    short_name: Option<String>,
    regular_market_price: Option<f64>,
    regular_market_change: Option<f64>,
    regular_market_change_percent: Option<f64>,
    regular_market_previous_close: Option<f64>,
    regular_market_open: Option<f64>,
    regular_market_day_high: Option<f64>,
    regular_market_day_low: Option<f64>,
    regular_market_volume: Option<u64>,
    #[serde(rename = "averageDailyVolume3Month")]
    average_daily_volume_3month: Option<u64>,
    market_cap: Option<f64>,
    fifty_two_week_high: Option<f64>,
    fifty_two_week_low: Option<f64>,
    earnings_timestamp: Option<i64>,
}

impl From<YahooQuoteRow> for RawQuote {
    fn from(row: YahooQuoteRow) -> Self {
        RawQuote {
            symbol: row.symbol,
            name: row.long_name.or(row.short_name),
            price: row.regular_market_price,
            change: row.regular_market_change,
            change_percent: row.regular_market_change_percent,
            previous_close: row.regular_market_previous_close,
            open: row.regular_market_open,
            high: row.regular_market_day_high,
            low: row.regular_market_day_low,
            volume: row.regular_market_volume,
            average_volume: row.average_daily_volume_3month,
            market_cap: row.market_cap,
            week52_high: row.fifty_two_week_high,
            week52_low: row.fifty_two_week_low,
            earnings_timestamp: row
                .earnings_timestamp
                .and_then(|ts| DateTime::from_timestamp(ts, 0)),
        }
    }
}

impl YahooClient {
    /// Create a new Yahoo Finance client
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()?;

        Ok(Self { client })
    }

    /// Get the latest quote row for a symbol from the v7 quote endpoint
    #[instrument(skip(self))]
    pub async fn get_quote(&self, symbol: &str) -> Result<RawQuote> {
        let response = self
            .client
            .get(QUOTE_URL)
            .query(&[("symbols", symbol)])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(MarketError::YahooFinanceError(format!(
                "HTTP error: {}",
                response.status()
            )));
        }

        let envelope: QuoteEnvelope = response.json().await.map_err(|e| {
            MarketError::YahooFinanceError(format!("Failed to parse quote response: {e}"))
        })?;

        let row = envelope
            .quote_response
            .result
            .into_iter()
            .find(|row| row.symbol == symbol)
            .ok_or_else(|| MarketError::DataUnavailable {
                symbol: symbol.to_string(),
                reason: "No quote in response".to_string(),
            })?;

        debug!(symbol, price = ?row.regular_market_price, "fetched yahoo quote");
        Ok(row.into())
    }

    /// Get daily closing prices for a symbol, oldest first
    pub async fn get_daily_closes(&self, symbol: &str, lookback_days: u32) -> Result<Vec<f64>> {
        let end = Utc::now();
        let start = end - chrono::Duration::days(i64::from(lookback_days));

        // Convert chrono DateTime to time OffsetDateTime
        let start_odt = OffsetDateTime::from_unix_timestamp(start.timestamp())
            .map_err(|e| MarketError::YahooFinanceError(format!("Invalid start timestamp: {e}")))?;
        let end_odt = OffsetDateTime::from_unix_timestamp(end.timestamp())
            .map_err(|e| MarketError::YahooFinanceError(format!("Invalid end timestamp: {e}")))?;

        let provider = yahoo::YahooConnector::new()
            .map_err(|e| MarketError::YahooFinanceError(e.to_string()))?;

        let response = provider
            .get_quote_history(symbol, start_odt, end_odt)
            .await
            .map_err(|e| MarketError::YahooFinanceError(e.to_string()))?;

        let quotes = response
            .quotes()
            .map_err(|e| MarketError::YahooFinanceError(e.to_string()))?;

        Ok(quotes.iter().map(|q| q.close).collect())
    }
}

#[async_trait]
impl QuoteFetcher for YahooClient {
    async fn fetch(&self, symbol: &str) -> Result<RawQuote> {
        self.get_quote(symbol).await
    }
}

#[async_trait]
impl SeriesApi for YahooClient {
    async fn daily_closes(&self, symbol: &str, lookback_days: u32) -> Result<Vec<f64>> {
        self.get_daily_closes(symbol, lookback_days).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_row_maps_into_raw_quote() {
        let json = r#"{
            "quoteResponse": {
                "result": [{
                    "symbol": "AAPL",
                    "longName": "Apple Inc.",
                    "regularMarketPrice": 187.3,
                    "regularMarketChange": 1.2,
                    "regularMarketChangePercent": 0.64,
                    "regularMarketPreviousClose": 186.1,
                    "regularMarketVolume": 51234567,
                    "averageDailyVolume3Month": 58210000,
                    "marketCap": 2900000000000.0,
                    "fiftyTwoWeekHigh": 199.6,
                    "fiftyTwoWeekLow": 164.1,
                    "earningsTimestamp": 1767139200
                }],
                "error": null
            }
        }"#;

        let envelope: QuoteEnvelope = serde_json::from_str(json).unwrap();
        let raw: RawQuote = envelope.quote_response.result[0].clone().into();

        assert_eq!(raw.symbol, "AAPL");
        assert_eq!(raw.name.as_deref(), Some("Apple Inc."));
        assert_eq!(raw.price, Some(187.3));
        assert_eq!(raw.volume, Some(51_234_567));
        assert_eq!(raw.week52_high, Some(199.6));
        assert!(raw.earnings_timestamp.is_some());
    }

    #[test]
    fn test_sparse_quote_row_keeps_fields_absent() {
        let json = r#"{
            "quoteResponse": {
                "result": [{"symbol": "^GSPC", "shortName": "S&P 500", "regularMarketPrice": 6882.72}],
                "error": null
            }
        }"#;

        let envelope: QuoteEnvelope = serde_json::from_str(json).unwrap();
        let raw: RawQuote = envelope.quote_response.result[0].clone().into();

        assert_eq!(raw.name.as_deref(), Some("S&P 500"));
        assert!(raw.market_cap.is_none());
        assert!(raw.earnings_timestamp.is_none());
    }

    #[tokio::test]
    #[ignore] // Requires network access
    async fn test_get_quote() {
        let client = YahooClient::new().unwrap();
        let raw = client.get_quote("AAPL").await.unwrap();
        assert_eq!(raw.symbol, "AAPL");
        assert!(raw.price.unwrap_or(0.0) > 0.0);
    }

    #[tokio::test]
    #[ignore] // Requires network access
    async fn test_get_daily_closes() {
        let client = YahooClient::new().unwrap();
        let closes = client.get_daily_closes("AAPL", 120).await.unwrap();
        assert!(closes.len() >= 50);
    }
}
