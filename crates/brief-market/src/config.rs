//! Configuration for market data acquisition

use crate::error::{MarketError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for market data acquisition and pacing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketConfig {
    /// Deadline for a single primary quote request
    pub quote_timeout: Duration,

    /// Delay inserted between sector basket fetches
    pub basket_pacing: Duration,

    /// Delay inserted between sequential historical series fetches
    pub series_pacing: Duration,

    /// Calendar days of history requested per series fetch
    pub lookback_days: u32,

    /// How many top and bottom movers join the indicator target set
    pub movers_per_side: usize,

    /// Finnhub API key for the fallback quote provider (optional)
    pub finnhub_api_key: Option<String>,

    /// Finnhub requests per minute (free tier: 60)
    pub finnhub_rate_limit: u32,
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            quote_timeout: Duration::from_secs(8),
            basket_pacing: Duration::from_millis(1500),
            series_pacing: Duration::from_millis(300),
            lookback_days: 120,
            movers_per_side: 10,
            finnhub_api_key: None,
            finnhub_rate_limit: 60,
        }
    }
}

impl MarketConfig {
    /// Create a new configuration builder
    pub fn builder() -> MarketConfigBuilder {
        MarketConfigBuilder::default()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.quote_timeout.is_zero() {
            return Err(MarketError::ConfigError(
                "quote_timeout must be non-zero".to_string(),
            ));
        }

        // MA50 plus weekends/holidays; anything shorter starves the indicators
        if self.lookback_days < 30 {
            return Err(MarketError::ConfigError(
                "lookback_days must be at least 30".to_string(),
            ));
        }

        if self.movers_per_side == 0 {
            return Err(MarketError::ConfigError(
                "movers_per_side must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

/// Builder for MarketConfig
#[derive(Debug, Default)]
pub struct MarketConfigBuilder {
    quote_timeout: Option<Duration>,
    basket_pacing: Option<Duration>,
    series_pacing: Option<Duration>,
    lookback_days: Option<u32>,
    movers_per_side: Option<usize>,
    finnhub_api_key: Option<String>,
    finnhub_rate_limit: Option<u32>,
}

impl MarketConfigBuilder {
    /// Set the primary quote request deadline
    pub fn quote_timeout(mut self, duration: Duration) -> Self {
        self.quote_timeout = Some(duration);
        self
    }

    /// Set the delay between sector basket fetches
    pub fn basket_pacing(mut self, duration: Duration) -> Self {
        self.basket_pacing = Some(duration);
        self
    }

    /// Set the delay between historical series fetches
    pub fn series_pacing(mut self, duration: Duration) -> Self {
        self.series_pacing = Some(duration);
        self
    }

    /// Set the historical lookback window in calendar days
    pub fn lookback_days(mut self, days: u32) -> Self {
        self.lookback_days = Some(days);
        self
    }

    /// Set how many movers per side join the indicator target set
    pub fn movers_per_side(mut self, count: usize) -> Self {
        self.movers_per_side = Some(count);
        self
    }

    /// Set the Finnhub API key for the fallback provider
    pub fn finnhub_api_key(mut self, key: impl Into<String>) -> Self {
        self.finnhub_api_key = Some(key.into());
        self
    }

    /// Load the Finnhub API key from the environment if present
    pub fn with_env_finnhub_key(mut self) -> Self {
        if let Ok(key) = std::env::var("FINNHUB_API_KEY") {
            if !key.trim().is_empty() {
                self.finnhub_api_key = Some(key);
            }
        }
        self
    }

    /// Set the Finnhub rate limit in requests per minute
    pub fn finnhub_rate_limit(mut self, per_minute: u32) -> Self {
        self.finnhub_rate_limit = Some(per_minute);
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<MarketConfig> {
        let defaults = MarketConfig::default();

        let config = MarketConfig {
            quote_timeout: self.quote_timeout.unwrap_or(defaults.quote_timeout),
            basket_pacing: self.basket_pacing.unwrap_or(defaults.basket_pacing),
            series_pacing: self.series_pacing.unwrap_or(defaults.series_pacing),
            lookback_days: self.lookback_days.unwrap_or(defaults.lookback_days),
            movers_per_side: self.movers_per_side.unwrap_or(defaults.movers_per_side),
            finnhub_api_key: self.finnhub_api_key,
            finnhub_rate_limit: self.finnhub_rate_limit.unwrap_or(defaults.finnhub_rate_limit),
        };

        config.validate()?;
        Ok(config)
    }
}
