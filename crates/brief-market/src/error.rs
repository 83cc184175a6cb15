//! Error types for market data operations

use thiserror::Error;

/// Market data specific errors
#[derive(Debug, Error)]
pub enum MarketError {
    /// API request failed
    #[error("API error: {0}")]
    ApiError(String),

    /// Data not available for the requested symbol
    #[error("Data not available for {symbol}: {reason}")]
    DataUnavailable { symbol: String, reason: String },

    /// Provider call exceeded its deadline
    #[error("Request for {symbol} timed out after {timeout_secs}s")]
    Timeout { symbol: String, timeout_secs: u64 },

    /// Network or HTTP error
    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    /// JSON parsing error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Yahoo Finance API error
    #[error("Yahoo Finance error: {0}")]
    YahooFinanceError(String),

    /// Finnhub API error
    #[error("Finnhub error: {0}")]
    FinnhubError(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type alias for market data operations
pub type Result<T> = std::result::Result<T, MarketError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = MarketError::DataUnavailable {
            symbol: "AAPL".to_string(),
            reason: "series too short".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Data not available for AAPL: series too short"
        );

        let err = MarketError::Timeout {
            symbol: "^GSPC".to_string(),
            timeout_secs: 8,
        };
        assert_eq!(err.to_string(), "Request for ^GSPC timed out after 8s");
    }
}
