//! Technical indicators computed from daily close-price series
//!
//! Pure functions, no I/O. Every sub-metric is independently optional: a
//! series long enough for RSI(14) but not MA(50) still produces a bundle
//! with the computable fields filled in.

use serde::{Deserialize, Serialize};

/// RSI period used throughout the report
pub const RSI_PERIOD: usize = 14;
/// Bollinger band window
pub const BOLLINGER_PERIOD: usize = 20;
/// Bollinger band width in standard deviations
pub const BOLLINGER_K: f64 = 2.0;

/// Qualitative reading of the RSI level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RsiFlag {
    Overbought,
    Oversold,
    Neutral,
}

impl RsiFlag {
    /// Classify an RSI value: overbought at >= 70, oversold at <= 30
    pub fn from_rsi(rsi: f64) -> Self {
        if rsi >= 70.0 {
            Self::Overbought
        } else if rsi <= 30.0 {
            Self::Oversold
        } else {
            Self::Neutral
        }
    }
}

/// Indicator readings for one symbol
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndicatorBundle {
    pub rsi14: Option<f64>,
    pub ma20: Option<f64>,
    pub ma50: Option<f64>,
    pub ma20_offset_pct: Option<f64>,
    pub ma50_offset_pct: Option<f64>,
    pub bollinger_percent: Option<f64>,
    pub rsi_flag: RsiFlag,
}

impl IndicatorBundle {
    /// Compute a bundle from a close series, oldest first
    ///
    /// Requires at least 15 closes to exist at all; sub-metrics needing a
    /// longer window are absent without invalidating the rest.
    pub fn from_closes(closes: &[f64]) -> Option<Self> {
        if closes.len() < RSI_PERIOD + 1 {
            return None;
        }

        let last = *closes.last()?;
        let rsi14 = rsi(closes, RSI_PERIOD);
        let ma20 = sma(closes, 20);
        let ma50 = sma(closes, 50);

        Some(Self {
            rsi14,
            ma20,
            ma50,
            ma20_offset_pct: ma20.and_then(|ma| percent_offset(last, ma)),
            ma50_offset_pct: ma50.and_then(|ma| percent_offset(last, ma)),
            bollinger_percent: bollinger_percent(closes, BOLLINGER_PERIOD, BOLLINGER_K),
            rsi_flag: rsi14.map_or(RsiFlag::Neutral, RsiFlag::from_rsi),
        })
    }
}

/// Simple moving average over the last `period` closes
pub fn sma(closes: &[f64], period: usize) -> Option<f64> {
    if period == 0 || closes.len() < period {
        return None;
    }

    let window = &closes[closes.len() - period..];
    Some(window.iter().sum::<f64>() / period as f64)
}

/// Percentage offset of `close` from `ma`: ((close - ma) / ma) * 100
pub fn percent_offset(close: f64, ma: f64) -> Option<f64> {
    if ma == 0.0 {
        return None;
    }
    Some((close - ma) / ma * 100.0)
}

/// Relative Strength Index with Wilder's smoothing
///
/// The average gain/loss is seeded as the simple mean over the first
/// `period` differences, then smoothed as `avg = (avg*(period-1) + cur) /
/// period`. A smoothed average loss of exactly 0 yields RSI 100.
pub fn rsi(closes: &[f64], period: usize) -> Option<f64> {
    if period == 0 || closes.len() < period + 1 {
        return None;
    }

    let diffs: Vec<f64> = closes.windows(2).map(|w| w[1] - w[0]).collect();

    let mut avg_gain = diffs[..period].iter().filter(|d| **d > 0.0).sum::<f64>() / period as f64;
    let mut avg_loss =
        diffs[..period].iter().filter(|d| **d < 0.0).sum::<f64>().abs() / period as f64;

    for diff in &diffs[period..] {
        let gain = diff.max(0.0);
        let loss = (-diff).max(0.0);
        avg_gain = (avg_gain * (period as f64 - 1.0) + gain) / period as f64;
        avg_loss = (avg_loss * (period as f64 - 1.0) + loss) / period as f64;
    }

    if avg_loss == 0.0 {
        return Some(100.0);
    }

    Some(100.0 - 100.0 / (1.0 + avg_gain / avg_loss))
}

/// Position of the last close within the Bollinger bands, as a percentage
///
/// 0 is the lower band, 100 the upper. The standard deviation is the
/// population form (divide by N) over the same window as the middle band.
/// Zero variance collapses the bands and the position is undefined.
pub fn bollinger_percent(closes: &[f64], period: usize, k: f64) -> Option<f64> {
    if period == 0 || closes.len() < period {
        return None;
    }

    let window = &closes[closes.len() - period..];
    let mid = window.iter().sum::<f64>() / period as f64;
    let variance = window.iter().map(|c| (c - mid).powi(2)).sum::<f64>() / period as f64;
    let sigma = variance.sqrt();

    let upper = mid + k * sigma;
    let lower = mid - k * sigma;
    if upper == lower {
        return None;
    }

    let last = *closes.last()?;
    Some((last - lower) / (upper - lower) * 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sma() {
        let closes = vec![10.0, 11.0, 12.0, 13.0, 14.0, 15.0];
        assert_eq!(sma(&closes, 3), Some(14.0)); // (13+14+15)/3
        assert_eq!(sma(&closes, 6), Some(12.5));
        assert!(sma(&closes, 7).is_none());
        assert!(sma(&closes, 0).is_none());
    }

    #[test]
    fn test_percent_offset() {
        let score = percent_offset(110.0, 100.0).unwrap();
        assert!((score - 10.0).abs() < 0.01);

        let score = percent_offset(90.0, 100.0).unwrap();
        assert!((score + 10.0).abs() < 0.01);

        assert!(percent_offset(100.0, 0.0).is_none());
    }

    #[test]
    fn test_rsi_monotonic_increase_is_100() {
        let closes: Vec<f64> = (1..=30).map(f64::from).collect();
        assert_eq!(rsi(&closes, 14), Some(100.0));
    }

    #[test]
    fn test_rsi_monotonic_decrease_is_0() {
        let closes: Vec<f64> = (1..=30).rev().map(f64::from).collect();
        let value = rsi(&closes, 14).unwrap();
        assert!(value.abs() < 1e-9);
    }

    #[test]
    fn test_rsi_needs_period_plus_one_points() {
        let closes: Vec<f64> = (1..=14).map(f64::from).collect();
        assert!(rsi(&closes, 14).is_none());

        let closes: Vec<f64> = (1..=15).map(f64::from).collect();
        assert!(rsi(&closes, 14).is_some());
    }

    #[test]
    fn test_rsi_flat_series_is_100() {
        // No losses at all, same branch as monotonic increase
        let closes = vec![50.0; 20];
        assert_eq!(rsi(&closes, 14), Some(100.0));
    }

    #[test]
    fn test_rsi_mixed_series_in_range() {
        let closes = vec![
            44.34, 44.09, 44.15, 43.61, 44.33, 44.83, 45.10, 45.42, 45.84, 46.08, 45.89, 46.03,
            45.61, 46.28, 46.28, 46.00, 46.03, 46.41, 46.22, 45.64,
        ];
        let value = rsi(&closes, 14).unwrap();
        assert!(value > 0.0 && value < 100.0);
        // Wilder's worked example extended through the smoothing steps
        assert!((value - 57.9).abs() < 1.0);
    }

    #[test]
    fn test_bollinger_zero_variance_is_absent() {
        let closes = vec![100.0; 25];
        assert!(bollinger_percent(&closes, 20, 2.0).is_none());
    }

    #[test]
    fn test_bollinger_band_position() {
        // Alternating series: finite variance, last close above the mean
        let closes: Vec<f64> = (0..20)
            .map(|i| if i % 2 == 0 { 99.0 } else { 101.0 })
            .collect();
        let pct = bollinger_percent(&closes, 20, 2.0).unwrap();
        // mean 100, sigma 1, bands at 98/102: last close 101 sits at 75%
        assert!((pct - 75.0).abs() < 1e-9);
    }

    #[test]
    fn test_bollinger_upper_not_below_lower() {
        let closes: Vec<f64> = (1..=40).map(|i| f64::from(i) * 1.3).collect();
        let pct = bollinger_percent(&closes, 20, 2.0).unwrap();
        assert!(pct.is_finite());
    }

    #[test]
    fn test_rsi_flag_thresholds() {
        assert_eq!(RsiFlag::from_rsi(70.0), RsiFlag::Overbought);
        assert_eq!(RsiFlag::from_rsi(30.0), RsiFlag::Oversold);
        assert_eq!(RsiFlag::from_rsi(50.0), RsiFlag::Neutral);
    }

    #[test]
    fn test_bundle_requires_15_closes() {
        let closes: Vec<f64> = (1..=14).map(f64::from).collect();
        assert!(IndicatorBundle::from_closes(&closes).is_none());

        let closes: Vec<f64> = (1..=15).map(f64::from).collect();
        let bundle = IndicatorBundle::from_closes(&closes).unwrap();
        assert_eq!(bundle.rsi14, Some(100.0));
        assert!(bundle.ma20.is_none());
        assert!(bundle.ma50.is_none());
    }

    #[test]
    fn test_bundle_submetrics_fill_in_with_data() {
        let closes: Vec<f64> = (1..=60).map(f64::from).collect();
        let bundle = IndicatorBundle::from_closes(&closes).unwrap();
        assert!(bundle.ma20.is_some());
        assert!(bundle.ma50.is_some());
        assert!(bundle.ma20_offset_pct.unwrap() > 0.0);
        assert!(bundle.bollinger_percent.is_some());
        assert_eq!(bundle.rsi_flag, RsiFlag::Overbought);
    }
}
