use crate::error::{AnalysisError, Result};
use serde::{Deserialize, Serialize};

/// A single OHLCV price bar.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bar {
    /// Unix timestamp in milliseconds.
    pub timestamp: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    #[serde(default)]
    pub volume: f64,
}

impl Bar {
    pub fn new(timestamp: i64, open: f64, high: f64, low: f64, close: f64, volume: f64) -> Self {
        Self {
            timestamp,
            open,
            high,
            low,
            close,
            volume,
        }
    }

    /// Absolute size of the candle body.
    pub fn body(&self) -> f64 {
        (self.close - self.open).abs()
    }

    /// High minus low.
    pub fn range(&self) -> f64 {
        self.high - self.low
    }

    pub fn upper_wick(&self) -> f64 {
        self.high - self.open.max(self.close)
    }

    pub fn lower_wick(&self) -> f64 {
        self.open.min(self.close) - self.low
    }

    pub fn is_bullish(&self) -> bool {
        self.close > self.open
    }

    pub fn is_bearish(&self) -> bool {
        self.close < self.open
    }

    /// (high + low + close) / 3.
    pub fn typical_price(&self) -> f64 {
        (self.high + self.low + self.close) / 3.0
    }

    fn is_finite(&self) -> bool {
        self.open.is_finite()
            && self.high.is_finite()
            && self.low.is_finite()
            && self.close.is_finite()
            && self.volume.is_finite()
    }
}

/// Check that a bar series is non-empty, finite and ordered by time.
pub fn validate_bars(bars: &[Bar]) -> Result<()> {
    if bars.is_empty() {
        return Err(AnalysisError::InvalidInput("empty bar series".to_string()));
    }

    for (i, bar) in bars.iter().enumerate() {
        if !bar.is_finite() {
            return Err(AnalysisError::InvalidInput(format!(
                "bar {} has non-finite fields",
                i
            )));
        }
        if i > 0 && bar.timestamp < bars[i - 1].timestamp {
            return Err(AnalysisError::InvalidInput(format!(
                "bar {} timestamp {} precedes {}",
                i,
                bar.timestamp,
                bars[i - 1].timestamp
            )));
        }
    }

    Ok(())
}
