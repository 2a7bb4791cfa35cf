//! Relative Strength Index (RSI) indicator.

use crate::error::Result;
use crate::services::indicators::{ensure_periods, Indicator};
use crate::services::rolling;
use crate::types::{Bar, IndicatorCategory, IndicatorOutput};

/// RSI (Relative Strength Index) indicator.
///
/// Mean gain over mean loss across the most recent `period` close changes
/// (fewer when exactly `period` bars exist). Values range from 0-100:
/// - Below 30: Oversold
/// - Above 70: Overbought
pub struct Rsi {
    period: usize,
}

impl Default for Rsi {
    fn default() -> Self {
        Self { period: 14 }
    }
}

impl Rsi {
    #[allow(dead_code)]
    pub fn new(period: usize) -> Self {
        Self { period }
    }

    /// RSI from a window of close-to-close changes.
    fn rsi_from_changes(changes: &[f64]) -> Option<f64> {
        if changes.is_empty() {
            return None;
        }
        let count = changes.len() as f64;
        let avg_gain = changes.iter().filter(|c| **c > 0.0).sum::<f64>() / count;
        let avg_loss = -changes.iter().filter(|c| **c < 0.0).sum::<f64>() / count;

        if avg_loss == 0.0 {
            // No movement at all is undefined, pure gains saturate
            return if avg_gain > 0.0 { Some(100.0) } else { None };
        }

        let rs = avg_gain / avg_loss;
        rolling::finite(100.0 - (100.0 / (1.0 + rs)))
    }

    /// RSI for every bar once `period` bars are available.
    fn rsi_series(&self, bars: &[Bar]) -> Vec<Option<f64>> {
        let changes: Vec<f64> = bars.windows(2).map(|w| w[1].close - w[0].close).collect();

        (0..bars.len())
            .map(|i| {
                if i + 1 < self.period {
                    return None;
                }
                // changes[j] is the move into bar j + 1
                let end = i;
                let start = end.saturating_sub(self.period);
                Self::rsi_from_changes(&changes[start..end])
            })
            .collect()
    }
}

impl Indicator for Rsi {
    fn id(&self) -> &str {
        "rsi"
    }

    fn name(&self) -> &str {
        "RSI (14)"
    }

    fn category(&self) -> IndicatorCategory {
        IndicatorCategory::Momentum
    }

    fn min_periods(&self) -> usize {
        self.period
    }

    fn calculate(&self, bars: &[Bar]) -> Result<IndicatorOutput> {
        ensure_periods(bars, self.min_periods())?;

        let series = self.rsi_series(bars);
        Ok(IndicatorOutput::new()
            .value("rsi", rolling::last(&series))
            .series("rsi", series))
    }
}
