//! MACD (Moving Average Convergence Divergence) indicator.

use crate::error::Result;
use crate::services::indicators::{ensure_periods, Indicator};
use crate::services::rolling;
use crate::types::{Bar, IndicatorCategory, IndicatorOutput};

/// MACD indicator.
///
/// - MACD Line = EMA(12) - EMA(26)
/// - Signal Line = EMA(9) of MACD Line
/// - Histogram = MACD Line - Signal Line
///
/// All EMAs are seeded with the first value of their input.
pub struct Macd {
    fast_period: usize,
    slow_period: usize,
    signal_period: usize,
}

impl Default for Macd {
    fn default() -> Self {
        Self {
            fast_period: 12,
            slow_period: 26,
            signal_period: 9,
        }
    }
}

impl Indicator for Macd {
    fn id(&self) -> &str {
        "macd"
    }

    fn name(&self) -> &str {
        "MACD (12, 26, 9)"
    }

    fn category(&self) -> IndicatorCategory {
        IndicatorCategory::Trend
    }

    fn min_periods(&self) -> usize {
        self.slow_period
    }

    fn calculate(&self, bars: &[Bar]) -> Result<IndicatorOutput> {
        ensure_periods(bars, self.min_periods())?;

        let closes = rolling::closes(bars);
        let fast = rolling::ema(&closes, self.fast_period);
        let slow = rolling::ema(&closes, self.slow_period);

        let macd_line: Vec<f64> = fast.iter().zip(slow.iter()).map(|(f, s)| f - s).collect();
        let signal_line = rolling::ema(&macd_line, self.signal_period);
        let histogram: Vec<f64> = macd_line
            .iter()
            .zip(signal_line.iter())
            .map(|(m, s)| m - s)
            .collect();

        let to_series = |values: &[f64]| -> Vec<Option<f64>> {
            values.iter().map(|v| rolling::finite(*v)).collect()
        };
        let macd_series = to_series(&macd_line);
        let signal_series = to_series(&signal_line);
        let histogram_series = to_series(&histogram);

        Ok(IndicatorOutput::new()
            .value("macd", rolling::last(&macd_series))
            .value("macd_signal", rolling::last(&signal_series))
            .value("macd_histogram", rolling::last(&histogram_series))
            .series("macd", macd_series)
            .series("macd_signal", signal_series)
            .series("macd_histogram", histogram_series))
    }
}
