//! Williams %R indicator.

use crate::error::Result;
use crate::services::indicators::{ensure_periods, Indicator};
use crate::services::rolling;
use crate::types::{Bar, IndicatorCategory, IndicatorOutput};

/// Williams %R: -100 * (highest high - close) / (highest high - lowest low).
///
/// Ranges from -100 (at the low) to 0 (at the high).
pub struct WilliamsR {
    period: usize,
}

impl Default for WilliamsR {
    fn default() -> Self {
        Self { period: 14 }
    }
}

impl Indicator for WilliamsR {
    fn id(&self) -> &str {
        "williams_r"
    }

    fn name(&self) -> &str {
        "Williams %R (14)"
    }

    fn category(&self) -> IndicatorCategory {
        IndicatorCategory::Momentum
    }

    fn min_periods(&self) -> usize {
        self.period
    }

    fn calculate(&self, bars: &[Bar]) -> Result<IndicatorOutput> {
        ensure_periods(bars, self.min_periods())?;

        let window = rolling::tail(bars, self.period);
        let hh = rolling::max(&rolling::highs(window));
        let ll = rolling::min(&rolling::lows(window));
        let close = bars[bars.len() - 1].close;

        let value = match (hh, ll) {
            (Some(hh), Some(ll)) => rolling::safe_div(hh - close, hh - ll).map(|r| -100.0 * r),
            _ => None,
        };

        Ok(IndicatorOutput::new().value("williams_r", value))
    }
}
