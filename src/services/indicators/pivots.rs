//! Classic pivot point support/resistance levels.

use crate::error::Result;
use crate::services::indicators::{ensure_periods, Indicator};
use crate::services::rolling;
use crate::types::{Bar, IndicatorCategory, IndicatorOutput};

/// Pivot levels from the `lookback`-bar high, low and the latest close.
///
/// P = (H + L + C) / 3, R1 = 2P - L, S1 = 2P - H, R2 = P + (H - L), S2 = P - (H - L).
pub struct Pivots {
    lookback: usize,
}

impl Default for Pivots {
    fn default() -> Self {
        Self { lookback: 20 }
    }
}

impl Indicator for Pivots {
    fn id(&self) -> &str {
        "pivots"
    }

    fn name(&self) -> &str {
        "Pivot Points"
    }

    fn category(&self) -> IndicatorCategory {
        IndicatorCategory::Levels
    }

    fn min_periods(&self) -> usize {
        self.lookback
    }

    fn calculate(&self, bars: &[Bar]) -> Result<IndicatorOutput> {
        ensure_periods(bars, self.min_periods())?;

        let window = rolling::tail(bars, self.lookback);
        let (high, low) = match (
            rolling::max(&rolling::highs(window)),
            rolling::min(&rolling::lows(window)),
        ) {
            (Some(h), Some(l)) => (h, l),
            _ => return Ok(IndicatorOutput::new()),
        };
        let close = bars[bars.len() - 1].close;

        let pivot = (high + low + close) / 3.0;
        let range = high - low;

        Ok(IndicatorOutput::new()
            .value("pivot_point", rolling::finite(pivot))
            .value("resistance_1", rolling::finite(2.0 * pivot - low))
            .value("resistance_2", rolling::finite(pivot + range))
            .value("support_1", rolling::finite(2.0 * pivot - high))
            .value("support_2", rolling::finite(pivot - range))
            .value("recent_high", Some(high))
            .value("recent_low", Some(low)))
    }
}
