//! Volume Rate of Change (VROC) indicator.

use crate::error::Result;
use crate::services::indicators::{ensure_periods, Indicator};
use crate::services::rolling;
use crate::types::{Bar, IndicatorCategory, IndicatorOutput};

/// VROC: percentage change of volume versus `period` bars ago.
pub struct Vroc {
    period: usize,
    min_bars: usize,
}

impl Default for Vroc {
    fn default() -> Self {
        Self {
            period: 12,
            min_bars: 20,
        }
    }
}

impl Indicator for Vroc {
    fn id(&self) -> &str {
        "vroc"
    }

    fn name(&self) -> &str {
        "Volume ROC (12)"
    }

    fn category(&self) -> IndicatorCategory {
        IndicatorCategory::Volume
    }

    fn min_periods(&self) -> usize {
        self.min_bars.max(self.period + 1)
    }

    fn calculate(&self, bars: &[Bar]) -> Result<IndicatorOutput> {
        ensure_periods(bars, self.min_periods())?;

        let current = bars[bars.len() - 1].volume;
        let base = bars[bars.len() - 1 - self.period].volume;

        Ok(IndicatorOutput::new().value("vroc", rolling::pct_change(base, current)))
    }
}
