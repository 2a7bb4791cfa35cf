//! On-Balance Volume (OBV) indicator.

use crate::error::Result;
use crate::services::indicators::{ensure_periods, Indicator};
use crate::services::rolling;
use crate::types::{Bar, IndicatorCategory, IndicatorOutput};

/// OBV (On-Balance Volume) indicator.
///
/// Cumulative volume, added on up closes and subtracted on down closes.
/// Seeded with the first bar's volume.
pub struct Obv {
    min_bars: usize,
}

impl Default for Obv {
    fn default() -> Self {
        Self { min_bars: 20 }
    }
}

impl Obv {
    fn obv(bars: &[Bar]) -> f64 {
        bars.windows(2).fold(bars[0].volume, |obv, w| {
            if w[1].close > w[0].close {
                obv + w[1].volume
            } else if w[1].close < w[0].close {
                obv - w[1].volume
            } else {
                obv
            }
        })
    }
}

impl Indicator for Obv {
    fn id(&self) -> &str {
        "obv"
    }

    fn name(&self) -> &str {
        "OBV"
    }

    fn category(&self) -> IndicatorCategory {
        IndicatorCategory::Volume
    }

    fn min_periods(&self) -> usize {
        self.min_bars
    }

    fn calculate(&self, bars: &[Bar]) -> Result<IndicatorOutput> {
        ensure_periods(bars, self.min_periods().max(1))?;
        Ok(IndicatorOutput::new().value("obv", rolling::finite(Self::obv(bars))))
    }
}
