//! Stochastic Oscillator indicator.

use crate::error::Result;
use crate::services::indicators::{ensure_periods, Indicator};
use crate::services::rolling;
use crate::types::{Bar, IndicatorCategory, IndicatorOutput};

/// Stochastic Oscillator indicator.
///
/// %K = 100 * (close - lowest low) / (highest high - lowest low) over `k_period` bars.
/// %D = `d_period`-bar SMA of %K. A flat range leaves %K undefined.
pub struct Stochastic {
    k_period: usize,
    d_period: usize,
}

impl Default for Stochastic {
    fn default() -> Self {
        Self {
            k_period: 14,
            d_period: 3,
        }
    }
}

impl Stochastic {
    fn k_series(&self, bars: &[Bar]) -> Vec<Option<f64>> {
        let highest = rolling::rolling_max(&rolling::highs(bars), self.k_period);
        let lowest = rolling::rolling_min(&rolling::lows(bars), self.k_period);

        bars.iter()
            .zip(highest.iter().zip(lowest.iter()))
            .map(|(bar, (hh, ll))| {
                let (hh, ll) = ((*hh)?, (*ll)?);
                rolling::safe_div(bar.close - ll, hh - ll).map(|k| k * 100.0)
            })
            .collect()
    }
}

impl Indicator for Stochastic {
    fn id(&self) -> &str {
        "stochastic"
    }

    fn name(&self) -> &str {
        "Stochastic (14, 3)"
    }

    fn category(&self) -> IndicatorCategory {
        IndicatorCategory::Momentum
    }

    fn min_periods(&self) -> usize {
        self.k_period
    }

    fn calculate(&self, bars: &[Bar]) -> Result<IndicatorOutput> {
        ensure_periods(bars, self.min_periods())?;

        let k = self.k_series(bars);
        let d = rolling::rolling_opt(&k, self.d_period, rolling::mean);

        Ok(IndicatorOutput::new()
            .value("stoch_k", rolling::last(&k))
            .value("stoch_d", rolling::last(&d)))
    }
}
