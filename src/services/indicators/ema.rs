//! Exponential Moving Average (EMA) indicator.

use crate::error::Result;
use crate::services::indicators::{ensure_periods, Indicator};
use crate::services::rolling;
use crate::types::{Bar, IndicatorCategory, IndicatorOutput};

/// EMA of closes, alpha = 2 / (period + 1), seeded with the first close.
pub struct Ema {
    period: usize,
    id: String,
    name: String,
}

impl Ema {
    pub fn new(period: usize) -> Self {
        Self {
            period,
            id: format!("ema_{}", period),
            name: format!("EMA ({})", period),
        }
    }
}

impl Indicator for Ema {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn category(&self) -> IndicatorCategory {
        IndicatorCategory::Trend
    }

    fn min_periods(&self) -> usize {
        self.period
    }

    fn calculate(&self, bars: &[Bar]) -> Result<IndicatorOutput> {
        ensure_periods(bars, self.min_periods())?;

        let series: Vec<Option<f64>> = rolling::ema(&rolling::closes(bars), self.period)
            .into_iter()
            .map(rolling::finite)
            .collect();
        let key = match self.period {
            12 => "ema_12",
            26 => "ema_26",
            _ => "ema",
        };

        Ok(IndicatorOutput::new()
            .value(key, rolling::last(&series))
            .series(key, series))
    }
}
