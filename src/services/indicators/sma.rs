//! Simple Moving Average (SMA) indicator.

use crate::error::Result;
use crate::services::indicators::{ensure_periods, Indicator};
use crate::services::rolling;
use crate::types::{Bar, IndicatorCategory, IndicatorOutput};

/// SMA (Simple Moving Average) of closes.
///
/// Emits `sma_{period}` once `period` bars are available.
pub struct Sma {
    period: usize,
    id: String,
    name: String,
}

impl Sma {
    pub fn new(period: usize) -> Self {
        Self {
            period,
            id: format!("sma_{}", period),
            name: format!("SMA ({})", period),
        }
    }
}

impl Indicator for Sma {
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

        let series = rolling::sma(&rolling::closes(bars), self.period);
        let key = match self.period {
            20 => "sma_20",
            50 => "sma_50",
            200 => "sma_200",
            _ => "sma",
        };

        Ok(IndicatorOutput::new()
            .value(key, rolling::last(&series))
            .series(key, series))
    }
}
