//! Accumulation/Distribution Line indicator.

use crate::error::Result;
use crate::services::indicators::{ensure_periods, Indicator};
use crate::services::rolling;
use crate::types::{Bar, IndicatorCategory, IndicatorOutput};

/// A/D line: cumulative close location value times volume.
///
/// CLV = ((close - low) - (high - close)) / (high - low); bars with no range contribute 0.
pub struct AdLine {
    min_bars: usize,
}

impl Default for AdLine {
    fn default() -> Self {
        Self { min_bars: 20 }
    }
}

impl AdLine {
    fn close_location_value(bar: &Bar) -> f64 {
        rolling::safe_div((bar.close - bar.low) - (bar.high - bar.close), bar.range()).unwrap_or(0.0)
    }
}

impl Indicator for AdLine {
    fn id(&self) -> &str {
        "ad_line"
    }

    fn name(&self) -> &str {
        "Accumulation/Distribution"
    }

    fn category(&self) -> IndicatorCategory {
        IndicatorCategory::Volume
    }

    fn min_periods(&self) -> usize {
        self.min_bars
    }

    fn calculate(&self, bars: &[Bar]) -> Result<IndicatorOutput> {
        ensure_periods(bars, self.min_periods())?;

        let ad: f64 = bars
            .iter()
            .map(|bar| Self::close_location_value(bar) * bar.volume)
            .sum();

        Ok(IndicatorOutput::new().value("ad_line", rolling::finite(ad)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ad_line_closes_at_high_accumulate() {
        let bars: Vec<Bar> = (0..20).map(|i| Bar::new(i, 9.0, 10.0, 8.0, 10.0, 50.0)).collect();
        let output = AdLine::default().calculate(&bars).unwrap();
        assert_eq!(output.values[0].1, Some(1000.0));
    }

    #[test]
    fn test_ad_line_flat_bars_contribute_zero() {
        let bars: Vec<Bar> = (0..20).map(|i| Bar::new(i, 5.0, 5.0, 5.0, 5.0, 50.0)).collect();
        let output = AdLine::default().calculate(&bars).unwrap();
        assert_eq!(output.values[0].1, Some(0.0));
    }
}
