//! Commodity Channel Index (CCI) indicator.

use crate::error::Result;
use crate::services::indicators::{ensure_periods, Indicator};
use crate::services::rolling;
use crate::types::{Bar, IndicatorCategory, IndicatorOutput};

/// CCI (Commodity Channel Index) indicator.
///
/// CCI = (typical price - SMA(typical)) / (0.015 * mean absolute deviation).
/// Readings beyond +/-100 mark overbought / oversold conditions.
pub struct Cci {
    period: usize,
}

impl Default for Cci {
    fn default() -> Self {
        Self { period: 20 }
    }
}

impl Cci {
    const CONSTANT: f64 = 0.015;
}

impl Indicator for Cci {
    fn id(&self) -> &str {
        "cci"
    }

    fn name(&self) -> &str {
        "CCI (20)"
    }

    fn category(&self) -> IndicatorCategory {
        IndicatorCategory::Momentum
    }

    fn min_periods(&self) -> usize {
        self.period
    }

    fn calculate(&self, bars: &[Bar]) -> Result<IndicatorOutput> {
        ensure_periods(bars, self.min_periods())?;

        let typical: Vec<f64> = rolling::tail(bars, self.period)
            .iter()
            .map(Bar::typical_price)
            .collect();

        let value = match (rolling::mean(&typical), rolling::mean_abs_deviation(&typical)) {
            (Some(sma), Some(mad)) => {
                let current = typical[typical.len() - 1];
                rolling::safe_div(current - sma, Self::CONSTANT * mad)
            }
            _ => None,
        };

        Ok(IndicatorOutput::new().value("cci", value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_uptrend_bars(count: usize) -> Vec<Bar> {
        (0..count)
            .map(|i| {
                let base = 100.0 + i as f64 * 1.5;
                Bar::new(i as i64, base, base + 2.0, base - 1.0, base + 1.0, 1000.0)
            })
            .collect()
    }

    fn create_downtrend_bars(count: usize) -> Vec<Bar> {
        (0..count)
            .map(|i| {
                let base = 200.0 - i as f64 * 1.5;
                Bar::new(i as i64, base, base + 1.0, base - 2.0, base - 1.0, 1000.0)
            })
            .collect()
    }

    #[test]
    fn test_cci_id_and_name() {
        let cci = Cci::default();
        assert_eq!(cci.id(), "cci");
        assert_eq!(cci.name(), "CCI (20)");
        assert_eq!(cci.min_periods(), 20);
    }

    #[test]
    fn test_cci_insufficient_data() {
        assert!(Cci::default().calculate(&create_uptrend_bars(19)).is_err());
    }

    #[test]
    fn test_cci_uptrend_positive() {
        let output = Cci::default().calculate(&create_uptrend_bars(40)).unwrap();
        assert!(output.values[0].1.unwrap() > 100.0);
    }

    #[test]
    fn test_cci_downtrend_negative() {
        let output = Cci::default().calculate(&create_downtrend_bars(40)).unwrap();
        assert!(output.values[0].1.unwrap() < -100.0);
    }
}
