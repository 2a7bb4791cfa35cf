//! Bollinger Bands indicator.

use crate::error::Result;
use crate::services::indicators::{ensure_periods, Indicator};
use crate::services::rolling;
use crate::types::{Bar, IndicatorCategory, IndicatorOutput};

/// Bollinger Bands indicator.
///
/// Middle band = 20-bar SMA, upper/lower = middle +/- 2 sample standard deviations.
/// Width = (upper - lower) / middle, %B = (close - lower) / (upper - lower).
pub struct BollingerBands {
    period: usize,
    std_dev_multiplier: f64,
}

impl Default for BollingerBands {
    fn default() -> Self {
        Self {
            period: 20,
            std_dev_multiplier: 2.0,
        }
    }
}

impl Indicator for BollingerBands {
    fn id(&self) -> &str {
        "bollinger"
    }

    fn name(&self) -> &str {
        "Bollinger Bands (20, 2)"
    }

    fn category(&self) -> IndicatorCategory {
        IndicatorCategory::Volatility
    }

    fn min_periods(&self) -> usize {
        self.period
    }

    fn calculate(&self, bars: &[Bar]) -> Result<IndicatorOutput> {
        ensure_periods(bars, self.min_periods())?;

        let closes = rolling::closes(bars);
        let middle = rolling::sma(&closes, self.period);
        let std = rolling::rolling_std(&closes, self.period);

        let band = |sign: f64| -> Vec<Option<f64>> {
            middle
                .iter()
                .zip(std.iter())
                .map(|(m, s)| rolling::finite((*m)? + sign * self.std_dev_multiplier * (*s)?))
                .collect()
        };
        let upper = band(1.0);
        let lower = band(-1.0);

        let close = closes[closes.len() - 1];
        let (u, l, m) = (rolling::last(&upper), rolling::last(&lower), rolling::last(&middle));

        let width = match (u, l, m) {
            (Some(u), Some(l), Some(m)) => rolling::safe_div(u - l, m),
            _ => None,
        };
        let percent = match (u, l) {
            (Some(u), Some(l)) => rolling::safe_div(close - l, u - l),
            _ => None,
        };

        Ok(IndicatorOutput::new()
            .value("bb_upper", u)
            .value("bb_lower", l)
            .value("bb_middle", m)
            .value("bb_width", width)
            .value("bb_percent", percent)
            .series("bb_upper", upper)
            .series("bb_middle", middle)
            .series("bb_lower", lower))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn value(output: &IndicatorOutput, key: &str) -> Option<f64> {
        output.values.iter().find(|(k, _)| *k == key).and_then(|(_, v)| *v)
    }

    fn create_oscillating_bars(count: usize) -> Vec<Bar> {
        (0..count)
            .map(|i| {
                let close = 100.0 + if i % 2 == 0 { 2.0 } else { -2.0 };
                Bar::new(i as i64, close, close + 1.0, close - 1.0, close, 1000.0)
            })
            .collect()
    }

    #[test]
    fn test_bollinger_id_and_name() {
        let bb = BollingerBands::default();
        assert_eq!(bb.id(), "bollinger");
        assert_eq!(bb.category(), IndicatorCategory::Volatility);
    }

    #[test]
    fn test_bollinger_insufficient_data() {
        assert!(BollingerBands::default().calculate(&create_oscillating_bars(19)).is_err());
    }

    #[test]
    fn test_bollinger_band_ordering() {
        let output = BollingerBands::default().calculate(&create_oscillating_bars(40)).unwrap();
        let upper = value(&output, "bb_upper").unwrap();
        let middle = value(&output, "bb_middle").unwrap();
        let lower = value(&output, "bb_lower").unwrap();
        assert!(upper > middle && middle > lower);
        assert!((middle - 100.0).abs() < 1e-9);
        assert!(value(&output, "bb_width").unwrap() > 0.0);
        let percent = value(&output, "bb_percent").unwrap();
        assert!(percent > 0.0 && percent < 1.0);
    }

    #[test]
    fn test_bollinger_flat_percent_absent() {
        let bars: Vec<Bar> = (0..20).map(|i| Bar::new(i, 5.0, 5.0, 5.0, 5.0, 1.0)).collect();
        let output = BollingerBands::default().calculate(&bars).unwrap();
        assert_eq!(value(&output, "bb_percent"), None);
        assert_eq!(value(&output, "bb_middle"), Some(5.0));
    }
}
