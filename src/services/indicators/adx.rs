//! Average Directional Index (ADX) indicator.

use crate::error::Result;
use crate::services::indicators::{ensure_periods, Indicator};
use crate::services::rolling;
use crate::types::{Bar, IndicatorCategory, IndicatorOutput};

/// ADX (Average Directional Index) indicator.
///
/// Measures trend strength (not direction):
/// - Below 20: Weak trend / ranging market
/// - Above 25: Trending
///
/// +DI / -DI give the direction. ATR and both DMs are `period`-bar means;
/// ADX is the mean of the most recent `period` DX readings, or of all
/// available readings on a short series.
pub struct Adx {
    period: usize,
}

impl Default for Adx {
    fn default() -> Self {
        Self { period: 14 }
    }
}

impl Adx {
    /// +DM and -DM per bar. The first bar has no movement.
    fn directional_movement(bars: &[Bar]) -> (Vec<f64>, Vec<f64>) {
        let mut plus_dm = vec![0.0; bars.len()];
        let mut minus_dm = vec![0.0; bars.len()];

        for i in 1..bars.len() {
            let up_move = bars[i].high - bars[i - 1].high;
            let down_move = bars[i - 1].low - bars[i].low;

            if up_move > down_move && up_move > 0.0 {
                plus_dm[i] = up_move;
            }
            if down_move > up_move && down_move > 0.0 {
                minus_dm[i] = down_move;
            }
        }

        (plus_dm, minus_dm)
    }
}

impl Indicator for Adx {
    fn id(&self) -> &str {
        "adx"
    }

    fn name(&self) -> &str {
        "ADX (14)"
    }

    fn category(&self) -> IndicatorCategory {
        IndicatorCategory::Trend
    }

    fn min_periods(&self) -> usize {
        self.period
    }

    fn calculate(&self, bars: &[Bar]) -> Result<IndicatorOutput> {
        ensure_periods(bars, self.min_periods())?;

        let atr = rolling::sma(&rolling::true_range(bars), self.period);
        let (plus_dm, minus_dm) = Self::directional_movement(bars);
        let plus_dm_avg = rolling::sma(&plus_dm, self.period);
        let minus_dm_avg = rolling::sma(&minus_dm, self.period);

        let di = |dm: &[Option<f64>]| -> Vec<Option<f64>> {
            dm.iter()
                .zip(atr.iter())
                .map(|(dm, atr)| rolling::safe_div((*dm)?, (*atr)?).map(|r| r * 100.0))
                .collect()
        };
        let plus_di = di(&plus_dm_avg);
        let minus_di = di(&minus_dm_avg);

        let dx: Vec<Option<f64>> = plus_di
            .iter()
            .zip(minus_di.iter())
            .map(|(p, m)| {
                let (p, m) = ((*p)?, (*m)?);
                rolling::safe_div((p - m).abs(), p + m).map(|r| r * 100.0)
            })
            .collect();

        // DX is defined from index period - 1 onwards
        let readings = rolling::tail(&dx[self.period - 1..], self.period);
        let adx = readings
            .iter()
            .copied()
            .collect::<Option<Vec<f64>>>()
            .and_then(|values| rolling::mean(&values));

        Ok(IndicatorOutput::new()
            .value("adx", adx)
            .value("plus_di", rolling::last(&plus_di))
            .value("minus_di", rolling::last(&minus_di)))
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

    fn value(output: &IndicatorOutput, key: &str) -> Option<f64> {
        output.values.iter().find(|(k, _)| *k == key).and_then(|(_, v)| *v)
    }

    #[test]
    fn test_adx_id_and_name() {
        let adx = Adx::default();
        assert_eq!(adx.id(), "adx");
        assert_eq!(adx.name(), "ADX (14)");
        assert_eq!(adx.min_periods(), 14);
    }

    #[test]
    fn test_adx_insufficient_data() {
        assert!(Adx::default().calculate(&create_uptrend_bars(13)).is_err());
    }

    #[test]
    fn test_adx_uptrend_direction() {
        let output = Adx::default().calculate(&create_uptrend_bars(60)).unwrap();
        let plus_di = value(&output, "plus_di").unwrap();
        let minus_di = value(&output, "minus_di").unwrap();
        let adx = value(&output, "adx").unwrap();
        assert!(plus_di > minus_di);
        assert!(adx > 25.0);
        assert!(adx <= 100.0);
    }

    #[test]
    fn test_adx_downtrend_direction() {
        let output = Adx::default().calculate(&create_downtrend_bars(60)).unwrap();
        assert!(value(&output, "minus_di").unwrap() > value(&output, "plus_di").unwrap());
    }

    #[test]
    fn test_adx_flat_market_absent() {
        let bars: Vec<Bar> = (0..30).map(|i| Bar::new(i, 5.0, 5.0, 5.0, 5.0, 1.0)).collect();
        let output = Adx::default().calculate(&bars).unwrap();
        assert_eq!(value(&output, "adx"), None);
        assert_eq!(value(&output, "plus_di"), None);
    }
}
