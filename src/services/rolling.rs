//! Rolling-window building blocks shared by indicators, patterns and risk.
//!
//! Series functions return one entry per input value. Entries that cannot be
//! computed yet (window not filled, division by zero) are `None`.

use crate::types::Bar;

/// Keep a value only if it is finite.
pub fn finite(value: f64) -> Option<f64> {
    if value.is_finite() {
        Some(value)
    } else {
        None
    }
}

/// Divide, returning None for a zero or non-finite result.
pub fn safe_div(numerator: f64, denominator: f64) -> Option<f64> {
    if denominator == 0.0 {
        return None;
    }
    finite(numerator / denominator)
}

/// Arithmetic mean.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    finite(values.iter().sum::<f64>() / values.len() as f64)
}

/// Sample standard deviation (n - 1 denominator).
pub fn sample_std(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let avg = mean(values)?;
    let variance = values.iter().map(|v| (v - avg).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    finite(variance.sqrt())
}

/// Population standard deviation (n denominator).
pub fn population_std(values: &[f64]) -> Option<f64> {
    let avg = mean(values)?;
    let variance = values.iter().map(|v| (v - avg).powi(2)).sum::<f64>() / values.len() as f64;
    finite(variance.sqrt())
}

/// Mean absolute deviation around the mean.
pub fn mean_abs_deviation(values: &[f64]) -> Option<f64> {
    let avg = mean(values)?;
    mean(&values.iter().map(|v| (v - avg).abs()).collect::<Vec<_>>())
}

pub fn max(values: &[f64]) -> Option<f64> {
    values.iter().copied().fold(None, |acc, v| match acc {
        Some(m) if m >= v => Some(m),
        _ => Some(v),
    })
}

pub fn min(values: &[f64]) -> Option<f64> {
    values.iter().copied().fold(None, |acc, v| match acc {
        Some(m) if m <= v => Some(m),
        _ => Some(v),
    })
}

/// Least-squares slope of `values` against their index.
pub fn linear_slope(values: &[f64]) -> Option<f64> {
    let n = values.len();
    if n < 2 {
        return None;
    }
    let x_mean = (n - 1) as f64 / 2.0;
    let y_mean = mean(values)?;

    let mut numerator = 0.0;
    let mut denominator = 0.0;
    for (i, y) in values.iter().enumerate() {
        let dx = i as f64 - x_mean;
        numerator += dx * (y - y_mean);
        denominator += dx * dx;
    }
    safe_div(numerator, denominator)
}

/// Percentage change from `from` to `to`.
pub fn pct_change(from: f64, to: f64) -> Option<f64> {
    safe_div(to - from, from).map(|r| r * 100.0)
}

/// Apply `f` to each full trailing window of `period` values.
pub fn rolling<F>(values: &[f64], period: usize, f: F) -> Vec<Option<f64>>
where
    F: Fn(&[f64]) -> Option<f64>,
{
    (0..values.len())
        .map(|i| {
            if period == 0 || i + 1 < period {
                None
            } else {
                f(&values[i + 1 - period..=i])
            }
        })
        .collect()
}

/// Like [`rolling`], but the window is undefined if any entry in it is.
pub fn rolling_opt<F>(values: &[Option<f64>], period: usize, f: F) -> Vec<Option<f64>>
where
    F: Fn(&[f64]) -> Option<f64>,
{
    (0..values.len())
        .map(|i| {
            if period == 0 || i + 1 < period {
                return None;
            }
            let window: Option<Vec<f64>> = values[i + 1 - period..=i].iter().copied().collect();
            window.and_then(|w| f(&w))
        })
        .collect()
}

/// Simple moving average series.
pub fn sma(values: &[f64], period: usize) -> Vec<Option<f64>> {
    rolling(values, period, mean)
}

/// Exponential moving average with alpha = 2 / (period + 1), seeded with the first value.
pub fn ema(values: &[f64], period: usize) -> Vec<f64> {
    let alpha = 2.0 / (period as f64 + 1.0);
    let mut result = Vec::with_capacity(values.len());
    let mut prev: Option<f64> = None;

    for &value in values {
        let next = match prev {
            None => value,
            Some(p) => alpha * value + (1.0 - alpha) * p,
        };
        result.push(next);
        prev = Some(next);
    }

    result
}

/// Rolling sample standard deviation series.
pub fn rolling_std(values: &[f64], period: usize) -> Vec<Option<f64>> {
    rolling(values, period, sample_std)
}

pub fn rolling_max(values: &[f64], period: usize) -> Vec<Option<f64>> {
    rolling(values, period, max)
}

pub fn rolling_min(values: &[f64], period: usize) -> Vec<Option<f64>> {
    rolling(values, period, min)
}

/// True range per bar. The first bar has no previous close and uses high - low.
pub fn true_range(bars: &[Bar]) -> Vec<f64> {
    bars.iter()
        .enumerate()
        .map(|(i, bar)| {
            let high_low = bar.high - bar.low;
            if i == 0 {
                return high_low;
            }
            let prev_close = bars[i - 1].close;
            high_low
                .max((bar.high - prev_close).abs())
                .max((bar.low - prev_close).abs())
        })
        .collect()
}

pub fn closes(bars: &[Bar]) -> Vec<f64> {
    bars.iter().map(|b| b.close).collect()
}

pub fn highs(bars: &[Bar]) -> Vec<f64> {
    bars.iter().map(|b| b.high).collect()
}

pub fn lows(bars: &[Bar]) -> Vec<f64> {
    bars.iter().map(|b| b.low).collect()
}

pub fn volumes(bars: &[Bar]) -> Vec<f64> {
    bars.iter().map(|b| b.volume).collect()
}

/// Last entry of a series, flattened.
pub fn last(series: &[Option<f64>]) -> Option<f64> {
    series.last().copied().flatten().and_then(finite)
}

/// The trailing `count` elements (or all of them if shorter).
pub fn tail<T>(values: &[T], count: usize) -> &[T] {
    &values[values.len().saturating_sub(count)..]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_sma_window() {
        let values = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        let result = sma(&values, 3);
        assert_eq!(result[0], None);
        assert_eq!(result[1], None);
        assert_eq!(result[2], Some(2.0));
        assert_eq!(result[4], Some(4.0));
    }

    #[test]
    fn test_ema_seeded_with_first_value() {
        let values = vec![10.0, 20.0];
        let result = ema(&values, 3);
        assert_eq!(result[0], 10.0);
        // alpha = 0.5
        assert!(approx(result[1], 15.0));
    }

    #[test]
    fn test_sample_vs_population_std() {
        let values = vec![2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert!(approx(population_std(&values).unwrap(), 2.0));
        assert!(sample_std(&values).unwrap() > 2.0);
        assert_eq!(sample_std(&[1.0]), None);
    }

    #[test]
    fn test_mean_abs_deviation() {
        let values = vec![1.0, 2.0, 3.0];
        assert!(approx(mean_abs_deviation(&values).unwrap(), 2.0 / 3.0));
    }

    #[test]
    fn test_linear_slope() {
        let values = vec![1.0, 3.0, 5.0, 7.0];
        assert!(approx(linear_slope(&values).unwrap(), 2.0));
        assert!(approx(linear_slope(&[5.0, 5.0, 5.0]).unwrap(), 0.0));
        assert_eq!(linear_slope(&[1.0]), None);
    }

    #[test]
    fn test_safe_div_zero() {
        assert_eq!(safe_div(1.0, 0.0), None);
        assert_eq!(safe_div(1.0, 2.0), Some(0.5));
    }

    #[test]
    fn test_rolling_opt_propagates_gaps() {
        let values = vec![None, Some(1.0), Some(2.0), Some(3.0)];
        let result = rolling_opt(&values, 2, mean);
        assert_eq!(result[1], None);
        assert_eq!(result[2], Some(1.5));
        assert_eq!(result[3], Some(2.5));
    }

    #[test]
    fn test_true_range_first_bar() {
        let bars = vec![
            Bar::new(0, 10.0, 12.0, 9.0, 11.0, 0.0),
            Bar::new(1, 11.0, 11.5, 10.5, 11.0, 0.0),
            Bar::new(2, 14.0, 15.0, 13.0, 14.0, 0.0),
        ];
        let tr = true_range(&bars);
        assert_eq!(tr[0], 3.0);
        assert_eq!(tr[1], 1.0);
        // gap up: high - prev close
        assert_eq!(tr[2], 4.0);
    }

    #[test]
    fn test_min_max_tail() {
        let values = vec![3.0, 1.0, 4.0, 1.0, 5.0];
        assert_eq!(max(&values), Some(5.0));
        assert_eq!(min(&values), Some(1.0));
        assert_eq!(tail(&values, 2), &[1.0, 5.0]);
        assert_eq!(tail(&values, 10).len(), 5);
        assert_eq!(max(&[]), None);
    }
}
