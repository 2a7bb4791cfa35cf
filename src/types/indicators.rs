use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Category of a technical indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndicatorCategory {
    Trend,
    Momentum,
    Volatility,
    Volume,
    Levels,
}

impl IndicatorCategory {
    /// Get display name for this category.
    pub fn name(&self) -> &'static str {
        match self {
            IndicatorCategory::Trend => "Trend",
            IndicatorCategory::Momentum => "Momentum",
            IndicatorCategory::Volatility => "Volatility",
            IndicatorCategory::Volume => "Volume",
            IndicatorCategory::Levels => "Support/Resistance",
        }
    }
}

/// Values produced by one indicator calculation.
///
/// `values` holds the latest reading per key (None when undefined).
/// `series` holds full per-bar series for chart-relevant keys.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IndicatorOutput {
    pub values: Vec<(&'static str, Option<f64>)>,
    pub series: Vec<(&'static str, Vec<Option<f64>>)>,
}

impl IndicatorOutput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn value(mut self, key: &'static str, value: Option<f64>) -> Self {
        self.values.push((key, value));
        self
    }

    pub fn series(mut self, key: &'static str, series: Vec<Option<f64>>) -> Self {
        self.series.push((key, series));
        self
    }
}

/// The indicator engine result for one bar series.
///
/// A key is present in `current` only when its minimum window was met and
/// the value is finite.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndicatorSet {
    pub current: BTreeMap<String, f64>,
    pub historical: BTreeMap<String, BTreeMap<i64, f64>>,
    /// Latest close of the series the set was computed from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_close: Option<f64>,
}

impl IndicatorSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the current value of an indicator.
    pub fn get(&self, key: &str) -> Option<f64> {
        self.current.get(key).copied()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.current.contains_key(key)
    }

    /// Insert a value, dropping anything non-finite.
    pub fn insert(&mut self, key: &str, value: Option<f64>) {
        if let Some(v) = value.filter(|v| v.is_finite()) {
            self.current.insert(key.to_string(), v);
        }
    }

    /// Insert a historical series aligned with `timestamps`, skipping undefined points.
    pub fn insert_series(&mut self, key: &str, timestamps: &[i64], series: &[Option<f64>]) {
        let points: BTreeMap<i64, f64> = timestamps
            .iter()
            .zip(series.iter())
            .filter_map(|(ts, v)| v.filter(|v| v.is_finite()).map(|v| (*ts, v)))
            .collect();
        if !points.is_empty() {
            self.historical.insert(key.to_string(), points);
        }
    }

    pub fn len(&self) -> usize {
        self.current.len()
    }

    pub fn is_empty(&self) -> bool {
        self.current.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_skips_non_finite() {
        let mut set = IndicatorSet::new();
        set.insert("a", Some(1.0));
        set.insert("b", Some(f64::NAN));
        set.insert("c", Some(f64::INFINITY));
        set.insert("d", None);
        assert_eq!(set.len(), 1);
        assert_eq!(set.get("a"), Some(1.0));
        assert!(!set.contains("b"));
    }

    #[test]
    fn test_insert_series_skips_gaps() {
        let mut set = IndicatorSet::new();
        set.insert_series("sma_20", &[1, 2, 3], &[None, Some(2.0), Some(f64::NAN)]);
        let series = set.historical.get("sma_20").unwrap();
        assert_eq!(series.len(), 1);
        assert_eq!(series.get(&2), Some(&2.0));
    }

    #[test]
    fn test_insert_series_empty_is_omitted() {
        let mut set = IndicatorSet::new();
        set.insert_series("rsi", &[1, 2], &[None, None]);
        assert!(set.historical.is_empty());
    }
}
