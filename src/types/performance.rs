use crate::types::{SignalStrength, SignalType};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// A persisted signal awaiting or holding its realized outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignalPerformanceRecord {
    pub id: Uuid,
    pub symbol: String,
    pub signal_type: SignalType,
    pub strength: SignalStrength,
    pub master_score: f64,
    pub technical_score: Option<f64>,
    pub sentiment_score: Option<f64>,
    pub activity_score: Option<f64>,
    /// Instrument price when the signal was generated.
    pub price_at_generation: f64,
    /// Generation time (Unix ms).
    pub generated_at: i64,
    pub pending: bool,
    pub evaluated_at: Option<i64>,
    pub timeframe_days: Option<u32>,
    pub return_percent: Option<f64>,
    pub benchmark_return_percent: Option<f64>,
    pub excess_return: Option<f64>,
    pub is_profitable: Option<bool>,
}

impl SignalPerformanceRecord {
    /// Create a new pending record.
    pub fn new(
        symbol: &str,
        signal_type: SignalType,
        strength: SignalStrength,
        master_score: f64,
        price_at_generation: f64,
        generated_at: i64,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            symbol: symbol.to_uppercase(),
            signal_type,
            strength,
            master_score,
            technical_score: None,
            sentiment_score: None,
            activity_score: None,
            price_at_generation,
            generated_at,
            pending: true,
            evaluated_at: None,
            timeframe_days: None,
            return_percent: None,
            benchmark_return_percent: None,
            excess_return: None,
            is_profitable: None,
        }
    }

    pub fn with_component_scores(
        mut self,
        technical: Option<f64>,
        sentiment: Option<f64>,
        activity: Option<f64>,
    ) -> Self {
        self.technical_score = technical;
        self.sentiment_score = sentiment;
        self.activity_score = activity;
        self
    }

    /// Apply an evaluation. No-op once the record has been evaluated.
    pub fn apply(&mut self, evaluation: &SignalEvaluation) -> bool {
        if !self.pending {
            return false;
        }
        self.pending = false;
        self.evaluated_at = Some(evaluation.evaluated_at);
        self.timeframe_days = Some(evaluation.timeframe_days);
        self.return_percent = Some(evaluation.return_percent);
        self.benchmark_return_percent = Some(evaluation.benchmark_return_percent);
        self.excess_return = Some(evaluation.excess_return);
        self.is_profitable = Some(evaluation.is_profitable);
        true
    }
}

/// Realized outcome written onto a pending record.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignalEvaluation {
    pub evaluated_at: i64,
    pub timeframe_days: u32,
    pub return_percent: f64,
    pub benchmark_return_percent: f64,
    pub excess_return: f64,
    pub is_profitable: bool,
}

/// Filter for record queries. Unset fields match everything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordFilter {
    pub symbol: Option<String>,
    pub signal_type: Option<SignalType>,
    pub timeframe_days: Option<u32>,
    pub pending: Option<bool>,
    /// Only records generated strictly before this time (Unix ms).
    pub generated_before: Option<i64>,
}

impl RecordFilter {
    pub fn evaluated() -> Self {
        Self {
            pending: Some(false),
            ..Default::default()
        }
    }

    pub fn pending_for(symbol: &str) -> Self {
        Self {
            symbol: Some(symbol.to_uppercase()),
            pending: Some(true),
            ..Default::default()
        }
    }

    pub fn symbol(mut self, symbol: &str) -> Self {
        self.symbol = Some(symbol.to_uppercase());
        self
    }

    pub fn signal_type(mut self, signal_type: SignalType) -> Self {
        self.signal_type = Some(signal_type);
        self
    }

    pub fn timeframe_days(mut self, days: u32) -> Self {
        self.timeframe_days = Some(days);
        self
    }

    pub fn generated_before(mut self, ts: i64) -> Self {
        self.generated_before = Some(ts);
        self
    }

    /// Check whether a record passes this filter.
    pub fn matches(&self, record: &SignalPerformanceRecord) -> bool {
        self.symbol.as_ref().map_or(true, |s| record.symbol.eq_ignore_ascii_case(s))
            && self.signal_type.map_or(true, |t| record.signal_type == t)
            && self.timeframe_days.map_or(true, |d| record.timeframe_days == Some(d))
            && self.pending.map_or(true, |p| record.pending == p)
            && self.generated_before.map_or(true, |ts| record.generated_at < ts)
    }
}

/// Aggregate outcome statistics.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverallAccuracy {
    pub total_signals: usize,
    pub profitable_signals: usize,
    pub win_rate: f64,
    pub avg_return_percent: f64,
    pub avg_benchmark_return_percent: f64,
    pub avg_excess_return_percent: f64,
}

/// Win rate and average return for one bucket.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BucketAccuracy {
    pub count: usize,
    pub win_rate: f64,
    pub avg_return: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BenchmarkComparison {
    pub outperformed: usize,
    pub underperformed: usize,
    pub beat_rate: f64,
}

/// Evaluated signal accuracy, optionally filtered.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccuracyMetrics {
    pub overall: OverallAccuracy,
    pub by_signal_type: BTreeMap<String, BucketAccuracy>,
    /// Keyed "1D", "7D", "30D".
    pub by_timeframe: BTreeMap<String, BucketAccuracy>,
    pub vs_benchmark: BenchmarkComparison,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub timestamp: i64,
}
