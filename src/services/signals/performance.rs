//! Signal performance tracking.
//!
//! Decisions are recorded as pending records with the price at generation.
//! Once at least a day has passed they are evaluated against a caller-supplied
//! price and benchmark return, exactly once.

use crate::error::{AnalysisError, Result};
use crate::types::{
    AccuracyMetrics, BenchmarkComparison, BucketAccuracy, InvestmentDecision, OverallAccuracy, Recommendation,
    RecordFilter, SignalEvaluation, SignalPerformanceRecord, SignalStrength, SignalType,
};
use dashmap::DashMap;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

const DAY_MS: i64 = 24 * 60 * 60 * 1000;

/// Persistence seam for signal performance records.
pub trait SignalRecordStore: Send + Sync {
    /// Store a new record.
    fn create(&self, record: &SignalPerformanceRecord) -> Result<()>;

    /// Records matching `filter`, oldest first.
    fn query(&self, filter: &RecordFilter) -> Result<Vec<SignalPerformanceRecord>>;

    /// Apply an evaluation to a pending record.
    /// Returns false when the record is missing or already evaluated.
    fn update(&self, id: Uuid, evaluation: &SignalEvaluation) -> Result<bool>;

    /// Delete evaluated records generated before `cutoff` (Unix ms).
    fn delete_evaluated_before(&self, cutoff: i64) -> Result<usize>;
}

/// In-memory record store.
#[derive(Default)]
pub struct MemoryRecordStore {
    records: DashMap<Uuid, SignalPerformanceRecord>,
}

impl MemoryRecordStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl SignalRecordStore for MemoryRecordStore {
    fn create(&self, record: &SignalPerformanceRecord) -> Result<()> {
        self.records.insert(record.id, record.clone());
        Ok(())
    }

    fn query(&self, filter: &RecordFilter) -> Result<Vec<SignalPerformanceRecord>> {
        let mut records: Vec<SignalPerformanceRecord> = self
            .records
            .iter()
            .filter(|entry| filter.matches(entry.value()))
            .map(|entry| entry.value().clone())
            .collect();
        records.sort_by_key(|r| r.generated_at);
        Ok(records)
    }

    fn update(&self, id: Uuid, evaluation: &SignalEvaluation) -> Result<bool> {
        Ok(self
            .records
            .get_mut(&id)
            .map(|mut record| record.apply(evaluation))
            .unwrap_or(false))
    }

    fn delete_evaluated_before(&self, cutoff: i64) -> Result<usize> {
        let before = self.records.len();
        self.records
            .retain(|_, record| record.pending || record.generated_at >= cutoff);
        Ok(before - self.records.len())
    }
}

/// Map a recommendation onto the signal recorded for it.
pub fn recommendation_signal(recommendation: Recommendation) -> (SignalType, SignalStrength) {
    match recommendation {
        Recommendation::StrongBuy => (SignalType::Buy, SignalStrength::Strong),
        Recommendation::Buy => (SignalType::Buy, SignalStrength::Medium),
        Recommendation::Hold => (SignalType::Hold, SignalStrength::Weak),
        Recommendation::Sell => (SignalType::Sell, SignalStrength::Medium),
        Recommendation::StrongSell => (SignalType::Sell, SignalStrength::Strong),
    }
}

/// Evaluation window for the elapsed time, or None before a full day.
fn timeframe_bucket(elapsed_ms: i64) -> Option<u32> {
    let days = elapsed_ms / DAY_MS;
    match days {
        d if d >= 30 => Some(30),
        d if d >= 7 => Some(7),
        d if d >= 1 => Some(1),
        _ => None,
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn percent(part: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    round2(part as f64 / total as f64 * 100.0)
}

fn mean_of<F>(records: &[&SignalPerformanceRecord], f: F) -> f64
where
    F: Fn(&SignalPerformanceRecord) -> Option<f64>,
{
    let values: Vec<f64> = records.iter().filter_map(|r| f(r)).collect();
    if values.is_empty() {
        return 0.0;
    }
    round2(values.iter().sum::<f64>() / values.len() as f64)
}

fn bucket(records: &[&SignalPerformanceRecord]) -> BucketAccuracy {
    let wins = records.iter().filter(|r| r.is_profitable == Some(true)).count();
    BucketAccuracy {
        count: records.len(),
        win_rate: percent(wins, records.len()),
        avg_return: mean_of(records, |r| r.return_percent),
    }
}

fn timeframe_label(days: u32) -> String {
    format!("{}D", days)
}

/// Records decisions and measures how they played out.
pub struct SignalPerformanceTracker {
    store: Arc<dyn SignalRecordStore>,
}

impl SignalPerformanceTracker {
    pub fn new(store: Arc<dyn SignalRecordStore>) -> Arc<Self> {
        Arc::new(Self { store })
    }

    /// Tracker backed by a [`MemoryRecordStore`].
    pub fn in_memory() -> Arc<Self> {
        Self::new(MemoryRecordStore::new())
    }

    /// Persist a pending record.
    pub fn record_signal(&self, record: SignalPerformanceRecord) -> Result<Uuid> {
        if !record.price_at_generation.is_finite() || record.price_at_generation <= 0.0 {
            return Err(AnalysisError::InvalidInput(format!(
                "price at generation must be positive, got {}",
                record.price_at_generation
            )));
        }
        self.store.create(&record)?;
        debug!(
            "Recorded {} {} signal for {} at {:.2}",
            record.strength.as_str(),
            record.signal_type.as_str(),
            record.symbol,
            record.price_at_generation
        );
        Ok(record.id)
    }

    /// Raw records matching `filter`, pending ones included.
    pub fn records(&self, filter: &RecordFilter) -> Result<Vec<SignalPerformanceRecord>> {
        self.store.query(filter)
    }

    /// Record a decision's recommendation at `price`.
    pub fn record_decision(&self, decision: &InvestmentDecision, price: f64) -> Result<Uuid> {
        let (signal_type, strength) = recommendation_signal(decision.master_score.recommendation);
        let activity_score = decision
            .unusual_activity
            .activities
            .iter()
            .map(|a| a.confidence)
            .fold(None, |acc: Option<f64>, c| Some(acc.map_or(c, |a| a.max(c))));
        // Technical composite excludes the risk sub-score
        let breakdown = &decision.master_score.breakdown;
        let technical_score =
            round2((breakdown.short_term.score + breakdown.medium_term.score + breakdown.long_term.score) / 3.0);

        let record = SignalPerformanceRecord::new(
            &decision.symbol,
            signal_type,
            strength,
            decision.master_score.master_score,
            price,
            decision.generated_at,
        )
        .with_component_scores(
            Some(technical_score),
            Some(decision.sentiment.sentiment_score),
            activity_score,
        );

        self.record_signal(record)
    }

    /// Evaluate pending records for `symbol` that are at least a day old.
    ///
    /// Returns the number of records evaluated.
    pub fn evaluate_pending(
        &self,
        symbol: &str,
        current_price: f64,
        benchmark_return: f64,
        now: i64,
    ) -> Result<usize> {
        if !current_price.is_finite() || !benchmark_return.is_finite() {
            return Err(AnalysisError::InvalidInput(
                "current price and benchmark return must be finite".to_string(),
            ));
        }

        let pending = self.store.query(&RecordFilter::pending_for(symbol))?;
        let mut evaluated = 0;

        for record in pending {
            let Some(timeframe_days) = timeframe_bucket(now - record.generated_at) else {
                continue;
            };
            if record.price_at_generation <= 0.0 {
                warn!("Skipping record {} with non-positive generation price", record.id);
                continue;
            }

            let return_percent =
                (current_price - record.price_at_generation) / record.price_at_generation * 100.0;
            let evaluation = SignalEvaluation {
                evaluated_at: now,
                timeframe_days,
                return_percent: round2(return_percent),
                benchmark_return_percent: round2(benchmark_return),
                excess_return: round2(return_percent - benchmark_return),
                is_profitable: return_percent > 0.0,
            };

            if self.store.update(record.id, &evaluation)? {
                evaluated += 1;
            }
        }

        if evaluated > 0 {
            info!("Evaluated {} pending signal(s) for {}", evaluated, symbol.to_uppercase());
        }
        Ok(evaluated)
    }

    /// Accuracy over evaluated records matching `filter`.
    pub fn get_accuracy_metrics(&self, filter: &RecordFilter) -> Result<AccuracyMetrics> {
        let filter = RecordFilter {
            pending: Some(false),
            ..filter.clone()
        };
        let records = self.store.query(&filter)?;
        let timestamp = chrono::Utc::now().timestamp_millis();

        if records.is_empty() {
            return Ok(AccuracyMetrics {
                message: Some("No evaluated signals yet".to_string()),
                timestamp,
                ..Default::default()
            });
        }

        let all: Vec<&SignalPerformanceRecord> = records.iter().collect();
        let total = all.len();
        let profitable = all.iter().filter(|r| r.is_profitable == Some(true)).count();

        let overall = OverallAccuracy {
            total_signals: total,
            profitable_signals: profitable,
            win_rate: percent(profitable, total),
            avg_return_percent: mean_of(&all, |r| r.return_percent),
            avg_benchmark_return_percent: mean_of(&all, |r| r.benchmark_return_percent),
            avg_excess_return_percent: mean_of(&all, |r| r.excess_return),
        };

        let mut by_type: BTreeMap<String, Vec<&SignalPerformanceRecord>> = BTreeMap::new();
        let mut by_timeframe: BTreeMap<String, Vec<&SignalPerformanceRecord>> = BTreeMap::new();
        for record in &all {
            by_type
                .entry(record.signal_type.as_str().to_string())
                .or_default()
                .push(record);
            if let Some(days) = record.timeframe_days {
                by_timeframe.entry(timeframe_label(days)).or_default().push(record);
            }
        }

        let outperformed = all.iter().filter(|r| r.excess_return.is_some_and(|e| e > 0.0)).count();

        Ok(AccuracyMetrics {
            overall,
            by_signal_type: by_type.iter().map(|(k, v)| (k.clone(), bucket(v))).collect(),
            by_timeframe: by_timeframe.iter().map(|(k, v)| (k.clone(), bucket(v))).collect(),
            vs_benchmark: BenchmarkComparison {
                outperformed,
                underperformed: total - outperformed,
                beat_rate: percent(outperformed, total),
            },
            message: None,
            timestamp,
        })
    }

    /// Win rate and average return per signal strength.
    pub fn get_strength_accuracy(&self, filter: &RecordFilter) -> Result<BTreeMap<String, BucketAccuracy>> {
        let filter = RecordFilter {
            pending: Some(false),
            ..filter.clone()
        };
        let records = self.store.query(&filter)?;

        let mut by_strength: BTreeMap<String, Vec<&SignalPerformanceRecord>> = BTreeMap::new();
        for record in &records {
            by_strength
                .entry(record.strength.as_str().to_string())
                .or_default()
                .push(record);
        }

        Ok(by_strength.iter().map(|(k, v)| (k.clone(), bucket(v))).collect())
    }

    /// Delete evaluated records older than `days`.
    pub fn cleanup_older_than(&self, days: u32) -> Result<usize> {
        let cutoff = chrono::Utc::now().timestamp_millis() - i64::from(days) * DAY_MS;
        let removed = self.store.delete_evaluated_before(cutoff)?;
        if removed > 0 {
            info!("Cleaned up {} evaluated signal record(s) older than {} days", removed, days);
        }
        Ok(removed)
    }
}
