//! Per-symbol analysis pipeline.
//!
//! Bars flow through the indicator engine into patterns, signals and risk,
//! which feed the master score. Sentiment and unusual activity run alongside
//! and everything is merged into one [`InvestmentDecision`].

use crate::config::Config;
use crate::error::{AnalysisError, Result};
use crate::services::cache::{analysis_key, Cache};
use crate::services::indicators::{calculate_indicators, coverage};
use crate::services::master_score::MasterScoreEngine;
use crate::services::patterns::PatternDetector;
use crate::services::risk::calculate_risk_metrics;
use crate::services::sentiment::SentimentAnalyzer;
use crate::services::signals::{MemoryRecordStore, SignalGenerator, SignalPerformanceTracker, SignalRecordStore};
use crate::services::sqlite_store::SqliteStore;
use crate::services::unusual_activity::UnusualActivityDetector;
use crate::types::{
    validate_bars, AccuracyMetrics, AnalysisRequest, DataQuality, IndicatorSet, InvestmentDecision, RecordFilter,
    RiskMetrics,
};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Runs the full analytics pipeline for one or many symbols.
pub struct AnalysisService {
    engine: MasterScoreEngine,
    patterns: PatternDetector,
    generator: SignalGenerator,
    sentiment: SentimentAnalyzer,
    activity: UnusualActivityDetector,
    cache: Option<Arc<Cache<InvestmentDecision>>>,
    tracker: Option<Arc<SignalPerformanceTracker>>,
    record_signals: bool,
}

impl AnalysisService {
    /// Service without cache or performance tracking.
    pub fn new(engine: MasterScoreEngine) -> Self {
        Self {
            engine,
            patterns: PatternDetector::new(),
            generator: SignalGenerator::new(),
            sentiment: SentimentAnalyzer::new(),
            activity: UnusualActivityDetector::default(),
            cache: None,
            tracker: None,
            record_signals: false,
        }
    }

    /// Build the service described by `config`.
    ///
    /// Uses a SQLite record store when a database path is configured and an
    /// in-memory store otherwise.
    pub fn from_config(config: &Config) -> Result<Self> {
        let store: Arc<dyn SignalRecordStore> = match &config.database_path {
            Some(path) => Arc::new(SqliteStore::new(path)?),
            None => MemoryRecordStore::new(),
        };

        let mut service = Self::new(MasterScoreEngine::new(config.scoring))
            .with_cache(Arc::new(Cache::new(config.cache_ttl)))
            .with_tracker(SignalPerformanceTracker::new(store));
        service.record_signals = config.record_signals;
        Ok(service)
    }

    pub fn with_cache(mut self, cache: Arc<Cache<InvestmentDecision>>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Attach a tracker. Decisions are recorded with it from now on.
    pub fn with_tracker(mut self, tracker: Arc<SignalPerformanceTracker>) -> Self {
        self.tracker = Some(tracker);
        self.record_signals = true;
        self
    }

    pub fn cache(&self) -> Option<&Arc<Cache<InvestmentDecision>>> {
        self.cache.as_ref()
    }

    pub fn tracker(&self) -> Option<&Arc<SignalPerformanceTracker>> {
        self.tracker.as_ref()
    }

    /// Analyze one symbol.
    ///
    /// Fails only on invalid input. Component failures degrade to their
    /// default outputs.
    pub fn analyze(&self, request: &AnalysisRequest) -> Result<InvestmentDecision> {
        if request.symbol.trim().is_empty() {
            return Err(AnalysisError::InvalidInput("empty symbol".to_string()));
        }
        validate_bars(&request.bars)?;
        if let Some(price) = request.current_price {
            if !price.is_finite() || price <= 0.0 {
                return Err(AnalysisError::InvalidInput(format!("invalid current price {}", price)));
            }
        }

        let key = analysis_key(request);
        if let Some(hit) = self.cache.as_ref().and_then(|cache| cache.get(&key)) {
            debug!("Cache hit for {}", key);
            return Ok(hit);
        }

        let symbol = request.symbol.trim().to_uppercase();
        let bars = &request.bars;
        let close = bars
            .last()
            .map(|bar| bar.close)
            .ok_or_else(|| AnalysisError::InvalidInput("empty bar series".to_string()))?;

        let indicators = calculate_indicators(bars);
        let patterns = self.patterns.detect(bars);
        let signals = self.generator.generate(&indicators, close);
        let risk_metrics = self.risk_metrics(&symbol, request, &indicators);
        let master_score = self
            .engine
            .score(&indicators, &signals, risk_metrics.as_ref(), &patterns);

        let sentiment = self.sentiment.analyze(&symbol, &request.news);
        let unusual_activity = self.activity.detect(&symbol, bars, request.current_price);

        let price = request.current_price.unwrap_or(close);
        let signal_performance = self.refresh_performance(&symbol, price, request.benchmark_return);

        let decision = InvestmentDecision {
            symbol: symbol.clone(),
            data_quality: DataQuality::from_ratio(coverage(&indicators)),
            master_score,
            indicators,
            signals,
            patterns,
            risk_metrics,
            sentiment,
            unusual_activity,
            signal_performance,
            generated_at: chrono::Utc::now().timestamp_millis(),
        };

        if self.record_signals {
            if let Some(tracker) = &self.tracker {
                if let Err(e) = tracker.record_decision(&decision, price) {
                    warn!("Failed to record decision for {}: {}", symbol, e);
                }
            }
        }

        if let Some(cache) = &self.cache {
            cache.insert(key, decision.clone());
        }

        debug!(
            "Analyzed {}: score {:.2} ({})",
            symbol,
            decision.master_score.master_score,
            decision.master_score.recommendation.label()
        );
        Ok(decision)
    }

    /// Analyze many symbols concurrently on blocking workers.
    ///
    /// Results come back in request order, each with its own outcome.
    pub async fn analyze_batch(
        self: Arc<Self>,
        requests: Vec<AnalysisRequest>,
    ) -> Vec<(String, Result<InvestmentDecision>)> {
        let handles: Vec<_> = requests
            .into_iter()
            .map(|request| {
                let service = Arc::clone(&self);
                let symbol = request.symbol.to_uppercase();
                (symbol, tokio::task::spawn_blocking(move || service.analyze(&request)))
            })
            .collect();

        let mut results = Vec::with_capacity(handles.len());
        for (symbol, handle) in handles {
            let result = match handle.await {
                Ok(result) => result,
                Err(e) => Err(AnalysisError::Computation(format!("analysis task failed: {}", e))),
            };
            if let Err(e) = &result {
                warn!("Analysis failed for {}: {}", symbol, e);
            }
            results.push((symbol, result));
        }

        info!("Analyzed batch of {} symbols", results.len());
        results
    }

    fn risk_metrics(
        &self,
        symbol: &str,
        request: &AnalysisRequest,
        indicators: &IndicatorSet,
    ) -> Option<RiskMetrics> {
        match calculate_risk_metrics(&request.bars, indicators) {
            Ok(metrics) => Some(metrics),
            Err(e) if e.is_insufficient_data() => {
                debug!("Skipping risk metrics for {}: {}", symbol, e);
                None
            }
            Err(e) => {
                warn!("Risk metrics failed for {}: {}", symbol, e);
                None
            }
        }
    }

    /// Evaluate due signals when a benchmark return is known, then report
    /// the symbol's track record.
    fn refresh_performance(&self, symbol: &str, price: f64, benchmark_return: Option<f64>) -> Option<AccuracyMetrics> {
        let tracker = self.tracker.as_ref()?;

        if let Some(benchmark) = benchmark_return {
            let now = chrono::Utc::now().timestamp_millis();
            if let Err(e) = tracker.evaluate_pending(symbol, price, benchmark, now) {
                warn!("Failed to evaluate pending signals for {}: {}", symbol, e);
            }
        }

        match tracker.get_accuracy_metrics(&RecordFilter::default().symbol(symbol)) {
            Ok(metrics) => Some(metrics),
            Err(e) => {
                warn!("Failed to load signal performance for {}: {}", symbol, e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Bar, NewsItem, SentimentLabel};
    use std::time::Duration;

    fn create_uptrend_bars(count: usize) -> Vec<Bar> {
        (0..count)
            .map(|i| {
                let base = 100.0 + i as f64 * 0.8 + (i % 3) as f64 * 0.4;
                Bar::new(
                    i as i64 * 86_400_000,
                    base - 0.3,
                    base + 1.0,
                    base - 1.0,
                    base + 0.3,
                    1000.0 + (i % 5) as f64 * 50.0,
                )
            })
            .collect()
    }

    fn service() -> AnalysisService {
        AnalysisService::new(MasterScoreEngine::default())
    }

    #[test]
    fn test_rejects_invalid_input() {
        let svc = service();
        assert!(svc.analyze(&AnalysisRequest::new("AAPL", Vec::new())).is_err());
        assert!(svc.analyze(&AnalysisRequest::new(" ", create_uptrend_bars(30))).is_err());

        let mut bars = create_uptrend_bars(30);
        bars[10].close = f64::NAN;
        assert!(svc.analyze(&AnalysisRequest::new("AAPL", bars)).is_err());

        let request = AnalysisRequest::new("AAPL", create_uptrend_bars(30)).with_current_price(-1.0);
        assert!(svc.analyze(&request).is_err());
    }

    #[test]
    fn test_full_pipeline() {
        let request = AnalysisRequest::new("aapl", create_uptrend_bars(60))
            .with_news(vec![NewsItem::new("Shares rally to record high", "")]);
        let decision = service().analyze(&request).unwrap();

        assert_eq!(decision.symbol, "AAPL");
        assert!(decision.indicators.current.contains_key("sma_50"));
        assert!(!decision.indicators.current.contains_key("sma_200"));
        assert!(decision.risk_metrics.is_some());
        assert!((0.0..=100.0).contains(&decision.master_score.master_score));
        assert_eq!(decision.sentiment.sentiment_label, SentimentLabel::ExtremelyBullish);
        assert!(decision.unusual_activity.warning.is_none());
        assert!(decision.signal_performance.is_none());
    }

    #[test]
    fn test_short_series_degrades() {
        let decision = service()
            .analyze(&AnalysisRequest::new("AAPL", create_uptrend_bars(5)))
            .unwrap();

        assert!(decision.risk_metrics.is_none());
        assert!(decision.patterns.is_empty());
        assert_eq!(decision.data_quality, DataQuality::Medium);
        assert_eq!(decision.sentiment.sentiment_label, SentimentLabel::NoData);
        assert!(decision.unusual_activity.warning.is_some());
        assert!(!decision.unusual_activity.has_unusual_activity);
    }

    #[test]
    fn test_cache_hit() {
        let cache = Arc::new(Cache::new(Duration::from_secs(60)));
        let svc = service().with_cache(Arc::clone(&cache));
        let request = AnalysisRequest::new("AAPL", create_uptrend_bars(40));

        let first = svc.analyze(&request).unwrap();
        let second = svc.analyze(&request).unwrap();
        assert_eq!(first, second);
        assert_eq!(cache.stats().hits, 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_new_live_price_is_not_served_from_cache() {
        let cache = Arc::new(Cache::new(Duration::from_secs(60)));
        let svc = service().with_cache(Arc::clone(&cache));
        let bars = create_uptrend_bars(40);

        svc.analyze(&AnalysisRequest::new("AAPL", bars.clone()).with_current_price(100.0))
            .unwrap();
        let repriced = svc
            .analyze(&AnalysisRequest::new("AAPL", bars.clone()).with_current_price(150.0))
            .unwrap();
        let fresh = service()
            .analyze(&AnalysisRequest::new("AAPL", bars).with_current_price(150.0))
            .unwrap();

        assert_eq!(cache.stats().hits, 0);
        assert_eq!(cache.len(), 2);
        assert!(repriced.unusual_activity.has_unusual_activity);
        let kinds = |d: &InvestmentDecision| {
            d.unusual_activity
                .activities
                .iter()
                .map(|a| (a.activity_type, a.severity))
                .collect::<Vec<_>>()
        };
        assert_eq!(kinds(&repriced), kinds(&fresh));
    }

    #[test]
    fn test_decisions_are_recorded() {
        let tracker = SignalPerformanceTracker::in_memory();
        let svc = service().with_tracker(Arc::clone(&tracker));
        let request = AnalysisRequest::new("AAPL", create_uptrend_bars(40)).with_current_price(150.0);

        let decision = svc.analyze(&request).unwrap();
        let metrics = decision.signal_performance.unwrap();
        assert_eq!(metrics.overall.total_signals, 0);
        assert!(metrics.message.is_some());

        let pending = tracker.records(&RecordFilter::pending_for("AAPL")).unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].price_at_generation, 150.0);
        assert_eq!(pending[0].master_score, decision.master_score.master_score);

        let breakdown = &decision.master_score.breakdown;
        let technical = (breakdown.short_term.score + breakdown.medium_term.score + breakdown.long_term.score) / 3.0;
        let recorded = pending[0].technical_score.unwrap();
        assert!((recorded - technical).abs() < 0.01);
        assert_eq!(pending[0].sentiment_score, Some(decision.sentiment.sentiment_score));
    }

    #[test]
    fn test_from_config_uses_memory_store() {
        let svc = AnalysisService::from_config(&Config::default()).unwrap();
        assert!(svc.cache().is_some());
        assert!(svc.tracker().is_some());
        assert!(svc.record_signals);
    }

    #[tokio::test]
    async fn test_analyze_batch_keeps_order() {
        let svc = Arc::new(service());
        let requests = vec![
            AnalysisRequest::new("aapl", create_uptrend_bars(40)),
            AnalysisRequest::new("bad", Vec::new()),
            AnalysisRequest::new("msft", create_uptrend_bars(25)),
        ];

        let results = svc.analyze_batch(requests).await;
        assert_eq!(results.len(), 3);
        assert_eq!(results[0].0, "AAPL");
        assert!(results[0].1.is_ok());
        assert_eq!(results[1].0, "BAD");
        assert!(results[1].1.is_err());
        assert_eq!(results[2].1.as_ref().unwrap().symbol, "MSFT");
    }
}
