/**
 * Analytics Scenario Tests
 *
 * End-to-end checks over the public API:
 * - Indicator length gates and signal scenarios
 * - Pattern and unusual activity detection
 * - Score and risk bounds
 * - Signal performance tracking over SQLite
 */

use augur::services::indicators::calculate_indicators;
use augur::services::{
    calculate_risk_metrics, detect_patterns, detect_unusual_activity, generate_signals, AnalysisService,
    MasterScoreEngine, SignalPerformanceTracker, SqliteStore,
};
use augur::types::{
    ActivityType, AnalysisRequest, Bar, OverallSeverity, PatternType, Recommendation, RecordFilter, RiskLevel,
    RsiRisk, Severity, SignalStrength, SignalType, Timeframe,
};
use std::sync::Arc;

const DAY_MS: i64 = 86_400_000;

fn bars_from_closes(closes: &[f64]) -> Vec<Bar> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| Bar::new(i as i64 * DAY_MS, close, close + 0.5, close - 0.5, close, 1000.0))
        .collect()
}

fn create_uptrend_bars(count: usize) -> Vec<Bar> {
    let closes: Vec<f64> = (0..count).map(|i| 100.0 + i as f64).collect();
    bars_from_closes(&closes)
}

fn create_choppy_bars(count: usize) -> Vec<Bar> {
    (0..count)
        .map(|i| {
            let t = i as f64;
            let close = 100.0 + 10.0 * (t / 7.0).sin() + 3.0 * (t / 2.3).cos() + t * 0.05;
            let open = close - 0.8 * (t / 3.1).sin();
            Bar::new(
                i as i64 * DAY_MS,
                open,
                open.max(close) + 1.0,
                open.min(close) - 1.0,
                close,
                1000.0 + 300.0 * (t / 5.0).sin().abs(),
            )
        })
        .collect()
}

#[test]
fn test_length_gates() {
    let short = calculate_indicators(&create_uptrend_bars(13));
    assert!(!short.contains("rsi"));

    let rsi_ready = calculate_indicators(&create_uptrend_bars(14));
    assert!(rsi_ready.contains("rsi"));

    let no_sma50 = calculate_indicators(&create_uptrend_bars(49));
    assert!(!no_sma50.contains("sma_50"));
    assert!(no_sma50.contains("sma_20"));

    let sma50 = calculate_indicators(&create_uptrend_bars(50));
    assert!(sma50.contains("sma_50"));
    assert!(!sma50.contains("sma_200"));

    assert!(calculate_indicators(&create_uptrend_bars(1)).current.is_empty());
}

#[test]
fn test_rising_closes_give_macd_buy() {
    let bars = create_uptrend_bars(30);
    let indicators = calculate_indicators(&bars);
    let close = bars[bars.len() - 1].close;
    let signals = generate_signals(&indicators, close);

    assert!(signals.iter().any(|s| s.indicator == "MACD"
        && s.signal_type == SignalType::Buy
        && s.strength == SignalStrength::Strong
        && s.timeframe == Timeframe::Medium));
}

#[test]
fn test_equal_down_days_give_extreme_oversold() {
    let mut closes: Vec<f64> = (0..16).map(|i| 100.0 + i as f64).collect();
    closes.extend((1..=14).map(|i| 115.0 - i as f64));
    let bars = bars_from_closes(&closes);

    let indicators = calculate_indicators(&bars);
    assert_eq!(indicators.get("rsi"), Some(0.0));

    let risk = calculate_risk_metrics(&bars, &indicators).unwrap();
    assert_eq!(risk.rsi_risk, Some(RsiRisk::ExtremeOversold));

    let signals = generate_signals(&indicators, closes[closes.len() - 1]);
    assert!(signals.iter().any(|s| s.indicator == "RSI"
        && s.signal_type == SignalType::Buy
        && s.strength == SignalStrength::VeryStrong));
}

#[test]
fn test_bullish_engulfing_scenario() {
    let mut bars: Vec<Bar> = (0..12)
        .map(|i| Bar::new(i as i64 * 1000, 100.0, 100.5, 99.5, 100.0, 1000.0))
        .collect();
    bars[10] = Bar::new(10_000, 10.0, 10.2, 8.9, 9.0, 1000.0);
    bars[11] = Bar::new(11_000, 8.5, 10.6, 8.4, 10.5, 1000.0);

    let patterns = detect_patterns(&bars);
    let engulfing = patterns
        .iter()
        .find(|p| p.pattern_type == PatternType::BullishEngulfing)
        .unwrap();
    assert_eq!(engulfing.confidence, 85.0);
}

#[test]
fn test_volume_spike_z5_is_extreme() {
    let mut bars: Vec<Bar> = (0..30)
        .map(|i| {
            let (close, volume) = if i % 2 == 0 { (99.0, 900.0) } else { (101.0, 1100.0) };
            Bar::new(i as i64 * DAY_MS, close, close + 0.5, close - 0.5, close, volume)
        })
        .collect();
    bars.push(Bar::new(30 * DAY_MS, 100.0, 100.5, 99.5, 100.0, 1500.0));

    let report = detect_unusual_activity("aapl", &bars, None);
    assert!(report.has_unusual_activity);
    assert_eq!(report.overall_severity, OverallSeverity::Extreme);

    let spike = report
        .activities
        .iter()
        .find(|a| a.activity_type == ActivityType::VolumeSpike)
        .unwrap();
    assert_eq!(spike.severity, Severity::Extreme);
    assert!((spike.details.z_score - 5.0).abs() < 1e-9);
    assert_eq!(spike.confidence, 100.0);
}

#[test]
fn test_score_and_risk_bounds() {
    let engine = MasterScoreEngine::default();

    for count in [20, 35, 60, 120, 250] {
        let bars = create_choppy_bars(count);
        let indicators = calculate_indicators(&bars);
        let signals = generate_signals(&indicators, bars[count - 1].close);
        let patterns = detect_patterns(&bars);
        let risk = calculate_risk_metrics(&bars, &indicators).unwrap();

        assert!(risk.overall_risk_score <= 100);
        assert_eq!(risk.risk_level, RiskLevel::from_score(risk.overall_risk_score));

        let score = engine.score(&indicators, &signals, Some(&risk), &patterns);
        assert!((0.0..=100.0).contains(&score.master_score));
        assert_eq!(score.recommendation, Recommendation::from_score(score.master_score));
        assert!(score.top_factors.len() <= 3);

        for pattern in &patterns {
            assert!((0.0..=100.0).contains(&pattern.confidence));
        }
    }
}

#[test]
fn test_indicator_engine_is_idempotent() {
    let bars = create_choppy_bars(220);
    assert_eq!(calculate_indicators(&bars), calculate_indicators(&bars));
}

#[test]
fn test_tracker_over_sqlite() {
    let store = Arc::new(SqliteStore::new_in_memory().unwrap());
    let tracker = SignalPerformanceTracker::new(store.clone());
    let service = AnalysisService::new(MasterScoreEngine::default()).with_tracker(Arc::clone(&tracker));

    let request = AnalysisRequest::new("AAPL", create_uptrend_bars(60)).with_current_price(200.0);
    let decision = service.analyze(&request).unwrap();

    let pending = tracker.records(&RecordFilter::pending_for("AAPL")).unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].price_at_generation, 200.0);

    // Too early: nothing is evaluated
    assert_eq!(
        tracker
            .evaluate_pending("AAPL", 220.0, 2.0, decision.generated_at + DAY_MS / 2)
            .unwrap(),
        0
    );

    let now = decision.generated_at + 8 * DAY_MS;
    assert_eq!(tracker.evaluate_pending("AAPL", 220.0, 2.0, now).unwrap(), 1);
    assert_eq!(tracker.evaluate_pending("AAPL", 100.0, 2.0, now).unwrap(), 0);

    let metrics = tracker.get_accuracy_metrics(&RecordFilter::default()).unwrap();
    assert_eq!(metrics.overall.total_signals, 1);
    assert_eq!(metrics.overall.avg_return_percent, 10.0);
    assert_eq!(metrics.overall.avg_excess_return_percent, 8.0);
    assert_eq!(metrics.by_timeframe["7D"].count, 1);

    let stats = store.stats().unwrap();
    assert_eq!(stats.evaluated, 1);
    assert_eq!(stats.profitable, 1);
}

#[tokio::test]
async fn test_batch_analysis() {
    let service = Arc::new(AnalysisService::new(MasterScoreEngine::default()));
    let results = service
        .analyze_batch(vec![
            AnalysisRequest::new("AAPL", create_uptrend_bars(40)),
            AnalysisRequest::new("MSFT", create_choppy_bars(80)),
        ])
        .await;

    assert_eq!(results.len(), 2);
    for (symbol, result) in results {
        let decision = result.unwrap();
        assert_eq!(decision.symbol, symbol);
    }
}
