//! Master score fusion.
//!
//! Four sub-scores (short-term momentum, medium-term trend, long-term trend,
//! risk) start at a neutral 50, are adjusted by indicator readings and
//! signals, clamped to 0-100 and combined with configurable weights.

use crate::config::{ScoringConfig, StrengthPoints};
use crate::error::{AnalysisError, Result};
use crate::services::indicators::coverage;
use crate::types::{
    Confidence, IndicatorSet, MasterScore, Pattern, PatternBias, Recommendation, RiskMetrics, ScoreBreakdown,
    ScoreComponent, ScoreFactor, Signal, SignalStrength, Timeframe,
};
use tracing::warn;

const NEUTRAL: f64 = 50.0;

const SHORT_TERM_LABEL: &str = "Short-term (RSI, Stochastic, Williams %R)";
const MEDIUM_TERM_LABEL: &str = "Medium-term (MACD, ADX, SMA Crossovers)";
const LONG_TERM_LABEL: &str = "Long-term (Trends, Support/Resistance)";
const RISK_LABEL: &str = "Risk Metrics (Volatility, Drawdown)";

/// Computes the composite master score.
#[derive(Debug, Clone, Copy, Default)]
pub struct MasterScoreEngine {
    config: ScoringConfig,
}

impl MasterScoreEngine {
    pub fn new(config: ScoringConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    /// Compute the master score.
    ///
    /// Fails only on an unusable configuration or a non-finite result.
    pub fn calculate(
        &self,
        indicators: &IndicatorSet,
        signals: &[Signal],
        risk: Option<&RiskMetrics>,
        patterns: &[Pattern],
    ) -> Result<MasterScore> {
        let total = self.config.weights.total();
        if !total.is_finite() || total <= 0.0 {
            return Err(AnalysisError::InvalidInput(format!(
                "master score weights must sum to a positive value, got {}",
                total
            )));
        }
        let weights = self.config.weights.normalized();

        let points = &self.config.strength_points;
        let short = short_term_score(indicators, signals, points);
        let medium = medium_term_score(indicators, signals, points);
        let long = long_term_score(indicators, signals, patterns, points);
        let risk = risk_score(indicators, risk);

        let raw = short * weights.short_term
            + medium * weights.medium_term
            + long * weights.long_term
            + risk * weights.risk;
        if !raw.is_finite() {
            return Err(AnalysisError::Computation("master score is not finite".to_string()));
        }
        let master_score = round2(raw.clamp(0.0, 100.0));

        let breakdown = ScoreBreakdown {
            short_term: ScoreComponent::new(round2(short), weights.short_term, SHORT_TERM_LABEL),
            medium_term: ScoreComponent::new(round2(medium), weights.medium_term, MEDIUM_TERM_LABEL),
            long_term: ScoreComponent::new(round2(long), weights.long_term, LONG_TERM_LABEL),
            risk: ScoreComponent::new(round2(risk), weights.risk, RISK_LABEL),
        };

        Ok(MasterScore {
            master_score,
            recommendation: Recommendation::from_score(master_score),
            confidence: Confidence::from_ratio(coverage(indicators)),
            top_factors: top_factors(&breakdown),
            breakdown,
            timestamp: chrono::Utc::now().timestamp_millis(),
        })
    }

    /// Best-effort variant of [`calculate`](Self::calculate): falls back to
    /// the neutral score on failure.
    pub fn score(
        &self,
        indicators: &IndicatorSet,
        signals: &[Signal],
        risk: Option<&RiskMetrics>,
        patterns: &[Pattern],
    ) -> MasterScore {
        match self.calculate(indicators, signals, risk, patterns) {
            Ok(score) => score,
            Err(e) => {
                warn!("Master score calculation failed, using neutral score: {}", e);
                self.neutral()
            }
        }
    }

    /// 50 / HOLD / LOW with every sub-score at 50.
    pub fn neutral(&self) -> MasterScore {
        let weights = if self.config.weights.total() > 0.0 {
            self.config.weights.normalized()
        } else {
            self.config.weights
        };
        MasterScore {
            master_score: NEUTRAL,
            recommendation: Recommendation::Hold,
            confidence: Confidence::Low,
            breakdown: ScoreBreakdown {
                short_term: ScoreComponent::new(NEUTRAL, weights.short_term, SHORT_TERM_LABEL),
                medium_term: ScoreComponent::new(NEUTRAL, weights.medium_term, MEDIUM_TERM_LABEL),
                long_term: ScoreComponent::new(NEUTRAL, weights.long_term, LONG_TERM_LABEL),
                risk: ScoreComponent::new(NEUTRAL, weights.risk, RISK_LABEL),
            },
            top_factors: Vec::new(),
            timestamp: chrono::Utc::now().timestamp_millis(),
        }
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn strength_points(strength: SignalStrength, points: &StrengthPoints) -> f64 {
    match strength {
        SignalStrength::Weak => points.weak,
        SignalStrength::Medium => points.medium,
        SignalStrength::Strong => points.strong,
        SignalStrength::VeryStrong => points.very_strong,
    }
}

/// Net points of the signals in one timeframe. HOLD contributes nothing.
fn signal_points(signals: &[Signal], timeframe: Timeframe, points: &StrengthPoints) -> f64 {
    signals
        .iter()
        .filter(|s| s.timeframe == timeframe)
        .map(|s| s.signal_type.polarity() * strength_points(s.strength, points))
        .sum()
}

fn short_term_score(ind: &IndicatorSet, signals: &[Signal], points: &StrengthPoints) -> f64 {
    let mut score = NEUTRAL;

    if let Some(rsi) = ind.get("rsi") {
        if rsi < 30.0 {
            score += (30.0 - rsi).min(25.0);
        } else if rsi > 70.0 {
            score -= (rsi - 70.0).min(25.0);
        }
    }

    if let (Some(k), Some(d)) = (ind.get("stoch_k"), ind.get("stoch_d")) {
        if k < 20.0 && d < 20.0 {
            score += 20.0;
        } else if k > 80.0 && d > 80.0 {
            score -= 20.0;
        } else if k > d && k < 80.0 {
            score += 10.0;
        } else if k < d && k > 20.0 {
            score -= 10.0;
        }
    }

    if let Some(wr) = ind.get("williams_r") {
        if wr < -80.0 {
            score += 15.0;
        } else if wr > -20.0 {
            score -= 15.0;
        }
    }

    if let Some(cci) = ind.get("cci") {
        if cci < -100.0 {
            score += 10.0;
        } else if cci > 100.0 {
            score -= 10.0;
        }
    }

    score += signal_points(signals, Timeframe::Short, points);
    score.clamp(0.0, 100.0)
}

fn medium_term_score(ind: &IndicatorSet, signals: &[Signal], points: &StrengthPoints) -> f64 {
    let mut score = NEUTRAL;

    if let (Some(macd), Some(signal)) = (ind.get("macd"), ind.get("macd_signal")) {
        let hist = ind.get("macd_histogram");
        if macd > signal {
            score += 15.0;
            if hist.is_some_and(|h| h > 0.0) {
                score += 10.0;
            }
        } else {
            score -= 15.0;
            if hist.is_some_and(|h| h < 0.0) {
                score -= 10.0;
            }
        }
    }

    if let Some(adx) = ind.get("adx") {
        if adx > 25.0 {
            if let (Some(plus), Some(minus)) = (ind.get("plus_di"), ind.get("minus_di")) {
                if plus > minus {
                    score += 15.0;
                } else if minus > plus {
                    score -= 15.0;
                }
            }
        } else if adx < 20.0 {
            score -= 5.0;
        }
    }

    if let (Some(fast), Some(slow)) = (ind.get("sma_20"), ind.get("sma_50")) {
        if fast > slow {
            score += 15.0;
        } else if fast < slow {
            score -= 15.0;
        }
    }

    score += signal_points(signals, Timeframe::Medium, points);
    score.clamp(0.0, 100.0)
}

fn long_term_score(ind: &IndicatorSet, signals: &[Signal], patterns: &[Pattern], points: &StrengthPoints) -> f64 {
    let mut score = NEUTRAL;

    if let (Some(sma_200), Some(close)) = (ind.get("sma_200"), ind.last_close) {
        if close > sma_200 {
            score += 20.0;
        } else {
            score -= 20.0;
        }
    }

    score += signal_points(signals, Timeframe::Long, points);

    let mean_confidence = |bias: PatternBias| {
        let confidences: Vec<f64> = patterns
            .iter()
            .filter(|p| p.bias() == bias)
            .map(|p| p.confidence)
            .collect();
        crate::services::rolling::mean(&confidences)
    };
    if let Some(avg) = mean_confidence(PatternBias::Bullish) {
        score += avg / 100.0 * 15.0;
    }
    if let Some(avg) = mean_confidence(PatternBias::Bearish) {
        score -= avg / 100.0 * 15.0;
    }

    score.clamp(0.0, 100.0)
}

fn risk_score(ind: &IndicatorSet, risk: Option<&RiskMetrics>) -> f64 {
    let Some(metrics) = risk else {
        return NEUTRAL;
    };

    // Low overall risk pulls the score up
    let mut score = NEUTRAL + (NEUTRAL - metrics.overall_risk_score as f64) * 0.6;

    let atr_pct = metrics.atr_percentage.or_else(|| {
        let atr = ind.get("atr")?;
        let close = ind.last_close.filter(|c| *c > 0.0)?;
        Some(atr / close * 100.0)
    });
    if let Some(atr_pct) = atr_pct {
        if atr_pct < 1.0 {
            score += 10.0;
        } else if atr_pct > 3.0 {
            score -= 10.0;
        }
    }

    if metrics.current_drawdown.is_some_and(|dd| dd < -10.0) {
        score -= 5.0;
    }

    score.clamp(0.0, 100.0)
}

/// The three components furthest from neutral, weighted.
fn top_factors(breakdown: &ScoreBreakdown) -> Vec<ScoreFactor> {
    let mut factors: Vec<(f64, ScoreFactor)> = [
        ("Short-term Momentum", &breakdown.short_term),
        ("Medium-term Trend", &breakdown.medium_term),
        ("Long-term Trend", &breakdown.long_term),
        ("Risk Metrics", &breakdown.risk),
    ]
    .into_iter()
    .map(|(name, component)| {
        let impact = (component.score - NEUTRAL).abs() * component.weight;
        let factor = ScoreFactor {
            name: name.to_string(),
            score: component.score,
            contribution: round2((component.score - NEUTRAL) * component.weight),
        };
        (impact, factor)
    })
    .collect();

    factors.sort_by(|a, b| b.0.total_cmp(&a.0));
    factors.into_iter().take(3).map(|(_, factor)| factor).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MasterScoreWeights;
    use crate::types::{PatternType, RiskLevel};

    fn set(values: &[(&str, f64)]) -> IndicatorSet {
        let mut indicators = IndicatorSet::new();
        for (key, value) in values {
            indicators.insert(key, Some(*value));
        }
        indicators
    }

    fn quiet_risk(score: u8) -> RiskMetrics {
        RiskMetrics {
            historical_volatility_20d: None,
            atr_percentage: Some(2.0),
            bb_width_percentage: None,
            max_drawdown: None,
            current_drawdown: Some(0.0),
            rsi_risk: None,
            trend_strength: None,
            average_volume_20d: None,
            volume_volatility: None,
            relative_volume: None,
            price_range_20d: None,
            price_position: None,
            gap_percentage: None,
            distance_to_support_pct: None,
            distance_to_resistance_pct: None,
            ma_alignment: None,
            volatility_regime: None,
            drawdown_status: None,
            overall_risk_score: score,
            risk_level: RiskLevel::from_score(score),
        }
    }

    #[test]
    fn test_empty_inputs_are_neutral() {
        let engine = MasterScoreEngine::default();
        let score = engine.calculate(&IndicatorSet::new(), &[], None, &[]).unwrap();
        assert_eq!(score.master_score, 50.0);
        assert_eq!(score.recommendation, Recommendation::Hold);
        assert_eq!(score.confidence, Confidence::Low);
        assert_eq!(score.breakdown.risk.score, 50.0);
        assert!(score.top_factors.iter().all(|f| f.contribution == 0.0));
    }

    #[test]
    fn test_oversold_raises_short_term() {
        let indicators = set(&[("rsi", 10.0), ("williams_r", -90.0)]);
        let signals = vec![Signal::buy(SignalStrength::VeryStrong, "RSI", "oversold", Timeframe::Short)];
        let score = MasterScoreEngine::default()
            .calculate(&indicators, &signals, None, &[])
            .unwrap();
        // 50 + 20 (rsi) + 15 (williams) + 20 (signal), clamped
        assert_eq!(score.breakdown.short_term.score, 100.0);
        assert_eq!(score.top_factors[0].name, "Short-term Momentum");
        assert_eq!(score.top_factors[0].contribution, 15.0);
        assert_eq!(score.master_score, 65.0);
        assert_eq!(score.recommendation, Recommendation::Buy);
    }

    #[test]
    fn test_medium_term_macd_and_crossover() {
        let indicators = set(&[
            ("macd", 1.0),
            ("macd_signal", 0.5),
            ("macd_histogram", 0.5),
            ("sma_20", 110.0),
            ("sma_50", 100.0),
        ]);
        let score = MasterScoreEngine::default()
            .calculate(&indicators, &[], None, &[])
            .unwrap();
        assert_eq!(score.breakdown.medium_term.score, 90.0);
    }

    #[test]
    fn test_long_term_uses_last_close_and_patterns() {
        let mut indicators = set(&[("sma_200", 100.0)]);
        indicators.last_close = Some(120.0);
        let patterns = vec![
            Pattern::new(PatternType::BullishEngulfing, 80.0, "", 0),
            Pattern::new(PatternType::Doji, 75.0, "", 0),
        ];
        let score = MasterScoreEngine::default()
            .calculate(&indicators, &[], None, &patterns)
            .unwrap();
        // 50 + 20 + 0.8 * 15
        assert_eq!(score.breakdown.long_term.score, 82.0);
    }

    #[test]
    fn test_risk_sub_score() {
        let engine = MasterScoreEngine::default();
        let score = engine
            .calculate(&IndicatorSet::new(), &[], Some(&quiet_risk(20)), &[])
            .unwrap();
        // 50 + (50 - 20) * 0.6
        assert_eq!(score.breakdown.risk.score, 68.0);

        let mut risky = quiet_risk(80);
        risky.atr_percentage = Some(4.0);
        risky.current_drawdown = Some(-15.0);
        let score = engine.calculate(&IndicatorSet::new(), &[], Some(&risky), &[]).unwrap();
        // 50 - 18 - 10 - 5
        assert_eq!(score.breakdown.risk.score, 17.0);
    }

    #[test]
    fn test_bearish_everything_is_strong_sell() {
        let mut indicators = set(&[
            ("rsi", 95.0),
            ("stoch_k", 95.0),
            ("stoch_d", 90.0),
            ("williams_r", -5.0),
            ("cci", 200.0),
            ("macd", -1.0),
            ("macd_signal", 0.0),
            ("macd_histogram", -1.0),
            ("adx", 40.0),
            ("plus_di", 10.0),
            ("minus_di", 30.0),
            ("sma_20", 90.0),
            ("sma_50", 100.0),
            ("sma_200", 150.0),
        ]);
        indicators.last_close = Some(80.0);
        let score = MasterScoreEngine::default()
            .calculate(&indicators, &[], Some(&quiet_risk(100)), &[])
            .unwrap();
        assert!(score.master_score < 20.0);
        assert_eq!(score.recommendation, Recommendation::StrongSell);
    }

    #[test]
    fn test_custom_weights() {
        let config = ScoringConfig {
            weights: MasterScoreWeights {
                short_term: 1.0,
                medium_term: 0.0,
                long_term: 0.0,
                risk: 0.0,
            },
            ..Default::default()
        };
        let indicators = set(&[("rsi", 10.0)]);
        let score = MasterScoreEngine::new(config)
            .calculate(&indicators, &[], None, &[])
            .unwrap();
        assert_eq!(score.master_score, 70.0);
    }

    #[test]
    fn test_percentage_weights_are_normalized() {
        let config = ScoringConfig {
            weights: MasterScoreWeights::parse("30,30,20,20").unwrap(),
            ..Default::default()
        };
        let engine = MasterScoreEngine::new(config);

        let neutral = engine.calculate(&IndicatorSet::new(), &[], None, &[]).unwrap();
        assert_eq!(neutral.master_score, 50.0);
        assert_eq!(neutral.recommendation, Recommendation::Hold);
        assert!((neutral.breakdown.short_term.weight - 0.3).abs() < 1e-9);

        let indicators = set(&[("rsi", 10.0)]);
        let scaled = engine.calculate(&indicators, &[], None, &[]).unwrap();
        let unit = MasterScoreEngine::default()
            .calculate(&indicators, &[], None, &[])
            .unwrap();
        assert_eq!(scaled.master_score, unit.master_score);
    }

    #[test]
    fn test_zero_weights_fall_back_to_neutral() {
        let config = ScoringConfig {
            weights: MasterScoreWeights {
                short_term: 0.0,
                medium_term: 0.0,
                long_term: 0.0,
                risk: 0.0,
            },
            ..Default::default()
        };
        let engine = MasterScoreEngine::new(config);
        assert!(engine.calculate(&IndicatorSet::new(), &[], None, &[]).is_err());

        let score = engine.score(&IndicatorSet::new(), &[], None, &[]);
        assert_eq!(score.master_score, 50.0);
        assert_eq!(score.recommendation, Recommendation::Hold);
        assert_eq!(score.confidence, Confidence::Low);
    }

    #[test]
    fn test_top_factors_at_most_three() {
        let indicators = set(&[("rsi", 10.0), ("macd", 1.0), ("macd_signal", 0.0)]);
        let score = MasterScoreEngine::default()
            .calculate(&indicators, &[], Some(&quiet_risk(0)), &[])
            .unwrap();
        assert_eq!(score.top_factors.len(), 3);
        let impacts: Vec<f64> = score.top_factors.iter().map(|f| f.contribution.abs()).collect();
        assert!(impacts.windows(2).all(|w| w[0] >= w[1]));
    }
}
