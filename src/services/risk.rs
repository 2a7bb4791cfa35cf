//! Risk metrics: volatility, drawdown, liquidity, level distance and a
//! composite 0-100 risk score.

use crate::error::{AnalysisError, Result};
use crate::services::rolling;
use crate::types::{
    Bar, DrawdownStatus, IndicatorSet, MaAlignment, RiskLevel, RiskMetrics, RsiRisk, TrendStrength,
    VolatilityRegime,
};

/// Minimum bars for risk metrics.
pub const MIN_BARS: usize = 20;
const WINDOW: usize = 20;
const TRADING_DAYS: f64 = 252.0;

/// Compute risk metrics for `bars` using the already-computed indicators.
pub fn calculate_risk_metrics(bars: &[Bar], indicators: &IndicatorSet) -> Result<RiskMetrics> {
    if bars.len() < MIN_BARS {
        return Err(AnalysisError::insufficient(MIN_BARS, bars.len()));
    }

    let closes = rolling::closes(bars);
    let volumes = rolling::volumes(bars);
    let last = bars[bars.len() - 1];
    let close = last.close;

    let returns: Vec<f64> = closes
        .windows(2)
        .filter_map(|w| rolling::safe_div(w[1] - w[0], w[0]))
        .collect();
    let historical_volatility_20d = rolling::sample_std(rolling::tail(&returns, WINDOW))
        .and_then(|std| rolling::finite(std * TRADING_DAYS.sqrt() * 100.0));

    let atr_percentage = indicators
        .get("atr")
        .and_then(|atr| rolling::safe_div(atr, close))
        .map(|r| r * 100.0);
    let bb_width_percentage = indicators.get("bb_width").map(|w| w * 100.0);

    let (max_drawdown, current_drawdown) = drawdowns(&closes);

    let recent = rolling::tail(bars, WINDOW);
    let recent_volumes = rolling::tail(&volumes, WINDOW);
    let average_volume_20d = rolling::mean(recent_volumes);
    let volume_volatility = match (rolling::population_std(recent_volumes), average_volume_20d) {
        (Some(std), Some(avg)) => rolling::safe_div(std, avg).map(|cv| cv * 100.0),
        _ => None,
    };
    let relative_volume = average_volume_20d.and_then(|avg| rolling::safe_div(last.volume, avg));

    let high_20 = rolling::max(&rolling::highs(recent));
    let low_20 = rolling::min(&rolling::lows(recent));
    let (price_range_20d, price_position) = match (high_20, low_20) {
        (Some(hh), Some(ll)) => (
            rolling::safe_div(hh - ll, close).map(|r| r * 100.0),
            rolling::safe_div(close - ll, hh - ll),
        ),
        _ => (None, None),
    };

    let prev_close = bars[bars.len() - 2].close;
    let gap_percentage = rolling::safe_div((last.open - prev_close).abs(), prev_close).map(|r| r * 100.0);

    let rsi_risk = indicators.get("rsi").map(RsiRisk::from_rsi);
    let trend_strength = indicators.get("adx").map(TrendStrength::from_adx);
    let ma_alignment = ma_alignment(indicators, close);
    let volatility_regime = historical_volatility_20d.map(VolatilityRegime::from_volatility);
    let drawdown_status = current_drawdown.map(DrawdownStatus::from_drawdown);

    let mut metrics = RiskMetrics {
        historical_volatility_20d,
        atr_percentage,
        bb_width_percentage,
        max_drawdown,
        current_drawdown,
        rsi_risk,
        trend_strength,
        average_volume_20d,
        volume_volatility,
        relative_volume,
        price_range_20d,
        price_position,
        gap_percentage,
        distance_to_support_pct: distance_to_support(indicators, close),
        distance_to_resistance_pct: distance_to_resistance(indicators, close),
        ma_alignment,
        volatility_regime,
        drawdown_status,
        overall_risk_score: 0,
        risk_level: RiskLevel::VeryLow,
    };

    let score = composite_risk_score(&metrics, indicators);
    metrics.overall_risk_score = score;
    metrics.risk_level = RiskLevel::from_score(score);

    Ok(metrics)
}

/// Max and current drawdown as non-positive percentages from the running close peak.
fn drawdowns(closes: &[f64]) -> (Option<f64>, Option<f64>) {
    let mut peak = f64::MIN;
    let mut max_dd: Option<f64> = None;
    let mut current: Option<f64> = None;

    for &close in closes {
        peak = peak.max(close);
        current = rolling::safe_div(close - peak, peak).map(|d| d * 100.0);
        if let Some(dd) = current {
            max_dd = Some(max_dd.map_or(dd, |m| m.min(dd)));
        }
    }

    (max_dd, current)
}

fn ma_alignment(indicators: &IndicatorSet, close: f64) -> Option<MaAlignment> {
    let sma_20 = indicators.get("sma_20")?;
    let sma_50 = indicators.get("sma_50")?;
    Some(if close > sma_20 && sma_20 > sma_50 {
        MaAlignment::Bullish
    } else if close < sma_20 && sma_20 < sma_50 {
        MaAlignment::Bearish
    } else {
        MaAlignment::Mixed
    })
}

/// Percent distance to the nearest support level below the close.
fn distance_to_support(indicators: &IndicatorSet, close: f64) -> Option<f64> {
    let nearest = ["pivot_point", "support_1", "support_2", "recent_low"]
        .iter()
        .filter_map(|key| indicators.get(key))
        .filter(|level| *level < close)
        .fold(None, |acc: Option<f64>, level| Some(acc.map_or(level, |a| a.max(level))))?;
    rolling::safe_div(close - nearest, close).map(|r| r * 100.0)
}

/// Percent distance to the nearest resistance level above the close.
fn distance_to_resistance(indicators: &IndicatorSet, close: f64) -> Option<f64> {
    let nearest = ["pivot_point", "resistance_1", "resistance_2", "recent_high"]
        .iter()
        .filter_map(|key| indicators.get(key))
        .filter(|level| *level > close)
        .fold(None, |acc: Option<f64>, level| Some(acc.map_or(level, |a| a.min(level))))?;
    rolling::safe_div(nearest - close, close).map(|r| r * 100.0)
}

/// Composite risk score (0-100). Higher is riskier.
pub fn composite_risk_score(metrics: &RiskMetrics, indicators: &IndicatorSet) -> u8 {
    let mut score = 0.0;

    if let Some(hv) = metrics.historical_volatility_20d {
        score += (hv / 2.0).min(30.0);
    }

    if let Some(dd) = metrics.current_drawdown {
        score += (dd.abs() * 2.0).min(25.0);
    }

    if let Some(rsi) = indicators.get("rsi") {
        let risk = RsiRisk::from_rsi(rsi);
        if risk.is_extreme() {
            score += 20.0;
        } else if risk != RsiRisk::Neutral {
            score += 10.0;
        }
    }

    // Trendless markets are harder to trade
    if let Some(adx) = indicators.get("adx") {
        if adx < 20.0 {
            score += 15.0;
        } else if adx <= 25.0 {
            score += 5.0;
        }
    }

    if let Some(rel) = metrics.relative_volume {
        if rel < 0.5 {
            score += 10.0;
        } else if rel < 0.8 {
            score += 5.0;
        }
    }

    if !score.is_finite() {
        return 0;
    }
    score.round().clamp(0.0, 100.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::indicators::calculate_indicators;

    fn create_uptrend_bars(count: usize) -> Vec<Bar> {
        (0..count)
            .map(|i| {
                let base = 100.0 + i as f64;
                Bar::new(i as i64 * 86_400_000, base, base + 1.5, base - 0.5, base + 1.0, 1_000_000.0)
            })
            .collect()
    }

    fn create_crash_bars(count: usize) -> Vec<Bar> {
        (0..count)
            .map(|i| {
                let base = 200.0 * 0.95f64.powi(i as i32);
                Bar::new(i as i64 * 86_400_000, base, base * 1.01, base * 0.93, base * 0.95, 1_000_000.0)
            })
            .collect()
    }

    #[test]
    fn test_insufficient_data() {
        let bars = create_uptrend_bars(19);
        let err = calculate_risk_metrics(&bars, &IndicatorSet::new()).unwrap_err();
        assert!(err.is_insufficient_data());
    }

    #[test]
    fn test_uptrend_has_no_drawdown() {
        let bars = create_uptrend_bars(60);
        let indicators = calculate_indicators(&bars);
        let metrics = calculate_risk_metrics(&bars, &indicators).unwrap();

        assert_eq!(metrics.max_drawdown, Some(0.0));
        assert_eq!(metrics.current_drawdown, Some(0.0));
        assert_eq!(metrics.drawdown_status, Some(DrawdownStatus::Normal));
        assert_eq!(metrics.ma_alignment, Some(MaAlignment::Bullish));
        assert_eq!(metrics.relative_volume, Some(1.0));
        assert_eq!(metrics.volume_volatility, Some(0.0));
        assert!(metrics.overall_risk_score <= 100);
        assert_eq!(metrics.risk_level, RiskLevel::from_score(metrics.overall_risk_score));
    }

    #[test]
    fn test_crash_is_high_risk() {
        let bars = create_crash_bars(40);
        let indicators = calculate_indicators(&bars);
        let metrics = calculate_risk_metrics(&bars, &indicators).unwrap();

        assert!(metrics.current_drawdown.unwrap() < -20.0);
        assert_eq!(metrics.drawdown_status, Some(DrawdownStatus::Severe));
        assert_eq!(metrics.rsi_risk, Some(RsiRisk::ExtremeOversold));
        // drawdown and RSI extremity alone contribute 45
        assert!(metrics.overall_risk_score >= 45);
        assert_eq!(metrics.risk_level, RiskLevel::from_score(metrics.overall_risk_score));
        assert_ne!(metrics.risk_level, RiskLevel::Low);
    }

    #[test]
    fn test_absent_indicators_leave_metrics_none() {
        let bars = create_uptrend_bars(20);
        let metrics = calculate_risk_metrics(&bars, &IndicatorSet::new()).unwrap();
        assert!(metrics.atr_percentage.is_none());
        assert!(metrics.bb_width_percentage.is_none());
        assert!(metrics.rsi_risk.is_none());
        assert!(metrics.ma_alignment.is_none());
        assert!(metrics.distance_to_support_pct.is_none());
        assert!(metrics.historical_volatility_20d.is_some());
    }

    #[test]
    fn test_level_distances() {
        let bars = create_uptrend_bars(20);
        let mut indicators = IndicatorSet::new();
        // last close is 120
        indicators.insert("support_1", Some(114.0));
        indicators.insert("support_2", Some(108.0));
        indicators.insert("resistance_1", Some(126.0));
        indicators.insert("recent_high", Some(130.0));

        let metrics = calculate_risk_metrics(&bars, &indicators).unwrap();
        assert!((metrics.distance_to_support_pct.unwrap() - 5.0).abs() < 1e-9);
        assert!((metrics.distance_to_resistance_pct.unwrap() - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_gap_and_price_position() {
        let mut bars = create_uptrend_bars(20);
        // previous close 119, gap open at 121.38
        bars[19].open = 121.38;
        let metrics = calculate_risk_metrics(&bars, &IndicatorSet::new()).unwrap();
        assert!((metrics.gap_percentage.unwrap() - 2.0).abs() < 1e-9);

        let position = metrics.price_position.unwrap();
        assert!((0.0..=1.0).contains(&position));
    }

    #[test]
    fn test_composite_score_components() {
        let metrics = RiskMetrics {
            historical_volatility_20d: Some(80.0),
            atr_percentage: None,
            bb_width_percentage: None,
            max_drawdown: Some(-30.0),
            current_drawdown: Some(-30.0),
            rsi_risk: None,
            trend_strength: None,
            average_volume_20d: None,
            volume_volatility: None,
            relative_volume: Some(0.3),
            price_range_20d: None,
            price_position: None,
            gap_percentage: None,
            distance_to_support_pct: None,
            distance_to_resistance_pct: None,
            ma_alignment: None,
            volatility_regime: None,
            drawdown_status: None,
            overall_risk_score: 0,
            risk_level: RiskLevel::VeryLow,
        };
        let mut indicators = IndicatorSet::new();
        indicators.insert("rsi", Some(10.0));
        indicators.insert("adx", Some(10.0));

        // 30 + 25 + 20 + 15 + 10
        assert_eq!(composite_risk_score(&metrics, &indicators), 100);
        assert_eq!(RiskLevel::from_score(100), RiskLevel::VeryHigh);
    }
}
