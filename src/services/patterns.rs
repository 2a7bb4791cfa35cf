//! Candlestick, chart, trend, volume and support/resistance pattern detection.
//!
//! Each family is detected independently. A family that fails is logged and
//! skipped without affecting the others.

use crate::error::{AnalysisError, Result};
use crate::services::rolling;
use crate::types::{Bar, Pattern, PatternFamily, PatternType};
use tracing::warn;

/// Bars needed before any pattern is reported.
pub const MIN_BARS: usize = 10;
/// Bars needed for chart, volume and support/resistance families.
const MIN_EXTENDED_BARS: usize = 20;

const HEAD_SHOULDERS_LOOKBACK: usize = 30;
const DOUBLE_LOOKBACK: usize = 20;
const TRIANGLE_LOOKBACK: usize = 20;
const TREND_LOOKBACK: usize = 6;
const BREAKOUT_LOOKBACK: usize = 10;
const DIVERGENCE_LOOKBACK: usize = 10;
const LEVEL_LOOKBACK: usize = 20;

/// Normalized per-bar slope below which a boundary counts as flat.
const FLAT_SLOPE: f64 = 0.0005;
/// Normalized per-bar slope above which a boundary counts as trending.
const TREND_SLOPE: f64 = 0.001;

/// Detects patterns in a bar series.
#[derive(Debug, Default, Clone, Copy)]
pub struct PatternDetector;

impl PatternDetector {
    pub fn new() -> Self {
        Self
    }

    /// Run every pattern family. Returns an empty list below [`MIN_BARS`].
    pub fn detect(&self, bars: &[Bar]) -> Vec<Pattern> {
        if bars.len() < MIN_BARS {
            return Vec::new();
        }

        let families: [(PatternFamily, fn(&[Bar]) -> Result<Vec<Pattern>>); 5] = [
            (PatternFamily::Candlestick, detect_candlestick),
            (PatternFamily::Chart, detect_chart),
            (PatternFamily::Trend, detect_trend),
            (PatternFamily::Volume, detect_volume),
            (PatternFamily::SupportResistance, detect_support_resistance),
        ];

        let mut patterns = Vec::new();
        for (family, detect) in families {
            match detect(bars) {
                Ok(found) => patterns.extend(found),
                Err(e) => warn!("Pattern family {:?} failed: {}", family, e),
            }
        }
        patterns
    }
}

/// Convenience wrapper around [`PatternDetector::detect`].
pub fn detect_patterns(bars: &[Bar]) -> Vec<Pattern> {
    PatternDetector::new().detect(bars)
}

fn last_timestamp(bars: &[Bar]) -> i64 {
    bars.last().map(|b| b.timestamp).unwrap_or_default()
}

fn slope_of(values: &[f64], what: &str) -> Result<f64> {
    rolling::linear_slope(values)
        .ok_or_else(|| AnalysisError::Computation(format!("undefined {} slope", what)))
}

/// Doji, Hammer, Shooting Star and Engulfing on the last two bars.
pub fn detect_candlestick(bars: &[Bar]) -> Result<Vec<Pattern>> {
    let mut patterns = Vec::new();
    if bars.len() < 2 {
        return Ok(patterns);
    }
    let ts = last_timestamp(bars);
    let prev = &bars[bars.len() - 2];
    let curr = &bars[bars.len() - 1];

    let body = curr.body();
    let range = curr.range();

    if range > 0.0 {
        if body <= 0.1 * range {
            patterns.push(Pattern::new(
                PatternType::Doji,
                75.0,
                "Indecision candle, body under 10% of range",
                ts,
            ));
        }

        if body < 0.3 * range {
            let lower = curr.lower_wick();
            let upper = curr.upper_wick();

            if lower > 0.0 && lower >= 2.0 * body && upper < 0.1 * range {
                patterns.push(Pattern::new(
                    PatternType::Hammer,
                    80.0,
                    "Bullish reversal: long lower shadow after selling pressure",
                    ts,
                ));
            }
            if upper > 0.0 && upper >= 2.0 * body && lower < 0.1 * range {
                patterns.push(Pattern::new(
                    PatternType::ShootingStar,
                    80.0,
                    "Bearish reversal: long upper shadow after buying pressure",
                    ts,
                ));
            }
        }
    }

    let engulfs = body > prev.body();
    if prev.is_bearish() && curr.is_bullish() && curr.open < prev.close && curr.close > prev.open && engulfs {
        patterns.push(Pattern::new(
            PatternType::BullishEngulfing,
            85.0,
            "Bullish candle fully engulfs the prior bearish body",
            ts,
        ));
    }
    if prev.is_bullish() && curr.is_bearish() && curr.open > prev.close && curr.close < prev.open && engulfs {
        patterns.push(Pattern::new(
            PatternType::BearishEngulfing,
            85.0,
            "Bearish candle fully engulfs the prior bullish body",
            ts,
        ));
    }

    Ok(patterns)
}

/// Indices of local peaks: higher than `reach` neighbours on each side.
fn local_peaks(values: &[f64], reach: usize) -> Vec<usize> {
    if values.len() < 2 * reach + 1 {
        return Vec::new();
    }
    (reach..values.len() - reach)
        .filter(|&i| (1..=reach).all(|d| values[i] > values[i - d] && values[i] > values[i + d]))
        .collect()
}

/// Two extreme points at least 3 bars apart and within 2% of each other.
fn matching_extremes(values: &[f64], peaks: &[usize], highest: bool) -> Option<(usize, usize)> {
    let better = |a: f64, b: f64| if highest { a > b } else { a < b };

    let first = peaks.iter().copied().reduce(|a, b| if better(values[b], values[a]) { b } else { a })?;
    let second = peaks
        .iter()
        .copied()
        .filter(|&i| i.abs_diff(first) >= 3)
        .reduce(|a, b| if better(values[b], values[a]) { b } else { a })?;

    let (a, b) = (values[first], values[second]);
    let reference = a.abs().max(b.abs());
    if reference > 0.0 && (a - b).abs() / reference <= 0.02 {
        Some((first, second))
    } else {
        None
    }
}

/// Head & Shoulders, Double Top/Bottom and triangles.
pub fn detect_chart(bars: &[Bar]) -> Result<Vec<Pattern>> {
    let mut patterns = Vec::new();
    if bars.len() < MIN_EXTENDED_BARS {
        return Ok(patterns);
    }
    let ts = last_timestamp(bars);

    // Head & Shoulders: three consecutive peaks, head >2% above both shoulders
    let hs_highs = rolling::highs(rolling::tail(bars, HEAD_SHOULDERS_LOOKBACK));
    let peaks = local_peaks(&hs_highs, 2);
    let has_head_shoulders = peaks.windows(3).any(|w| {
        let (left, head, right) = (hs_highs[w[0]], hs_highs[w[1]], hs_highs[w[2]]);
        head > left.max(right) * 1.02
    });
    if has_head_shoulders {
        patterns.push(Pattern::new(
            PatternType::HeadAndShoulders,
            70.0,
            "Three peaks with a dominant middle peak, potential bearish reversal",
            ts,
        ));
    }

    // Double Top / Double Bottom, top takes precedence
    let window = rolling::tail(bars, DOUBLE_LOOKBACK);
    let highs = rolling::highs(window);
    let lows = rolling::lows(window);
    let neg_lows: Vec<f64> = lows.iter().map(|l| -l).collect();

    if matching_extremes(&highs, &local_peaks(&highs, 1), true).is_some() {
        patterns.push(Pattern::new(
            PatternType::DoubleTop,
            75.0,
            "Two similar highs, bearish reversal pattern",
            ts,
        ));
    } else if matching_extremes(&lows, &local_peaks(&neg_lows, 1), false).is_some() {
        patterns.push(Pattern::new(
            PatternType::DoubleBottom,
            75.0,
            "Two similar lows, bullish reversal pattern",
            ts,
        ));
    }

    match detect_triangle(bars, ts) {
        Ok(triangle) => patterns.extend(triangle),
        Err(e) => warn!("Triangle detection failed: {}", e),
    }

    Ok(patterns)
}

/// Triangles from boundary slopes normalized by the mean close.
fn detect_triangle(bars: &[Bar], ts: i64) -> Result<Option<Pattern>> {
    let window = rolling::tail(bars, TRIANGLE_LOOKBACK);
    let mean_price = rolling::mean(&rolling::closes(window))
        .filter(|m| *m > 0.0)
        .ok_or_else(|| AnalysisError::Computation("non-positive mean price".to_string()))?;
    let high_slope = slope_of(&rolling::highs(window), "high")? / mean_price;
    let low_slope = slope_of(&rolling::lows(window), "low")? / mean_price;

    let flat = |s: f64| s.abs() < FLAT_SLOPE;
    let rising = |s: f64| s > TREND_SLOPE;
    let falling = |s: f64| s < -TREND_SLOPE;

    let triangle = if flat(high_slope) && rising(low_slope) {
        Some((PatternType::AscendingTriangle, "Flat resistance with rising lows"))
    } else if falling(high_slope) && flat(low_slope) {
        Some((PatternType::DescendingTriangle, "Falling highs against flat support"))
    } else if falling(high_slope) && rising(low_slope) {
        Some((PatternType::SymmetricalTriangle, "Converging highs and lows, breakout possible"))
    } else {
        None
    };
    Ok(triangle.map(|(pattern_type, description)| Pattern::new(pattern_type, 65.0, description, ts)))
}

/// Higher highs / higher lows structure and range breakouts.
pub fn detect_trend(bars: &[Bar]) -> Result<Vec<Pattern>> {
    let mut patterns = Vec::new();
    if bars.len() < TREND_LOOKBACK {
        return Ok(patterns);
    }
    let ts = last_timestamp(bars);

    let recent = rolling::tail(bars, TREND_LOOKBACK);
    let count = |f: fn(&Bar, &Bar) -> bool| recent.windows(2).filter(|w| f(&w[0], &w[1])).count();
    let higher_highs = count(|a, b| b.high > a.high);
    let higher_lows = count(|a, b| b.low > a.low);
    let lower_highs = count(|a, b| b.high < a.high);
    let lower_lows = count(|a, b| b.low < a.low);

    if higher_highs >= 2 && higher_lows >= 2 {
        patterns.push(Pattern::new(
            PatternType::Uptrend,
            80.0,
            "Higher highs and higher lows, bullish structure",
            ts,
        ));
    }
    if lower_highs >= 2 && lower_lows >= 2 {
        patterns.push(Pattern::new(
            PatternType::Downtrend,
            80.0,
            "Lower highs and lower lows, bearish structure",
            ts,
        ));
    }

    let prior = rolling::tail(&bars[..bars.len() - 1], BREAKOUT_LOOKBACK);
    let close = bars[bars.len() - 1].close;
    if let (Some(prior_high), Some(prior_low)) = (
        rolling::max(&rolling::highs(prior)),
        rolling::min(&rolling::lows(prior)),
    ) {
        if close > prior_high * 1.01 {
            patterns.push(Pattern::new(
                PatternType::Breakout,
                75.0,
                format!("Price broke above resistance at {:.2}", prior_high),
                ts,
            ));
        } else if close < prior_low * 0.99 {
            patterns.push(Pattern::new(
                PatternType::Breakdown,
                75.0,
                format!("Price broke below support at {:.2}", prior_low),
                ts,
            ));
        }
    }

    Ok(patterns)
}

/// Volume spikes with price movement and price/volume divergence.
pub fn detect_volume(bars: &[Bar]) -> Result<Vec<Pattern>> {
    let mut patterns = Vec::new();
    if bars.len() < MIN_EXTENDED_BARS {
        return Ok(patterns);
    }
    let ts = last_timestamp(bars);
    let volumes = rolling::volumes(bars);
    let closes = rolling::closes(bars);
    let n = bars.len();

    let avg_volume = rolling::mean(rolling::tail(&volumes, MIN_EXTENDED_BARS))
        .ok_or_else(|| AnalysisError::Computation("undefined average volume".to_string()))?;
    let change = rolling::pct_change(closes[n - 2], closes[n - 1]);

    if let Some(change) = change {
        if volumes[n - 1] > 2.0 * avg_volume && change.abs() > 1.0 {
            let direction = if change > 0.0 { "bullish" } else { "bearish" };
            patterns.push(Pattern::new(
                PatternType::VolumeSpike,
                70.0,
                format!("High volume with {:.1}% price move, {} signal", change, direction),
                ts,
            ));
        }
    }

    let volume_slope = slope_of(rolling::tail(&volumes, DIVERGENCE_LOOKBACK), "volume")?;
    let price_slope = slope_of(rolling::tail(&closes, DIVERGENCE_LOOKBACK), "price")?;

    if price_slope > 0.0 && volume_slope < 0.0 {
        patterns.push(Pattern::new(
            PatternType::BearishDivergence,
            65.0,
            "Price rising on decreasing volume, potential reversal",
            ts,
        ));
    } else if price_slope < 0.0 && volume_slope > 0.0 {
        patterns.push(Pattern::new(
            PatternType::BullishDivergence,
            65.0,
            "Price falling on increasing volume, potential reversal",
            ts,
        ));
    }

    Ok(patterns)
}

/// Proximity to the 20-bar extremes and narrow-range consolidation.
pub fn detect_support_resistance(bars: &[Bar]) -> Result<Vec<Pattern>> {
    let mut patterns = Vec::new();
    if bars.len() < MIN_EXTENDED_BARS {
        return Ok(patterns);
    }
    let ts = last_timestamp(bars);
    let window = rolling::tail(bars, LEVEL_LOOKBACK);
    let (high, low) = match (
        rolling::max(&rolling::highs(window)),
        rolling::min(&rolling::lows(window)),
    ) {
        (Some(h), Some(l)) => (h, l),
        _ => return Ok(patterns),
    };
    let close = bars[bars.len() - 1].close;

    if close > high * 0.98 {
        patterns.push(Pattern::new(
            PatternType::NearResistance,
            70.0,
            format!("Price approaching resistance at {:.2}", high),
            ts,
        ));
    }
    if close < low * 1.02 {
        patterns.push(Pattern::new(
            PatternType::NearSupport,
            70.0,
            format!("Price approaching support at {:.2}", low),
            ts,
        ));
    }
    if let Some(spread) = rolling::safe_div(high - low, close) {
        if spread < 0.05 {
            patterns.push(Pattern::new(
                PatternType::RangeBound,
                75.0,
                "Price consolidating in a narrow range, breakout pending",
                ts,
            ));
        }
    }

    Ok(patterns)
}
