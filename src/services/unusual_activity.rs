//! Statistical detection of volume spikes and price anomalies.
//!
//! The latest bar is compared against the trailing bars before it using
//! population z-scores.

use crate::error::{AnalysisError, Result};
use crate::services::rolling;
use crate::types::{ActivityDetails, ActivityType, Bar, Severity, UnusualActivity, UnusualActivityReport};
use tracing::{debug, warn};

/// Minimum bars of history for detection.
pub const MIN_HISTORY: usize = 30;
pub const VOLUME_SPIKE_THRESHOLD: f64 = 3.0;
pub const PRICE_ANOMALY_THRESHOLD: f64 = 2.5;

/// Detects unusual volume and price behaviour in the latest bar.
#[derive(Debug, Clone, Copy)]
pub struct UnusualActivityDetector {
    volume_threshold: f64,
    price_threshold: f64,
}

impl Default for UnusualActivityDetector {
    fn default() -> Self {
        Self {
            volume_threshold: VOLUME_SPIKE_THRESHOLD,
            price_threshold: PRICE_ANOMALY_THRESHOLD,
        }
    }
}

impl UnusualActivityDetector {
    pub fn new(volume_threshold: f64, price_threshold: f64) -> Self {
        Self {
            volume_threshold,
            price_threshold,
        }
    }

    /// Run both detectors. `current_price` defaults to the last close.
    pub fn calculate(&self, symbol: &str, bars: &[Bar], current_price: Option<f64>) -> Result<UnusualActivityReport> {
        if bars.len() < MIN_HISTORY {
            return Err(AnalysisError::insufficient(MIN_HISTORY, bars.len()));
        }

        let mut activities = Vec::new();
        if let Some(activity) = self.volume_spike(bars)? {
            activities.push(activity);
        }
        if let Some(activity) = self.price_anomaly(bars, current_price)? {
            activities.push(activity);
        }

        let report = UnusualActivityReport::from_activities(
            &symbol.to_uppercase(),
            activities,
            chrono::Utc::now().timestamp_millis(),
        );
        if report.has_unusual_activity {
            debug!(
                "Unusual activity for {}: {} event(s), overall {:?}",
                report.symbol,
                report.activities.len(),
                report.overall_severity
            );
        }
        Ok(report)
    }

    /// Best-effort variant of [`calculate`](Self::calculate). Short history
    /// yields a quiet report with a warning, other failures a quiet report
    /// with an error.
    pub fn detect(&self, symbol: &str, bars: &[Bar], current_price: Option<f64>) -> UnusualActivityReport {
        match self.calculate(symbol, bars, current_price) {
            Ok(report) => report,
            Err(e) => {
                let mut report =
                    UnusualActivityReport::quiet(&symbol.to_uppercase(), chrono::Utc::now().timestamp_millis());
                if e.is_insufficient_data() {
                    report.warning = Some(format!(
                        "Insufficient data for unusual activity detection (need {}+ bars)",
                        MIN_HISTORY
                    ));
                } else {
                    warn!("Unusual activity detection failed for {}: {}", symbol, e);
                    report.error = Some(e.to_string());
                }
                report
            }
        }
    }

    fn volume_spike(&self, bars: &[Bar]) -> Result<Option<UnusualActivity>> {
        let (trailing, last) = split_last(bars)?;
        let volumes = rolling::volumes(trailing);
        let average = mean_or_err(&volumes, "volume")?;
        let std = rolling::population_std(&volumes).unwrap_or(0.0);

        let current = last.volume;
        let z_score = rolling::safe_div(current - average, std).unwrap_or(0.0);
        if z_score < self.volume_threshold {
            return Ok(None);
        }

        let ratio = rolling::safe_div(current, average).unwrap_or(0.0);
        let change = daily_change(bars, last.close);

        Ok(Some(UnusualActivity {
            activity_type: ActivityType::VolumeSpike,
            severity: severity(z_score, self.volume_threshold),
            confidence: confidence(z_score),
            details: ActivityDetails {
                z_score,
                ratio,
                current_value: current,
                average_value: average,
                daily_change_percent: change,
            },
            interpretation: interpret_volume(ratio, change),
            timestamp: last.timestamp,
        }))
    }

    fn price_anomaly(&self, bars: &[Bar], current_price: Option<f64>) -> Result<Option<UnusualActivity>> {
        let (trailing, last) = split_last(bars)?;
        let closes = rolling::closes(trailing);
        let average = mean_or_err(&closes, "close")?;
        let price = current_price.filter(|p| p.is_finite()).unwrap_or(last.close);

        let Some(z_score) = rolling::population_std(&closes)
            .and_then(|std| rolling::safe_div((price - average).abs(), std))
        else {
            return Ok(None);
        };
        if z_score < self.price_threshold {
            return Ok(None);
        }

        let change = daily_change(bars, price);

        Ok(Some(UnusualActivity {
            activity_type: ActivityType::PriceAnomaly,
            severity: severity(z_score, self.price_threshold),
            confidence: confidence(z_score),
            details: ActivityDetails {
                z_score,
                ratio: rolling::safe_div(price, average).unwrap_or(0.0),
                current_value: price,
                average_value: average,
                daily_change_percent: change,
            },
            interpretation: interpret_price(change, z_score),
            timestamp: last.timestamp,
        }))
    }
}

/// Convenience wrapper around [`UnusualActivityDetector::detect`].
pub fn detect_unusual_activity(symbol: &str, bars: &[Bar], current_price: Option<f64>) -> UnusualActivityReport {
    UnusualActivityDetector::default().detect(symbol, bars, current_price)
}

fn split_last(bars: &[Bar]) -> Result<(&[Bar], &Bar)> {
    match bars.split_last() {
        Some((last, trailing)) if !trailing.is_empty() => Ok((trailing, last)),
        _ => Err(AnalysisError::insufficient(2, bars.len())),
    }
}

fn mean_or_err(values: &[f64], what: &str) -> Result<f64> {
    rolling::mean(values).ok_or_else(|| AnalysisError::Computation(format!("undefined mean {}", what)))
}

/// Percent change from the previous close.
fn daily_change(bars: &[Bar], price: f64) -> f64 {
    let prev_close = bars[bars.len() - 2].close;
    rolling::pct_change(prev_close, price).unwrap_or(0.0)
}

/// Severity in multiples of the detector threshold.
///
/// The ladder is 1.5x EXTREME, 1.25x HIGH and 1x MEDIUM. A 3x/2x/1x ladder
/// would rate a z=5 volume spike (threshold 3) as only MEDIUM, yet a z=5
/// spike must read EXTREME. Only the tighter ladder satisfies both.
fn severity(z_score: f64, threshold: f64) -> Severity {
    if z_score >= threshold * 1.5 {
        Severity::Extreme
    } else if z_score >= threshold * 1.25 {
        Severity::High
    } else if z_score >= threshold {
        Severity::Medium
    } else {
        Severity::Low
    }
}

fn confidence(z_score: f64) -> f64 {
    (z_score * 20.0).clamp(0.0, 100.0)
}

fn interpret_volume(ratio: f64, change: f64) -> String {
    if ratio >= 5.0 {
        if change > 2.0 {
            "Massive volume spike with strong upward price movement - possible breakout or institutional accumulation"
                .to_string()
        } else if change < -2.0 {
            "Massive volume spike with strong downward price movement - possible breakdown or institutional distribution"
                .to_string()
        } else {
            "Massive volume spike with little price movement - possible block trade or repositioning".to_string()
        }
    } else if ratio >= 3.0 {
        if change > 1.0 {
            "Significant volume spike with upward price movement - buying interest".to_string()
        } else if change < -1.0 {
            "Significant volume spike with downward price movement - selling pressure".to_string()
        } else {
            "Significant volume spike with little price movement".to_string()
        }
    } else if change >= 0.0 {
        format!("Above-average volume ({:.1}x normal) with price gain", ratio)
    } else {
        format!("Above-average volume ({:.1}x normal) with price decline", ratio)
    }
}

fn interpret_price(change: f64, z_score: f64) -> String {
    let magnitude = change.abs();
    if magnitude >= 5.0 {
        let direction = if change > 0.0 { "surge" } else { "plunge" };
        format!("Extreme price {} of {:.1}%", direction, magnitude)
    } else if magnitude >= 3.0 {
        let direction = if change > 0.0 { "rise" } else { "fall" };
        format!("Significant price {} of {:.1}%", direction, magnitude)
    } else {
        format!("Price deviates {:.1} standard deviations from mean", z_score)
    }
}
