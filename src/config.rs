use std::env;
use std::time::Duration;

/// Weights applied to the four master score components.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MasterScoreWeights {
    pub short_term: f64,
    pub medium_term: f64,
    pub long_term: f64,
    pub risk: f64,
}

impl Default for MasterScoreWeights {
    fn default() -> Self {
        Self {
            short_term: 0.30,
            medium_term: 0.30,
            long_term: 0.20,
            risk: 0.20,
        }
    }
}

impl MasterScoreWeights {
    /// Parse "short,medium,long,risk". Returns None unless all four are finite and non-negative.
    pub fn parse(s: &str) -> Option<Self> {
        let parts: Vec<f64> = s
            .split(',')
            .map(|p| p.trim().parse::<f64>())
            .collect::<Result<_, _>>()
            .ok()?;
        if parts.len() != 4 || parts.iter().any(|w| !w.is_finite() || *w < 0.0) {
            return None;
        }
        Some(Self {
            short_term: parts[0],
            medium_term: parts[1],
            long_term: parts[2],
            risk: parts[3],
        })
    }

    /// Sum of all weights.
    pub fn total(&self) -> f64 {
        self.short_term + self.medium_term + self.long_term + self.risk
    }

    /// Weights rescaled to sum to one. Callers check `total() > 0` first.
    pub fn normalized(&self) -> Self {
        let total = self.total();
        Self {
            short_term: self.short_term / total,
            medium_term: self.medium_term / total,
            long_term: self.long_term / total,
            risk: self.risk / total,
        }
    }
}

/// Points a signal contributes to its timeframe sub-score, by strength.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrengthPoints {
    pub weak: f64,
    pub medium: f64,
    pub strong: f64,
    pub very_strong: f64,
}

impl Default for StrengthPoints {
    fn default() -> Self {
        Self {
            weak: 5.0,
            medium: 10.0,
            strong: 15.0,
            very_strong: 20.0,
        }
    }
}

impl StrengthPoints {
    /// Parse "weak,medium,strong,very_strong".
    pub fn parse(s: &str) -> Option<Self> {
        let parts: Vec<f64> = s
            .split(',')
            .map(|p| p.trim().parse::<f64>())
            .collect::<Result<_, _>>()
            .ok()?;
        if parts.len() != 4 || parts.iter().any(|p| !p.is_finite()) {
            return None;
        }
        Some(Self {
            weak: parts[0],
            medium: parts[1],
            strong: parts[2],
            very_strong: parts[3],
        })
    }
}

/// Tunable constants for the master score fusion.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ScoringConfig {
    pub weights: MasterScoreWeights,
    pub strength_points: StrengthPoints,
}

/// Record retention periods in days.
#[derive(Debug, Clone)]
pub struct RetentionConfig {
    /// Evaluated signal records retention (default: 365 days).
    pub signal_records_days: u32,
}

impl Default for RetentionConfig {
    fn default() -> Self {
        Self {
            signal_records_days: 365,
        }
    }
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// SQLite database path for signal performance records (None = in-memory store).
    pub database_path: Option<String>,
    /// TTL for cached investment decisions.
    pub cache_ttl: Duration,
    /// Whether each decision is recorded with the performance tracker.
    pub record_signals: bool,
    /// Master score weights and signal points.
    pub scoring: ScoringConfig,
    /// Retention periods.
    pub retention: RetentionConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_path: None,
            cache_ttl: Duration::from_secs(300),
            record_signals: true,
            scoring: ScoringConfig::default(),
            retention: RetentionConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let weights = env::var("AUGUR_WEIGHTS")
            .ok()
            .and_then(|s| {
                let parsed = MasterScoreWeights::parse(&s);
                if parsed.is_none() {
                    tracing::warn!("Ignoring malformed AUGUR_WEIGHTS: {}", s);
                }
                parsed
            })
            .unwrap_or_default();

        let strength_points = env::var("AUGUR_STRENGTH_POINTS")
            .ok()
            .and_then(|s| {
                let parsed = StrengthPoints::parse(&s);
                if parsed.is_none() {
                    tracing::warn!("Ignoring malformed AUGUR_STRENGTH_POINTS: {}", s);
                }
                parsed
            })
            .unwrap_or_default();

        Self {
            database_path: env::var("AUGUR_DATABASE_PATH").ok().filter(|p| !p.is_empty()),
            cache_ttl: env::var("AUGUR_CACHE_TTL_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.cache_ttl),
            record_signals: env::var("AUGUR_RECORD_SIGNALS")
                .map(|v| v != "false" && v != "0")
                .unwrap_or(defaults.record_signals),
            scoring: ScoringConfig {
                weights,
                strength_points,
            },
            retention: RetentionConfig {
                signal_records_days: env::var("AUGUR_RETENTION_DAYS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(defaults.retention.signal_records_days),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_weights_sum_to_one() {
        let weights = MasterScoreWeights::default();
        assert!((weights.total() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_weights_parse() {
        let weights = MasterScoreWeights::parse("0.4, 0.3, 0.2, 0.1").unwrap();
        assert_eq!(weights.short_term, 0.4);
        assert_eq!(weights.risk, 0.1);
    }

    #[test]
    fn test_weights_parse_rejects_malformed() {
        assert!(MasterScoreWeights::parse("0.4,0.3,0.2").is_none());
        assert!(MasterScoreWeights::parse("a,b,c,d").is_none());
        assert!(MasterScoreWeights::parse("0.4,0.3,0.2,-0.1").is_none());
    }

    #[test]
    fn test_strength_points_default() {
        let points = StrengthPoints::default();
        assert_eq!(points.weak, 5.0);
        assert_eq!(points.medium, 10.0);
        assert_eq!(points.strong, 15.0);
        assert_eq!(points.very_strong, 20.0);
    }

    #[test]
    fn test_strength_points_parse() {
        let points = StrengthPoints::parse("1,2,3,4").unwrap();
        assert_eq!(points.very_strong, 4.0);
    }
}
