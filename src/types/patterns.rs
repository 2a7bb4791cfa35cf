use serde::{Deserialize, Serialize};

/// Directional bias of a detected pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternBias {
    Bullish,
    Bearish,
    Neutral,
}

/// Pattern family, one per independent detector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternFamily {
    Candlestick,
    Chart,
    Trend,
    Volume,
    SupportResistance,
}

/// Every pattern the detector can report.
///
/// Serialized with the same display names as [`PatternType::name`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PatternType {
    Doji,
    Hammer,
    #[serde(rename = "Shooting Star")]
    ShootingStar,
    #[serde(rename = "Bullish Engulfing")]
    BullishEngulfing,
    #[serde(rename = "Bearish Engulfing")]
    BearishEngulfing,
    #[serde(rename = "Head and Shoulders")]
    HeadAndShoulders,
    #[serde(rename = "Double Top")]
    DoubleTop,
    #[serde(rename = "Double Bottom")]
    DoubleBottom,
    #[serde(rename = "Ascending Triangle")]
    AscendingTriangle,
    #[serde(rename = "Descending Triangle")]
    DescendingTriangle,
    #[serde(rename = "Symmetrical Triangle")]
    SymmetricalTriangle,
    Uptrend,
    Downtrend,
    Breakout,
    Breakdown,
    #[serde(rename = "Volume Spike")]
    VolumeSpike,
    #[serde(rename = "Bullish Volume Divergence")]
    BullishDivergence,
    #[serde(rename = "Bearish Volume Divergence")]
    BearishDivergence,
    #[serde(rename = "Near Support")]
    NearSupport,
    #[serde(rename = "Near Resistance")]
    NearResistance,
    #[serde(rename = "Range Bound")]
    RangeBound,
}

impl PatternType {
    /// Get display name.
    pub fn name(&self) -> &'static str {
        match self {
            PatternType::Doji => "Doji",
            PatternType::Hammer => "Hammer",
            PatternType::ShootingStar => "Shooting Star",
            PatternType::BullishEngulfing => "Bullish Engulfing",
            PatternType::BearishEngulfing => "Bearish Engulfing",
            PatternType::HeadAndShoulders => "Head and Shoulders",
            PatternType::DoubleTop => "Double Top",
            PatternType::DoubleBottom => "Double Bottom",
            PatternType::AscendingTriangle => "Ascending Triangle",
            PatternType::DescendingTriangle => "Descending Triangle",
            PatternType::SymmetricalTriangle => "Symmetrical Triangle",
            PatternType::Uptrend => "Uptrend",
            PatternType::Downtrend => "Downtrend",
            PatternType::Breakout => "Breakout",
            PatternType::Breakdown => "Breakdown",
            PatternType::VolumeSpike => "Volume Spike",
            PatternType::BullishDivergence => "Bullish Volume Divergence",
            PatternType::BearishDivergence => "Bearish Volume Divergence",
            PatternType::NearSupport => "Near Support",
            PatternType::NearResistance => "Near Resistance",
            PatternType::RangeBound => "Range Bound",
        }
    }

    pub fn bias(&self) -> PatternBias {
        match self {
            PatternType::Hammer
            | PatternType::BullishEngulfing
            | PatternType::DoubleBottom
            | PatternType::AscendingTriangle
            | PatternType::Uptrend
            | PatternType::Breakout
            | PatternType::BullishDivergence => PatternBias::Bullish,
            PatternType::ShootingStar
            | PatternType::BearishEngulfing
            | PatternType::HeadAndShoulders
            | PatternType::DoubleTop
            | PatternType::DescendingTriangle
            | PatternType::Downtrend
            | PatternType::Breakdown
            | PatternType::BearishDivergence => PatternBias::Bearish,
            PatternType::Doji
            | PatternType::SymmetricalTriangle
            | PatternType::VolumeSpike
            | PatternType::NearSupport
            | PatternType::NearResistance
            | PatternType::RangeBound => PatternBias::Neutral,
        }
    }

    pub fn family(&self) -> PatternFamily {
        match self {
            PatternType::Doji
            | PatternType::Hammer
            | PatternType::ShootingStar
            | PatternType::BullishEngulfing
            | PatternType::BearishEngulfing => PatternFamily::Candlestick,
            PatternType::HeadAndShoulders
            | PatternType::DoubleTop
            | PatternType::DoubleBottom
            | PatternType::AscendingTriangle
            | PatternType::DescendingTriangle
            | PatternType::SymmetricalTriangle => PatternFamily::Chart,
            PatternType::Uptrend
            | PatternType::Downtrend
            | PatternType::Breakout
            | PatternType::Breakdown => PatternFamily::Trend,
            PatternType::VolumeSpike
            | PatternType::BullishDivergence
            | PatternType::BearishDivergence => PatternFamily::Volume,
            PatternType::NearSupport | PatternType::NearResistance | PatternType::RangeBound => {
                PatternFamily::SupportResistance
            }
        }
    }
}

/// A detected pattern.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pattern {
    pub pattern_type: PatternType,
    /// Heuristic confidence (0-100).
    pub confidence: f64,
    pub description: String,
    /// Timestamp of the bar the pattern was detected on.
    pub timestamp: i64,
}

impl Pattern {
    pub fn new(pattern_type: PatternType, confidence: f64, description: impl Into<String>, timestamp: i64) -> Self {
        Self {
            pattern_type,
            confidence: confidence.clamp(0.0, 100.0),
            description: description.into(),
            timestamp,
        }
    }

    pub fn bias(&self) -> PatternBias {
        self.pattern_type.bias()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pattern_bias() {
        assert_eq!(PatternType::BullishEngulfing.bias(), PatternBias::Bullish);
        assert_eq!(PatternType::HeadAndShoulders.bias(), PatternBias::Bearish);
        assert_eq!(PatternType::Doji.bias(), PatternBias::Neutral);
    }

    #[test]
    fn test_pattern_confidence_clamped() {
        let pattern = Pattern::new(PatternType::Doji, 150.0, "x", 0);
        assert_eq!(pattern.confidence, 100.0);
    }

    #[test]
    fn test_pattern_serialization() {
        let pattern = Pattern::new(PatternType::BullishEngulfing, 85.0, "Bullish Engulfing", 1000);
        let json = serde_json::to_string(&pattern).unwrap();
        assert!(json.contains("\"patternType\":\"Bullish Engulfing\""));
    }

    #[test]
    fn test_pattern_type_uses_display_names() {
        for pattern_type in [
            PatternType::HeadAndShoulders,
            PatternType::BullishDivergence,
            PatternType::RangeBound,
        ] {
            let json = serde_json::to_string(&pattern_type).unwrap();
            assert_eq!(json, format!("\"{}\"", pattern_type.name()));
            assert_eq!(serde_json::from_str::<PatternType>(&json).unwrap(), pattern_type);
        }
    }
}
