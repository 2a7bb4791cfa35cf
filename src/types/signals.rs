use serde::{Deserialize, Serialize};

/// Direction of a trading signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SignalType {
    Buy,
    Sell,
    Hold,
}

impl SignalType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SignalType::Buy => "BUY",
            SignalType::Sell => "SELL",
            SignalType::Hold => "HOLD",
        }
    }

    /// Parse from string (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "BUY" => Some(SignalType::Buy),
            "SELL" => Some(SignalType::Sell),
            "HOLD" => Some(SignalType::Hold),
            _ => None,
        }
    }

    /// +1 for buy, -1 for sell, 0 for hold.
    pub fn polarity(&self) -> f64 {
        match self {
            SignalType::Buy => 1.0,
            SignalType::Sell => -1.0,
            SignalType::Hold => 0.0,
        }
    }
}

/// Strength of a trading signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SignalStrength {
    Weak,
    Medium,
    Strong,
    VeryStrong,
}

impl SignalStrength {
    pub fn as_str(&self) -> &'static str {
        match self {
            SignalStrength::Weak => "WEAK",
            SignalStrength::Medium => "MEDIUM",
            SignalStrength::Strong => "STRONG",
            SignalStrength::VeryStrong => "VERY_STRONG",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "WEAK" => Some(SignalStrength::Weak),
            "MEDIUM" => Some(SignalStrength::Medium),
            "STRONG" => Some(SignalStrength::Strong),
            "VERY_STRONG" => Some(SignalStrength::VeryStrong),
            _ => None,
        }
    }
}

/// Horizon a signal applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Timeframe {
    Short,
    Medium,
    Long,
}

impl Timeframe {
    /// Get display name.
    pub fn name(&self) -> &'static str {
        match self {
            Timeframe::Short => "Short-term",
            Timeframe::Medium => "Medium-term",
            Timeframe::Long => "Long-term",
        }
    }
}

/// A single rule-triggered trading signal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Signal {
    pub signal_type: SignalType,
    pub strength: SignalStrength,
    /// Source indicator name.
    pub indicator: String,
    pub reason: String,
    pub timeframe: Timeframe,
}

impl Signal {
    pub fn new(
        signal_type: SignalType,
        strength: SignalStrength,
        indicator: &str,
        reason: impl Into<String>,
        timeframe: Timeframe,
    ) -> Self {
        Self {
            signal_type,
            strength,
            indicator: indicator.to_string(),
            reason: reason.into(),
            timeframe,
        }
    }

    pub fn buy(strength: SignalStrength, indicator: &str, reason: impl Into<String>, timeframe: Timeframe) -> Self {
        Self::new(SignalType::Buy, strength, indicator, reason, timeframe)
    }

    pub fn sell(strength: SignalStrength, indicator: &str, reason: impl Into<String>, timeframe: Timeframe) -> Self {
        Self::new(SignalType::Sell, strength, indicator, reason, timeframe)
    }

    pub fn hold(strength: SignalStrength, indicator: &str, reason: impl Into<String>, timeframe: Timeframe) -> Self {
        Self::new(SignalType::Hold, strength, indicator, reason, timeframe)
    }
}
