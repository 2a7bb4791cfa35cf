use serde::{Deserialize, Serialize};

/// RSI extremity bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RsiRisk {
    ExtremeOverbought,
    Overbought,
    Neutral,
    Oversold,
    ExtremeOversold,
}

impl RsiRisk {
    pub fn from_rsi(rsi: f64) -> Self {
        if rsi > 80.0 {
            RsiRisk::ExtremeOverbought
        } else if rsi > 70.0 {
            RsiRisk::Overbought
        } else if rsi < 20.0 {
            RsiRisk::ExtremeOversold
        } else if rsi < 30.0 {
            RsiRisk::Oversold
        } else {
            RsiRisk::Neutral
        }
    }

    pub fn is_extreme(&self) -> bool {
        matches!(self, RsiRisk::ExtremeOverbought | RsiRisk::ExtremeOversold)
    }
}

/// ADX trend strength bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TrendStrength {
    VeryStrong,
    Strong,
    Moderate,
    Weak,
}

impl TrendStrength {
    pub fn from_adx(adx: f64) -> Self {
        if adx > 50.0 {
            TrendStrength::VeryStrong
        } else if adx > 25.0 {
            TrendStrength::Strong
        } else if adx > 20.0 {
            TrendStrength::Moderate
        } else {
            TrendStrength::Weak
        }
    }
}

/// Ordering of price against its moving averages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MaAlignment {
    Bullish,
    Bearish,
    Mixed,
}

/// Annualized volatility regime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VolatilityRegime {
    Low,
    Moderate,
    High,
    Extreme,
}

impl VolatilityRegime {
    pub fn from_volatility(hv: f64) -> Self {
        if hv > 50.0 {
            VolatilityRegime::Extreme
        } else if hv > 35.0 {
            VolatilityRegime::High
        } else if hv > 20.0 {
            VolatilityRegime::Moderate
        } else {
            VolatilityRegime::Low
        }
    }
}

/// Severity of the current drawdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DrawdownStatus {
    Normal,
    Moderate,
    High,
    Severe,
}

impl DrawdownStatus {
    pub fn from_drawdown(current_drawdown: f64) -> Self {
        if current_drawdown < -20.0 {
            DrawdownStatus::Severe
        } else if current_drawdown < -10.0 {
            DrawdownStatus::High
        } else if current_drawdown < -5.0 {
            DrawdownStatus::Moderate
        } else {
            DrawdownStatus::Normal
        }
    }
}

/// Five-level risk classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskLevel {
    VeryLow,
    Low,
    Moderate,
    High,
    VeryHigh,
}

impl RiskLevel {
    /// Create a level from an overall risk score (0-100).
    pub fn from_score(score: u8) -> Self {
        match score {
            s if s >= 70 => RiskLevel::VeryHigh,
            s if s >= 50 => RiskLevel::High,
            s if s >= 30 => RiskLevel::Moderate,
            s if s >= 15 => RiskLevel::Low,
            _ => RiskLevel::VeryLow,
        }
    }

    /// Get display label.
    pub fn label(&self) -> &'static str {
        match self {
            RiskLevel::VeryLow => "Very Low",
            RiskLevel::Low => "Low",
            RiskLevel::Moderate => "Moderate",
            RiskLevel::High => "High",
            RiskLevel::VeryHigh => "Very High",
        }
    }
}

/// Volatility, drawdown, liquidity and level-distance metrics for one series.
///
/// Metrics whose inputs are unavailable are None.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskMetrics {
    pub historical_volatility_20d: Option<f64>,
    pub atr_percentage: Option<f64>,
    pub bb_width_percentage: Option<f64>,
    /// Largest peak-to-trough decline, as a non-positive percentage.
    pub max_drawdown: Option<f64>,
    /// Decline from the running peak to the latest close, as a non-positive percentage.
    pub current_drawdown: Option<f64>,
    pub rsi_risk: Option<RsiRisk>,
    pub trend_strength: Option<TrendStrength>,
    pub average_volume_20d: Option<f64>,
    /// Coefficient of variation of the last 20 volumes, in percent.
    pub volume_volatility: Option<f64>,
    pub relative_volume: Option<f64>,
    pub price_range_20d: Option<f64>,
    /// Position of the close within the 20-bar range (0 = low, 1 = high).
    pub price_position: Option<f64>,
    /// Open-to-previous-close gap, in percent.
    pub gap_percentage: Option<f64>,
    pub distance_to_support_pct: Option<f64>,
    pub distance_to_resistance_pct: Option<f64>,
    pub ma_alignment: Option<MaAlignment>,
    pub volatility_regime: Option<VolatilityRegime>,
    pub drawdown_status: Option<DrawdownStatus>,
    pub overall_risk_score: u8,
    pub risk_level: RiskLevel,
}
