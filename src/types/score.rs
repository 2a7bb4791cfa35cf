use serde::{Deserialize, Serialize};

/// Five-level investment recommendation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Recommendation {
    StrongBuy,
    Buy,
    Hold,
    Sell,
    StrongSell,
}

impl Recommendation {
    /// Create a recommendation from a master score (0-100).
    pub fn from_score(score: f64) -> Self {
        match score {
            s if s >= 80.0 => Recommendation::StrongBuy,
            s if s >= 60.0 => Recommendation::Buy,
            s if s >= 40.0 => Recommendation::Hold,
            s if s >= 20.0 => Recommendation::Sell,
            _ => Recommendation::StrongSell,
        }
    }

    /// Get display label.
    pub fn label(&self) -> &'static str {
        match self {
            Recommendation::StrongBuy => "Strong Buy",
            Recommendation::Buy => "Buy",
            Recommendation::Hold => "Hold",
            Recommendation::Sell => "Sell",
            Recommendation::StrongSell => "Strong Sell",
        }
    }
}

/// Confidence bucket shared by the scoring components.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Confidence {
    High,
    Medium,
    Low,
}

impl Confidence {
    /// Bucket a data-availability ratio (0-1).
    pub fn from_ratio(ratio: f64) -> Self {
        if ratio >= 0.8 {
            Confidence::High
        } else if ratio >= 0.5 {
            Confidence::Medium
        } else {
            Confidence::Low
        }
    }
}

/// One weighted master score component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreComponent {
    pub score: f64,
    pub weight: f64,
    pub label: String,
}

impl ScoreComponent {
    pub fn new(score: f64, weight: f64, label: &str) -> Self {
        Self {
            score,
            weight,
            label: label.to_string(),
        }
    }
}

/// The four master score components.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreBreakdown {
    pub short_term: ScoreComponent,
    pub medium_term: ScoreComponent,
    pub long_term: ScoreComponent,
    pub risk: ScoreComponent,
}

/// A component ranked by how far it pulls the score from neutral.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreFactor {
    pub name: String,
    pub score: f64,
    /// (score - 50) * weight.
    pub contribution: f64,
}

/// Composite 0-100 score with recommendation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MasterScore {
    pub master_score: f64,
    pub recommendation: Recommendation,
    pub confidence: Confidence,
    pub breakdown: ScoreBreakdown,
    pub top_factors: Vec<ScoreFactor>,
    pub timestamp: i64,
}
