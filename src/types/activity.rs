use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActivityType {
    VolumeSpike,
    PriceAnomaly,
}

/// Severity of one unusual activity event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Severity {
    Low,
    Medium,
    High,
    Extreme,
}

/// Severity of an event set; `None` when nothing fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OverallSeverity {
    None,
    Low,
    Medium,
    High,
    Extreme,
}

impl From<Severity> for OverallSeverity {
    fn from(severity: Severity) -> Self {
        match severity {
            Severity::Low => OverallSeverity::Low,
            Severity::Medium => OverallSeverity::Medium,
            Severity::High => OverallSeverity::High,
            Severity::Extreme => OverallSeverity::Extreme,
        }
    }
}

/// Statistical details behind an event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityDetails {
    pub z_score: f64,
    /// Current value over trailing mean.
    pub ratio: f64,
    pub current_value: f64,
    pub average_value: f64,
    pub daily_change_percent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnusualActivity {
    pub activity_type: ActivityType,
    pub severity: Severity,
    /// min(100, z * 20).
    pub confidence: f64,
    pub details: ActivityDetails,
    pub interpretation: String,
    pub timestamp: i64,
}

/// All events detected for one symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnusualActivityReport {
    pub symbol: String,
    pub has_unusual_activity: bool,
    pub activities: Vec<UnusualActivity>,
    pub overall_severity: OverallSeverity,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub timestamp: i64,
}

impl UnusualActivityReport {
    /// Report with no events.
    pub fn quiet(symbol: &str, timestamp: i64) -> Self {
        Self {
            symbol: symbol.to_string(),
            has_unusual_activity: false,
            activities: Vec::new(),
            overall_severity: OverallSeverity::None,
            warning: None,
            error: None,
            timestamp,
        }
    }

    /// Build a report, deriving the overall severity from the events.
    pub fn from_activities(symbol: &str, activities: Vec<UnusualActivity>, timestamp: i64) -> Self {
        let overall_severity = activities
            .iter()
            .map(|a| a.severity)
            .max()
            .map(OverallSeverity::from)
            .unwrap_or(OverallSeverity::None);

        Self {
            symbol: symbol.to_string(),
            has_unusual_activity: !activities.is_empty(),
            activities,
            overall_severity,
            warning: None,
            error: None,
            timestamp,
        }
    }
}
