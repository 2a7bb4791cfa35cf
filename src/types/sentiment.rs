use crate::types::Confidence;
use serde::{Deserialize, Serialize};

/// A news item supplied by an external news collaborator.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsItem {
    pub title: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub published: String,
    #[serde(default)]
    pub link: String,
}

impl NewsItem {
    pub fn new(title: impl Into<String>, summary: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            summary: summary.into(),
            ..Default::default()
        }
    }
}

/// Sentiment label bands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SentimentLabel {
    #[serde(rename = "Extremely Bullish")]
    ExtremelyBullish,
    #[serde(rename = "Bullish")]
    Bullish,
    #[serde(rename = "Neutral")]
    Neutral,
    #[serde(rename = "Bearish")]
    Bearish,
    #[serde(rename = "Extremely Bearish")]
    ExtremelyBearish,
    #[serde(rename = "No Data")]
    NoData,
}

impl SentimentLabel {
    /// Create a label from a sentiment score (-100 to +100).
    pub fn from_score(score: f64) -> Self {
        match score {
            s if s >= 60.0 => SentimentLabel::ExtremelyBullish,
            s if s >= 30.0 => SentimentLabel::Bullish,
            s if s >= -30.0 => SentimentLabel::Neutral,
            s if s >= -60.0 => SentimentLabel::Bearish,
            _ => SentimentLabel::ExtremelyBearish,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SentimentLabel::ExtremelyBullish => "Extremely Bullish",
            SentimentLabel::Bullish => "Bullish",
            SentimentLabel::Neutral => "Neutral",
            SentimentLabel::Bearish => "Bearish",
            SentimentLabel::ExtremelyBearish => "Extremely Bearish",
            SentimentLabel::NoData => "No Data",
        }
    }
}

/// Polarity tag for a single headline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HeadlineSentiment {
    Positive,
    Negative,
    Neutral,
}

/// Per-source sentiment counts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceBreakdown {
    pub score: f64,
    pub count: usize,
    pub positive: usize,
    pub negative: usize,
    pub neutral: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SentimentBreakdown {
    pub news: SourceBreakdown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Headline {
    pub title: String,
    pub sentiment: HeadlineSentiment,
    pub published: String,
    pub link: String,
}

/// Placeholder for a social media source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SocialBuzz {
    pub score: f64,
    pub trend: String,
    pub mentions_24h: u64,
}

impl Default for SocialBuzz {
    fn default() -> Self {
        Self {
            score: 0.0,
            trend: "STABLE".to_string(),
            mentions_24h: 0,
        }
    }
}

/// Keyword-polarity sentiment for one symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SentimentResult {
    pub symbol: String,
    /// Mean item score (-100 to +100).
    pub sentiment_score: f64,
    pub sentiment_label: SentimentLabel,
    pub confidence: Confidence,
    pub breakdown: SentimentBreakdown,
    pub top_headlines: Vec<Headline>,
    pub social_buzz: SocialBuzz,
    pub data_sources: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
    pub timestamp: i64,
}
