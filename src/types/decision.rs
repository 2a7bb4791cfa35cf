use crate::types::{
    AccuracyMetrics, Bar, IndicatorSet, MasterScore, NewsItem, Pattern, RiskMetrics, SentimentResult, Signal,
    UnusualActivityReport,
};
use serde::{Deserialize, Serialize};

/// Coverage of the computed indicator set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DataQuality {
    High,
    Medium,
}

impl DataQuality {
    /// HIGH when at least 80% of expected indicators are present.
    pub fn from_ratio(ratio: f64) -> Self {
        if ratio >= 0.8 {
            DataQuality::High
        } else {
            DataQuality::Medium
        }
    }
}

/// Everything the pipeline needs for one symbol.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisRequest {
    pub symbol: String,
    pub bars: Vec<Bar>,
    #[serde(default)]
    pub news: Vec<NewsItem>,
    /// Live price; defaults to the last close.
    #[serde(default)]
    pub current_price: Option<f64>,
    /// Benchmark return over the evaluation window, used to score pending signals.
    #[serde(default)]
    pub benchmark_return: Option<f64>,
}

impl AnalysisRequest {
    pub fn new(symbol: &str, bars: Vec<Bar>) -> Self {
        Self {
            symbol: symbol.to_string(),
            bars,
            ..Default::default()
        }
    }

    pub fn with_news(mut self, news: Vec<NewsItem>) -> Self {
        self.news = news;
        self
    }

    pub fn with_current_price(mut self, price: f64) -> Self {
        self.current_price = Some(price);
        self
    }

    pub fn with_benchmark_return(mut self, benchmark_return: f64) -> Self {
        self.benchmark_return = Some(benchmark_return);
        self
    }
}

/// Combined view merging the score, sentiment, activity and track record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvestmentDecision {
    pub symbol: String,
    pub master_score: MasterScore,
    pub indicators: IndicatorSet,
    pub signals: Vec<Signal>,
    pub patterns: Vec<Pattern>,
    pub risk_metrics: Option<RiskMetrics>,
    pub sentiment: SentimentResult,
    pub unusual_activity: UnusualActivityReport,
    pub signal_performance: Option<AccuracyMetrics>,
    pub data_quality: DataQuality,
    pub generated_at: i64,
}
