//! Keyword-polarity news sentiment.
//!
//! Text is lowercased and split into alphanumeric tokens. A token hits a
//! keyword when it equals the keyword, either directly or after stripping one
//! common inflection suffix.

use crate::error::{AnalysisError, Result};
use crate::types::{
    Confidence, Headline, HeadlineSentiment, NewsItem, SentimentBreakdown, SentimentLabel, SentimentResult,
    SocialBuzz, SourceBreakdown,
};
use tracing::{debug, warn};

const BULLISH_KEYWORDS: &[&str] = &[
    "surge", "rally", "gain", "profit", "growth", "bullish", "upgrade", "beat", "exceed", "strong", "record",
    "soar", "jump", "rise", "outperform", "buy", "target", "momentum", "breakout", "positive", "up", "higher",
    "boom", "bull", "breakthrough",
];

const BEARISH_KEYWORDS: &[&str] = &[
    "fall", "drop", "decline", "loss", "bearish", "downgrade", "miss", "weak", "plunge", "slump", "collapse",
    "sell", "risk", "concern", "warning", "cut", "layoff", "struggle", "uncertain", "negative", "down", "lower",
    "crash", "bear", "fear",
];

const SUFFIXES: &[&str] = &["s", "es", "ed", "d", "ing"];

const MAX_HEADLINES: usize = 3;
const MAX_TITLE_CHARS: usize = 100;
/// Item score above which an item counts as positive (below the negation, negative).
const ITEM_POLARITY_THRESHOLD: f64 = 20.0;
const DATA_SOURCE: &str = "News feed";

/// Scores news items by bullish/bearish keyword counts.
#[derive(Debug, Default, Clone, Copy)]
pub struct SentimentAnalyzer;

impl SentimentAnalyzer {
    pub fn new() -> Self {
        Self
    }

    /// Score the news for `symbol`.
    ///
    /// Returns `NotFound` when there is no news to score.
    pub fn calculate(&self, symbol: &str, news: &[NewsItem]) -> Result<SentimentResult> {
        if symbol.trim().is_empty() {
            return Err(AnalysisError::InvalidInput("empty symbol".to_string()));
        }
        if news.is_empty() {
            return Err(AnalysisError::NotFound(format!("No recent news found for {}", symbol)));
        }

        let mut breakdown = SourceBreakdown {
            count: news.len(),
            ..Default::default()
        };
        let mut total = 0.0;

        for item in news {
            let text = format!("{} {}", item.title, item.summary);
            let (bull, bear) = keyword_hits(&text);
            let score = item_score(bull, bear);
            total += score;

            if score > ITEM_POLARITY_THRESHOLD {
                breakdown.positive += 1;
            } else if score < -ITEM_POLARITY_THRESHOLD {
                breakdown.negative += 1;
            } else {
                breakdown.neutral += 1;
            }
        }

        let mean = total / news.len() as f64;
        let sentiment_score = round2(mean.clamp(-100.0, 100.0));
        breakdown.score = sentiment_score;

        let sentiment_label = SentimentLabel::from_score(sentiment_score);
        let confidence = confidence_for(sentiment_label, &breakdown);

        debug!(
            "Sentiment for {}: {:.2} ({}) from {} items",
            symbol,
            sentiment_score,
            sentiment_label.label(),
            news.len()
        );

        Ok(SentimentResult {
            symbol: symbol.to_uppercase(),
            sentiment_score,
            sentiment_label,
            confidence,
            breakdown: SentimentBreakdown { news: breakdown },
            top_headlines: top_headlines(news),
            social_buzz: SocialBuzz::default(),
            data_sources: DATA_SOURCE.to_string(),
            warning: None,
            timestamp: chrono::Utc::now().timestamp_millis(),
        })
    }

    /// Best-effort variant of [`calculate`](Self::calculate). Missing news
    /// yields a "No Data" result; any other failure an error result.
    pub fn analyze(&self, symbol: &str, news: &[NewsItem]) -> SentimentResult {
        match self.calculate(symbol, news) {
            Ok(result) => result,
            Err(AnalysisError::NotFound(message)) => {
                debug!("{}", message);
                empty_result(symbol, "None", message)
            }
            Err(e) => {
                warn!("Sentiment analysis failed for {}: {}", symbol, e);
                empty_result(symbol, "Error", format!("Sentiment analysis failed: {}", e))
            }
        }
    }
}

/// Convenience wrapper around [`SentimentAnalyzer::analyze`].
pub fn analyze_sentiment(symbol: &str, news: &[NewsItem]) -> SentimentResult {
    SentimentAnalyzer::new().analyze(symbol, news)
}

fn empty_result(symbol: &str, data_sources: &str, warning: String) -> SentimentResult {
    SentimentResult {
        symbol: symbol.to_uppercase(),
        sentiment_score: 0.0,
        sentiment_label: SentimentLabel::NoData,
        confidence: Confidence::Low,
        breakdown: SentimentBreakdown::default(),
        top_headlines: Vec::new(),
        social_buzz: SocialBuzz::default(),
        data_sources: data_sources.to_string(),
        warning: Some(warning),
        timestamp: chrono::Utc::now().timestamp_millis(),
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn matches_keyword(token: &str, keyword: &str) -> bool {
    token == keyword
        || SUFFIXES
            .iter()
            .any(|suffix| token.strip_suffix(suffix).is_some_and(|stem| stem == keyword))
}

/// Count bullish and bearish keyword hits. Every occurrence counts.
pub fn keyword_hits(text: &str) -> (usize, usize) {
    let lower = text.to_lowercase();
    let mut bull = 0;
    let mut bear = 0;

    for token in lower.split(|c: char| !c.is_alphanumeric()).filter(|t| !t.is_empty()) {
        if BULLISH_KEYWORDS.iter().any(|kw| matches_keyword(token, kw)) {
            bull += 1;
        }
        if BEARISH_KEYWORDS.iter().any(|kw| matches_keyword(token, kw)) {
            bear += 1;
        }
    }

    (bull, bear)
}

/// (bull - bear) / (bull + bear) * 100, or 0 without hits.
fn item_score(bull: usize, bear: usize) -> f64 {
    let hits = bull + bear;
    if hits == 0 {
        return 0.0;
    }
    (bull as f64 - bear as f64) / hits as f64 * 100.0
}

fn confidence_for(label: SentimentLabel, breakdown: &SourceBreakdown) -> Confidence {
    let confirmed = |count: usize| if count > 2 { Confidence::High } else { Confidence::Medium };
    match label {
        SentimentLabel::ExtremelyBullish | SentimentLabel::Bullish => confirmed(breakdown.positive),
        SentimentLabel::ExtremelyBearish | SentimentLabel::Bearish => confirmed(breakdown.negative),
        SentimentLabel::Neutral => Confidence::High,
        SentimentLabel::NoData => Confidence::Low,
    }
}

fn headline_sentiment(title: &str) -> HeadlineSentiment {
    let (bull, bear) = keyword_hits(title);
    if bull > bear {
        HeadlineSentiment::Positive
    } else if bear > bull {
        HeadlineSentiment::Negative
    } else {
        HeadlineSentiment::Neutral
    }
}

fn top_headlines(news: &[NewsItem]) -> Vec<Headline> {
    news.iter()
        .take(MAX_HEADLINES)
        .map(|item| Headline {
            title: item.title.chars().take(MAX_TITLE_CHARS).collect(),
            sentiment: headline_sentiment(&item.title),
            published: item.published.clone(),
            link: item.link.clone(),
        })
        .collect()
}
