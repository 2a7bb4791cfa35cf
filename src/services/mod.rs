pub mod analysis;
pub mod cache;
pub mod indicators;
pub mod master_score;
pub mod patterns;
pub mod risk;
pub mod rolling;
pub mod sentiment;
pub mod signals;
pub mod sqlite_store;
pub mod unusual_activity;

pub use analysis::AnalysisService;
pub use cache::{Cache, CacheStats};
pub use indicators::{calculate_indicators, Indicator};
pub use master_score::MasterScoreEngine;
pub use patterns::{detect_patterns, PatternDetector};
pub use risk::calculate_risk_metrics;
pub use sentiment::{analyze_sentiment, SentimentAnalyzer};
pub use signals::{
    generate_signals, MemoryRecordStore, SignalGenerator, SignalPerformanceTracker, SignalRecordStore,
};
pub use sqlite_store::{RecordStats, SqliteStore};
pub use unusual_activity::{detect_unusual_activity, UnusualActivityDetector};
