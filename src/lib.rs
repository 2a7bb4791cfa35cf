//! Augur - OHLCV analytics engine
//!
//! Turns a bar series into indicators, patterns, signals, risk metrics and a
//! weighted master score, alongside news sentiment, unusual activity and the
//! realized track record of past signals.

pub mod config;
pub mod error;
pub mod services;
pub mod types;

pub use config::Config;
pub use error::{AnalysisError, Result};
