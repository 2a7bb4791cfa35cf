//! Trading signals: rule-based generation and realized performance tracking.

pub mod generator;
pub mod performance;

pub use generator::{generate_signals, SignalGenerator};
pub use performance::{MemoryRecordStore, SignalPerformanceTracker, SignalRecordStore};
