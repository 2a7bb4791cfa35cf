//! Technical indicator engine.
//!
//! Every indicator implements [`Indicator`] and is registered in
//! [`all_indicators`]. The engine runs each one independently, so a failure
//! in one indicator only drops that indicator's keys.

pub mod ad_line;
pub mod adx;
pub mod atr;
pub mod bollinger;
pub mod cci;
pub mod ema;
pub mod macd;
pub mod obv;
pub mod pivots;
pub mod rsi;
pub mod sma;
pub mod stochastic;
pub mod vroc;
pub mod williams;

pub use ad_line::AdLine;
pub use adx::Adx;
pub use atr::Atr;
pub use bollinger::BollingerBands;
pub use cci::Cci;
pub use ema::Ema;
pub use macd::Macd;
pub use obv::Obv;
pub use pivots::Pivots;
pub use rsi::Rsi;
pub use sma::Sma;
pub use stochastic::Stochastic;
pub use vroc::Vroc;
pub use williams::WilliamsR;

use crate::error::{AnalysisError, Result};
use crate::types::{Bar, IndicatorCategory, IndicatorOutput, IndicatorSet};
use tracing::{debug, warn};

/// Trait for implementing technical indicators.
pub trait Indicator: Send + Sync {
    /// Unique identifier for this indicator.
    fn id(&self) -> &str;

    /// Human-readable name.
    fn name(&self) -> &str;

    /// Category this indicator belongs to.
    fn category(&self) -> IndicatorCategory;

    /// Minimum number of bars required for calculation.
    fn min_periods(&self) -> usize;

    /// Calculate the indicator from OHLCV bars.
    /// Returns `InsufficientData` below `min_periods`.
    fn calculate(&self, bars: &[Bar]) -> Result<IndicatorOutput>;
}

/// Fail with `InsufficientData` if fewer than `required` bars are supplied.
pub fn ensure_periods(bars: &[Bar], required: usize) -> Result<()> {
    if bars.len() < required {
        return Err(AnalysisError::insufficient(required, bars.len()));
    }
    Ok(())
}

/// Keys whose full series are kept in `IndicatorSet::historical`.
pub const HISTORICAL_KEYS: &[&str] = &[
    "sma_20",
    "sma_50",
    "sma_200",
    "ema_12",
    "ema_26",
    "rsi",
    "macd",
    "macd_signal",
    "macd_histogram",
    "bb_upper",
    "bb_middle",
    "bb_lower",
];

/// Every key the default registry can produce.
pub const EXPECTED_KEYS: &[&str] = &[
    "sma_20",
    "sma_50",
    "sma_200",
    "ema_12",
    "ema_26",
    "rsi",
    "stoch_k",
    "stoch_d",
    "williams_r",
    "cci",
    "macd",
    "macd_signal",
    "macd_histogram",
    "adx",
    "plus_di",
    "minus_di",
    "bb_upper",
    "bb_lower",
    "bb_middle",
    "bb_width",
    "bb_percent",
    "atr",
    "obv",
    "vroc",
    "ad_line",
    "pivot_point",
    "resistance_1",
    "resistance_2",
    "support_1",
    "support_2",
    "recent_high",
    "recent_low",
];

/// Get all available indicators.
pub fn all_indicators() -> Vec<Box<dyn Indicator>> {
    vec![
        // Trend indicators
        Box::new(Sma::new(20)),
        Box::new(Sma::new(50)),
        Box::new(Sma::new(200)),
        Box::new(Ema::new(12)),
        Box::new(Ema::new(26)),
        Box::new(Macd::default()),
        Box::new(Adx::default()),
        // Momentum indicators
        Box::new(Rsi::default()),
        Box::new(Stochastic::default()),
        Box::new(WilliamsR::default()),
        Box::new(Cci::default()),
        // Volatility indicators
        Box::new(BollingerBands::default()),
        Box::new(Atr::default()),
        // Volume indicators
        Box::new(Obv::default()),
        Box::new(Vroc::default()),
        Box::new(AdLine::default()),
        // Support/resistance
        Box::new(Pivots::default()),
    ]
}

/// Calculate every registered indicator for a bar series.
pub fn calculate_indicators(bars: &[Bar]) -> IndicatorSet {
    calculate_with(&all_indicators(), bars)
}

/// Calculate the given indicators. Fewer than two bars yields an empty set.
pub fn calculate_with(indicators: &[Box<dyn Indicator>], bars: &[Bar]) -> IndicatorSet {
    let mut set = IndicatorSet::new();
    if bars.len() < 2 {
        return set;
    }

    let timestamps: Vec<i64> = bars.iter().map(|b| b.timestamp).collect();

    for indicator in indicators {
        match indicator.calculate(bars) {
            Ok(output) => {
                for (key, value) in output.values {
                    set.insert(key, value);
                }
                for (key, series) in output.series {
                    if HISTORICAL_KEYS.contains(&key) {
                        set.insert_series(key, &timestamps, &series);
                    }
                }
            }
            Err(e) if e.is_insufficient_data() => {
                debug!("Skipping {}: {}", indicator.id(), e);
            }
            Err(e) => {
                warn!("Indicator {} failed: {}", indicator.id(), e);
            }
        }
    }

    set.last_close = bars.last().map(|b| b.close).filter(|c| c.is_finite());
    set
}

/// Fraction of [`EXPECTED_KEYS`] present in a set.
pub fn coverage(set: &IndicatorSet) -> f64 {
    let present = EXPECTED_KEYS.iter().filter(|k| set.contains(k)).count();
    present as f64 / EXPECTED_KEYS.len() as f64
}
