//! Rule-based signal generation from an indicator set.
//!
//! Every rule is independent: several can fire at once, including
//! contradictory ones, and no rule suppresses another.

use crate::types::{IndicatorSet, Signal, Timeframe};

use crate::types::SignalStrength::{Medium, Strong, VeryStrong, Weak};

/// Generates buy/sell/hold signals from the latest indicator readings.
#[derive(Debug, Default, Clone, Copy)]
pub struct SignalGenerator;

impl SignalGenerator {
    pub fn new() -> Self {
        Self
    }

    /// Run every rule against `indicators` and the latest close.
    ///
    /// A non-finite close yields no signals. Rules whose inputs are absent
    /// are skipped.
    pub fn generate(&self, indicators: &IndicatorSet, close: f64) -> Vec<Signal> {
        if !close.is_finite() {
            return Vec::new();
        }

        let rules: [fn(&IndicatorSet, f64, &mut Vec<Signal>); 12] = [
            rsi_rule,
            stochastic_rule,
            williams_rule,
            cci_rule,
            macd_rule,
            adx_rule,
            sma_cross_rule,
            sma_200_rule,
            bollinger_rule,
            atr_rule,
            volume_rule,
            pivot_rule,
        ];

        let mut signals = Vec::new();
        for rule in rules {
            rule(indicators, close, &mut signals);
        }
        signals
    }
}

/// Convenience wrapper around [`SignalGenerator::generate`].
pub fn generate_signals(indicators: &IndicatorSet, close: f64) -> Vec<Signal> {
    SignalGenerator::new().generate(indicators, close)
}

fn rsi_rule(ind: &IndicatorSet, _close: f64, out: &mut Vec<Signal>) {
    let Some(rsi) = ind.get("rsi") else {
        return;
    };
    let signal = if rsi < 20.0 {
        Signal::buy(VeryStrong, "RSI", format!("Extremely oversold (RSI {:.1})", rsi), Timeframe::Short)
    } else if rsi < 30.0 {
        Signal::buy(Strong, "RSI", format!("Oversold (RSI {:.1})", rsi), Timeframe::Short)
    } else if rsi > 80.0 {
        Signal::sell(VeryStrong, "RSI", format!("Extremely overbought (RSI {:.1})", rsi), Timeframe::Short)
    } else if rsi > 70.0 {
        Signal::sell(Strong, "RSI", format!("Overbought (RSI {:.1})", rsi), Timeframe::Short)
    } else {
        return;
    };
    out.push(signal);
}

fn stochastic_rule(ind: &IndicatorSet, _close: f64, out: &mut Vec<Signal>) {
    let (Some(k), Some(d)) = (ind.get("stoch_k"), ind.get("stoch_d")) else {
        return;
    };
    if k < 20.0 && d < 20.0 && k > d {
        out.push(Signal::buy(
            Strong,
            "Stochastic",
            format!("Oversold with %K crossing above %D ({:.1} / {:.1})", k, d),
            Timeframe::Short,
        ));
    } else if k > 80.0 && d > 80.0 && k < d {
        out.push(Signal::sell(
            Strong,
            "Stochastic",
            format!("Overbought with %K crossing below %D ({:.1} / {:.1})", k, d),
            Timeframe::Short,
        ));
    }
}

fn williams_rule(ind: &IndicatorSet, _close: f64, out: &mut Vec<Signal>) {
    let Some(wr) = ind.get("williams_r") else {
        return;
    };
    if wr < -80.0 {
        out.push(Signal::buy(Strong, "Williams %R", format!("Oversold (%R {:.1})", wr), Timeframe::Short));
    } else if wr > -20.0 {
        out.push(Signal::sell(Strong, "Williams %R", format!("Overbought (%R {:.1})", wr), Timeframe::Short));
    }
}

fn cci_rule(ind: &IndicatorSet, _close: f64, out: &mut Vec<Signal>) {
    let Some(cci) = ind.get("cci") else {
        return;
    };
    if cci < -100.0 {
        out.push(Signal::buy(Medium, "CCI", format!("Oversold (CCI {:.1})", cci), Timeframe::Short));
    } else if cci > 100.0 {
        out.push(Signal::sell(Medium, "CCI", format!("Overbought (CCI {:.1})", cci), Timeframe::Short));
    }
}

fn macd_rule(ind: &IndicatorSet, _close: f64, out: &mut Vec<Signal>) {
    let (Some(macd), Some(signal), Some(hist)) =
        (ind.get("macd"), ind.get("macd_signal"), ind.get("macd_histogram"))
    else {
        return;
    };
    if macd > signal && hist > 0.0 {
        out.push(Signal::buy(
            Strong,
            "MACD",
            format!("MACD above signal line with positive histogram ({:.3})", macd),
            Timeframe::Medium,
        ));
    } else if macd < signal && hist < 0.0 {
        out.push(Signal::sell(
            Strong,
            "MACD",
            format!("MACD below signal line with negative histogram ({:.3})", macd),
            Timeframe::Medium,
        ));
    }
}

fn adx_rule(ind: &IndicatorSet, _close: f64, out: &mut Vec<Signal>) {
    let Some(adx) = ind.get("adx") else {
        return;
    };
    if adx > 25.0 {
        let (Some(plus), Some(minus)) = (ind.get("plus_di"), ind.get("minus_di")) else {
            return;
        };
        if plus > minus {
            out.push(Signal::buy(
                Medium,
                "ADX",
                format!("Trending up (ADX {:.1}, +DI {:.1})", adx, plus),
                Timeframe::Medium,
            ));
        } else if minus > plus {
            out.push(Signal::sell(
                Medium,
                "ADX",
                format!("Trending down (ADX {:.1}, -DI {:.1})", adx, minus),
                Timeframe::Medium,
            ));
        }
    } else if adx < 20.0 {
        out.push(Signal::hold(
            Weak,
            "ADX",
            format!("No clear trend (ADX {:.1}), sideways market", adx),
            Timeframe::Medium,
        ));
    }
}

fn sma_cross_rule(ind: &IndicatorSet, _close: f64, out: &mut Vec<Signal>) {
    let (Some(fast), Some(slow)) = (ind.get("sma_20"), ind.get("sma_50")) else {
        return;
    };
    if fast > slow {
        out.push(Signal::buy(Medium, "SMA Crossover", "Golden Cross: SMA20 above SMA50", Timeframe::Long));
    } else if fast < slow {
        out.push(Signal::sell(Medium, "SMA Crossover", "Death Cross: SMA20 below SMA50", Timeframe::Long));
    }
}

fn sma_200_rule(ind: &IndicatorSet, close: f64, out: &mut Vec<Signal>) {
    let Some(sma_200) = ind.get("sma_200") else {
        return;
    };
    if close > sma_200 {
        out.push(Signal::buy(
            Weak,
            "SMA200",
            format!("Close {:.2} above 200-bar average {:.2}", close, sma_200),
            Timeframe::Long,
        ));
    } else {
        out.push(Signal::sell(
            Weak,
            "SMA200",
            format!("Close {:.2} at or below 200-bar average {:.2}", close, sma_200),
            Timeframe::Long,
        ));
    }
}

fn bollinger_rule(ind: &IndicatorSet, _close: f64, out: &mut Vec<Signal>) {
    let Some(percent_b) = ind.get("bb_percent") else {
        return;
    };
    if percent_b < 0.1 {
        out.push(Signal::buy(
            Medium,
            "Bollinger Bands",
            format!("Price near lower band (%B {:.0}%)", percent_b * 100.0),
            Timeframe::Short,
        ));
    } else if percent_b > 0.9 {
        out.push(Signal::sell(
            Medium,
            "Bollinger Bands",
            format!("Price near upper band (%B {:.0}%)", percent_b * 100.0),
            Timeframe::Short,
        ));
    }
}

fn atr_rule(ind: &IndicatorSet, close: f64, out: &mut Vec<Signal>) {
    let Some(atr) = ind.get("atr") else {
        return;
    };
    if close == 0.0 {
        return;
    }
    let atr_pct = atr / close * 100.0;
    if atr_pct > 3.0 {
        out.push(Signal::hold(
            Weak,
            "ATR",
            format!("High volatility ({:.1}% ATR), use caution", atr_pct),
            Timeframe::Short,
        ));
    }
}

fn volume_rule(ind: &IndicatorSet, _close: f64, out: &mut Vec<Signal>) {
    let Some(vroc) = ind.get("vroc") else {
        return;
    };
    if vroc > 50.0 {
        out.push(Signal::buy(
            Medium,
            "Volume",
            format!("Volume expanding ({:.1}%) confirms buyers", vroc),
            Timeframe::Medium,
        ));
    } else if vroc < -30.0 {
        out.push(Signal::sell(
            Weak,
            "Volume",
            format!("Volume drying up ({:.1}%)", vroc),
            Timeframe::Medium,
        ));
    }
}

fn pivot_rule(ind: &IndicatorSet, close: f64, out: &mut Vec<Signal>) {
    if let Some(r1) = ind.get("resistance_1") {
        if close > r1 {
            out.push(Signal::buy(
                Strong,
                "Pivot Points",
                format!("Close {:.2} broke above R1 {:.2}", close, r1),
                Timeframe::Short,
            ));
        }
    }
    if let Some(s1) = ind.get("support_1") {
        if close < s1 {
            out.push(Signal::sell(
                Strong,
                "Pivot Points",
                format!("Close {:.2} broke below S1 {:.2}", close, s1),
                Timeframe::Short,
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SignalType;

    fn set(values: &[(&str, f64)]) -> IndicatorSet {
        let mut indicators = IndicatorSet::new();
        for (key, value) in values {
            indicators.insert(key, Some(*value));
        }
        indicators
    }

    fn find<'a>(signals: &'a [Signal], indicator: &str) -> Option<&'a Signal> {
        signals.iter().find(|s| s.indicator == indicator)
    }

    #[test]
    fn test_empty_set_no_signals() {
        assert!(generate_signals(&IndicatorSet::new(), 100.0).is_empty());
    }

    #[test]
    fn test_non_finite_close_no_signals() {
        let indicators = set(&[("rsi", 10.0)]);
        assert!(generate_signals(&indicators, f64::NAN).is_empty());
        assert!(generate_signals(&indicators, f64::INFINITY).is_empty());
    }

    #[test]
    fn test_rsi_bands() {
        let cases = [
            (0.0, SignalType::Buy, VeryStrong),
            (25.0, SignalType::Buy, Strong),
            (85.0, SignalType::Sell, VeryStrong),
            (75.0, SignalType::Sell, Strong),
        ];
        for (rsi, signal_type, strength) in cases {
            let signals = generate_signals(&set(&[("rsi", rsi)]), 100.0);
            let signal = find(&signals, "RSI").unwrap();
            assert_eq!(signal.signal_type, signal_type);
            assert_eq!(signal.strength, strength);
            assert_eq!(signal.timeframe, Timeframe::Short);
        }
        assert!(generate_signals(&set(&[("rsi", 50.0)]), 100.0).is_empty());
    }

    #[test]
    fn test_stochastic_crossover() {
        let signals = generate_signals(&set(&[("stoch_k", 15.0), ("stoch_d", 10.0)]), 100.0);
        assert_eq!(find(&signals, "Stochastic").unwrap().signal_type, SignalType::Buy);

        let signals = generate_signals(&set(&[("stoch_k", 10.0), ("stoch_d", 15.0)]), 100.0);
        assert!(find(&signals, "Stochastic").is_none());

        let signals = generate_signals(&set(&[("stoch_k", 85.0), ("stoch_d", 90.0)]), 100.0);
        assert_eq!(find(&signals, "Stochastic").unwrap().signal_type, SignalType::Sell);
    }

    #[test]
    fn test_macd_buy() {
        let indicators = set(&[("macd", 0.5), ("macd_signal", 0.3), ("macd_histogram", 0.2)]);
        let signals = generate_signals(&indicators, 100.0);
        let macd = find(&signals, "MACD").unwrap();
        assert_eq!(macd.signal_type, SignalType::Buy);
        assert_eq!(macd.strength, Strong);
        assert_eq!(macd.timeframe, Timeframe::Medium);
    }

    #[test]
    fn test_adx_rules() {
        let up = set(&[("adx", 30.0), ("plus_di", 25.0), ("minus_di", 10.0)]);
        assert_eq!(find(&generate_signals(&up, 100.0), "ADX").unwrap().signal_type, SignalType::Buy);

        let down = set(&[("adx", 30.0), ("plus_di", 10.0), ("minus_di", 25.0)]);
        assert_eq!(find(&generate_signals(&down, 100.0), "ADX").unwrap().signal_type, SignalType::Sell);

        let flat = set(&[("adx", 15.0)]);
        let signals = generate_signals(&flat, 100.0);
        let adx = find(&signals, "ADX").unwrap();
        assert_eq!(adx.signal_type, SignalType::Hold);
        assert_eq!(adx.strength, Weak);

        // Between 20 and 25 nothing fires
        assert!(find(&generate_signals(&set(&[("adx", 22.0)]), 100.0), "ADX").is_none());
    }

    #[test]
    fn test_sma_rules() {
        let indicators = set(&[("sma_20", 110.0), ("sma_50", 100.0), ("sma_200", 90.0)]);
        let signals = generate_signals(&indicators, 120.0);
        let cross = find(&signals, "SMA Crossover").unwrap();
        assert_eq!(cross.signal_type, SignalType::Buy);
        assert!(cross.reason.contains("Golden Cross"));
        assert_eq!(cross.timeframe, Timeframe::Long);
        assert_eq!(find(&signals, "SMA200").unwrap().signal_type, SignalType::Buy);

        let signals = generate_signals(&set(&[("sma_200", 90.0)]), 90.0);
        assert_eq!(find(&signals, "SMA200").unwrap().signal_type, SignalType::Sell);
    }

    #[test]
    fn test_atr_high_volatility_hold() {
        let signals = generate_signals(&set(&[("atr", 5.0)]), 100.0);
        let atr = find(&signals, "ATR").unwrap();
        assert_eq!(atr.signal_type, SignalType::Hold);

        assert!(generate_signals(&set(&[("atr", 1.0)]), 100.0).is_empty());
    }

    #[test]
    fn test_volume_and_pivots() {
        let indicators = set(&[("vroc", 60.0), ("resistance_1", 95.0), ("support_1", 90.0)]);
        let signals = generate_signals(&indicators, 100.0);
        assert_eq!(find(&signals, "Volume").unwrap().strength, Medium);
        let pivot = find(&signals, "Pivot Points").unwrap();
        assert_eq!(pivot.signal_type, SignalType::Buy);
        assert_eq!(pivot.strength, Strong);

        let signals = generate_signals(&set(&[("vroc", -40.0), ("support_1", 90.0)]), 85.0);
        assert_eq!(find(&signals, "Volume").unwrap().strength, Weak);
        assert_eq!(find(&signals, "Pivot Points").unwrap().signal_type, SignalType::Sell);
    }

    #[test]
    fn test_contradictory_signals_coexist() {
        let indicators = set(&[("rsi", 15.0), ("williams_r", -10.0)]);
        let signals = generate_signals(&indicators, 100.0);
        assert_eq!(signals.len(), 2);
        assert_eq!(find(&signals, "RSI").unwrap().signal_type, SignalType::Buy);
        assert_eq!(find(&signals, "Williams %R").unwrap().signal_type, SignalType::Sell);
    }
}
