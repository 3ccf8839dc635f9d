//! Technical indicators attached to bars before a series is built.
//!
//! This module provides:
//! - `IndicatorKey`: indicator identity + parameters (serves as the per-bar map key)
//! - `IndicatorSeries`: one optional value per bar, `None` during warm-up
//! - `attach_indicators`: computes every requested key and stores the values on the bars

pub mod adx;
pub mod bollinger;
pub mod ema;
pub mod macd;
pub mod rsi;
pub mod sma;

pub use adx::calculate_adx;
pub use bollinger::{calculate_bollinger, BollingerBands};
pub use ema::calculate_ema;
pub use macd::{calculate_macd, MacdLines};
pub use rsi::calculate_rsi;
pub use sma::calculate_sma;

use crate::domain::bar::Bar;
use std::collections::HashSet;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndicatorKey {
    Sma(usize),
    Ema(usize),
    Rsi(usize),
    MacdLine {
        fast: usize,
        slow: usize,
        signal: usize,
    },
    MacdSignal {
        fast: usize,
        slow: usize,
        signal: usize,
    },
    BollingerLower {
        period: usize,
        stddev_mult_x100: u32,
    },
    BollingerMiddle {
        period: usize,
        stddev_mult_x100: u32,
    },
    BollingerUpper {
        period: usize,
        stddev_mult_x100: u32,
    },
    Adx(usize),
}

impl IndicatorKey {
    /// Number of leading bars needed before the first defined value.
    pub fn lookback(&self) -> usize {
        match *self {
            IndicatorKey::Sma(n) | IndicatorKey::Ema(n) => n,
            IndicatorKey::Rsi(n) => n + 1,
            IndicatorKey::MacdLine { slow, .. } => slow,
            IndicatorKey::MacdSignal { slow, signal, .. } => slow + signal.saturating_sub(1),
            IndicatorKey::BollingerLower { period, .. }
            | IndicatorKey::BollingerMiddle { period, .. }
            | IndicatorKey::BollingerUpper { period, .. } => period,
            IndicatorKey::Adx(n) => 2 * n,
        }
    }
}

impl fmt::Display for IndicatorKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndicatorKey::Sma(period) => write!(f, "SMA_{}", period),
            IndicatorKey::Ema(period) => write!(f, "EMA_{}", period),
            IndicatorKey::Rsi(period) => write!(f, "RSI_{}", period),
            IndicatorKey::MacdLine { fast, slow, signal } => {
                write!(f, "MACD_{}_{}_{}", fast, slow, signal)
            }
            IndicatorKey::MacdSignal { fast, slow, signal } => {
                write!(f, "MACDs_{}_{}_{}", fast, slow, signal)
            }
            IndicatorKey::BollingerLower {
                period,
                stddev_mult_x100,
            } => write!(f, "BBL_{}_{:.1}", period, *stddev_mult_x100 as f64 / 100.0),
            IndicatorKey::BollingerMiddle {
                period,
                stddev_mult_x100,
            } => write!(f, "BBM_{}_{:.1}", period, *stddev_mult_x100 as f64 / 100.0),
            IndicatorKey::BollingerUpper {
                period,
                stddev_mult_x100,
            } => write!(f, "BBU_{}_{:.1}", period, *stddev_mult_x100 as f64 / 100.0),
            IndicatorKey::Adx(period) => write!(f, "ADX_{}", period),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorSeries {
    pub key: IndicatorKey,
    pub values: Vec<Option<f64>>,
}

impl IndicatorSeries {
    pub fn first_valid_index(&self) -> Option<usize> {
        self.values.iter().position(Option::is_some)
    }
}

/// Compute a single indicator over `bars`.
pub fn compute(bars: &[Bar], key: IndicatorKey) -> IndicatorSeries {
    match key {
        IndicatorKey::Sma(period) => calculate_sma(bars, period),
        IndicatorKey::Ema(period) => calculate_ema(bars, period),
        IndicatorKey::Rsi(period) => calculate_rsi(bars, period),
        IndicatorKey::MacdLine { fast, slow, signal } => calculate_macd(bars, fast, slow, signal).line,
        IndicatorKey::MacdSignal { fast, slow, signal } => {
            calculate_macd(bars, fast, slow, signal).signal
        }
        IndicatorKey::BollingerLower {
            period,
            stddev_mult_x100,
        } => calculate_bollinger(bars, period, stddev_mult_x100).lower,
        IndicatorKey::BollingerMiddle {
            period,
            stddev_mult_x100,
        } => calculate_bollinger(bars, period, stddev_mult_x100).middle,
        IndicatorKey::BollingerUpper {
            period,
            stddev_mult_x100,
        } => calculate_bollinger(bars, period, stddev_mult_x100).upper,
        IndicatorKey::Adx(period) => calculate_adx(bars, period),
    }
}

/// Compute each distinct key once and store its value on every bar.
pub fn attach_indicators(bars: &mut [Bar], keys: &[IndicatorKey]) {
    let mut seen = HashSet::new();
    for key in keys {
        if !seen.insert(*key) {
            continue;
        }
        let series = compute(bars, *key);
        for (bar, value) in bars.iter_mut().zip(series.values) {
            bar.indicators.insert(*key, value);
        }
    }
}

#[cfg(test)]
pub(crate) fn bars_from_closes(prices: &[f64]) -> Vec<Bar> {
    use chrono::NaiveDate;

    let start = NaiveDate::from_ymd_opt(2024, 1, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap();
    prices
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            Bar::new(
                start + chrono::Duration::days(i as i64),
                close,
                close,
                close,
                close,
                1000.0,
            )
        })
        .collect()
}
