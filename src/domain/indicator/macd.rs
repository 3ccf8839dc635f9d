//! MACD (Moving Average Convergence Divergence) indicator.
//!
//! MACD Line = EMA(fast) - EMA(slow)
//! Signal Line = EMA(signal) of MACD Line
//!
//! Default parameters: fast=12, slow=26, signal=9
//! Warmup: line is `None` for the first (slow - 1) bars, signal for the first
//! (slow - 1 + signal - 1) bars.

use crate::domain::bar::Bar;
use crate::domain::indicator::ema::ema_of;
use crate::domain::indicator::{IndicatorKey, IndicatorSeries};

pub const DEFAULT_FAST: usize = 12;
pub const DEFAULT_SLOW: usize = 26;
pub const DEFAULT_SIGNAL: usize = 9;

#[derive(Debug, Clone, PartialEq)]
pub struct MacdLines {
    pub line: IndicatorSeries,
    pub signal: IndicatorSeries,
}

pub fn calculate_macd(bars: &[Bar], fast: usize, slow: usize, signal_period: usize) -> MacdLines {
    let line_key = IndicatorKey::MacdLine {
        fast,
        slow,
        signal: signal_period,
    };
    let signal_key = IndicatorKey::MacdSignal {
        fast,
        slow,
        signal: signal_period,
    };

    if fast == 0 || slow == 0 || signal_period == 0 {
        return MacdLines {
            line: IndicatorSeries {
                key: line_key,
                values: vec![None; bars.len()],
            },
            signal: IndicatorSeries {
                key: signal_key,
                values: vec![None; bars.len()],
            },
        };
    }

    let closes: Vec<Option<f64>> = bars.iter().map(|b| Some(b.close)).collect();
    let ema_fast = ema_of(&closes, fast);
    let ema_slow = ema_of(&closes, slow);

    let line: Vec<Option<f64>> = ema_fast
        .iter()
        .zip(&ema_slow)
        .map(|(f, s)| match (f, s) {
            (Some(f), Some(s)) => Some(f - s),
            _ => None,
        })
        .collect();
    let signal = ema_of(&line, signal_period);

    MacdLines {
        line: IndicatorSeries {
            key: line_key,
            values: line,
        },
        signal: IndicatorSeries {
            key: signal_key,
            values: signal,
        },
    }
}
