//! Exponential Moving Average indicator.
//!
//! k = 2/(n+1), seed with first SMA, then EMA[i] = C[i]*k + EMA[i-1]*(1-k).
//! Warmup: first (n-1) bars are `None`.

use crate::domain::bar::Bar;
use crate::domain::indicator::{IndicatorKey, IndicatorSeries};

pub fn calculate_ema(bars: &[Bar], period: usize) -> IndicatorSeries {
    let closes: Vec<Option<f64>> = bars.iter().map(|b| Some(b.close)).collect();
    IndicatorSeries {
        key: IndicatorKey::Ema(period),
        values: ema_of(&closes, period),
    }
}

/// EMA over an optional input: starts at the first defined value, seeds with
/// the SMA of the first `period` defined inputs.
pub(crate) fn ema_of(inputs: &[Option<f64>], period: usize) -> Vec<Option<f64>> {
    let mut values = vec![None; inputs.len()];
    if period == 0 {
        return values;
    }
    let Some(start) = inputs.iter().position(Option::is_some) else {
        return values;
    };

    let k = 2.0 / (period as f64 + 1.0);
    let mut ema = 0.0;
    let mut sum = 0.0;

    for (offset, input) in inputs[start..].iter().enumerate() {
        let i = start + offset;
        let Some(x) = *input else {
            break;
        };
        if offset < period - 1 {
            sum += x;
        } else if offset == period - 1 {
            sum += x;
            ema = sum / period as f64;
            values[i] = Some(ema);
        } else {
            ema = x * k + ema * (1.0 - k);
            values[i] = Some(ema);
        }
    }

    values
}
