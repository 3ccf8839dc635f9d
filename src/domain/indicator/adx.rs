//! ADX (Average Directional Index) indicator.
//!
//! Wilder's method:
//! - TR, +DM, -DM per bar from the previous bar
//! - Smoothed sums seeded with the first n values, then S = S - S/n + x
//! - +DI = 100 × S(+DM)/S(TR), -DI likewise, DX = 100 × |+DI - -DI| / (+DI + -DI)
//! - ADX seeded with the mean of the first n DX values, then (prev × (n-1) + DX) / n
//!
//! Warmup: first (2n - 1) bars are `None`.

use crate::domain::bar::Bar;
use crate::domain::indicator::{IndicatorKey, IndicatorSeries};

pub fn calculate_adx(bars: &[Bar], period: usize) -> IndicatorSeries {
    let mut values = vec![None; bars.len()];
    if period == 0 || bars.len() < 2 * period {
        return IndicatorSeries {
            key: IndicatorKey::Adx(period),
            values,
        };
    }

    let n = period as f64;
    let mut tr_sum = 0.0;
    let mut plus_sum = 0.0;
    let mut minus_sum = 0.0;
    let mut dx_seed = 0.0;
    let mut adx = 0.0;

    for i in 1..bars.len() {
        let (curr, prev) = (&bars[i], &bars[i - 1]);
        let tr = curr.true_range(prev.close);
        let up_move = curr.high - prev.high;
        let down_move = prev.low - curr.low;
        let plus_dm = if up_move > down_move && up_move > 0.0 {
            up_move
        } else {
            0.0
        };
        let minus_dm = if down_move > up_move && down_move > 0.0 {
            down_move
        } else {
            0.0
        };

        if i <= period {
            tr_sum += tr;
            plus_sum += plus_dm;
            minus_sum += minus_dm;
            if i < period {
                continue;
            }
        } else {
            tr_sum = tr_sum - tr_sum / n + tr;
            plus_sum = plus_sum - plus_sum / n + plus_dm;
            minus_sum = minus_sum - minus_sum / n + minus_dm;
        }

        let dx = directional_index(tr_sum, plus_sum, minus_sum);

        if i < 2 * period - 1 {
            dx_seed += dx;
        } else if i == 2 * period - 1 {
            dx_seed += dx;
            adx = dx_seed / n;
            values[i] = Some(adx);
        } else {
            adx = (adx * (n - 1.0) + dx) / n;
            values[i] = Some(adx);
        }
    }

    IndicatorSeries {
        key: IndicatorKey::Adx(period),
        values,
    }
}

fn directional_index(tr_sum: f64, plus_sum: f64, minus_sum: f64) -> f64 {
    if tr_sum <= 0.0 {
        return 0.0;
    }
    let plus_di = 100.0 * plus_sum / tr_sum;
    let minus_di = 100.0 * minus_sum / tr_sum;
    let di_sum = plus_di + minus_di;
    if di_sum > 0.0 {
        100.0 * (plus_di - minus_di).abs() / di_sum
    } else {
        0.0
    }
}
