//! Bollinger Bands indicator.
//!
//! Bollinger Bands consist of:
//! - Middle: Simple Moving Average (SMA) over n periods
//! - Upper: Middle + (multiplier × StdDev)
//! - Lower: Middle - (multiplier × StdDev)
//!
//! Where StdDev is population standard deviation (divides by N, not N-1).
//!
//! Default parameters: period=20, multiplier=2.0
//! Warmup: first (period-1) bars are `None`.

use crate::domain::bar::Bar;
use crate::domain::indicator::{IndicatorKey, IndicatorSeries};

#[derive(Debug, Clone, PartialEq)]
pub struct BollingerBands {
    pub lower: IndicatorSeries,
    pub middle: IndicatorSeries,
    pub upper: IndicatorSeries,
}

pub fn calculate_bollinger(bars: &[Bar], period: usize, stddev_mult_x100: u32) -> BollingerBands {
    let mult = stddev_mult_x100 as f64 / 100.0;
    let mut lower = vec![None; bars.len()];
    let mut middle = vec![None; bars.len()];
    let mut upper = vec![None; bars.len()];

    if period > 0 {
        for i in (period - 1)..bars.len() {
            let window = &bars[i + 1 - period..=i];
            let mean: f64 = window.iter().map(|b| b.close).sum::<f64>() / period as f64;
            let variance: f64 = window
                .iter()
                .map(|b| {
                    let diff = b.close - mean;
                    diff * diff
                })
                .sum::<f64>()
                / period as f64;
            let stddev = variance.sqrt();

            lower[i] = Some(mean - mult * stddev);
            middle[i] = Some(mean);
            upper[i] = Some(mean + mult * stddev);
        }
    }

    BollingerBands {
        lower: IndicatorSeries {
            key: IndicatorKey::BollingerLower {
                period,
                stddev_mult_x100,
            },
            values: lower,
        },
        middle: IndicatorSeries {
            key: IndicatorKey::BollingerMiddle {
                period,
                stddev_mult_x100,
            },
            values: middle,
        },
        upper: IndicatorSeries {
            key: IndicatorKey::BollingerUpper {
                period,
                stddev_mult_x100,
            },
            values: upper,
        },
    }
}
