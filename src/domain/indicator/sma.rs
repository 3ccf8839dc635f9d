//! Simple Moving Average indicator.
//!
//! SMA[i] = mean(C[i-n+1..=i]).
//! Warmup: first (n-1) bars are `None`.

use crate::domain::bar::Bar;
use crate::domain::indicator::{IndicatorKey, IndicatorSeries};

pub fn calculate_sma(bars: &[Bar], period: usize) -> IndicatorSeries {
    let mut values = Vec::with_capacity(bars.len());
    if period == 0 {
        values.resize(bars.len(), None);
        return IndicatorSeries {
            key: IndicatorKey::Sma(period),
            values,
        };
    }

    let mut sum = 0.0;
    for (i, bar) in bars.iter().enumerate() {
        sum += bar.close;
        if i >= period {
            sum -= bars[i - period].close;
        }
        if i + 1 >= period {
            values.push(Some(sum / period as f64));
        } else {
            values.push(None);
        }
    }

    IndicatorSeries {
        key: IndicatorKey::Sma(period),
        values,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::indicator::bars_from_closes;

    #[test]
    fn sma_warmup() {
        let bars = bars_from_closes(&[10.0, 20.0, 30.0, 40.0, 50.0]);
        let series = calculate_sma(&bars, 3);

        assert_eq!(series.values.len(), 5);
        assert!(series.values[0].is_none());
        assert!(series.values[1].is_none());
        assert!(series.values[2].is_some());
    }

    #[test]
    fn sma_values() {
        let bars = bars_from_closes(&[10.0, 20.0, 30.0, 40.0, 50.0]);
        let series = calculate_sma(&bars, 3);

        assert!((series.values[2].unwrap() - 20.0).abs() < 1e-9);
        assert!((series.values[3].unwrap() - 30.0).abs() < 1e-9);
        assert!((series.values[4].unwrap() - 40.0).abs() < 1e-9);
    }

    #[test]
    fn sma_period_longer_than_series() {
        let bars = bars_from_closes(&[10.0, 20.0]);
        let series = calculate_sma(&bars, 5);
        assert!(series.values.iter().all(Option::is_none));
    }

    #[test]
    fn sma_period_0() {
        let bars = bars_from_closes(&[10.0, 20.0]);
        let series = calculate_sma(&bars, 0);
        assert_eq!(series.values, vec![None, None]);
        assert_eq!(series.key, IndicatorKey::Sma(0));
    }
}
