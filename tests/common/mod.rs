#![allow(dead_code)]

use chrono::{Duration, NaiveDate, NaiveDateTime};
use std::collections::HashMap;
use std::sync::Mutex;
use stratscan::domain::backtest::BacktestConfig;
use stratscan::domain::bar::{Bar, BarInterval};
use stratscan::domain::error::StratscanError;
use stratscan::domain::indicator::attach_indicators;
use stratscan::domain::series::Series;
use stratscan::domain::strategy::Strategy;
use stratscan::ports::data_port::MarketDataPort;

pub struct MockDataPort {
    pub data: HashMap<String, Vec<Bar>>,
    pub errors: HashMap<String, String>,
    pub requests: Mutex<Vec<String>>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn with_bars(mut self, instrument: &str, bars: Vec<Bar>) -> Self {
        self.data.insert(instrument.to_string(), bars);
        self
    }

    pub fn with_error(mut self, instrument: &str, reason: &str) -> Self {
        self.errors.insert(instrument.to_string(), reason.to_string());
        self
    }

    pub fn requested(&self) -> Vec<String> {
        let mut seen = self.requests.lock().unwrap().clone();
        seen.sort();
        seen
    }
}

impl MarketDataPort for MockDataPort {
    fn fetch_bars(
        &self,
        instrument: &str,
        lookback: usize,
        _interval: BarInterval,
    ) -> Result<Vec<Bar>, StratscanError> {
        self.requests.lock().unwrap().push(instrument.to_string());
        if let Some(reason) = self.errors.get(instrument) {
            return Err(StratscanError::DataSource {
                reason: reason.clone(),
            });
        }
        match self.data.get(instrument) {
            Some(bars) if !bars.is_empty() => {
                let skip = bars.len().saturating_sub(lookback);
                Ok(bars[skip..].to_vec())
            }
            _ => Err(StratscanError::NoData {
                instrument: instrument.to_string(),
            }),
        }
    }
}

pub fn day(offset: usize) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 1, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
        + Duration::days(offset as i64)
}

pub fn make_bar(offset: usize, close: f64) -> Bar {
    Bar::new(day(offset), close, close + 1.0, close - 1.0, close, 1000.0)
}

/// Daily bars, one per close, starting 2024-01-01.
pub fn bars_from_closes(closes: &[f64]) -> Vec<Bar> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &c)| make_bar(i, c))
        .collect()
}

/// A smooth oscillation that produces several crossovers of every kind.
pub fn wave_closes(n: usize) -> Vec<f64> {
    (0..n)
        .map(|i| 100.0 + 10.0 * (i as f64 / 7.0).sin() + 0.05 * i as f64)
        .collect()
}

/// 26 slowly falling closes then a jump: the 5-bar SMA crosses the 25-bar
/// SMA on the last bar.
pub fn golden_cross_closes() -> Vec<f64> {
    let mut closes: Vec<f64> = (0..26).map(|i| 100.0 - 0.5 * i as f64).collect();
    closes.push(200.0);
    closes
}

pub fn series_for(strategies: &[Strategy], closes: &[f64]) -> Series {
    let mut bars = bars_from_closes(closes);
    let keys: Vec<_> = strategies
        .iter()
        .flat_map(Strategy::required_indicators)
        .collect();
    attach_indicators(&mut bars, &keys);
    Series::new("TEST", BarInterval::Daily, bars).unwrap()
}

pub fn sma_cross() -> Strategy {
    Strategy::MovingAverageCrossover { fast: 5, slow: 25 }
}

pub fn sample_config() -> BacktestConfig {
    BacktestConfig {
        initial_cash: 100_000.0,
        commission_rate: 0.002,
    }
}
