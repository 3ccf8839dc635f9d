//! Multi-instrument scan.
//!
//! Each instrument is fetched, given the union of the candidates' indicators,
//! run through strategy selection and evaluated on its latest two bars.
//! Instruments are independent and run on a rayon pool. A failed instrument
//! becomes a `ScanFailure` entry and never aborts the scan.

use chrono::NaiveDateTime;
use rayon::prelude::*;
use serde::Serialize;
use std::time::{Duration, Instant};
use tracing::{info, warn};

use super::backtest::BacktestConfig;
use super::bar::BarInterval;
use super::error::StratscanError;
use super::indicator::{attach_indicators, IndicatorKey};
use super::metrics::PerformanceStats;
use super::position::PositionState;
use super::selector::{self, Selection, SelectionOutcome};
use super::series::Series;
use super::signal::{self, Action, Signal};
use super::strategy::Strategy;
use crate::ports::data_port::MarketDataPort;

/// Registry entry. Held instruments are evaluated as long positions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Ticker {
    pub id: String,
    pub name: String,
    pub held: bool,
}

impl Ticker {
    pub fn new(id: impl Into<String>, name: impl Into<String>, held: bool) -> Self {
        Ticker {
            id: id.into(),
            name: name.into(),
            held,
        }
    }

    pub fn position_state(&self) -> PositionState {
        if self.held {
            PositionState::Long
        } else {
            PositionState::Flat
        }
    }
}

#[derive(Debug, Clone)]
pub struct ScanConfig {
    pub backtest: BacktestConfig,
    pub interval: BarInterval,
    pub lookback: usize,
    /// Appended to purely numeric ticker ids before fetching.
    pub numeric_suffix: Option<String>,
    /// 0 uses rayon's default thread count.
    pub workers: usize,
    /// Instruments not started before this elapses are reported as failures.
    pub timeout: Option<Duration>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        ScanConfig {
            backtest: BacktestConfig::default(),
            interval: BarInterval::Daily,
            lookback: 500,
            numeric_suffix: Some(".T".to_string()),
            workers: 0,
            timeout: None,
        }
    }
}

/// One presentable row: instrument, chosen strategy with its stats, and the
/// recommendation for the latest bar.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InstrumentReport {
    pub instrument: String,
    pub name: String,
    pub held: bool,
    pub as_of: NaiveDateTime,
    pub last_close: f64,
    pub change_pct: f64,
    pub strategy: String,
    pub outcome: SelectionOutcome,
    pub stats: PerformanceStats,
    pub action: Action,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScanFailure {
    pub instrument: String,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ScanReport {
    pub results: Vec<InstrumentReport>,
    pub failures: Vec<ScanFailure>,
    /// Watch-list instruments evaluated to `Hold` and left out of `results`.
    pub suppressed: usize,
}

impl ScanReport {
    pub fn holdings(&self) -> impl Iterator<Item = &InstrumentReport> {
        self.results.iter().filter(|r| r.held)
    }

    pub fn opportunities(&self) -> impl Iterator<Item = &InstrumentReport> {
        self.results.iter().filter(|r| !r.held)
    }
}

/// Full result of analysing a single instrument.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Analysis {
    pub report: InstrumentReport,
    pub selection: Selection,
}

/// Numeric exchange codes get `suffix` appended; anything else is unchanged.
pub fn normalize_instrument(id: &str, suffix: Option<&str>) -> String {
    let id = id.trim();
    match suffix {
        Some(sfx) if !id.is_empty() && id.chars().all(|c| c.is_ascii_digit()) => {
            format!("{id}{sfx}")
        }
        _ => id.to_string(),
    }
}

/// Distinct indicators needed by any candidate, in first-seen order.
pub fn required_indicators(candidates: &[Strategy]) -> Vec<IndicatorKey> {
    let mut keys: Vec<IndicatorKey> = Vec::new();
    for key in candidates.iter().flat_map(Strategy::required_indicators) {
        if !keys.contains(&key) {
            keys.push(key);
        }
    }
    keys
}

pub fn analyze(
    data_port: &(dyn MarketDataPort + Sync),
    ticker: &Ticker,
    candidates: &[Strategy],
    config: &ScanConfig,
) -> Result<Analysis, StratscanError> {
    let instrument = normalize_instrument(&ticker.id, config.numeric_suffix.as_deref());
    let mut bars = data_port.fetch_bars(&instrument, config.lookback, config.interval)?;
    if bars.is_empty() {
        return Err(StratscanError::NoData { instrument });
    }
    attach_indicators(&mut bars, &required_indicators(candidates));
    let series = Series::new(instrument.clone(), config.interval, bars)?;

    let selection = selector::select(&series, candidates, &config.backtest)?;
    let (prev, curr) = series
        .last_two()
        .ok_or_else(|| StratscanError::InsufficientData {
            strategy: selection.strategy.name(),
            bars: series.len(),
            minimum: 2,
        })?;
    let Signal { action, reason } =
        signal::evaluate(&selection.strategy, prev, curr, ticker.position_state());

    let report = InstrumentReport {
        instrument,
        name: ticker.name.clone(),
        held: ticker.held,
        as_of: curr.timestamp,
        last_close: curr.close,
        change_pct: (curr.close - prev.close) / prev.close * 100.0,
        strategy: selection.strategy.name(),
        outcome: selection.outcome,
        stats: selection.stats.clone(),
        action,
        reason,
    };
    Ok(Analysis { report, selection })
}

pub fn scan(
    data_port: &(dyn MarketDataPort + Sync),
    tickers: &[Ticker],
    candidates: &[Strategy],
    config: &ScanConfig,
) -> ScanReport {
    info!(
        instruments = tickers.len(),
        candidates = candidates.len(),
        workers = config.workers,
        "starting scan"
    );
    let deadline = config.timeout.map(|t| Instant::now() + t);

    let run = || {
        tickers
            .par_iter()
            .map(|ticker| {
                if deadline.is_some_and(|d| Instant::now() >= d) {
                    return (ticker, Err(StratscanError::DeadlineExceeded));
                }
                let outcome = analyze(data_port, ticker, candidates, config).map(|a| a.report);
                (ticker, outcome)
            })
            .collect::<Vec<_>>()
    };

    let outcomes = if config.workers > 0 {
        match rayon::ThreadPoolBuilder::new()
            .num_threads(config.workers)
            .build()
        {
            Ok(pool) => pool.install(run),
            Err(e) => {
                warn!(error = %e, "could not build worker pool, using global pool");
                run()
            }
        }
    } else {
        run()
    };

    let mut report = ScanReport::default();
    for (ticker, outcome) in outcomes {
        match outcome {
            Ok(row) if row.held || row.action != Action::Hold => report.results.push(row),
            Ok(_) => report.suppressed += 1,
            Err(e) => {
                let instrument =
                    normalize_instrument(&ticker.id, config.numeric_suffix.as_deref());
                warn!(instrument = %instrument, error = %e, "instrument failed");
                report.failures.push(ScanFailure {
                    instrument,
                    reason: e.to_string(),
                });
            }
        }
    }

    info!(
        reported = report.results.len(),
        suppressed = report.suppressed,
        failed = report.failures.len(),
        "scan finished"
    );
    report
}
