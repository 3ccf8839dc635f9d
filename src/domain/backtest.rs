//! Single-instrument, single-strategy simulation.
//!
//! Bars are replayed strictly in order. For every bar after the first the
//! engine makes at most one decision: exit if long and the exit rule fires,
//! otherwise enter if flat and the entry rule fires. Fills happen at the bar
//! close. Equity is marked to market on every bar, the first included.

use serde::Serialize;
use tracing::debug;

use super::error::StratscanError;
use super::execution::{self, EntryResult};
use super::metrics::PerformanceStats;
use super::portfolio::{EquityPoint, Portfolio};
use super::position::Trade;
use super::series::Series;
use super::strategy::Strategy;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BacktestConfig {
    pub initial_cash: f64,
    /// Fraction of traded value charged on every fill.
    pub commission_rate: f64,
}

impl Default for BacktestConfig {
    fn default() -> Self {
        BacktestConfig {
            initial_cash: 1_000_000.0,
            commission_rate: 0.002,
        }
    }
}

/// Trade log, equity curve and derived statistics of one run.
///
/// The trade log is ordered by entry; a position still open at the last bar
/// is the final entry, with no exit and no P&L.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BacktestResult {
    pub trades: Vec<Trade>,
    pub equity_curve: Vec<EquityPoint>,
    pub stats: PerformanceStats,
}

impl BacktestResult {
    pub fn open_trade(&self) -> Option<&Trade> {
        self.trades.last().filter(|t| !t.is_closed())
    }
}

pub fn run(
    series: &Series,
    strategy: &Strategy,
    config: &BacktestConfig,
) -> Result<BacktestResult, StratscanError> {
    let minimum = strategy.warmup();
    if series.len() < minimum {
        return Err(StratscanError::InsufficientData {
            strategy: strategy.name(),
            bars: series.len(),
            minimum,
        });
    }

    let bars = series.bars();
    let mut portfolio = Portfolio::new(config.initial_cash);

    for (i, bar) in bars.iter().enumerate() {
        if i > 0 {
            let prev = &bars[i - 1];
            if portfolio.position.is_long() {
                if strategy.should_exit(prev, bar) {
                    if let Some(trade) = execution::exit_long(
                        &mut portfolio,
                        bar.close,
                        bar.timestamp,
                        config.commission_rate,
                    ) {
                        debug!(
                            instrument = %series.instrument(),
                            strategy = %strategy,
                            timestamp = %bar.timestamp,
                            pnl = trade.pnl.unwrap_or_default(),
                            "exit"
                        );
                    }
                }
            } else if strategy.should_enter(prev, bar) {
                let result = execution::enter_long(
                    &mut portfolio,
                    bar.close,
                    bar.timestamp,
                    config.commission_rate,
                );
                if let EntryResult::Entered { quantity, .. } = result {
                    debug!(
                        instrument = %series.instrument(),
                        strategy = %strategy,
                        timestamp = %bar.timestamp,
                        price = bar.close,
                        quantity,
                        "entry"
                    );
                }
            }
        }

        let equity = portfolio.total_equity(bar.close);
        portfolio.record_equity(bar.timestamp, equity);
    }

    if let Some(open) = execution::open_trade(&portfolio.position) {
        portfolio.record_trade(open);
    }

    let stats = PerformanceStats::compute(
        &portfolio.trades,
        &portfolio.equity_curve,
        config.initial_cash,
        series.interval().bars_per_year(),
    );

    Ok(BacktestResult {
        trades: portfolio.trades,
        equity_curve: portfolio.equity_curve,
        stats,
    })
}
