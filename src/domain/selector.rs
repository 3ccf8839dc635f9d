//! Picks the best candidate strategy for a series by simulated performance.
//!
//! Ranking: highest win rate, then highest total return, then earliest in the
//! candidate list. Only candidates that closed at least one trade can win.
//! When none did, the first candidate that ran is returned as a fallback.

use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, warn};

use super::backtest::{self, BacktestConfig};
use super::error::StratscanError;
use super::metrics::PerformanceStats;
use super::series::Series;
use super::strategy::Strategy;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionOutcome {
    /// At least one candidate closed a trade; the best of those was chosen.
    Winner,
    /// No candidate closed a trade; the first runnable candidate was chosen.
    Fallback,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CandidateResult {
    pub strategy: Strategy,
    pub stats: PerformanceStats,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedCandidate {
    pub strategy: Strategy,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Selection {
    pub strategy: Strategy,
    pub stats: PerformanceStats,
    pub outcome: SelectionOutcome,
    /// Every candidate that ran, in candidate order.
    pub evaluated: Vec<CandidateResult>,
    pub skipped: Vec<SkippedCandidate>,
}

impl Selection {
    pub fn is_winner(&self) -> bool {
        self.outcome == SelectionOutcome::Winner
    }
}

pub fn select(
    series: &Series,
    candidates: &[Strategy],
    config: &BacktestConfig,
) -> Result<Selection, StratscanError> {
    // Candidates are independent; collect() keeps candidate order.
    let runs: Vec<(&Strategy, Result<PerformanceStats, StratscanError>)> = candidates
        .par_iter()
        .map(|strategy| {
            let stats = backtest::run(series, strategy, config).map(|r| r.stats);
            (strategy, stats)
        })
        .collect();

    let mut evaluated = Vec::with_capacity(runs.len());
    let mut skipped = Vec::new();
    for (strategy, outcome) in runs {
        match outcome {
            Ok(stats) => {
                debug!(
                    instrument = %series.instrument(),
                    strategy = %strategy,
                    win_rate = stats.win_rate,
                    total_return_pct = stats.total_return_pct,
                    trades = stats.trade_count,
                    "candidate evaluated"
                );
                evaluated.push(CandidateResult {
                    strategy: strategy.clone(),
                    stats,
                });
            }
            Err(e) => {
                warn!(
                    instrument = %series.instrument(),
                    strategy = %strategy,
                    error = %e,
                    "skipping candidate"
                );
                skipped.push(SkippedCandidate {
                    strategy: strategy.clone(),
                    reason: e.to_string(),
                });
            }
        }
    }

    let (chosen, outcome) = match best_index(&evaluated) {
        Some(i) => (i, SelectionOutcome::Winner),
        None if !evaluated.is_empty() => (0, SelectionOutcome::Fallback),
        None => {
            return Err(StratscanError::NoViableStrategy {
                instrument: series.instrument().to_string(),
                skipped: skipped.len(),
            });
        }
    };

    let CandidateResult { strategy, stats } = evaluated[chosen].clone();
    Ok(Selection {
        strategy,
        stats,
        outcome,
        evaluated,
        skipped,
    })
}

/// Index of the best candidate among those with a closed trade.
fn best_index(evaluated: &[CandidateResult]) -> Option<usize> {
    let mut best: Option<(usize, &PerformanceStats)> = None;
    for (i, candidate) in evaluated.iter().enumerate() {
        let stats = &candidate.stats;
        if stats.trade_count == 0 {
            continue;
        }
        let better = match best {
            None => true,
            Some((_, b)) => ranks_above(stats, b),
        };
        if better {
            best = Some((i, stats));
        }
    }
    best.map(|(i, _)| i)
}

/// Strictly better; equal stats keep the earlier candidate.
fn ranks_above(a: &PerformanceStats, b: &PerformanceStats) -> bool {
    if a.win_rate != b.win_rate {
        return a.win_rate > b.win_rate;
    }
    a.total_return_pct > b.total_return_pct
}
