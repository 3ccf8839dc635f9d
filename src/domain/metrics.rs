//! Performance statistics derived from a finished run.

use serde::Serialize;

use super::portfolio::EquityPoint;
use super::position::Trade;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PerformanceStats {
    /// Percentage of closed trades with positive P&L; 0 with no closed trades.
    pub win_rate: f64,
    pub total_return_pct: f64,
    /// Gross profit / gross loss. `f64::INFINITY` when there are wins and no
    /// losses, 0 when there are neither.
    pub profit_factor: f64,
    pub max_drawdown_pct: f64,
    /// Annualised mean/stddev of per-bar equity returns; 0 when stddev is 0.
    pub sharpe_ratio: f64,
    /// Closed trades only; an open trade at series end is not counted.
    pub trade_count: usize,
    pub trades_won: usize,
    pub trades_lost: usize,
    pub final_equity: f64,
}

impl PerformanceStats {
    pub fn compute(
        trades: &[Trade],
        equity_curve: &[EquityPoint],
        initial_cash: f64,
        bars_per_year: f64,
    ) -> Self {
        let final_equity = equity_curve
            .last()
            .map(|p| p.equity)
            .unwrap_or(initial_cash);

        let total_return_pct = if initial_cash > 0.0 {
            (final_equity / initial_cash - 1.0) * 100.0
        } else {
            0.0
        };

        let mut trade_count = 0usize;
        let mut trades_won = 0usize;
        let mut trades_lost = 0usize;
        let mut gross_profit = 0.0_f64;
        let mut gross_loss = 0.0_f64;

        for pnl in trades.iter().filter_map(|t| t.pnl) {
            trade_count += 1;
            if pnl > 0.0 {
                trades_won += 1;
                gross_profit += pnl;
            } else if pnl < 0.0 {
                trades_lost += 1;
                gross_loss += pnl.abs();
            }
        }

        let win_rate = if trade_count > 0 {
            trades_won as f64 / trade_count as f64 * 100.0
        } else {
            0.0
        };

        let profit_factor = if gross_loss > 0.0 {
            gross_profit / gross_loss
        } else if gross_profit > 0.0 {
            f64::INFINITY
        } else {
            0.0
        };

        PerformanceStats {
            win_rate,
            total_return_pct,
            profit_factor,
            max_drawdown_pct: compute_max_drawdown(equity_curve) * 100.0,
            sharpe_ratio: compute_sharpe(equity_curve, bars_per_year),
            trade_count,
            trades_won,
            trades_lost,
            final_equity,
        }
    }
}

/// Largest peak-to-trough decline as a fraction of the running peak.
fn compute_max_drawdown(equity_curve: &[EquityPoint]) -> f64 {
    let Some(first) = equity_curve.first() else {
        return 0.0;
    };

    let mut peak = first.equity;
    let mut max_dd = 0.0_f64;

    for point in equity_curve {
        if point.equity > peak {
            peak = point.equity;
        } else if peak > 0.0 {
            let dd = (peak - point.equity) / peak;
            if dd > max_dd {
                max_dd = dd;
            }
        }
    }

    max_dd
}

fn compute_sharpe(equity_curve: &[EquityPoint], bars_per_year: f64) -> f64 {
    if equity_curve.len() < 2 {
        return 0.0;
    }

    let returns: Vec<f64> = equity_curve
        .windows(2)
        .map(|w| {
            let prev = w[0].equity;
            let curr = w[1].equity;
            if prev > 0.0 {
                (curr - prev) / prev
            } else {
                0.0
            }
        })
        .collect();

    let n = returns.len() as f64;
    let mean: f64 = returns.iter().sum::<f64>() / n;
    let variance: f64 = returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / n;
    let stddev = variance.sqrt();

    if stddev > 0.0 {
        mean / stddev * bars_per_year.sqrt()
    } else {
        0.0
    }
}
