//! Trade execution and fill simulation.
//!
//! All-in / all-out execution at the bar close: an entry spends every unit of
//! available cash (commission included), an exit sells the whole position.

use chrono::NaiveDateTime;

use super::portfolio::Portfolio;
use super::position::{Position, Trade};

/// Commission on a traded value: value × rate.
pub fn calculate_commission(trade_value: f64, commission_rate: f64) -> f64 {
    trade_value * commission_rate
}

/// Result of an entry attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum EntryResult {
    Entered { quantity: f64, commission: f64 },
    AlreadyLong,
    InsufficientCapital,
}

/// Enter a long position with all available cash.
///
/// Quantity is fractional and sized so that cost + commission equals the
/// available cash: `quantity = cash / (price × (1 + rate))`.
pub fn enter_long(
    portfolio: &mut Portfolio,
    price: f64,
    timestamp: NaiveDateTime,
    commission_rate: f64,
) -> EntryResult {
    if portfolio.position.is_long() {
        return EntryResult::AlreadyLong;
    }
    if portfolio.cash <= 0.0 || price <= 0.0 {
        return EntryResult::InsufficientCapital;
    }

    let quantity = portfolio.cash / (price * (1.0 + commission_rate));
    let cost = quantity * price;
    let commission = calculate_commission(cost, commission_rate);

    portfolio.cash = (portfolio.cash - cost - commission).max(0.0);
    portfolio.position = Position::Long {
        entry_price: price,
        entry_timestamp: timestamp,
        quantity,
        entry_commission: commission,
    };

    EntryResult::Entered {
        quantity,
        commission,
    }
}

/// Close the open position at `price`, crediting proceeds net of commission.
///
/// Returns the completed trade, or `None` when flat. Realized P&L is
/// `(exit - entry) × quantity - entry commission - exit commission`.
pub fn exit_long(
    portfolio: &mut Portfolio,
    price: f64,
    timestamp: NaiveDateTime,
    commission_rate: f64,
) -> Option<Trade> {
    let Position::Long {
        entry_price,
        entry_timestamp,
        quantity,
        entry_commission,
    } = std::mem::take(&mut portfolio.position)
    else {
        return None;
    };

    let proceeds = quantity * price;
    let exit_commission = calculate_commission(proceeds, commission_rate);
    portfolio.cash += proceeds - exit_commission;

    let pnl = (price - entry_price) * quantity - entry_commission - exit_commission;
    let trade = Trade {
        entry_timestamp,
        entry_price,
        quantity,
        exit_timestamp: Some(timestamp),
        exit_price: Some(price),
        pnl: Some(pnl),
        commission: entry_commission + exit_commission,
    };
    portfolio.record_trade(trade.clone());
    Some(trade)
}

/// The still-open position as an unrealized trade log entry.
pub fn open_trade(position: &Position) -> Option<Trade> {
    match *position {
        Position::Flat => None,
        Position::Long {
            entry_price,
            entry_timestamp,
            quantity,
            entry_commission,
        } => Some(Trade {
            entry_timestamp,
            entry_price,
            quantity,
            exit_timestamp: None,
            exit_price: None,
            pnl: None,
            commission: entry_commission,
        }),
    }
}
