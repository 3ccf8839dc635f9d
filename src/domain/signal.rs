//! Recommendation for the latest bar.
//!
//! One engine step applied to the two most recent bars, using the same
//! `Strategy` predicates the backtest uses.

use serde::Serialize;
use std::fmt;

use super::bar::Bar;
use super::position::PositionState;
use super::strategy::Strategy;

pub const NO_SIGNAL: &str = "no signal";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Buy,
    Sell,
    Hold,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Action::Buy => "BUY",
            Action::Sell => "SELL",
            Action::Hold => "HOLD",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Signal {
    pub action: Action,
    pub reason: String,
}

impl Signal {
    fn hold() -> Self {
        Signal {
            action: Action::Hold,
            reason: NO_SIGNAL.to_string(),
        }
    }
}

pub fn evaluate(strategy: &Strategy, prev: &Bar, curr: &Bar, state: PositionState) -> Signal {
    let fired = match state {
        PositionState::Flat => strategy
            .entry_signal(prev, curr)
            .map(|reason| (Action::Buy, reason)),
        PositionState::Long => strategy
            .exit_signal(prev, curr)
            .map(|reason| (Action::Sell, reason)),
    };

    match fired {
        Some((action, reason)) => Signal { action, reason },
        None => Signal::hold(),
    }
}
