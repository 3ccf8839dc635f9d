//! Position state and the trade log entry.

use chrono::NaiveDateTime;
use serde::Serialize;

/// Holding state of a single simulation run. No pyramiding, no shorting.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Position {
    #[default]
    Flat,
    Long {
        entry_price: f64,
        entry_timestamp: NaiveDateTime,
        quantity: f64,
        entry_commission: f64,
    },
}

/// Position state as seen by the signal evaluator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PositionState {
    Flat,
    Long,
}

impl Position {
    pub fn is_long(&self) -> bool {
        matches!(self, Position::Long { .. })
    }

    pub fn market_value(&self, price: f64) -> f64 {
        match self {
            Position::Flat => 0.0,
            Position::Long { quantity, .. } => quantity * price,
        }
    }
}

/// One round trip. `exit_*` and `pnl` stay `None` while the trade is open.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Trade {
    pub entry_timestamp: NaiveDateTime,
    pub entry_price: f64,
    pub quantity: f64,
    pub exit_timestamp: Option<NaiveDateTime>,
    pub exit_price: Option<f64>,
    pub pnl: Option<f64>,
    pub commission: f64,
}

impl Trade {
    pub fn is_closed(&self) -> bool {
        self.exit_timestamp.is_some()
    }
}
