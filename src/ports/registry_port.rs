//! Ticker registry port trait.

use crate::domain::error::StratscanError;
use crate::domain::scan::Ticker;

pub trait TickerRegistryPort {
    /// Instruments to scan, in registry order.
    fn tickers(&self) -> Result<Vec<Ticker>, StratscanError>;
}
