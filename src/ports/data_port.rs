//! Market-data access port trait.

use crate::domain::bar::{Bar, BarInterval};
use crate::domain::error::StratscanError;

pub trait MarketDataPort {
    /// The most recent `lookback` bars for `instrument`, oldest first, with no
    /// duplicate timestamps. An instrument with no bars is
    /// `StratscanError::NoData`, never an empty vector.
    fn fetch_bars(
        &self,
        instrument: &str,
        lookback: usize,
        interval: BarInterval,
    ) -> Result<Vec<Bar>, StratscanError>;
}
