//! Immutable, validated bar series for one instrument.

use crate::domain::bar::{Bar, BarInterval};
use crate::domain::error::StratscanError;

#[derive(Debug, Clone)]
pub struct Series {
    instrument: String,
    interval: BarInterval,
    bars: Vec<Bar>,
}

impl Series {
    /// Builds a series, rejecting out-of-order or duplicate timestamps,
    /// non-finite or non-positive prices and negative volume.
    pub fn new(
        instrument: impl Into<String>,
        interval: BarInterval,
        bars: Vec<Bar>,
    ) -> Result<Self, StratscanError> {
        for (index, bar) in bars.iter().enumerate() {
            validate_bar(index, bar)?;
            if index > 0 && bar.timestamp <= bars[index - 1].timestamp {
                return Err(StratscanError::MalformedBar {
                    index,
                    reason: format!(
                        "timestamp {} not after previous {}",
                        bar.timestamp,
                        bars[index - 1].timestamp
                    ),
                });
            }
        }

        Ok(Series {
            instrument: instrument.into(),
            interval,
            bars,
        })
    }

    pub fn instrument(&self) -> &str {
        &self.instrument
    }

    pub fn interval(&self) -> BarInterval {
        self.interval
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// The two most recent bars as `(prev, curr)`.
    pub fn last_two(&self) -> Option<(&Bar, &Bar)> {
        match self.bars.len() {
            0 | 1 => None,
            n => Some((&self.bars[n - 2], &self.bars[n - 1])),
        }
    }
}

fn validate_bar(index: usize, bar: &Bar) -> Result<(), StratscanError> {
    let prices = [
        ("open", bar.open),
        ("high", bar.high),
        ("low", bar.low),
        ("close", bar.close),
    ];
    for (field, value) in prices {
        if !value.is_finite() || value <= 0.0 {
            return Err(StratscanError::MalformedBar {
                index,
                reason: format!("{} must be a positive number, got {}", field, value),
            });
        }
    }
    if !bar.volume.is_finite() || bar.volume < 0.0 {
        return Err(StratscanError::MalformedBar {
            index,
            reason: format!("volume must be non-negative, got {}", bar.volume),
        });
    }
    Ok(())
}
