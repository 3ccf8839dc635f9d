//! CSV file market-data adapter.
//!
//! One file per instrument under `base_path`: `<ID>_<interval>.csv` when
//! present, otherwise `<ID>.csv`. Columns: `date,open,high,low,close,volume`,
//! where `date` is `YYYY-MM-DD` or `YYYY-MM-DD HH:MM[:SS]`.

use crate::domain::bar::{Bar, BarInterval};
use crate::domain::error::StratscanError;
use crate::ports::data_port::MarketDataPort;
use chrono::{NaiveDate, NaiveDateTime};
use csv::StringRecord;
use std::fs;
use std::path::PathBuf;

pub struct CsvAdapter {
    base_path: PathBuf,
}

impl CsvAdapter {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    fn csv_path(&self, instrument: &str, interval: BarInterval) -> Option<PathBuf> {
        [
            self.base_path.join(format!("{}_{}.csv", instrument, interval)),
            self.base_path.join(format!("{}.csv", instrument)),
        ]
        .into_iter()
        .find(|p| p.is_file())
    }
}

impl MarketDataPort for CsvAdapter {
    fn fetch_bars(
        &self,
        instrument: &str,
        lookback: usize,
        interval: BarInterval,
    ) -> Result<Vec<Bar>, StratscanError> {
        let no_data = || StratscanError::NoData {
            instrument: instrument.to_string(),
        };
        let path = self.csv_path(instrument, interval).ok_or_else(no_data)?;
        let content = fs::read_to_string(&path).map_err(|e| StratscanError::DataSource {
            reason: format!("failed to read {}: {}", path.display(), e),
        })?;

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let mut bars = Vec::new();

        for (line, result) in rdr.records().enumerate() {
            let record = result.map_err(|e| StratscanError::DataSource {
                reason: format!("{}: CSV parse error: {}", path.display(), e),
            })?;
            bars.push(parse_record(&record).map_err(|reason| StratscanError::DataSource {
                reason: format!("{} row {}: {}", path.display(), line + 1, reason),
            })?);
        }

        bars.sort_by_key(|b| b.timestamp);
        bars.dedup_by_key(|b| b.timestamp);
        if bars.is_empty() {
            return Err(no_data());
        }

        let start = bars.len().saturating_sub(lookback);
        Ok(bars.split_off(start))
    }
}

fn parse_record(record: &StringRecord) -> Result<Bar, String> {
    let timestamp = parse_timestamp(field(record, 0, "date")?)?;
    Ok(Bar::new(
        timestamp,
        number(record, 1, "open")?,
        number(record, 2, "high")?,
        number(record, 3, "low")?,
        number(record, 4, "close")?,
        number(record, 5, "volume")?,
    ))
}

fn field<'a>(record: &'a StringRecord, index: usize, name: &str) -> Result<&'a str, String> {
    record
        .get(index)
        .map(str::trim)
        .ok_or_else(|| format!("missing {} column", name))
}

fn number(record: &StringRecord, index: usize, name: &str) -> Result<f64, String> {
    field(record, index, name)?
        .parse()
        .map_err(|e| format!("invalid {} value: {}", name, e))
}

fn parse_timestamp(s: &str) -> Result<NaiveDateTime, String> {
    for fmt in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"] {
        if let Ok(ts) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(ts);
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .ok_or_else(|| format!("invalid date format: {}", s))
}
