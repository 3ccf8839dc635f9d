//! CSV ticker registry: `ticker,name,held`.
//!
//! `held` accepts true/yes/1 and false/no/0; blank means watch-list.

use crate::domain::error::StratscanError;
use crate::domain::scan::Ticker;
use crate::ports::registry_port::TickerRegistryPort;
use serde::Deserialize;
use std::collections::HashSet;
use std::path::PathBuf;

#[derive(Debug, Deserialize)]
struct RegistryRow {
    ticker: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    held: String,
}

pub struct CsvRegistryAdapter {
    path: PathBuf,
}

impl CsvRegistryAdapter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl TickerRegistryPort for CsvRegistryAdapter {
    fn tickers(&self) -> Result<Vec<Ticker>, StratscanError> {
        let mut rdr = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_path(&self.path)
            .map_err(|e| StratscanError::DataSource {
                reason: format!("failed to read registry {}: {}", self.path.display(), e),
            })?;

        let mut seen = HashSet::new();
        let mut tickers = Vec::new();
        for (line, result) in rdr.deserialize::<RegistryRow>().enumerate() {
            let row = result.map_err(|e| StratscanError::DataSource {
                reason: format!("registry row {}: {}", line + 1, e),
            })?;
            if row.ticker.is_empty() {
                continue;
            }
            let id = row.ticker.to_uppercase();
            if !seen.insert(id.clone()) {
                return Err(StratscanError::DataSource {
                    reason: format!("duplicate ticker in registry: {}", id),
                });
            }
            let held = parse_held(&row.held).ok_or_else(|| StratscanError::DataSource {
                reason: format!("registry row {}: invalid held value '{}'", line + 1, row.held),
            })?;
            let name = if row.name.is_empty() {
                id.clone()
            } else {
                row.name
            };
            tickers.push(Ticker::new(id, name, held));
        }

        Ok(tickers)
    }
}

fn parse_held(value: &str) -> Option<bool> {
    match value.to_lowercase().as_str() {
        "true" | "yes" | "1" => Some(true),
        "false" | "no" | "0" | "" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn registry(content: &str) -> (TempDir, CsvRegistryAdapter) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tickers.csv");
        fs::write(&path, content).unwrap();
        (dir, CsvRegistryAdapter::new(path))
    }

    #[test]
    fn reads_held_and_watch_list() {
        let (_dir, adapter) = registry(
            "ticker,name,held\n\
             7203,Toyota,true\n\
             aapl, Apple ,\n\
             6758,,no\n",
        );
        let tickers = adapter.tickers().unwrap();
        assert_eq!(
            tickers,
            vec![
                Ticker::new("7203", "Toyota", true),
                Ticker::new("AAPL", "Apple", false),
                Ticker::new("6758", "6758", false),
            ]
        );
    }

    #[test]
    fn duplicate_ticker_is_rejected() {
        let (_dir, adapter) = registry("ticker,name,held\nAAPL,Apple,no\naapl,Apple,yes\n");
        let err = adapter.tickers().unwrap_err();
        assert!(err.to_string().contains("duplicate ticker"));
    }

    #[test]
    fn invalid_held_value_is_rejected() {
        let (_dir, adapter) = registry("ticker,name,held\nAAPL,Apple,maybe\n");
        assert!(matches!(
            adapter.tickers(),
            Err(StratscanError::DataSource { .. })
        ));
    }

    #[test]
    fn missing_file_is_data_source_error() {
        let adapter = CsvRegistryAdapter::new("/nonexistent/tickers.csv");
        assert!(matches!(
            adapter.tickers(),
            Err(StratscanError::DataSource { .. })
        ));
    }
}
