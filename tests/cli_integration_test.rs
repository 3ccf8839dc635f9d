//! CLI integration tests for configuration and the scan command.
//!
//! Tests cover:
//! - Config parsing (build_backtest_config, build_scan_config)
//! - Candidate construction from `[selection]` and per-strategy sections
//! - The validate command against real INI files on disk
//! - Full scan pipeline over CSV files in a temp directory
//! - Exit codes for config and strategy errors

mod common;

use common::*;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;
use stratscan::adapters::csv_adapter::CsvAdapter;
use stratscan::adapters::file_config_adapter::FileConfigAdapter;
use stratscan::adapters::registry_adapter::CsvRegistryAdapter;
use stratscan::adapters::report_adapter::JsonReportAdapter;
use stratscan::cli::{self, Cli, Command, OutputFormat};
use stratscan::domain::bar::BarInterval;
use stratscan::domain::error::StratscanError;
use stratscan::domain::strategy::Strategy;
use tempfile::TempDir;

fn write_temp_ini(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

const VALID_INI: &str = r#"
[backtest]
initial_cash = 500000
commission_rate = 0.001

[data]
path = ./data
interval = 1h
lookback = 300
numeric_suffix = none

[registry]
path = ./tickers.csv

[scan]
workers = 4
timeout_secs = 30

[selection]
candidates = macd_cross, SMA_CROSS, hybrid

[sma_cross]
fast = 10
slow = 30

[hybrid]
adx_threshold = 20
"#;

mod config_loading {
    use super::*;

    #[test]
    fn build_backtest_config_valid_full() {
        let adapter = FileConfigAdapter::from_string(VALID_INI).unwrap();
        let config = cli::build_backtest_config(&adapter).unwrap();
        assert!((config.initial_cash - 500_000.0).abs() < f64::EPSILON);
        assert!((config.commission_rate - 0.001).abs() < f64::EPSILON);
    }

    #[test]
    fn build_backtest_config_uses_defaults() {
        let adapter = FileConfigAdapter::from_string("[data]\npath = x\n").unwrap();
        let config = cli::build_backtest_config(&adapter).unwrap();
        assert!((config.initial_cash - 1_000_000.0).abs() < f64::EPSILON);
        assert!((config.commission_rate - 0.002).abs() < f64::EPSILON);
    }

    #[test]
    fn build_backtest_config_rejects_negative_cash() {
        let adapter = FileConfigAdapter::from_string("[backtest]\ninitial_cash = -5\n").unwrap();
        let err = cli::build_backtest_config(&adapter).unwrap_err();
        assert!(matches!(err, StratscanError::ConfigInvalid { key, .. } if key == "initial_cash"));
    }

    #[test]
    fn build_scan_config_valid_full() {
        let adapter = FileConfigAdapter::from_string(VALID_INI).unwrap();
        let config = cli::build_scan_config(&adapter).unwrap();
        assert_eq!(config.interval, BarInterval::Hours(1));
        assert_eq!(config.lookback, 300);
        assert_eq!(config.numeric_suffix, None);
        assert_eq!(config.workers, 4);
        assert_eq!(config.timeout, Some(Duration::from_secs(30)));
        assert!((config.backtest.initial_cash - 500_000.0).abs() < f64::EPSILON);
    }

    #[test]
    fn build_scan_config_defaults() {
        let adapter = FileConfigAdapter::from_string("[data]\npath = ./data\n").unwrap();
        let config = cli::build_scan_config(&adapter).unwrap();
        assert_eq!(config.interval, BarInterval::Daily);
        assert_eq!(config.lookback, 500);
        assert_eq!(config.numeric_suffix.as_deref(), Some(".T"));
        assert_eq!(config.workers, 0);
        assert_eq!(config.timeout, None);
    }

    #[test]
    fn build_scan_config_requires_data_path() {
        let adapter = FileConfigAdapter::from_string("[data]\ninterval = 1d\n").unwrap();
        let err = cli::build_scan_config(&adapter).unwrap_err();
        assert!(matches!(err, StratscanError::ConfigMissing { key, .. } if key == "path"));
    }

    #[test]
    fn build_scan_config_rejects_unknown_interval() {
        let adapter =
            FileConfigAdapter::from_string("[data]\npath = x\ninterval = 3 days\n").unwrap();
        let err = cli::build_scan_config(&adapter).unwrap_err();
        assert!(matches!(err, StratscanError::ConfigInvalid { key, .. } if key == "interval"));
    }

    #[test]
    fn malformed_numbers_are_rejected_not_defaulted() {
        let adapter =
            FileConfigAdapter::from_string("[backtest]\ncommission_rate = 0,5\n").unwrap();
        let err = cli::build_backtest_config(&adapter).unwrap_err();
        assert!(matches!(err, StratscanError::ConfigInvalid { key, .. } if key == "commission_rate"));

        let adapter =
            FileConfigAdapter::from_string("[data]\npath = x\nlookback = 3OO\n").unwrap();
        let err = cli::build_scan_config(&adapter).unwrap_err();
        assert!(matches!(err, StratscanError::ConfigInvalid { key, .. } if key == "lookback"));

        let adapter =
            FileConfigAdapter::from_string("[data]\npath = x\n[scan]\ntimeout_secs = 1m\n")
                .unwrap();
        let err = cli::build_scan_config(&adapter).unwrap_err();
        assert!(matches!(err, StratscanError::ConfigInvalid { key, .. } if key == "timeout_secs"));
    }

    #[test]
    fn malformed_strategy_parameters_are_rejected() {
        let adapter = FileConfigAdapter::from_string("[sma_cross]\nslow = 5O\n").unwrap();
        let err = cli::build_candidates(&adapter).unwrap_err();
        assert!(matches!(err, StratscanError::ConfigInvalid { key, .. } if key == "slow"));

        let adapter = FileConfigAdapter::from_string(
            "[selection]\ncandidates = hybrid\n[hybrid]\nadx_threshold = high\n",
        )
        .unwrap();
        let err = cli::build_candidates(&adapter).unwrap_err();
        assert!(matches!(err, StratscanError::ConfigInvalid { key, .. } if key == "adx_threshold"));
    }
}

mod candidates {
    use super::*;

    #[test]
    fn default_candidate_list() {
        let adapter = FileConfigAdapter::from_string("[data]\npath = x\n").unwrap();
        let candidates = cli::build_candidates(&adapter).unwrap();
        let ids: Vec<&str> = candidates.iter().map(Strategy::id).collect();
        assert_eq!(ids, vec!["sma_cross", "rsi_reversion", "macd_cross", "bollinger"]);
        assert_eq!(
            candidates[0],
            Strategy::MovingAverageCrossover { fast: 5, slow: 25 }
        );
    }

    #[test]
    fn configured_list_keeps_order_and_overrides() {
        let adapter = FileConfigAdapter::from_string(VALID_INI).unwrap();
        let candidates = cli::build_candidates(&adapter).unwrap();
        assert_eq!(candidates.len(), 3);
        assert_eq!(candidates[0].id(), "macd_cross");
        assert_eq!(
            candidates[1],
            Strategy::MovingAverageCrossover { fast: 10, slow: 30 }
        );
        match &candidates[2] {
            Strategy::HybridTrendRange {
                adx_threshold,
                adx_period,
                ..
            } => {
                assert!((adx_threshold - 20.0).abs() < f64::EPSILON);
                assert_eq!(*adx_period, 14);
            }
            other => panic!("expected hybrid, got {other:?}"),
        }
    }

    #[test]
    fn unknown_strategy_is_rejected() {
        let adapter =
            FileConfigAdapter::from_string("[selection]\ncandidates = sma_cross, momentum\n")
                .unwrap();
        let err = cli::build_candidates(&adapter).unwrap_err();
        assert!(matches!(err, StratscanError::UnknownStrategy { ref name } if name == "momentum"));
        assert_eq!(ExitCode::from(&err), ExitCode::from(4));
    }

    #[test]
    fn inverted_periods_are_rejected() {
        let adapter =
            FileConfigAdapter::from_string("[macd_cross]\nfast = 30\nslow = 26\n").unwrap();
        let err = cli::strategy_from_config("macd_cross", &adapter).unwrap_err();
        assert!(matches!(err, StratscanError::ConfigInvalid { section, .. } if section == "macd_cross"));
    }

    #[test]
    fn empty_candidate_list_is_rejected() {
        let adapter = FileConfigAdapter::from_string("[selection]\ncandidates = ,\n").unwrap();
        let err = cli::build_candidates(&adapter).unwrap_err();
        assert!(matches!(err, StratscanError::ConfigInvalid { key, .. } if key == "candidates"));
    }
}

mod validate_command {
    use super::*;

    #[test]
    fn valid_file_succeeds() {
        let file = write_temp_ini(VALID_INI);
        let code = cli::run(Cli {
            command: Command::Validate {
                config: file.path().to_path_buf(),
            },
        });
        assert_eq!(code, ExitCode::SUCCESS);
    }

    #[test]
    fn missing_file_exits_with_config_code() {
        let code = cli::run(Cli {
            command: Command::Validate {
                config: PathBuf::from("/nonexistent/stratscan.ini"),
            },
        });
        assert_eq!(code, ExitCode::from(2));
    }

    #[test]
    fn unknown_candidate_exits_with_strategy_code() {
        let file = write_temp_ini("[data]\npath = x\n[selection]\ncandidates = turtle\n");
        let code = cli::run(Cli {
            command: Command::Validate {
                config: file.path().to_path_buf(),
            },
        });
        assert_eq!(code, ExitCode::from(4));
    }
}

mod scan_pipeline {
    use super::*;

    fn write_bars(dir: &Path, file: &str, closes: &[f64]) {
        let mut content = String::from("date,open,high,low,close,volume\n");
        for bar in bars_from_closes(closes) {
            content.push_str(&format!(
                "{},{},{},{},{},{}\n",
                bar.timestamp.format("%Y-%m-%d"),
                bar.open,
                bar.high,
                bar.low,
                bar.close,
                bar.volume
            ));
        }
        std::fs::write(dir.join(file), content).unwrap();
    }

    /// Temp directory with market data for AAPL and 7203.T and a registry
    /// that also lists an instrument with no data.
    fn fixture() -> (TempDir, PathBuf) {
        let dir = TempDir::new().unwrap();
        let data = dir.path().join("data");
        std::fs::create_dir(&data).unwrap();
        write_bars(&data, "AAPL.csv", &golden_cross_closes());
        write_bars(&data, "7203.T.csv", &wave_closes(120));

        let registry = dir.path().join("tickers.csv");
        std::fs::write(
            &registry,
            "ticker,name,held\nAAPL,Apple,no\n7203,Toyota,yes\nMISSING,Nobody,no\n",
        )
        .unwrap();

        let ini = format!(
            "[data]\npath = {}\n\n[registry]\npath = {}\n\n[selection]\ncandidates = sma_cross\n",
            data.display(),
            registry.display()
        );
        let config_path = dir.path().join("stratscan.ini");
        std::fs::write(&config_path, ini).unwrap();
        (dir, config_path)
    }

    #[test]
    fn json_report_covers_results_and_failures() {
        let (dir, config_path) = fixture();
        let adapter = FileConfigAdapter::from_file(&config_path).unwrap();
        let scan_config = cli::build_scan_config(&adapter).unwrap();
        let candidates = cli::build_candidates(&adapter).unwrap();
        let data_port = CsvAdapter::new(dir.path().join("data"));
        let registry = CsvRegistryAdapter::new(dir.path().join("tickers.csv"));
        let output = dir.path().join("report.json");

        let report = cli::run_scan_pipeline(
            &data_port,
            &registry,
            &JsonReportAdapter::new(true),
            &candidates,
            &scan_config,
            output.to_str(),
        )
        .unwrap();

        assert_eq!(report.results.len(), 2);
        assert_eq!(report.failures.len(), 1);

        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&output).unwrap()).unwrap();
        let results = json["results"].as_array().unwrap();
        assert_eq!(results[0]["instrument"], "AAPL");
        assert_eq!(results[0]["action"], "buy");
        assert_eq!(results[0]["reason"], "golden cross");
        assert_eq!(results[1]["instrument"], "7203.T");
        assert_eq!(results[1]["held"], true);
        assert_eq!(json["failures"][0]["instrument"], "MISSING");
    }

    #[test]
    fn scan_command_writes_text_report() {
        let (dir, config_path) = fixture();
        let output = dir.path().join("report.txt");
        let code = cli::run(Cli {
            command: Command::Scan {
                config: config_path,
                format: OutputFormat::Text,
                output: Some(output.clone()),
            },
        });
        assert_eq!(code, ExitCode::SUCCESS);

        let text = std::fs::read_to_string(&output).unwrap();
        assert!(text.starts_with("Strategy scan report"));
        assert!(text.contains("[ Holdings ]"));
        assert!(text.contains("Toyota (7203.T)"));
        assert!(text.contains("[BUY] Apple (AAPL)"));
        assert!(text.contains("Reason: golden cross"));
        assert!(text.contains("MISSING: "));
    }

    #[test]
    fn scan_command_without_registry_is_config_error() {
        let file = write_temp_ini("[data]\npath = ./data\n");
        let code = cli::run(Cli {
            command: Command::Scan {
                config: file.path().to_path_buf(),
                format: OutputFormat::Json,
                output: None,
            },
        });
        assert_eq!(code, ExitCode::from(2));
    }

    #[test]
    fn analyze_lists_every_candidate() {
        let (dir, config_path) = fixture();
        let adapter = FileConfigAdapter::from_file(&config_path).unwrap();
        let scan_config = cli::build_scan_config(&adapter).unwrap();
        let data_port = CsvAdapter::new(dir.path().join("data"));
        let ticker = stratscan::domain::scan::Ticker::new("AAPL", "Apple", false);
        let candidates = vec![
            Strategy::MovingAverageCrossover { fast: 5, slow: 25 },
            Strategy::MacdCrossover {
                fast: 12,
                slow: 26,
                signal: 9,
            },
        ];

        let analysis =
            stratscan::domain::scan::analyze(&data_port, &ticker, &candidates, &scan_config)
                .unwrap();
        let text = cli::format_analysis(&analysis);

        assert!(text.contains("Apple (AAPL)"));
        assert!(text.contains("SMA Cross(5,25)"));
        assert!(text.contains("MACD(12,26,9)"));
        assert!(text.contains("skipped:"));
        assert!(text.contains("Selected: SMA Cross(5,25) (fallback"));
        assert!(text.contains("Signal:   BUY (golden cross)"));
    }
}
