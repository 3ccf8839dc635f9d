//! CLI definition and dispatch.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use tracing::info;

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::registry_adapter::CsvRegistryAdapter;
use crate::adapters::report_adapter::{JsonReportAdapter, TextReportAdapter};
use crate::domain::backtest::BacktestConfig;
use crate::domain::bar::BarInterval;
use crate::domain::config_validation::{
    read_number, read_period, validate_backtest_config, validate_data_config,
    validate_registry_config, validate_scan_config, validate_strategy, DEFAULT_COMMISSION_RATE,
    DEFAULT_INITIAL_CASH, DEFAULT_LOOKBACK, DEFAULT_MAX_CHARS,
};
use crate::domain::error::StratscanError;
use crate::domain::scan::{self, Analysis, ScanConfig, ScanReport, Ticker};
use crate::domain::selector::SelectionOutcome;
use crate::domain::strategy::Strategy;
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::MarketDataPort;
use crate::ports::registry_port::TickerRegistryPort;
use crate::ports::report_port::ReportPort;

/// Candidate ids used when `[selection] candidates` is absent, in priority order.
pub const DEFAULT_CANDIDATES: [&str; 4] = ["sma_cross", "rsi_reversion", "macd_cross", "bollinger"];

#[derive(Parser, Debug)]
#[command(
    name = "stratscan",
    about = "Pick the best-performing trading rule per instrument and signal on the latest bar"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Scan every instrument in the registry
    Scan {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Select a strategy for one instrument and show every candidate's stats
    Analyze {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(short, long)]
        instrument: String,
        /// Evaluate as a held (long) position
        #[arg(long)]
        held: bool,
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Scan {
            config,
            format,
            output,
        } => run_scan(&config, format, output.as_ref()),
        Command::Analyze {
            config,
            instrument,
            held,
            format,
        } => run_analyze(&config, &instrument, held, format),
        Command::Validate { config } => run_validate(&config),
    }
}

pub fn load_config(path: &PathBuf) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(|err| {
        eprintln!("error: {err}");
        ExitCode::from(&err)
    })
}

fn fail(err: StratscanError) -> ExitCode {
    eprintln!("error: {err}");
    (&err).into()
}

pub fn build_backtest_config(config: &dyn ConfigPort) -> Result<BacktestConfig, StratscanError> {
    validate_backtest_config(config)?;
    Ok(BacktestConfig {
        initial_cash: config.get_double("backtest", "initial_cash", DEFAULT_INITIAL_CASH),
        commission_rate: config.get_double("backtest", "commission_rate", DEFAULT_COMMISSION_RATE),
    })
}

pub fn build_scan_config(config: &dyn ConfigPort) -> Result<ScanConfig, StratscanError> {
    validate_data_config(config)?;
    validate_scan_config(config)?;

    let interval = match config.get_string("data", "interval") {
        Some(raw) => raw
            .parse::<BarInterval>()
            .map_err(|reason| StratscanError::ConfigInvalid {
                section: "data".into(),
                key: "interval".into(),
                reason,
            })?,
        None => BarInterval::default(),
    };
    let numeric_suffix = match config.get_string("data", "numeric_suffix") {
        Some(s) if s.eq_ignore_ascii_case("none") => None,
        Some(s) => Some(s),
        None => Some(".T".to_string()),
    };
    let timeout_secs = config.get_int("scan", "timeout_secs", 0);

    Ok(ScanConfig {
        backtest: build_backtest_config(config)?,
        interval,
        lookback: config.get_int("data", "lookback", DEFAULT_LOOKBACK) as usize,
        numeric_suffix,
        workers: config.get_int("scan", "workers", 0) as usize,
        timeout: (timeout_secs > 0).then(|| Duration::from_secs(timeout_secs as u64)),
    })
}

/// One strategy from its configuration section, with defaults for absent keys.
pub fn strategy_from_config(
    name: &str,
    config: &dyn ConfigPort,
) -> Result<Strategy, StratscanError> {
    let strategy = match name {
        "sma_cross" => Strategy::MovingAverageCrossover {
            fast: read_period(config, name, "fast", 5)?,
            slow: read_period(config, name, "slow", 25)?,
        },
        "rsi_reversion" => Strategy::OscillatorReversion {
            period: read_period(config, name, "period", 14)?,
            lower: read_number(config, name, "lower", 30.0)?,
            upper: read_number(config, name, "upper", 70.0)?,
        },
        "macd_cross" => Strategy::MacdCrossover {
            fast: read_period(config, name, "fast", 12)?,
            slow: read_period(config, name, "slow", 26)?,
            signal: read_period(config, name, "signal", 9)?,
        },
        "bollinger" => Strategy::BollingerBreakout {
            length: read_period(config, name, "length", 20)?,
            stddev: read_number(config, name, "stddev", 2.0)?,
        },
        "hybrid" => Strategy::HybridTrendRange {
            fast: read_period(config, name, "fast", 5)?,
            slow: read_period(config, name, "slow", 25)?,
            rsi_period: read_period(config, name, "rsi_period", 14)?,
            lower: read_number(config, name, "lower", 30.0)?,
            upper: read_number(config, name, "upper", 70.0)?,
            adx_period: read_period(config, name, "adx_period", 14)?,
            adx_threshold: read_number(config, name, "adx_threshold", 25.0)?,
        },
        other => {
            return Err(StratscanError::UnknownStrategy {
                name: other.to_string(),
            });
        }
    };
    validate_strategy(&strategy)?;
    Ok(strategy)
}

/// The candidate list in priority order, built fresh from configuration.
pub fn build_candidates(config: &dyn ConfigPort) -> Result<Vec<Strategy>, StratscanError> {
    let names = config
        .get_list("selection", "candidates")
        .unwrap_or_else(|| DEFAULT_CANDIDATES.iter().map(|s| s.to_string()).collect());
    if names.is_empty() {
        return Err(StratscanError::ConfigInvalid {
            section: "selection".into(),
            key: "candidates".into(),
            reason: "at least one candidate is required".into(),
        });
    }
    names
        .iter()
        .map(|name| strategy_from_config(&name.to_lowercase(), config))
        .collect()
}

pub fn build_text_reporter(config: &dyn ConfigPort) -> TextReportAdapter {
    TextReportAdapter::new(config.get_int("report", "max_chars", DEFAULT_MAX_CHARS) as usize)
}

/// Registry → scan → report. Per-instrument failures end up in the report.
pub fn run_scan_pipeline(
    data_port: &(dyn MarketDataPort + Sync),
    registry: &dyn TickerRegistryPort,
    reporter: &dyn ReportPort,
    candidates: &[Strategy],
    scan_config: &ScanConfig,
    output_path: Option<&str>,
) -> Result<ScanReport, StratscanError> {
    let tickers = registry.tickers()?;
    info!(instruments = tickers.len(), "loaded registry");

    let report = scan::scan(data_port, &tickers, candidates, scan_config);
    reporter.write(&report, output_path)?;
    if let Some(path) = output_path {
        info!(path, "report written");
    }
    Ok(report)
}

fn run_scan(config_path: &PathBuf, format: OutputFormat, output: Option<&PathBuf>) -> ExitCode {
    info!(path = %config_path.display(), "loading config");
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    let setup = validate_registry_config(&adapter).and_then(|_| {
        Ok((build_scan_config(&adapter)?, build_candidates(&adapter)?))
    });
    let (scan_config, candidates) = match setup {
        Ok(s) => s,
        Err(e) => return fail(e),
    };

    // Both paths were checked by validation above.
    let data_path = adapter.get_string("data", "path").unwrap_or_default();
    let registry_path = adapter.get_string("registry", "path").unwrap_or_default();
    let data_port = CsvAdapter::new(data_path);
    let registry = CsvRegistryAdapter::new(registry_path);

    let text;
    let json;
    let reporter: &dyn ReportPort = match format {
        OutputFormat::Text => {
            text = build_text_reporter(&adapter);
            &text
        }
        OutputFormat::Json => {
            json = JsonReportAdapter::new(true);
            &json
        }
    };

    let output = output.map(|p| p.display().to_string());
    match run_scan_pipeline(
        &data_port,
        &registry,
        reporter,
        &candidates,
        &scan_config,
        output.as_deref(),
    ) {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => fail(e),
    }
}

fn run_analyze(config_path: &PathBuf, instrument: &str, held: bool, format: OutputFormat) -> ExitCode {
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };
    let (scan_config, candidates) =
        match build_scan_config(&adapter).and_then(|s| Ok((s, build_candidates(&adapter)?))) {
            Ok(s) => s,
            Err(e) => return fail(e),
        };

    let data_port = CsvAdapter::new(adapter.get_string("data", "path").unwrap_or_default());
    let ticker = Ticker::new(instrument, instrument, held);
    let analysis = match scan::analyze(&data_port, &ticker, &candidates, &scan_config) {
        Ok(a) => a,
        Err(e) => return fail(e),
    };

    match format {
        OutputFormat::Text => print!("{}", format_analysis(&analysis)),
        OutputFormat::Json => match serde_json::to_string_pretty(&analysis) {
            Ok(s) => println!("{s}"),
            Err(e) => {
                return fail(StratscanError::Report {
                    reason: e.to_string(),
                });
            }
        },
    }
    ExitCode::SUCCESS
}

/// Candidate table, chosen strategy and signal for the `analyze` command.
pub fn format_analysis(analysis: &Analysis) -> String {
    let report = &analysis.report;
    let selection = &analysis.selection;
    let mut out = String::new();

    out.push_str(&format!(
        "{} ({}) as of {}: close {:.2} ({:+.1}%)\n",
        report.name,
        report.instrument,
        report.as_of.format("%Y-%m-%d %H:%M"),
        report.last_close,
        report.change_pct
    ));
    out.push_str(&format!(
        "\n{:<40} {:>6} {:>8} {:>9} {:>7} {:>8} {:>7}\n",
        "Candidate", "Trades", "Win%", "Return%", "PF", "MaxDD%", "Sharpe"
    ));
    for candidate in &selection.evaluated {
        let s = &candidate.stats;
        let pf = if s.profit_factor.is_infinite() {
            "inf".to_string()
        } else {
            format!("{:.2}", s.profit_factor)
        };
        out.push_str(&format!(
            "{:<40} {:>6} {:>8.1} {:>9.2} {:>7} {:>8.2} {:>7.2}\n",
            candidate.strategy.name(),
            s.trade_count,
            s.win_rate,
            s.total_return_pct,
            pf,
            s.max_drawdown_pct,
            s.sharpe_ratio
        ));
    }
    for skipped in &selection.skipped {
        out.push_str(&format!("{:<40} skipped: {}\n", skipped.strategy.name(), skipped.reason));
    }

    let chosen = match selection.outcome {
        SelectionOutcome::Winner => "winner",
        SelectionOutcome::Fallback => "fallback, no candidate closed a trade",
    };
    out.push_str(&format!("\nSelected: {} ({})\n", report.strategy, chosen));
    out.push_str(&format!("Signal:   {} ({})\n", report.action, report.reason));
    out
}

fn run_validate(config_path: &PathBuf) -> ExitCode {
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    let checked = build_scan_config(&adapter).and_then(|scan_config| {
        if adapter.has_section("registry") {
            validate_registry_config(&adapter)?;
        }
        Ok((scan_config, build_candidates(&adapter)?))
    });
    let (scan_config, candidates) = match checked {
        Ok(c) => c,
        Err(e) => return fail(e),
    };

    println!("Config validated successfully");
    println!(
        "  interval {}, lookback {}, initial cash {:.2}, commission {}",
        scan_config.interval,
        scan_config.lookback,
        scan_config.backtest.initial_cash,
        scan_config.backtest.commission_rate
    );
    println!("Candidates (priority order):");
    for (i, strategy) in candidates.iter().enumerate() {
        println!(
            "  {}. {} [{}] warm-up {} bars",
            i + 1,
            strategy.name(),
            strategy.id(),
            strategy.warmup()
        );
    }
    ExitCode::SUCCESS
}
