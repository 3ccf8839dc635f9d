//! Configuration validation.
//!
//! Runs before any data is read. Every check names the offending
//! `[section] key` so the CLI can report it and exit with code 2.

use std::str::FromStr;

use crate::domain::bar::BarInterval;
use crate::domain::error::StratscanError;
use crate::domain::strategy::Strategy;
use crate::ports::config_port::ConfigPort;

pub const DEFAULT_INITIAL_CASH: f64 = 1_000_000.0;
pub const DEFAULT_COMMISSION_RATE: f64 = 0.002;
pub const DEFAULT_LOOKBACK: i64 = 500;
pub const DEFAULT_MAX_CHARS: i64 = 2000;

fn invalid(section: &str, key: &str, reason: impl Into<String>) -> StratscanError {
    StratscanError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.into(),
    }
}

fn require(config: &dyn ConfigPort, section: &str, key: &str) -> Result<String, StratscanError> {
    config
        .get_string(section, key)
        .ok_or_else(|| StratscanError::ConfigMissing {
            section: section.to_string(),
            key: key.to_string(),
        })
}

/// A key that is present must parse as `T`; absent keys fall back to defaults.
fn require_parsable<T: FromStr>(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
) -> Result<(), StratscanError> {
    match config.get_string(section, key) {
        Some(raw) if raw.parse::<T>().is_err() => Err(invalid(
            section,
            key,
            format!("'{raw}' is not a valid number"),
        )),
        _ => Ok(()),
    }
}

pub fn validate_backtest_config(config: &dyn ConfigPort) -> Result<(), StratscanError> {
    require_parsable::<f64>(config, "backtest", "initial_cash")?;
    require_parsable::<f64>(config, "backtest", "commission_rate")?;
    let cash = config.get_double("backtest", "initial_cash", DEFAULT_INITIAL_CASH);
    if !(cash.is_finite() && cash > 0.0) {
        return Err(invalid("backtest", "initial_cash", "initial_cash must be positive"));
    }
    let rate = config.get_double("backtest", "commission_rate", DEFAULT_COMMISSION_RATE);
    if !(0.0..1.0).contains(&rate) {
        return Err(invalid(
            "backtest",
            "commission_rate",
            "commission_rate must be in [0, 1)",
        ));
    }
    Ok(())
}

pub fn validate_data_config(config: &dyn ConfigPort) -> Result<(), StratscanError> {
    require(config, "data", "path")?;
    require_parsable::<i64>(config, "data", "lookback")?;
    if let Some(raw) = config.get_string("data", "interval") {
        raw.parse::<BarInterval>()
            .map_err(|reason| invalid("data", "interval", reason))?;
    }
    if config.get_int("data", "lookback", DEFAULT_LOOKBACK) < 2 {
        return Err(invalid("data", "lookback", "lookback must be at least 2"));
    }
    Ok(())
}

pub fn validate_registry_config(config: &dyn ConfigPort) -> Result<(), StratscanError> {
    require(config, "registry", "path").map(|_| ())
}

pub fn validate_scan_config(config: &dyn ConfigPort) -> Result<(), StratscanError> {
    require_parsable::<i64>(config, "scan", "workers")?;
    require_parsable::<i64>(config, "scan", "timeout_secs")?;
    require_parsable::<i64>(config, "report", "max_chars")?;
    if config.get_int("scan", "workers", 0) < 0 {
        return Err(invalid("scan", "workers", "workers must be non-negative"));
    }
    if config.get_int("scan", "timeout_secs", 0) < 0 {
        return Err(invalid("scan", "timeout_secs", "timeout_secs must be non-negative"));
    }
    if config.get_int("report", "max_chars", DEFAULT_MAX_CHARS) < 1 {
        return Err(invalid("report", "max_chars", "max_chars must be positive"));
    }
    Ok(())
}

/// A strictly positive integer parameter.
pub fn read_period(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: usize,
) -> Result<usize, StratscanError> {
    require_parsable::<i64>(config, section, key)?;
    let value = config.get_int(section, key, default as i64);
    usize::try_from(value)
        .ok()
        .filter(|v| *v > 0)
        .ok_or_else(|| invalid(section, key, format!("{key} must be a positive integer")))
}

/// A floating-point parameter, rejected when present but unparsable.
pub fn read_number(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: f64,
) -> Result<f64, StratscanError> {
    require_parsable::<f64>(config, section, key)?;
    Ok(config.get_double(section, key, default))
}

/// Parameter ordering and range checks for a built strategy.
pub fn validate_strategy(strategy: &Strategy) -> Result<(), StratscanError> {
    let section = strategy.id();
    match *strategy {
        Strategy::MovingAverageCrossover { fast, slow } => check_fast_slow(section, fast, slow),
        Strategy::OscillatorReversion { lower, upper, .. } => {
            check_bounds(section, "lower", "upper", lower, upper)
        }
        Strategy::MacdCrossover { fast, slow, .. } => check_fast_slow(section, fast, slow),
        Strategy::BollingerBreakout { stddev, .. } => {
            if stddev.is_finite() && stddev > 0.0 {
                Ok(())
            } else {
                Err(invalid(section, "stddev", "stddev must be positive"))
            }
        }
        Strategy::HybridTrendRange {
            fast,
            slow,
            lower,
            upper,
            adx_threshold,
            ..
        } => {
            check_fast_slow(section, fast, slow)?;
            check_bounds(section, "lower", "upper", lower, upper)?;
            if !(0.0..=100.0).contains(&adx_threshold) {
                return Err(invalid(
                    section,
                    "adx_threshold",
                    "adx_threshold must be between 0 and 100",
                ));
            }
            Ok(())
        }
    }
}

fn check_fast_slow(section: &str, fast: usize, slow: usize) -> Result<(), StratscanError> {
    if fast >= slow {
        return Err(invalid(section, "fast", "fast must be less than slow"));
    }
    Ok(())
}

fn check_bounds(
    section: &str,
    lower_key: &str,
    upper_key: &str,
    lower: f64,
    upper: f64,
) -> Result<(), StratscanError> {
    if !(0.0..=100.0).contains(&lower) {
        return Err(invalid(section, lower_key, "must be between 0 and 100"));
    }
    if !(0.0..=100.0).contains(&upper) {
        return Err(invalid(section, upper_key, "must be between 0 and 100"));
    }
    if lower >= upper {
        return Err(invalid(
            section,
            lower_key,
            format!("{lower_key} must be less than {upper_key}"),
        ));
    }
    Ok(())
}
