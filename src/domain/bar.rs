//! OHLCV bar representation with attached indicator values.

use chrono::NaiveDateTime;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::domain::indicator::IndicatorKey;

const TRADING_DAYS_PER_YEAR: f64 = 252.0;
const TRADING_MINUTES_PER_DAY: f64 = 390.0;

#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
    pub timestamp: NaiveDateTime,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
    pub indicators: HashMap<IndicatorKey, Option<f64>>,
}

impl Bar {
    pub fn new(
        timestamp: NaiveDateTime,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: f64,
    ) -> Self {
        Bar {
            timestamp,
            open,
            high,
            low,
            close,
            volume,
            indicators: HashMap::new(),
        }
    }

    /// Value of an attached indicator, `None` during warm-up or when the
    /// indicator was never attached.
    pub fn indicator(&self, key: &IndicatorKey) -> Option<f64> {
        self.indicators.get(key).copied().flatten()
    }

    pub fn with_indicator(mut self, key: IndicatorKey, value: Option<f64>) -> Self {
        self.indicators.insert(key, value);
        self
    }

    /// max(high - low, |high - prev_close|, |low - prev_close|)
    pub fn true_range(&self, prev_close: f64) -> f64 {
        let hl = self.high - self.low;
        let hc = (self.high - prev_close).abs();
        let lc = (self.low - prev_close).abs();
        hl.max(hc).max(lc)
    }
}

/// Sampling interval of a series, in the provider's notation (`1d`, `1h`, `5m`, `1wk`, `1mo`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub enum BarInterval {
    Minutes(u32),
    Hours(u32),
    #[default]
    Daily,
    Weekly,
    Monthly,
}

impl BarInterval {
    /// Number of bars in a trading year, used to annualise the Sharpe ratio.
    pub fn bars_per_year(&self) -> f64 {
        match self {
            BarInterval::Minutes(n) => {
                TRADING_DAYS_PER_YEAR * TRADING_MINUTES_PER_DAY / f64::from((*n).max(1))
            }
            BarInterval::Hours(n) => {
                TRADING_DAYS_PER_YEAR * (TRADING_MINUTES_PER_DAY / 60.0) / f64::from((*n).max(1))
            }
            BarInterval::Daily => TRADING_DAYS_PER_YEAR,
            BarInterval::Weekly => 52.0,
            BarInterval::Monthly => 12.0,
        }
    }
}

impl fmt::Display for BarInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BarInterval::Minutes(n) => write!(f, "{}m", n),
            BarInterval::Hours(n) => write!(f, "{}h", n),
            BarInterval::Daily => write!(f, "1d"),
            BarInterval::Weekly => write!(f, "1wk"),
            BarInterval::Monthly => write!(f, "1mo"),
        }
    }
}

impl FromStr for BarInterval {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_lowercase();
        match s.as_str() {
            "1d" | "d" | "daily" => return Ok(BarInterval::Daily),
            "1wk" | "1w" | "weekly" => return Ok(BarInterval::Weekly),
            "1mo" | "monthly" => return Ok(BarInterval::Monthly),
            _ => {}
        }

        let split = s
            .find(|c: char| !c.is_ascii_digit())
            .ok_or_else(|| format!("invalid interval '{}'", s))?;
        let (digits, unit) = s.split_at(split);
        let n: u32 = digits
            .parse()
            .map_err(|_| format!("invalid interval '{}'", s))?;
        if n == 0 {
            return Err(format!("invalid interval '{}': length must be positive", s));
        }
        match unit {
            "m" => Ok(BarInterval::Minutes(n)),
            "h" => Ok(BarInterval::Hours(n)),
            _ => Err(format!("invalid interval '{}'", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn sample_bar() -> Bar {
        Bar::new(
            NaiveDate::from_ymd_opt(2024, 1, 15)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
            100.0,
            110.0,
            90.0,
            105.0,
            50_000.0,
        )
    }

    #[test]
    fn indicator_missing_is_none() {
        let bar = sample_bar();
        assert_eq!(bar.indicator(&IndicatorKey::Sma(5)), None);
    }

    #[test]
    fn indicator_warmup_is_none() {
        let bar = sample_bar().with_indicator(IndicatorKey::Sma(5), None);
        assert_eq!(bar.indicator(&IndicatorKey::Sma(5)), None);
    }

    #[test]
    fn indicator_present() {
        let bar = sample_bar().with_indicator(IndicatorKey::Rsi(14), Some(42.0));
        assert_eq!(bar.indicator(&IndicatorKey::Rsi(14)), Some(42.0));
    }

    #[test]
    fn true_range_gap_up() {
        let bar = sample_bar();
        // high-low=20, |110-70|=40, |90-70|=20 → 40
        assert!((bar.true_range(70.0) - 40.0).abs() < f64::EPSILON);
    }

    #[test]
    fn interval_parse() {
        assert_eq!("1d".parse::<BarInterval>().unwrap(), BarInterval::Daily);
        assert_eq!("1wk".parse::<BarInterval>().unwrap(), BarInterval::Weekly);
        assert_eq!("1mo".parse::<BarInterval>().unwrap(), BarInterval::Monthly);
        assert_eq!("15m".parse::<BarInterval>().unwrap(), BarInterval::Minutes(15));
        assert_eq!("1h".parse::<BarInterval>().unwrap(), BarInterval::Hours(1));
        assert!("0m".parse::<BarInterval>().is_err());
        assert!("abc".parse::<BarInterval>().is_err());
        assert!("5x".parse::<BarInterval>().is_err());
    }

    #[test]
    fn interval_display_roundtrips_common_values() {
        for s in ["1d", "1wk", "1mo", "5m", "1h"] {
            assert_eq!(s.parse::<BarInterval>().unwrap().to_string(), s);
        }
    }

    #[test]
    fn bars_per_year() {
        assert!((BarInterval::Daily.bars_per_year() - 252.0).abs() < f64::EPSILON);
        assert!((BarInterval::Weekly.bars_per_year() - 52.0).abs() < f64::EPSILON);
        assert!((BarInterval::Hours(1).bars_per_year() - 252.0 * 6.5).abs() < 1e-9);
        assert!((BarInterval::Minutes(30).bars_per_year() - 252.0 * 13.0).abs() < 1e-9);
    }
}
