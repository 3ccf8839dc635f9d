//! Rule-based strategies as pure entry/exit predicates.
//!
//! Every variant shares the state space `{Flat, Long}`; the engine owns the
//! state and asks the strategy only whether to enter (while flat) or exit
//! (while long), given the previous and current bar.
//!
//! Crossovers use a strict comparison on the previous bar and a non-strict one
//! on the current bar: `a` crosses above `b` when `prev.a < prev.b` and
//! `curr.a >= curr.b`. A bar where the two lines touch therefore completes a
//! cross but cannot start one.
//!
//! Any required indicator still in warm-up (`None`) on either bar makes both
//! predicates false for that bar, including keys the firing branch does not read.

use serde::Serialize;
use std::fmt;

use crate::domain::bar::Bar;
use crate::domain::indicator::IndicatorKey;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Strategy {
    MovingAverageCrossover {
        fast: usize,
        slow: usize,
    },
    OscillatorReversion {
        period: usize,
        lower: f64,
        upper: f64,
    },
    MacdCrossover {
        fast: usize,
        slow: usize,
        signal: usize,
    },
    BollingerBreakout {
        length: usize,
        stddev: f64,
    },
    HybridTrendRange {
        fast: usize,
        slow: usize,
        rsi_period: usize,
        lower: f64,
        upper: f64,
        adx_period: usize,
        adx_threshold: f64,
    },
}

/// The candidate list used when configuration names none, in priority order.
pub fn default_candidates() -> Vec<Strategy> {
    vec![
        Strategy::MovingAverageCrossover { fast: 5, slow: 25 },
        Strategy::OscillatorReversion {
            period: 14,
            lower: 30.0,
            upper: 70.0,
        },
        Strategy::MacdCrossover {
            fast: 12,
            slow: 26,
            signal: 9,
        },
        Strategy::BollingerBreakout {
            length: 20,
            stddev: 2.0,
        },
    ]
}

impl Strategy {
    /// Configuration identifier of the variant.
    pub fn id(&self) -> &'static str {
        match self {
            Strategy::MovingAverageCrossover { .. } => "sma_cross",
            Strategy::OscillatorReversion { .. } => "rsi_reversion",
            Strategy::MacdCrossover { .. } => "macd_cross",
            Strategy::BollingerBreakout { .. } => "bollinger",
            Strategy::HybridTrendRange { .. } => "hybrid",
        }
    }

    pub fn name(&self) -> String {
        match self {
            Strategy::MovingAverageCrossover { fast, slow } => {
                format!("SMA Cross({},{})", fast, slow)
            }
            Strategy::OscillatorReversion {
                period,
                lower,
                upper,
            } => format!("RSI Reversion({},{},{})", period, lower, upper),
            Strategy::MacdCrossover { fast, slow, signal } => {
                format!("MACD({},{},{})", fast, slow, signal)
            }
            Strategy::BollingerBreakout { length, stddev } => {
                format!("Bollinger({},{:.1})", length, stddev)
            }
            Strategy::HybridTrendRange {
                fast,
                slow,
                rsi_period,
                adx_period,
                adx_threshold,
                ..
            } => format!(
                "Hybrid(SMA {}/{}, RSI {}, ADX {}>{})",
                fast, slow, rsi_period, adx_period, adx_threshold
            ),
        }
    }

    /// Indicators that must be attached to the bars before a run.
    pub fn required_indicators(&self) -> Vec<IndicatorKey> {
        match *self {
            Strategy::MovingAverageCrossover { fast, slow } => {
                vec![IndicatorKey::Sma(fast), IndicatorKey::Sma(slow)]
            }
            Strategy::OscillatorReversion { period, .. } => vec![IndicatorKey::Rsi(period)],
            Strategy::MacdCrossover { fast, slow, signal } => vec![
                IndicatorKey::MacdLine { fast, slow, signal },
                IndicatorKey::MacdSignal { fast, slow, signal },
            ],
            Strategy::BollingerBreakout { length, stddev } => {
                let (lower, upper) = bollinger_keys(length, stddev);
                vec![lower, upper]
            }
            Strategy::HybridTrendRange {
                fast,
                slow,
                rsi_period,
                adx_period,
                ..
            } => vec![
                IndicatorKey::Sma(fast),
                IndicatorKey::Sma(slow),
                IndicatorKey::Rsi(rsi_period),
                IndicatorKey::Adx(adx_period),
            ],
        }
    }

    /// Minimum series length: the longest indicator lookback plus the one
    /// previous bar every crossover reads.
    pub fn warmup(&self) -> usize {
        self.required_indicators()
            .iter()
            .map(IndicatorKey::lookback)
            .max()
            .unwrap_or(0)
            + 1
    }

    /// Every required indicator is defined on both bars.
    pub fn indicators_ready(&self, prev: &Bar, curr: &Bar) -> bool {
        self.required_indicators()
            .iter()
            .all(|key| prev.indicator(key).is_some() && curr.indicator(key).is_some())
    }

    pub fn should_enter(&self, prev: &Bar, curr: &Bar) -> bool {
        self.entry_signal(prev, curr).is_some()
    }

    pub fn should_exit(&self, prev: &Bar, curr: &Bar) -> bool {
        self.exit_signal(prev, curr).is_some()
    }

    /// Reason the entry rule fires on `curr`, or `None` if it does not.
    pub fn entry_signal(&self, prev: &Bar, curr: &Bar) -> Option<String> {
        if !self.indicators_ready(prev, curr) {
            return None;
        }
        match *self {
            Strategy::MovingAverageCrossover { fast, slow } => {
                sma_cross_up(prev, curr, fast, slow).then(|| "golden cross".to_string())
            }
            Strategy::OscillatorReversion { period, lower, .. } => {
                let key = IndicatorKey::Rsi(period);
                let (p, c) = (prev.indicator(&key)?, curr.indicator(&key)?);
                (p < lower && c >= lower).then(|| {
                    format!("RSI oversold at {:.1}, crossed back above {}", p, lower)
                })
            }
            Strategy::MacdCrossover { fast, slow, signal } => {
                let (line, sig) = macd_keys(fast, slow, signal);
                crosses_above(prev, curr, &line, &sig)?
                    .then(|| "MACD crossed above signal".to_string())
            }
            Strategy::BollingerBreakout { length, stddev } => {
                let (lower, _) = bollinger_keys(length, stddev);
                (curr.close < curr.indicator(&lower)?)
                    .then(|| "close below lower band".to_string())
            }
            Strategy::HybridTrendRange {
                fast,
                slow,
                rsi_period,
                lower,
                adx_period,
                adx_threshold,
                ..
            } => {
                let adx = curr.indicator(&IndicatorKey::Adx(adx_period))?;
                if adx > adx_threshold {
                    sma_cross_up(prev, curr, fast, slow)
                        .then(|| format!("golden cross (trending, ADX {:.1})", adx))
                } else {
                    let rsi = curr.indicator(&IndicatorKey::Rsi(rsi_period))?;
                    (rsi < lower)
                        .then(|| format!("RSI oversold at {:.1} (ranging, ADX {:.1})", rsi, adx))
                }
            }
        }
    }

    /// Reason the exit rule fires on `curr`, or `None` if it does not.
    pub fn exit_signal(&self, prev: &Bar, curr: &Bar) -> Option<String> {
        if !self.indicators_ready(prev, curr) {
            return None;
        }
        match *self {
            Strategy::MovingAverageCrossover { fast, slow } => {
                sma_cross_down(prev, curr, fast, slow).then(|| "dead cross".to_string())
            }
            Strategy::OscillatorReversion { period, upper, .. } => {
                let key = IndicatorKey::Rsi(period);
                let (p, c) = (prev.indicator(&key)?, curr.indicator(&key)?);
                (p > upper && c <= upper).then(|| {
                    format!("RSI overbought at {:.1}, crossed back below {}", p, upper)
                })
            }
            Strategy::MacdCrossover { fast, slow, signal } => {
                let (line, sig) = macd_keys(fast, slow, signal);
                crosses_below(prev, curr, &line, &sig)?
                    .then(|| "MACD crossed below signal".to_string())
            }
            Strategy::BollingerBreakout { length, stddev } => {
                let (_, upper) = bollinger_keys(length, stddev);
                (curr.close > curr.indicator(&upper)?)
                    .then(|| "close above upper band".to_string())
            }
            Strategy::HybridTrendRange {
                fast,
                slow,
                rsi_period,
                upper,
                adx_period,
                adx_threshold,
                ..
            } => {
                let adx = curr.indicator(&IndicatorKey::Adx(adx_period))?;
                if adx > adx_threshold {
                    sma_cross_down(prev, curr, fast, slow)
                        .then(|| format!("dead cross (trending, ADX {:.1})", adx))
                } else {
                    let rsi = curr.indicator(&IndicatorKey::Rsi(rsi_period))?;
                    (rsi > upper).then(|| {
                        format!("RSI overbought at {:.1} (ranging, ADX {:.1})", rsi, adx)
                    })
                }
            }
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

fn macd_keys(fast: usize, slow: usize, signal: usize) -> (IndicatorKey, IndicatorKey) {
    (
        IndicatorKey::MacdLine { fast, slow, signal },
        IndicatorKey::MacdSignal { fast, slow, signal },
    )
}

fn bollinger_keys(length: usize, stddev: f64) -> (IndicatorKey, IndicatorKey) {
    let stddev_mult_x100 = (stddev * 100.0).round() as u32;
    (
        IndicatorKey::BollingerLower {
            period: length,
            stddev_mult_x100,
        },
        IndicatorKey::BollingerUpper {
            period: length,
            stddev_mult_x100,
        },
    )
}

/// `Some(true)` when `a` crosses above `b` between `prev` and `curr`,
/// `None` when any of the four values is missing.
fn crosses_above(prev: &Bar, curr: &Bar, a: &IndicatorKey, b: &IndicatorKey) -> Option<bool> {
    let (pa, pb) = (prev.indicator(a)?, prev.indicator(b)?);
    let (ca, cb) = (curr.indicator(a)?, curr.indicator(b)?);
    Some(pa < pb && ca >= cb)
}

fn crosses_below(prev: &Bar, curr: &Bar, a: &IndicatorKey, b: &IndicatorKey) -> Option<bool> {
    let (pa, pb) = (prev.indicator(a)?, prev.indicator(b)?);
    let (ca, cb) = (curr.indicator(a)?, curr.indicator(b)?);
    Some(pa > pb && ca <= cb)
}

fn sma_cross_up(prev: &Bar, curr: &Bar, fast: usize, slow: usize) -> bool {
    crosses_above(prev, curr, &IndicatorKey::Sma(fast), &IndicatorKey::Sma(slow)).unwrap_or(false)
}

fn sma_cross_down(prev: &Bar, curr: &Bar, fast: usize, slow: usize) -> bool {
    crosses_below(prev, curr, &IndicatorKey::Sma(fast), &IndicatorKey::Sma(slow)).unwrap_or(false)
}
