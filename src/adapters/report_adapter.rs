//! Text and JSON report adapters implementing ReportPort.

use crate::domain::config_validation::DEFAULT_MAX_CHARS;
use crate::domain::error::StratscanError;
use crate::domain::scan::{InstrumentReport, ScanReport};
use crate::domain::selector::SelectionOutcome;
use crate::domain::signal::Action;
use crate::ports::report_port::ReportPort;

const TRUNCATION_MARKER: &str = "\n...(truncated)...";
const SEPARATOR: &str = "----------";

/// Plain-text digest: holdings first, then watch-list opportunities, then
/// failures. Output longer than `max_chars` is cut and marked.
pub struct TextReportAdapter {
    max_chars: usize,
}

impl TextReportAdapter {
    pub fn new(max_chars: usize) -> Self {
        Self { max_chars }
    }
}

impl Default for TextReportAdapter {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_CHARS as usize)
    }
}

impl ReportPort for TextReportAdapter {
    fn render(&self, report: &ScanReport) -> Result<String, StratscanError> {
        let mut out = String::from("Strategy scan report\n");
        if let Some(as_of) = report.results.iter().map(|r| r.as_of).max() {
            out.push_str(&format!("As of {}\n", as_of.format("%Y-%m-%d %H:%M")));
        }

        let holdings: Vec<_> = report.holdings().collect();
        if !holdings.is_empty() {
            out.push_str("\n[ Holdings ]\n");
            for row in holdings {
                write_row(&mut out, row);
            }
        }

        let opportunities: Vec<_> = report.opportunities().collect();
        if !opportunities.is_empty() {
            out.push_str("\n[ Opportunities ]\n");
            for row in opportunities {
                write_row(&mut out, row);
            }
        }

        if report.results.is_empty() {
            out.push_str("\nNothing to report.\n");
        }

        if !report.failures.is_empty() {
            out.push_str("\n[ Failed ]\n");
            for failure in &report.failures {
                out.push_str(&format!("{}: {}\n", failure.instrument, failure.reason));
            }
        }

        Ok(truncate(out, self.max_chars))
    }
}

fn write_row(out: &mut String, row: &InstrumentReport) {
    let icon = match row.action {
        Action::Buy => "[BUY]",
        Action::Sell => "[SELL]",
        Action::Hold => "[HOLD]",
    };
    let sign = if row.change_pct > 0.0 { "+" } else { "" };
    out.push_str(&format!("{} {} ({})\n", icon, row.name, row.instrument));
    out.push_str(&format!("Price: {:.2} ({}{:.1}%)\n", row.last_close, sign, row.change_pct));
    out.push_str(&format!("Action: {}\n", row.action));
    match row.outcome {
        SelectionOutcome::Winner => {
            out.push_str(&format!(
                "Strategy: {} (win rate {:.0}%)\n",
                row.strategy, row.stats.win_rate
            ));
        }
        SelectionOutcome::Fallback => {
            out.push_str(&format!("Strategy: {} (default, no trades)\n", row.strategy));
        }
    }
    out.push_str(&format!("Reason: {}\n", row.reason));
    out.push_str(&format!("{SEPARATOR}\n"));
}

/// Keep at most `max_chars` characters, appending a marker when cut.
fn truncate(text: String, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        None => text,
        Some((byte_idx, _)) => {
            let mut cut = text[..byte_idx].to_string();
            cut.push_str(TRUNCATION_MARKER);
            cut
        }
    }
}

/// The full report serialized with serde_json. Infinite profit factors
/// become `null`.
#[derive(Default)]
pub struct JsonReportAdapter {
    pretty: bool,
}

impl JsonReportAdapter {
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }
}

impl ReportPort for JsonReportAdapter {
    fn render(&self, report: &ScanReport) -> Result<String, StratscanError> {
        let rendered = if self.pretty {
            serde_json::to_string_pretty(report)
        } else {
            serde_json::to_string(report)
        };
        rendered.map_err(|e| StratscanError::Report {
            reason: format!("failed to serialize report: {e}"),
        })
    }
}
