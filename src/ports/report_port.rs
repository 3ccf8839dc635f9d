//! Report rendering port trait.

use crate::domain::error::StratscanError;
use crate::domain::scan::ScanReport;

/// Port for presenting scan results.
pub trait ReportPort {
    fn render(&self, report: &ScanReport) -> Result<String, StratscanError>;

    /// Render and write to `output_path`, or stdout when `None`.
    fn write(&self, report: &ScanReport, output_path: Option<&str>) -> Result<(), StratscanError> {
        let content = self.render(report)?;
        match output_path {
            Some(path) => std::fs::write(path, content).map_err(|e| StratscanError::Report {
                reason: format!("failed to write {path}: {e}"),
            }),
            None => {
                println!("{content}");
                Ok(())
            }
        }
    }
}
