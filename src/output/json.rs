//! JSON output of the merge report.

use crate::models::MergeReport;

/// Render the report as pretty-printed JSON.
pub fn report_json(report: &MergeReport) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(report)
}
