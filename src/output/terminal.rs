//! Terminal output of the merge summary.

use crate::models::{IngestStats, MergeReport};
use colored::Colorize;

/// Format one statistics line, e.g. `networks: 12 (IPs: 3072, skipped: 1)`.
pub fn format_stats(stats: &IngestStats) -> String {
    format!(
        "networks: {} (IPs: {}, skipped: {})",
        stats.networks_retained, stats.addresses_covered, stats.networks_skipped
    )
}

/// Build the summary lines of a successful run.
pub fn summary_lines(report: &MergeReport) -> Vec<String> {
    let mut lines: Vec<String> = report
        .merge
        .sources
        .iter()
        .map(|source| {
            format!(
                "{}: {} {}",
                "Stats".cyan(),
                source.label,
                format_stats(&source.stats)
            )
        })
        .collect();

    lines.push(format!(
        "{}: Total {}",
        "Final Stats".green(),
        format_stats(&report.merge.totals)
    ));
    lines.push(format!(
        "{}: {} contains {} networks (IPs: {})",
        "Output".green(),
        report.output.display(),
        report.verified.networks,
        report.verified.addresses
    ));
    if !report.is_consistent() {
        lines.push(format!(
            "{}: output differs from inserted totals, overlapping networks were split or replaced",
            "Note".yellow()
        ));
    }
    lines
}

/// Print the summary of a successful run to stdout.
pub fn print_summary(report: &MergeReport) {
    for line in summary_lines(report) {
        println!("{line}");
    }
}
