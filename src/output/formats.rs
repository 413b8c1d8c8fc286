//! Report format implementations

use crate::batch::{BatchReport, ItemReport};

/// Format as an aligned text table
pub fn format_text(report: &BatchReport) -> String {
    let mut out = String::new();
    out.push_str(&format!("{:<16} {:>6}  {}\n", "name", "cutoff", "source"));

    for item in &report.items {
        out.push_str(&format!(
            "{:<16} {:>5}s  {}\n",
            item.name, item.cutoff_seconds, item.provenance
        ));
    }

    if !report.skipped.is_empty() {
        out.push('\n');
        for skip in &report.skipped {
            out.push_str(&format!("skipped {}: {}\n", skip.name, skip.reason));
        }
    }

    out
}

/// Format as JSON, including skip records
pub fn format_json(report: &BatchReport) -> String {
    serde_json::to_string_pretty(report).unwrap_or_else(|_| "{}".to_string())
}

/// Format as a paste-able fragment for the consuming app's sound catalog
pub fn format_snippet(items: &[ItemReport]) -> String {
    let mut out = String::new();

    for item in items {
        out.push_str(&format!(
            "  {:<15}  shortDurationSeconds: {},\n",
            item.name, item.cutoff_seconds
        ));
    }

    out.push('\n');
    out.push_str("const cutoffs = {\n");
    for item in items {
        out.push_str(&format!("  '{}': {},\n", item.name, item.cutoff_seconds));
    }
    out.push_str("};\n");

    out
}
