//! Rendering of scan results. Everything here is a pure function of its input.

use chrono::{DateTime, Local};
use serde::Serialize;

use super::{FileCount, PatternKind, PatternRecord, ScanResult};
use crate::error::Result;

pub const BATCH_PREFIX: &str = "auto-detected-patterns";
pub const SUMMARY_FILE: &str = "auto-detected-summary.md";
pub const CONTEXT_MARKER: &str = "## Auto-Discovered Patterns";

#[derive(Serialize)]
struct BatchDocument<'a> {
    timestamp: String,
    files_scanned: usize,
    utilities: Vec<&'a PatternRecord>,
    classes: Vec<&'a PatternRecord>,
    utility_files: &'a [FileCount],
    class_files: &'a [FileCount],
    error_patterns: &'a [FileCount],
    api_patterns: &'a [FileCount],
}

/// Pretty JSON for one timestamped batch file
pub fn render_batch(result: &ScanResult, at: DateTime<Local>) -> Result<String> {
    let doc = BatchDocument {
        timestamp: at.to_rfc3339(),
        files_scanned: result.files_scanned,
        utilities: result.of_kind(PatternKind::UtilityFunction).collect(),
        classes: result.of_kind(PatternKind::ReusableClass).collect(),
        utility_files: &result.utility_counts,
        class_files: &result.class_counts,
        error_patterns: &result.error_counts,
        api_patterns: &result.api_counts,
    };
    Ok(serde_json::to_string_pretty(&doc)?)
}

fn record_line(record: &PatternRecord) -> String {
    match &record.description {
        Some(desc) => format!("  - **{}** (line {}) - {}\n", record.name, record.line, desc),
        None => format!("  - **{}** (line {})\n", record.name, record.line),
    }
}

fn hotspot_lines(out: &mut String, counts: &[&FileCount], label: &str) {
    for c in counts {
        out.push_str(&format!("- `{}` - {} {}\n", c.file, c.count, label));
    }
}

/// Rolling summary; the `Last Updated` line is the only time-dependent line.
///
/// Every category lists only its top `top_n` files by count; the full record
/// list stays in the batch file.
pub fn render_summary(result: &ScanResult, top_n: usize, at: DateTime<Local>) -> String {
    let mut out = String::from("# Auto-Detected Code Patterns\n\n");
    out.push_str(&format!("**Last Updated**: {}\n\n", at.format("%Y-%m-%d %H:%M:%S")));
    out.push_str(&format!("Files scanned: {}\n\n", result.files_scanned));

    let sections = [
        ("Utility Functions", PatternKind::UtilityFunction, "utility functions"),
        ("Reusable Classes", PatternKind::ReusableClass, "reusable classes"),
    ];
    for (title, kind, label) in sections {
        out.push_str(&format!("## {}\n", title));
        let top = result.top_files(kind, top_n);
        if top.is_empty() {
            out.push_str("_None detected_\n");
        }
        for count in top {
            out.push_str(&format!("- `{}` - {} {}\n", count.file, count.count, label));
            for record in result.of_kind(kind).filter(|r| r.file == count.file) {
                out.push_str(&record_line(record));
            }
        }
        out.push('\n');
    }

    out.push_str("## Error Handling Hotspots\n");
    hotspot_lines(&mut out, &result.top_error_files(top_n), "error handling constructs");
    out.push_str("\n## API Communication Hotspots\n");
    hotspot_lines(&mut out, &result.top_api_files(top_n), "API-related patterns");

    out.push_str("\n---\n*Auto-generated by context-bank*\n");
    out
}

/// Body of the `## Auto-Discovered Patterns` section, `None` if nothing was counted
pub fn render_context_section(result: &ScanResult, top_n: usize, at: DateTime<Local>) -> Option<String> {
    if result.error_counts.is_empty() && result.api_counts.is_empty() {
        return None;
    }

    let mut out = format!("*Last updated: {}*\n\n", at.format("%Y-%m-%d %H:%M"));
    if !result.error_counts.is_empty() {
        out.push_str("### Error Handling Patterns Found\n");
        hotspot_lines(&mut out, &result.top_error_files(top_n), "error handling constructs");
        out.push('\n');
    }
    if !result.api_counts.is_empty() {
        out.push_str("### API Communication Patterns Found\n");
        hotspot_lines(&mut out, &result.top_api_files(top_n), "API-related patterns");
        out.push('\n');
    }
    Some(out)
}
