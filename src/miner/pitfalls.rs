//! Issue/solution pairs recorded in the progress log.
//!
//! An entry looks like:
//!
//! ```text
//! ## [2026-03-01]
//! **Issue**: cache never invalidated
//! - **Context**: user profile page
//! - **Solution**: evict on write
//! - **Pattern**: write-through cache
//! ```

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

pub const ANTI_PATTERNS_MARKER: &str = "## Discovered Anti-patterns";
pub const UNKNOWN_MARKER: &str = "unknown";

static ISSUE_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[ \t]*-?[ \t]*\*\*Issue\*\*:[ \t]*(.*)$").expect("issue line regex"));

static FIELD_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[ \t]*-?[ \t]*\*\*(Context|Solution|Pattern)\*\*:[ \t]*(.*)$").expect("field line regex")
});

static MARKER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^## \[([^\]]+)\]").expect("marker regex"));

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PitfallRecord {
    pub issue: String,
    pub context: Option<String>,
    pub solution: String,
    pub pattern: Option<String>,
    pub marker: String,
}

/// Fields collected for the entry currently being read
struct OpenEntry {
    issue: String,
    context: Option<String>,
    solution: Option<String>,
    pattern: Option<String>,
    marker: String,
}

impl OpenEntry {
    fn set(&mut self, label: &str, value: &str) {
        let slot = match label {
            "Context" => &mut self.context,
            "Solution" => &mut self.solution,
            _ => &mut self.pattern,
        };
        if slot.is_none() && !value.is_empty() {
            *slot = Some(value.to_string());
        }
    }

    fn finish(self) -> Option<PitfallRecord> {
        if self.issue.is_empty() {
            return None;
        }
        Some(PitfallRecord {
            issue: self.issue,
            context: self.context,
            solution: self.solution?,
            pattern: self.pattern,
            marker: self.marker,
        })
    }
}

/// All complete issue/solution entries of a progress document.
///
/// An entry runs from its `**Issue**:` line to the next issue or `## `
/// heading. Its labelled fields may come in any order and may be separated
/// by blank or unrelated lines.
pub fn extract(content: &str) -> Vec<PitfallRecord> {
    let mut records = Vec::new();
    let mut marker = UNKNOWN_MARKER.to_string();
    let mut open: Option<OpenEntry> = None;

    for line in content.lines() {
        if let Some(caps) = ISSUE_LINE.captures(line) {
            records.extend(open.take().and_then(OpenEntry::finish));
            open = Some(OpenEntry {
                issue: caps[1].trim().to_string(),
                context: None,
                solution: None,
                pattern: None,
                marker: marker.clone(),
            });
            continue;
        }

        if line.starts_with("## ") {
            records.extend(open.take().and_then(OpenEntry::finish));
            if let Some(caps) = MARKER.captures(line) {
                marker = caps[1].trim().to_string();
            }
            continue;
        }

        if let (Some(entry), Some(caps)) = (open.as_mut(), FIELD_LINE.captures(line)) {
            entry.set(&caps[1], caps[2].trim());
        }
    }

    records.extend(open.and_then(OpenEntry::finish));
    records
}

fn render_record(record: &PitfallRecord) -> String {
    let mut out = format!("#### {}\n", record.issue);
    if let Some(context) = &record.context {
        out.push_str(&format!("**Context**: {}\n\n", context));
    }
    out.push_str(&format!("**Problem**: {}\n\n", record.issue));
    out.push_str(&format!("**Solution**: {}\n\n", record.solution));
    if let Some(pattern) = &record.pattern {
        out.push_str(&format!("**Pattern**: {}\n\n", pattern));
    }
    out
}

/// Section body grouped by marker, markers in order of first appearance
pub fn render_section(records: &[PitfallRecord]) -> String {
    let mut markers: Vec<&str> = Vec::new();
    for record in records {
        if !markers.contains(&record.marker.as_str()) {
            markers.push(&record.marker);
        }
    }

    let mut out = String::from("\n");
    for marker in markers {
        out.push_str(&format!("### {}\n\n", marker));
        for record in records.iter().filter(|r| r.marker == marker) {
            out.push_str(&render_record(record));
        }
    }
    out
}
