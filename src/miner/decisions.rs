//! Decision records inferred from history entries.

use chrono::{DateTime, Local};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::history::HistoryEntry;

pub const LOG_MARKER: &str = "## Auto-Extracted from Git History";

/// Keywords that make a history entry a decision
pub const DECISION_KEYWORDS: &[&str] = &[
    "refactor",
    "architecture",
    "design",
    "pattern",
    "implement",
    "migrate",
    "optimize",
    "restructure",
    "introduce",
    "decision",
];

const HIGH_IMPACT: &[&str] = &["major", "breaking", "architecture", "redesign", "overhaul"];
const MEDIUM_IMPACT: &[&str] = &["refactor", "enhance", "improve", "update"];

static RATIONALE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(?:why|because|reason)[:.]?[ \t]*([^\n]+)").expect("rationale regex"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DecisionKind {
    Refactoring,
    Architecture,
    Feature,
    Optimization,
    Migration,
    Cleanup,
    Other,
}

impl DecisionKind {
    /// Classification priority order
    pub const ALL: [DecisionKind; 7] = [
        DecisionKind::Refactoring,
        DecisionKind::Architecture,
        DecisionKind::Feature,
        DecisionKind::Optimization,
        DecisionKind::Migration,
        DecisionKind::Cleanup,
        DecisionKind::Other,
    ];

    pub fn keywords(&self) -> &'static [&'static str] {
        match self {
            DecisionKind::Refactoring => &["refactor", "restructure", "reorganize"],
            DecisionKind::Architecture => &["architecture", "design", "pattern"],
            DecisionKind::Feature => &["add", "implement", "introduce", "create"],
            DecisionKind::Optimization => &["optimize", "improve", "performance", "speed"],
            DecisionKind::Migration => &["migrate", "upgrade", "update"],
            DecisionKind::Cleanup => &["remove", "cleanup", "delete"],
            DecisionKind::Other => &[],
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DecisionKind::Refactoring => "refactoring",
            DecisionKind::Architecture => "architecture",
            DecisionKind::Feature => "feature",
            DecisionKind::Optimization => "optimization",
            DecisionKind::Migration => "migration",
            DecisionKind::Cleanup => "cleanup",
            DecisionKind::Other => "other",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            DecisionKind::Refactoring => "Refactoring",
            DecisionKind::Architecture => "Architecture",
            DecisionKind::Feature => "Feature",
            DecisionKind::Optimization => "Optimization",
            DecisionKind::Migration => "Migration",
            DecisionKind::Cleanup => "Cleanup",
            DecisionKind::Other => "Other",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Impact {
    High,
    Medium,
    Low,
}

impl Impact {
    pub fn as_str(&self) -> &'static str {
        match self {
            Impact::High => "high",
            Impact::Medium => "medium",
            Impact::Low => "low",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecisionRecord {
    pub id: String,
    pub date: String,
    pub subject: String,
    pub rationale: Option<String>,
    pub kind: DecisionKind,
    pub impact: Impact,
}

impl DecisionRecord {
    /// Token identifying this record inside a rendered document
    pub fn id_token(&self) -> String {
        format!("({})", self.id)
    }
}

fn contains_any(text: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|k| text.contains(k))
}

/// `text` must already be lower-cased
pub fn is_decision(text: &str) -> bool {
    contains_any(text, DECISION_KEYWORDS)
}

/// First matching group in priority order; `text` must be lower-cased
pub fn classify(text: &str) -> DecisionKind {
    DecisionKind::ALL
        .into_iter()
        .find(|kind| contains_any(text, kind.keywords()))
        .unwrap_or(DecisionKind::Other)
}

/// `text` must be lower-cased
pub fn assess_impact(text: &str) -> Impact {
    if contains_any(text, HIGH_IMPACT) {
        Impact::High
    } else if contains_any(text, MEDIUM_IMPACT) {
        Impact::Medium
    } else {
        Impact::Low
    }
}

/// Free text after a why/because/reason marker, body first, then subject
pub fn extract_rationale(subject: &str, body: &str) -> Option<String> {
    [body, subject].iter().find_map(|text| {
        RATIONALE
            .captures(text)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().trim().to_string())
            .filter(|s| !s.is_empty())
    })
}

/// Turn history entries into decision records, dropping non-decisions.
pub fn mine(entries: &[HistoryEntry]) -> Vec<DecisionRecord> {
    let mut records = Vec::new();
    for entry in entries {
        let text = format!("{} {}", entry.subject, entry.body).to_lowercase();
        if !is_decision(&text) {
            continue;
        }

        let id = if entry.hash.is_empty() {
            format!("D{:03}", records.len() + 1)
        } else {
            entry.hash.chars().take(8).collect()
        };

        records.push(DecisionRecord {
            id,
            date: entry.date.split_whitespace().next().unwrap_or("").to_string(),
            subject: entry.subject.clone(),
            rationale: extract_rationale(&entry.subject, &entry.body),
            kind: classify(&text),
            impact: assess_impact(&text),
        });
    }
    records
}

/// One decision as written into the decision log
pub fn render_entry(record: &DecisionRecord) -> String {
    let mut out = format!("**{}** {}\n", record.subject, record.id_token());
    out.push_str(&format!("- Date: {}\n", record.date));
    out.push_str(&format!("- Impact: {}\n", record.impact.as_str()));
    if let Some(rationale) = &record.rationale {
        out.push_str(&format!("- Rationale: {}\n", rationale));
    }
    out.push('\n');
    out
}

fn grouped(records: &[DecisionRecord]) -> impl Iterator<Item = (DecisionKind, Vec<&DecisionRecord>)> {
    DecisionKind::ALL.into_iter().filter_map(move |kind| {
        let group: Vec<&DecisionRecord> = records.iter().filter(|r| r.kind == kind).collect();
        (!group.is_empty()).then_some((kind, group))
    })
}

/// Body of the decision-log section, grouped by kind
pub fn render_log_section(records: &[DecisionRecord], at: DateTime<Local>) -> String {
    let mut out = format!("*Updated: {}*\n\n", at.format("%Y-%m-%d"));
    for (kind, group) in grouped(records) {
        out.push_str(&format!("### {}\n\n", kind.title()));
        for record in group {
            out.push_str(&render_entry(record));
        }
    }
    out
}

/// Entries for id-based merging, grouped the same way as the section body
pub fn log_entries(records: &[DecisionRecord]) -> Vec<(String, String)> {
    grouped(records)
        .flat_map(|(_, group)| group.into_iter().map(|r| (r.id_token(), render_entry(r))))
        .collect()
}

/// Full `auto-extracted-decisions.md` document, regenerated on every run
pub fn render_document(records: &[DecisionRecord], at: DateTime<Local>) -> String {
    let mut out = String::from("# Auto-Extracted Decisions from Git History\n\n");
    out.push_str(&format!("**Extracted**: {}\n\n", at.format("%Y-%m-%d %H:%M:%S")));

    if records.is_empty() {
        out.push_str("_No decisions found in the lookback window_\n\n");
    }
    for (kind, group) in grouped(records) {
        out.push_str(&format!("## {} Decisions\n\n", kind.title()));
        for record in group {
            out.push_str(&format!(
                "- **{}** {} - impact: {}\n",
                record.subject,
                record.id_token(),
                record.impact.as_str()
            ));
            out.push_str(&format!("  - Date: {}\n", record.date));
            if let Some(rationale) = &record.rationale {
                out.push_str(&format!("  - Rationale: {}\n", rationale));
            }
        }
        out.push('\n');
    }

    out.push_str("---\n*Auto-extracted by context-bank*\n");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn entry(hash: &str, subject: &str, body: &str) -> HistoryEntry {
        HistoryEntry::new(hash, "2026-03-01 10:00:00 +0100", subject, body)
    }

    #[test]
    fn test_refactor_with_rationale_in_subject() {
        let records = mine(&[entry(
            "0123456789abcdef",
            "refactor: restructure auth module — why: simplify testing",
            "",
        )]);

        assert_eq!(records.len(), 1);
        let record = &records[0];
        assert_eq!(record.kind, DecisionKind::Refactoring);
        assert_eq!(record.impact, Impact::Medium);
        assert_eq!(record.rationale.as_deref(), Some("simplify testing"));
        assert_eq!(record.id, "01234567");
        assert_eq!(record.date, "2026-03-01");
    }

    #[test]
    fn test_non_decisions_dropped() {
        let records = mine(&[entry("a1", "fix typo in readme", ""), entry("b2", "bump version", "")]);
        assert!(records.is_empty());
    }

    #[test]
    fn test_classification_priority() {
        assert_eq!(classify("refactor and add a design"), DecisionKind::Refactoring);
        assert_eq!(classify("new design pattern for add"), DecisionKind::Architecture);
        assert_eq!(classify("implement caching"), DecisionKind::Feature);
        assert_eq!(classify("optimize query speed"), DecisionKind::Optimization);
        assert_eq!(classify("migrate to postgres"), DecisionKind::Migration);
        assert_eq!(classify("cleanup old flags"), DecisionKind::Cleanup);
        assert_eq!(classify("decision recorded"), DecisionKind::Other);
    }

    #[test]
    fn test_impact_levels() {
        assert_eq!(assess_impact("breaking change to api"), Impact::High);
        assert_eq!(assess_impact("new architecture"), Impact::High);
        assert_eq!(assess_impact("improve logging"), Impact::Medium);
        assert_eq!(assess_impact("implement feature"), Impact::Low);
    }

    #[test]
    fn test_rationale_prefers_body() {
        let rationale = extract_rationale("refactor because subject", "Reason: body wins\nmore");
        assert_eq!(rationale.as_deref(), Some("body wins"));
        assert_eq!(extract_rationale("implement x", "no marker"), None);
    }

    #[test]
    fn test_sequential_ids_without_hash() {
        let records = mine(&[entry("", "implement a", ""), entry("", "fix", ""), entry("", "implement b", "")]);
        let ids: Vec<&str> = records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["D001", "D002"]);
    }

    #[test]
    fn test_render_log_section_groups_in_priority_order() {
        let records = mine(&[
            entry("aaaaaaaa11", "implement search", ""),
            entry("bbbbbbbb22", "refactor storage", "because it leaked"),
        ]);
        let at = Local.with_ymd_and_hms(2026, 3, 2, 8, 0, 0).unwrap();
        let body = render_log_section(&records, at);

        let refactor_pos = body.find("### Refactoring").unwrap();
        let feature_pos = body.find("### Feature").unwrap();
        assert!(refactor_pos < feature_pos);
        assert!(body.starts_with("*Updated: 2026-03-02*\n\n"));
        assert!(body.contains("**refactor storage** (bbbbbbbb)\n- Date: 2026-03-01\n- Impact: medium\n- Rationale: it leaked\n"));
    }

    #[test]
    fn test_log_entries_have_id_tokens() {
        let records = mine(&[entry("cccccccc33", "introduce cache", "")]);
        let entries = log_entries(&records);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].0, "(cccccccc)");
        assert!(entries[0].1.contains("(cccccccc)"));
    }

    #[test]
    fn test_render_document() {
        let at = Local.with_ymd_and_hms(2026, 3, 2, 8, 0, 0).unwrap();
        let doc = render_document(&mine(&[entry("dddddddd44", "migrate config", "")]), at);
        assert!(doc.contains("## Migration Decisions\n\n- **migrate config** (dddddddd) - impact: low\n"));

        let empty = render_document(&[], at);
        assert!(empty.contains("_No decisions found"));
    }
}
