use std::path::{Path, PathBuf};
use std::process::Command;

const FIELD_SEP: char = '\u{1f}';
const RECORD_SEP: char = '\u{1e}';

/// One entry of version-control history
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    pub hash: String,
    pub date: String,
    pub subject: String,
    pub body: String,
}

impl HistoryEntry {
    pub fn new(hash: &str, date: &str, subject: &str, body: &str) -> Self {
        Self {
            hash: hash.to_string(),
            date: date.to_string(),
            subject: subject.to_string(),
            body: body.to_string(),
        }
    }
}

/// Source of history entries newer than a lookback window
pub trait HistorySource {
    fn entries_since(&self, lookback_days: u32) -> Vec<HistoryEntry>;
}

/// History read from `git log` in a repository
pub struct GitHistory {
    repo_path: PathBuf,
}

impl GitHistory {
    pub fn new(repo_path: impl AsRef<Path>) -> Self {
        Self {
            repo_path: repo_path.as_ref().to_path_buf(),
        }
    }
}

impl HistorySource for GitHistory {
    fn entries_since(&self, lookback_days: u32) -> Vec<HistoryEntry> {
        let output = Command::new("git")
            .arg("log")
            .arg(format!("--since={} days ago", lookback_days))
            .arg("--pretty=format:%H%x1f%ai%x1f%s%x1f%b%x1e")
            .current_dir(&self.repo_path)
            .output();

        let output = match output {
            Ok(output) => output,
            Err(e) => {
                tracing::warn!("failed to run git log: {}", e);
                return Vec::new();
            }
        };

        if !output.status.success() {
            tracing::warn!(
                "git log exited with {} in {}",
                output.status,
                self.repo_path.display()
            );
            return Vec::new();
        }

        parse_log_output(&String::from_utf8_lossy(&output.stdout))
    }
}

/// Parse `git log` output written with unit/record separators.
pub fn parse_log_output(stdout: &str) -> Vec<HistoryEntry> {
    stdout
        .split(RECORD_SEP)
        .filter_map(|record| {
            let record = record.trim_start_matches(['\n', '\r']);
            if record.trim().is_empty() {
                return None;
            }
            let mut fields = record.splitn(4, FIELD_SEP);
            let hash = fields.next()?.trim();
            let date = fields.next()?.trim();
            let subject = fields.next()?.trim();
            let body = fields.next().unwrap_or("").trim();
            Some(HistoryEntry::new(hash, date, subject, body))
        })
        .collect()
}
