use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::config::HealthConfig;
use crate::store::{ContextStore, Section, StoreShape, ACTIVE_DOCS, SHARED_PATTERNS_DOC};

/// Required context documents and their maximum age in days
pub const CONTEXT_SCHEDULE: &[(&str, f64)] = &[
    ("projectBrief.md", 90.0),
    ("productContext.md", 30.0),
    ("systemPatterns.md", 14.0),
    ("techContext.md", 30.0),
];

pub const STALE_PENALTY: i32 = 10;
pub const UNDERSIZED_PENALTY: i32 = 15;
pub const MISSING_PENALTY: i32 = 25;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentHealth {
    pub exists: bool,
    pub age_days: Option<f64>,
    pub size_bytes: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthStatus {
    Healthy,
    NeedsAttention,
    Critical,
}

impl HealthStatus {
    pub fn from_score(score: u32) -> Self {
        if score > 80 {
            HealthStatus::Healthy
        } else if score > 50 {
            HealthStatus::NeedsAttention
        } else {
            HealthStatus::Critical
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            HealthStatus::Healthy => "healthy",
            HealthStatus::NeedsAttention => "needs_attention",
            HealthStatus::Critical => "critical",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthReport {
    pub timestamp: String,
    pub structure: StoreShape,
    pub project: String,
    pub context_files: BTreeMap<String, DocumentHealth>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shared_patterns_age_days: Option<f64>,
    pub recommendations: Vec<String>,
    pub overall_health: u32,
    pub status: HealthStatus,
}

/// File age and size as of `now`
struct FileState {
    age_days: f64,
    size_bytes: u64,
}

fn file_state(path: &Path, now: DateTime<Local>) -> Option<FileState> {
    let metadata = match std::fs::metadata(path) {
        Ok(metadata) => metadata,
        Err(e) => {
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::debug!("cannot stat {}: {}", path.display(), e);
            }
            return None;
        }
    };
    let modified: DateTime<Local> = metadata.modified().ok()?.into();
    let age_ms = (now - modified).num_milliseconds().max(0);
    Some(FileState {
        age_days: age_ms as f64 / 86_400_000.0,
        size_bytes: metadata.len(),
    })
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

pub struct HealthScorer {
    config: HealthConfig,
}

impl HealthScorer {
    pub fn new(config: HealthConfig) -> Self {
        Self { config }
    }

    /// Score the store's documents as of `now`.
    pub fn check(&self, store: &ContextStore, now: DateTime<Local>) -> HealthReport {
        let mut score: i32 = 100;
        let mut recommendations = Vec::new();
        let mut context_files = BTreeMap::new();
        let mut shared_patterns_age_days = None;

        if let Some(shared) = store.shared_dir() {
            if let Some(state) = file_state(&shared.join(SHARED_PATTERNS_DOC), now) {
                shared_patterns_age_days = Some(round1(state.age_days));
                if state.age_days > self.config.shared_max_age_days {
                    recommendations.push(format!(
                        "Review shared/{} - last updated {:.0} days ago",
                        SHARED_PATTERNS_DOC, state.age_days
                    ));
                }
            }
        }

        for (name, max_age_days) in CONTEXT_SCHEDULE {
            let path = store.document(Section::Context, name);
            let health = match file_state(&path, now) {
                Some(state) => {
                    if state.age_days > *max_age_days {
                        recommendations.push(format!("Update {} - last modified {:.0} days ago", name, state.age_days));
                        score -= STALE_PENALTY;
                    }
                    if state.size_bytes < self.config.min_size_bytes {
                        recommendations.push(format!("Expand {} - only {} bytes", name, state.size_bytes));
                        score -= UNDERSIZED_PENALTY;
                    }
                    DocumentHealth {
                        exists: true,
                        age_days: Some(round1(state.age_days)),
                        size_bytes: state.size_bytes,
                    }
                }
                None => {
                    recommendations.push(format!("Create {} - required context file missing", name));
                    score -= MISSING_PENALTY;
                    DocumentHealth {
                        exists: false,
                        age_days: None,
                        size_bytes: 0,
                    }
                }
            };
            context_files.insert(name.to_string(), health);
        }

        for name in ACTIVE_DOCS {
            if let Some(state) = file_state(&store.document(Section::Active, name), now) {
                let age_hours = state.age_days * 24.0;
                if age_hours > self.config.active_stale_hours {
                    recommendations.push(format!("Review {} - inactive for {:.0} hours", name, age_hours));
                }
            }
        }

        let overall_health = score.clamp(0, 100) as u32;
        tracing::info!("health score for {}: {}", store.project_label(), overall_health);

        HealthReport {
            timestamp: now.to_rfc3339(),
            structure: store.shape(),
            project: store.project_label(),
            context_files,
            shared_patterns_age_days,
            recommendations,
            overall_health,
            status: HealthStatus::from_score(overall_health),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StoreConfig;
    use chrono::Duration;
    use std::fs;
    use tempfile::TempDir;

    const FULL_DOC: &str = "# Context\n\nThis document has enough content to count as complete.\n\
                            It is comfortably over the one hundred byte minimum used by the scorer.\n";

    fn single_store(dir: &TempDir) -> ContextStore {
        fs::create_dir_all(dir.path().join(".memory-bank/context")).unwrap();
        ContextStore::open(dir.path(), None, &StoreConfig::default()).unwrap()
    }

    fn write_context(store: &ContextStore, name: &str, content: &str) {
        fs::write(store.document(Section::Context, name), content).unwrap();
    }

    fn scorer() -> HealthScorer {
        HealthScorer::new(HealthConfig::default())
    }

    #[test]
    fn test_all_fresh_documents_score_100() {
        let temp_dir = TempDir::new().unwrap();
        let store = single_store(&temp_dir);
        for (name, _) in CONTEXT_SCHEDULE {
            write_context(&store, name, FULL_DOC);
        }

        let report = scorer().check(&store, Local::now());
        assert_eq!(report.overall_health, 100);
        assert_eq!(report.status, HealthStatus::Healthy);
        assert!(report.recommendations.is_empty());
        assert_eq!(report.project, "single");
    }

    #[test]
    fn test_small_document_costs_15() {
        let temp_dir = TempDir::new().unwrap();
        let store = single_store(&temp_dir);
        for (name, _) in CONTEXT_SCHEDULE {
            write_context(&store, name, FULL_DOC);
        }
        write_context(&store, "techContext.md", "short");

        let report = scorer().check(&store, Local::now());
        assert_eq!(report.overall_health, 85);
        assert_eq!(report.recommendations, vec!["Expand techContext.md - only 5 bytes".to_string()]);
        assert_eq!(report.context_files["techContext.md"].size_bytes, 5);
    }

    #[test]
    fn test_missing_documents_clamped_at_zero() {
        let temp_dir = TempDir::new().unwrap();
        let store = single_store(&temp_dir);

        let report = scorer().check(&store, Local::now());
        assert_eq!(report.overall_health, 0);
        assert_eq!(report.status, HealthStatus::Critical);
        assert_eq!(report.recommendations.len(), 4);
        assert!(report.recommendations[0].starts_with("Create projectBrief.md"));
        assert!(!report.context_files["projectBrief.md"].exists);
    }

    #[test]
    fn test_stale_documents() {
        let temp_dir = TempDir::new().unwrap();
        let store = single_store(&temp_dir);
        for (name, _) in CONTEXT_SCHEDULE {
            write_context(&store, name, FULL_DOC);
        }

        // 20 days: only systemPatterns.md (14) is stale
        let report = scorer().check(&store, Local::now() + Duration::days(20));
        assert_eq!(report.overall_health, 90);
        assert!(report.recommendations[0].starts_with("Update systemPatterns.md - last modified 20 days ago"));

        // 100 days: all four are stale
        let report = scorer().check(&store, Local::now() + Duration::days(100));
        assert_eq!(report.overall_health, 60);
        assert_eq!(report.status, HealthStatus::NeedsAttention);
    }

    #[test]
    fn test_score_monotonic_in_removed_documents() {
        let temp_dir = TempDir::new().unwrap();
        let store = single_store(&temp_dir);
        for (name, _) in CONTEXT_SCHEDULE {
            write_context(&store, name, FULL_DOC);
        }

        let mut last = scorer().check(&store, Local::now()).overall_health;
        for (name, _) in CONTEXT_SCHEDULE {
            fs::remove_file(store.document(Section::Context, name)).unwrap();
            let score = scorer().check(&store, Local::now()).overall_health;
            assert!(score <= last);
            last = score;
        }
    }

    #[test]
    fn test_inactive_active_documents_do_not_change_score() {
        let temp_dir = TempDir::new().unwrap();
        let store = single_store(&temp_dir);
        for (name, _) in CONTEXT_SCHEDULE {
            write_context(&store, name, FULL_DOC);
        }
        fs::create_dir_all(store.section_dir(Section::Active)).unwrap();
        fs::write(store.document(Section::Active, "tasks.md"), FULL_DOC).unwrap();

        let report = scorer().check(&store, Local::now() + Duration::hours(50));
        assert_eq!(report.overall_health, 100);
        assert_eq!(report.recommendations, vec!["Review tasks.md - inactive for 50 hours".to_string()]);
    }

    #[test]
    fn test_shared_patterns_age_in_multi_project() {
        let temp_dir = TempDir::new().unwrap();
        let bank = temp_dir.path().join(".memory-bank");
        fs::create_dir_all(bank.join("shared")).unwrap();
        fs::create_dir_all(bank.join("api/context")).unwrap();
        fs::write(bank.join("shared/patterns.md"), "# Shared\n").unwrap();

        let store = ContextStore::open(temp_dir.path(), Some("api"), &StoreConfig::default()).unwrap();
        let report = scorer().check(&store, Local::now() + Duration::days(31));

        assert_eq!(report.project, "api");
        assert_eq!(report.structure, StoreShape::MultiProject);
        assert!(report.shared_patterns_age_days.unwrap() >= 31.0);
        assert!(report.recommendations[0].starts_with("Review shared/patterns.md - last updated 31 days ago"));
    }

    #[test]
    fn test_report_serialization() {
        let temp_dir = TempDir::new().unwrap();
        let store = single_store(&temp_dir);
        let report = scorer().check(&store, Local::now());

        let json: serde_json::Value = serde_json::to_value(&report).unwrap();
        assert_eq!(json["structure"], "single-project");
        assert_eq!(json["status"], "critical");
        assert!(json["context_files"]["techContext.md"]["age_days"].is_null());
        assert!(json.get("shared_patterns_age_days").is_none());
    }
}
