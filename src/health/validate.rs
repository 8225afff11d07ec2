use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::store::{ContextStore, Section, StoreShape, MODE_DOCS, SHARED_DIR};

pub const MODES_DIR: &str = "custom_modes";
pub const SCRIPTS_DIR: &str = "scripts";
pub const BOOTSTRAP_DOC: &str = "BOOTSTRAP.md";
pub const STARTER_PROMPT_DOC: &str = "starter-prompt.md";

const PRESENT: &str = "✓";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub timestamp: String,
    pub structure_type: StoreShape,
    pub project: String,
    pub valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub structure: BTreeMap<String, String>,
    pub summary: String,
}

impl ValidationReport {
    fn summarize(&mut self) {
        self.summary = match (self.errors.len(), self.warnings.len()) {
            (0, 0) => "Structure is valid and complete".to_string(),
            (0, w) => format!("Structure valid with {} warning(s)", w),
            (e, w) => format!("Structure invalid: {} error(s), {} warning(s)", e, w),
        };
    }
}

/// A directory that must exist and the documents expected inside it
struct RequiredDir {
    label: String,
    path: PathBuf,
    docs: &'static [&'static str],
}

/// Checks a store's directory layout
#[derive(Default)]
pub struct StructureValidator;

impl StructureValidator {
    pub fn new() -> Self {
        Self
    }

    fn required_dirs(&self, store: &ContextStore) -> Vec<RequiredDir> {
        let store_dir = store.store_dir();
        let at_store = |name: &str, docs: &'static [&'static str]| RequiredDir {
            label: name.to_string(),
            path: store_dir.join(name),
            docs,
        };

        match store.shape() {
            StoreShape::SingleProject => {
                let mut dirs: Vec<RequiredDir> = Section::ALL
                    .iter()
                    .map(|section| at_store(section.dir_name(), section.required_docs()))
                    .collect();
                dirs.push(at_store(MODES_DIR, MODE_DOCS));
                dirs.push(at_store(SCRIPTS_DIR, &[]));
                dirs
            }
            StoreShape::MultiProject => {
                let mut dirs = vec![
                    at_store(MODES_DIR, &[]),
                    at_store(SHARED_DIR, &[]),
                    at_store(SCRIPTS_DIR, &[]),
                ];
                if let Some(project) = store.project_name() {
                    dirs.extend(Section::ALL.iter().map(|section| RequiredDir {
                        label: format!("{}/{}", project, section.dir_name()),
                        path: store.section_dir(*section),
                        docs: section.required_docs(),
                    }));
                }
                dirs
            }
        }
    }

    /// Validate the layout of `store` as of `now`.
    pub fn validate(&self, store: &ContextStore, now: DateTime<Local>) -> ValidationReport {
        let mut report = ValidationReport {
            timestamp: now.to_rfc3339(),
            structure_type: store.shape(),
            project: store.project_label(),
            valid: true,
            errors: Vec::new(),
            warnings: Vec::new(),
            structure: BTreeMap::new(),
            summary: String::new(),
        };

        for dir in self.required_dirs(store) {
            if !dir.path.is_dir() {
                report.errors.push(format!("Missing required directory: {}/", dir.label));
                report.valid = false;
                continue;
            }
            report.structure.insert(dir.label.clone(), PRESENT.to_string());

            for doc in dir.docs {
                if !dir.path.join(doc).exists() {
                    report.warnings.push(format!("Missing {} in {}/", doc, dir.label));
                }
            }
        }

        check_document(&mut report, &store.store_dir().join(BOOTSTRAP_DOC), BOOTSTRAP_DOC);
        check_document(&mut report, &store.repo_root().join(STARTER_PROMPT_DOC), STARTER_PROMPT_DOC);

        report.summarize();
        tracing::info!("{}", report.summary);
        report
    }
}

fn check_document(report: &mut ValidationReport, path: &Path, label: &str) {
    if path.exists() {
        report.structure.insert(label.to_string(), PRESENT.to_string());
    } else {
        report.warnings.push(format!("Missing {}", label));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StoreConfig;
    use crate::store::{ACTIVE_DOCS, CONTEXT_DOCS, DECISION_LOG_DOC};
    use std::fs;
    use tempfile::TempDir;

    fn touch(path: &Path) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, "x").unwrap();
    }

    fn complete_single(root: &Path) {
        let bank = root.join(".memory-bank");
        for doc in CONTEXT_DOCS {
            touch(&bank.join("context").join(doc));
        }
        for doc in ACTIVE_DOCS {
            touch(&bank.join("active").join(doc));
        }
        touch(&bank.join("decisions").join(DECISION_LOG_DOC));
        for doc in MODE_DOCS {
            touch(&bank.join("custom_modes").join(doc));
        }
        for dir in ["technical", "qa", "scripts"] {
            fs::create_dir_all(bank.join(dir)).unwrap();
        }
        touch(&bank.join(BOOTSTRAP_DOC));
        touch(&root.join(STARTER_PROMPT_DOC));
    }

    fn validate(root: &Path, project: Option<&str>) -> ValidationReport {
        let store = ContextStore::open(root, project, &StoreConfig::default()).unwrap();
        StructureValidator::new().validate(&store, Local::now())
    }

    #[test]
    fn test_complete_single_project() {
        let temp_dir = TempDir::new().unwrap();
        complete_single(temp_dir.path());

        let report = validate(temp_dir.path(), None);
        assert!(report.valid);
        assert!(report.errors.is_empty());
        assert!(report.warnings.is_empty());
        assert_eq!(report.summary, "Structure is valid and complete");
        assert_eq!(report.structure.get("context").map(String::as_str), Some("✓"));
    }

    #[test]
    fn test_missing_directory_is_one_error() {
        let temp_dir = TempDir::new().unwrap();
        complete_single(temp_dir.path());
        fs::remove_dir_all(temp_dir.path().join(".memory-bank/qa")).unwrap();

        let report = validate(temp_dir.path(), None);
        assert!(!report.valid);
        assert_eq!(report.errors, vec!["Missing required directory: qa/".to_string()]);
        assert_eq!(report.summary, "Structure invalid: 1 error(s), 0 warning(s)");
    }

    #[test]
    fn test_missing_document_is_warning() {
        let temp_dir = TempDir::new().unwrap();
        complete_single(temp_dir.path());
        fs::remove_file(temp_dir.path().join(".memory-bank/active/tasks.md")).unwrap();
        fs::remove_file(temp_dir.path().join(STARTER_PROMPT_DOC)).unwrap();

        let report = validate(temp_dir.path(), None);
        assert!(report.valid);
        assert_eq!(
            report.warnings,
            vec!["Missing tasks.md in active/".to_string(), "Missing starter-prompt.md".to_string()]
        );
        assert_eq!(report.summary, "Structure valid with 2 warning(s)");
    }

    #[test]
    fn test_multi_project_layout() {
        let temp_dir = TempDir::new().unwrap();
        let bank = temp_dir.path().join(".memory-bank");
        for dir in ["shared", "custom_modes", "scripts", "api/context", "api/active", "api/technical", "api/qa"] {
            fs::create_dir_all(bank.join(dir)).unwrap();
        }
        touch(&bank.join(BOOTSTRAP_DOC));
        touch(&temp_dir.path().join(STARTER_PROMPT_DOC));

        let report = validate(temp_dir.path(), Some("api"));
        assert!(!report.valid);
        assert_eq!(report.errors, vec!["Missing required directory: api/decisions/".to_string()]);
        assert!(report.warnings.contains(&"Missing projectBrief.md in api/context/".to_string()));
        assert_eq!(report.structure.get("shared").map(String::as_str), Some("✓"));
        assert_eq!(report.project, "api");
    }
}
