//! Context store layout and project selection.
//!
//! A store is a directory (`.memory-bank` by default) inside a repository.
//! It is multi-project exactly when it has a `shared/` directory; each
//! project then lives in its own sub-directory next to `shared/`.

pub mod writer;

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::config::StoreConfig;
use crate::error::{BankError, Result};

pub use writer::MergeOutcome;

pub const SHARED_DIR: &str = "shared";

/// Store-level directories that are never projects
pub const RESERVED_DIRS: &[&str] = &[SHARED_DIR, "custom_modes", "scripts"];

pub const CONTEXT_DOCS: &[&str] = &[
    "projectBrief.md",
    "productContext.md",
    "systemPatterns.md",
    "techContext.md",
];
pub const ACTIVE_DOCS: &[&str] = &["activeContext.md", "tasks.md", "progress.md"];
pub const MODE_DOCS: &[&str] = &[
    "van_instructions.md",
    "plan_instructions.md",
    "implement_instructions.md",
    "reflect_instructions.md",
];

pub const SYSTEM_PATTERNS_DOC: &str = "systemPatterns.md";
pub const PROGRESS_DOC: &str = "progress.md";
pub const DECISION_LOG_DOC: &str = "log.md";
pub const AUTO_DECISIONS_DOC: &str = "auto-extracted-decisions.md";
pub const SHARED_PATTERNS_DOC: &str = "patterns.md";
pub const HEALTH_REPORT_FILE: &str = "health-report.json";
pub const HIERARCHY_FILE: &str = "hierarchy.json";
pub const PATTERNS_DIR: &str = "patterns";

/// Shape of a context store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StoreShape {
    SingleProject,
    MultiProject,
}

impl StoreShape {
    pub fn as_str(&self) -> &'static str {
        match self {
            StoreShape::SingleProject => "single-project",
            StoreShape::MultiProject => "multi-project",
        }
    }

    /// Shape of an existing store directory
    pub fn of_store(store_dir: &Path) -> Self {
        if store_dir.join(SHARED_DIR).is_dir() {
            StoreShape::MultiProject
        } else {
            StoreShape::SingleProject
        }
    }

    /// Shape of the store owned by `repo_root`, `None` if it has no store
    pub fn detect(repo_root: &Path, dir_names: &[String]) -> Option<Self> {
        find_store_dir(repo_root, dir_names).map(|dir| Self::of_store(&dir))
    }
}

/// Per-project sections
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Context,
    Active,
    Technical,
    Decisions,
    Qa,
}

impl Section {
    pub const ALL: [Section; 5] = [
        Section::Context,
        Section::Active,
        Section::Technical,
        Section::Decisions,
        Section::Qa,
    ];

    pub fn dir_name(&self) -> &'static str {
        match self {
            Section::Context => "context",
            Section::Active => "active",
            Section::Technical => "technical",
            Section::Decisions => "decisions",
            Section::Qa => "qa",
        }
    }

    /// Documents every project is expected to have in this section
    pub fn required_docs(&self) -> &'static [&'static str] {
        match self {
            Section::Context => CONTEXT_DOCS,
            Section::Active => ACTIVE_DOCS,
            Section::Decisions => &[DECISION_LOG_DOC],
            Section::Technical | Section::Qa => &[],
        }
    }
}

/// First existing store directory under `repo_root`
pub fn find_store_dir(repo_root: &Path, dir_names: &[String]) -> Option<PathBuf> {
    dir_names
        .iter()
        .map(|name| repo_root.join(name))
        .find(|dir| dir.is_dir())
}

/// Project directories of a multi-project store, sorted by name
pub fn list_projects(store_dir: &Path) -> Result<Vec<String>> {
    let mut projects = Vec::new();
    for entry in std::fs::read_dir(store_dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_dir() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().to_string();
        if name.starts_with('.') || RESERVED_DIRS.contains(&name.as_str()) {
            continue;
        }
        projects.push(name);
    }
    projects.sort();
    Ok(projects)
}

/// An opened context store with its working project resolved
#[derive(Debug, Clone)]
pub struct ContextStore {
    repo_root: PathBuf,
    store_dir: PathBuf,
    shape: StoreShape,
    project: Option<String>,
    project_dir: PathBuf,
}

impl ContextStore {
    /// Open the store owned by `repo_root`.
    ///
    /// For multi-project stores the project is `project`, else the
    /// configured default. A store without any project directories works
    /// on the store root.
    pub fn open(repo_root: &Path, project: Option<&str>, config: &StoreConfig) -> Result<Self> {
        let store_dir = find_store_dir(repo_root, &config.dir_names)
            .ok_or_else(|| BankError::StoreNotFound(repo_root.display().to_string()))?;
        let shape = StoreShape::of_store(&store_dir);

        let (project, project_dir) = match shape {
            StoreShape::SingleProject => (None, store_dir.clone()),
            StoreShape::MultiProject => {
                let requested = project
                    .map(str::to_string)
                    .or_else(|| config.default_project.clone());
                match requested {
                    Some(name) => {
                        let dir = store_dir.join(&name);
                        if RESERVED_DIRS.contains(&name.as_str()) || !dir.is_dir() {
                            return Err(BankError::ProjectNotFound(name));
                        }
                        (Some(name), dir)
                    }
                    None => {
                        let available = list_projects(&store_dir)?;
                        if !available.is_empty() {
                            return Err(BankError::ProjectRequired { available });
                        }
                        (None, store_dir.clone())
                    }
                }
            }
        };

        Ok(Self {
            repo_root: repo_root.to_path_buf(),
            store_dir,
            shape,
            project,
            project_dir,
        })
    }

    pub fn repo_root(&self) -> &Path {
        &self.repo_root
    }

    pub fn store_dir(&self) -> &Path {
        &self.store_dir
    }

    pub fn shape(&self) -> StoreShape {
        self.shape
    }

    pub fn is_multi_project(&self) -> bool {
        self.shape == StoreShape::MultiProject
    }

    pub fn project_name(&self) -> Option<&str> {
        self.project.as_deref()
    }

    /// Project label used in reports ("single" for single-project stores)
    pub fn project_label(&self) -> String {
        match (&self.shape, &self.project) {
            (StoreShape::SingleProject, _) => "single".to_string(),
            (StoreShape::MultiProject, Some(name)) => name.clone(),
            (StoreShape::MultiProject, None) => "root".to_string(),
        }
    }

    pub fn project_dir(&self) -> &Path {
        &self.project_dir
    }

    pub fn shared_dir(&self) -> Option<PathBuf> {
        self.is_multi_project().then(|| self.store_dir.join(SHARED_DIR))
    }

    pub fn section_dir(&self, section: Section) -> PathBuf {
        self.project_dir.join(section.dir_name())
    }

    pub fn document(&self, section: Section, name: &str) -> PathBuf {
        self.section_dir(section).join(name)
    }
}
