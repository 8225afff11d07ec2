//! Parent/child inference over located repositories.
//!
//! A repository's parent is the nearest located root that strictly contains
//! it; its children are the located roots whose parent it is.

pub mod link;

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::config::BankConfig;
use crate::error::Result;
use crate::locator::{RepositoryLocator, RepositoryRoot};
use crate::store::{self, StoreShape, HIERARCHY_FILE};

pub use link::{link_child_stores, relative_path, HierarchyLink};

/// One located repository in the hierarchy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoEntry {
    /// Path relative to the scan root, `.` for the root itself
    pub path: String,
    pub absolute_path: PathBuf,
    pub has_memory_bank: bool,
    pub memory_bank_type: Option<StoreShape>,
    pub depth: usize,
    pub children: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HierarchyMap {
    pub root: PathBuf,
    pub repos: Vec<RepoEntry>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SetupApproach {
    SingleRepo,
    DistributedHierarchical,
    None,
}

impl SetupApproach {
    pub fn as_str(&self) -> &'static str {
        match self {
            SetupApproach::SingleRepo => "single-repo",
            SetupApproach::DistributedHierarchical => "distributed-hierarchical",
            SetupApproach::None => "none",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetupSuggestion {
    pub approach: SetupApproach,
    pub actions: Vec<String>,
}

impl HierarchyMap {
    /// Locate repositories under `root` and classify them.
    pub fn detect(root: &Path, config: &BankConfig) -> Result<Self> {
        let root = root.canonicalize()?;
        let locator = RepositoryLocator::from_config(&root, &config.locator)?;
        let roots = locator.locate(&root)?;
        tracing::info!("found {} repositories under {}", roots.len(), root.display());
        Ok(Self::build(&root, &roots, &config.store.dir_names))
    }

    /// Build the map from already located roots.
    pub fn build(root: &Path, roots: &[RepositoryRoot], dir_names: &[String]) -> Self {
        let repos = roots
            .iter()
            .map(|repo| {
                let memory_bank_type = StoreShape::detect(&repo.path, dir_names);
                let children = roots
                    .iter()
                    .filter(|other| {
                        nearest_enclosing(roots, &other.path).map(|p| &p.path) == Some(&repo.path)
                    })
                    .map(RepositoryRoot::display_path)
                    .collect();

                RepoEntry {
                    path: repo.display_path(),
                    absolute_path: repo.path.clone(),
                    has_memory_bank: memory_bank_type.is_some(),
                    memory_bank_type,
                    depth: repo.depth,
                    children,
                }
            })
            .collect();

        Self {
            root: root.to_path_buf(),
            repos,
        }
    }

    /// First repository at the minimum depth
    pub fn root_like(&self) -> Option<&RepoEntry> {
        let min_depth = self.repos.iter().map(|r| r.depth).min()?;
        self.repos.iter().find(|r| r.depth == min_depth)
    }

    pub fn get(&self, path: &str) -> Option<&RepoEntry> {
        self.repos.iter().find(|r| r.path == path)
    }

    /// Nearest repository that lists `path` as a child
    pub fn parent_of(&self, path: &str) -> Option<&RepoEntry> {
        self.repos
            .iter()
            .find(|r| r.children.iter().any(|c| c == path))
    }

    pub fn with_store_count(&self) -> usize {
        self.repos.iter().filter(|r| r.has_memory_bank).count()
    }

    pub fn suggest_setup(&self) -> SetupSuggestion {
        let mut actions = Vec::new();

        let approach = match self.repos.as_slice() {
            [only] => {
                if !only.has_memory_bank {
                    actions.push("Set up a context store in the repository".to_string());
                }
                SetupApproach::SingleRepo
            }
            [first, ..] if first.depth == 0 => {
                for repo in self.repos.iter().filter(|r| !r.has_memory_bank) {
                    let label = if repo.path == "." { "root" } else { repo.path.as_str() };
                    actions.push(format!("Set up a context store in {}", label));
                }
                if self.with_store_count() > 1 {
                    actions.push("Consider adding hierarchy links between context stores".to_string());
                }
                SetupApproach::DistributedHierarchical
            }
            _ => SetupApproach::None,
        };

        SetupSuggestion { approach, actions }
    }

    /// Write the map as pretty JSON.
    ///
    /// Without an explicit `output` the map goes into the depth-0 store, or
    /// `<scan root>/hierarchy.json` when the scan root owns no store.
    pub fn save(&self, output: Option<&Path>, dir_names: &[String]) -> Result<PathBuf> {
        let path = match output {
            Some(path) => path.to_path_buf(),
            None => self
                .repos
                .iter()
                .filter(|r| r.depth == 0 && r.has_memory_bank)
                .find_map(|r| store::find_store_dir(&r.absolute_path, dir_names))
                .map(|dir| dir.join(HIERARCHY_FILE))
                .unwrap_or_else(|| self.root.join(HIERARCHY_FILE)),
        };

        let json = serde_json::to_string_pretty(self)?;
        store::writer::overwrite(&path, &json)?;
        tracing::info!("hierarchy map saved to {}", path.display());
        Ok(path)
    }
}

/// Located root with the longest path strictly containing `path`
fn nearest_enclosing<'a>(roots: &'a [RepositoryRoot], path: &Path) -> Option<&'a RepositoryRoot> {
    roots
        .iter()
        .filter(|candidate| candidate.path != path && path.starts_with(&candidate.path))
        .max_by_key(|candidate| candidate.path.components().count())
}
