//! Link documents that point a child store at its hierarchy root.

use serde::{Deserialize, Serialize};
use std::path::{Component, Path, PathBuf};

use super::HierarchyMap;
use crate::error::Result;
use crate::store::{self, StoreShape, HIERARCHY_FILE, SHARED_DIR};

pub const LINK_VERSION: &str = "2.1";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentProject {
    pub path: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: StoreShape,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParentLink {
    pub path: String,
    pub memory_bank_path: String,
    pub relationship: String,
    pub inherit_conventions: bool,
    pub inherit_patterns: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternResolution {
    pub strategy: String,
    pub inherit_from_parent: Vec<String>,
    pub override_in_child: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkReferences {
    pub parent_patterns: String,
    pub parent_conventions: String,
}

/// Contents of `<child store>/hierarchy.json`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HierarchyLink {
    pub version: String,
    pub current_project: CurrentProject,
    pub parent: ParentLink,
    pub pattern_resolution: PatternResolution,
    pub references: LinkReferences,
}

impl HierarchyLink {
    /// Link from a child store to the store named `parent_store_name`
    /// inside the repository at `rel_to_parent`.
    pub fn between(child_name: &str, child_shape: StoreShape, rel_to_parent: &str, parent_store_name: &str) -> Self {
        let parent_store = format!("{}/{}", rel_to_parent, parent_store_name);

        Self {
            version: LINK_VERSION.to_string(),
            current_project: CurrentProject {
                path: ".".to_string(),
                name: child_name.to_string(),
                kind: child_shape,
            },
            parent: ParentLink {
                path: rel_to_parent.to_string(),
                memory_bank_path: parent_store.clone(),
                relationship: "subdirectory".to_string(),
                inherit_conventions: true,
                inherit_patterns: "if_not_exists".to_string(),
            },
            pattern_resolution: PatternResolution {
                strategy: "child_first".to_string(),
                inherit_from_parent: vec!["conventions".to_string(), "shared_patterns".to_string()],
                override_in_child: vec!["project_patterns".to_string(), "technical_patterns".to_string()],
            },
            references: LinkReferences {
                parent_patterns: format!("{}/{}/patterns.md", parent_store, SHARED_DIR),
                parent_conventions: format!("{}/{}/conventions.md", parent_store, SHARED_DIR),
            },
        }
    }
}

/// `/`-joined relative path leading from directory `from` to `to`.
///
/// Both paths must be absolute and normalized; returns `.` when equal.
pub fn relative_path(from: &Path, to: &Path) -> String {
    let from: Vec<Component> = from.components().collect();
    let to: Vec<Component> = to.components().collect();
    let common = from.iter().zip(&to).take_while(|(a, b)| a == b).count();

    let mut parts: Vec<String> = std::iter::repeat("..".to_string())
        .take(from.len() - common)
        .collect();
    parts.extend(to[common..].iter().map(|c| c.as_os_str().to_string_lossy().to_string()));

    if parts.is_empty() {
        ".".to_string()
    } else {
        parts.join("/")
    }
}

/// Write a link into every non-root repository store that has none yet.
///
/// The link target is the root-like repository of `map`. Returns the paths
/// of the link documents written.
pub fn link_child_stores(map: &HierarchyMap, dir_names: &[String]) -> Result<Vec<PathBuf>> {
    let Some(target) = map.root_like() else {
        return Ok(Vec::new());
    };

    let parent_store_name = store::find_store_dir(&target.absolute_path, dir_names)
        .and_then(|dir| dir.file_name().map(|n| n.to_string_lossy().to_string()))
        .or_else(|| dir_names.first().cloned())
        .unwrap_or_else(|| ".memory-bank".to_string());

    let mut written = Vec::new();
    for repo in map.repos.iter().filter(|r| r.absolute_path != target.absolute_path) {
        let Some(store_dir) = store::find_store_dir(&repo.absolute_path, dir_names) else {
            continue;
        };

        let link_path = store_dir.join(HIERARCHY_FILE);
        if link_path.exists() {
            tracing::debug!("link already present in {}", store_dir.display());
            continue;
        }

        let name = repo
            .absolute_path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| repo.path.clone());
        let shape = repo.memory_bank_type.unwrap_or(StoreShape::SingleProject);
        let rel = relative_path(&repo.absolute_path, &target.absolute_path);

        let link = HierarchyLink::between(&name, shape, &rel, &parent_store_name);
        store::writer::overwrite(&link_path, &serde_json::to_string_pretty(&link)?)?;
        tracing::info!("linked {} to {}", repo.path, target.path);
        written.push(link_path);
    }

    Ok(written)
}
