//! Repository discovery.
//!
//! Finds version-control roots (directories holding a `.git` entry) below a
//! scan root, bounded by a maximum depth and filtered by ignore patterns.

pub mod patterns;

use std::path::{Path, PathBuf};

use serde::Serialize;
use walkdir::{DirEntry, WalkDir};

use crate::config::LocatorConfig;
use crate::error::Result;

pub use patterns::{IgnorePatterns, IgnoreRule};

const GIT_DIR: &str = ".git";

/// A discovered repository root
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepositoryRoot {
    pub path: PathBuf,
    pub relative: PathBuf,
    pub depth: usize,
}

impl RepositoryRoot {
    /// Relative path for display, `.` for the scan root itself
    pub fn display_path(&self) -> String {
        let rel = patterns::normalize(&self.relative);
        if rel.is_empty() {
            ".".to_string()
        } else {
            rel
        }
    }
}

pub struct RepositoryLocator {
    max_depth: usize,
    ignore: IgnorePatterns,
}

impl RepositoryLocator {
    pub fn new(max_depth: usize, ignore: IgnorePatterns) -> Self {
        Self { max_depth, ignore }
    }

    /// Locator for `root` with the ignore file named in `config`
    pub fn from_config(root: &Path, config: &LocatorConfig) -> Result<Self> {
        let ignore = IgnorePatterns::load(root, &config.ignore_file)?;
        Ok(Self::new(config.max_depth, ignore))
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// All repository roots under `root`, sorted by path.
    pub fn locate(&self, root: &Path) -> Result<Vec<RepositoryRoot>> {
        let root = root.canonicalize()?;
        let mut roots = Vec::new();

        let walker = WalkDir::new(&root)
            .max_depth(self.max_depth)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| self.should_descend(&root, entry));

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::debug!("skipping unreadable entry: {}", e);
                    continue;
                }
            };

            if !entry.path().join(GIT_DIR).exists() {
                continue;
            }

            let relative = entry.path().strip_prefix(&root).unwrap_or(Path::new("")).to_path_buf();
            if self.ignore.is_ignored(&relative) {
                tracing::debug!("ignoring repository {}", entry.path().display());
                continue;
            }

            roots.push(RepositoryRoot {
                path: entry.path().to_path_buf(),
                relative,
                depth: entry.depth(),
            });
        }

        roots.sort_by(|a, b| a.path.cmp(&b.path));
        roots.dedup_by(|a, b| a.path == b.path);
        Ok(roots)
    }

    fn should_descend(&self, root: &Path, entry: &DirEntry) -> bool {
        if entry.depth() == 0 {
            return true;
        }
        if !entry.file_type().is_dir() || entry.file_name() == GIT_DIR {
            return false;
        }
        match entry.path().strip_prefix(root) {
            Ok(relative) => !self.ignore.prunes(relative),
            Err(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn make_repo(root: &Path, rel: &str) {
        fs::create_dir_all(root.join(rel).join(".git")).unwrap();
    }

    fn rel_paths(roots: &[RepositoryRoot]) -> Vec<String> {
        roots.iter().map(|r| r.display_path()).collect()
    }

    fn locator(max_depth: usize, patterns: &[&str]) -> RepositoryLocator {
        RepositoryLocator::new(max_depth, IgnorePatterns::new(patterns.iter().copied()))
    }

    #[test]
    fn test_locate_vendor_ignored() {
        let temp_dir = TempDir::new().unwrap();
        make_repo(temp_dir.path(), ".");
        make_repo(temp_dir.path(), "svc-a");
        make_repo(temp_dir.path(), "svc-a/vendor");

        let roots = locator(3, &["vendor/"]).locate(temp_dir.path()).unwrap();
        assert_eq!(rel_paths(&roots), vec![".", "svc-a"]);
    }

    #[test]
    fn test_locate_respects_max_depth() {
        let temp_dir = TempDir::new().unwrap();
        make_repo(temp_dir.path(), "a");
        make_repo(temp_dir.path(), "a/b");
        make_repo(temp_dir.path(), "a/b/c");

        let roots = locator(2, &[]).locate(temp_dir.path()).unwrap();
        assert_eq!(rel_paths(&roots), vec!["a", "a/b"]);
        assert!(roots.iter().all(|r| r.depth <= 2));
    }

    #[test]
    fn test_locate_depth_zero_only_root() {
        let temp_dir = TempDir::new().unwrap();
        make_repo(temp_dir.path(), ".");
        make_repo(temp_dir.path(), "child");

        let roots = locator(0, &[]).locate(temp_dir.path()).unwrap();
        assert_eq!(rel_paths(&roots), vec!["."]);
        assert_eq!(roots[0].depth, 0);
    }

    #[test]
    fn test_locate_skips_git_internals() {
        let temp_dir = TempDir::new().unwrap();
        make_repo(temp_dir.path(), ".");
        fs::create_dir_all(temp_dir.path().join(".git/modules/sub/.git")).unwrap();

        let roots = locator(5, &[]).locate(temp_dir.path()).unwrap();
        assert_eq!(rel_paths(&roots), vec!["."]);
    }

    #[test]
    fn test_locate_git_file_counts_as_root() {
        let temp_dir = TempDir::new().unwrap();
        fs::create_dir_all(temp_dir.path().join("worktree")).unwrap();
        fs::write(temp_dir.path().join("worktree/.git"), "gitdir: ../.git/worktrees/x\n").unwrap();

        let roots = locator(3, &[]).locate(temp_dir.path()).unwrap();
        assert_eq!(rel_paths(&roots), vec!["worktree"]);
    }

    #[test]
    fn test_locate_ignores_node_modules_by_default() {
        let temp_dir = TempDir::new().unwrap();
        make_repo(temp_dir.path(), "web");
        make_repo(temp_dir.path(), "web/node_modules/pkg");

        let roots = locator(4, &[]).locate(temp_dir.path()).unwrap();
        assert_eq!(rel_paths(&roots), vec!["web"]);
    }

    #[test]
    fn test_locate_glob_does_not_prune_descendants() {
        let temp_dir = TempDir::new().unwrap();
        make_repo(temp_dir.path(), "legacy-x");
        make_repo(temp_dir.path(), "legacy-x/inner");

        let roots = locator(3, &["legacy-?"]).locate(temp_dir.path()).unwrap();
        assert_eq!(rel_paths(&roots), vec!["legacy-x", "legacy-x/inner"]);

        let roots = locator(3, &["legacy-*"]).locate(temp_dir.path()).unwrap();
        assert!(roots.is_empty());
    }

    #[test]
    fn test_locate_sorted_and_absolute() {
        let temp_dir = TempDir::new().unwrap();
        make_repo(temp_dir.path(), "zeta");
        make_repo(temp_dir.path(), "alpha");

        let roots = locator(2, &[]).locate(temp_dir.path()).unwrap();
        assert_eq!(rel_paths(&roots), vec!["alpha", "zeta"]);
        assert!(roots.iter().all(|r| r.path.is_absolute()));
    }

    #[test]
    fn test_locate_missing_root_is_error() {
        let temp_dir = TempDir::new().unwrap();
        assert!(locator(2, &[]).locate(&temp_dir.path().join("missing")).is_err());
    }
}
