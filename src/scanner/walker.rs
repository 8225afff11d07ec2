use std::collections::HashSet;
use std::path::{Path, PathBuf};

use ignore::WalkBuilder;

use crate::languages::LanguageRegistry;

/// Build and dependency directories never scanned
pub const DEFAULT_SKIP_DIRS: &[&str] = &[
    "node_modules",
    "dist",
    "build",
    "target",
    ".git",
    "vendor",
    "__pycache__",
    "memory-bank",
    ".memory-bank",
];

/// Extensions handled by the regex extractor only
pub const REGEX_ONLY_EXTENSIONS: &[&str] = &["c", "kt", "rb", "php", "swift", "scala"];

pub struct SourceWalker {
    registry: &'static LanguageRegistry,
    skip_dirs: HashSet<String>,
}

impl SourceWalker {
    pub fn new(registry: &'static LanguageRegistry, extra_skip_dirs: &[String]) -> Self {
        let skip_dirs = DEFAULT_SKIP_DIRS
            .iter()
            .map(|d| d.to_string())
            .chain(extra_skip_dirs.iter().cloned())
            .collect();
        Self { registry, skip_dirs }
    }

    /// Allowlisted source files under `root`, sorted by path.
    pub fn walk(&self, root: &Path) -> Vec<PathBuf> {
        let skip_dirs = self.skip_dirs.clone();

        let walker = WalkBuilder::new(root)
            .hidden(true)
            .git_ignore(true)
            .git_global(true)
            .git_exclude(true)
            .ignore(true)
            .filter_entry(move |entry| {
                let is_dir = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);
                !(is_dir && entry.depth() > 0 && skip_dirs.contains(entry.file_name().to_string_lossy().as_ref()))
            })
            .build();

        let mut files = Vec::new();
        for entry in walker {
            match entry {
                Ok(entry) => {
                    let path = entry.path();
                    if path.is_file() && self.is_supported(path) {
                        files.push(path.to_path_buf());
                    }
                }
                Err(e) => tracing::debug!("skipping unreadable entry: {}", e),
            }
        }

        files.sort();
        files
    }

    pub fn is_supported(&self, path: &Path) -> bool {
        self.registry.get_for_file(path).is_some() || is_regex_only(path)
    }
}

pub fn is_regex_only(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| REGEX_ONLY_EXTENSIONS.contains(&ext))
        .unwrap_or(false)
}
