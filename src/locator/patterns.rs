//! Ignore patterns for repository discovery.
//!
//! Each line of the ignore file is one of three forms:
//! - `dir/` matches when the directory appears as a whole path segment
//!   sequence anywhere in the relative path
//! - a pattern containing `*` is an fnmatch-style glob over the relative path
//! - anything else matches as a plain substring

use std::path::Path;

use glob::Pattern;

use crate::error::Result;

/// Patterns that are always ignored
pub const BUILTIN_PATTERNS: &[&str] = &[".git/", "node_modules/", "__pycache__/"];

#[derive(Debug, Clone)]
pub enum IgnoreRule {
    Directory(Vec<String>),
    Glob(Pattern),
    Substring(String),
}

impl IgnoreRule {
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }

        if let Some(dir) = raw.strip_suffix('/') {
            let segments: Vec<String> = dir
                .trim_start_matches("./")
                .split('/')
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect();
            if segments.is_empty() {
                return None;
            }
            return Some(IgnoreRule::Directory(segments));
        }

        if raw.contains('*') {
            match Pattern::new(raw) {
                Ok(pattern) => return Some(IgnoreRule::Glob(pattern)),
                Err(e) => {
                    tracing::warn!("invalid glob '{}' ({}), matching as substring", raw, e);
                }
            }
        }

        Some(IgnoreRule::Substring(raw.to_string()))
    }

    /// `relative` uses `/` separators and no leading `./`
    pub fn matches(&self, relative: &str) -> bool {
        match self {
            IgnoreRule::Directory(dir) => {
                let segments: Vec<&str> = relative.split('/').filter(|s| !s.is_empty()).collect();
                segments.len() >= dir.len()
                    && segments
                        .windows(dir.len())
                        .any(|window| window.iter().zip(dir).all(|(a, b)| *a == b.as_str()))
            }
            IgnoreRule::Glob(pattern) => pattern.matches(relative),
            IgnoreRule::Substring(needle) => relative.contains(needle.as_str()),
        }
    }

    /// Evaluation priority: directory rules, then globs, then substrings
    fn priority(&self) -> u8 {
        match self {
            IgnoreRule::Directory(_) => 0,
            IgnoreRule::Glob(_) => 1,
            IgnoreRule::Substring(_) => 2,
        }
    }

    /// Whether every descendant of a matching path also matches
    pub fn covers_subtree(&self) -> bool {
        !matches!(self, IgnoreRule::Glob(_))
    }
}

#[derive(Debug, Clone, Default)]
pub struct IgnorePatterns {
    rules: Vec<IgnoreRule>,
}

impl IgnorePatterns {
    /// Build from user patterns; built-in patterns are appended.
    pub fn new<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let rules = patterns
            .into_iter()
            .filter_map(|p| IgnoreRule::parse(p.as_ref()))
            .chain(BUILTIN_PATTERNS.iter().filter_map(|p| IgnoreRule::parse(p)))
            .collect();
        Self { rules }
    }

    /// Pattern lines of an ignore file, without blanks and `#` comments
    pub fn parse_lines(content: &str) -> Vec<String> {
        content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .map(str::to_string)
            .collect()
    }

    /// Load `<root>/<file_name>`; a missing file yields only the built-ins.
    pub fn load(root: &Path, file_name: &str) -> Result<Self> {
        let path = root.join(file_name);
        if !path.exists() {
            return Ok(Self::new(Vec::<String>::new()));
        }
        let content = std::fs::read_to_string(&path)?;
        let lines = Self::parse_lines(&content);
        tracing::debug!("loaded {} ignore patterns from {}", lines.len(), path.display());
        Ok(Self::new(lines))
    }

    /// Rule deciding `relative`: directory rules are tried first, then
    /// globs, then substrings; file order breaks ties within a form.
    pub fn matched_rule(&self, relative: &Path) -> Option<&IgnoreRule> {
        let relative = normalize(relative);
        if relative.is_empty() {
            return None;
        }
        self.rules
            .iter()
            .filter(|rule| rule.matches(&relative))
            .min_by_key(|rule| rule.priority())
    }

    pub fn is_ignored(&self, relative: &Path) -> bool {
        self.matched_rule(relative).is_some()
    }

    /// Whether the walk may skip the whole subtree under `relative`
    pub fn prunes(&self, relative: &Path) -> bool {
        self.matched_rule(relative)
            .map(IgnoreRule::covers_subtree)
            .unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// `/`-joined normal components of a relative path
pub fn normalize(relative: &Path) -> String {
    relative
        .components()
        .filter_map(|c| match c {
            std::path::Component::Normal(s) => Some(s.to_string_lossy().to_string()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}
