//! Lexical pattern discovery over a repository's source files.
//!
//! Files with a registered grammar go through [`SyntaxExtractor`]; the
//! remaining allowlisted extensions, and files whose syntax tree has errors, go
//! through [`RegexExtractor`]. Every file is also counted for error-handling
//! and API-call tokens.

pub mod extractor;
pub mod parser;
pub mod report;
pub mod walker;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::config::ScannerConfig;
use crate::languages::LanguageRegistry;

pub use extractor::{LineIndex, PatternExtractor, RegexExtractor, SyntaxExtractor};
pub use walker::SourceWalker;

static ERROR_TOKENS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"try|catch|throw|Error|Exception").expect("error token regex"));

static API_TOKENS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)fetch|axios|request|api|endpoint").expect("api token regex"));

/// Scans with more records than this suggest promoting to shared patterns
pub const REUSABLE_THRESHOLD: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PatternKind {
    UtilityFunction,
    ReusableClass,
    ErrorConstruct,
    ApiConstruct,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternRecord {
    pub name: String,
    pub file: String,
    pub line: usize,
    pub kind: PatternKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileCount {
    pub file: String,
    pub count: usize,
}

/// Flat record list plus per-file counts for each category
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanResult {
    pub files_scanned: usize,
    pub records: Vec<PatternRecord>,
    #[serde(default)]
    pub utility_counts: Vec<FileCount>,
    #[serde(default)]
    pub class_counts: Vec<FileCount>,
    pub error_counts: Vec<FileCount>,
    pub api_counts: Vec<FileCount>,
}

impl ScanResult {
    pub fn of_kind(&self, kind: PatternKind) -> impl Iterator<Item = &PatternRecord> {
        self.records.iter().filter(move |r| r.kind == kind)
    }

    pub fn counts(&self, kind: PatternKind) -> &[FileCount] {
        match kind {
            PatternKind::UtilityFunction => &self.utility_counts,
            PatternKind::ReusableClass => &self.class_counts,
            PatternKind::ErrorConstruct => &self.error_counts,
            PatternKind::ApiConstruct => &self.api_counts,
        }
    }

    /// The `n` files with the highest count for `kind`
    pub fn top_files(&self, kind: PatternKind, n: usize) -> Vec<&FileCount> {
        top_files(self.counts(kind), n)
    }

    pub fn top_error_files(&self, n: usize) -> Vec<&FileCount> {
        top_files(&self.error_counts, n)
    }

    pub fn top_api_files(&self, n: usize) -> Vec<&FileCount> {
        top_files(&self.api_counts, n)
    }

    pub fn looks_reusable(&self) -> bool {
        self.records.len() > REUSABLE_THRESHOLD
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty() && self.error_counts.is_empty() && self.api_counts.is_empty()
    }
}

/// Highest counts first, ties broken by path
fn top_files(counts: &[FileCount], n: usize) -> Vec<&FileCount> {
    let mut sorted: Vec<&FileCount> = counts.iter().collect();
    sorted.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.file.cmp(&b.file)));
    sorted.truncate(n);
    sorted
}

/// Per-file result of [`PatternScanner::scan_source`]
#[derive(Debug, Clone, Default)]
pub struct FileScan {
    pub records: Vec<PatternRecord>,
    pub error_count: usize,
    pub api_count: usize,
}

pub struct PatternScanner {
    registry: &'static LanguageRegistry,
    walker: SourceWalker,
    fallback: RegexExtractor,
}

impl PatternScanner {
    pub fn new(registry: &'static LanguageRegistry, config: &ScannerConfig) -> Self {
        Self {
            registry,
            walker: SourceWalker::new(registry, &config.extra_skip_dirs),
            fallback: RegexExtractor::new(),
        }
    }

    /// Scan every allowlisted file under `root`.
    pub fn scan(&self, root: &Path) -> ScanResult {
        let mut result = ScanResult::default();

        for path in self.walker.walk(root) {
            let source = match std::fs::read_to_string(&path) {
                Ok(source) => source,
                Err(e) => {
                    tracing::debug!("skipping {}: {}", path.display(), e);
                    continue;
                }
            };

            let relative = display_relative(root, &path);
            let scan = self.scan_source(&source, &path, &relative);

            result.files_scanned += 1;
            let utilities = scan.records.iter().filter(|r| r.kind == PatternKind::UtilityFunction).count();
            let classes = scan.records.iter().filter(|r| r.kind == PatternKind::ReusableClass).count();
            if utilities > 0 {
                result.utility_counts.push(FileCount {
                    file: relative.clone(),
                    count: utilities,
                });
            }
            if classes > 0 {
                result.class_counts.push(FileCount {
                    file: relative.clone(),
                    count: classes,
                });
            }
            result.records.extend(scan.records);
            if scan.error_count > 0 {
                result.error_counts.push(FileCount {
                    file: relative.clone(),
                    count: scan.error_count,
                });
            }
            if scan.api_count > 0 {
                result.api_counts.push(FileCount {
                    file: relative,
                    count: scan.api_count,
                });
            }
        }

        tracing::info!(
            "scanned {} files: {} pattern records",
            result.files_scanned,
            result.records.len()
        );
        result
    }

    /// Extract records and token counts from one file's text.
    pub fn scan_source(&self, source: &str, path: &Path, relative: &str) -> FileScan {
        let mut records = match self.registry.get_for_file(path) {
            Some(grammar) => match SyntaxExtractor::new(grammar).extract(source, relative) {
                Ok(records) => records,
                Err(e) => {
                    tracing::debug!("syntax extraction failed for {} ({}), using regex", relative, e);
                    self.regex_records(source, relative)
                }
            },
            None => self.regex_records(source, relative),
        };

        let error_count = count_construct(source, &ERROR_TOKENS, relative, PatternKind::ErrorConstruct, "error handling constructs", &mut records);
        let api_count = count_construct(source, &API_TOKENS, relative, PatternKind::ApiConstruct, "API-related patterns", &mut records);

        FileScan {
            records,
            error_count,
            api_count,
        }
    }

    fn regex_records(&self, source: &str, relative: &str) -> Vec<PatternRecord> {
        self.fallback.extract(source, relative).unwrap_or_default()
    }
}

/// Count `tokens` in `source`; a file with any match gets one construct record.
fn count_construct(
    source: &str,
    tokens: &Regex,
    relative: &str,
    kind: PatternKind,
    label: &str,
    records: &mut Vec<PatternRecord>,
) -> usize {
    let mut matches = tokens.find_iter(source);
    let Some(first) = matches.next() else {
        return 0;
    };
    let count = 1 + matches.count();

    records.push(PatternRecord {
        name: first.as_str().to_string(),
        file: relative.to_string(),
        line: LineIndex::new(source).line_of(first.start()),
        kind,
        description: Some(format!("{} {}", count, label)),
    });
    count
}

fn display_relative(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().to_string())
        .collect::<Vec<_>>()
        .join("/")
}
