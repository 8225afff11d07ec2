//! Upkeep tasks over one opened context store.

use chrono::{DateTime, Local};
use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::config::BankConfig;
use crate::error::{BankError, Result};
use crate::health::{HealthReport, HealthScorer, StructureValidator, ValidationReport};
use crate::miner::{decisions, pitfalls, DecisionRecord, GitHistory, HistorySource, PitfallRecord};
use crate::scanner::{report, PatternScanner, ScanResult};
use crate::store::writer::{self, MergeOutcome};
use crate::store::{
    ContextStore, Section, AUTO_DECISIONS_DOC, DECISION_LOG_DOC, HEALTH_REPORT_FILE, PATTERNS_DIR, PROGRESS_DOC,
    SHARED_PATTERNS_DOC, SYSTEM_PATTERNS_DOC,
};
use crate::REGISTRY;

const SHARED_PATTERNS_PREAMBLE: &str = "# Shared Patterns\n\nPatterns that are reusable across multiple projects.\n";

#[derive(Debug, Clone, Serialize)]
pub struct ScanOutcome {
    pub result: ScanResult,
    pub batch_path: PathBuf,
    pub summary_path: PathBuf,
    pub context_section: Option<MergeOutcome>,
    pub suggest_shared: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct PitfallOutcome {
    pub records: Vec<PitfallRecord>,
    pub section: Option<MergeOutcome>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DecisionOutcome {
    pub records: Vec<DecisionRecord>,
    pub document_path: PathBuf,
    /// Entries written to the decision log in this run
    pub logged: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub validation: ValidationReport,
    pub scan: ScanOutcome,
    pub pitfalls: PitfallOutcome,
    pub decisions: DecisionOutcome,
    pub health: HealthReport,
}

pub struct Maintenance<H: HistorySource = GitHistory> {
    store: ContextStore,
    config: BankConfig,
    history: H,
}

impl Maintenance<GitHistory> {
    /// Open the store of the repository at `root` with git-backed history.
    pub fn open(root: &Path, project: Option<&str>, config: BankConfig) -> Result<Self> {
        let store = ContextStore::open(root, project, &config.store)?;
        let history = GitHistory::new(store.repo_root());
        tracing::info!(
            "opened {} store at {} (project: {})",
            store.shape().as_str(),
            store.store_dir().display(),
            store.project_label()
        );
        Ok(Self { store, config, history })
    }
}

impl<H: HistorySource> Maintenance<H> {
    pub fn new(store: ContextStore, config: BankConfig, history: H) -> Self {
        Self { store, config, history }
    }

    /// Replace the history source.
    pub fn with_history<H2: HistorySource>(self, history: H2) -> Maintenance<H2> {
        Maintenance {
            store: self.store,
            config: self.config,
            history,
        }
    }

    pub fn store(&self) -> &ContextStore {
        &self.store
    }

    pub fn config(&self) -> &BankConfig {
        &self.config
    }

    fn system_patterns_doc(&self) -> PathBuf {
        self.store.document(Section::Context, SYSTEM_PATTERNS_DOC)
    }

    /// Scan the owning repository and record the discovered patterns.
    pub fn scan_patterns(&self, now: DateTime<Local>) -> Result<ScanOutcome> {
        let scanner = PatternScanner::new(&REGISTRY, &self.config.scanner);
        let result = scanner.scan(self.store.repo_root());
        let top_n = self.config.scanner.top_n;

        let patterns_dir = self.store.section_dir(Section::Technical).join(PATTERNS_DIR);
        let batch_path = writer::write_batch(
            &patterns_dir,
            report::BATCH_PREFIX,
            "json",
            &report::render_batch(&result, now)?,
            now,
        )?;

        let summary_path = patterns_dir.join(report::SUMMARY_FILE);
        writer::overwrite(&summary_path, &report::render_summary(&result, top_n, now))?;

        let context_section = match report::render_context_section(&result, top_n, now) {
            Some(body) => Some(writer::insert_section_if_absent(
                &self.system_patterns_doc(),
                report::CONTEXT_MARKER,
                &body,
            )?),
            None => None,
        };

        let suggest_shared = self.store.is_multi_project() && result.looks_reusable();
        if suggest_shared {
            tracing::info!("some patterns might be suitable for shared/{}", SHARED_PATTERNS_DOC);
        }

        Ok(ScanOutcome {
            result,
            batch_path,
            summary_path,
            context_section,
            suggest_shared,
        })
    }

    /// Record issue/solution pairs from the progress log as anti-patterns.
    pub fn extract_pitfalls(&self) -> Result<PitfallOutcome> {
        let progress = self.store.document(Section::Active, PROGRESS_DOC);
        let content = match std::fs::read_to_string(&progress) {
            Ok(content) => content,
            Err(e) => {
                tracing::debug!("no progress log at {}: {}", progress.display(), e);
                return Ok(PitfallOutcome {
                    records: Vec::new(),
                    section: None,
                });
            }
        };

        let records = pitfalls::extract(&content);
        tracing::info!("extracted {} pitfalls", records.len());

        let section = if records.is_empty() {
            None
        } else {
            Some(writer::insert_section_if_absent(
                &self.system_patterns_doc(),
                pitfalls::ANTI_PATTERNS_MARKER,
                &pitfalls::render_section(&records),
            )?)
        };

        Ok(PitfallOutcome { records, section })
    }

    /// Mine history for decisions and record them in the decision log.
    pub fn extract_decisions(&self, now: DateTime<Local>) -> Result<DecisionOutcome> {
        let entries = self.history.entries_since(self.config.miner.lookback_days);
        let records = decisions::mine(&entries);
        tracing::info!("found {} decisions in {} history entries", records.len(), entries.len());

        let document_path = self.store.document(Section::Decisions, AUTO_DECISIONS_DOC);
        writer::overwrite(&document_path, &decisions::render_document(&records, now))?;

        let mut logged = 0;
        if !records.is_empty() {
            let log = self.store.document(Section::Decisions, DECISION_LOG_DOC);
            let body = decisions::render_log_section(&records, now);
            logged = if self.config.miner.remerge_by_id {
                writer::merge_entries_by_id(&log, decisions::LOG_MARKER, &body, &decisions::log_entries(&records))?
            } else {
                match writer::insert_section_if_absent(&log, decisions::LOG_MARKER, &body)? {
                    MergeOutcome::Inserted => records.len(),
                    MergeOutcome::AlreadyPresent => 0,
                }
            };
        }

        Ok(DecisionOutcome {
            records,
            document_path,
            logged,
        })
    }

    /// Score the store and overwrite its health report.
    pub fn check_health(&self, now: DateTime<Local>) -> Result<HealthReport> {
        let report = HealthScorer::new(self.config.health.clone()).check(&self.store, now);
        let path = self.store.project_dir().join(HEALTH_REPORT_FILE);
        writer::overwrite(&path, &serde_json::to_string_pretty(&report)?)?;
        Ok(report)
    }

    pub fn validate_structure(&self, now: DateTime<Local>) -> ValidationReport {
        StructureValidator::new().validate(&self.store, now)
    }

    /// Append a dated section to the shared patterns document.
    pub fn promote_to_shared(&self, kind: &str, content: &str, now: DateTime<Local>) -> Result<PathBuf> {
        let shared = self.store.shared_dir().ok_or(BankError::NotMultiProject)?;
        let path = shared.join(SHARED_PATTERNS_DOC);
        let section = format!("## {}\n*Added: {}*\n\n{}\n", kind, now.format("%Y-%m-%d"), content.trim_end());
        writer::append_with_preamble(&path, SHARED_PATTERNS_PREAMBLE, &section)?;
        tracing::info!("promoted '{}' to {}", kind, path.display());
        Ok(path)
    }

    /// Every task in sequence.
    pub fn run_all(&self, now: DateTime<Local>) -> Result<RunSummary> {
        let validation = self.validate_structure(now);
        let scan = self.scan_patterns(now)?;
        let pitfalls = self.extract_pitfalls()?;
        let decisions = self.extract_decisions(now)?;
        let health = self.check_health(now)?;

        Ok(RunSummary {
            validation,
            scan,
            pitfalls,
            decisions,
            health,
        })
    }
}
