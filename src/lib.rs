pub mod config;
pub mod error;
pub mod health;
pub mod hierarchy;
pub mod languages;
pub mod locator;
pub mod maintenance;
pub mod miner;
pub mod scanner;
pub mod store;

use once_cell::sync::Lazy;

pub use config::BankConfig;
pub use error::{BankError, Result};
pub use health::{HealthReport, HealthScorer, HealthStatus, StructureValidator, ValidationReport};
pub use hierarchy::{HierarchyLink, HierarchyMap, RepoEntry, SetupApproach, SetupSuggestion};
pub use languages::{LanguageGrammar, LanguageRegistry};
pub use locator::{IgnorePatterns, RepositoryLocator, RepositoryRoot};
pub use maintenance::{Maintenance, RunSummary};
pub use miner::{DecisionKind, DecisionRecord, GitHistory, HistoryEntry, HistorySource, Impact, PitfallRecord};
pub use scanner::{PatternKind, PatternRecord, PatternScanner, ScanResult};
pub use store::{ContextStore, Section, StoreShape};

/// Global language registry instance (lazily initialized)
pub static REGISTRY: Lazy<LanguageRegistry> = Lazy::new(LanguageRegistry::new);
