//! Settings for a context-bank run.
//!
//! Settings live in an optional `context-bank.toml` next to the repository
//! (or scan) root. Every key has a default, so a missing file or a partial
//! file is fine.

use serde::Deserialize;
use std::path::Path;
use tracing::info;

use crate::error::Result;

/// Default settings file name
pub const CONFIG_FILENAME: &str = "context-bank.toml";

/// Environment variable that overrides `store.default_project`
pub const PROJECT_ENV: &str = "CONTEXT_BANK_PROJECT";

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct BankConfig {
    pub store: StoreConfig,
    pub locator: LocatorConfig,
    pub scanner: ScannerConfig,
    pub miner: MinerConfig,
    pub health: HealthConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct StoreConfig {
    /// Candidate store directory names, first existing wins
    pub dir_names: Vec<String>,
    /// Project used for multi-project stores when none is given
    pub default_project: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct LocatorConfig {
    pub max_depth: usize,
    pub ignore_file: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ScannerConfig {
    /// Directories skipped in addition to the built-in list
    pub extra_skip_dirs: Vec<String>,
    /// Files per category listed in the summary
    pub top_n: usize,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct MinerConfig {
    pub lookback_days: u32,
    /// Append decisions whose id is not yet in the log instead of
    /// skipping the whole section once it exists
    pub remerge_by_id: bool,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct HealthConfig {
    pub min_size_bytes: u64,
    pub active_stale_hours: f64,
    pub shared_max_age_days: f64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            dir_names: vec![".memory-bank".into(), "memory-bank".into()],
            default_project: None,
        }
    }
}

impl Default for LocatorConfig {
    fn default() -> Self {
        Self {
            max_depth: 3,
            ignore_file: "memory-bank-ignore".into(),
        }
    }
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            extra_skip_dirs: Vec::new(),
            top_n: 5,
        }
    }
}

impl Default for MinerConfig {
    fn default() -> Self {
        Self {
            lookback_days: 30,
            remerge_by_id: false,
        }
    }
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            min_size_bytes: 100,
            active_stale_hours: 48.0,
            shared_max_age_days: 30.0,
        }
    }
}

impl BankConfig {
    /// Load `context-bank.toml` from `root`, falling back to defaults.
    pub fn load(root: &Path) -> Result<Self> {
        Self::load_from(root.join(CONFIG_FILENAME))
    }

    /// Load from a specific path, then apply env var overrides.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut config = if path.exists() {
            let contents = std::fs::read_to_string(path)?;
            Self::parse(&contents)?
        } else {
            info!("no config file at {}, using defaults", path.display());
            BankConfig::default()
        };

        config.apply_env_overrides();
        Ok(config)
    }

    pub fn parse(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var(PROJECT_ENV) {
            if !val.trim().is_empty() {
                self.store.default_project = Some(val);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = BankConfig::default();
        assert_eq!(config.locator.max_depth, 3);
        assert_eq!(config.locator.ignore_file, "memory-bank-ignore");
        assert_eq!(config.scanner.top_n, 5);
        assert_eq!(config.miner.lookback_days, 30);
        assert!(!config.miner.remerge_by_id);
        assert_eq!(config.health.min_size_bytes, 100);
        assert_eq!(config.store.dir_names[0], ".memory-bank");
    }

    #[test]
    fn test_parse_partial_file() {
        let config = BankConfig::parse(
            r#"
[locator]
max_depth = 5

[miner]
remerge_by_id = true
"#,
        )
        .unwrap();

        assert_eq!(config.locator.max_depth, 5);
        assert_eq!(config.locator.ignore_file, "memory-bank-ignore");
        assert!(config.miner.remerge_by_id);
        assert_eq!(config.miner.lookback_days, 30);
        assert_eq!(config.scanner.top_n, 5);
    }

    #[test]
    fn test_parse_invalid_toml() {
        assert!(BankConfig::parse("[locator\nmax_depth = ").is_err());
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config = BankConfig::load(temp_dir.path()).unwrap();
        assert_eq!(config.locator.max_depth, 3);
    }

    #[test]
    fn test_load_from_file() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(
            temp_dir.path().join(CONFIG_FILENAME),
            "[scanner]\ntop_n = 3\nextra_skip_dirs = [\"generated\"]\n",
        )
        .unwrap();

        let config = BankConfig::load(temp_dir.path()).unwrap();
        assert_eq!(config.scanner.top_n, 3);
        assert_eq!(config.scanner.extra_skip_dirs, vec!["generated".to_string()]);
    }
}
