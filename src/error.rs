use thiserror::Error;

#[derive(Error, Debug)]
pub enum BankError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(#[from] toml::de::Error),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Context store not found under {0}")]
    StoreNotFound(String),

    #[error("Project '{0}' not found in multi-project store")]
    ProjectNotFound(String),

    #[error("Project name required for multi-project store (available: {})", .available.join(", "))]
    ProjectRequired { available: Vec<String> },

    #[error("Operation requires a multi-project store")]
    NotMultiProject,
}

impl BankError {
    /// Setup failures abort a run before any extraction starts.
    pub fn is_setup_failure(&self) -> bool {
        matches!(
            self,
            BankError::StoreNotFound(_)
                | BankError::ProjectNotFound(_)
                | BankError::ProjectRequired { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, BankError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_setup_failures() {
        assert!(BankError::StoreNotFound("/tmp/x".to_string()).is_setup_failure());
        assert!(BankError::ProjectNotFound("api".to_string()).is_setup_failure());
        assert!(BankError::ProjectRequired { available: vec![] }.is_setup_failure());
        assert!(!BankError::NotMultiProject.is_setup_failure());
        assert!(!BankError::Parse("x".to_string()).is_setup_failure());
    }

    #[test]
    fn test_project_required_lists_available() {
        let err = BankError::ProjectRequired {
            available: vec!["api".to_string(), "web".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "Project name required for multi-project store (available: api, web)"
        );
    }
}
