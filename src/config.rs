//! Engine configuration
//!
//! Loaded from a JSON file; every field is optional. Example:
//!
//! ```json
//! { "min_base_size": 30, "warn_base_size": 100, "parallel": true }
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::executor::BaseSizePolicy;
use crate::observability::Severity;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EngineConfig {
    /// Bases below this get the strong warning (default 30)
    #[serde(default = "default_min_base_size")]
    pub min_base_size: usize,

    /// Bases below this get the mild warning (default 100)
    #[serde(default = "default_warn_base_size")]
    pub warn_base_size: usize,

    /// Separator of multi-choice cells (default ";")
    #[serde(default = "default_delimiter")]
    pub multi_choice_delimiter: String,

    /// Run cuts on the rayon pool (default false)
    #[serde(default)]
    pub parallel: bool,

    /// Minimum log severity: trace, info, warn or error (default "info")
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_min_base_size() -> usize {
    30
}
fn default_warn_base_size() -> usize {
    100
}
fn default_delimiter() -> String {
    ";".to_string()
}
fn default_log_level() -> String {
    "info".to_string()
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            min_base_size: default_min_base_size(),
            warn_base_size: default_warn_base_size(),
            multi_choice_delimiter: default_delimiter(),
            parallel: false,
            log_level: default_log_level(),
        }
    }
}

impl EngineConfig {
    /// Load configuration from file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&content)
    }

    /// Parse and validate configuration text
    pub fn from_json_str(content: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_base_size > self.warn_base_size {
            return Err(ConfigError::Invalid(format!(
                "min_base_size ({}) must not exceed warn_base_size ({})",
                self.min_base_size, self.warn_base_size
            )));
        }

        if self.multi_choice_delimiter.is_empty() {
            return Err(ConfigError::Invalid(
                "multi_choice_delimiter must not be empty".into(),
            ));
        }

        if Severity::parse(&self.log_level).is_none() {
            return Err(ConfigError::Invalid(format!(
                "unknown log_level '{}'",
                self.log_level
            )));
        }

        Ok(())
    }

    pub fn base_size_policy(&self) -> BaseSizePolicy {
        BaseSizePolicy::new(self.min_base_size, self.warn_base_size)
    }

    /// Parsed log level; unknown names fall back to INFO
    pub fn severity(&self) -> Severity {
        Severity::parse(&self.log_level).unwrap_or(Severity::Info)
    }
}
