//! Pagination configuration
//!
//! Read once at registration time (see `rewrite::registry::install`).

use std::fs;
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::observability::Severity;

/// Result type for configuration loading
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("Failed to read config: {0}")]
    Io(#[from] io::Error),

    /// Config file is not valid JSON for this schema
    #[error("Invalid config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Process-wide pagination settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationConfig {
    /// Page parameter name used when a request does not name one (default: "page")
    #[serde(default = "default_page_name")]
    pub page_name: String,

    /// Fall back for UNION queries and GROUP BY over anything but the primary key
    /// (default: true). When false only the bound-parameter check applies.
    #[serde(default = "default_strict_grouping")]
    pub strict_grouping: bool,

    /// Minimum log severity (default: INFO)
    #[serde(default = "default_log_level")]
    pub log_level: Severity,
}

fn default_page_name() -> String {
    "page".to_string()
}

fn default_strict_grouping() -> bool {
    true
}

fn default_log_level() -> Severity {
    Severity::Info
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            page_name: default_page_name(),
            strict_grouping: default_strict_grouping(),
            log_level: default_log_level(),
        }
    }
}

impl PaginationConfig {
    /// Parse a config from a JSON document
    pub fn from_json_str(json: &str) -> ConfigResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a config from a JSON file
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    /// Config that keeps UNION and non-key grouping eligible for the rewrite
    pub fn lenient() -> Self {
        Self {
            strict_grouping: false,
            ..Self::default()
        }
    }
}
