//! Configuration handling for `SnapRank`
//!
//! Every field has a serde default, so a config file only needs the keys it
//! changes and a missing file means all defaults.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::types::DEFAULT_LIMIT;

/// Main configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Directory scanning
    #[serde(default)]
    pub scan: ScanConfig,

    /// Ranking
    #[serde(default)]
    pub search: SearchConfig,

    /// Logging
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Directory scanning configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanConfig {
    /// Glob patterns, relative to the scanned root, to leave out
    #[serde(default = "default_exclude")]
    pub exclude: Vec<String>,

    /// Maximum directory depth below the root
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,

    /// Maximum number of files in one snapshot
    #[serde(default = "default_max_files")]
    pub max_files: usize,
}

fn default_exclude() -> Vec<String> {
    vec![
        "**/.git".to_string(),
        "**/.git/**".to_string(),
        "**/node_modules".to_string(),
        "**/node_modules/**".to_string(),
        "**/target".to_string(),
        "**/target/**".to_string(),
    ]
}

const fn default_max_depth() -> usize {
    64
}

const fn default_max_files() -> usize {
    100_000
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            exclude:   default_exclude(),
            max_depth: default_max_depth(),
            max_files: default_max_files(),
        }
    }
}

/// Ranking configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Number of results returned when no limit is given
    #[serde(default = "default_limit")]
    pub limit: usize,
}

const fn default_limit() -> usize {
    DEFAULT_LIMIT
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self { limit: default_limit() }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log at debug level instead of info
    #[serde(default)]
    pub verbose: bool,
}

impl Config {
    /// Parse configuration from TOML text
    ///
    /// # Errors
    /// Returns [`Error::Config`] if the text is not valid configuration.
    pub fn from_toml(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| Error::config(&e.to_string()))
    }

    /// Load configuration from a TOML file
    ///
    /// # Errors
    /// Returns error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|e| {
            Error::config(&format!("Failed to read {}: {e}", path.display()))
        })?;
        Self::from_toml(&text)
    }

    /// Load `path` when given, defaults otherwise
    ///
    /// # Errors
    /// Returns error if a given file cannot be read or parsed.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        path.map_or_else(|| Ok(Self::default()), Self::load)
    }
}
