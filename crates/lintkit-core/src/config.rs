//! Configuration types for lintkit.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::filter::FilterPatterns;

/// Top-level configuration, read from `lintkit.toml`.
///
/// Every field has a default, so an empty file is a valid config.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Checker selection patterns.
    pub filters: FilterPatterns,

    /// Exit code used when any finding was reported.
    pub exit_code: i32,

    /// Whether test units are checked.
    pub check_tests: bool,

    /// Whether machine-generated units are checked.
    pub check_generated: bool,

    /// Whether toolchain roots are abbreviated in locations.
    pub shorter_locations: bool,

    /// Whether text output uses ANSI colors.
    pub colored_output: bool,

    /// Plugin manifest providing extra checkers.
    pub plugin: Option<PathBuf>,

    /// Glob patterns for files that never become units.
    pub exclude: Vec<String>,

    /// Target architecture for size information (default: host).
    pub target_arch: Option<String>,

    /// Checker threads; 0 uses one per CPU.
    pub jobs: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            filters: FilterPatterns::default(),
            exit_code: 1,
            check_tests: true,
            check_generated: false,
            shorter_locations: true,
            colored_output: true,
            plugin: None,
            exclude: vec!["**/target/**".to_string()],
            target_arch: None,
            jobs: 0,
        }
    }
}

impl Config {
    /// Creates a new default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &std::path::Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::parse(&content)
    }

    /// Parses configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is invalid.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse {
            message: e.to_string(),
        })
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// IO error reading config file.
    #[error("Failed to read config file {}: {source}", .path.display())]
    Io {
        /// Path that failed to read.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// Parse error in config file.
    #[error("Failed to parse config: {message}")]
    Parse {
        /// Parse error message.
        message: String,
    },
}
