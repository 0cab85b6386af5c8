//! Configuration types for a11y-lint.

use crate::runner::{Parallelism, RunnerOptions};
use crate::types::Severity;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;
use std::time::Duration;

/// Top-level configuration (`a11y-lint.toml`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Scan behavior.
    #[serde(default)]
    pub scan: ScanConfig,

    /// Per-check configurations, keyed by check id.
    #[serde(default)]
    pub checks: HashMap<String, CheckConfig>,

    /// Additional named tiers: tier name to check ids.
    #[serde(default)]
    pub tiers: BTreeMap<String, Vec<String>>,
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

    /// Checks if a check is enabled.
    #[must_use]
    pub fn is_check_enabled(&self, check_id: &str) -> bool {
        self.checks
            .get(check_id)
            .map_or(true, |c| c.enabled.unwrap_or(true))
    }

    /// Gets the severity override for a check.
    #[must_use]
    pub fn check_severity(&self, check_id: &str) -> Option<Severity> {
        self.checks.get(check_id).and_then(|c| c.severity)
    }

    /// Gets the weight override for a check.
    #[must_use]
    pub fn check_weight(&self, check_id: &str) -> Option<u8> {
        self.checks.get(check_id).and_then(|c| c.weight)
    }
}

/// How source files are grouped into scored units.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitBy {
    /// One unit per directory (a component folder).
    #[default]
    Directory,
    /// One unit per file.
    File,
}

/// `[scan]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Tier selected when no tier or check is given on the command line.
    pub tier: String,

    /// Glob patterns to exclude from collection.
    pub exclude: Vec<String>,

    /// Whether to respect .gitignore files.
    pub respect_gitignore: bool,

    /// Unit grouping strategy.
    pub unit_by: UnitBy,

    /// Use the worker pool instead of sequential execution.
    pub parallel: bool,

    /// Upper bound on pool workers (host concurrency when unset).
    pub max_workers: Option<usize>,

    /// Minimum file count before a pool is spawned.
    pub pool_threshold: usize,

    /// Files assigned per worker when sizing the pool.
    pub files_per_worker: usize,

    /// Watchdog per (file, check) pair, in milliseconds.
    pub check_timeout_ms: u64,

    /// Merge duplicate findings into their shared style ancestor.
    pub collapse: bool,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            tier: "standard".to_string(),
            exclude: vec![
                "**/node_modules/**".to_string(),
                "**/dist/**".to_string(),
                "**/build/**".to_string(),
            ],
            respect_gitignore: true,
            unit_by: UnitBy::default(),
            parallel: false,
            max_workers: None,
            pool_threshold: RunnerOptions::DEFAULT_POOL_THRESHOLD,
            files_per_worker: RunnerOptions::DEFAULT_FILES_PER_WORKER,
            check_timeout_ms: 5000,
            collapse: true,
        }
    }
}

impl ScanConfig {
    /// Runner options described by this section.
    #[must_use]
    pub fn runner_options(&self) -> RunnerOptions {
        let parallelism = if self.parallel {
            Parallelism::Pool {
                max_workers: self.max_workers,
            }
        } else {
            Parallelism::Sequential
        };
        RunnerOptions {
            parallelism,
            pool_threshold: self.pool_threshold,
            files_per_worker: self.files_per_worker.max(1),
            check_timeout: Duration::from_millis(self.check_timeout_ms),
        }
    }
}

/// Per-check configuration (`[checks.<id>]`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CheckConfig {
    /// Whether this check is enabled.
    #[serde(default)]
    pub enabled: Option<bool>,

    /// Severity override for this check's findings.
    #[serde(default)]
    pub severity: Option<Severity>,

    /// Weight override (1..=10).
    #[serde(default)]
    pub weight: Option<u8>,
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// IO error reading config file.
    #[error("Failed to read config file {path}: {source}")]
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
