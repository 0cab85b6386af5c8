//! Locating and loading `a11y-lint.toml`.
//!
//! A scan usually targets a subdirectory (`src/components`) while the
//! configuration lives at the repository root, so project configuration is
//! searched upward from the scan path:
//!
//! 1. `--config <file>`
//! 2. the nearest `a11y-lint.toml` / `.a11y-lint.toml` in the scan directory
//!    or an ancestor, stopping at the repository root (a directory with `.git`)
//! 3. `$A11Y_LINT_CONFIG_DIR/config.toml` or `~/.a11y-lint/config.toml`
//! 4. built-in defaults

use a11y_lint_core::Config;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Config file name written by `a11y-lint init`.
pub const CONFIG_FILE_NAME: &str = "a11y-lint.toml";

const PROJECT_CONFIG_NAMES: &[&str] = &[CONFIG_FILE_NAME, ".a11y-lint.toml"];
const GLOBAL_CONFIG_NAME: &str = "config.toml";
const CONFIG_DIR_ENV: &str = "A11Y_LINT_CONFIG_DIR";

/// Where the configuration comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Given with `--config`.
    Explicit(PathBuf),
    /// Found in the scan directory or one of its ancestors.
    Project(PathBuf),
    /// The per-user configuration.
    Global(PathBuf),
    /// Nothing found.
    Default,
}

impl ConfigSource {
    /// Path of the configuration file, if any.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Explicit(p) | Self::Project(p) | Self::Global(p) => Some(p),
            Self::Default => None,
        }
    }

    /// Reads and parses the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid TOML.
    pub fn load(&self) -> Result<Config> {
        let Some(path) = self.path() else {
            debug!("No configuration file, using defaults");
            return Ok(Config::default());
        };
        if matches!(self, Self::Global(_)) {
            info!("Using global config: {}", path.display());
        } else {
            debug!("Using config: {}", path.display());
        }
        Config::from_file(path).with_context(|| format!("Failed to load config: {}", path.display()))
    }
}

/// Resolves the configuration for a scan of `scan_path`.
#[must_use]
pub fn resolve(scan_path: &Path, explicit: Option<&Path>) -> ConfigSource {
    Locator::from_env().locate(scan_path, explicit)
}

/// Config lookup with an injectable global directory.
#[derive(Debug, Clone, Default)]
struct Locator {
    global_dir: Option<PathBuf>,
}

impl Locator {
    fn from_env() -> Self {
        let global_dir = std::env::var_os(CONFIG_DIR_ENV)
            .map(PathBuf::from)
            .or_else(|| home::home_dir().map(|h| h.join(".a11y-lint")));
        Self { global_dir }
    }

    fn locate(&self, scan_path: &Path, explicit: Option<&Path>) -> ConfigSource {
        if let Some(path) = explicit {
            return ConfigSource::Explicit(path.to_path_buf());
        }
        if let Some(path) = find_project_config(&start_dir(scan_path)) {
            return ConfigSource::Project(path);
        }
        self.global_dir
            .as_ref()
            .map(|dir| dir.join(GLOBAL_CONFIG_NAME))
            .filter(|path| path.is_file())
            .map_or(ConfigSource::Default, ConfigSource::Global)
    }
}

/// Directory the upward search starts from. Relative paths are anchored at
/// the working directory so that ancestors are visible.
fn start_dir(scan_path: &Path) -> PathBuf {
    let dir = if scan_path.is_file() {
        scan_path.parent().unwrap_or_else(|| Path::new(""))
    } else {
        scan_path
    };
    std::fs::canonicalize(if dir.as_os_str().is_empty() { Path::new(".") } else { dir })
        .unwrap_or_else(|_| dir.to_path_buf())
}

fn find_project_config(start: &Path) -> Option<PathBuf> {
    for dir in start.ancestors() {
        if let Some(found) = PROJECT_CONFIG_NAMES
            .iter()
            .map(|name| dir.join(name))
            .find(|candidate| candidate.is_file())
        {
            debug!("Found project config: {}", found.display());
            return Some(found);
        }
        if dir.join(".git").exists() {
            break;
        }
    }
    None
}
