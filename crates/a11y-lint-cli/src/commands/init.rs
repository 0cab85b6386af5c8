//! Init command implementation.

use anyhow::{bail, Result};
use std::path::{Path, PathBuf};

use crate::config_resolver::CONFIG_FILE_NAME;

const DEFAULT_CONFIG: &str = r#"# a11y-lint configuration

[scan]
# Tier used when neither --tier nor --check is given: quick, standard, full
tier = "standard"

# Glob patterns (relative to the scan root) to skip
exclude = [
    "**/node_modules/**",
    "**/dist/**",
    "**/build/**",
]

# Respect .gitignore files
respect_gitignore = true

# Group files into scored units: "directory" or "file"
unit_by = "directory"

# Evaluate on a worker pool once a scan has at least pool_threshold files
parallel = false
# max_workers = 8
pool_threshold = 100
files_per_worker = 50

# Time budget for one check on one file; a check running longer is abandoned
check_timeout_ms = 5000

# Report findings that trace back to one shared style sheet once, on that sheet
collapse = true

# Check configurations
# Each check can be disabled and have its severity or weight (1-10) overridden

# [checks.color-contrast-enhanced]
# enabled = true
# severity = "warning"
# weight = 3

# Additional tiers
# [tiers]
# forms = ["form-label", "control-name"]
"#;

/// Runs the init command.
pub fn run(force: bool) -> Result<()> {
    let config_path = write_config(Path::new("."), force)?;

    println!("Created {}", config_path.display());
    println!("\nNext steps:");
    println!("  1. Edit {CONFIG_FILE_NAME} to configure checks");
    println!("  2. Run: a11y-lint scan");

    Ok(())
}

fn write_config(dir: &Path, force: bool) -> Result<PathBuf> {
    let config_path = dir.join(CONFIG_FILE_NAME);

    if config_path.exists() && !force {
        bail!(
            "Configuration file already exists at {}. Use --force to overwrite.",
            config_path.display()
        );
    }

    std::fs::write(&config_path, DEFAULT_CONFIG)?;
    Ok(config_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use a11y_lint_core::{Config, ScanConfig, UnitBy};
    use tempfile::TempDir;

    #[test]
    fn default_config_matches_defaults() {
        let config = Config::parse(DEFAULT_CONFIG).unwrap();
        let defaults = ScanConfig::default();
        assert_eq!(config.scan.tier, defaults.tier);
        assert_eq!(config.scan.exclude, defaults.exclude);
        assert_eq!(config.scan.unit_by, UnitBy::Directory);
        assert_eq!(config.scan.pool_threshold, defaults.pool_threshold);
        assert_eq!(config.scan.check_timeout_ms, defaults.check_timeout_ms);
        assert!(config.checks.is_empty());
    }

    #[test]
    fn refuses_to_overwrite_without_force() {
        let tmp = TempDir::new().unwrap();
        let path = write_config(tmp.path(), false).unwrap();
        assert_eq!(path, tmp.path().join("a11y-lint.toml"));

        assert!(write_config(tmp.path(), false).is_err());
        assert!(write_config(tmp.path(), true).is_ok());
    }
}
