//! Scan command implementation.

use anyhow::{Context, Result};
use a11y_lint_core::{Config, ScanError, Scanner, Selection};
use a11y_lint_rules::builtin_registry;

use super::{exit_config_error, EXIT_FAILURES};
use crate::collector::DirectoryCollector;
use crate::config_resolver::ConfigSource;
use crate::ScanArgs;

/// Runs the scan command.
pub fn run(args: &ScanArgs, source: &ConfigSource) -> Result<()> {
    let mut config = match source.load() {
        Ok(config) => config,
        Err(e) => exit_config_error(&miette::miette!("{e:#}")),
    };
    apply_overrides(&mut config, args);

    let registry = match builtin_registry(&config) {
        Ok(registry) => registry,
        Err(e) => exit_config_error(&miette::Report::new(e)),
    };

    let selection = match (&args.check, &args.tier) {
        (Some(check), _) => Selection::Check(check.clone()),
        (None, Some(tier)) => Selection::Tier(tier.clone()),
        (None, None) => Selection::Tier(config.scan.tier.clone()),
    };
    let scanner = Scanner::from_config(&registry, &config).select(selection);
    let collector =
        DirectoryCollector::new(&args.path, &config.scan).excludes(args.exclude.iter().cloned());

    tracing::info!("Scanning {}", args.path.display());

    let report = match scanner.scan(&collector) {
        Ok(report) => report,
        Err(ScanError::Configuration(e)) => exit_config_error(&miette::Report::new(e)),
        Err(e) => return Err(e).context("Scan failed"),
    };

    super::output::print(&report, args.format)?;

    if report.has_failures() {
        std::process::exit(EXIT_FAILURES);
    }

    Ok(())
}

/// Applies command-line flags on top of the loaded configuration.
fn apply_overrides(config: &mut Config, args: &ScanArgs) {
    if args.parallel || args.workers.is_some() {
        config.scan.parallel = true;
    }
    if let Some(workers) = args.workers {
        config.scan.max_workers = Some(workers.max(1));
    }
    if args.no_collapse {
        config.scan.collapse = false;
    }
}
