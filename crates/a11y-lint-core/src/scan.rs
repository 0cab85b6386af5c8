//! Scan orchestration: collect, resolve, run, collapse and score.

use crate::collapse::collapse;
use crate::config::Config;
use crate::graph::DependencyGraph;
use crate::registry::{Registry, RegistryError, Selection};
use crate::runner::{CancelToken, RunError, Runner, RunnerOptions};
use crate::score::{audit_unit, score};
use crate::style::StyleResolver;
use crate::types::{
    Distribution, Finding, Issue, ScanReport, Severity, SeverityCounts, SourceFile, UnitReport,
    FILE_READ_ERROR_ID,
};

use miette::Diagnostic;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

/// One entry produced by a [`SourceCollector`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Collected {
    /// A readable source file.
    File(SourceFile),
    /// A discovered file whose content could not be read.
    Unreadable {
        /// Path of the file.
        path: PathBuf,
        /// Unit the file would have belonged to.
        unit_id: String,
        /// Why it could not be read.
        reason: String,
    },
}

/// Error raised when the scan input cannot be collected at all.
#[derive(Debug, Error)]
pub enum CollectError {
    /// The scan root could not be read.
    #[error("cannot read {path}: {source}")]
    Io {
        /// Path that failed.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// Any other collection failure (invalid patterns, walker errors).
    #[error("{0}")]
    Other(String),
}

/// Produces the files of one scan, grouped by unit id.
///
/// The discovery strategy (directory walk, route lists, component lookup)
/// is up to the implementation.
pub trait SourceCollector {
    /// Collects the sources to scan.
    ///
    /// # Errors
    ///
    /// Returns a [`CollectError`] when the input cannot be read at all.
    /// Individual unreadable files are reported as [`Collected::Unreadable`].
    fn collect(&self) -> Result<Vec<Collected>, CollectError>;
}

impl SourceCollector for [SourceFile] {
    fn collect(&self) -> Result<Vec<Collected>, CollectError> {
        Ok(self.iter().cloned().map(Collected::File).collect())
    }
}

impl SourceCollector for Vec<SourceFile> {
    fn collect(&self) -> Result<Vec<Collected>, CollectError> {
        self.as_slice().collect()
    }
}

/// Errors that end a scan without a report.
#[derive(Debug, Error, Diagnostic)]
pub enum ScanError {
    /// Unknown tier or check, raised before any file is processed.
    #[error(transparent)]
    #[diagnostic(transparent)]
    Configuration(#[from] RegistryError),

    /// The input could not be collected.
    #[error("failed to collect sources: {0}")]
    #[diagnostic(code(a11y_lint::collection))]
    Collection(#[from] CollectError),

    /// The scan was cancelled; partial results were discarded.
    #[error("scan cancelled")]
    #[diagnostic(code(a11y_lint::cancelled))]
    Cancelled,
}

impl From<RunError> for ScanError {
    fn from(err: RunError) -> Self {
        match err {
            RunError::Cancelled => Self::Cancelled,
        }
    }
}

/// Runs complete scans against a registry.
///
/// # Example
///
/// ```ignore
/// let scanner = Scanner::new(&registry)
///     .select(Selection::Tier("quick".into()))
///     .collapse(true);
/// let report = scanner.scan(&collector)?;
/// ```
#[derive(Debug, Clone)]
pub struct Scanner<'r> {
    registry: &'r Registry,
    selection: Selection,
    options: RunnerOptions,
    collapse: bool,
    cancel: CancelToken,
}

impl<'r> Scanner<'r> {
    /// Creates a scanner selecting the `standard` tier, running sequentially
    /// with collapsing enabled.
    #[must_use]
    pub fn new(registry: &'r Registry) -> Self {
        Self {
            registry,
            selection: Selection::Tier("standard".to_string()),
            options: RunnerOptions::default(),
            collapse: true,
            cancel: CancelToken::new(),
        }
    }

    /// Creates a scanner from the `[scan]` section of a configuration.
    #[must_use]
    pub fn from_config(registry: &'r Registry, config: &Config) -> Self {
        Self::new(registry)
            .select(Selection::Tier(config.scan.tier.clone()))
            .options(config.scan.runner_options())
            .collapse(config.scan.collapse)
    }

    /// Sets the check selection.
    #[must_use]
    pub fn select(mut self, selection: Selection) -> Self {
        self.selection = selection;
        self
    }

    /// Sets runner options.
    #[must_use]
    pub fn options(mut self, options: RunnerOptions) -> Self {
        self.options = options;
        self
    }

    /// Enables or disables root-cause collapsing.
    #[must_use]
    pub fn collapse(mut self, enabled: bool) -> Self {
        self.collapse = enabled;
        self
    }

    /// Uses a cancellation token.
    #[must_use]
    pub fn cancel_token(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Runs one scan.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::Configuration`] for an unknown selection before
    /// collecting anything, [`ScanError::Collection`] when the input cannot
    /// be read and [`ScanError::Cancelled`] when the token fires.
    pub fn scan<C>(&self, collector: &C) -> Result<ScanReport, ScanError>
    where
        C: SourceCollector + ?Sized,
    {
        let checks = self.registry.select(&self.selection)?;
        info!("Selected {} check(s)", checks.len());
        if self.cancel.is_cancelled() {
            return Err(ScanError::Cancelled);
        }

        let mut files = Vec::new();
        let mut read_errors = Vec::new();
        let mut units: BTreeMap<String, BTreeSet<PathBuf>> = BTreeMap::new();
        for entry in collector.collect()? {
            match entry {
                Collected::File(file) => {
                    units
                        .entry(file.unit_id.clone())
                        .or_default()
                        .insert(file.path.clone());
                    files.push(file);
                }
                Collected::Unreadable {
                    path,
                    unit_id,
                    reason,
                } => {
                    debug!("Unreadable: {} ({})", path.display(), reason);
                    units.entry(unit_id).or_default().insert(path.clone());
                    read_errors.push(Finding::internal_error(
                        FILE_READ_ERROR_ID,
                        path,
                        format!("could not read file: {reason}"),
                    ));
                }
            }
        }
        info!("Collected {} file(s) in {} unit(s)", files.len(), units.len());

        let graph = DependencyGraph::build(&files);
        let styles = Arc::new(StyleResolver::build(&files, &graph));
        debug!(
            "Import graph: {} node(s), {} edge(s)",
            graph.node_count(),
            graph.edge_count()
        );

        let run = Runner::new(&checks, styles, self.options.clone())
            .with_cancel(self.cancel.clone())
            .run(&files)?;

        let mut findings = run.findings;
        findings.extend(read_errors);
        let issues = collapse(findings, &graph, self.collapse);
        if self.cancel.is_cancelled() {
            return Err(ScanError::Cancelled);
        }

        let mut distribution = Distribution::default();
        let mut reports = Vec::with_capacity(units.len());
        for (unit_id, unit_files) in units {
            let paths: Vec<&Path> = unit_files.iter().map(PathBuf::as_path).collect();
            let unit_issues: Vec<Issue> = issues
                .iter()
                .filter(|i| i.files().iter().any(|f| unit_files.contains(*f)))
                .cloned()
                .collect();
            let audits = audit_unit(&paths, &checks, &run.coverage, &unit_issues);
            let unit_score = score(&unit_id, &audits);
            distribution.record(unit_score.score);
            reports.push(UnitReport {
                unit_id,
                files: unit_files.into_iter().collect(),
                issues: unit_issues,
                audits,
                score: unit_score,
            });
        }

        let mut severity_counts = SeverityCounts::default();
        for issue in &issues {
            match issue.severity() {
                Severity::Error => severity_counts.errors += 1,
                Severity::Warning => severity_counts.warnings += 1,
                Severity::Info => severity_counts.infos += 1,
            }
        }

        info!(
            "Scan complete: {} issue(s) across {} unit(s)",
            issues.len(),
            reports.len()
        );
        Ok(ScanReport {
            units: reports,
            distribution,
            severity_counts,
            warnings: run.warnings,
            files_checked: run.files_checked,
        })
    }
}
