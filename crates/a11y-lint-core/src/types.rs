//! Core types for findings, issues, audits and reports.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Check id used for findings that record an unreadable source file.
pub const FILE_READ_ERROR_ID: &str = "file-read-error";

/// Severity level for findings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Informational message, does not fail an audit.
    Info,
    /// Warning that should be addressed.
    Warning,
    /// Error that fails the audit of its check.
    Error,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Info => write!(f, "info"),
            Self::Warning => write!(f, "warning"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// Kind of source content a check understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    /// Component markup (HTML and template dialects).
    Html,
    /// Style sheets (CSS, SCSS, Sass, Less).
    Style,
}

impl ContentType {
    /// Detects the content type from a file extension.
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "html" | "htm" | "vue" | "svelte" | "jsx" | "tsx" => Some(Self::Html),
            "css" | "scss" | "sass" | "less" => Some(Self::Style),
            _ => None,
        }
    }
}

impl std::fmt::Display for ContentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Html => write!(f, "html"),
            Self::Style => write!(f, "style"),
        }
    }
}

/// A single source file handed to the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    /// Path of the file (relative to the scan root when possible).
    pub path: PathBuf,
    /// Full text content.
    pub content: String,
    /// Content type used to select applicable checks.
    pub content_type: ContentType,
    /// Identifier of the scored analysis unit this file belongs to.
    pub unit_id: String,
}

impl SourceFile {
    /// Creates a new source file.
    #[must_use]
    pub fn new(
        path: impl Into<PathBuf>,
        content: impl Into<String>,
        content_type: ContentType,
        unit_id: impl Into<String>,
    ) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
            content_type,
            unit_id: unit_id.into(),
        }
    }
}

/// A finding produced by a check for one file.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Finding {
    /// Id of the check that produced this finding.
    pub check_id: String,
    /// Severity of this finding.
    pub severity: Severity,
    /// Human-readable message.
    pub message: String,
    /// Offending source excerpt.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub snippet: String,
    /// File the finding was raised in.
    pub source_file: PathBuf,
    /// Line number (1-indexed), when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
    /// Whether this finding records an engine failure rather than a real issue.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub internal: bool,
}

impl Finding {
    /// Creates a new finding.
    #[must_use]
    pub fn new(
        check_id: impl Into<String>,
        severity: Severity,
        source_file: impl Into<PathBuf>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            check_id: check_id.into(),
            severity,
            message: message.into(),
            snippet: String::new(),
            source_file: source_file.into(),
            line: None,
            internal: false,
        }
    }

    /// Creates an `info` finding recording an engine failure for a (file, check) pair.
    #[must_use]
    pub fn internal_error(
        check_id: impl Into<String>,
        source_file: impl Into<PathBuf>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            internal: true,
            ..Self::new(check_id, Severity::Info, source_file, message)
        }
    }

    /// Sets the line number.
    #[must_use]
    pub fn with_line(mut self, line: usize) -> Self {
        self.line = Some(line);
        self
    }

    /// Sets the source snippet.
    #[must_use]
    pub fn with_snippet(mut self, snippet: impl Into<String>) -> Self {
        self.snippet = snippet.into();
        self
    }
}

impl std::fmt::Display for Finding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.source_file.display())?;
        if let Some(line) = self.line {
            write!(f, ":{line}")?;
        }
        write!(f, ": {} [{}] {}", self.severity, self.check_id, self.message)
    }
}

/// Outcome of evaluating one check against one file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EvaluationResult {
    /// Number of relevant elements or declarations the check inspected.
    /// Zero means the check is not applicable to the file.
    pub elements_found: usize,
    /// Findings raised.
    pub findings: Vec<Finding>,
}

impl EvaluationResult {
    /// Result for a file the check has nothing to say about.
    #[must_use]
    pub fn not_applicable() -> Self {
        Self::default()
    }

    /// Creates a result with the given element count and no findings.
    #[must_use]
    pub fn with_elements(elements_found: usize) -> Self {
        Self {
            elements_found,
            findings: Vec::new(),
        }
    }

    /// Adds a finding.
    pub fn push(&mut self, finding: Finding) {
        self.findings.push(finding);
    }

    /// Returns true if the check found something to evaluate.
    #[must_use]
    pub fn is_applicable(&self) -> bool {
        self.elements_found > 0
    }
}

/// A group of equivalent findings attributed to one shared ancestor file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollapsedIssue {
    /// Id of the check.
    pub check_id: String,
    /// Highest severity among the merged findings.
    pub severity: Severity,
    /// Message of the first merged finding.
    pub message: String,
    /// Most specific shared ancestor in the import graph.
    pub ancestor_file: PathBuf,
    /// Distinct files that raised the finding, sorted.
    pub affected_files: Vec<PathBuf>,
    /// Number of merged findings.
    pub count: usize,
}

/// Post-collapse representation of a finding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Issue {
    /// A finding passed through unchanged.
    Single(Finding),
    /// Findings merged onto their shared ancestor.
    Collapsed(CollapsedIssue),
}

impl Issue {
    /// Id of the check behind this issue.
    #[must_use]
    pub fn check_id(&self) -> &str {
        match self {
            Self::Single(f) => &f.check_id,
            Self::Collapsed(c) => &c.check_id,
        }
    }

    /// Severity of this issue.
    #[must_use]
    pub fn severity(&self) -> Severity {
        match self {
            Self::Single(f) => f.severity,
            Self::Collapsed(c) => c.severity,
        }
    }

    /// Message of this issue.
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::Single(f) => &f.message,
            Self::Collapsed(c) => &c.message,
        }
    }

    /// Files that raised this issue.
    #[must_use]
    pub fn files(&self) -> Vec<&Path> {
        match self {
            Self::Single(f) => vec![f.source_file.as_path()],
            Self::Collapsed(c) => c.affected_files.iter().map(PathBuf::as_path).collect(),
        }
    }

    /// Number of raw findings this issue stands for.
    #[must_use]
    pub fn count(&self) -> usize {
        match self {
            Self::Single(_) => 1,
            Self::Collapsed(c) => c.count,
        }
    }

    /// Returns true if this issue records an engine failure.
    #[must_use]
    pub fn is_internal(&self) -> bool {
        matches!(self, Self::Single(f) if f.internal)
    }

    /// Key used to give issue lists a canonical order.
    pub(crate) fn sort_key(&self) -> (PathBuf, usize, String, String) {
        match self {
            Self::Single(f) => (
                f.source_file.clone(),
                f.line.unwrap_or(0),
                f.check_id.clone(),
                f.message.clone(),
            ),
            Self::Collapsed(c) => (
                c.ancestor_file.clone(),
                0,
                c.check_id.clone(),
                c.message.clone(),
            ),
        }
    }
}

impl From<Finding> for Issue {
    fn from(finding: Finding) -> Self {
        Self::Single(finding)
    }
}

impl std::fmt::Display for Issue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Single(finding) => write!(f, "{finding}"),
            Self::Collapsed(c) => write!(
                f,
                "{}: {} [{}] {} ({} occurrence(s) in {} file(s))",
                c.ancestor_file.display(),
                c.severity,
                c.check_id,
                c.message,
                c.count,
                c.affected_files.len()
            ),
        }
    }
}

/// Pass/fail evaluation of one check against one scoring unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditResult {
    /// Id of the check.
    pub check_id: String,
    /// Weight of the check (1..=10).
    pub weight: u8,
    /// Whether the check found anything to evaluate in the unit.
    pub applicable: bool,
    /// Whether the unit has no error-severity issue for the check.
    pub passed: bool,
}

/// Weighted score of one scoring unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreReport {
    /// Unit identifier.
    pub unit_id: String,
    /// Sum of weights of applicable, passing checks.
    pub numerator: u32,
    /// Sum of weights of applicable checks.
    pub denominator: u32,
    /// Rounded percentage, `None` when no check was applicable.
    pub score: Option<u32>,
}

/// Per-unit section of a [`ScanReport`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitReport {
    /// Unit identifier.
    pub unit_id: String,
    /// Files belonging to the unit.
    pub files: Vec<PathBuf>,
    /// Issues touching at least one file of the unit.
    pub issues: Vec<Issue>,
    /// One audit per selected check.
    pub audits: Vec<AuditResult>,
    /// Weighted score.
    pub score: ScoreReport,
}

impl UnitReport {
    /// Returns true if any applicable audit failed.
    #[must_use]
    pub fn has_failures(&self) -> bool {
        self.audits.iter().any(|a| a.applicable && !a.passed)
    }
}

/// Number of units per score band.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Distribution {
    /// Score of 90 or more.
    pub excellent: usize,
    /// Score from 70 to 89.
    pub good: usize,
    /// Score from 50 to 69.
    pub fair: usize,
    /// Score below 50.
    pub poor: usize,
    /// No applicable check.
    pub unscored: usize,
}

impl Distribution {
    /// Records one unit score.
    pub fn record(&mut self, score: Option<u32>) {
        match score {
            None => self.unscored += 1,
            Some(s) if s >= 90 => self.excellent += 1,
            Some(s) if s >= 70 => self.good += 1,
            Some(s) if s >= 50 => self.fair += 1,
            Some(_) => self.poor += 1,
        }
    }
}

/// Issue counts by severity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeverityCounts {
    /// Error-severity issues.
    pub errors: usize,
    /// Warning-severity issues.
    pub warnings: usize,
    /// Info-severity issues.
    pub infos: usize,
}

/// The complete result of one scan, handed to formatters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanReport {
    /// One entry per unit, ordered by unit id.
    pub units: Vec<UnitReport>,
    /// Units per score band.
    pub distribution: Distribution,
    /// Distinct issues by severity across the whole scan.
    pub severity_counts: SeverityCounts,
    /// Non-fatal warnings (e.g. worker fallbacks).
    pub warnings: Vec<String>,
    /// Number of files handed to the runner.
    pub files_checked: usize,
}

impl ScanReport {
    /// Returns true if any unit has a failing audit.
    #[must_use]
    pub fn has_failures(&self) -> bool {
        self.units.iter().any(UnitReport::has_failures)
    }

    /// Distinct issues across all units (an issue shared by units appears once).
    #[must_use]
    pub fn all_issues(&self) -> Vec<&Issue> {
        let mut issues: Vec<&Issue> = Vec::new();
        for issue in self.units.iter().flat_map(|u| u.issues.iter()) {
            if !issues.contains(&issue) {
                issues.push(issue);
            }
        }
        issues
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_finding(severity: Severity) -> Finding {
        Finding::new(
            "image-alt",
            severity,
            "src/card/card.html",
            "Image is missing an alt attribute",
        )
    }

    #[test]
    fn content_type_from_extension() {
        assert_eq!(
            ContentType::from_path(Path::new("a/b.vue")),
            Some(ContentType::Html)
        );
        assert_eq!(
            ContentType::from_path(Path::new("a/_b.SCSS")),
            Some(ContentType::Style)
        );
        assert_eq!(ContentType::from_path(Path::new("a/b.rs")), None);
        assert_eq!(ContentType::from_path(Path::new("Makefile")), None);
    }

    #[test]
    fn finding_display_with_line() {
        let f = make_finding(Severity::Error).with_line(12);
        insta::assert_snapshot!(
            f.to_string(),
            @"src/card/card.html:12: error [image-alt] Image is missing an alt attribute"
        );
    }

    #[test]
    fn finding_display_without_line() {
        let f = make_finding(Severity::Warning);
        assert_eq!(
            f.to_string(),
            "src/card/card.html: warning [image-alt] Image is missing an alt attribute"
        );
    }

    #[test]
    fn internal_error_is_info() {
        let f = Finding::internal_error("image-alt", "a.html", "boom");
        assert_eq!(f.severity, Severity::Info);
        assert!(f.internal);
        assert!(Issue::from(f).is_internal());
    }

    #[test]
    fn distribution_bands() {
        let mut d = Distribution::default();
        for s in [Some(100), Some(90), Some(89), Some(50), Some(49), None] {
            d.record(s);
        }
        assert_eq!(d.excellent, 2);
        assert_eq!(d.good, 1);
        assert_eq!(d.fair, 1);
        assert_eq!(d.poor, 1);
        assert_eq!(d.unscored, 1);
    }

    #[test]
    fn collapsed_issue_files_and_count() {
        let issue = Issue::Collapsed(CollapsedIssue {
            check_id: "reduced-motion".into(),
            severity: Severity::Warning,
            message: "m".into(),
            ancestor_file: PathBuf::from("styles/_shared.scss"),
            affected_files: vec![PathBuf::from("a.scss"), PathBuf::from("b.scss")],
            count: 3,
        });
        assert_eq!(issue.files().len(), 2);
        assert_eq!(issue.count(), 3);
        assert!(!issue.is_internal());
    }
}
