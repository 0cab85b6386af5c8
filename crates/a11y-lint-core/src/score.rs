//! Weighted pass/fail scoring per analysis unit.

use crate::registry::CheckDefinition;
use crate::runner::Coverage;
use crate::types::{AuditResult, Issue, ScoreReport, Severity};

use std::collections::{HashMap, HashSet};
use std::path::Path;

/// Audits every selected check against the files of one unit.
///
/// A check is applicable when it found at least one element in any of the
/// unit's files, and passes when no error-severity issue of that check
/// touches those files.
#[must_use]
pub fn audit_unit(
    files: &[&Path],
    checks: &[CheckDefinition],
    coverage: &[Coverage],
    issues: &[Issue],
) -> Vec<AuditResult> {
    let files: HashSet<&Path> = files.iter().copied().collect();

    let mut elements: HashMap<&str, usize> = HashMap::new();
    for c in coverage.iter().filter(|c| files.contains(c.file.as_path())) {
        *elements.entry(c.check_id.as_str()).or_default() += c.elements_found;
    }

    let mut errors: HashMap<&str, usize> = HashMap::new();
    for issue in issues {
        if issue.severity() == Severity::Error
            && !issue.is_internal()
            && issue.files().iter().any(|f| files.contains(f))
        {
            *errors.entry(issue.check_id()).or_default() += 1;
        }
    }

    checks
        .iter()
        .map(|def| AuditResult {
            check_id: def.id().to_string(),
            weight: def.weight(),
            applicable: elements.get(def.id()).copied().unwrap_or(0) > 0,
            passed: errors.get(def.id()).copied().unwrap_or(0) == 0,
        })
        .collect()
}

/// Computes the weighted score from a unit's audits.
///
/// The score is `round(100 * numerator / denominator)` with halves rounded
/// up, or `None` when no audit is applicable.
#[must_use]
pub fn score(unit_id: &str, audits: &[AuditResult]) -> ScoreReport {
    let applicable = audits.iter().filter(|a| a.applicable);
    let denominator: u32 = applicable.clone().map(|a| u32::from(a.weight)).sum();
    let numerator: u32 = applicable
        .filter(|a| a.passed)
        .map(|a| u32::from(a.weight))
        .sum();
    let score = (denominator > 0).then(|| (200 * numerator + denominator) / (2 * denominator));
    ScoreReport {
        unit_id: unit_id.to_string(),
        numerator,
        denominator,
        score,
    }
}
