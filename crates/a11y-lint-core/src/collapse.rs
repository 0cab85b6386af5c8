//! Root-cause collapsing of duplicate findings onto a shared style ancestor.
//!
//! Findings are grouped by signature: the check id plus the message with
//! instance-specific values (quoted text, numbers, hex colors) replaced by
//! placeholders. A group spanning two or more files whose import closures
//! intersect becomes one [`CollapsedIssue`] on the most specific common
//! ancestor:
//!
//! 1. smallest maximum import distance from any affected file,
//! 2. then smallest total distance over all affected files,
//! 3. then lexical path order.

use crate::graph::DependencyGraph;
use crate::types::{CollapsedIssue, Finding, Issue, Severity};

use regex::Regex;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::PathBuf;
use std::sync::OnceLock;
use tracing::debug;

static QUOTED: OnceLock<Regex> = OnceLock::new();
static NUMERIC: OnceLock<Regex> = OnceLock::new();

#[allow(clippy::expect_used)]
fn quoted_pattern() -> &'static Regex {
    QUOTED.get_or_init(|| Regex::new(r#""[^"]*"|'[^']*'|`[^`]*`"#).expect("valid regex"))
}

#[allow(clippy::expect_used)]
fn numeric_pattern() -> &'static Regex {
    NUMERIC.get_or_init(|| {
        Regex::new(r"#[0-9A-Fa-f]{3,8}\b|\d+(?:\.\d+)?").expect("valid regex")
    })
}

/// Message with instance-specific values replaced by placeholders.
#[must_use]
pub fn message_template(message: &str) -> String {
    let unquoted = quoted_pattern().replace_all(message, "{}");
    numeric_pattern().replace_all(&unquoted, "#").into_owned()
}

/// Collapses raw findings. When `enabled` is false every finding maps 1:1
/// to an [`Issue::Single`].
#[must_use]
pub fn collapse(findings: Vec<Finding>, graph: &DependencyGraph, enabled: bool) -> Vec<Issue> {
    collapse_issues(findings.into_iter().map(Issue::from).collect(), graph, enabled)
}

/// Collapses issues. Already collapsed issues and internal-error findings
/// pass through, which makes the operation idempotent.
#[must_use]
pub fn collapse_issues(issues: Vec<Issue>, graph: &DependencyGraph, enabled: bool) -> Vec<Issue> {
    if !enabled {
        return issues;
    }

    let mut out = Vec::with_capacity(issues.len());
    let mut groups: BTreeMap<(String, String), Vec<Finding>> = BTreeMap::new();
    for issue in issues {
        match issue {
            Issue::Single(f) if !f.internal => {
                let key = (f.check_id.clone(), message_template(&f.message));
                groups.entry(key).or_default().push(f);
            }
            other => out.push(other),
        }
    }

    let mut distances: HashMap<PathBuf, HashMap<PathBuf, usize>> = HashMap::new();
    for ((check_id, _), group) in groups {
        let files: BTreeSet<PathBuf> = group.iter().map(|f| f.source_file.clone()).collect();
        if files.len() < 2 {
            out.extend(group.into_iter().map(Issue::Single));
            continue;
        }
        for file in &files {
            distances
                .entry(file.clone())
                .or_insert_with(|| graph.distances_from(file));
        }

        match common_ancestor(&files, &distances) {
            Some(ancestor) => {
                debug!(
                    "Collapsed {} finding(s) of {} onto {}",
                    group.len(),
                    check_id,
                    ancestor.display()
                );
                out.push(Issue::Collapsed(merge_group(check_id, ancestor, files, group)));
            }
            None => out.extend(group.into_iter().map(Issue::Single)),
        }
    }

    out.sort_by_key(Issue::sort_key);
    out
}

/// Picks the most specific common ancestor of `files`, if any.
fn common_ancestor(
    files: &BTreeSet<PathBuf>,
    distances: &HashMap<PathBuf, HashMap<PathBuf, usize>>,
) -> Option<PathBuf> {
    let closures: Vec<&HashMap<PathBuf, usize>> =
        files.iter().filter_map(|f| distances.get(f)).collect();
    let (first, rest) = closures.split_first()?;

    first
        .keys()
        .filter(|candidate| rest.iter().all(|c| c.contains_key(*candidate)))
        .map(|candidate| {
            let ds = closures.iter().filter_map(|c| c.get(candidate));
            let max = ds.clone().max().copied().unwrap_or(0);
            let sum: usize = ds.sum();
            (max, sum, candidate)
        })
        .min()
        .map(|(_, _, path)| path.clone())
}

fn merge_group(
    check_id: String,
    ancestor: PathBuf,
    files: BTreeSet<PathBuf>,
    mut group: Vec<Finding>,
) -> CollapsedIssue {
    group.sort_by(|a, b| {
        (&a.source_file, a.line, &a.message).cmp(&(&b.source_file, b.line, &b.message))
    });
    let severity = group
        .iter()
        .map(|f| f.severity)
        .max()
        .unwrap_or(Severity::Info);
    let message = group.first().map(|f| f.message.clone()).unwrap_or_default();
    CollapsedIssue {
        check_id,
        severity,
        message,
        ancestor_file: ancestor,
        affected_files: files.into_iter().collect(),
        count: group.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn finding(check: &str, file: &str, message: &str) -> Finding {
        Finding::new(check, Severity::Error, file, message).with_line(3)
    }

    fn graph(edges: &[(&str, &str)]) -> DependencyGraph {
        let mut g = DependencyGraph::new();
        for (a, b) in edges {
            g.add_import(Path::new(a), Path::new(b));
        }
        g
    }

    #[test]
    fn templates_ignore_instance_values() {
        assert_eq!(
            message_template("Text #777777 on #fff has contrast 4.48:1 (needs 4.5:1)"),
            "Text # on # has contrast #:# (needs #:#)"
        );
        assert_eq!(
            message_template("Button \"Save\" has no accessible name"),
            message_template("Button 'Cancel' has no accessible name")
        );
    }

    #[test]
    fn shared_import_collapses_to_one_issue() {
        let g = graph(&[("a.scss", "shared.scss"), ("b.scss", "shared.scss")]);
        let findings = vec![
            finding("reduced-motion", "a.scss", "Animation without reduced-motion"),
            finding("reduced-motion", "b.scss", "Animation without reduced-motion"),
        ];
        let issues = collapse(findings, &g, true);
        assert_eq!(issues.len(), 1);
        let Issue::Collapsed(c) = &issues[0] else {
            panic!("expected a collapsed issue");
        };
        assert_eq!(c.ancestor_file, PathBuf::from("shared.scss"));
        assert_eq!(c.count, 2);
        assert_eq!(
            c.affected_files,
            vec![PathBuf::from("a.scss"), PathBuf::from("b.scss")]
        );
    }

    #[test]
    fn disabled_passes_through() {
        let g = graph(&[("a.scss", "shared.scss"), ("b.scss", "shared.scss")]);
        let findings = vec![
            finding("x", "b.scss", "same"),
            finding("x", "a.scss", "same"),
        ];
        let issues = collapse(findings.clone(), &g, false);
        let expected: Vec<Issue> = findings.into_iter().map(Issue::Single).collect();
        assert_eq!(issues, expected);
    }

    #[test]
    fn unrelated_files_stay_separate() {
        let g = graph(&[("a.scss", "x.scss"), ("b.scss", "y.scss")]);
        let findings = vec![finding("x", "a.scss", "same"), finding("x", "b.scss", "same")];
        let issues = collapse(findings, &g, true);
        assert_eq!(issues.len(), 2);
        assert!(issues.iter().all(|i| matches!(i, Issue::Single(_))));
    }

    #[test]
    fn single_file_groups_and_internal_findings_stay() {
        let g = graph(&[("a.scss", "s.scss"), ("b.scss", "s.scss")]);
        let findings = vec![
            finding("x", "a.scss", "one"),
            finding("x", "a.scss", "one"),
            Finding::internal_error("y", "a.scss", "check panicked: boom"),
            Finding::internal_error("y", "b.scss", "check panicked: boom"),
        ];
        let issues = collapse(findings, &g, true);
        assert_eq!(issues.len(), 4);
        assert!(issues.iter().all(|i| matches!(i, Issue::Single(_))));
    }

    #[test]
    fn diamond_prefers_closest_common_ancestor() {
        // a -> mid -> base, b -> mid -> base, a -> base
        let g = graph(&[
            ("a.scss", "mid.scss"),
            ("b.scss", "mid.scss"),
            ("mid.scss", "base.scss"),
            ("a.scss", "base.scss"),
        ]);
        let findings = vec![finding("x", "a.scss", "m"), finding("x", "b.scss", "m")];
        let issues = collapse(findings, &g, true);
        let Issue::Collapsed(c) = &issues[0] else {
            panic!("expected a collapsed issue");
        };
        // mid: max 1, sum 2.  base: max 2, sum 3.
        assert_eq!(c.ancestor_file, PathBuf::from("mid.scss"));
    }

    #[test]
    fn ancestor_ordering() {
        // y and z are one hop from a and b; y is two hops from c.
        let g = graph(&[
            ("a.scss", "y.scss"),
            ("a.scss", "z.scss"),
            ("b.scss", "y.scss"),
            ("b.scss", "z.scss"),
            ("c.scss", "z.scss"),
            ("c.scss", "w.scss"),
            ("w.scss", "y.scss"),
        ]);
        let findings = vec![
            finding("x", "a.scss", "m"),
            finding("x", "b.scss", "m"),
            finding("x", "c.scss", "m"),
        ];
        let issues = collapse(findings, &g, true);
        let Issue::Collapsed(c) = &issues[0] else {
            panic!("expected a collapsed issue");
        };
        assert_eq!(c.ancestor_file, PathBuf::from("z.scss"));

        let g = graph(&[
            ("a.scss", "q.scss"),
            ("a.scss", "p.scss"),
            ("b.scss", "q.scss"),
            ("b.scss", "p.scss"),
        ]);
        let findings = vec![finding("x", "a.scss", "m"), finding("x", "b.scss", "m")];
        let issues = collapse(findings, &g, true);
        let Issue::Collapsed(c) = &issues[0] else {
            panic!("expected a collapsed issue");
        };
        assert_eq!(c.ancestor_file, PathBuf::from("p.scss"));
    }

    #[test]
    fn collapse_is_idempotent() {
        let g = graph(&[
            ("a.scss", "shared.scss"),
            ("b.scss", "shared.scss"),
            ("c.scss", "other.scss"),
        ]);
        let findings = vec![
            finding("x", "a.scss", "Color 'red' fails"),
            finding("x", "b.scss", "Color 'blue' fails"),
            finding("w", "c.scss", "Color 'green' fails"),
            finding("y", "c.scss", "Only here"),
            Finding::internal_error("z", "a.scss", "check failed: nope"),
        ];
        let once = collapse(findings, &g, true);
        let twice = collapse_issues(once.clone(), &g, true);
        assert_eq!(once, twice);
        assert_eq!(once.len(), 4);
    }

    #[test]
    fn cyclic_imports_are_safe() {
        let g = graph(&[("a.scss", "b.scss"), ("b.scss", "a.scss")]);
        let findings = vec![finding("x", "a.scss", "m"), finding("x", "b.scss", "m")];
        let issues = collapse(findings, &g, true);
        let Issue::Collapsed(c) = &issues[0] else {
            panic!("expected a collapsed issue");
        };
        // Both are mutual ancestors at the same distances; path order decides.
        assert_eq!(c.ancestor_file, PathBuf::from("a.scss"));
        assert!(issues[0].files().contains(&Path::new("b.scss")));
    }
}
