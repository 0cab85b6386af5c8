//! Comment-based allowance directives.
//!
//! Supports directives in any comment syntax of the scanned languages:
//! ```text
//! <!-- a11y-lint: allow(image-alt) reason="decorative sprite sheet" -->
//! /* a11y-lint: allow(color-contrast, focus-visible) */
//! // a11y-lint: allow(all) reason="vendored theme"
//! ```
//!
//! A directive applies to its own line and to the line after it.

use std::collections::HashSet;

const MARKER: &str = "a11y-lint:";
const COMMENT_OPENERS: &[&str] = &["<!--", "/*", "//"];

/// Result of checking for an allow directive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AllowCheck {
    /// The check is not allowed.
    Denied,
    /// The check is allowed with optional reason.
    Allowed {
        /// The reason provided (if any).
        reason: Option<String>,
    },
}

impl AllowCheck {
    /// Returns true if allowed.
    #[must_use]
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed { .. })
    }

    /// Returns the reason if allowed.
    #[must_use]
    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::Allowed { reason } => reason.as_deref(),
            Self::Denied => None,
        }
    }
}

/// Parsed allowance directive.
#[derive(Debug, Clone)]
pub struct AllowDirective {
    /// Check ids that are allowed.
    pub checks: HashSet<String>,
    /// Optional reason for the allowance.
    pub reason: Option<String>,
}

impl AllowDirective {
    /// Returns true if the directive covers the given check id.
    #[must_use]
    pub fn covers(&self, check_id: &str) -> bool {
        self.checks.contains(check_id) || self.checks.contains("all")
    }
}

/// Checks whether a finding of `check_id` on `line` (1-indexed) is allowed by
/// a directive on that line or the line before.
#[must_use]
pub fn check_allow_with_reason(content: &str, line: usize, check_id: &str) -> AllowCheck {
    let lines: Vec<&str> = content.lines().collect();

    for check_line in [line.saturating_sub(1), line] {
        if check_line == 0 || check_line > lines.len() {
            continue;
        }
        if let Some(directive) = parse_allow_directive(lines[check_line - 1]) {
            if directive.covers(check_id) {
                return AllowCheck::Allowed {
                    reason: directive.reason,
                };
            }
        }
    }

    AllowCheck::Denied
}

/// Parses an allowance directive from a line containing a comment.
#[must_use]
pub fn parse_allow_directive(line: &str) -> Option<AllowDirective> {
    let marker = line.find(MARKER)?;
    // The marker must sit inside a comment opened earlier on the line.
    let before = &line[..marker];
    if !COMMENT_OPENERS.iter().any(|o| before.contains(o)) {
        return None;
    }

    let directive = line[marker + MARKER.len()..].trim();
    let allow_content = directive.strip_prefix("allow(")?.trim();

    let paren_end = allow_content.find(')')?;
    let checks: HashSet<String> = allow_content[..paren_end]
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();

    if checks.is_empty() {
        return None;
    }

    let rest = allow_content[paren_end + 1..].trim();
    let reason = rest.strip_prefix("reason=").and_then(|r| {
        let r = r.trim().strip_prefix('"')?;
        r.find('"').map(|end| r[..end].to_string())
    });

    Some(AllowDirective { checks, reason })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_html_comment() {
        let directive =
            parse_allow_directive("  <!-- a11y-lint: allow(image-alt) reason=\"sprite\" -->")
                .unwrap();
        assert!(directive.covers("image-alt"));
        assert!(!directive.covers("html-lang"));
        assert_eq!(directive.reason, Some("sprite".to_string()));
    }

    #[test]
    fn test_parse_block_and_line_comments() {
        let directive =
            parse_allow_directive("/* a11y-lint: allow(color-contrast, focus-visible) */").unwrap();
        assert!(directive.covers("color-contrast"));
        assert!(directive.covers("focus-visible"));
        assert!(directive.reason.is_none());

        let directive = parse_allow_directive("$x: red; // a11y-lint: allow(all)").unwrap();
        assert!(directive.covers("anything"));
    }

    #[test]
    fn test_marker_outside_comment_is_ignored() {
        assert!(parse_allow_directive("<p>a11y-lint: allow(image-alt)</p>").is_none());
        assert!(parse_allow_directive("// a11y-lint: allow()").is_none());
    }

    #[test]
    fn test_check_allow_on_same_and_previous_line() {
        let content = "<div>\n  <!-- a11y-lint: allow(image-alt) reason=\"decorative\" -->\n  <img src=\"a.png\">\n  <img src=\"b.png\"> <!-- a11y-lint: allow(image-alt) -->\n</div>";

        let result = check_allow_with_reason(content, 3, "image-alt");
        assert!(result.is_allowed());
        assert_eq!(result.reason(), Some("decorative"));

        let result = check_allow_with_reason(content, 4, "image-alt");
        assert!(result.is_allowed());
        assert_eq!(result.reason(), None);

        assert!(!check_allow_with_reason(content, 3, "control-name").is_allowed());
        assert!(!check_allow_with_reason(content, 5, "image-alt").is_allowed());
    }
}
