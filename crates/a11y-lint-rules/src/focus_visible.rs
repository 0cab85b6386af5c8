//! Check for removed focus indicators.
//!
//! # Rationale
//!
//! Keyboard users track where they are through the focus ring. Resetting
//! `outline` on `:focus` without another visual cue leaves them lost.
//!
//! # Detected Patterns
//!
//! - `:focus` / `:focus-visible` rules that set `outline: none`, `outline: 0`,
//!   `outline-style: none`, `outline-width: 0` or `outline-color: transparent`
//!   and declare no replacement (`box-shadow`, `border*`, `background*`,
//!   `text-decoration*`)
//!
//! Rules scoped with `:not(:focus-visible)` are allowed: they only hide the
//! ring for pointer focus.

use a11y_lint_core::style::{Declaration, StyleBlock};
use a11y_lint_core::{
    Check, CheckError, ContentType, EvalContext, EvaluationResult, Finding, Severity,
};
use regex::Regex;
use std::sync::OnceLock;

/// Check code for focus-visible.
pub const CODE: &str = "AX103";

/// Check id for focus-visible.
pub const ID: &str = "focus-visible";

static FOCUS_SELECTOR: OnceLock<Regex> = OnceLock::new();
static POINTER_ONLY: OnceLock<Regex> = OnceLock::new();

#[allow(clippy::expect_used)]
fn focus_selector() -> &'static Regex {
    // `:focus` and `:focus-visible`, but not `:focus-within`.
    FOCUS_SELECTOR
        .get_or_init(|| Regex::new(r":focus(?:-visible)?(?:[^-\w]|$)").expect("valid regex"))
}

#[allow(clippy::expect_used)]
fn pointer_only() -> &'static Regex {
    POINTER_ONLY.get_or_init(|| Regex::new(r":not\(\s*:focus-visible\s*\)").expect("valid regex"))
}

/// Forbids hiding the focus indicator without a replacement.
#[derive(Debug, Clone, Copy, Default)]
pub struct FocusVisible;

impl FocusVisible {
    /// Creates the check.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

fn is_zero(token: &str) -> bool {
    token
        .trim_end_matches(|c: char| c.is_ascii_alphabetic())
        .parse::<f64>()
        .is_ok_and(|v| v == 0.0)
}

fn removes_outline(decl: &Declaration) -> bool {
    let value = decl.value_without_flags().to_ascii_lowercase();
    match decl.property_lower().as_str() {
        "outline" => value
            .split_whitespace()
            .any(|t| t == "none" || t == "transparent" || is_zero(t)),
        "outline-style" => value == "none",
        "outline-width" => is_zero(&value),
        "outline-color" => value == "transparent",
        _ => false,
    }
}

fn is_replacement(decl: &Declaration) -> bool {
    let property = decl.property_lower();
    let visible = !matches!(
        decl.value_without_flags().to_ascii_lowercase().as_str(),
        "none" | "0" | "transparent" | "initial" | "unset"
    );
    visible
        && (property == "box-shadow"
            || property.starts_with("border")
            || property.starts_with("background")
            || property.starts_with("text-decoration"))
}

/// The declaration that leaves the rule without an outline, if any.
fn outline_removal(rule: &StyleBlock) -> Option<&Declaration> {
    rule.declarations
        .iter()
        .rev()
        .find(|d| {
            let property = d.property_lower();
            property.starts_with("outline") && property != "outline-offset"
        })
        .filter(|d| removes_outline(d))
}

impl Check for FocusVisible {
    fn id(&self) -> &'static str {
        ID
    }

    fn code(&self) -> &'static str {
        CODE
    }

    fn description(&self) -> &'static str {
        "Focus indicators must not be removed without a replacement"
    }

    fn content_type(&self) -> ContentType {
        ContentType::Style
    }

    fn default_weight(&self) -> u8 {
        7
    }

    fn tiers(&self) -> &'static [&'static str] {
        &["standard"]
    }

    fn evaluate(&self, ctx: &EvalContext<'_>) -> Result<EvaluationResult, CheckError> {
        let mut result = EvaluationResult::not_applicable();

        for rule in ctx.stylesheet().rules() {
            if !focus_selector().is_match(&rule.selector) {
                continue;
            }
            result.elements_found += 1;
            if pointer_only().is_match(&rule.selector) {
                continue;
            }
            let Some(removal) = outline_removal(rule) else {
                continue;
            };
            if rule.declarations.iter().any(is_replacement) {
                continue;
            }
            result.push(
                Finding::new(
                    ID,
                    Severity::Error,
                    ctx.path,
                    "Focus indicator removed without a visible replacement",
                )
                .with_line(removal.line)
                .with_snippet(ctx.line_text(removal.line).trim()),
            );
        }
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use a11y_lint_core::{SourceFile, StyleResolver};

    fn check_style(content: &str) -> EvaluationResult {
        let file = SourceFile::new("buttons.scss", content, ContentType::Style, "buttons");
        let styles = StyleResolver::empty();
        let ctx = EvalContext::new(&file, &styles);
        FocusVisible::new().evaluate(&ctx).unwrap()
    }

    #[test]
    fn test_detects_bare_outline_reset() {
        let result = check_style("button:focus {\n  outline: none;\n}\n");
        assert_eq!(result.elements_found, 1);
        assert_eq!(result.findings.len(), 1);
        assert_eq!(result.findings[0].line, Some(2));
        assert_eq!(result.findings[0].snippet, "outline: none;");
    }

    #[test]
    fn test_detects_nested_reset() {
        let result = check_style(".btn {\n  &:focus { outline-style: none !important; }\n}");
        assert_eq!(result.findings.len(), 1);
        assert_eq!(result.findings[0].line, Some(2));
    }

    #[test]
    fn test_allows_replacements() {
        let result = check_style(
            "a:focus { outline: 0; box-shadow: 0 0 0 3px #1a73e8; }\n\
             .x:focus:not(:focus-visible) { outline: none; }\n\
             .y:focus { outline: none; outline: 2px solid; }\n\
             .z:focus-visible { outline-width: 0; border-bottom: 2px solid; }",
        );
        assert_eq!(result.elements_found, 4);
        assert!(result.findings.is_empty(), "{:?}", result.findings);
    }

    #[test]
    fn test_ignores_focus_within() {
        let result = check_style(".menu:focus-within { outline: none; }\n.a { outline: 0; }");
        assert!(!result.is_applicable());
    }
}
