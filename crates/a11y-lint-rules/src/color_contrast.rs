//! Checks for text contrast against its background.
//!
//! # Rationale
//!
//! Low-contrast text is unreadable for users with low vision and in bright
//! light. WCAG requires 4.5:1 for normal text and 3:1 for large text (AA),
//! and 7:1 / 4.5:1 at level AAA.
//!
//! # Detected Patterns
//!
//! Every style rule declaring both `color` and a background
//! (`background-color`, or the first color of the `background` shorthand).
//! Both values are resolved through variables, custom properties, maps
//! and color functions before the ratio is computed. Text is large at
//! 24px, or 18.66px when bold.
//!
//! Values that cannot be resolved (undefined symbols, `currentColor`,
//! runaway chains) make the pair not applicable instead of failing it.

use a11y_lint_core::style::contrast::{AAA_LARGE, AAA_NORMAL, AA_LARGE, AA_NORMAL};
use a11y_lint_core::style::{Declaration, StyleBlock};
use a11y_lint_core::{
    Check, CheckError, ContentType, ContrastReport, EvalContext, EvaluationResult, Finding,
    Rgba, Severity, Value,
};
use tracing::debug;

/// Check code for color-contrast.
pub const CODE: &str = "AX101";

/// Check id for color-contrast.
pub const ID: &str = "color-contrast";

/// Check code for color-contrast-enhanced.
pub const ENHANCED_CODE: &str = "AX102";

/// Check id for color-contrast-enhanced.
pub const ENHANCED_ID: &str = "color-contrast-enhanced";

/// Font size (px) from which text counts as large.
const LARGE_TEXT_PX: f64 = 24.0;

/// Font size (px) from which bold text counts as large.
const LARGE_BOLD_TEXT_PX: f64 = 18.66;

/// Base font size used for `em` and `rem`.
const ROOT_FONT_PX: f64 = 16.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Level {
    Aa,
    Aaa,
}

impl Level {
    fn required(self, large: bool) -> f64 {
        match (self, large) {
            (Self::Aa, false) => AA_NORMAL,
            (Self::Aa, true) => AA_LARGE,
            (Self::Aaa, false) => AAA_NORMAL,
            (Self::Aaa, true) => AAA_LARGE,
        }
    }

    fn passes(self, report: &ContrastReport, large: bool) -> bool {
        match self {
            Self::Aa => report.passes_aa(large),
            Self::Aaa => report.passes_aaa(large),
        }
    }
}

/// Minimum contrast (WCAG AA).
#[derive(Debug, Clone, Copy, Default)]
pub struct ColorContrast;

impl ColorContrast {
    /// Creates the check.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

/// Enhanced contrast (WCAG AAA).
#[derive(Debug, Clone, Copy, Default)]
pub struct ColorContrastEnhanced;

impl ColorContrastEnhanced {
    /// Creates the check.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Check for ColorContrast {
    fn id(&self) -> &'static str {
        ID
    }

    fn code(&self) -> &'static str {
        CODE
    }

    fn description(&self) -> &'static str {
        "Text must meet WCAG AA contrast against its background"
    }

    fn content_type(&self) -> ContentType {
        ContentType::Style
    }

    fn default_weight(&self) -> u8 {
        10
    }

    fn tiers(&self) -> &'static [&'static str] {
        &["quick", "standard"]
    }

    fn evaluate(&self, ctx: &EvalContext<'_>) -> Result<EvaluationResult, CheckError> {
        evaluate_level(ctx, ID, Level::Aa)
    }
}

impl Check for ColorContrastEnhanced {
    fn id(&self) -> &'static str {
        ENHANCED_ID
    }

    fn code(&self) -> &'static str {
        ENHANCED_CODE
    }

    fn description(&self) -> &'static str {
        "Text should meet WCAG AAA contrast against its background"
    }

    fn content_type(&self) -> ContentType {
        ContentType::Style
    }

    fn default_weight(&self) -> u8 {
        3
    }

    fn evaluate(&self, ctx: &EvalContext<'_>) -> Result<EvaluationResult, CheckError> {
        evaluate_level(ctx, ENHANCED_ID, Level::Aaa)
    }
}

/// The text and background colors a rule paints, if both resolve.
fn resolve_pair<'r>(
    ctx: &EvalContext<'_>,
    rule: &'r StyleBlock,
) -> Option<(Rgba, Rgba, &'r Declaration)> {
    let fg = rule.last("color")?;
    let bg = [rule.last("background-color"), rule.last("background")]
        .into_iter()
        .flatten()
        .max_by_key(|d| d.offset)?;

    let fg_color = ctx
        .resolve_color(&fg.value, fg.offset)
        .map_err(|e| debug!("{}:{}: color not resolved: {}", ctx.path.display(), fg.line, e))
        .ok()?;
    let bg_color = if bg.property.eq_ignore_ascii_case("background") {
        ctx.resolve_shorthand_color(&bg.value, bg.offset)
    } else {
        ctx.resolve_color(&bg.value, bg.offset)
    }
    .map_err(|e| debug!("{}:{}: background not resolved: {}", ctx.path.display(), bg.line, e))
    .ok()?;
    Some((fg_color, bg_color, fg))
}

/// Font size in px, if declared and resolvable.
fn font_size_px(ctx: &EvalContext<'_>, rule: &StyleBlock) -> Option<f64> {
    let decl = rule.last("font-size")?;
    match ctx.styles.resolve_value(ctx.path, &decl.value, decl.offset).ok()? {
        Value::Number(v, unit) => match unit.to_ascii_lowercase().as_str() {
            "px" => Some(v),
            "pt" => Some(v * 4.0 / 3.0),
            "em" | "rem" => Some(v * ROOT_FONT_PX),
            _ => None,
        },
        _ => None,
    }
}

fn is_bold(rule: &StyleBlock) -> bool {
    rule.last("font-weight").is_some_and(|d| {
        let v = d.value_without_flags().trim();
        v.eq_ignore_ascii_case("bold")
            || v.eq_ignore_ascii_case("bolder")
            || v.parse::<u32>().is_ok_and(|w| w >= 700)
    })
}

fn is_large_text(ctx: &EvalContext<'_>, rule: &StyleBlock) -> bool {
    font_size_px(ctx, rule).is_some_and(|px| {
        px >= LARGE_TEXT_PX || (px >= LARGE_BOLD_TEXT_PX && is_bold(rule))
    })
}

fn evaluate_level(
    ctx: &EvalContext<'_>,
    id: &'static str,
    level: Level,
) -> Result<EvaluationResult, CheckError> {
    let mut result = EvaluationResult::not_applicable();

    for rule in ctx.stylesheet().rules() {
        if ctx.deadline_exceeded() {
            return Err(CheckError::DeadlineExceeded);
        }
        let Some((fg, bg, decl)) = resolve_pair(ctx, rule) else {
            continue;
        };
        result.elements_found += 1;

        let large = is_large_text(ctx, rule);
        let report = ContrastReport::for_text(fg, bg);
        if level.passes(&report, large) {
            continue;
        }
        result.push(
            Finding::new(
                id,
                Severity::Error,
                ctx.path,
                format!(
                    "Text color {fg} on {bg} has contrast {:.2}:1 (needs {}:1)",
                    report.ratio,
                    level.required(large)
                ),
            )
            .with_line(decl.line)
            .with_snippet(ctx.line_text(decl.line).trim()),
        );
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use a11y_lint_core::{DependencyGraph, SourceFile, StyleResolver};

    fn run(check: &dyn Check, css: &str) -> EvaluationResult {
        let files = vec![SourceFile::new("theme.scss", css, ContentType::Style, "theme")];
        let graph = DependencyGraph::build(&files);
        let styles = StyleResolver::build(&files, &graph);
        let ctx = EvalContext::new(&files[0], &styles);
        check.evaluate(&ctx).unwrap()
    }

    #[test]
    fn test_lightened_brand_color_fails() {
        let result = run(
            &ColorContrast,
            "$brand: #1a73e8;\n$primary: $brand;\n$bg: lighten($primary, 10%);\n.btn {\n  color: #fff;\n  background-color: $bg;\n}\n",
        );
        assert_eq!(result.elements_found, 1);
        assert_eq!(result.findings.len(), 1);
        let finding = &result.findings[0];
        assert_eq!(finding.line, Some(5));
        assert_eq!(finding.snippet, "color: #fff;");
        assert!(finding.message.ends_with("(needs 4.5:1)"), "{}", finding.message);
    }

    #[test]
    fn test_dark_text_passes() {
        let result = run(
            &ColorContrast,
            ".card { color: #222; background: #fff url(bg.png) no-repeat; }",
        );
        assert_eq!(result.elements_found, 1);
        assert!(result.findings.is_empty());
    }

    #[test]
    fn test_large_text_uses_lower_threshold() {
        // #777 on white is about 4.48:1.
        let normal = run(&ColorContrast, ".t { color: #777; background-color: #fff; }");
        assert_eq!(normal.findings.len(), 1);
        let large = run(
            &ColorContrast,
            ".t { color: #777; background-color: #fff; font-size: 1.5rem; }",
        );
        assert!(large.findings.is_empty());
        let bold = run(
            &ColorContrast,
            "$size: 19px;\n.t { color: #777; background-color: #fff; font-size: $size; font-weight: 700; }",
        );
        assert!(bold.findings.is_empty());
    }

    #[test]
    fn test_unresolved_values_are_not_applicable() {
        let result = run(
            &ColorContrast,
            ".a { color: currentColor; background: #000; }\n.b { color: $nope; background-color: #fff; }\n.c { color: #000; }",
        );
        assert!(!result.is_applicable());
    }

    #[test]
    fn test_custom_properties_resolve() {
        let result = run(
            &ColorContrast,
            ":root { --fg: #999; --bg: var(--missing, #fff); }\n.a { color: var(--fg); background-color: var(--bg); }",
        );
        assert_eq!(result.elements_found, 1);
        assert_eq!(result.findings.len(), 1);
    }

    #[test]
    fn test_enhanced_level() {
        // #595959 on white is about 7.0:1; #666 is about 5.7:1.
        let css = ".a { color: #666; background-color: #fff; }\n.b { color: #222; background-color: #fff; }";
        assert!(run(&ColorContrast, css).findings.is_empty());
        let result = run(&ColorContrastEnhanced, css);
        assert_eq!(result.elements_found, 2);
        assert_eq!(result.findings.len(), 1);
        assert_eq!(result.findings[0].check_id, ENHANCED_ID);
        assert!(result.findings[0].message.ends_with("(needs 7:1)"));
    }
}
