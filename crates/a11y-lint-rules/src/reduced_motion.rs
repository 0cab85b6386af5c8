//! Check for animations without a reduced-motion alternative.
//!
//! # Rationale
//!
//! Motion can trigger nausea and vertigo for users with vestibular
//! disorders. Users who ask their system for reduced motion expect sites to
//! honour `prefers-reduced-motion`.
//!
//! # Detected Patterns
//!
//! - `animation`, `animation-name` or `transition` declarations in a style
//!   file when neither the file nor anything it imports contains a
//!   `@media (prefers-reduced-motion: ...)` block
//!
//! Declarations already inside such a media block are not counted. One
//! finding is raised per file, at the first animated declaration.

use a11y_lint_core::style::{Declaration, StyleSheet};
use a11y_lint_core::{
    Check, CheckError, ContentType, EvalContext, EvaluationResult, Finding, Severity,
};

/// Check code for reduced-motion.
pub const CODE: &str = "AX104";

/// Check id for reduced-motion.
pub const ID: &str = "reduced-motion";

const MEDIA_FEATURE: &str = "prefers-reduced-motion";

/// Requires a `prefers-reduced-motion` alternative for animations.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReducedMotion;

impl ReducedMotion {
    /// Creates the check.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

fn mentions_feature(selector: &str) -> bool {
    selector.to_ascii_lowercase().contains(MEDIA_FEATURE)
}

fn has_guard(sheet: &StyleSheet) -> bool {
    sheet.blocks.iter().any(|b| b.is_at_rule() && mentions_feature(&b.selector))
}

fn is_animated(decl: &Declaration) -> bool {
    let animates = matches!(
        decl.property_lower().as_str(),
        "animation" | "animation-name" | "transition"
    );
    animates
        && !matches!(
            decl.value_without_flags().to_ascii_lowercase().as_str(),
            "none" | "initial" | "unset" | "inherit"
        )
}

/// Animated declarations outside any reduced-motion media block.
fn animated_declarations(sheet: &StyleSheet) -> Vec<&Declaration> {
    let mut found: Vec<&Declaration> = sheet
        .blocks
        .iter()
        .enumerate()
        .filter(|(_, b)| b.depth > 0 && !b.is_at_rule())
        .filter(|(i, _)| !sheet.parents(*i).any(|p| mentions_feature(&p.selector)))
        .flat_map(|(_, b)| b.declarations.iter().filter(|d| is_animated(d)))
        .collect();
    found.sort_by_key(|d| d.offset);
    found
}

impl Check for ReducedMotion {
    fn id(&self) -> &'static str {
        ID
    }

    fn code(&self) -> &'static str {
        CODE
    }

    fn description(&self) -> &'static str {
        "Animations must offer a prefers-reduced-motion alternative"
    }

    fn content_type(&self) -> ContentType {
        ContentType::Style
    }

    fn default_weight(&self) -> u8 {
        5
    }

    fn tiers(&self) -> &'static [&'static str] {
        &["standard"]
    }

    fn evaluate(&self, ctx: &EvalContext<'_>) -> Result<EvaluationResult, CheckError> {
        let sheet = ctx.stylesheet();
        let animated = animated_declarations(sheet);
        let mut result = EvaluationResult::with_elements(animated.len());
        let Some(first) = animated.first() else {
            return Ok(result);
        };

        let guarded = has_guard(sheet)
            || ctx
                .styles
                .import_closure(ctx.path)
                .into_iter()
                .skip(1)
                .filter_map(|p| ctx.styles.sheet(p))
                .any(has_guard);
        if !guarded {
            result.push(
                Finding::new(
                    ID,
                    Severity::Error,
                    ctx.path,
                    "Animation without a prefers-reduced-motion alternative",
                )
                .with_line(first.line)
                .with_snippet(ctx.line_text(first.line).trim()),
            );
        }
        Ok(result)
    }
}
