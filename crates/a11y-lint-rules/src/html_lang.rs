//! Check for a document language.
//!
//! # Rationale
//!
//! Screen readers pick pronunciation rules from the `lang` attribute of the
//! root element. Without it the user's default voice reads every page.
//!
//! # Detected Patterns
//!
//! - `<html>` without `lang`, or with a blank or malformed value
//!
//! Files without an `<html>` element (component fragments) are not
//! applicable.

use a11y_lint_core::{
    Check, CheckError, ContentType, EvalContext, EvaluationResult, Finding, Severity,
};

/// Check code for html-lang.
pub const CODE: &str = "AX002";

/// Check id for html-lang.
pub const ID: &str = "html-lang";

/// Requires a valid `lang` on the document element.
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlLang;

impl HtmlLang {
    /// Creates the check.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

/// Loose BCP 47 shape: a 2-3 letter (or 5-8 letter) primary subtag followed
/// by alphanumeric subtags of up to 8 characters.
fn is_language_tag(value: &str) -> bool {
    let mut parts = value.split('-');
    let primary_ok = parts.next().is_some_and(|p| {
        matches!(p.len(), 2 | 3 | 5..=8) && p.chars().all(|c| c.is_ascii_alphabetic())
    });
    primary_ok
        && parts.all(|p| (1..=8).contains(&p.len()) && p.chars().all(|c| c.is_ascii_alphanumeric()))
}

impl Check for HtmlLang {
    fn id(&self) -> &'static str {
        ID
    }

    fn code(&self) -> &'static str {
        CODE
    }

    fn description(&self) -> &'static str {
        "The <html> element must declare a language"
    }

    fn content_type(&self) -> ContentType {
        ContentType::Html
    }

    fn default_weight(&self) -> u8 {
        7
    }

    fn tiers(&self) -> &'static [&'static str] {
        &["standard"]
    }

    fn evaluate(&self, ctx: &EvalContext<'_>) -> Result<EvaluationResult, CheckError> {
        let roots: Vec<_> = ctx.elements_named("html").collect();
        let mut result = EvaluationResult::with_elements(roots.len());

        for root in roots {
            let message = match root.attr("lang") {
                Some(lang) if lang.dynamic => continue,
                Some(lang) => match lang.value.as_deref().map(str::trim) {
                    Some(v) if is_language_tag(v) => continue,
                    Some("") | None => "<html> element has an empty lang attribute".to_string(),
                    Some(v) => format!("<html> element has an invalid lang value \"{v}\""),
                },
                None => "<html> element has no lang attribute".to_string(),
            };
            result.push(
                Finding::new(ID, Severity::Error, ctx.path, message)
                    .with_line(root.line)
                    .with_snippet(root.snippet()),
            );
        }
        Ok(result)
    }
}
