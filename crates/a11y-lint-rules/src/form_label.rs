//! Check for labels on form controls.
//!
//! # Rationale
//!
//! Placeholder text disappears on input and is not a reliable name. Every
//! form field needs a programmatic label.
//!
//! # Detected Patterns
//!
//! - `<input>` (except hidden and button types), `<select>` and
//!   `<textarea>` without any of:
//!   - a `<label for="...">` matching its `id`
//!   - an enclosing `<label>`
//!   - `aria-label`, `aria-labelledby` or `title`

use crate::image_alt::has_aria_name;
use a11y_lint_core::utils::Element;
use a11y_lint_core::{
    Check, CheckError, ContentType, EvalContext, EvaluationResult, Finding, Severity,
};
use std::collections::HashSet;
use std::ops::Range;

/// Check code for form-label.
pub const CODE: &str = "AX004";

/// Check id for form-label.
pub const ID: &str = "form-label";

/// Input types that are not labelled fields.
const UNLABELLED_INPUT_TYPES: &[&str] = &["hidden", "submit", "button", "reset", "image"];

/// Requires a label on form fields.
#[derive(Debug, Clone, Copy, Default)]
pub struct FormLabel;

impl FormLabel {
    /// Creates the check.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

fn is_field(element: &Element) -> bool {
    match element.name.as_str() {
        "select" | "textarea" => true,
        "input" => {
            let kind = element.attr_value("type").unwrap_or("text");
            !UNLABELLED_INPUT_TYPES
                .iter()
                .any(|t| kind.eq_ignore_ascii_case(t))
        }
        _ => false,
    }
}

/// Byte range covered by an element and its content.
fn span(element: &Element) -> Range<usize> {
    let len = element.tag.len() + element.inner.as_ref().map_or(0, String::len);
    element.offset..element.offset + len
}

fn describe(element: &Element) -> String {
    match element.attr_value("type") {
        Some(kind) if element.name == "input" => format!("<input type=\"{kind}\">"),
        _ => format!("<{}>", element.name),
    }
}

impl Check for FormLabel {
    fn id(&self) -> &'static str {
        ID
    }

    fn code(&self) -> &'static str {
        CODE
    }

    fn description(&self) -> &'static str {
        "Form fields must have a label"
    }

    fn content_type(&self) -> ContentType {
        ContentType::Html
    }

    fn default_weight(&self) -> u8 {
        8
    }

    fn tiers(&self) -> &'static [&'static str] {
        &["standard"]
    }

    fn evaluate(&self, ctx: &EvalContext<'_>) -> Result<EvaluationResult, CheckError> {
        let fields: Vec<&Element> = ctx.elements().iter().filter(|e| is_field(e)).collect();
        let mut result = EvaluationResult::with_elements(fields.len());
        if fields.is_empty() {
            return Ok(result);
        }

        let labels: Vec<&Element> = ctx.elements_named("label").collect();
        let label_targets: HashSet<&str> =
            labels.iter().filter_map(|l| l.attr_value("for")).collect();
        let wrappers: Vec<Range<usize>> = labels.iter().map(|l| span(l)).collect();
        let dynamic_for = labels
            .iter()
            .any(|l| l.attr("for").is_some_and(|a| a.dynamic));

        for field in fields {
            let labelled = has_aria_name(field)
                || field.has_non_empty_attr("title")
                || field.attr_value("id").is_some_and(|id| label_targets.contains(id))
                || (dynamic_for && field.attr("id").is_some_and(|a| a.dynamic))
                || wrappers.iter().any(|w| w.contains(&field.offset));
            if labelled {
                continue;
            }
            result.push(
                Finding::new(
                    ID,
                    Severity::Error,
                    ctx.path,
                    format!("Form field {} has no label", describe(field)),
                )
                .with_line(field.line)
                .with_snippet(field.snippet()),
            );
        }
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use a11y_lint_core::{SourceFile, StyleResolver};

    fn check_markup(content: &str) -> EvaluationResult {
        let file = SourceFile::new("signup.html", content, ContentType::Html, "signup");
        let styles = StyleResolver::empty();
        let ctx = EvalContext::new(&file, &styles);
        FormLabel::new().evaluate(&ctx).unwrap()
    }

    #[test]
    fn test_detects_unlabelled_fields() {
        let result = check_markup(
            r#"<form>
  <input type="email" placeholder="Email">
  <select name="country"></select>
  <textarea></textarea>
  <input name="q">
</form>"#,
        );
        assert_eq!(result.elements_found, 4);
        let messages: Vec<_> = result.findings.iter().map(|f| f.message.as_str()).collect();
        assert_eq!(
            messages,
            [
                "Form field <input type=\"email\"> has no label",
                "Form field <select> has no label",
                "Form field <textarea> has no label",
                "Form field <input> has no label",
            ]
        );
    }

    #[test]
    fn test_accepts_labelled_fields() {
        let result = check_markup(
            r#"<label for="email">Email</label>
<input id="email" type="email">
<label>Name <input type="text"></label>
<input type="search" aria-label="Search">
<textarea title="Comments"></textarea>
<label :for="fieldId">Dynamic</label><input :id="fieldId">"#,
        );
        assert_eq!(result.elements_found, 5);
        assert!(result.findings.is_empty(), "{:?}", result.findings);
    }

    #[test]
    fn test_ignores_non_field_inputs() {
        let result = check_markup(
            r#"<input type="hidden" name="csrf"><input type="submit" value="Send">"#,
        );
        assert!(!result.is_applicable());
    }
}
