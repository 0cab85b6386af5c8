//! Check for accessible names on interactive controls.
//!
//! # Rationale
//!
//! A button or link announced only as "button" or "link" gives no hint of
//! what it does. Icon-only controls are the usual offenders.
//!
//! # Detected Patterns
//!
//! - `<button>`, `<a href>` and elements with `role="button"` / `role="link"`
//!   without text content, `aria-label`, `aria-labelledby`, `title` or an
//!   inner image with alt text
//! - `<input type="submit|button|reset">` without a `value` or ARIA name
//!
//! Framework components (`<Button>`) are skipped: their rendered markup is
//! not visible here.

use crate::image_alt::{has_aria_name, is_hidden};
use a11y_lint_core::utils::{markup, Element};
use a11y_lint_core::{
    Check, CheckError, ContentType, EvalContext, EvaluationResult, Finding, Severity,
};

/// Check code for control-name.
pub const CODE: &str = "AX003";

/// Check id for control-name.
pub const ID: &str = "control-name";

/// Requires an accessible name on buttons and links.
#[derive(Debug, Clone, Copy, Default)]
pub struct ControlName;

impl ControlName {
    /// Creates the check.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Control {
    Button,
    Link,
    InputButton,
}

impl Control {
    fn of(element: &Element) -> Option<Self> {
        if element.is_component() {
            return None;
        }
        let role = element.attr_value("role").map(str::to_ascii_lowercase);
        match (element.name.as_str(), role.as_deref()) {
            (_, Some("button")) | ("button", None) => Some(Self::Button),
            (_, Some("link")) => Some(Self::Link),
            ("a", None) if element.has_attr("href") => Some(Self::Link),
            ("input", _) => {
                let kind = element.attr_value("type").unwrap_or_default();
                ["submit", "button", "reset"]
                    .iter()
                    .any(|t| kind.eq_ignore_ascii_case(t))
                    .then_some(Self::InputButton)
            }
            _ => None,
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Button | Self::InputButton => "Button",
            Self::Link => "Link",
        }
    }
}

fn has_inner_name(element: &Element) -> bool {
    if !element.inner_text().is_empty() {
        return true;
    }
    element.inner.as_deref().is_some_and(|inner| {
        markup::elements(inner).iter().any(|child| {
            (child.name == "img" && child.has_non_empty_attr("alt"))
                || (!is_hidden(child) && has_aria_name(child))
        })
    })
}

fn has_name(element: &Element, control: Control) -> bool {
    if has_aria_name(element) || element.has_non_empty_attr("title") {
        return true;
    }
    match control {
        // Submit and reset inputs fall back to a localized default label.
        Control::InputButton => {
            element.has_non_empty_attr("value")
                || element
                    .attr_value("type")
                    .is_some_and(|t| !t.eq_ignore_ascii_case("button"))
        }
        Control::Button | Control::Link => has_inner_name(element),
    }
}

impl Check for ControlName {
    fn id(&self) -> &'static str {
        ID
    }

    fn code(&self) -> &'static str {
        CODE
    }

    fn description(&self) -> &'static str {
        "Buttons and links must have an accessible name"
    }

    fn content_type(&self) -> ContentType {
        ContentType::Html
    }

    fn default_weight(&self) -> u8 {
        10
    }

    fn tiers(&self) -> &'static [&'static str] {
        &["quick", "standard"]
    }

    fn evaluate(&self, ctx: &EvalContext<'_>) -> Result<EvaluationResult, CheckError> {
        let controls: Vec<(&Element, Control)> = ctx
            .elements()
            .iter()
            .filter_map(|e| Control::of(e).map(|c| (e, c)))
            .collect();
        let mut result = EvaluationResult::with_elements(controls.len());

        for (element, control) in controls {
            if element.attr_value("aria-hidden") == Some("true") || has_name(element, control) {
                continue;
            }
            result.push(
                Finding::new(
                    ID,
                    Severity::Error,
                    ctx.path,
                    format!("{} has no accessible name", control.label()),
                )
                .with_line(element.line)
                .with_snippet(element.snippet()),
            );
        }
        Ok(result)
    }
}
