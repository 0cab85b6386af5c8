//! Check for text alternatives on images.
//!
//! # Rationale
//!
//! Screen readers announce images through their `alt` text. An image
//! without one is read as its file name, or skipped without notice.
//!
//! # Detected Patterns
//!
//! - `<img>` and `<area>` without an `alt` attribute
//! - `<input type="image">` without a non-empty `alt`
//!
//! # Allowed Patterns
//!
//! - `alt=""` on decorative images
//! - `aria-label` / `aria-labelledby` naming the image
//! - `role="presentation"`, `role="none"` or `aria-hidden="true"`
//! - bound values such as `:alt="caption"` or `alt={caption}`
//!
//! # Suppression
//!
//! - `<!-- a11y-lint: allow(image-alt) reason="..." -->`

use a11y_lint_core::utils::Element;
use a11y_lint_core::{
    Check, CheckError, ContentType, EvalContext, EvaluationResult, Finding, Severity,
};

/// Check code for image-alt.
pub const CODE: &str = "AX001";

/// Check id for image-alt.
pub const ID: &str = "image-alt";

/// Requires a text alternative on images.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageAlt;

impl ImageAlt {
    /// Creates the check.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

fn is_image(element: &Element) -> bool {
    match element.name.as_str() {
        "img" | "area" => true,
        "input" => element
            .attr_value("type")
            .is_some_and(|t| t.eq_ignore_ascii_case("image")),
        _ => false,
    }
}

/// Returns true if assistive technology is told to skip the element.
pub(crate) fn is_hidden(element: &Element) -> bool {
    let role = element.attr_value("role").unwrap_or_default();
    role.eq_ignore_ascii_case("presentation")
        || role.eq_ignore_ascii_case("none")
        || element
            .attr_value("aria-hidden")
            .is_some_and(|v| v.eq_ignore_ascii_case("true"))
}

/// Returns true if ARIA attributes give the element a name.
pub(crate) fn has_aria_name(element: &Element) -> bool {
    element.has_non_empty_attr("aria-label") || element.has_non_empty_attr("aria-labelledby")
}

impl Check for ImageAlt {
    fn id(&self) -> &'static str {
        ID
    }

    fn code(&self) -> &'static str {
        CODE
    }

    fn description(&self) -> &'static str {
        "Images must have a text alternative"
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
        let images: Vec<&Element> = ctx.elements().iter().filter(|e| is_image(e)).collect();
        let mut result = EvaluationResult::with_elements(images.len());

        for image in images {
            if is_hidden(image) || has_aria_name(image) {
                continue;
            }
            let message = match image.name.as_str() {
                // An empty alt on an image button leaves the button unnamed.
                "input" if !image.has_non_empty_attr("alt") => {
                    "Image button has no alt text".to_string()
                }
                "input" => continue,
                name if !image.has_attr("alt") => {
                    format!("<{name}> is missing an alt attribute")
                }
                _ => continue,
            };
            result.push(
                Finding::new(ID, Severity::Error, ctx.path, message)
                    .with_line(image.line)
                    .with_snippet(image.snippet()),
            );
        }
        Ok(result)
    }
}
