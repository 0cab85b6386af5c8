//! Check for valid ARIA roles.
//!
//! # Rationale
//!
//! Assistive technology ignores unknown roles and falls back to the
//! element's native semantics, so a misspelled role silently does nothing.
//! Abstract roles exist only for the ontology and must not be used.
//!
//! # Detected Patterns
//!
//! - `role` values with no known WAI-ARIA, DPUB-ARIA or Graphics-ARIA token
//! - abstract roles such as `widget` or `landmark`
//!
//! A space-separated role list is valid when its first token is: later
//! tokens are fallbacks.

use a11y_lint_core::{
    Check, CheckError, ContentType, EvalContext, EvaluationResult, Finding, Severity,
};

/// Check code for aria-role.
pub const CODE: &str = "AX005";

/// Check id for aria-role.
pub const ID: &str = "aria-role";

const ROLES: &[&str] = &[
    "alert", "alertdialog", "application", "article", "banner", "blockquote", "button",
    "caption", "cell", "checkbox", "code", "columnheader", "combobox", "complementary",
    "contentinfo", "definition", "deletion", "dialog", "directory", "document", "emphasis",
    "feed", "figure", "form", "generic", "grid", "gridcell", "group", "heading", "img",
    "insertion", "link", "list", "listbox", "listitem", "log", "main", "mark", "marquee",
    "math", "menu", "menubar", "menuitem", "menuitemcheckbox", "menuitemradio", "meter",
    "navigation", "none", "note", "option", "paragraph", "presentation", "progressbar",
    "radio", "radiogroup", "region", "row", "rowgroup", "rowheader", "scrollbar", "search",
    "searchbox", "separator", "slider", "spinbutton", "status", "strong", "subscript",
    "superscript", "switch", "tab", "table", "tablist", "tabpanel", "term", "textbox", "time",
    "timer", "toolbar", "tooltip", "tree", "treegrid", "treeitem",
    "graphics-document", "graphics-object", "graphics-symbol",
];

const ABSTRACT_ROLES: &[&str] = &[
    "command", "composite", "input", "landmark", "range", "roletype", "section",
    "sectionhead", "select", "structure", "widget", "window",
];

const DPUB_ROLES: &[&str] = &[
    "abstract", "acknowledgments", "afterword", "appendix", "backlink", "biblioentry",
    "bibliography", "biblioref", "chapter", "colophon", "conclusion", "cover", "credit",
    "credits", "dedication", "endnote", "endnotes", "epigraph", "epilogue", "errata",
    "example", "footnote", "foreword", "glossary", "glossref", "index", "introduction",
    "noteref", "notice", "pagebreak", "pagelist", "part", "preface", "prologue",
    "pullquote", "qna", "subtitle", "tip", "toc",
];

/// Requires every static `role` to name a concrete ARIA role.
#[derive(Debug, Clone, Copy, Default)]
pub struct AriaRole;

impl AriaRole {
    /// Creates the check.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

enum RoleProblem {
    Unknown,
    Abstract,
}

fn classify(role: &str) -> Option<RoleProblem> {
    let role = role.to_ascii_lowercase();
    if ROLES.contains(&role.as_str()) {
        return None;
    }
    if let Some(dpub) = role.strip_prefix("doc-") {
        return (!DPUB_ROLES.contains(&dpub)).then_some(RoleProblem::Unknown);
    }
    if ABSTRACT_ROLES.contains(&role.as_str()) {
        Some(RoleProblem::Abstract)
    } else {
        Some(RoleProblem::Unknown)
    }
}

impl Check for AriaRole {
    fn id(&self) -> &'static str {
        ID
    }

    fn code(&self) -> &'static str {
        CODE
    }

    fn description(&self) -> &'static str {
        "ARIA roles must be valid and non-abstract"
    }

    fn content_type(&self) -> ContentType {
        ContentType::Html
    }

    fn default_weight(&self) -> u8 {
        6
    }

    fn tiers(&self) -> &'static [&'static str] {
        &["standard"]
    }

    fn evaluate(&self, ctx: &EvalContext<'_>) -> Result<EvaluationResult, CheckError> {
        let mut result = EvaluationResult::not_applicable();

        for element in ctx.elements() {
            let Some(role) = element.attr("role").filter(|a| !a.dynamic) else {
                continue;
            };
            result.elements_found += 1;
            let Some(first) = role.value.as_deref().and_then(|v| v.split_whitespace().next())
            else {
                result.push(
                    Finding::new(ID, Severity::Error, ctx.path, "Empty ARIA role")
                        .with_line(element.line)
                        .with_snippet(element.snippet()),
                );
                continue;
            };
            let message = match classify(first) {
                None => continue,
                Some(RoleProblem::Unknown) => format!("Unknown ARIA role '{first}'"),
                Some(RoleProblem::Abstract) => {
                    format!("Abstract ARIA role '{first}' cannot be used on elements")
                }
            };
            result.push(
                Finding::new(ID, Severity::Error, ctx.path, message)
                    .with_line(element.line)
                    .with_snippet(element.snippet()),
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
        let file = SourceFile::new("menu.svelte", content, ContentType::Html, "menu");
        let styles = StyleResolver::empty();
        let ctx = EvalContext::new(&file, &styles);
        AriaRole::new().evaluate(&ctx).unwrap()
    }

    #[test]
    fn test_valid_roles() {
        let result = check_markup(
            r#"<nav role="navigation"></nav>
<div role="Button"></div>
<section role="doc-chapter"></section>
<div role="switch checkbox"></div>
<div :role="computedRole"></div>"#,
        );
        assert_eq!(result.elements_found, 4);
        assert!(result.findings.is_empty());
    }

    #[test]
    fn test_unknown_abstract_and_empty_roles() {
        let result = check_markup(
            r#"<div role="buton"></div>
<div role="widget"></div>
<div role="doc-nope"></div>
<div role=""></div>"#,
        );
        let messages: Vec<_> = result.findings.iter().map(|f| f.message.as_str()).collect();
        assert_eq!(
            messages,
            [
                "Unknown ARIA role 'buton'",
                "Abstract ARIA role 'widget' cannot be used on elements",
                "Unknown ARIA role 'doc-nope'",
                "Empty ARIA role",
            ]
        );
    }
}
