//! Heuristic markup scanner for HTML and component templates.
//!
//! Extracts opening tags with their attributes and, where a matching close
//! tag follows, the inner markup. Framework binding syntax is normalized to
//! plain attribute names:
//!
//! | Syntax | Example | Normalized |
//! |---|---|---|
//! | Vue shorthand | `:alt="x"` | `alt` (dynamic) |
//! | Vue long form | `v-bind:alt="x"` | `alt` (dynamic) |
//! | Angular | `[alt]="x"`, `[attr.aria-label]="x"` | `alt`, `aria-label` (dynamic) |
//! | JSX / Svelte | `alt={x}` | `alt` (dynamic) |
//! | JSX naming | `className`, `htmlFor` | `class`, `for` |

use super::lines::LineIndex;
use regex::Regex;
use std::sync::OnceLock;

static TAG: OnceLock<Regex> = OnceLock::new();
static ATTR: OnceLock<Regex> = OnceLock::new();
static INNER_TAG: OnceLock<Regex> = OnceLock::new();

#[allow(clippy::expect_used)]
fn tag_pattern() -> &'static Regex {
    TAG.get_or_init(|| {
        Regex::new(r#"<([A-Za-z][A-Za-z0-9:._-]*)((?:[^>"'{]|"[^"]*"|'[^']*'|\{[^}]*\})*)>"#)
            .expect("valid regex")
    })
}

#[allow(clippy::expect_used)]
fn attr_pattern() -> &'static Regex {
    ATTR.get_or_init(|| {
        Regex::new(r#"([^\s"'<>/=]+)(?:\s*=\s*(?:"([^"]*)"|'([^']*)'|(\{[^}]*\})|([^\s"'>]+)))?"#)
            .expect("valid regex")
    })
}

#[allow(clippy::expect_used)]
fn inner_tag_pattern() -> &'static Regex {
    INNER_TAG.get_or_init(|| Regex::new(r"<[^>]*>").expect("valid regex"))
}

/// One attribute of an element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    /// Normalized, lowercased attribute name.
    pub name: String,
    /// Literal value; `None` for bare attributes and bound expressions.
    pub value: Option<String>,
    /// True if the value is bound to a framework expression.
    pub dynamic: bool,
}

impl Attribute {
    /// Returns true if the attribute carries a non-blank literal or any binding.
    #[must_use]
    pub fn is_non_empty(&self) -> bool {
        self.dynamic || self.value.as_deref().is_some_and(|v| !v.trim().is_empty())
    }
}

/// An element found in markup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    /// Tag name: lowercased for native elements, as written for components.
    pub name: String,
    /// Attributes in source order.
    pub attributes: Vec<Attribute>,
    /// Byte offset of `<`.
    pub offset: usize,
    /// Line of the tag (1-indexed).
    pub line: usize,
    /// The opening tag as written.
    pub tag: String,
    /// Markup between the opening tag and its close tag, if one was found.
    pub inner: Option<String>,
}

impl Element {
    /// Returns true for capitalized component tags (`<Button>`).
    #[must_use]
    pub fn is_component(&self) -> bool {
        self.name.starts_with(|c: char| c.is_ascii_uppercase())
    }

    /// Looks up an attribute by normalized name.
    #[must_use]
    pub fn attr(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.name == name)
    }

    /// Returns true if the attribute is present.
    #[must_use]
    pub fn has_attr(&self, name: &str) -> bool {
        self.attr(name).is_some()
    }

    /// Literal value of an attribute.
    #[must_use]
    pub fn attr_value(&self, name: &str) -> Option<&str> {
        self.attr(name).and_then(|a| a.value.as_deref())
    }

    /// Returns true if the attribute is present with non-blank content.
    #[must_use]
    pub fn has_non_empty_attr(&self, name: &str) -> bool {
        self.attr(name).is_some_and(Attribute::is_non_empty)
    }

    /// Visible text content with tags removed and whitespace collapsed.
    /// Template expressions (`{{ x }}`, `{x}`) count as text.
    #[must_use]
    pub fn inner_text(&self) -> String {
        let Some(inner) = &self.inner else {
            return String::new();
        };
        let text = inner_tag_pattern().replace_all(inner, " ");
        text.split_whitespace().collect::<Vec<_>>().join(" ")
    }

    /// Opening tag shortened for reports.
    #[must_use]
    pub fn snippet(&self) -> String {
        const MAX: usize = 120;
        let tag: String = self.tag.split_whitespace().collect::<Vec<_>>().join(" ");
        if tag.chars().count() <= MAX {
            tag
        } else {
            let cut: String = tag.chars().take(MAX).collect();
            format!("{cut}...")
        }
    }
}

/// Scans markup for elements. HTML comments are skipped.
#[must_use]
pub fn elements(content: &str) -> Vec<Element> {
    let text = blank_html_comments(content);
    let lines = LineIndex::new(content);
    let mut out = Vec::new();

    for cap in tag_pattern().captures_iter(&text) {
        let Some(whole) = cap.get(0) else { continue };
        let raw_name = &cap[1];
        let body = cap.get(2).map_or("", |m| m.as_str());
        let name = if raw_name.starts_with(|c: char| c.is_ascii_uppercase()) {
            raw_name.to_string()
        } else {
            raw_name.to_ascii_lowercase()
        };
        let self_closing = body.trim_end().ends_with('/');
        let inner = if self_closing || is_void(&name) {
            None
        } else {
            find_inner(&text, whole.end(), raw_name)
        };

        out.push(Element {
            attributes: parse_attributes(body.trim_end().trim_end_matches('/')),
            offset: whole.start(),
            line: lines.line_at(whole.start()),
            tag: content[whole.start()..whole.end()].to_string(),
            inner: inner.map(|(s, e)| content[s..e].to_string()),
            name,
        });
    }
    out
}

/// Parses an attribute list (the text after the tag name).
#[must_use]
pub fn parse_attributes(body: &str) -> Vec<Attribute> {
    attr_pattern()
        .captures_iter(body)
        .filter_map(|cap| {
            let raw = cap.get(1)?.as_str();
            let literal = cap
                .get(2)
                .or_else(|| cap.get(3))
                .or_else(|| cap.get(5))
                .map(|m| m.as_str().to_string());
            let braced = cap.get(4).is_some();
            let (name, bound) = normalize_name(raw)?;
            let dynamic = bound || braced;
            Some(Attribute {
                name,
                value: if dynamic { None } else { literal },
                dynamic,
            })
        })
        .collect()
}

/// Maps framework binding syntax to a plain attribute name.
/// Returns `None` for event handlers and directives that are not attributes.
fn normalize_name(raw: &str) -> Option<(String, bool)> {
    let (name, bound) = if let Some(rest) = raw.strip_prefix("v-bind:") {
        (rest, true)
    } else if let Some(rest) = raw.strip_prefix(':') {
        (rest, true)
    } else if let Some(rest) = raw.strip_prefix('[').and_then(|r| r.strip_suffix(']')) {
        (rest.strip_prefix("attr.").unwrap_or(rest), true)
    } else if raw.starts_with('@')
        || raw.starts_with('(')
        || raw.starts_with("v-on:")
        || raw.starts_with('#')
        || raw.starts_with('*')
    {
        return None;
    } else {
        (raw, false)
    };

    let name = match name {
        "className" => "class".to_string(),
        "htmlFor" => "for".to_string(),
        "tabIndex" => "tabindex".to_string(),
        other => other.to_ascii_lowercase(),
    };
    Some((name, bound))
}

fn is_void(name: &str) -> bool {
    matches!(
        name,
        "area" | "base" | "br" | "col" | "embed" | "hr" | "img" | "input" | "link" | "meta"
            | "source" | "track" | "wbr"
    )
}

/// Finds the inner range up to the first `</name>` after `from`.
fn find_inner(text: &str, from: usize, raw_name: &str) -> Option<(usize, usize)> {
    let close = format!("</{}", raw_name.to_ascii_lowercase());
    let lower = text[from..].to_ascii_lowercase();
    let mut search = 0;
    while let Some(pos) = lower[search..].find(&close) {
        let at = search + pos;
        let after = lower[at + close.len()..].chars().next();
        if matches!(after, Some('>' | ' ' | '\n' | '\t' | '\r')) {
            return Some((from, from + at));
        }
        search = at + close.len();
    }
    None
}

fn blank_html_comments(content: &str) -> String {
    let mut out = String::with_capacity(content.len());
    let mut rest = content;
    while let Some(start) = rest.find("<!--") {
        out.push_str(&rest[..start]);
        let body = &rest[start..];
        let end = body.find("-->").map_or(body.len(), |e| e + 3);
        // Multi-byte characters are kept so byte offsets stay aligned.
        out.extend(
            body[..end]
                .chars()
                .map(|c| if c == '\n' || c.len_utf8() > 1 { c } else { ' ' }),
        );
        rest = &body[end..];
    }
    out.push_str(rest);
    out
}
