//! Heuristic stylesheet scanner.
//!
//! Splits CSS/SCSS/Less text into rule blocks, declarations and at-rule
//! statements. This is not a full grammar: it tracks braces, quotes and
//! parentheses, which is enough to find selectors, `property: value`
//! pairs, variable bindings and `@import`/`@use` directives. Sass indented
//! syntax is not supported.

use crate::utils::lines::LineIndex;

/// A `property: value` declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    /// Property (or variable) name as written, e.g. `color`, `$brand`, `--fg`.
    pub property: String,
    /// Raw value text, trimmed.
    pub value: String,
    /// Byte offset of the property name.
    pub offset: usize,
    /// Line of the property name (1-indexed).
    pub line: usize,
}

impl Declaration {
    /// Value with trailing `!default`, `!global` and `!important` flags removed.
    #[must_use]
    pub fn value_without_flags(&self) -> &str {
        strip_flags(&self.value)
    }

    /// Lowercased property name.
    #[must_use]
    pub fn property_lower(&self) -> String {
        self.property.to_ascii_lowercase()
    }
}

/// A rule block: selector (or at-rule prelude) plus its own declarations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleBlock {
    /// Selector text, or at-rule prelude such as `@media (min-width: 40em)`.
    /// Empty for the top-level pseudo block.
    pub selector: String,
    /// Byte offset of the selector.
    pub offset: usize,
    /// Line of the selector (1-indexed).
    pub line: usize,
    /// Nesting depth; the top-level pseudo block has depth 0.
    pub depth: usize,
    /// Declarations directly inside this block (not in nested blocks).
    pub declarations: Vec<Declaration>,
}

impl StyleBlock {
    /// Returns true if this block is an at-rule block (`@media`, `@mixin`, ...).
    #[must_use]
    pub fn is_at_rule(&self) -> bool {
        self.selector.starts_with('@')
    }

    /// Last declaration of the given property (case-insensitive).
    #[must_use]
    pub fn last(&self, property: &str) -> Option<&Declaration> {
        self.declarations
            .iter()
            .rev()
            .find(|d| d.property.eq_ignore_ascii_case(property))
    }
}

/// An at-rule statement terminated by `;`, e.g. `@import "a";`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
    /// At-rule name without `@`, lowercased (e.g. `import`, `use`, `include`).
    pub name: String,
    /// Everything after the name, trimmed.
    pub params: String,
    /// Byte offset of the `@`.
    pub offset: usize,
    /// Line of the statement (1-indexed).
    pub line: usize,
}

/// A scanned stylesheet.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StyleSheet {
    /// Blocks in document order; index 0 is the top-level pseudo block.
    pub blocks: Vec<StyleBlock>,
    /// At-rule statements in document order.
    pub statements: Vec<Statement>,
}

impl StyleSheet {
    /// Scans stylesheet text.
    #[must_use]
    pub fn parse(content: &str) -> Self {
        Scanner::new(content).run()
    }

    /// All declarations of all blocks, in document order.
    #[must_use]
    pub fn declarations(&self) -> Vec<&Declaration> {
        let mut all: Vec<&Declaration> = self
            .blocks
            .iter()
            .flat_map(|b| b.declarations.iter())
            .collect();
        all.sort_by_key(|d| d.offset);
        all
    }

    /// Enclosing blocks of `blocks[index]`, innermost first. The top-level
    /// pseudo block is not included.
    pub fn parents(&self, index: usize) -> impl Iterator<Item = &StyleBlock> {
        let mut depth = self.blocks.get(index).map_or(0, |b| b.depth);
        self.blocks[..index.min(self.blocks.len())]
            .iter()
            .rev()
            .filter(move |b| {
                if b.depth > 0 && b.depth < depth {
                    depth = b.depth;
                    true
                } else {
                    false
                }
            })
    }

    /// Rule blocks with a real selector (at-rule blocks and the top level excluded).
    pub fn rules(&self) -> impl Iterator<Item = &StyleBlock> {
        self.blocks
            .iter()
            .filter(|b| b.depth > 0 && !b.is_at_rule())
    }
}

/// Removes trailing `!default`, `!global` and `!important` flags.
#[must_use]
pub fn strip_flags(value: &str) -> &str {
    let mut v = value.trim();
    loop {
        let lower = v.to_ascii_lowercase();
        let stripped = ["!default", "!global", "!important"]
            .iter()
            .find(|flag| lower.ends_with(*flag))
            .map(|flag| v[..v.len() - flag.len()].trim_end());
        match stripped {
            Some(rest) => v = rest,
            None => return v,
        }
    }
}

/// Replaces `/* */` and `//` comments with spaces, preserving offsets and newlines.
#[must_use]
pub fn blank_comments(content: &str) -> String {
    let bytes = content.as_bytes();
    let mut out = bytes.to_vec();
    let mut i = 0;
    let mut quote: Option<u8> = None;
    while i < bytes.len() {
        let c = bytes[i];
        if let Some(q) = quote {
            if c == b'\\' {
                i += 2;
                continue;
            }
            if c == q || c == b'\n' {
                quote = None;
            }
            i += 1;
            continue;
        }
        match c {
            b'"' | b'\'' => {
                quote = Some(c);
                i += 1;
            }
            b'/' if bytes.get(i + 1) == Some(&b'*') => {
                let end = content[i + 2..]
                    .find("*/")
                    .map_or(bytes.len(), |p| i + 2 + p + 2);
                blank(&mut out, i, end);
                i = end;
            }
            // `//` starts a line comment unless it is part of a URL (`http://`).
            b'/' if bytes.get(i + 1) == Some(&b'/') && (i == 0 || bytes[i - 1] != b':') => {
                let end = content[i..].find('\n').map_or(bytes.len(), |p| i + p);
                blank(&mut out, i, end);
                i = end;
            }
            _ => i += 1,
        }
    }
    // Only ASCII bytes were replaced by ASCII spaces.
    String::from_utf8(out).unwrap_or_else(|_| content.to_string())
}

fn blank(out: &mut [u8], start: usize, end: usize) {
    let len = out.len();
    for b in &mut out[start..end.min(len)] {
        if *b != b'\n' {
            *b = b' ';
        }
    }
}

/// Finds the first occurrence of `needle` outside quotes and parentheses.
#[must_use]
pub fn find_top_level(text: &str, needle: u8) -> Option<usize> {
    let mut depth = 0usize;
    let mut quote: Option<u8> = None;
    for (i, &c) in text.as_bytes().iter().enumerate() {
        if let Some(q) = quote {
            if c == q {
                quote = None;
            }
            continue;
        }
        match c {
            b'"' | b'\'' => quote = Some(c),
            b'(' => depth += 1,
            b')' => depth = depth.saturating_sub(1),
            c if c == needle && depth == 0 => return Some(i),
            _ => {}
        }
    }
    None
}

/// Splits on top-level commas.
#[must_use]
pub fn split_top_level(text: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut rest = text;
    while let Some(i) = find_top_level(rest, b',') {
        parts.push(rest[..i].trim());
        rest = &rest[i + 1..];
    }
    if !rest.trim().is_empty() {
        parts.push(rest.trim());
    }
    parts
}

struct Scanner<'a> {
    text: String,
    lines: LineIndex<'a>,
    sheet: StyleSheet,
    stack: Vec<usize>,
}

impl<'a> Scanner<'a> {
    fn new(content: &'a str) -> Self {
        Self {
            text: blank_comments(content),
            lines: LineIndex::new(content),
            sheet: StyleSheet {
                blocks: vec![StyleBlock {
                    selector: String::new(),
                    offset: 0,
                    line: 1,
                    depth: 0,
                    declarations: Vec::new(),
                }],
                statements: Vec::new(),
            },
            stack: vec![0],
        }
    }

    fn run(mut self) -> StyleSheet {
        let text = std::mem::take(&mut self.text);
        let bytes = text.as_bytes();
        let mut seg_start = 0;
        let mut parens = 0usize;
        let mut quote: Option<u8> = None;
        let mut i = 0;

        while i < bytes.len() {
            let c = bytes[i];
            if let Some(q) = quote {
                if c == b'\\' {
                    i += 2;
                    continue;
                }
                if c == q {
                    quote = None;
                }
                i += 1;
                continue;
            }
            match c {
                b'"' | b'\'' => quote = Some(c),
                b'(' => parens += 1,
                b')' => parens = parens.saturating_sub(1),
                // `#{...}` interpolation is part of the surrounding text.
                b'{' if i > 0 && bytes[i - 1] == b'#' => {
                    i = text[i..].find('}').map_or(bytes.len(), |p| i + p + 1);
                    continue;
                }
                b'{' if parens == 0 => {
                    self.open_block(&text, seg_start, i);
                    seg_start = i + 1;
                }
                b';' if parens == 0 => {
                    self.segment(&text, seg_start, i);
                    seg_start = i + 1;
                }
                b'}' => {
                    self.segment(&text, seg_start, i);
                    if self.stack.len() > 1 {
                        self.stack.pop();
                    }
                    parens = 0;
                    seg_start = i + 1;
                }
                _ => {}
            }
            i += 1;
        }
        self.segment(&text, seg_start, bytes.len());
        self.sheet
    }

    fn open_block(&mut self, text: &str, start: usize, end: usize) {
        let raw = &text[start..end];
        let offset = start + (raw.len() - raw.trim_start().len());
        let block = StyleBlock {
            selector: raw.trim().to_string(),
            offset,
            line: self.lines.line_at(offset),
            depth: self.stack.len(),
            declarations: Vec::new(),
        };
        self.sheet.blocks.push(block);
        self.stack.push(self.sheet.blocks.len() - 1);
    }

    fn segment(&mut self, text: &str, start: usize, end: usize) {
        let raw = &text[start..end];
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return;
        }
        let offset = start + (raw.len() - raw.trim_start().len());
        let line = self.lines.line_at(offset);

        if trimmed.starts_with('@') && !is_less_variable(trimmed) {
            let body = &trimmed[1..];
            let name_end = body
                .find(|c: char| !(c.is_alphanumeric() || c == '-' || c == '_' || c == '.'))
                .unwrap_or(body.len());
            self.sheet.statements.push(Statement {
                name: body[..name_end].to_ascii_lowercase(),
                params: body[name_end..].trim().to_string(),
                offset,
                line,
            });
            return;
        }

        if let Some(colon) = find_top_level(trimmed, b':') {
            let property = trimmed[..colon].trim();
            if property.is_empty() || property.contains(char::is_whitespace) {
                return;
            }
            let current = self.stack.last().copied().unwrap_or(0);
            self.sheet.blocks[current].declarations.push(Declaration {
                property: property.to_string(),
                value: trimmed[colon + 1..].trim().to_string(),
                offset,
                line,
            });
        }
    }
}

fn is_less_variable(segment: &str) -> bool {
    let body = &segment[1..];
    let name_len = body
        .find(|c: char| !(c.is_alphanumeric() || c == '-' || c == '_'))
        .unwrap_or(body.len());
    name_len > 0 && body[name_len..].trim_start().starts_with(':')
}
