//! Context passed to checks while they evaluate one file.

use crate::style::{ResolveError, Rgba, StyleResolver, StyleSheet};
use crate::types::{ContentType, SourceFile};
use crate::utils::lines::LineIndex;
use crate::utils::markup::{self, Element};

use std::cell::{Cell, OnceCell};
use std::path::Path;
use std::time::Instant;

/// Context provided to a check for one source file.
///
/// The runner creates one context per file and evaluates every applicable
/// check against it, so parsed markup and style sheets are computed once
/// and shared between checks.
#[derive(Debug)]
pub struct EvalContext<'a> {
    /// Path of the file.
    pub path: &'a Path,
    /// File contents.
    pub content: &'a str,
    /// Content type of the file.
    pub content_type: ContentType,
    /// Scored unit the file belongs to.
    pub unit_id: &'a str,
    /// Resolver shared by the whole scan.
    pub styles: &'a StyleResolver,
    lines: LineIndex<'a>,
    elements: OnceCell<Vec<Element>>,
    sheet: OnceCell<StyleSheet>,
    deadline: Cell<Option<Instant>>,
}

impl<'a> EvalContext<'a> {
    /// Creates a context for a source file.
    #[must_use]
    pub fn new(file: &'a SourceFile, styles: &'a StyleResolver) -> Self {
        Self {
            path: &file.path,
            content: &file.content,
            content_type: file.content_type,
            unit_id: &file.unit_id,
            styles,
            lines: LineIndex::new(&file.content),
            elements: OnceCell::new(),
            sheet: OnceCell::new(),
            deadline: Cell::new(None),
        }
    }

    /// Line (1-indexed) of a byte offset in the file.
    #[must_use]
    pub fn line_at(&self, offset: usize) -> usize {
        self.lines.line_at(offset)
    }

    /// Text of a line (1-indexed).
    #[must_use]
    pub fn line_text(&self, line: usize) -> &'a str {
        self.lines.line_text(line)
    }

    /// Markup elements of the file, scanned on first use.
    #[must_use]
    pub fn elements(&self) -> &[Element] {
        self.elements.get_or_init(|| markup::elements(self.content))
    }

    /// Elements with the given tag name.
    pub fn elements_named<'s>(&'s self, name: &'s str) -> impl Iterator<Item = &'s Element> + 's {
        self.elements().iter().filter(move |e| e.name == name)
    }

    /// The scanned style sheet. Style files reuse the sheet scanned for the
    /// resolver; other files are parsed on first use.
    #[must_use]
    pub fn stylesheet(&self) -> &StyleSheet {
        if let Some(sheet) = self.styles.sheet(self.path) {
            return sheet;
        }
        self.sheet.get_or_init(|| StyleSheet::parse(self.content))
    }

    /// Resolves a color value used at `position` in this file.
    ///
    /// # Errors
    ///
    /// Returns a [`ResolveError`] when the value is not a resolvable color.
    pub fn resolve_color(&self, value: &str, position: usize) -> Result<Rgba, ResolveError> {
        self.styles.resolve_color(self.path, value, position)
    }

    /// Resolves the first color of a shorthand value used at `position`.
    ///
    /// # Errors
    ///
    /// Returns a [`ResolveError`] when no part is a resolvable color.
    pub fn resolve_shorthand_color(
        &self,
        value: &str,
        position: usize,
    ) -> Result<Rgba, ResolveError> {
        self.styles.resolve_shorthand_color(self.path, value, position)
    }

    /// Returns true once the soft deadline of the running check has passed.
    /// Long-running checks should poll this and return
    /// [`CheckError::DeadlineExceeded`](crate::CheckError::DeadlineExceeded).
    #[must_use]
    pub fn deadline_exceeded(&self) -> bool {
        self.deadline.get().is_some_and(|d| Instant::now() >= d)
    }

    pub(crate) fn set_deadline(&self, deadline: Option<Instant>) {
        self.deadline.set(deadline);
    }
}
