//! Byte offset to line number mapping.

/// Precomputed line starts for a piece of source text.
#[derive(Debug, Clone)]
pub struct LineIndex<'a> {
    content: &'a str,
    starts: Vec<usize>,
}

impl<'a> LineIndex<'a> {
    /// Indexes the given content.
    #[must_use]
    pub fn new(content: &'a str) -> Self {
        let starts = std::iter::once(0)
            .chain(content.match_indices('\n').map(|(i, _)| i + 1))
            .collect();
        Self { content, starts }
    }

    /// Line (1-indexed) containing the byte offset. Offsets past the end map
    /// to the last line.
    #[must_use]
    pub fn line_at(&self, offset: usize) -> usize {
        match self.starts.binary_search(&offset) {
            Ok(i) => i + 1,
            Err(i) => i,
        }
    }

    /// Text of a line (1-indexed) without its line terminator.
    #[must_use]
    pub fn line_text(&self, line: usize) -> &'a str {
        if line == 0 || line > self.starts.len() {
            return "";
        }
        let start = self.starts[line - 1];
        let end = self
            .starts
            .get(line)
            .map_or(self.content.len(), |next| next - 1);
        self.content[start..end].trim_end_matches('\r')
    }

    /// Number of lines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.starts.len()
    }

    /// Returns true for empty content.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_at() {
        let index = LineIndex::new("line1\nline2\nline3");
        assert_eq!(index.line_at(0), 1);
        assert_eq!(index.line_at(5), 1);
        assert_eq!(index.line_at(6), 2);
        assert_eq!(index.line_at(8), 2);
        assert_eq!(index.line_at(12), 3);
        assert_eq!(index.line_at(999), 3);
    }

    #[test]
    fn test_line_text() {
        let index = LineIndex::new("a\r\nbb\nccc");
        assert_eq!(index.len(), 3);
        assert_eq!(index.line_text(1), "a");
        assert_eq!(index.line_text(2), "bb");
        assert_eq!(index.line_text(3), "ccc");
        assert_eq!(index.line_text(4), "");
    }
}
