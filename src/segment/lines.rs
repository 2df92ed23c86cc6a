//! Physical line index over a document
//!
//! All segmentation works on 1-indexed, inclusive line numbers, matching the
//! source positions reported by the markdown parser.

use crate::markdown::LineSpan;

/// Normalize line endings to `\n`.
pub fn normalize_newlines(text: &str) -> String {
    text.replace("\r\n", "\n")
}

/// Count the number of lines in the given text.
///
/// Returns at least 1 for empty text (representing a single empty line).
pub fn count_lines(text: &str) -> usize {
    if text.is_empty() {
        1
    } else {
        text.chars().filter(|&c| c == '\n').count() + 1
    }
}

/// The physical lines of a document, addressed by 1-indexed line number.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineIndex {
    lines: Vec<String>,
}

impl LineIndex {
    /// Split `text` into lines. A trailing newline does not add an empty line.
    pub fn new(text: &str) -> Self {
        let text = normalize_newlines(text);
        Self {
            lines: text.lines().map(str::to_string).collect(),
        }
    }

    /// Number of physical lines.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Line `n` (1-indexed). Out-of-range lines read as empty.
    pub fn line(&self, n: usize) -> &str {
        n.checked_sub(1)
            .and_then(|i| self.lines.get(i))
            .map(String::as_str)
            .unwrap_or("")
    }

    /// Lines covered by `span`, clipped to the document.
    pub fn slice(&self, span: LineSpan) -> &[String] {
        if !span.is_valid() || span.start > self.lines.len() {
            return &[];
        }
        let end = span.end.min(self.lines.len());
        &self.lines[span.start - 1..end]
    }

    /// Lines covered by `span` joined with `\n`.
    pub fn join(&self, span: LineSpan) -> String {
        self.slice(span).join("\n")
    }

    /// Whether every line in `span` is whitespace-only.
    pub fn is_blank(&self, span: LineSpan) -> bool {
        self.slice(span).iter().all(|line| line.trim().is_empty())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_count_lines() {
        assert_eq!(count_lines(""), 1);
        assert_eq!(count_lines("Line 1\nLine 2\nLine 3"), 3);
        assert_eq!(count_lines("Line 1\n"), 2);
    }

    #[test]
    fn test_line_index_basic() {
        let index = LineIndex::new("a\nb\nc");
        assert_eq!(index.len(), 3);
        assert_eq!(index.line(1), "a");
        assert_eq!(index.line(3), "c");
        assert_eq!(index.line(0), "");
        assert_eq!(index.line(4), "");
    }

    #[test]
    fn test_line_index_trailing_newline_and_crlf() {
        let index = LineIndex::new("# A\r\n\r\nB\r\n");
        assert_eq!(index.len(), 3);
        assert_eq!(index.line(1), "# A");
        assert_eq!(index.line(2), "");
        assert_eq!(index.line(3), "B");
    }

    #[test]
    fn test_join_and_clip() {
        let index = LineIndex::new("a\nb\nc");
        assert_eq!(index.join(LineSpan::new(2, 3)), "b\nc");
        assert_eq!(index.join(LineSpan::new(3, 10)), "c");
        assert_eq!(index.join(LineSpan::new(5, 6)), "");
        assert_eq!(index.join(LineSpan::new(0, 1)), "");
    }

    #[test]
    fn test_is_blank() {
        let index = LineIndex::new("a\n  \n\t\nb");
        assert!(index.is_blank(LineSpan::new(2, 3)));
        assert!(!index.is_blank(LineSpan::new(1, 2)));
    }
}
