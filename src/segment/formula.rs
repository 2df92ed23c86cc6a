//! Block-formula detection and gap filling
//!
//! A block formula is a `$$ ... $$` region. Splitting one across blocks breaks
//! it in both panes, so any line range that is being broken into per-line
//! atoms goes through [`split_lines`], which keeps formula spans whole.

use super::atom::Atom;
use super::lines::LineIndex;
use crate::document::BlockKind;
use crate::markdown::format::FORMULA_FENCE;
use crate::markdown::LineSpan;

/// Whether a trimmed line is a complete formula on its own, e.g. `$$x^2$$`.
pub fn is_single_line_formula(trimmed: &str) -> bool {
    trimmed.len() > FORMULA_FENCE.len()
        && trimmed.starts_with(FORMULA_FENCE)
        && trimmed.ends_with(FORMULA_FENCE)
}

/// If line `start` opens a multi-line formula, find its closing line.
///
/// The search never goes past `limit`. `None` means the line does not open a
/// formula, or the formula is not closed before `limit`.
pub fn find_formula_end(lines: &LineIndex, start: usize, limit: usize) -> Option<usize> {
    let opening = lines.line(start).trim();
    if !opening.starts_with(FORMULA_FENCE) || is_single_line_formula(opening) {
        return None;
    }
    (start + 1..=limit).find(|&n| lines.line(n).trim().ends_with(FORMULA_FENCE))
}

/// Break `span` into per-line spans, keeping block formulas whole.
///
/// An unterminated formula opener is emitted as an ordinary single line and
/// scanning resumes with the next line, so no content is ever lost.
pub fn split_lines(lines: &LineIndex, span: LineSpan) -> Vec<LineSpan> {
    let mut result = Vec::new();
    if !span.is_valid() {
        return result;
    }

    let mut current = span.start;
    while current <= span.end {
        match find_formula_end(lines, current, span.end) {
            Some(close) => {
                result.push(LineSpan::new(current, close));
                current = close + 1;
            }
            None => {
                result.push(LineSpan::single(current));
                current += 1;
            }
        }
    }
    result
}

/// Produce atoms for a line range that no classified atom covers.
///
/// Formula spans are tagged [`BlockKind::Math`]; everything else is a
/// [`BlockKind::Line`]. Blank lines are returned too; the builder drops them.
pub fn fill_gap(lines: &LineIndex, span: LineSpan) -> Vec<Atom> {
    split_lines(lines, span)
        .into_iter()
        .map(|sub| {
            let kind = if is_formula_span(lines, sub) {
                BlockKind::Math
            } else {
                BlockKind::Line
            };
            Atom::new(sub, kind)
        })
        .collect()
}

fn is_formula_span(lines: &LineIndex, span: LineSpan) -> bool {
    span.is_multiline() || is_single_line_formula(lines.line(span.start).trim())
}

/// Count lines that consist of a bare `$$` fence.
pub fn count_bare_fences(content: &str) -> usize {
    content
        .lines()
        .filter(|line| line.trim() == FORMULA_FENCE)
        .count()
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn spans(text: &str, start: usize, end: usize) -> Vec<(usize, usize)> {
        let lines = LineIndex::new(text);
        split_lines(&lines, LineSpan::new(start, end))
            .into_iter()
            .map(|s| (s.start, s.end))
            .collect()
    }

    #[test]
    fn test_single_line_formula_rule() {
        assert!(is_single_line_formula("$$x$$"));
        assert!(is_single_line_formula("$$$"));
        assert!(!is_single_line_formula("$$"));
        assert!(!is_single_line_formula("$$ x"));
        assert!(!is_single_line_formula("x$$"));
    }

    #[test]
    fn test_plain_lines_split_one_per_line() {
        assert_eq!(spans("a\nb\nc", 1, 3), vec![(1, 1), (2, 2), (3, 3)]);
    }

    #[test]
    fn test_multiline_formula_kept_whole() {
        let text = "intro\n$$\na\nb\n$$\noutro";
        assert_eq!(spans(text, 1, 6), vec![(1, 1), (2, 5), (6, 6)]);
    }

    #[test]
    fn test_formula_opener_with_content() {
        let text = "$$ \\begin{aligned}\nx\n\\end{aligned} $$";
        assert_eq!(spans(text, 1, 3), vec![(1, 3)]);
    }

    #[test]
    fn test_single_line_formula_is_own_span() {
        assert_eq!(spans("$$x$$\ny", 1, 2), vec![(1, 1), (2, 2)]);
    }

    #[test]
    fn test_unterminated_formula_falls_back_to_lines() {
        assert_eq!(spans("$$\na\nb", 1, 3), vec![(1, 1), (2, 2), (3, 3)]);
    }

    #[test]
    fn test_closing_fence_outside_limit_is_ignored() {
        // the closing fence on line 4 is beyond the range being split
        assert_eq!(spans("$$\na\nb\n$$", 1, 3), vec![(1, 1), (2, 2), (3, 3)]);
    }

    #[test]
    fn test_fill_gap_tags_formula_spans() {
        let lines = LineIndex::new("a\n$$\nx\n$$\n$$y$$");
        let atoms = fill_gap(&lines, LineSpan::new(1, 5));
        let kinds: Vec<_> = atoms.iter().map(|a| a.kind).collect();
        assert_eq!(
            kinds,
            vec![BlockKind::Line, BlockKind::Math, BlockKind::Math]
        );
        assert_eq!(atoms[1].span, LineSpan::new(2, 4));
    }

    #[test]
    fn test_invalid_span_yields_nothing() {
        assert!(spans("a", 2, 1).is_empty());
    }

    #[test]
    fn test_count_bare_fences() {
        assert_eq!(count_bare_fences("$$\nx\n  $$  "), 2);
        assert_eq!(count_bare_fences("$$x$$\n$$"), 1);
        assert_eq!(count_bare_fences("text"), 0);
    }
}
