//! Intermediate segmentation unit

use crate::document::BlockKind;
use crate::markdown::LineSpan;

/// A line range that will become one block, or be dropped if blank.
///
/// Atoms only exist while a document is being segmented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Atom {
    pub span: LineSpan,
    pub kind: BlockKind,
}

impl Atom {
    pub fn new(span: LineSpan, kind: BlockKind) -> Self {
        Self { span, kind }
    }

    /// A plain single-line atom.
    pub fn line(line: usize) -> Self {
        Self::new(LineSpan::single(line), BlockKind::Line)
    }

    pub fn start(&self) -> usize {
        self.span.start
    }

    pub fn end(&self) -> usize {
        self.span.end
    }

    pub fn is_html(&self) -> bool {
        self.kind == BlockKind::Html
    }
}

/// Sort atoms by `(start, end)` ascending.
pub fn sort_atoms(atoms: &mut [Atom]) {
    atoms.sort_by_key(|atom| (atom.span.start, atom.span.end));
}
