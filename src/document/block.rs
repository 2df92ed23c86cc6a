//! The editable unit of a document

use std::fmt;

/// Opaque block identifier, unique within one segmentation result.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BlockId(String);

impl BlockId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Identifier derived from the block's position in the build output.
    pub fn for_position(ordinal: usize, start_line: usize) -> Self {
        Self(format!("block-{}-{}", ordinal, start_line))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// What a block was segmented from.
///
/// Informational only: the kind is not updated when a block is edited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BlockKind {
    /// One line split out of a paragraph, heading or gap
    #[default]
    Line,
    Heading,
    Paragraph,
    Table,
    Code,
    Html,
    /// Block formula (`$$ ... $$`) or math node
    Math,
    /// YAML or TOML front matter
    FrontMatter,
    FootnoteDefinition,
    ThematicBreak,
    Other,
}

impl BlockKind {
    /// Short label for the block gutter.
    pub fn label(&self) -> &'static str {
        match self {
            BlockKind::Line => "line",
            BlockKind::Heading => "heading",
            BlockKind::Paragraph => "paragraph",
            BlockKind::Table => "table",
            BlockKind::Code => "code",
            BlockKind::Html => "html",
            BlockKind::Math => "math",
            BlockKind::FrontMatter => "front matter",
            BlockKind::FootnoteDefinition => "footnote",
            BlockKind::ThematicBreak => "rule",
            BlockKind::Other => "other",
        }
    }
}

/// A user-editable slice of the document.
///
/// `start_line..=end_line` (1-indexed) is where the block came from at the
/// last full segmentation. After an edit the range is only a label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub id: BlockId,
    pub content: String,
    pub start_line: usize,
    pub end_line: usize,
    pub kind: BlockKind,
}

impl Block {
    pub fn new(
        id: BlockId,
        content: impl Into<String>,
        start_line: usize,
        end_line: usize,
        kind: BlockKind,
    ) -> Self {
        Self {
            id,
            content: content.into(),
            start_line,
            end_line,
            kind,
        }
    }

    /// Whether the content is whitespace-only.
    pub fn is_blank(&self) -> bool {
        self.content.trim().is_empty()
    }

    /// Human-readable source range, e.g. `L5` or `L5-8`.
    pub fn line_label(&self) -> String {
        if self.start_line == self.end_line {
            format!("L{}", self.start_line)
        } else {
            format!("L{}-{}", self.start_line, self.end_line)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_id_for_position() {
        let id = BlockId::for_position(3, 12);
        assert_eq!(id.as_str(), "block-3-12");
        assert_eq!(id.to_string(), "block-3-12");
    }

    #[test]
    fn test_line_label() {
        let single = Block::new(BlockId::new("a"), "x", 4, 4, BlockKind::Line);
        let multi = Block::new(BlockId::new("b"), "x\ny", 5, 8, BlockKind::Math);
        assert_eq!(single.line_label(), "L4");
        assert_eq!(multi.line_label(), "L5-8");
    }

    #[test]
    fn test_is_blank() {
        assert!(Block::new(BlockId::new("a"), " \n\t", 1, 2, BlockKind::Line).is_blank());
        assert!(!Block::new(BlockId::new("a"), " x ", 1, 1, BlockKind::Line).is_blank());
    }
}
