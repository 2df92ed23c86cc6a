//! Flattening blocks back into one document

use super::Block;

/// Separator placed between reconciled blocks.
pub const BLOCK_SEPARATOR: &str = "\n\n";

/// Join blocks into the document text.
///
/// Blank blocks are skipped and every block is trimmed, so the result never
/// starts or ends with whitespace. An empty slice gives an empty string.
pub fn reconcile(blocks: &[Block]) -> String {
    let mut text = String::with_capacity(blocks.iter().map(|b| b.content.len() + 2).sum());
    for content in blocks
        .iter()
        .map(|block| block.content.trim())
        .filter(|content| !content.is_empty())
    {
        if !text.is_empty() {
            text.push_str(BLOCK_SEPARATOR);
        }
        text.push_str(content);
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{BlockId, BlockKind};

    fn block(content: &str) -> Block {
        Block::new(BlockId::new(content), content, 1, 1, BlockKind::Line)
    }

    #[test]
    fn test_reconcile_empty() {
        assert_eq!(reconcile(&[]), "");
    }

    #[test]
    fn test_reconcile_trims_and_joins() {
        let blocks = vec![block("  # A \n"), block("\nB")];
        assert_eq!(reconcile(&blocks), "# A\n\nB");
    }

    #[test]
    fn test_reconcile_skips_blank_blocks() {
        let blocks = vec![block("a"), block("   \n "), block("b")];
        assert_eq!(reconcile(&blocks), "a\n\nb");
    }

    #[test]
    fn test_reconcile_keeps_inner_blank_lines() {
        let blocks = vec![block("$$\na\n\nb\n$$")];
        assert_eq!(reconcile(&blocks), "$$\na\n\nb\n$$");
    }
}
