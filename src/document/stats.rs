//! Document statistics for the status bar
//!
//! Counted over the reconciled text, so the numbers describe what would be
//! written to disk rather than the raw block contents.

use crate::segment::count_lines;

// ─────────────────────────────────────────────────────────────────────────────
// DocumentStats
// ─────────────────────────────────────────────────────────────────────────────

/// Counts shown in the status bar.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DocumentStats {
    /// Whitespace-separated words
    pub words: usize,
    /// Characters including whitespace
    pub characters: usize,
    /// Lines of the reconciled text
    pub lines: usize,
    /// Number of blocks in the store
    pub blocks: usize,
}

impl DocumentStats {
    /// Compute statistics for reconciled `text` made of `blocks` blocks.
    pub fn compute(text: &str, blocks: usize) -> Self {
        let mut words = 0;
        let mut characters = 0;
        let mut in_word = false;

        for ch in text.chars() {
            characters += 1;
            if ch.is_whitespace() {
                in_word = false;
            } else if !in_word {
                in_word = true;
                words += 1;
            }
        }

        Self {
            words,
            characters,
            lines: if text.is_empty() { 0 } else { count_lines(text) },
            blocks,
        }
    }

    /// e.g. `"12 blocks | 150 words | 892 chars | 25 lines"`
    pub fn format_compact(&self) -> String {
        format!(
            "{} blocks | {} words | {} chars | {} lines",
            self.blocks, self.words, self.characters, self.lines
        )
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
