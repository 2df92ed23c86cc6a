//! Block construction from sorted atoms
//!
//! Walks the atom list in line order, filling uncovered lines in between,
//! and materializes every non-blank range as a [`Block`]. The walk can be
//! advanced a few atoms at a time so that large documents do not stall a
//! frame.

use super::atom::{sort_atoms, Atom};
use super::formula::{count_bare_fences, fill_gap};
use super::lines::LineIndex;
use crate::document::{Block, BlockId, BlockKind};
use crate::markdown::LineSpan;
use log::debug;

/// Incremental block builder.
///
/// Invariant: `blocks` are in strictly increasing, non-overlapping line order
/// and every line up to `last_processed` has been accounted for.
#[derive(Debug)]
pub struct BlockBuilder {
    lines: LineIndex,
    atoms: Vec<Atom>,
    next_atom: usize,
    last_processed: usize,
    blocks: Vec<Block>,
}

impl BlockBuilder {
    /// Create a builder. Atoms are sorted by `(start, end)`.
    pub fn new(lines: LineIndex, mut atoms: Vec<Atom>) -> Self {
        sort_atoms(&mut atoms);
        Self {
            lines,
            atoms,
            next_atom: 0,
            last_processed: 0,
            blocks: Vec::new(),
        }
    }

    /// Total number of atoms to process.
    pub fn total(&self) -> usize {
        self.atoms.len()
    }

    /// Number of atoms processed so far.
    pub fn processed(&self) -> usize {
        self.next_atom
    }

    pub fn is_exhausted(&self) -> bool {
        self.next_atom >= self.atoms.len()
    }

    /// Process up to `max_atoms` atoms. Returns `true` once every atom is done.
    pub fn advance(&mut self, max_atoms: usize) -> bool {
        let stop = self
            .next_atom
            .saturating_add(max_atoms.max(1))
            .min(self.atoms.len());
        while self.next_atom < stop {
            let atom = self.atoms[self.next_atom];
            self.next_atom += 1;
            self.place_atom(atom);
        }
        self.is_exhausted()
    }

    /// Process everything that is left, fill the trailing gap and return the
    /// blocks. The builder is empty afterwards.
    pub fn finish(&mut self) -> Vec<Block> {
        self.advance(usize::MAX);

        let total_lines = self.lines.len();
        if self.last_processed < total_lines {
            self.push_gap(LineSpan::new(self.last_processed + 1, total_lines));
            self.last_processed = total_lines;
        }

        let blocks = std::mem::take(&mut self.blocks);
        let repaired = repair_formula_blocks(blocks, &self.lines);
        debug!(
            "Built {} blocks from {} atoms over {} lines",
            repaired.len(),
            self.atoms.len(),
            total_lines
        );
        repaired
    }

    fn place_atom(&mut self, atom: Atom) {
        if atom.start() > self.last_processed + 1 {
            self.push_gap(LineSpan::new(self.last_processed + 1, atom.start() - 1));
            self.last_processed = atom.start() - 1;
        }

        let start = atom.start().max(self.last_processed + 1);
        if atom.end() >= start {
            self.push_block(LineSpan::new(start, atom.end()), atom.kind);
            self.last_processed = atom.end();
        }
    }

    fn push_gap(&mut self, span: LineSpan) {
        for atom in fill_gap(&self.lines, span) {
            self.push_block(atom.span, atom.kind);
        }
    }

    fn push_block(&mut self, span: LineSpan, kind: BlockKind) {
        let content = self.lines.join(span);
        if content.trim().is_empty() {
            return;
        }
        let id = BlockId::for_position(self.blocks.len(), span.start);
        self.blocks
            .push(Block::new(id, content, span.start, span.end, kind));
    }
}

/// Build blocks from atoms in one go.
pub fn build_blocks(lines: LineIndex, atoms: Vec<Atom>) -> Vec<Block> {
    BlockBuilder::new(lines, atoms).finish()
}

/// Kinds whose content may legitimately hold one half of a split formula.
fn can_hold_formula(kind: BlockKind) -> bool {
    matches!(
        kind,
        BlockKind::Line | BlockKind::Paragraph | BlockKind::Math | BlockKind::Other
    )
}

/// Rejoin block formulas that a blank line split into several blocks.
///
/// A block with an odd number of bare `$$` lines is merged with the following
/// blocks up to the first one that makes the count even. The merged block is
/// re-sliced from the source so blank lines inside the formula survive. When
/// no closing partner exists the blocks are left alone.
pub fn repair_formula_blocks(blocks: Vec<Block>, lines: &LineIndex) -> Vec<Block> {
    let mut repaired: Vec<Block> = Vec::with_capacity(blocks.len());
    let mut i = 0;

    while i < blocks.len() {
        let first = &blocks[i];
        let mut fences = count_bare_fences(&first.content);

        if fences % 2 == 1 && can_hold_formula(first.kind) {
            let mut partner = None;
            for (j, next) in blocks.iter().enumerate().skip(i + 1) {
                if !can_hold_formula(next.kind) {
                    break;
                }
                fences += count_bare_fences(&next.content);
                if fences % 2 == 0 {
                    partner = Some(j);
                    break;
                }
            }

            if let Some(j) = partner {
                let span = LineSpan::new(first.start_line, blocks[j].end_line);
                debug!("Rejoined formula split across lines {}-{}", span.start, span.end);
                repaired.push(Block::new(
                    first.id.clone(),
                    lines.join(span),
                    span.start,
                    span.end,
                    BlockKind::Math,
                ));
                i = j + 1;
                continue;
            }
        }

        repaired.push(first.clone());
        i += 1;
    }

    repaired
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn ranges(blocks: &[Block]) -> Vec<(usize, usize)> {
        blocks.iter().map(|b| (b.start_line, b.end_line)).collect()
    }

    #[test]
    fn test_gaps_filled_and_blank_lines_dropped() {
        let lines = LineIndex::new("a\n\nb\nc\n\nd");
        let atoms = vec![Atom::new(LineSpan::new(3, 4), BlockKind::Code)];
        let blocks = build_blocks(lines, atoms);
        assert_eq!(ranges(&blocks), vec![(1, 1), (3, 4), (6, 6)]);
        assert_eq!(blocks[1].content, "b\nc");
        assert_eq!(blocks[1].kind, BlockKind::Code);
        assert_eq!(blocks[2].kind, BlockKind::Line);
    }

    #[test]
    fn test_overlapping_atoms_are_clamped() {
        let lines = LineIndex::new("a\nb\nc\nd");
        let atoms = vec![
            Atom::new(LineSpan::new(1, 3), BlockKind::Html),
            Atom::new(LineSpan::new(2, 4), BlockKind::Html),
        ];
        let blocks = build_blocks(lines, atoms);
        assert_eq!(ranges(&blocks), vec![(1, 3), (4, 4)]);
        assert_eq!(blocks[1].content, "d");
    }

    #[test]
    fn test_contained_atom_is_skipped() {
        let lines = LineIndex::new("a\nb\nc");
        let atoms = vec![
            Atom::new(LineSpan::new(1, 3), BlockKind::Code),
            Atom::new(LineSpan::new(2, 2), BlockKind::Other),
        ];
        assert_eq!(ranges(&build_blocks(lines, atoms)), vec![(1, 3)]);
    }

    #[test]
    fn test_unsorted_atoms_are_sorted() {
        let lines = LineIndex::new("a\nb");
        let atoms = vec![Atom::line(2), Atom::line(1)];
        assert_eq!(ranges(&build_blocks(lines, atoms)), vec![(1, 1), (2, 2)]);
    }

    #[test]
    fn test_blank_atom_not_materialized() {
        let lines = LineIndex::new("a\n   \nb");
        let atoms = vec![Atom::line(1), Atom::line(2), Atom::line(3)];
        assert_eq!(ranges(&build_blocks(lines, atoms)), vec![(1, 1), (3, 3)]);
    }

    #[test]
    fn test_ids_are_unique() {
        let lines = LineIndex::new("a\nb\nc");
        let blocks = build_blocks(lines, Vec::new());
        let mut ids: Vec<_> = blocks.iter().map(|b| b.id.clone()).collect();
        ids.dedup();
        assert_eq!(ids.len(), 3);
    }

    #[test]
    fn test_advance_in_chunks_matches_single_pass() {
        let text = "a\nb\n\nc\nd\ne";
        let atoms: Vec<Atom> = [1, 2, 4, 5, 6].iter().map(|&n| Atom::line(n)).collect();

        let mut chunked = BlockBuilder::new(LineIndex::new(text), atoms.clone());
        assert!(!chunked.advance(2));
        assert_eq!(chunked.processed(), 2);
        assert!(!chunked.advance(2));
        assert!(chunked.advance(2));
        let chunked = chunked.finish();

        assert_eq!(chunked, build_blocks(LineIndex::new(text), atoms));
    }

    #[test]
    fn test_zero_chunk_still_progresses() {
        let mut builder = BlockBuilder::new(LineIndex::new("a\nb"), vec![Atom::line(1), Atom::line(2)]);
        builder.advance(0);
        assert_eq!(builder.processed(), 1);
    }

    #[test]
    fn test_repair_joins_formula_split_by_blank_line() {
        let lines = LineIndex::new("$$\na\n\nb\n$$\ntail");
        let blocks = build_blocks(lines, Vec::new());
        assert_eq!(ranges(&blocks), vec![(1, 5), (6, 6)]);
        assert_eq!(blocks[0].content, "$$\na\n\nb\n$$");
        assert_eq!(blocks[0].kind, BlockKind::Math);
    }

    #[test]
    fn test_repair_leaves_unterminated_formula_per_line() {
        let lines = LineIndex::new("$$\na\n\nb");
        let blocks = build_blocks(lines, Vec::new());
        assert_eq!(ranges(&blocks), vec![(1, 1), (2, 2), (4, 4)]);
    }

    #[test]
    fn test_repair_does_not_cross_code_blocks() {
        let lines = LineIndex::new("$$\n```\n$$\n```\n$$");
        let atoms = vec![Atom::new(LineSpan::new(2, 4), BlockKind::Code)];
        let blocks = build_blocks(lines, atoms);
        assert_eq!(ranges(&blocks), vec![(1, 1), (2, 4), (5, 5)]);
    }

    #[test]
    fn test_empty_document() {
        assert!(build_blocks(LineIndex::new(""), Vec::new()).is_empty());
        assert!(build_blocks(LineIndex::new("\n\n  \n"), Vec::new()).is_empty());
    }
}
