//! Markdown block segmentation
//!
//! Turns raw document text into an ordered sequence of blocks that can be
//! edited independently and joined back without changing the document's
//! structure. Block formulas, HTML tables, code fences and list items are
//! never cut in half.
//!
//! The pipeline is: line index, comrak AST, atom classification, HTML table
//! refinement, block building, formula repair.

mod atom;
mod builder;
mod classify;
mod formula;
mod lines;
mod refine;

pub use atom::Atom;
pub use builder::{build_blocks, repair_formula_blocks, BlockBuilder};
pub use classify::{classify, node_class, NodeClass};
pub use formula::{count_bare_fences, fill_gap, find_formula_end, is_single_line_formula, split_lines};
pub use lines::{count_lines, normalize_newlines, LineIndex};
pub use refine::{is_table_open, refine_html_tables, TABLE_MERGE_GAP};

use crate::document::Block;
use crate::markdown::parse_markdown;
use log::debug;

/// Default number of atoms processed per [`SegmentJob::step`].
pub const DEFAULT_CHUNK_ATOMS: usize = 2_000;

/// Result of one segmentation step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SegmentProgress {
    /// More atoms remain
    Pending { processed: usize, total: usize },
    /// All atoms are placed; the finished blocks
    Done(Vec<Block>),
}

/// A segmentation in progress.
///
/// Parsing, classification and table refinement happen in [`SegmentJob::new`];
/// block building is spread over [`SegmentJob::step`] calls so a UI can keep
/// drawing frames while a large document is split.
#[derive(Debug)]
pub struct SegmentJob {
    builder: BlockBuilder,
    finished: bool,
}

impl SegmentJob {
    pub fn new(text: &str) -> Self {
        let text = normalize_newlines(text);
        let lines = LineIndex::new(&text);
        let ast = parse_markdown(&text);

        let mut atoms = classify(&ast, &lines);
        atom::sort_atoms(&mut atoms);
        let mut atoms = refine_html_tables(atoms, &lines);
        atom::sort_atoms(&mut atoms);

        debug!("Segmenting {} lines into {} atoms", lines.len(), atoms.len());

        Self {
            builder: BlockBuilder::new(lines, atoms),
            finished: false,
        }
    }

    /// Place up to `chunk` more atoms.
    ///
    /// Returns [`SegmentProgress::Done`] with the blocks exactly once; later
    /// calls return `Done` with an empty list.
    pub fn step(&mut self, chunk: usize) -> SegmentProgress {
        if self.finished {
            return SegmentProgress::Done(Vec::new());
        }
        if self.builder.advance(chunk) {
            self.finished = true;
            SegmentProgress::Done(self.builder.finish())
        } else {
            SegmentProgress::Pending {
                processed: self.builder.processed(),
                total: self.builder.total(),
            }
        }
    }

    /// Run the remaining steps at once.
    ///
    /// An unbounded step places every remaining atom, so this finishes in a
    /// single call. A job that already returned its blocks gives an empty list.
    pub fn run(mut self) -> Vec<Block> {
        let progress = self.step(usize::MAX);
        debug_assert!(self.finished, "unbounded step left atoms unplaced");
        match progress {
            SegmentProgress::Done(blocks) => blocks,
            SegmentProgress::Pending { .. } => {
                self.finished = true;
                self.builder.finish()
            }
        }
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }
}

/// Segment a whole document in one call.
pub fn segment_document(text: &str) -> Vec<Block> {
    SegmentJob::new(text).run()
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
