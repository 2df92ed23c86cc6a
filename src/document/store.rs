//! Ordered, mutable collection of blocks
//!
//! Every successful mutation re-runs the reconciler, so [`BlockStore::text`]
//! always reflects the current blocks.

use super::reconcile::reconcile;
use super::Block;
use log::debug;

/// A mutation requested by the editor pane, bound to a block index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockAction {
    Edit { index: usize, content: String },
    Delete { index: usize },
    MergeNext { index: usize },
}

/// The blocks of the open document plus their reconciled text.
#[derive(Debug, Clone, Default)]
pub struct BlockStore {
    blocks: Vec<Block>,
    text: String,
    dirty: bool,
    version: u64,
}

impl BlockStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store holding `blocks`, considered clean.
    pub fn from_blocks(blocks: Vec<Block>) -> Self {
        let mut store = Self::new();
        store.load(blocks);
        store
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn get(&self, index: usize) -> Option<&Block> {
        self.blocks.get(index)
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Reconciled document text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Whether the blocks changed since the last load or save.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Counter bumped by every successful mutation.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Replace the content of block `index`.
    ///
    /// No-op when the index is out of range or the content is unchanged.
    pub fn edit(&mut self, index: usize, content: impl Into<String>) -> bool {
        let content = content.into();
        let Some(block) = self.blocks.get_mut(index) else {
            return false;
        };
        if block.content == content {
            return false;
        }
        block.content = content;
        self.touch();
        true
    }

    /// Remove block `index`.
    ///
    /// The last remaining block can't be deleted.
    pub fn delete(&mut self, index: usize) -> bool {
        if self.blocks.len() <= 1 || index >= self.blocks.len() {
            return false;
        }
        let removed = self.blocks.remove(index);
        debug!("Deleted block {} ({})", index, removed.id);
        self.touch();
        true
    }

    /// Merge block `index + 1` into block `index`.
    ///
    /// The merged content is both trimmed contents joined by a single newline.
    /// The merged block keeps the first block's id and spans both line ranges.
    pub fn merge_next(&mut self, index: usize) -> bool {
        let Some(next) = index.checked_add(1).filter(|&next| next < self.blocks.len()) else {
            return false;
        };
        let next = self.blocks.remove(next);
        let block = &mut self.blocks[index];
        block.content = format!("{}\n{}", block.content.trim(), next.content.trim());
        block.end_line = block.end_line.max(next.end_line);
        debug!("Merged block {} into {}", next.id, block.id);
        self.touch();
        true
    }

    /// Apply an editor action. Returns whether anything changed.
    pub fn apply(&mut self, action: BlockAction) -> bool {
        match action {
            BlockAction::Edit { index, content } => self.edit(index, content),
            BlockAction::Delete { index } => self.delete(index),
            BlockAction::MergeNext { index } => self.merge_next(index),
        }
    }

    /// Replace every block with a freshly loaded document. Clears dirty.
    pub fn load(&mut self, blocks: Vec<Block>) {
        self.blocks = blocks;
        self.text = reconcile(&self.blocks);
        self.dirty = false;
        self.version += 1;
    }

    /// Replace every block with a re-segmentation of the same document.
    ///
    /// Marks the store dirty only if the reconciled text changed.
    pub fn replace(&mut self, blocks: Vec<Block>) {
        let previous = std::mem::take(&mut self.text);
        self.blocks = blocks;
        self.text = reconcile(&self.blocks);
        if self.text != previous {
            self.dirty = true;
        }
        self.version += 1;
    }

    /// Record that the current text has been written out.
    pub fn mark_saved(&mut self) {
        self.dirty = false;
    }

    fn touch(&mut self) {
        self.text = reconcile(&self.blocks);
        self.dirty = true;
        self.version += 1;
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
