//! Blocks, the block store and reconciliation back to text

mod block;
mod reconcile;
mod stats;
mod store;

pub use block::{Block, BlockId, BlockKind};
pub use reconcile::{reconcile, BLOCK_SEPARATOR};
pub use stats::DocumentStats;
pub use store::{BlockAction, BlockStore};
