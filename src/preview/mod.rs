//! Preview rendering and sync scrolling
//!
//! The preview pane shows the same blocks as the editor pane, rendered. The
//! two panes are kept aligned by [`ScrollSynchronizer`].

mod render;
mod sync_scroll;

pub use render::{render_block, PreviewCache, PreviewColors};
pub use sync_scroll::{
    Pane, PaneMode, ScrollAlign, ScrollAnimation, ScrollBehavior, ScrollCommand,
    ScrollSynchronizer, SyncScrollConfig, SMOOTH_SCROLL_DURATION,
};
