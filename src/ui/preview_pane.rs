//! Right pane: rendered preview, one item per block

use super::block_list::{VirtualList, VirtualListOutput};
use crate::document::Block;
use crate::preview::{render_block, PreviewCache, PreviewColors};
use crate::theme::block_frame;
use eframe::egui::Ui;

/// The preview pane, its scroll state and the parsed-block cache.
#[derive(Debug)]
pub struct PreviewPane {
    list: VirtualList,
    cache: PreviewCache,
}

impl Default for PreviewPane {
    fn default() -> Self {
        Self::new()
    }
}

impl PreviewPane {
    pub fn new() -> Self {
        Self {
            list: VirtualList::new("preview_blocks"),
            cache: PreviewCache::new(),
        }
    }

    pub fn list_mut(&mut self) -> &mut VirtualList {
        &mut self.list
    }

    /// Drop cached parses of blocks no longer in the document.
    pub fn prune_cache(&mut self, blocks: &[Block]) {
        self.cache.retain_blocks(blocks);
    }

    /// Forget scroll measurements and cached parses.
    pub fn reset(&mut self) {
        self.list.reset();
        self.cache.clear();
    }

    pub fn show(&mut self, ui: &mut Ui, blocks: &[Block], font_size: f32) -> VirtualListOutput {
        let colors = PreviewColors::from_visuals(ui.visuals());
        let cache = &mut self.cache;
        self.list.show(ui, blocks.len(), |ui, index| {
            let frame = block_frame(ui.visuals(), false);
            frame.show(ui, |ui| {
                ui.set_width(ui.available_width());
                render_block(ui, cache, &blocks[index], &colors, font_size);
            });
        })
    }
}
