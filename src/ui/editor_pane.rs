//! Left pane: one raw-markdown text editor per block
//!
//! Edits are not applied here; the pane reports them as a `BlockAction` for
//! the document state to apply.

use super::block_list::{VirtualList, VirtualListOutput};
use crate::document::{Block, BlockAction};
use crate::theme::block_frame;
use eframe::egui::{self, FontId, RichText, TextEdit, Ui};

/// Result of showing the editor pane.
#[derive(Debug, Clone, Default)]
pub struct EditorPaneOutput {
    /// First action requested this frame, if any
    pub action: Option<BlockAction>,
    pub list: VirtualListOutput,
}

/// Gutter text for a block, e.g. `heading · L5-8`.
pub fn block_header(block: &Block) -> String {
    format!("{} · {}", block.kind.label(), block.line_label())
}

/// The editor pane and its scroll state.
#[derive(Debug)]
pub struct EditorPane {
    list: VirtualList,
}

impl Default for EditorPane {
    fn default() -> Self {
        Self::new()
    }
}

impl EditorPane {
    pub fn new() -> Self {
        Self {
            list: VirtualList::new("editor_blocks"),
        }
    }

    pub fn list_mut(&mut self) -> &mut VirtualList {
        &mut self.list
    }

    /// Show every block as an editable text area.
    ///
    /// When `editable` is false (e.g. during segmentation) the text areas
    /// and buttons are disabled.
    pub fn show(
        &mut self,
        ui: &mut Ui,
        blocks: &[Block],
        font_size: f32,
        editable: bool,
    ) -> EditorPaneOutput {
        let mut action = None;
        let len = blocks.len();
        let font = FontId::monospace(font_size);

        let list = self.list.show(ui, len, |ui, index| {
            let block = &blocks[index];
            let frame = block_frame(ui.visuals(), false);
            frame.show(ui, |ui| {
                ui.add_enabled_ui(editable, |ui| {
                    ui.horizontal(|ui| {
                        ui.label(RichText::new(block_header(block)).small().weak());
                        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                            if ui
                                .add_enabled(len > 1, egui::Button::new("🗑").small())
                                .on_hover_text("Delete block")
                                .clicked()
                            {
                                action.get_or_insert(BlockAction::Delete { index });
                            }
                            if ui
                                .add_enabled(index + 1 < len, egui::Button::new("⤓").small())
                                .on_hover_text("Merge with next block")
                                .clicked()
                            {
                                action.get_or_insert(BlockAction::MergeNext { index });
                            }
                        });
                    });

                    let mut buffer = block.content.clone();
                    let response = ui.add(
                        TextEdit::multiline(&mut buffer)
                            .font(font.clone())
                            .desired_width(f32::INFINITY)
                            .desired_rows(1),
                    );
                    if response.changed() {
                        action.get_or_insert(BlockAction::Edit {
                            index,
                            content: buffer,
                        });
                    }
                });
            });
        });

        EditorPaneOutput { action, list }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{BlockId, BlockKind};

    #[test]
    fn test_block_header() {
        let block = Block::new(BlockId::new("b"), "$$\nx\n$$", 5, 7, BlockKind::Math);
        assert_eq!(block_header(&block), "math · L5-7");
        let line = Block::new(BlockId::new("c"), "text", 2, 2, BlockKind::Line);
        assert_eq!(block_header(&line), "line · L2");
    }

    #[test]
    fn test_output_default_has_no_action() {
        let output = EditorPaneOutput::default();
        assert!(output.action.is_none());
        assert!(output.list.range.is_none());
    }
}
