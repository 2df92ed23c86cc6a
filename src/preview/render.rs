//! Read-only rendering of blocks for the preview pane
//!
//! Each block is parsed on its own (positions are relative to the block) and
//! drawn with plain egui widgets. Parsed trees are cached per block id and
//! invalidated when the block content changes.

use crate::document::{Block, BlockId, BlockKind};
use crate::markdown::{parse_markdown, ListType, MdNode, NodeKind};
use crate::segment::LineIndex;
use eframe::egui::{self, Color32, FontId, RichText, Stroke, Ui, Vec2};
use std::collections::{HashMap, HashSet};

/// Nesting depth past which quotes and lists are drawn as plain text.
const MAX_RENDER_DEPTH: usize = 24;

// ─────────────────────────────────────────────────────────────────────────────
// Colors
// ─────────────────────────────────────────────────────────────────────────────

/// Colors used by the preview, derived from the active egui visuals.
#[derive(Debug, Clone, Copy)]
pub struct PreviewColors {
    pub text: Color32,
    pub heading: Color32,
    pub muted: Color32,
    pub code_bg: Color32,
    pub code_text: Color32,
    pub quote_border: Color32,
    pub rule: Color32,
    pub math: Color32,
}

impl PreviewColors {
    pub fn from_visuals(visuals: &egui::Visuals) -> Self {
        let dark = visuals.dark_mode;
        Self {
            text: visuals.text_color(),
            heading: visuals.strong_text_color(),
            muted: visuals.weak_text_color(),
            code_bg: visuals.extreme_bg_color,
            code_text: visuals.text_color(),
            quote_border: visuals.widgets.noninteractive.bg_stroke.color,
            rule: visuals.widgets.noninteractive.bg_stroke.color,
            math: if dark {
                Color32::from_rgb(152, 195, 121)
            } else {
                Color32::from_rgb(80, 120, 40)
            },
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Cache
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug)]
struct CachedBlock {
    content: String,
    tree: MdNode,
    lines: LineIndex,
}

/// Parsed block trees keyed by block id.
#[derive(Debug, Default)]
pub struct PreviewCache {
    entries: HashMap<BlockId, CachedBlock>,
}

impl PreviewCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Drop entries for blocks that no longer exist.
    pub fn retain_blocks(&mut self, blocks: &[Block]) {
        let live: HashSet<&BlockId> = blocks.iter().map(|b| &b.id).collect();
        self.entries.retain(|id, _| live.contains(id));
    }

    fn get_or_parse(&mut self, block: &Block) -> &CachedBlock {
        let stale = self
            .entries
            .get(&block.id)
            .map_or(true, |entry| entry.content != block.content);
        if stale {
            self.entries.insert(
                block.id.clone(),
                CachedBlock {
                    content: block.content.clone(),
                    tree: parse_markdown(&block.content),
                    lines: LineIndex::new(&block.content),
                },
            );
        }
        &self.entries[&block.id]
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Rendering
// ─────────────────────────────────────────────────────────────────────────────

/// Draw one block.
pub fn render_block(
    ui: &mut Ui,
    cache: &mut PreviewCache,
    block: &Block,
    colors: &PreviewColors,
    font_size: f32,
) {
    if block.kind == BlockKind::Math && block.content.trim_start().starts_with("$$") {
        render_math(ui, colors, font_size, &block.content);
        return;
    }

    let cached = cache.get_or_parse(block);
    let ctx = RenderContext {
        colors,
        font_size,
        lines: &cached.lines,
    };
    for child in &cached.tree.children {
        ctx.render_node(ui, child, 0);
    }
}

struct RenderContext<'a> {
    colors: &'a PreviewColors,
    font_size: f32,
    lines: &'a LineIndex,
}

impl RenderContext<'_> {
    fn raw(&self, node: &MdNode) -> String {
        node.position
            .map(|span| self.lines.join(span))
            .unwrap_or_default()
    }

    fn render_node(&self, ui: &mut Ui, node: &MdNode, depth: usize) {
        if depth > MAX_RENDER_DEPTH {
            ui.label(RichText::new(node.text_content()).color(self.colors.text));
            return;
        }

        match &node.kind {
            NodeKind::Heading { level } => self.render_heading(ui, node, *level),
            NodeKind::Paragraph => self.render_inline(ui, node, self.font_size, self.colors.text),
            NodeKind::Code { info, literal } => self.render_code(ui, info, literal),
            NodeKind::Html => {
                ui.label(
                    RichText::new(self.raw(node))
                        .font(FontId::monospace(self.font_size * 0.9))
                        .color(self.colors.muted),
                );
            }
            NodeKind::Table => self.render_table(ui, node),
            NodeKind::FrontMatter => self.render_front_matter(ui, &self.raw(node)),
            NodeKind::ThematicBreak => self.render_rule(ui),
            NodeKind::BlockQuote => self.render_quote(ui, node, depth),
            NodeKind::List { list_type } => {
                for (index, item) in node.children.iter().enumerate() {
                    let marker = match item.kind {
                        NodeKind::TaskItem { checked } => task_marker(checked).to_string(),
                        _ => list_marker(*list_type, index),
                    };
                    self.render_list_item(ui, item, &marker, depth + 1);
                }
            }
            NodeKind::ListItem | NodeKind::TaskItem { .. } => {
                self.render_list_item(ui, node, "•", depth)
            }
            NodeKind::FootnoteDefinition => {
                ui.horizontal_wrapped(|ui| {
                    ui.label(RichText::new("※").color(self.colors.muted));
                    ui.vertical(|ui| {
                        for child in &node.children {
                            self.render_node(ui, child, depth + 1);
                        }
                    });
                });
            }
            NodeKind::Math { literal, .. } => render_math(ui, self.colors, self.font_size, literal),
            NodeKind::Root | NodeKind::TableRow { .. } | NodeKind::TableCell | NodeKind::Other => {
                for child in &node.children {
                    self.render_node(ui, child, depth + 1);
                }
            }
            NodeKind::Text(text) => {
                ui.label(RichText::new(text).color(self.colors.text));
            }
            NodeKind::Break => {}
        }
    }

    fn render_heading(&self, ui: &mut Ui, node: &MdNode, level: u8) {
        let size = self.font_size * heading_scale(level);
        ui.add_space(if level <= 2 { 6.0 } else { 3.0 });
        ui.label(
            RichText::new(node.text_content())
                .size(size)
                .strong()
                .color(self.colors.heading),
        );
    }

    /// Paragraph text with inline math highlighted.
    fn render_inline(&self, ui: &mut Ui, node: &MdNode, size: f32, color: Color32) {
        let mut job = egui::text::LayoutJob::default();
        let plain = egui::TextFormat {
            font_id: FontId::proportional(size),
            color,
            ..Default::default()
        };
        let math = egui::TextFormat {
            font_id: FontId::monospace(size * 0.95),
            color: self.colors.math,
            italics: true,
            ..Default::default()
        };

        let mut stack: Vec<&MdNode> = node.children.iter().rev().collect();
        while let Some(inline) = stack.pop() {
            match &inline.kind {
                NodeKind::Text(text) => job.append(text, 0.0, plain.clone()),
                NodeKind::Math { literal, .. } => job.append(literal, 0.0, math.clone()),
                NodeKind::Break => job.append(" ", 0.0, plain.clone()),
                _ => stack.extend(inline.children.iter().rev()),
            }
        }

        job.wrap.max_width = ui.available_width();
        ui.label(job);
    }

    fn render_code(&self, ui: &mut Ui, info: &str, literal: &str) {
        let language = info.split_whitespace().next();
        let body = literal.strip_suffix('\n').unwrap_or(literal);
        egui::Frame::none()
            .fill(self.colors.code_bg)
            .inner_margin(8.0)
            .rounding(4.0)
            .show(ui, |ui| {
                ui.set_width(ui.available_width());
                if let Some(language) = language {
                    ui.label(
                        RichText::new(language)
                            .font(FontId::monospace(self.font_size * 0.75))
                            .color(self.colors.muted),
                    );
                }
                ui.label(
                    RichText::new(body)
                        .font(FontId::monospace(self.font_size * 0.9))
                        .color(self.colors.code_text),
                );
            });
    }

    fn render_front_matter(&self, ui: &mut Ui, raw: &str) {
        egui::Frame::none()
            .fill(self.colors.code_bg)
            .inner_margin(8.0)
            .rounding(4.0)
            .show(ui, |ui| {
                ui.set_width(ui.available_width());
                ui.label(
                    RichText::new("Front Matter")
                        .font(FontId::monospace(self.font_size * 0.8))
                        .color(self.colors.muted)
                        .italics(),
                );
                ui.label(
                    RichText::new(raw)
                        .font(FontId::monospace(self.font_size * 0.9))
                        .color(self.colors.code_text),
                );
            });
    }

    fn render_rule(&self, ui: &mut Ui) {
        ui.add_space(4.0);
        let (rect, _) =
            ui.allocate_exact_size(Vec2::new(ui.available_width(), 1.0), egui::Sense::hover());
        ui.painter().rect_filled(rect, 0.0, self.colors.rule);
        ui.add_space(4.0);
    }

    fn render_quote(&self, ui: &mut Ui, node: &MdNode, depth: usize) {
        let response = ui.horizontal(|ui| {
            ui.add_space(12.0);
            ui.vertical(|ui| {
                for child in &node.children {
                    self.render_node(ui, child, depth + 1);
                }
            });
        });
        let rect = response.response.rect;
        ui.painter().vline(
            rect.left() + 3.0,
            rect.y_range(),
            Stroke::new(3.0, self.colors.quote_border),
        );
    }

    fn render_list_item(&self, ui: &mut Ui, node: &MdNode, marker: &str, depth: usize) {
        ui.horizontal(|ui| {
            ui.add_space(8.0);
            ui.label(RichText::new(marker).color(self.colors.muted));
            ui.vertical(|ui| {
                for child in &node.children {
                    self.render_node(ui, child, depth + 1);
                }
            });
        });
    }

    fn render_table(&self, ui: &mut Ui, node: &MdNode) {
        let id = ui.id().with(("preview-table", node.position.map(|span| span.start)));
        egui::Grid::new(id)
            .striped(true)
            .spacing(Vec2::new(12.0, 4.0))
            .show(ui, |ui| {
                for row in &node.children {
                    let NodeKind::TableRow { header } = row.kind else {
                        continue;
                    };
                    for cell in &row.children {
                        let text = RichText::new(cell.text_content())
                            .size(self.font_size)
                            .color(self.colors.text);
                        ui.label(if header { text.strong() } else { text });
                    }
                    ui.end_row();
                }
            });
    }
}

fn render_math(ui: &mut Ui, colors: &PreviewColors, font_size: f32, source: &str) {
    let body = strip_formula_fences(source);
    ui.vertical_centered(|ui| {
        ui.label(
            RichText::new(body)
                .font(FontId::monospace(font_size))
                .color(colors.math)
                .italics(),
        );
    });
}

// ─────────────────────────────────────────────────────────────────────────────
// Helpers
// ─────────────────────────────────────────────────────────────────────────────

/// Heading size relative to body text.
pub fn heading_scale(level: u8) -> f32 {
    match level {
        1 => 1.8,
        2 => 1.5,
        3 => 1.3,
        4 => 1.15,
        5 => 1.05,
        _ => 1.0,
    }
}

/// Remove the `$$` fences around a block formula.
pub fn strip_formula_fences(source: &str) -> &str {
    let trimmed = source.trim();
    let inner = trimmed.strip_prefix("$$").unwrap_or(trimmed);
    let inner = inner.strip_suffix("$$").unwrap_or(inner);
    inner.trim()
}

/// Marker for the item at `index` of a list.
pub fn list_marker(list_type: ListType, index: usize) -> String {
    match list_type {
        ListType::Bullet => "•".to_string(),
        ListType::Ordered { start, delimiter } => {
            format!("{}{}", start.saturating_add(index), delimiter)
        }
    }
}

fn task_marker(checked: bool) -> &'static str {
    if checked {
        "☑"
    } else {
        "☐"
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn block(id: &str, content: &str) -> Block {
        Block::new(BlockId::new(id), content, 1, 1, BlockKind::Paragraph)
    }

    #[test]
    fn test_strip_formula_fences() {
        assert_eq!(strip_formula_fences("$$\nx^2\n$$"), "x^2");
        assert_eq!(strip_formula_fences("$$y$$"), "y");
        assert_eq!(strip_formula_fences("plain"), "plain");
    }

    #[test]
    fn test_list_marker() {
        assert_eq!(list_marker(ListType::Bullet, 4), "•");
        let ordered = ListType::Ordered {
            start: 12,
            delimiter: '.',
        };
        assert_eq!(list_marker(ordered, 0), "12.");
        assert_eq!(list_marker(ordered, 2), "14.");
        let paren = ListType::Ordered {
            start: 3,
            delimiter: ')',
        };
        assert_eq!(list_marker(paren, 0), "3)");
        assert_eq!(task_marker(true), "☑");
        assert_eq!(task_marker(false), "☐");
    }

    #[test]
    fn test_cached_table_keeps_escaped_pipe_in_one_cell() {
        let mut cache = PreviewCache::new();
        let table = block("t", "| a \\| b | c |\n|---|---|\n| `x` | z |");
        let tree = &cache.get_or_parse(&table).tree;
        let rows: Vec<Vec<String>> = tree.children[0]
            .children
            .iter()
            .map(|row| row.children.iter().map(|c| c.text_content().trim().to_string()).collect())
            .collect();
        assert_eq!(
            rows,
            vec![
                vec!["a | b".to_string(), "c".to_string()],
                vec!["x".to_string(), "z".to_string()],
            ]
        );
    }

    #[test]
    fn test_heading_scale_monotonic() {
        for level in 1..6 {
            assert!(heading_scale(level) >= heading_scale(level + 1));
        }
    }

    #[test]
    fn test_cache_reparses_on_change() {
        let mut cache = PreviewCache::new();
        let first = block("a", "# One");
        assert_eq!(cache.get_or_parse(&first).tree.children[0].kind, NodeKind::Heading { level: 1 });

        let edited = block("a", "plain");
        assert_eq!(cache.get_or_parse(&edited).tree.children[0].kind, NodeKind::Paragraph);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_cache_retain_blocks() {
        let mut cache = PreviewCache::new();
        let blocks = vec![block("a", "x"), block("b", "y"), block("c", "z")];
        for b in &blocks {
            cache.get_or_parse(b);
        }
        cache.retain_blocks(&blocks[1..2]);
        assert_eq!(cache.len(), 1);
        cache.retain_blocks(&[]);
        assert!(cache.is_empty());
    }
}
