//! Virtualized vertical list of blocks
//!
//! Only the items intersecting the viewport are laid out. Item heights are
//! measured as they are drawn and remembered; unmeasured items use an
//! estimate. Each frame the list reports the visible index range and accepts
//! `scroll_to_index` requests from the scroll synchronizer.

use crate::preview::{ScrollAlign, ScrollAnimation, ScrollBehavior, SMOOTH_SCROLL_DURATION};
use eframe::egui::{self, Rect, ScrollArea, Ui};
use log::debug;
use std::time::Instant;

/// Height assumed for items that have not been drawn yet.
const ESTIMATED_ITEM_HEIGHT: f32 = 48.0;

/// Vertical gap between items.
const ITEM_SPACING: f32 = 6.0;

// ─────────────────────────────────────────────────────────────────────────────
// Layout
// ─────────────────────────────────────────────────────────────────────────────

/// Item heights and the offsets derived from them.
#[derive(Debug, Clone, Default)]
pub struct ListLayout {
    heights: Vec<f32>,
    /// `tops[i]` is the y offset of item `i`; `tops[len]` is the total height
    tops: Vec<f32>,
}

impl ListLayout {
    pub fn len(&self) -> usize {
        self.heights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heights.is_empty()
    }

    /// Resize to `len` items, keeping measured heights of surviving items.
    pub fn set_len(&mut self, len: usize) {
        if len != self.heights.len() {
            self.heights.resize(len, ESTIMATED_ITEM_HEIGHT);
            self.recompute();
        }
    }

    /// Forget every measurement.
    pub fn clear(&mut self) {
        self.heights.clear();
        self.tops.clear();
    }

    /// Record the drawn height of item `index`. Returns whether it changed.
    pub fn measure(&mut self, index: usize, height: f32) -> bool {
        match self.heights.get_mut(index) {
            Some(h) if (*h - height).abs() > 0.5 => {
                *h = height;
                self.recompute();
                true
            }
            _ => false,
        }
    }

    fn recompute(&mut self) {
        self.tops.clear();
        self.tops.reserve(self.heights.len() + 1);
        let mut y = 0.0;
        for height in &self.heights {
            self.tops.push(y);
            y += height + ITEM_SPACING;
        }
        self.tops.push(y);
    }

    pub fn top(&self, index: usize) -> f32 {
        self.tops.get(index).copied().unwrap_or(0.0)
    }

    pub fn height(&self, index: usize) -> f32 {
        self.heights.get(index).copied().unwrap_or(0.0)
    }

    pub fn total_height(&self) -> f32 {
        self.tops.last().copied().unwrap_or(0.0)
    }

    /// Indices of the first and last items intersecting `top..bottom`.
    pub fn range_for(&self, top: f32, bottom: f32) -> Option<(usize, usize)> {
        if self.heights.is_empty() {
            return None;
        }
        let last_index = self.heights.len() - 1;
        // first item whose bottom edge is below the viewport top
        let first = self.tops[1..]
            .partition_point(|&next_top| next_top <= top)
            .min(last_index);
        let last = self.tops[..self.heights.len()]
            .partition_point(|&t| t < bottom)
            .saturating_sub(1)
            .clamp(first, last_index);
        Some((first, last))
    }

    /// Scroll offset that places item `index` per `align` in a viewport of
    /// `viewport_height`, clamped to the scrollable range.
    pub fn offset_for(&self, index: usize, align: ScrollAlign, viewport_height: f32) -> f32 {
        let top = self.top(index);
        let height = self.height(index);
        let offset = match align {
            ScrollAlign::Start => top,
            ScrollAlign::Center => top + height / 2.0 - viewport_height / 2.0,
            ScrollAlign::End => top + height - viewport_height,
        };
        let max_offset = (self.total_height() - viewport_height).max(0.0);
        offset.clamp(0.0, max_offset)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Virtual List
// ─────────────────────────────────────────────────────────────────────────────

/// What happened during one `VirtualList::show`.
#[derive(Debug, Clone, Copy, Default)]
pub struct VirtualListOutput {
    /// Visible `(first, last)` indices, if the list has items
    pub range: Option<(usize, usize)>,
    /// Whether the range differs from the previous frame's
    pub range_changed: bool,
    /// Whether the pointer is over the list
    pub hovered: bool,
    /// Whether a smooth scroll is still running
    pub animating: bool,
}

#[derive(Debug, Clone, Copy)]
struct ScrollRequest {
    index: usize,
    align: ScrollAlign,
    behavior: ScrollBehavior,
}

/// A scrollable list that lays out only its visible items.
#[derive(Debug)]
pub struct VirtualList {
    id_source: egui::Id,
    layout: ListLayout,
    offset: f32,
    viewport_height: f32,
    request: Option<ScrollRequest>,
    animation: Option<ScrollAnimation>,
    last_range: Option<(usize, usize)>,
}

impl VirtualList {
    pub fn new(id_source: impl std::hash::Hash) -> Self {
        Self {
            id_source: egui::Id::new(id_source),
            layout: ListLayout::default(),
            offset: 0.0,
            viewport_height: 0.0,
            request: None,
            animation: None,
            last_range: None,
        }
    }

    pub fn layout(&self) -> &ListLayout {
        &self.layout
    }

    /// Forget measurements and pending scrolls, e.g. after a document reload.
    pub fn reset(&mut self) {
        self.layout.clear();
        self.request = None;
        self.animation = None;
        self.last_range = None;
    }

    /// Ask the list to bring item `index` into view on the next frame.
    ///
    /// Ignored when the list has no items; out-of-range indices scroll to
    /// the last item.
    pub fn scroll_to_index(&mut self, index: usize, align: ScrollAlign, behavior: ScrollBehavior) {
        if self.layout.is_empty() {
            return;
        }
        let index = index.min(self.layout.len() - 1);
        debug!("{:?}: scroll to index {} ({:?})", self.id_source, index, align);
        self.request = Some(ScrollRequest {
            index,
            align,
            behavior,
        });
    }

    /// Resolve any scroll request into an offset for this frame.
    fn forced_offset(&mut self, now: Instant) -> Option<f32> {
        if let Some(request) = self.request.take() {
            let target = self
                .layout
                .offset_for(request.index, request.align, self.viewport_height);
            match request.behavior {
                ScrollBehavior::Auto => {
                    self.animation = None;
                    return Some(target);
                }
                ScrollBehavior::Smooth => {
                    self.animation = Some(ScrollAnimation::new(
                        self.offset,
                        target,
                        now,
                        SMOOTH_SCROLL_DURATION,
                    ));
                }
            }
        }

        let animation = self.animation?;
        let offset = animation.offset_at(now);
        if animation.is_finished(now) {
            self.animation = None;
        }
        Some(offset)
    }

    /// Show `len` items, drawing each visible one with `add_item`.
    pub fn show(
        &mut self,
        ui: &mut Ui,
        len: usize,
        mut add_item: impl FnMut(&mut Ui, usize),
    ) -> VirtualListOutput {
        self.layout.set_len(len);
        let now = Instant::now();

        let mut scroll_area = ScrollArea::vertical()
            .id_source(self.id_source)
            .auto_shrink([false, false]);
        if let Some(offset) = self.forced_offset(now) {
            scroll_area = scroll_area.vertical_scroll_offset(offset);
        }

        let layout = &mut self.layout;
        let scroll_output = scroll_area.show_viewport(ui, |ui, viewport| {
            ui.set_min_height(layout.total_height());

            let (first, last) = layout.range_for(viewport.min.y, viewport.max.y)?;
            let origin = ui.max_rect().left_top();
            let width = ui.available_width();
            for index in first..=last {
                let min = origin + egui::vec2(0.0, layout.top(index));
                let rect = Rect::from_min_size(min, egui::vec2(width, layout.height(index)));
                let response = ui.allocate_ui_at_rect(rect, |ui| {
                    ui.push_id(index, |ui| add_item(ui, index));
                });
                layout.measure(index, response.response.rect.height());
            }
            layout.range_for(viewport.min.y, viewport.max.y)
        });

        self.offset = scroll_output.state.offset.y;
        self.viewport_height = scroll_output.inner_rect.height();

        let range = scroll_output.inner;
        let range_changed = range != self.last_range;
        self.last_range = range;

        let animating = self.animation.is_some();
        if animating {
            ui.ctx().request_repaint();
        }

        VirtualListOutput {
            range,
            range_changed,
            hovered: ui.rect_contains_pointer(scroll_output.inner_rect),
            animating,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn layout(heights: &[f32]) -> ListLayout {
        let mut layout = ListLayout::default();
        layout.set_len(heights.len());
        for (i, h) in heights.iter().enumerate() {
            layout.measure(i, *h);
        }
        layout
    }

    #[test]
    fn test_offsets_include_spacing() {
        let layout = layout(&[10.0, 20.0, 30.0]);
        assert_eq!(layout.top(0), 0.0);
        assert_eq!(layout.top(1), 10.0 + ITEM_SPACING);
        assert_eq!(layout.top(2), 30.0 + 2.0 * ITEM_SPACING);
        assert_eq!(layout.total_height(), 60.0 + 3.0 * ITEM_SPACING);
    }

    #[test]
    fn test_range_for_viewport() {
        let layout = layout(&[100.0; 10]);
        let stride = 100.0 + ITEM_SPACING;
        assert_eq!(layout.range_for(0.0, 250.0), Some((0, 2)));
        assert_eq!(layout.range_for(3.0 * stride, 3.0 * stride + 50.0), Some((3, 3)));
        assert_eq!(layout.range_for(3.0 * stride - 1.0, 4.0 * stride + 1.0), Some((2, 4)));
    }

    #[test]
    fn test_range_past_end_clamps_to_last() {
        let layout = layout(&[10.0, 10.0]);
        assert_eq!(layout.range_for(1_000.0, 2_000.0), Some((1, 1)));
    }

    #[test]
    fn test_empty_layout_has_no_range() {
        let layout = ListLayout::default();
        assert_eq!(layout.range_for(0.0, 100.0), None);
        assert_eq!(layout.total_height(), 0.0);
    }

    #[test]
    fn test_offset_for_alignments() {
        let layout = layout(&[100.0; 10]);
        let stride = 100.0 + ITEM_SPACING;
        assert_eq!(layout.offset_for(3, ScrollAlign::Start, 200.0), 3.0 * stride);
        assert_eq!(
            layout.offset_for(3, ScrollAlign::Center, 200.0),
            3.0 * stride + 50.0 - 100.0
        );
        assert_eq!(
            layout.offset_for(3, ScrollAlign::End, 200.0),
            3.0 * stride + 100.0 - 200.0
        );
    }

    #[test]
    fn test_offset_for_clamps() {
        let layout = layout(&[100.0; 3]);
        assert_eq!(layout.offset_for(0, ScrollAlign::End, 500.0), 0.0);
        let max = layout.total_height() - 150.0;
        assert_eq!(layout.offset_for(2, ScrollAlign::Start, 150.0), max);
    }

    #[test]
    fn test_set_len_keeps_measurements() {
        let mut layout = layout(&[10.0, 20.0]);
        layout.set_len(3);
        assert_eq!(layout.height(1), 20.0);
        assert_eq!(layout.height(2), ESTIMATED_ITEM_HEIGHT);
        layout.set_len(1);
        assert_eq!(layout.len(), 1);
        assert_eq!(layout.total_height(), 10.0 + ITEM_SPACING);
    }

    #[test]
    fn test_scroll_on_empty_list_is_ignored() {
        let mut list = VirtualList::new("empty");
        list.scroll_to_index(4, ScrollAlign::Start, ScrollBehavior::Auto);
        assert!(list.request.is_none());
    }

    #[test]
    fn test_scroll_index_clamped() {
        let mut list = VirtualList::new("list");
        list.layout.set_len(3);
        list.scroll_to_index(9, ScrollAlign::Start, ScrollBehavior::Auto);
        assert_eq!(list.request.map(|r| r.index), Some(2));
    }

    #[test]
    fn test_auto_scroll_resolves_immediately() {
        let mut list = VirtualList::new("list");
        list.layout = layout(&[100.0; 5]);
        list.viewport_height = 100.0;
        list.scroll_to_index(2, ScrollAlign::Start, ScrollBehavior::Auto);
        let offset = list.forced_offset(Instant::now());
        assert_eq!(offset, Some(list.layout.top(2)));
        assert!(list.forced_offset(Instant::now()).is_none());
    }

    #[test]
    fn test_smooth_scroll_animates_to_target() {
        let mut list = VirtualList::new("list");
        list.layout = layout(&[100.0; 5]);
        list.viewport_height = 100.0;
        let start = Instant::now();
        list.scroll_to_index(3, ScrollAlign::Start, ScrollBehavior::Smooth);

        let first = list.forced_offset(start).unwrap_or(-1.0);
        assert_eq!(first, 0.0);
        assert!(list.animation.is_some());

        let done = list
            .forced_offset(start + SMOOTH_SCROLL_DURATION)
            .unwrap_or(-1.0);
        assert_eq!(done, list.layout.top(3));
        assert!(list.animation.is_none());
    }

    #[test]
    fn test_reset_clears_state() {
        let mut list = VirtualList::new("list");
        list.layout.set_len(4);
        list.scroll_to_index(1, ScrollAlign::Start, ScrollBehavior::Auto);
        list.reset();
        assert!(list.layout.is_empty());
        assert!(list.request.is_none());
    }
}
