//! Bottom status bar: document path, statistics, segmentation progress and
//! sync-scroll state

use crate::document::DocumentStats;
use crate::preview::PaneMode;
use eframe::egui::{self, RichText, Ui};

/// Everything the status bar displays.
#[derive(Debug, Clone, Default)]
pub struct StatusInfo {
    pub path: Option<String>,
    pub stats: DocumentStats,
    /// `(processed, total)` atoms while segmenting
    pub progress: Option<(usize, usize)>,
    pub sync_enabled: bool,
    pub editor_mode: PaneMode,
    pub preview_mode: PaneMode,
    /// First and last block index visible in the editor pane
    pub visible: Option<(usize, usize)>,
    pub toast: Option<String>,
}

/// Percentage shown while segmenting; an empty job counts as done.
pub fn progress_percent(processed: usize, total: usize) -> u32 {
    if total == 0 {
        return 100;
    }
    ((processed.min(total) as f64 / total as f64) * 100.0).round() as u32
}

/// Sync indicator text for the given pane modes.
pub fn sync_label(enabled: bool, editor: PaneMode, preview: PaneMode) -> &'static str {
    if !enabled {
        return "⇅ Sync off";
    }
    match (editor, preview) {
        (PaneMode::ProgrammaticScrolling, _) | (_, PaneMode::ProgrammaticScrolling) => {
            "⇅ Syncing…"
        }
        (PaneMode::UserScrolling, _) => "⇅ Sync on · editor",
        (_, PaneMode::UserScrolling) => "⇅ Sync on · preview",
        _ => "⇅ Sync on",
    }
}

/// 1-based block range shown next to the statistics, e.g. `"Blocks 3–9"`.
pub fn visible_label(visible: (usize, usize)) -> String {
    let (first, last) = visible;
    if first == last {
        format!("Block {}", first.saturating_add(1))
    } else {
        format!("Blocks {}–{}", first.saturating_add(1), last.saturating_add(1))
    }
}

/// Draw the status bar. Returns `true` if the sync indicator was clicked.
pub fn show_status_bar(ui: &mut Ui, info: &StatusInfo) -> bool {
    let mut toggle_sync = false;
    ui.horizontal(|ui| {
        let path = info.path.as_deref().unwrap_or("Untitled");
        ui.label(RichText::new(path).small());
        ui.separator();

        if let Some((processed, total)) = info.progress {
            ui.spinner();
            ui.label(
                RichText::new(format!(
                    "Segmenting… {}%",
                    progress_percent(processed, total)
                ))
                .small(),
            );
        } else {
            ui.label(RichText::new(info.stats.format_compact()).small());
            if let Some(visible) = info.visible.filter(|_| info.stats.blocks > 0) {
                ui.separator();
                ui.label(RichText::new(visible_label(visible)).small().weak());
            }
        }

        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            let sync_label = sync_label(info.sync_enabled, info.editor_mode, info.preview_mode);
            if ui
                .selectable_label(info.sync_enabled, RichText::new(sync_label).small())
                .on_hover_text("Toggle synchronized scrolling (Ctrl+Shift+Y)")
                .clicked()
            {
                toggle_sync = true;
            }

            if let Some(toast) = &info.toast {
                ui.separator();
                ui.label(RichText::new(toast).small().italics());
            }
        });
    });
    toggle_sync
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_percent() {
        assert_eq!(progress_percent(0, 0), 100);
        assert_eq!(progress_percent(0, 10), 0);
        assert_eq!(progress_percent(1, 3), 33);
        assert_eq!(progress_percent(10, 10), 100);
        assert_eq!(progress_percent(20, 10), 100);
    }

    #[test]
    fn test_sync_label_follows_pane_modes() {
        use PaneMode::*;
        assert_eq!(sync_label(false, ProgrammaticScrolling, Idle), "⇅ Sync off");
        assert_eq!(sync_label(true, Idle, Idle), "⇅ Sync on");
        assert_eq!(sync_label(true, UserScrolling, Idle), "⇅ Sync on · editor");
        assert_eq!(sync_label(true, Idle, UserScrolling), "⇅ Sync on · preview");
        assert_eq!(sync_label(true, UserScrolling, ProgrammaticScrolling), "⇅ Syncing…");
    }

    #[test]
    fn test_sync_label_from_synchronizer() {
        use crate::preview::{Pane, ScrollSynchronizer};
        use std::time::{Duration, Instant};

        let mut sync = ScrollSynchronizer::new();
        let t0 = Instant::now();
        sync.pointer_enter(Pane::Editor);
        sync.range_changed(Pane::Editor, 4, 9, t0);
        let label = |sync: &ScrollSynchronizer, now| {
            sync_label(
                sync.is_enabled(),
                sync.mode(Pane::Editor, now),
                sync.mode(Pane::Preview, now),
            )
        };
        assert_eq!(label(&sync, t0), "⇅ Sync on · editor");

        let fired = t0 + Duration::from_millis(60);
        assert!(sync.poll(fired).is_some());
        assert_eq!(label(&sync, fired), "⇅ Syncing…");
        assert_eq!(sync.visible_range(Pane::Editor), Some((4, 9)));
        assert_eq!(visible_label((4, 9)), "Blocks 5–10");
        assert_eq!(visible_label((0, 0)), "Block 1");

        let settled = fired + Duration::from_millis(200);
        sync.poll(settled);
        assert_eq!(label(&sync, settled), "⇅ Sync on · editor");
    }
}
