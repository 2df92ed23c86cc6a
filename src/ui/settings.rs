//! Settings window for blockdown
//!
//! A modal window over a dimmed overlay. Changes are written straight into
//! `Settings` for live preview; the caller persists them.

use crate::config::{Settings, Theme};
use eframe::egui::{self, Color32, RichText, Ui};

/// Settings window sections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SettingsSection {
    #[default]
    Appearance,
    Scrolling,
    Documents,
}

impl SettingsSection {
    pub fn label(&self) -> &'static str {
        match self {
            SettingsSection::Appearance => "Appearance",
            SettingsSection::Scrolling => "Scrolling",
            SettingsSection::Documents => "Documents",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            SettingsSection::Appearance => "🎨",
            SettingsSection::Scrolling => "⇅",
            SettingsSection::Documents => "📄",
        }
    }

    pub fn all() -> [SettingsSection; 3] {
        [
            SettingsSection::Appearance,
            SettingsSection::Scrolling,
            SettingsSection::Documents,
        ]
    }
}

/// Result of showing the settings window.
#[derive(Debug, Clone, Default)]
pub struct SettingsPanelOutput {
    pub changed: bool,
    pub close_requested: bool,
    pub reset_requested: bool,
}

/// Settings window state.
#[derive(Debug, Clone, Default)]
pub struct SettingsPanel {
    active_section: SettingsSection,
}

impl SettingsPanel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Show the settings window over a dimmed overlay.
    pub fn show(
        &mut self,
        ctx: &egui::Context,
        settings: &mut Settings,
        is_dark: bool,
    ) -> SettingsPanelOutput {
        let mut output = SettingsPanelOutput::default();

        let screen_rect = ctx.screen_rect();
        let overlay_color = if is_dark {
            Color32::from_rgba_unmultiplied(0, 0, 0, 180)
        } else {
            Color32::from_rgba_unmultiplied(0, 0, 0, 120)
        };

        egui::Area::new(egui::Id::new("settings_overlay"))
            .order(egui::Order::Middle)
            .fixed_pos(screen_rect.min)
            .show(ctx, |ui| {
                let response = ui.allocate_response(screen_rect.size(), egui::Sense::click());
                ui.painter().rect_filled(screen_rect, 0.0, overlay_color);
                if response.clicked() {
                    output.close_requested = true;
                }
            });

        egui::Window::new("⚙ Settings")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .min_width(480.0)
            .order(egui::Order::Foreground)
            .show(ctx, |ui| {
                if ui.input(|i| i.key_pressed(egui::Key::Escape)) {
                    output.close_requested = true;
                }

                ui.horizontal(|ui| {
                    ui.vertical(|ui| {
                        ui.set_min_width(120.0);
                        for section in SettingsSection::all() {
                            let text = format!("{} {}", section.icon(), section.label());
                            if ui
                                .add_sized(
                                    [110.0, 32.0],
                                    egui::SelectableLabel::new(
                                        self.active_section == section,
                                        RichText::new(text).size(14.0),
                                    ),
                                )
                                .clicked()
                            {
                                self.active_section = section;
                            }
                        }

                        ui.add_space(16.0);
                        if ui
                            .add_sized([110.0, 28.0], egui::Button::new("↺ Reset All"))
                            .on_hover_text("Reset all settings to defaults")
                            .clicked()
                        {
                            output.reset_requested = true;
                        }
                    });

                    ui.separator();

                    ui.vertical(|ui| {
                        ui.set_min_width(330.0);
                        ui.set_min_height(260.0);
                        output.changed |= match self.active_section {
                            SettingsSection::Appearance => show_appearance_section(ui, settings),
                            SettingsSection::Scrolling => show_scrolling_section(ui, settings),
                            SettingsSection::Documents => show_documents_section(ui, settings),
                        };
                    });
                });

                ui.separator();
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui.button("Close").clicked() {
                        output.close_requested = true;
                    }
                    ui.label(
                        RichText::new("Settings are saved automatically")
                            .small()
                            .weak(),
                    );
                });
            });

        output
    }
}

fn show_appearance_section(ui: &mut Ui, settings: &mut Settings) -> bool {
    let mut changed = false;

    ui.heading("Appearance");
    ui.add_space(8.0);

    ui.label(RichText::new("Theme").strong());
    ui.horizontal(|ui| {
        for theme in Theme::all() {
            changed |= ui
                .selectable_value(&mut settings.theme, *theme, theme.label())
                .changed();
        }
    });

    ui.add_space(12.0);
    ui.horizontal(|ui| {
        ui.label(RichText::new("Font Size").strong());
        ui.label(format!("{}px", settings.font_size as u32));
    });
    changed |= ui
        .add(
            egui::Slider::new(
                &mut settings.font_size,
                Settings::MIN_FONT_SIZE..=Settings::MAX_FONT_SIZE,
            )
            .show_value(false)
            .step_by(1.0),
        )
        .changed();

    ui.add_space(12.0);
    ui.horizontal(|ui| {
        ui.label(RichText::new("Editor Width").strong());
        ui.label(format!("{}%", (settings.split_ratio * 100.0).round() as u32));
    });
    changed |= ui
        .add(
            egui::Slider::new(
                &mut settings.split_ratio,
                Settings::MIN_SPLIT_RATIO..=Settings::MAX_SPLIT_RATIO,
            )
            .show_value(false),
        )
        .changed();

    changed
}

fn show_scrolling_section(ui: &mut Ui, settings: &mut Settings) -> bool {
    let mut changed = false;

    ui.heading("Scrolling");
    ui.add_space(8.0);

    changed |= ui
        .checkbox(&mut settings.sync_scroll_enabled, "Sync Scroll")
        .on_hover_text("Scroll the other pane to the block at the top of the pane you scroll")
        .changed();

    ui.add_enabled_ui(settings.sync_scroll_enabled, |ui| {
        changed |= ui
            .checkbox(&mut settings.smooth_sync_scroll, "Smooth Scrolling")
            .on_hover_text("Animate the synchronized pane instead of jumping")
            .changed();

        ui.add_space(12.0);
        ui.label(RichText::new("Debounce").strong());
        changed |= ui
            .add(
                egui::Slider::new(&mut settings.sync_debounce_ms, 0..=Settings::MAX_SYNC_DELAY_MS)
                    .suffix(" ms")
                    .logarithmic(true),
            )
            .on_hover_text("Wait this long after scrolling stops before syncing")
            .changed();

        ui.add_space(8.0);
        ui.label(RichText::new("Guard").strong());
        changed |= ui
            .add(
                egui::Slider::new(&mut settings.sync_guard_ms, 0..=Settings::MAX_SYNC_DELAY_MS)
                    .suffix(" ms")
                    .logarithmic(true),
            )
            .on_hover_text("Ignore scrolling in the synced pane for this long")
            .changed();
    });

    changed
}

fn show_documents_section(ui: &mut Ui, settings: &mut Settings) -> bool {
    let mut changed = false;

    ui.heading("Documents");
    ui.add_space(8.0);

    changed |= ui
        .checkbox(&mut settings.format_on_open, "Format on Open")
        .on_hover_text("Expand single-line $$ formulas and collapse blank lines when opening")
        .changed();

    ui.add_space(12.0);
    ui.label(RichText::new("Segmentation chunk").strong());
    changed |= ui
        .add(
            egui::Slider::new(
                &mut settings.segment_chunk_atoms,
                Settings::MIN_CHUNK_ATOMS..=100_000,
            )
            .suffix(" atoms per frame")
            .logarithmic(true),
        )
        .changed();

    ui.add_space(12.0);
    ui.horizontal(|ui| {
        ui.label(RichText::new("Recent Files").strong());
        ui.label(format!("Remember {} files", settings.max_recent_files));
    });
    changed |= ui
        .add(egui::Slider::new(&mut settings.max_recent_files, 0..=20).show_value(false))
        .changed();

    ui.horizontal(|ui| {
        if ui
            .button("Clear Recent Files")
            .on_hover_text("Remove all files from the recent files list")
            .clicked()
        {
            settings.recent_files.clear();
            changed = true;
        }
        if !settings.recent_files.is_empty() {
            ui.label(
                RichText::new(format!("({} files)", settings.recent_files.len()))
                    .small()
                    .weak(),
            );
        }
    });

    changed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_panel_default_section() {
        let panel = SettingsPanel::new();
        assert_eq!(panel.active_section, SettingsSection::Appearance);
    }

    #[test]
    fn test_section_labels() {
        let labels: Vec<_> = SettingsSection::all().iter().map(|s| s.label()).collect();
        assert_eq!(labels, vec!["Appearance", "Scrolling", "Documents"]);
    }

    #[test]
    fn test_output_default() {
        let output = SettingsPanelOutput::default();
        assert!(!output.changed);
        assert!(!output.close_requested);
        assert!(!output.reset_requested);
    }
}
