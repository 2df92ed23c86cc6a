//! Main application module for blockdown
//!
//! Implements `eframe::App`: menus and shortcuts, the two block panes, the
//! scroll synchronizer wiring, chunked segmentation and dialogs.

use crate::config::{Settings, WindowSize};
use crate::document::BlockAction;
use crate::export::{copy_markdown_with_html, copy_text_to_clipboard};
use crate::files::dialogs::{is_markdown_path, open_markdown_dialog, save_markdown_dialog};
use crate::preview::{Pane, ScrollSynchronizer};
use crate::state::{AppState, PendingAction, SegmentStatus};
use crate::theme::{system_dark_mode, ThemeManager};
use crate::ui::{show_status_bar, EditorPane, PreviewPane, SettingsPanel, StatusInfo, VirtualListOutput};
use eframe::egui;
use log::{debug, info, warn};
use std::path::PathBuf;
use std::time::Instant;

/// Application name shown in the title bar.
const APP_NAME: &str = "blockdown";

/// Seconds a status message stays visible.
const TOAST_DURATION: f64 = 3.0;

/// User commands from the menu bar, shortcuts or the status bar.
///
/// Collected while drawing and executed afterwards to avoid borrow conflicts.
#[derive(Debug, Clone, PartialEq)]
enum AppAction {
    /// Ctrl+N
    New,
    /// Ctrl+O
    Open,
    OpenRecent(PathBuf),
    /// Ctrl+S
    Save,
    /// Ctrl+Shift+S
    SaveAs,
    Restore,
    /// Ctrl+R
    Reparse,
    /// Ctrl+Shift+F
    Format,
    /// Ctrl+Shift+C
    CopyMarkdown,
    CopyHtml,
    /// Ctrl+Shift+Y
    ToggleSync,
    /// Ctrl+Shift+T
    CycleTheme,
    /// Ctrl+,
    OpenSettings,
    Exit,
}

/// The main application struct.
pub struct BlockdownApp {
    state: AppState,
    theme_manager: ThemeManager,
    synchronizer: ScrollSynchronizer,
    editor_pane: EditorPane,
    preview_pane: PreviewPane,
    settings_panel: SettingsPanel,
    /// `(processed, total)` while a segmentation is running
    segment_progress: Option<(usize, usize)>,
    should_exit: bool,
    last_title: String,
    last_window_size: Option<egui::Vec2>,
    start_time: Instant,
}

impl BlockdownApp {
    /// Create the app, optionally opening `initial_file`.
    pub fn new(cc: &eframe::CreationContext<'_>, initial_file: Option<PathBuf>) -> Self {
        info!("Initializing {}", APP_NAME);

        let state = AppState::new();
        let mut theme_manager = ThemeManager::new(state.settings.theme);
        theme_manager.apply_if_needed(
            &cc.egui_ctx,
            system_dark_mode(cc.integration_info.system_theme),
        );

        let mut synchronizer = ScrollSynchronizer::with_config(state.settings.sync_scroll_config());
        synchronizer.set_enabled(state.settings.sync_scroll_enabled);

        let mut app = Self {
            state,
            theme_manager,
            synchronizer,
            editor_pane: EditorPane::new(),
            preview_pane: PreviewPane::new(),
            settings_panel: SettingsPanel::new(),
            segment_progress: None,
            should_exit: false,
            last_title: String::new(),
            last_window_size: None,
            start_time: Instant::now(),
        };

        if let Some(path) = initial_file {
            app.open_path(path);
        }
        app
    }

    fn app_time(&self) -> f64 {
        self.start_time.elapsed().as_secs_f64()
    }

    fn window_title(&self) -> String {
        format!("{} - {}", self.state.document.title(), APP_NAME)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Document Lifecycle
    // ─────────────────────────────────────────────────────────────────────────

    /// Drive segmentation by one chunk per frame.
    fn step_segmentation(&mut self, ctx: &egui::Context) {
        let chunk = self.state.settings.segment_chunk_atoms;
        match self.state.document.step_segmentation(chunk) {
            SegmentStatus::Idle => self.segment_progress = None,
            SegmentStatus::Pending { processed, total } => {
                self.segment_progress = Some((processed, total));
                ctx.request_repaint();
            }
            SegmentStatus::Finished => {
                self.segment_progress = None;
                self.on_blocks_replaced();
                ctx.request_repaint();
            }
        }
    }

    /// Indices and ids are no longer comparable to what the panes saw.
    fn on_blocks_replaced(&mut self) {
        self.synchronizer.reset();
        self.editor_pane.list_mut().reset();
        self.preview_pane.reset();
        debug!(
            "Document has {} blocks",
            self.state.document.blocks().len()
        );
    }

    /// Complete any pending segmentation before reading the whole text.
    fn finish_segmentation(&mut self) {
        if self.state.document.finish_segmentation() {
            self.segment_progress = None;
            self.on_blocks_replaced();
        }
    }

    fn open_path(&mut self, path: PathBuf) {
        match self.state.open_file(path) {
            Ok(()) => self.on_blocks_replaced(),
            Err(e) => self.state.show_error(format!("Failed to open file:\n{}", e)),
        }
    }

    fn run_pending_action(&mut self, action: PendingAction) {
        match action {
            PendingAction::NewDocument => {
                self.state.new_document();
                self.on_blocks_replaced();
            }
            PendingAction::OpenDialog => {
                let initial_dir = self.last_directory();
                if let Some(path) = open_markdown_dialog(initial_dir.as_deref()) {
                    self.open_path(path);
                }
            }
            PendingAction::OpenFile(path) => self.open_path(path),
            PendingAction::Restore => self.state.document.restore(),
            PendingAction::Exit => self.should_exit = true,
        }
    }

    /// Run `action` now, or after the user confirms discarding edits.
    fn request(&mut self, action: PendingAction) {
        if let Some(action) = self.state.request(action) {
            self.run_pending_action(action);
        }
    }

    /// Directory of the open document, else of the most recent file.
    fn last_directory(&self) -> Option<PathBuf> {
        self.state
            .document
            .path()
            .map(|p| p.to_path_buf())
            .or_else(|| self.state.settings.recent_files.first().cloned())
            .and_then(|p| p.parent().map(|d| d.to_path_buf()))
    }

    fn handle_save(&mut self) {
        self.finish_segmentation();
        if self.state.document.path().is_none() {
            self.handle_save_as();
            return;
        }
        if let Err(e) = self.state.save() {
            self.state.show_error(format!("Failed to save file:\n{}", e));
        }
    }

    fn handle_save_as(&mut self) {
        self.finish_segmentation();
        let initial_dir = self.last_directory();
        let default_name = self
            .state
            .document
            .path()
            .and_then(|p| p.file_name())
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "untitled.md".to_string());

        let Some(path) = save_markdown_dialog(initial_dir.as_deref(), Some(&default_name)) else {
            debug!("Save As cancelled");
            return;
        };
        if let Err(e) = self.state.save_as(path) {
            self.state.show_error(format!("Failed to save file:\n{}", e));
        }
    }

    fn handle_copy(&mut self, with_html: bool) {
        self.finish_segmentation();
        let text = self.state.document.text().to_string();
        let result = if with_html {
            copy_markdown_with_html(&text)
        } else {
            copy_text_to_clipboard(&text)
        };
        match result {
            Ok(()) => {
                let time = self.app_time();
                self.state
                    .show_toast("Copied document to clipboard", time, TOAST_DURATION);
            }
            Err(e) => self.state.show_error(e.to_string()),
        }
    }

    fn handle_toggle_sync(&mut self) {
        let enabled = self.synchronizer.toggle();
        self.state
            .update_settings(|s| s.sync_scroll_enabled = enabled);
        let time = self.app_time();
        let message = if enabled {
            "Sync scroll on"
        } else {
            "Sync scroll off"
        };
        self.state.show_toast(message, time, TOAST_DURATION);
    }

    /// Push the current settings into the synchronizer and theme manager.
    fn apply_settings(&mut self) {
        self.synchronizer
            .set_config(self.state.settings.sync_scroll_config());
        self.synchronizer
            .set_enabled(self.state.settings.sync_scroll_enabled);
        self.theme_manager.set_theme(self.state.settings.theme);
    }

    fn handle_action(&mut self, action: AppAction) {
        debug!("Action: {:?}", action);
        match action {
            AppAction::New => self.request(PendingAction::NewDocument),
            AppAction::Open => self.request(PendingAction::OpenDialog),
            AppAction::OpenRecent(path) => self.request(PendingAction::OpenFile(path)),
            AppAction::Save => self.handle_save(),
            AppAction::SaveAs => self.handle_save_as(),
            AppAction::Restore => self.request(PendingAction::Restore),
            AppAction::Reparse => self.state.document.reparse(),
            AppAction::Format => self.state.document.format(),
            AppAction::CopyMarkdown => self.handle_copy(false),
            AppAction::CopyHtml => self.handle_copy(true),
            AppAction::ToggleSync => self.handle_toggle_sync(),
            AppAction::CycleTheme => {
                let theme = self.theme_manager.cycle();
                self.state.update_settings(|s| s.theme = theme);
            }
            AppAction::OpenSettings => self.state.ui.show_settings = true,
            AppAction::Exit => self.request(PendingAction::Exit),
        }
    }

    fn handle_block_action(&mut self, action: BlockAction) {
        let structural = !matches!(action, BlockAction::Edit { .. });
        if self.state.document.apply(action) && structural {
            self.preview_pane.prune_cache(self.state.document.blocks());
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Input
    // ─────────────────────────────────────────────────────────────────────────

    fn keyboard_action(ctx: &egui::Context) -> Option<AppAction> {
        ctx.input(|i| {
            let ctrl = i.modifiers.command;
            let shift = i.modifiers.shift;
            if !ctrl {
                return None;
            }
            let action = if shift && i.key_pressed(egui::Key::S) {
                AppAction::SaveAs
            } else if shift && i.key_pressed(egui::Key::F) {
                AppAction::Format
            } else if shift && i.key_pressed(egui::Key::C) {
                AppAction::CopyMarkdown
            } else if shift && i.key_pressed(egui::Key::Y) {
                AppAction::ToggleSync
            } else if shift && i.key_pressed(egui::Key::T) {
                AppAction::CycleTheme
            } else if !shift && i.key_pressed(egui::Key::S) {
                AppAction::Save
            } else if i.key_pressed(egui::Key::O) {
                AppAction::Open
            } else if i.key_pressed(egui::Key::N) {
                AppAction::New
            } else if i.key_pressed(egui::Key::R) {
                AppAction::Reparse
            } else if i.key_pressed(egui::Key::Comma) {
                AppAction::OpenSettings
            } else {
                return None;
            };
            Some(action)
        })
    }

    fn handle_dropped_files(&mut self, ctx: &egui::Context) {
        let dropped: Vec<PathBuf> = ctx.input(|i| {
            i.raw
                .dropped_files
                .iter()
                .filter_map(|f| f.path.clone())
                .collect()
        });
        if let Some(path) = dropped.into_iter().find(|p| is_markdown_path(p)) {
            info!("Dropped file: {}", path.display());
            self.request(PendingAction::OpenFile(path));
        }
    }

    fn update_window_state(&mut self, ctx: &egui::Context) {
        let (size, maximized) = ctx.input(|i| {
            (
                i.viewport().inner_rect.map(|r| r.size()),
                i.viewport().maximized.unwrap_or(false),
            )
        });
        let Some(size) = size else {
            return;
        };
        let changed = self
            .last_window_size
            .map_or(true, |s| (s - size).length() > 1.0);
        if changed {
            self.last_window_size = Some(size);
            self.state.settings.window_size = WindowSize {
                width: size.x,
                height: size.y,
                maximized,
            };
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Rendering
    // ─────────────────────────────────────────────────────────────────────────

    fn render_menu_bar(&mut self, ctx: &egui::Context) -> Option<AppAction> {
        let mut action = None;
        let segmenting = self.state.document.is_segmenting();
        let sync_enabled = self.synchronizer.is_enabled();
        let recent_files = &self.state.settings.recent_files;

        egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
            egui::menu::bar(ui, |ui| {
                ui.menu_button("File", |ui| {
                    if menu_item(ui, "New", "Ctrl+N") {
                        action = Some(AppAction::New);
                    }
                    if menu_item(ui, "Open…", "Ctrl+O") {
                        action = Some(AppAction::Open);
                    }
                    ui.menu_button("Open Recent", |ui| {
                        if recent_files.is_empty() {
                            ui.label(egui::RichText::new("No recent files").weak());
                        }
                        for path in recent_files {
                            if menu_item(ui, &path.display().to_string(), "") {
                                action = Some(AppAction::OpenRecent(path.clone()));
                            }
                        }
                    });
                    ui.separator();
                    if menu_item(ui, "Save", "Ctrl+S") {
                        action = Some(AppAction::Save);
                    }
                    if menu_item(ui, "Save As…", "Ctrl+Shift+S") {
                        action = Some(AppAction::SaveAs);
                    }
                    if menu_item(ui, "Restore Saved", "") {
                        action = Some(AppAction::Restore);
                    }
                    ui.separator();
                    if menu_item(ui, "Exit", "") {
                        action = Some(AppAction::Exit);
                    }
                });

                ui.menu_button("Edit", |ui| {
                    ui.add_enabled_ui(!segmenting, |ui| {
                        if menu_item(ui, "Re-split Blocks", "Ctrl+R") {
                            action = Some(AppAction::Reparse);
                        }
                        if menu_item(ui, "Format Document", "Ctrl+Shift+F") {
                            action = Some(AppAction::Format);
                        }
                        ui.separator();
                        if menu_item(ui, "Copy Markdown", "Ctrl+Shift+C") {
                            action = Some(AppAction::CopyMarkdown);
                        }
                        if menu_item(ui, "Copy as HTML", "") {
                            action = Some(AppAction::CopyHtml);
                        }
                    });
                });

                ui.menu_button("View", |ui| {
                    let mut sync = sync_enabled;
                    if ui.checkbox(&mut sync, "Sync Scroll").clicked() {
                        action = Some(AppAction::ToggleSync);
                        ui.close_menu();
                    }
                    if menu_item(ui, "Cycle Theme", "Ctrl+Shift+T") {
                        action = Some(AppAction::CycleTheme);
                    }
                    ui.separator();
                    if menu_item(ui, "Settings…", "Ctrl+,") {
                        action = Some(AppAction::OpenSettings);
                    }
                });
            });
        });

        action
    }

    fn render_status_bar(&mut self, ctx: &egui::Context) -> bool {
        let now = Instant::now();
        let info = StatusInfo {
            path: self
                .state
                .document
                .path()
                .map(|p| p.display().to_string()),
            stats: self.state.document.stats(),
            progress: self.segment_progress,
            sync_enabled: self.synchronizer.is_enabled(),
            editor_mode: self.synchronizer.mode(Pane::Editor, now),
            preview_mode: self.synchronizer.mode(Pane::Preview, now),
            visible: self.synchronizer.visible_range(Pane::Editor),
            toast: self.state.ui.toast_message.clone(),
        };
        egui::TopBottomPanel::bottom("status_bar")
            .show(ctx, |ui| show_status_bar(ui, &info))
            .inner
    }

    /// Draw both panes side by side. Returns each pane's list output and any
    /// editor action.
    fn render_panes(
        &mut self,
        ctx: &egui::Context,
    ) -> (VirtualListOutput, VirtualListOutput, Option<BlockAction>) {
        let font_size = self.state.settings.font_size;
        let split_ratio = self.state.settings.split_ratio;
        let editable = !self.state.document.is_segmenting();
        let blocks = self.state.document.blocks();
        let editor_pane = &mut self.editor_pane;
        let preview_pane = &mut self.preview_pane;

        egui::CentralPanel::default()
            .show(ctx, |ui| {
                let size = ui.available_size();
                let editor_width = (size.x * split_ratio).floor();

                ui.horizontal_top(|ui| {
                    let editor = ui
                        .allocate_ui_with_layout(
                            egui::vec2(editor_width, size.y),
                            egui::Layout::top_down(egui::Align::Min),
                            |ui| editor_pane.show(ui, blocks, font_size, editable),
                        )
                        .inner;
                    ui.separator();
                    let preview = ui
                        .allocate_ui_with_layout(
                            ui.available_size(),
                            egui::Layout::top_down(egui::Align::Min),
                            |ui| preview_pane.show(ui, blocks, font_size),
                        )
                        .inner;
                    (editor.list, preview, editor.action)
                })
                .inner
            })
            .inner
    }

    /// Feed pane events to the synchronizer and execute its commands.
    fn sync_scroll(
        &mut self,
        ctx: &egui::Context,
        editor: &VirtualListOutput,
        preview: &VirtualListOutput,
    ) {
        let now = Instant::now();
        for (pane, output) in [(Pane::Editor, editor), (Pane::Preview, preview)] {
            if output.hovered && self.synchronizer.active_pane() != Some(pane) {
                self.synchronizer.pointer_enter(pane);
            }
            if output.range_changed {
                if let Some((first, last)) = output.range {
                    self.synchronizer.range_changed(pane, first, last, now);
                }
            }
        }

        if let Some(command) = self.synchronizer.poll(now) {
            debug!("Sync scroll: {:?}", command);
            let list = match command.pane {
                Pane::Editor => self.editor_pane.list_mut(),
                Pane::Preview => self.preview_pane.list_mut(),
            };
            list.scroll_to_index(command.index, command.align, command.behavior);
            ctx.request_repaint();
        }

        if let Some(deadline) = self.synchronizer.next_deadline() {
            ctx.request_repaint_after(deadline.saturating_duration_since(now));
        }
    }

    fn render_dialogs(&mut self, ctx: &egui::Context) {
        if self.state.ui.show_confirm_dialog {
            let mut choice = None;
            egui::Window::new("Unsaved Changes")
                .collapsible(false)
                .resizable(false)
                .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
                .show(ctx, |ui| {
                    ui.label(&self.state.ui.confirm_dialog_message);
                    ui.separator();
                    ui.horizontal(|ui| {
                        if ui.button("Save").clicked() {
                            choice = Some(ConfirmChoice::Save);
                        }
                        if ui.button("Discard").clicked() {
                            choice = Some(ConfirmChoice::Discard);
                        }
                        if ui.button("Cancel").clicked() {
                            choice = Some(ConfirmChoice::Cancel);
                        }
                    });
                });

            match choice {
                Some(ConfirmChoice::Save) => {
                    let restoring = self.state.ui.pending_action == Some(PendingAction::Restore);
                    self.handle_save();
                    if !self.state.document.is_dirty() && !restoring {
                        if let Some(action) = self.state.confirm_pending_action() {
                            self.run_pending_action(action);
                        }
                    } else {
                        self.state.cancel_pending_action();
                    }
                }
                Some(ConfirmChoice::Discard) => {
                    if let Some(action) = self.state.confirm_pending_action() {
                        self.run_pending_action(action);
                    }
                }
                Some(ConfirmChoice::Cancel) => self.state.cancel_pending_action(),
                None => {}
            }
        }

        if self.state.ui.show_error_modal {
            egui::Window::new("Error")
                .collapsible(false)
                .resizable(false)
                .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
                .show(ctx, |ui| {
                    ui.label(egui::RichText::new("⚠").size(24.0));
                    ui.label(&self.state.ui.error_message);
                    ui.separator();
                    if ui.button("OK").clicked() {
                        self.state.dismiss_error();
                    }
                });
        }

        if self.state.ui.show_settings {
            let is_dark = ctx.style().visuals.dark_mode;
            let mut settings = self.state.settings.clone();
            let output = self.settings_panel.show(ctx, &mut settings, is_dark);

            if output.changed {
                self.state.update_settings(|s| *s = settings);
                self.apply_settings();
            }
            if output.reset_requested {
                let window_size = self.state.settings.window_size;
                let recent_files = self.state.settings.recent_files.clone();
                self.state.update_settings(|s| {
                    *s = Settings {
                        window_size,
                        recent_files,
                        ..Settings::default()
                    }
                });
                self.apply_settings();
                let time = self.app_time();
                self.state
                    .show_toast("Settings reset to defaults", time, TOAST_DURATION);
            }
            if output.close_requested {
                self.state.ui.show_settings = false;
            }
        }
    }
}

/// A menu button with shortcut text; closes the menu when clicked.
fn menu_item(ui: &mut egui::Ui, label: &str, shortcut: &str) -> bool {
    let clicked = ui
        .add(egui::Button::new(label).shortcut_text(shortcut))
        .clicked();
    if clicked {
        ui.close_menu();
    }
    clicked
}

#[derive(Debug, Clone, Copy)]
enum ConfirmChoice {
    Save,
    Discard,
    Cancel,
}

impl eframe::App for BlockdownApp {
    fn update(&mut self, ctx: &egui::Context, frame: &mut eframe::Frame) {
        self.theme_manager
            .apply_if_needed(ctx, system_dark_mode(frame.info().system_theme));

        let time = self.app_time();
        self.state.update_toast(time, TOAST_DURATION);

        let title = self.window_title();
        if title != self.last_title {
            ctx.send_viewport_cmd(egui::ViewportCommand::Title(title.clone()));
            self.last_title = title;
        }

        self.update_window_state(ctx);
        self.handle_dropped_files(ctx);

        if ctx.input(|i| i.viewport().close_requested()) && !self.should_exit {
            self.request(PendingAction::Exit);
            if !self.should_exit {
                ctx.send_viewport_cmd(egui::ViewportCommand::CancelClose);
            }
        }

        self.step_segmentation(ctx);

        let mut actions = Vec::new();
        actions.extend(self.render_menu_bar(ctx));
        if self.render_status_bar(ctx) {
            actions.push(AppAction::ToggleSync);
        }
        let (editor, preview, block_action) = self.render_panes(ctx);
        actions.extend(Self::keyboard_action(ctx));

        if let Some(action) = block_action {
            self.handle_block_action(action);
        }
        self.sync_scroll(ctx, &editor, &preview);

        for action in actions {
            self.handle_action(action);
        }

        self.render_dialogs(ctx);

        if self.state.ui.toast_message.is_some() {
            ctx.request_repaint_after(std::time::Duration::from_millis(250));
        }

        if self.should_exit {
            ctx.send_viewport_cmd(egui::ViewportCommand::Close);
        }
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        info!("Application exiting");
        if self.state.document.is_dirty() {
            warn!("Exiting with unsaved changes");
        }
        self.state.shutdown();
    }

    fn save(&mut self, _storage: &mut dyn eframe::Storage) {
        debug!("Saving application state");
        self.state.save_settings_if_dirty();
    }

    fn auto_save_interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs(30)
    }
}
