//! Application state management for blockdown
//!
//! `DocumentState` owns the open document: its path, the block store and any
//! segmentation still in progress. `AppState` adds settings and UI flags on
//! top.

use crate::config::{load_config, save_config_silent, Settings};
use crate::document::{Block, BlockAction, BlockId, BlockKind, BlockStore, DocumentStats};
use crate::error::{Error, Result};
use crate::files::{read_document, write_document};
use crate::markdown::format_markdown;
use crate::segment::{SegmentJob, SegmentProgress};
use log::{debug, info, warn};
use std::path::{Path, PathBuf};

// ─────────────────────────────────────────────────────────────────────────────
// Document State
// ─────────────────────────────────────────────────────────────────────────────

/// What to do with blocks once a segmentation finishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SegmentTarget {
    /// Fresh document: load and clear dirty
    Load,
    /// Same document re-split: replace, dirty if the text changed
    Replace,
}

#[derive(Debug)]
struct PendingSegment {
    job: SegmentJob,
    target: SegmentTarget,
}

/// Progress of the document's background segmentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentStatus {
    Idle,
    Pending { processed: usize, total: usize },
    /// A segmentation finished during this step; the blocks changed
    Finished,
}

/// The open document.
#[derive(Debug)]
pub struct DocumentState {
    path: Option<PathBuf>,
    store: BlockStore,
    /// Text last loaded from or written to disk, for `restore`
    baseline: String,
    pending: Option<PendingSegment>,
    stats: DocumentStats,
    stats_version: Option<u64>,
}

impl Default for DocumentState {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentState {
    /// An untitled document with a single empty block.
    pub fn new() -> Self {
        Self {
            path: None,
            store: BlockStore::from_blocks(vec![empty_block()]),
            baseline: String::new(),
            pending: None,
            stats: DocumentStats::default(),
            stats_version: None,
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn store(&self) -> &BlockStore {
        &self.store
    }

    pub fn blocks(&self) -> &[Block] {
        self.store.blocks()
    }

    /// Reconciled document text.
    pub fn text(&self) -> &str {
        self.store.text()
    }

    pub fn is_dirty(&self) -> bool {
        self.store.is_dirty()
    }

    pub fn is_segmenting(&self) -> bool {
        self.pending.is_some()
    }

    /// File name with a `*` when modified.
    pub fn title(&self) -> String {
        let name = self
            .path
            .as_ref()
            .and_then(|p| p.file_name())
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "Untitled".to_string());
        if self.is_dirty() {
            format!("{}*", name)
        } else {
            name
        }
    }

    /// Statistics of the reconciled text, recomputed after changes.
    pub fn stats(&mut self) -> DocumentStats {
        if self.stats_version != Some(self.store.version()) {
            self.stats = DocumentStats::compute(self.store.text(), self.store.len());
            self.stats_version = Some(self.store.version());
        }
        self.stats
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Loading
    // ─────────────────────────────────────────────────────────────────────────

    /// Start segmenting `text` as a freshly opened document.
    pub fn open_text(&mut self, path: Option<PathBuf>, text: &str, format: bool) {
        let text = if format {
            format_markdown(text)
        } else {
            text.to_string()
        };
        self.path = path;
        self.start(&text, SegmentTarget::Load);
        self.baseline = text;
    }

    /// Read `path` and start segmenting it.
    pub fn open_file(&mut self, path: &Path, format: bool) -> Result<()> {
        let text = read_document(path)?;
        info!("Opened {} ({} bytes)", path.display(), text.len());
        self.open_text(Some(path.to_path_buf()), &text, format);
        Ok(())
    }

    /// Discard edits and re-segment the text last loaded or saved.
    pub fn restore(&mut self) {
        let baseline = std::mem::take(&mut self.baseline);
        self.start(&baseline, SegmentTarget::Load);
        self.baseline = baseline;
        info!("Restored document to its last saved state");
    }

    /// Re-segment the current reconciled text, e.g. after many merges.
    pub fn reparse(&mut self) {
        let text = self.store.text().to_string();
        self.start(&text, SegmentTarget::Replace);
    }

    /// Format the current text and re-segment the result.
    pub fn format(&mut self) {
        let formatted = format_markdown(self.store.text());
        self.start(&formatted, SegmentTarget::Replace);
    }

    fn start(&mut self, text: &str, target: SegmentTarget) {
        if self.pending.is_some() {
            debug!("Replacing an unfinished segmentation");
        }
        self.pending = Some(PendingSegment {
            job: SegmentJob::new(text),
            target,
        });
    }

    /// Advance the pending segmentation by up to `chunk` atoms.
    pub fn step_segmentation(&mut self, chunk: usize) -> SegmentStatus {
        let Some(pending) = self.pending.as_mut() else {
            return SegmentStatus::Idle;
        };

        match pending.job.step(chunk) {
            SegmentProgress::Pending { processed, total } => {
                SegmentStatus::Pending { processed, total }
            }
            SegmentProgress::Done(blocks) => {
                let target = pending.target;
                self.pending = None;
                self.apply_segmented(blocks, target);
                SegmentStatus::Finished
            }
        }
    }

    /// Run any pending segmentation to completion.
    pub fn finish_segmentation(&mut self) -> bool {
        let mut finished = false;
        while self.pending.is_some() {
            finished |= self.step_segmentation(usize::MAX) == SegmentStatus::Finished;
        }
        finished
    }

    fn apply_segmented(&mut self, mut blocks: Vec<Block>, target: SegmentTarget) {
        if blocks.is_empty() {
            blocks.push(empty_block());
        }
        debug!("Segmentation finished with {} blocks", blocks.len());
        match target {
            SegmentTarget::Load => self.store.load(blocks),
            SegmentTarget::Replace => self.store.replace(blocks),
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Editing
    // ─────────────────────────────────────────────────────────────────────────

    /// Apply an editor action. Ignored while a segmentation is pending,
    /// since its result would overwrite the edit.
    pub fn apply(&mut self, action: BlockAction) -> bool {
        if self.pending.is_some() {
            debug!("Ignoring {:?} during segmentation", action);
            return false;
        }
        self.store.apply(action)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Saving
    // ─────────────────────────────────────────────────────────────────────────

    /// Write the reconciled text to the document's path.
    pub fn save(&mut self) -> Result<PathBuf> {
        let path = self.path.clone().ok_or_else(|| {
            Error::Application("No file path set. Use 'Save As' instead.".to_string())
        })?;
        self.write_to(&path)?;
        Ok(path)
    }

    /// Write the reconciled text to `path` and adopt it as the document path.
    pub fn save_as(&mut self, path: PathBuf) -> Result<()> {
        self.write_to(&path)?;
        self.path = Some(path);
        Ok(())
    }

    fn write_to(&mut self, path: &Path) -> Result<()> {
        self.finish_segmentation();
        write_document(path, self.store.text())?;
        self.store.mark_saved();
        self.baseline = self.store.text().to_string();
        Ok(())
    }
}

fn empty_block() -> Block {
    Block::new(BlockId::for_position(0, 1), "", 1, 1, BlockKind::Line)
}

// ─────────────────────────────────────────────────────────────────────────────
// UI State
// ─────────────────────────────────────────────────────────────────────────────

/// UI-related state flags.
#[derive(Debug, Clone, Default)]
pub struct UiState {
    /// Whether a confirmation dialog is open (e.g., unsaved changes)
    pub show_confirm_dialog: bool,
    pub confirm_dialog_message: String,
    /// Action to run once the user confirms
    pub pending_action: Option<PendingAction>,
    pub show_error_modal: bool,
    pub error_message: String,
    /// Temporary message shown in the status bar
    pub toast_message: Option<String>,
    /// When the toast expires (seconds since app start)
    pub toast_expires_at: Option<f64>,
    pub show_settings: bool,
}

/// Actions that discard unsaved edits and therefore need confirmation.
#[derive(Debug, Clone, PartialEq)]
pub enum PendingAction {
    NewDocument,
    /// Show the open dialog
    OpenDialog,
    OpenFile(PathBuf),
    Restore,
    Exit,
}

// ─────────────────────────────────────────────────────────────────────────────
// Application State
// ─────────────────────────────────────────────────────────────────────────────

/// Central application state.
#[derive(Debug)]
pub struct AppState {
    pub document: DocumentState,
    pub settings: Settings,
    pub ui: UiState,
    settings_dirty: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

impl AppState {
    /// Create state with settings loaded from the config file.
    pub fn new() -> Self {
        let settings = load_config();
        debug!("Theme: {:?}, font size: {}", settings.theme, settings.font_size);
        Self::with_settings(settings)
    }

    /// Create state with the given settings (useful for testing).
    pub fn with_settings(settings: Settings) -> Self {
        Self {
            document: DocumentState::new(),
            settings,
            ui: UiState::default(),
            settings_dirty: false,
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // File Operations
    // ─────────────────────────────────────────────────────────────────────────

    pub fn new_document(&mut self) {
        self.document = DocumentState::new();
        info!("Created new document");
    }

    /// Open `path`, recording it in the recent files list.
    pub fn open_file(&mut self, path: PathBuf) -> Result<()> {
        self.document
            .open_file(&path, self.settings.format_on_open)?;
        self.settings.add_recent_file(path);
        self.settings_dirty = true;
        Ok(())
    }

    /// Save to the current path.
    pub fn save(&mut self) -> Result<()> {
        let path = self.document.save()?;
        self.show_status(format!("Saved {}", path.display()));
        Ok(())
    }

    /// Save to a new path, recording it in the recent files list.
    pub fn save_as(&mut self, path: PathBuf) -> Result<()> {
        self.document.save_as(path.clone())?;
        self.settings.add_recent_file(path.clone());
        self.settings_dirty = true;
        self.show_status(format!("Saved {}", path.display()));
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Confirmation Flow
    // ─────────────────────────────────────────────────────────────────────────

    /// Ask to run `action`.
    ///
    /// Returns the action when it can run right away; otherwise opens the
    /// unsaved-changes confirmation and returns `None`.
    pub fn request(&mut self, action: PendingAction) -> Option<PendingAction> {
        if !self.document.is_dirty() {
            return Some(action);
        }
        self.ui.confirm_dialog_message = match action {
            PendingAction::Exit => "You have unsaved changes. Exit anyway?",
            PendingAction::Restore => "Discard all edits since the last save?",
            _ => "You have unsaved changes. Discard them?",
        }
        .to_string();
        self.ui.pending_action = Some(action);
        self.ui.show_confirm_dialog = true;
        None
    }

    /// The user confirmed; hand back the action to run.
    pub fn confirm_pending_action(&mut self) -> Option<PendingAction> {
        self.ui.show_confirm_dialog = false;
        self.ui.confirm_dialog_message.clear();
        self.ui.pending_action.take()
    }

    pub fn cancel_pending_action(&mut self) {
        self.ui.pending_action = None;
        self.ui.show_confirm_dialog = false;
        self.ui.confirm_dialog_message.clear();
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Settings Management
    // ─────────────────────────────────────────────────────────────────────────

    /// Update settings and mark as dirty.
    pub fn update_settings<F>(&mut self, f: F)
    where
        F: FnOnce(&mut Settings),
    {
        f(&mut self.settings);
        self.settings.sanitize();
        self.settings_dirty = true;
    }

    pub fn is_settings_dirty(&self) -> bool {
        self.settings_dirty
    }

    /// Save settings to the config file if modified.
    pub fn save_settings_if_dirty(&mut self) -> bool {
        if !self.settings_dirty {
            return false;
        }
        if save_config_silent(&self.settings) {
            self.settings_dirty = false;
            return true;
        }
        warn!("Failed to save settings");
        false
    }

    /// Prepare state for application shutdown.
    pub fn shutdown(&mut self) {
        self.settings_dirty = true;
        self.save_settings_if_dirty();
        info!("AppState shutdown complete");
    }

    // ─────────────────────────────────────────────────────────────────────────
    // UI State Helpers
    // ─────────────────────────────────────────────────────────────────────────

    /// Show an error in a modal dialog.
    pub fn show_error(&mut self, message: impl Into<String>) {
        let message = message.into();
        warn!("{}", message);
        self.ui.error_message = message;
        self.ui.show_error_modal = true;
    }

    pub fn dismiss_error(&mut self) {
        self.ui.show_error_modal = false;
        self.ui.error_message.clear();
    }

    /// Queue a status message; its expiry is set on the next `update_toast`.
    pub fn show_status(&mut self, message: impl Into<String>) {
        self.ui.toast_message = Some(message.into());
        self.ui.toast_expires_at = None;
    }

    /// Show a temporary toast message until `current_time + duration`.
    pub fn show_toast(&mut self, message: impl Into<String>, current_time: f64, duration: f64) {
        self.ui.toast_message = Some(message.into());
        self.ui.toast_expires_at = Some(current_time + duration);
    }

    /// Clear an expired toast. Call each frame with the current time.
    pub fn update_toast(&mut self, current_time: f64, duration: f64) {
        if self.ui.toast_message.is_none() {
            return;
        }
        match self.ui.toast_expires_at {
            None => self.ui.toast_expires_at = Some(current_time + duration),
            Some(expires_at) if current_time >= expires_at => {
                self.ui.toast_message = None;
                self.ui.toast_expires_at = None;
            }
            Some(_) => {}
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
