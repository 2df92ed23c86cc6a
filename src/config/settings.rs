//! User settings and preferences for blockdown
//!
//! This module defines the `Settings` struct that holds all user-configurable
//! options, with serde support for JSON persistence.

use crate::preview::{ScrollBehavior, SyncScrollConfig};
use crate::segment::DEFAULT_CHUNK_ATOMS;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

// ─────────────────────────────────────────────────────────────────────────────
// Theme Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Available color themes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
    /// Follow the operating system preference
    System,
}

impl Theme {
    pub fn label(&self) -> &'static str {
        match self {
            Theme::Light => "Light",
            Theme::Dark => "Dark",
            Theme::System => "System",
        }
    }

    pub fn all() -> &'static [Theme] {
        &[Theme::Light, Theme::Dark, Theme::System]
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Window Size Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Window dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WindowSize {
    pub width: f32,
    pub height: f32,
    #[serde(default)]
    pub maximized: bool,
}

impl Default for WindowSize {
    fn default() -> Self {
        Self {
            width: 1200.0,
            height: 800.0,
            maximized: false,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Main Settings Struct
// ─────────────────────────────────────────────────────────────────────────────

/// User preferences and application settings.
///
/// This struct is serialized to JSON and persisted to the user's config directory.
/// All fields have defaults via `#[serde(default)]`, so older or partial files
/// still load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // ─────────────────────────────────────────────────────────────────────────
    // Appearance
    // ─────────────────────────────────────────────────────────────────────────
    pub theme: Theme,

    /// Font size for block editors and preview (in points)
    pub font_size: f32,

    /// Width share of the editor pane (0.0 to 1.0)
    pub split_ratio: f32,

    // ─────────────────────────────────────────────────────────────────────────
    // Sync Scrolling
    // ─────────────────────────────────────────────────────────────────────────
    /// Whether the editor and preview panes scroll together
    pub sync_scroll_enabled: bool,

    /// Quiet period before a user scroll is mirrored, in milliseconds
    pub sync_debounce_ms: u64,

    /// Window during which a synced pane's own scrolls are ignored, in milliseconds
    pub sync_guard_ms: u64,

    /// Animate programmatic scrolls instead of jumping
    pub smooth_sync_scroll: bool,

    // ─────────────────────────────────────────────────────────────────────────
    // Documents
    // ─────────────────────────────────────────────────────────────────────────
    /// Atoms placed per frame while segmenting a document
    pub segment_chunk_atoms: usize,

    /// Run the formatter on documents as they are opened
    pub format_on_open: bool,

    // ─────────────────────────────────────────────────────────────────────────
    // Session & History
    // ─────────────────────────────────────────────────────────────────────────
    /// Recently opened files (most recent first)
    pub recent_files: Vec<PathBuf>,

    /// Maximum number of recent files to remember
    pub max_recent_files: usize,

    // ─────────────────────────────────────────────────────────────────────────
    // Window State
    // ─────────────────────────────────────────────────────────────────────────
    pub window_size: WindowSize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            // Appearance
            theme: Theme::default(),
            font_size: 14.0,
            split_ratio: 0.5,

            // Sync Scrolling
            sync_scroll_enabled: true,
            sync_debounce_ms: 50,
            sync_guard_ms: 100,
            smooth_sync_scroll: false,

            // Documents
            segment_chunk_atoms: DEFAULT_CHUNK_ATOMS,
            format_on_open: false,

            // Session & History
            recent_files: Vec::new(),
            max_recent_files: 10,

            // Window State
            window_size: WindowSize::default(),
        }
    }
}

impl Settings {
    /// Add a file to the recent files list.
    ///
    /// If the file already exists in the list, it's moved to the front.
    /// The list is trimmed to `max_recent_files`.
    pub fn add_recent_file(&mut self, path: PathBuf) {
        self.recent_files.retain(|p| p != &path);
        self.recent_files.insert(0, path);
        self.recent_files.truncate(self.max_recent_files);
    }

    /// Synchronizer configuration derived from these settings.
    pub fn sync_scroll_config(&self) -> SyncScrollConfig {
        SyncScrollConfig {
            debounce: Duration::from_millis(self.sync_debounce_ms),
            guard: Duration::from_millis(self.sync_guard_ms),
            behavior: if self.smooth_sync_scroll {
                ScrollBehavior::Smooth
            } else {
                ScrollBehavior::Auto
            },
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Validation Constants and Sanitization
    // ─────────────────────────────────────────────────────────────────────────

    pub const MIN_FONT_SIZE: f32 = 8.0;
    pub const MAX_FONT_SIZE: f32 = 72.0;
    pub const MIN_SPLIT_RATIO: f32 = 0.15;
    pub const MAX_SPLIT_RATIO: f32 = 0.85;
    pub const MAX_SYNC_DELAY_MS: u64 = 2_000;
    pub const MIN_CHUNK_ATOMS: usize = 16;
    pub const MAX_RECENT_FILES: usize = 50;
    pub const MIN_WINDOW_SIZE: f32 = 200.0;
    pub const MAX_WINDOW_SIZE: f32 = 10000.0;

    /// Sanitize settings by clamping values to valid ranges.
    ///
    /// This is useful after loading settings from a file that might have
    /// been manually edited with invalid values.
    pub fn sanitize(&mut self) {
        if !self.font_size.is_finite() {
            self.font_size = Self::default().font_size;
        }
        self.font_size = self
            .font_size
            .clamp(Self::MIN_FONT_SIZE, Self::MAX_FONT_SIZE);

        if !self.split_ratio.is_finite() {
            self.split_ratio = Self::default().split_ratio;
        }
        self.split_ratio = self
            .split_ratio
            .clamp(Self::MIN_SPLIT_RATIO, Self::MAX_SPLIT_RATIO);

        self.sync_debounce_ms = self.sync_debounce_ms.min(Self::MAX_SYNC_DELAY_MS);
        self.sync_guard_ms = self.sync_guard_ms.min(Self::MAX_SYNC_DELAY_MS);
        self.segment_chunk_atoms = self.segment_chunk_atoms.max(Self::MIN_CHUNK_ATOMS);

        self.window_size.width = self
            .window_size
            .width
            .clamp(Self::MIN_WINDOW_SIZE, Self::MAX_WINDOW_SIZE);
        self.window_size.height = self
            .window_size
            .height
            .clamp(Self::MIN_WINDOW_SIZE, Self::MAX_WINDOW_SIZE);

        self.max_recent_files = self.max_recent_files.clamp(1, Self::MAX_RECENT_FILES);
        self.recent_files.truncate(self.max_recent_files);
    }

    /// Parse settings from JSON and sanitize them.
    pub fn from_json_sanitized(json: &str) -> Result<Self, serde_json::Error> {
        let mut settings: Settings = serde_json::from_str(json)?;
        settings.sanitize();
        Ok(settings)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.theme, Theme::Light);
        assert_eq!(settings.font_size, 14.0);
        assert_eq!(settings.split_ratio, 0.5);
        assert!(settings.sync_scroll_enabled);
        assert_eq!(settings.sync_debounce_ms, 50);
        assert_eq!(settings.sync_guard_ms, 100);
        assert!(settings.recent_files.is_empty());
    }

    #[test]
    fn test_add_recent_file() {
        let mut settings = Settings {
            max_recent_files: 2,
            ..Settings::default()
        };
        settings.add_recent_file(PathBuf::from("/a.md"));
        settings.add_recent_file(PathBuf::from("/b.md"));
        settings.add_recent_file(PathBuf::from("/a.md"));
        assert_eq!(
            settings.recent_files,
            vec![PathBuf::from("/a.md"), PathBuf::from("/b.md")]
        );

        settings.add_recent_file(PathBuf::from("/c.md"));
        assert_eq!(settings.recent_files.len(), 2);
        assert_eq!(settings.recent_files[0], PathBuf::from("/c.md"));
    }

    #[test]
    fn test_theme_serialization() {
        assert_eq!(serde_json::to_string(&Theme::Dark).unwrap(), "\"dark\"");
        let theme: Theme = serde_json::from_str("\"system\"").unwrap();
        assert_eq!(theme, Theme::System);
    }

    #[test]
    fn test_settings_serialization_roundtrip() {
        let settings = Settings {
            theme: Theme::Dark,
            smooth_sync_scroll: true,
            ..Settings::default()
        };
        let json = serde_json::to_string(&settings).unwrap();
        let back: Settings = serde_json::from_str(&json).unwrap();
        assert_eq!(settings, back);
    }

    #[test]
    fn test_settings_deserialize_with_defaults() {
        let settings: Settings = serde_json::from_str(r#"{"theme":"dark"}"#).unwrap();
        assert_eq!(settings.theme, Theme::Dark);
        assert_eq!(settings.sync_debounce_ms, 50);
        assert_eq!(settings.window_size, WindowSize::default());
    }

    #[test]
    fn test_settings_deserialize_empty_json() {
        let settings: Settings = serde_json::from_str("{}").unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_sanitize_clamps_values() {
        let mut settings = Settings {
            font_size: 500.0,
            split_ratio: -1.0,
            sync_debounce_ms: 60_000,
            segment_chunk_atoms: 0,
            max_recent_files: 0,
            recent_files: vec![PathBuf::from("/a.md"), PathBuf::from("/b.md")],
            ..Settings::default()
        };
        settings.sanitize();
        assert_eq!(settings.font_size, Settings::MAX_FONT_SIZE);
        assert_eq!(settings.split_ratio, Settings::MIN_SPLIT_RATIO);
        assert_eq!(settings.sync_debounce_ms, Settings::MAX_SYNC_DELAY_MS);
        assert_eq!(settings.segment_chunk_atoms, Settings::MIN_CHUNK_ATOMS);
        assert_eq!(settings.max_recent_files, 1);
        assert_eq!(settings.recent_files.len(), 1);
    }

    #[test]
    fn test_sanitize_non_finite() {
        let mut settings = Settings {
            font_size: f32::NAN,
            split_ratio: f32::INFINITY,
            ..Settings::default()
        };
        settings.sanitize();
        assert_eq!(settings.font_size, 14.0);
        assert_eq!(settings.split_ratio, 0.5);
    }

    #[test]
    fn test_sync_scroll_config() {
        let settings = Settings {
            sync_debounce_ms: 30,
            sync_guard_ms: 80,
            smooth_sync_scroll: true,
            ..Settings::default()
        };
        let config = settings.sync_scroll_config();
        assert_eq!(config.debounce, Duration::from_millis(30));
        assert_eq!(config.guard, Duration::from_millis(80));
        assert_eq!(config.behavior, ScrollBehavior::Smooth);
    }

    #[test]
    fn test_from_json_sanitized() {
        let settings = Settings::from_json_sanitized(r#"{"font_size": 2.0}"#).unwrap();
        assert_eq!(settings.font_size, Settings::MIN_FONT_SIZE);
        assert!(Settings::from_json_sanitized("not json").is_err());
    }
}
