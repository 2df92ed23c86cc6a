//! Theme management for blockdown
//!
//! Resolves the `Theme` setting (Light, Dark or System) to egui `Visuals` and
//! applies them to the context when the setting or the system preference
//! changes.

use crate::config::Theme;
use eframe::egui::{self, Color32, Context, Rounding, Stroke, Visuals};
use log::{debug, info};

// ─────────────────────────────────────────────────────────────────────────────
// Visuals
// ─────────────────────────────────────────────────────────────────────────────

/// Light visuals with a slightly tinted block background.
pub fn create_light_visuals() -> Visuals {
    let mut visuals = Visuals::light();
    visuals.panel_fill = Color32::from_rgb(250, 250, 250);
    visuals.window_fill = Color32::from_rgb(250, 250, 250);
    visuals.faint_bg_color = Color32::from_rgb(242, 243, 245);
    visuals.code_bg_color = Color32::from_rgb(236, 238, 241);
    visuals.selection.bg_fill = Color32::from_rgb(200, 220, 250);
    visuals.selection.stroke = Stroke::new(1.0, Color32::from_rgb(40, 100, 200));
    visuals.hyperlink_color = Color32::from_rgb(30, 100, 200);
    visuals.widgets.noninteractive.bg_stroke = Stroke::new(1.0, Color32::from_rgb(220, 222, 226));
    visuals.widgets.noninteractive.rounding = Rounding::same(4.0);
    visuals
}

/// Dark visuals matching the light palette's structure.
pub fn create_dark_visuals() -> Visuals {
    let mut visuals = Visuals::dark();
    visuals.panel_fill = Color32::from_rgb(30, 30, 30);
    visuals.window_fill = Color32::from_rgb(30, 30, 30);
    visuals.faint_bg_color = Color32::from_rgb(38, 39, 42);
    visuals.code_bg_color = Color32::from_rgb(45, 46, 50);
    visuals.selection.bg_fill = Color32::from_rgb(50, 80, 130);
    visuals.selection.stroke = Stroke::new(1.0, Color32::from_rgb(100, 160, 240));
    visuals.hyperlink_color = Color32::from_rgb(100, 160, 240);
    visuals.widgets.noninteractive.bg_stroke = Stroke::new(1.0, Color32::from_rgb(60, 62, 66));
    visuals.widgets.noninteractive.rounding = Rounding::same(4.0);
    visuals
}

// ─────────────────────────────────────────────────────────────────────────────
// Theme Manager
// ─────────────────────────────────────────────────────────────────────────────

/// Tracks the theme setting and applies it to the egui context.
#[derive(Debug, Clone)]
pub struct ThemeManager {
    current_theme: Theme,
    needs_apply: bool,
    /// Last system preference seen while following the system theme
    last_system_dark: Option<bool>,
}

impl Default for ThemeManager {
    fn default() -> Self {
        Self::new(Theme::default())
    }
}

impl ThemeManager {
    pub fn new(theme: Theme) -> Self {
        info!("ThemeManager initialized with theme: {:?}", theme);
        Self {
            current_theme: theme,
            needs_apply: true,
            last_system_dark: None,
        }
    }

    pub fn current_theme(&self) -> Theme {
        self.current_theme
    }

    /// Set the theme; it is applied on the next `apply_if_needed`.
    pub fn set_theme(&mut self, theme: Theme) {
        if self.current_theme != theme {
            info!("Theme changed from {:?} to {:?}", self.current_theme, theme);
            self.current_theme = theme;
            self.needs_apply = true;
        }
    }

    /// Cycle between Light and Dark (System goes to Light).
    pub fn cycle(&mut self) -> Theme {
        let new_theme = match self.current_theme {
            Theme::Light => Theme::Dark,
            Theme::Dark | Theme::System => Theme::Light,
        };
        self.set_theme(new_theme);
        new_theme
    }

    pub fn needs_apply(&self) -> bool {
        self.needs_apply
    }

    /// Whether the effective theme is dark. `system_dark` is the OS
    /// preference if known.
    pub fn is_dark(&self, system_dark: Option<bool>) -> bool {
        match self.current_theme {
            Theme::Light => false,
            Theme::Dark => true,
            Theme::System => system_dark.unwrap_or(false),
        }
    }

    /// Apply the theme if it changed, or if the system preference changed
    /// while following it. Returns `true` if visuals were set.
    pub fn apply_if_needed(&mut self, ctx: &Context, system_dark: Option<bool>) -> bool {
        if self.current_theme == Theme::System && self.last_system_dark != system_dark {
            self.last_system_dark = system_dark;
            self.needs_apply = true;
            debug!("System dark mode is now {:?}", system_dark);
        }

        if !self.needs_apply {
            return false;
        }

        let visuals = if self.is_dark(system_dark) {
            create_dark_visuals()
        } else {
            create_light_visuals()
        };
        ctx.set_visuals(visuals);
        self.needs_apply = false;
        debug!("Applied theme: {:?}", self.current_theme);
        true
    }
}

/// Map eframe's detected system theme to a dark-mode flag.
pub fn system_dark_mode(theme: Option<eframe::Theme>) -> Option<bool> {
    theme.map(|t| t == eframe::Theme::Dark)
}

/// Faint frame used around each block in both panes.
pub fn block_frame(visuals: &Visuals, highlighted: bool) -> egui::Frame {
    let stroke = if highlighted {
        visuals.selection.stroke
    } else {
        visuals.widgets.noninteractive.bg_stroke
    };
    egui::Frame::none()
        .fill(visuals.faint_bg_color)
        .stroke(stroke)
        .rounding(Rounding::same(4.0))
        .inner_margin(egui::Margin::symmetric(8.0, 6.0))
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
