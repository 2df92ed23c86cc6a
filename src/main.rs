// Hide console window on Windows in release builds
#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

//! blockdown - Main Entry Point
//!
//! A two-pane Markdown editor: the document is split into blocks that are
//! edited on the left and rendered on the right, with synchronized scrolling.

mod app;
mod config;
mod document;
mod error;
mod export;
mod files;
mod markdown;
mod preview;
mod segment;
mod state;
mod theme;
mod ui;

use app::BlockdownApp;
use config::load_config;
use log::info;
use std::path::PathBuf;

/// Application name constant.
const APP_NAME: &str = "blockdown";

fn main() -> eframe::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    info!("Starting {}", APP_NAME);

    // Optional document to open, e.g. `blockdown notes.md`
    let initial_file = std::env::args_os().nth(1).map(PathBuf::from);

    let settings = load_config();
    let window_size = &settings.window_size;
    info!(
        "Window configuration: {}x{}, maximized: {}",
        window_size.width, window_size.height, window_size.maximized
    );

    let viewport = eframe::egui::ViewportBuilder::default()
        .with_title(APP_NAME)
        .with_inner_size([window_size.width, window_size.height])
        .with_min_inner_size([480.0, 320.0])
        .with_maximized(window_size.maximized)
        .with_drag_and_drop(true);

    let native_options = eframe::NativeOptions {
        viewport,
        ..Default::default()
    };

    eframe::run_native(
        APP_NAME,
        native_options,
        Box::new(move |cc| Ok(Box::new(BlockdownApp::new(cc, initial_file)))),
    )
}
