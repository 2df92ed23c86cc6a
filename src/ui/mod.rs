//! UI components for blockdown
//!
//! The two block panes share one virtualized list widget; the app wires
//! their range reports into the scroll synchronizer.

pub mod block_list;
mod editor_pane;
mod preview_pane;
mod settings;
mod status_bar;

pub use block_list::{VirtualList, VirtualListOutput};
pub use editor_pane::{EditorPane, EditorPaneOutput};
pub use preview_pane::PreviewPane;
pub use settings::SettingsPanel;
pub use status_bar::{show_status_bar, StatusInfo};
