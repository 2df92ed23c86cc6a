//! Native file dialogs using the rfd crate

use rfd::FileDialog;
use std::path::{Path, PathBuf};

/// Extensions offered in the markdown filter.
const MARKDOWN_EXTENSIONS: &[&str] = &["md", "markdown", "mdown", "mkd", "mkdn"];

/// Opens a native picker for one markdown document.
///
/// Returns `None` if the dialog was cancelled.
pub fn open_markdown_dialog(initial_dir: Option<&Path>) -> Option<PathBuf> {
    let mut dialog = FileDialog::new()
        .set_title("Open Markdown Document")
        .add_filter("Markdown Files", MARKDOWN_EXTENSIONS)
        .add_filter("All Files", &["*"]);

    if let Some(dir) = initial_dir {
        dialog = dialog.set_directory(dir);
    }

    dialog.pick_file()
}

/// Opens a native save dialog for a markdown document.
///
/// Returns `None` if the dialog was cancelled.
pub fn save_markdown_dialog(
    initial_dir: Option<&Path>,
    default_name: Option<&str>,
) -> Option<PathBuf> {
    let mut dialog = FileDialog::new()
        .set_title("Save Markdown Document")
        .add_filter("Markdown Files", MARKDOWN_EXTENSIONS);

    if let Some(dir) = initial_dir {
        dialog = dialog.set_directory(dir);
    }

    if let Some(name) = default_name {
        dialog = dialog.set_file_name(name);
    }

    dialog.save_file().map(with_markdown_extension)
}

/// Append `.md` when the chosen name has no extension.
pub fn with_markdown_extension(path: PathBuf) -> PathBuf {
    if path.extension().is_some() {
        path
    } else {
        path.with_extension("md")
    }
}

/// Whether `path` looks like a markdown document.
pub fn is_markdown_path(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            MARKDOWN_EXTENSIONS
                .iter()
                .any(|known| known.eq_ignore_ascii_case(ext))
        })
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_markdown_extension() {
        assert_eq!(
            with_markdown_extension(PathBuf::from("/tmp/notes")),
            PathBuf::from("/tmp/notes.md")
        );
        assert_eq!(
            with_markdown_extension(PathBuf::from("/tmp/notes.markdown")),
            PathBuf::from("/tmp/notes.markdown")
        );
    }

    #[test]
    fn test_is_markdown_path() {
        assert!(is_markdown_path(Path::new("a.md")));
        assert!(is_markdown_path(Path::new("b.MARKDOWN")));
        assert!(!is_markdown_path(Path::new("c.txt")));
        assert!(!is_markdown_path(Path::new("README")));
    }
}
