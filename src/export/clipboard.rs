//! Clipboard operations
//!
//! Copies the reconciled markdown to the system clipboard using arboard.

use crate::error::Result;
use crate::markdown::render_html;
use arboard::Clipboard;
use log::info;

/// Copy plain text to the clipboard.
///
/// Fails with `Error::Clipboard` when no clipboard is available, which is
/// common in headless sessions.
pub fn copy_text_to_clipboard(text: &str) -> Result<()> {
    let mut clipboard = Clipboard::new()?;
    clipboard.set_text(text)?;
    info!("Copied {} characters to the clipboard", text.chars().count());
    Ok(())
}

/// Copy markdown with an HTML rendering for rich paste targets.
pub fn copy_markdown_with_html(markdown: &str) -> Result<()> {
    let html = render_html(markdown);
    let mut clipboard = Clipboard::new()?;
    clipboard.set_html(html.as_str(), Some(markdown))?;
    info!("Copied document as HTML and markdown");
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::error::Error;

    #[test]
    fn test_clipboard_error_conversion() {
        let err: Error = arboard::Error::ContentNotAvailable.into();
        assert!(matches!(err, Error::Clipboard(_)));
        assert!(err.to_string().starts_with("Clipboard error"));
    }

    // Writing to the real clipboard needs a display, which CI does not have.
}
