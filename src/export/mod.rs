//! Getting the document out of the app
//!
//! Saving goes through `files`; this module covers the clipboard.

pub mod clipboard;

pub use clipboard::{copy_markdown_with_html, copy_text_to_clipboard};
