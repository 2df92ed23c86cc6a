//! Markdown parsing and formatting
//!
//! Parsing is delegated to comrak; this module exposes a small, closed AST
//! (`MdNode`) that the block segmenter and the preview pane consume, plus the
//! whole-document formatter used by the "Format" action.

pub mod format;
mod parser;

pub use format::format_markdown;
pub use parser::{
    parse_markdown, parse_markdown_with_options, render_html, LineSpan, ListType, MarkdownOptions,
    MdNode, NodeKind,
};
