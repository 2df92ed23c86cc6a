//! File operations for blockdown
//!
//! Native dialogs plus plain read/write helpers for markdown documents.

pub mod dialogs;
mod io;

pub use io::{read_document, write_document};
