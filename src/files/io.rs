//! Reading and writing document files

use crate::error::{Error, Result};
use log::{debug, info};
use std::fs;
use std::path::Path;

/// Read a document as UTF-8 text.
pub fn read_document(path: &Path) -> Result<String> {
    debug!("Reading document: {}", path.display());
    let bytes = fs::read(path).map_err(|source| Error::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    // Invalid UTF-8 is replaced rather than rejected
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Write `text` to `path`, replacing any existing file.
pub fn write_document(path: &Path, text: &str) -> Result<()> {
    fs::write(path, text).map_err(|source| Error::FileWrite {
        path: path.to_path_buf(),
        source,
    })?;
    info!("Saved {} ({} bytes)", path.display(), text.len());
    Ok(())
}
