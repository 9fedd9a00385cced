//! Layout audit artifact.
//!
//! The reconstructed blob is persisted to a UTF-8 text file so a human
//! can audit what the event scanner actually saw.

use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use tracing::info;

use super::LayoutError;

/// Write the layout blob to `path`, creating parent directories as
/// needed. The handle is flushed and closed on every exit path.
pub fn write_layout_artifact(path: &Path, text: &str) -> Result<(), LayoutError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let mut file = File::create(path)?;
    file.write_all(text.as_bytes())?;
    file.flush()?;

    info!(path = %path.display(), bytes = text.len(), "layout artifact written");
    Ok(())
}
