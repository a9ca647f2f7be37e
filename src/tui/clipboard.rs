//! Clipboard helper for sharing deep links
//!
//! Uses `arboard` for cross-platform support. The clipboard handle is created
//! per copy so nothing is held between presses.

use anyhow::{Context, Result};
use arboard::Clipboard;

/// Copy text to the system clipboard
///
/// Fails without a display server (headless Linux) or on permission errors.
pub fn copy_to_clipboard(text: &str) -> Result<()> {
    let mut clipboard = Clipboard::new().context("Failed to access clipboard")?;
    clipboard
        .set_text(text)
        .context("Failed to set clipboard text")?;
    tracing::debug!("Copied {} to clipboard", text);
    Ok(())
}
