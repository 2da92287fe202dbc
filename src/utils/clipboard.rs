//! Cross-platform clipboard utilities.
//!
//! Uses arboard crate for clipboard access.

use arboard::Clipboard;
use tracing::warn;

/// Copy converted UTF-8 text to the clipboard.
///
/// Returns true if successful, false otherwise.
pub fn copy_to_clipboard(text: &str) -> bool {
    // arboard requires a new Clipboard instance for each operation
    match Clipboard::new() {
        Ok(mut clipboard) => match clipboard.set_text(text) {
            Ok(_) => true,
            Err(e) => {
                warn!(error = %e, "failed to set clipboard text");
                false
            }
        },
        Err(e) => {
            warn!(error = %e, "failed to initialize clipboard");
            false
        }
    }
}
