//! Plain text and Markdown

use crate::error::{ExtractError, Result};

pub(super) fn plain(bytes: &[u8]) -> Result<String> {
    utf8(bytes, "text")
}

/// Markdown is passed through untouched
pub(super) fn markdown(bytes: &[u8]) -> Result<String> {
    utf8(bytes, "Markdown")
}

fn utf8(bytes: &[u8], what: &str) -> Result<String> {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
    String::from_utf8(bytes.to_vec()).map_err(|err| {
        ExtractError::DecodeError(format!(
            "{} is not valid UTF-8 (byte {})",
            what,
            err.utf8_error().valid_up_to()
        ))
    })
}
