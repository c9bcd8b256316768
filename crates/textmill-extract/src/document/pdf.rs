//! PDF text extraction

use crate::error::Result;
use lopdf::Document;
use tracing::debug;

/// Page texts in page-number order, one per line. Pages that fail to decode
/// contribute an empty string; only an unopenable file is an error.
pub(super) fn extract(bytes: &[u8]) -> Result<String> {
    let doc = Document::load_mem(bytes)?;
    let pages = doc.get_pages();

    let texts: Vec<String> = pages
        .keys()
        .map(|&page_num| match doc.extract_text(&[page_num]) {
            Ok(text) => text.trim().to_string(),
            Err(err) => {
                debug!(page = page_num, error = %err, "unreadable PDF page");
                String::new()
            }
        })
        .collect();

    Ok(texts.join("\n"))
}
