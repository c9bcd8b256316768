//! Markup to text rendering shared by HTML documents, web archives and the
//! fetch tiers

use encoding_rs::{Encoding, UTF_8};
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::Html;

/// Elements whose contents are never visible text
const SKIP_TAGS: &[&str] = &["script", "style", "noscript", "template"];

/// Bytes of the document head searched for a charset declaration
const SNIFF_WINDOW: usize = 1024;

static META_CHARSET: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r#"(?i)<meta[^>]+charset\s*=\s*["']?([^"'\s>;]+)"#).ok());

/// Render the visible text of an HTML document.
///
/// Every non-blank text node is trimmed and emitted on its own line, in
/// document order.
pub fn html_to_text(html: &str) -> String {
    let document = Html::parse_document(html);
    let mut lines = Vec::new();

    // Explicit stack: page nesting depth is attacker controlled
    let mut pending = vec![*document.root_element()];
    while let Some(node) = pending.pop() {
        if let Some(element) = node.value().as_element() {
            if !SKIP_TAGS.contains(&element.name()) {
                pending.extend(node.children().rev());
            }
        } else if let Some(text) = node.value().as_text() {
            let text = text.trim();
            if !text.is_empty() {
                lines.push(text.to_string());
            }
        }
    }
    lines.join("\n")
}

/// Encoding declared by a `<meta charset>` or `http-equiv` tag near the top
/// of the document, if any
pub fn sniff_charset(html: &[u8]) -> Option<&'static Encoding> {
    let head = String::from_utf8_lossy(&html[..html.len().min(SNIFF_WINDOW)]);
    let pattern = META_CHARSET.as_ref()?;
    let label = pattern.captures(&head)?.get(1)?.as_str().to_string();
    Encoding::for_label(label.as_bytes())
}

/// Decode HTML bytes using the declared charset, falling back to UTF-8.
/// Undecodable bytes are dropped.
pub fn decode_html(html: &[u8]) -> String {
    decode_lossy(html, sniff_charset(html).unwrap_or(UTF_8))
}

/// Decode with `encoding`, dropping bytes that do not decode
pub(crate) fn decode_lossy(bytes: &[u8], encoding: &'static Encoding) -> String {
    let (decoded, _, had_errors) = encoding.decode(bytes);
    if had_errors {
        decoded.chars().filter(|c| *c != '\u{FFFD}').collect()
    } else {
        decoded.into_owned()
    }
}
