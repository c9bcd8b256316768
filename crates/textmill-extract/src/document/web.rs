//! HTML documents and MIME web archives (MHTML)
//!
//! Both render markup to visible text and then run the boilerplate
//! normalizer over the result.

use crate::error::{ExtractError, Result};
use crate::html::{decode_html, decode_lossy, html_to_text};
use encoding_rs::{Encoding, UTF_8};
use mailparse::ParsedMail;
use textmill_normalize::normalize;
use tracing::debug;

pub(super) fn html_document(bytes: &[u8]) -> String {
    normalize(&html_to_text(&decode_html(bytes)))
}

/// Every `text/plain` and `text/html` leaf part, decoded with its declared
/// charset, in MIME order
pub(super) fn web_archive(bytes: &[u8]) -> Result<String> {
    let mail = mailparse::parse_mail(bytes)
        .map_err(|err| ExtractError::CorruptFile(format!("MIME: {}", err)))?;

    let mut parts = Vec::new();
    collect_parts(&mail, &mut parts);
    if parts.is_empty() {
        return Err(ExtractError::EmptyContent(
            "web archive has no text or HTML parts".to_string(),
        ));
    }
    Ok(normalize(&parts.join("\n")))
}

fn collect_parts(part: &ParsedMail<'_>, out: &mut Vec<String>) {
    if !part.subparts.is_empty() {
        for sub in &part.subparts {
            collect_parts(sub, out);
        }
        return;
    }

    let mimetype = part.ctype.mimetype.as_str();
    if mimetype != "text/plain" && mimetype != "text/html" {
        debug!(mimetype, "skipping non-text web archive part");
        return;
    }

    let raw = match part.get_body_raw() {
        Ok(raw) => raw,
        Err(err) => {
            debug!(error = %err, "undecodable web archive part");
            return;
        }
    };
    let encoding = part
        .ctype
        .params
        .get("charset")
        .and_then(|label| Encoding::for_label(label.trim().as_bytes()))
        .unwrap_or(UTF_8);
    let decoded = decode_lossy(&raw, encoding);

    let text = if mimetype == "text/html" {
        html_to_text(&decoded)
    } else {
        decoded.trim().to_string()
    };
    if !text.is_empty() {
        out.push(text);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ExtractErrorKind;

    const MHTML: &str = "From: <Saved by Blink>\r\n\
Subject: Example\r\n\
MIME-Version: 1.0\r\n\
Content-Type: multipart/related; type=\"text/html\"; boundary=\"----BOUNDARY\"\r\n\
\r\n\
------BOUNDARY\r\n\
Content-Type: text/html; charset=\"windows-1252\"\r\n\
Content-Transfer-Encoding: quoted-printable\r\n\
Content-Location: https://example.com/\r\n\
\r\n\
<html><body><h1>Caf=E9 menu</h1><script>track()</script><p>Soup of the day</p></body></html>\r\n\
------BOUNDARY\r\n\
Content-Type: image/png\r\n\
Content-Transfer-Encoding: base64\r\n\
\r\n\
iVBORw0KGgo=\r\n\
------BOUNDARY\r\n\
Content-Type: text/plain\r\n\
\r\n\
Plain footnote\r\n\
------BOUNDARY--\r\n";

    #[test]
    fn test_web_archive_text_parts() {
        let text = web_archive(MHTML.as_bytes()).unwrap();
        assert_eq!(text, "Caf\u{e9} menu\nSoup of the day\nPlain footnote");
    }

    #[test]
    fn test_web_archive_without_text_parts() {
        let only_image = "MIME-Version: 1.0\r\nContent-Type: image/png\r\n\r\nAAAA\r\n";
        assert_eq!(
            web_archive(only_image.as_bytes()).unwrap_err().kind(),
            ExtractErrorKind::EmptyContent
        );
    }

    #[test]
    fn test_html_document_is_normalized() {
        let html = b"<html><body><p>Story text</p><ul><li>Mail editor@example.com</li></ul><footer>Follow us on Mastodon</footer></body></html>";
        assert_eq!(html_document(html), "Story text\nMail");
    }
}
