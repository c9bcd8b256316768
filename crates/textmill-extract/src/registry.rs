//! Content-type to extractor lookup
//!
//! The table is built once and never mutated. [`FormatRegistry::global`]
//! hands out one shared instance; embedders can build their own with
//! [`FormatRegistry::standard`] and inject it.

use crate::archive::ArchiveKind;
use crate::document::DocumentFormat;
use crate::error::{ExtractError, Result};
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::sync::Arc;

pub const PDF: &str = "application/pdf";
pub const PLAIN_TEXT: &str = "text/plain";
pub const MSWORD: &str = "application/msword";
pub const DOCX: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.document";
pub const ODT: &str = "application/vnd.oasis.opendocument.text";
pub const XLS: &str = "application/vnd.ms-excel";
pub const XLSX: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";
pub const ODS: &str = "application/vnd.oasis.opendocument.spreadsheet";
pub const PPT: &str = "application/vnd.ms-powerpoint";
pub const PPTX: &str = "application/vnd.openxmlformats-officedocument.presentationml.presentation";
pub const ODP: &str = "application/vnd.oasis.opendocument.presentation";
pub const ZIP: &str = "application/zip";
pub const RAR: &str = "application/x-rar-compressed";
pub const SEVEN_ZIP: &str = "application/x-7z-compressed";
pub const TAR: &str = "application/x-tar";
pub const GZIP: &str = "application/gzip";
pub const BZIP2: &str = "application/x-bzip2";
pub const MARKDOWN: &str = "text/markdown";
pub const MHTML: &str = "application/x-mimearchive";
pub const HTML: &str = "text/html";
pub const OCTET_STREAM: &str = "application/octet-stream";

const ENTRIES: &[(&str, Handler)] = &[
    (PDF, Handler::Document(DocumentFormat::Pdf)),
    (PLAIN_TEXT, Handler::Document(DocumentFormat::PlainText)),
    (MSWORD, Handler::Document(DocumentFormat::LegacyWord)),
    (DOCX, Handler::Document(DocumentFormat::Docx)),
    (ODT, Handler::Document(DocumentFormat::Odt)),
    (XLS, Handler::Document(DocumentFormat::Spreadsheet)),
    (XLSX, Handler::Document(DocumentFormat::Spreadsheet)),
    (ODS, Handler::Document(DocumentFormat::Spreadsheet)),
    (PPT, Handler::Document(DocumentFormat::LegacyPresentation)),
    (PPTX, Handler::Document(DocumentFormat::Pptx)),
    (ODP, Handler::Document(DocumentFormat::Odp)),
    (ZIP, Handler::Archive(ArchiveKind::Zip)),
    (RAR, Handler::Archive(ArchiveKind::Rar)),
    ("application/vnd.rar", Handler::Archive(ArchiveKind::Rar)),
    (SEVEN_ZIP, Handler::Archive(ArchiveKind::SevenZip)),
    (TAR, Handler::Archive(ArchiveKind::Tar)),
    (GZIP, Handler::Archive(ArchiveKind::Tar)),
    ("application/x-gzip", Handler::Archive(ArchiveKind::Tar)),
    (BZIP2, Handler::Archive(ArchiveKind::Tar)),
    (MARKDOWN, Handler::Document(DocumentFormat::Markdown)),
    (MHTML, Handler::Document(DocumentFormat::WebArchive)),
    ("multipart/related", Handler::Document(DocumentFormat::WebArchive)),
    ("message/rfc822", Handler::Document(DocumentFormat::WebArchive)),
    (HTML, Handler::Document(DocumentFormat::Html)),
];

const EXTENSIONS: &[(&str, &str)] = &[
    ("pdf", PDF),
    ("txt", PLAIN_TEXT),
    ("doc", MSWORD),
    ("docx", DOCX),
    ("odt", ODT),
    ("xls", XLS),
    ("xlsx", XLSX),
    ("ods", ODS),
    ("ppt", PPT),
    ("pptx", PPTX),
    ("odp", ODP),
    ("zip", ZIP),
    ("rar", RAR),
    ("7z", SEVEN_ZIP),
    ("tar", TAR),
    ("gz", GZIP),
    ("tgz", GZIP),
    ("bz2", BZIP2),
    ("md", MARKDOWN),
    ("markdown", MARKDOWN),
    ("mht", MHTML),
    ("mhtml", MHTML),
    ("html", HTML),
    ("htm", HTML),
];

static GLOBAL: Lazy<Arc<FormatRegistry>> = Lazy::new(|| Arc::new(FormatRegistry::standard()));

/// What a content type dispatches to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Handler {
    Document(DocumentFormat),
    Archive(ArchiveKind),
}

/// Immutable map from content type to [`Handler`]
#[derive(Debug, Clone)]
pub struct FormatRegistry {
    handlers: HashMap<&'static str, Handler>,
}

impl Default for FormatRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

impl FormatRegistry {
    /// The full table of supported formats
    pub fn standard() -> Self {
        Self {
            handlers: ENTRIES.iter().copied().collect(),
        }
    }

    /// Process-wide shared instance of [`FormatRegistry::standard`]
    pub fn global() -> Arc<FormatRegistry> {
        Arc::clone(&GLOBAL)
    }

    /// Look up the handler for `content_type`.
    ///
    /// Matching ignores case and any `;`-separated parameters. Unknown types
    /// fail with [`ExtractError::UnsupportedFormat`] carrying the identifier
    /// as given.
    pub fn resolve(&self, content_type: &str) -> Result<Handler> {
        let essence = essence(content_type);
        self.handlers
            .get(essence.as_str())
            .copied()
            .ok_or_else(|| ExtractError::unsupported(content_type))
    }

    /// Whether `content_type` resolves to a handler
    pub fn supports(&self, content_type: &str) -> bool {
        self.resolve(content_type).is_ok()
    }

    /// Registered content types, sorted
    pub fn content_types(&self) -> Vec<&'static str> {
        let mut types: Vec<_> = self.handlers.keys().copied().collect();
        types.sort_unstable();
        types
    }
}

/// `Text/HTML; charset=UTF-8` becomes `text/html`
fn essence(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

/// Infer a content type from a file name's extension
pub fn content_type_for_name(name: &str) -> &'static str {
    let Some((_, ext)) = name.rsplit_once('.') else {
        return OCTET_STREAM;
    };
    if ext.contains('/') {
        return OCTET_STREAM;
    }
    let ext = ext.to_ascii_lowercase();
    EXTENSIONS
        .iter()
        .find(|(known, _)| *known == ext)
        .map(|(_, content_type)| *content_type)
        .unwrap_or(OCTET_STREAM)
}
