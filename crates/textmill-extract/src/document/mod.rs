//! Single-file document extractors
//!
//! Each format is a pure function from bytes to text. [`DocumentFormat`] is
//! the closed set of formats the registry can dispatch to.

mod office;
mod pdf;
mod spreadsheet;
mod text;
mod web;

use crate::error::{ExtractError, Result};

/// A document format with a registered extractor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentFormat {
    Pdf,
    PlainText,
    /// Binary `.doc`, always rejected
    LegacyWord,
    Docx,
    Odt,
    /// xls, xlsx and ods
    Spreadsheet,
    /// Binary `.ppt`, always rejected
    LegacyPresentation,
    Pptx,
    Odp,
    Markdown,
    /// MHTML and other MIME-packaged pages
    WebArchive,
    Html,
}

impl DocumentFormat {
    /// Extract text from `bytes`. A successful result is never blank.
    pub fn extract(&self, bytes: &[u8]) -> Result<String> {
        let text = match self {
            DocumentFormat::Pdf => pdf::extract(bytes)?,
            DocumentFormat::PlainText => text::plain(bytes)?,
            DocumentFormat::Markdown => text::markdown(bytes)?,
            DocumentFormat::LegacyWord => {
                return Err(ExtractError::LegacyFormatUnsupported {
                    format: "Word (.doc)",
                    remediation: "please convert the document to .docx",
                })
            }
            DocumentFormat::LegacyPresentation => {
                return Err(ExtractError::LegacyFormatUnsupported {
                    format: "PowerPoint (.ppt)",
                    remediation: "please convert the presentation to .pptx",
                })
            }
            DocumentFormat::Docx => office::docx(bytes)?,
            DocumentFormat::Odt => office::odt(bytes)?,
            DocumentFormat::Pptx => office::pptx(bytes)?,
            DocumentFormat::Odp => office::odp(bytes)?,
            DocumentFormat::Spreadsheet => spreadsheet::extract(bytes)?,
            DocumentFormat::WebArchive => web::web_archive(bytes)?,
            DocumentFormat::Html => web::html_document(bytes),
        };
        ensure_text(text, self.label())
    }

    /// Short human-readable name
    pub fn label(&self) -> &'static str {
        match self {
            DocumentFormat::Pdf => "PDF",
            DocumentFormat::PlainText => "plain text",
            DocumentFormat::LegacyWord => "legacy Word",
            DocumentFormat::Docx => "DOCX",
            DocumentFormat::Odt => "ODT",
            DocumentFormat::Spreadsheet => "spreadsheet",
            DocumentFormat::LegacyPresentation => "legacy PowerPoint",
            DocumentFormat::Pptx => "PPTX",
            DocumentFormat::Odp => "ODP",
            DocumentFormat::Markdown => "Markdown",
            DocumentFormat::WebArchive => "web archive",
            DocumentFormat::Html => "HTML",
        }
    }
}

fn ensure_text(text: String, label: &str) -> Result<String> {
    if text.trim().is_empty() {
        Err(ExtractError::EmptyContent(format!("{} contains no text", label)))
    } else {
        Ok(text)
    }
}
