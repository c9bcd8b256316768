//! Error types for content extraction and link fetching

use crate::link::FetchAttempt;
use thiserror::Error;

/// Result type for document and archive extraction
pub type Result<T> = std::result::Result<T, ExtractError>;

/// Why a document or archive produced no text
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractError {
    /// No extractor is registered for the content type
    #[error("unsupported format: {content_type}{}", remediation_suffix(.remediation))]
    UnsupportedFormat {
        content_type: String,
        remediation: Option<&'static str>,
    },

    /// A legacy binary office format that is deliberately not parsed
    #[error("legacy {format} files are not supported: {remediation}")]
    LegacyFormatUnsupported {
        format: &'static str,
        remediation: &'static str,
    },

    /// The bytes do not form a readable file of the declared type
    #[error("corrupt file: {0}")]
    CorruptFile(String),

    /// The file opened but carried no text
    #[error("no text content: {0}")]
    EmptyContent(String),

    /// Text bytes are not valid in their encoding
    #[error("decode error: {0}")]
    DecodeError(String),

    /// The archive had no members, or none of them yielded text
    #[error("archive yielded no text: {0}")]
    ArchiveEmpty(String),

    /// Input exceeds the configured size limit
    #[error("content too large: {size} bytes exceeds max {max} bytes")]
    ContentTooLarge { size: usize, max: usize },

    /// No scratch directory could be created for unpacking
    #[error("scratch directory unavailable: {0}")]
    ScratchUnavailable(String),
}

fn remediation_suffix(remediation: &Option<&'static str>) -> String {
    match remediation {
        Some(hint) => format!(" ({})", hint),
        None => String::new(),
    }
}

/// Discriminant of [`ExtractError`], for branching and logging
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExtractErrorKind {
    UnsupportedFormat,
    LegacyFormatUnsupported,
    CorruptFile,
    EmptyContent,
    DecodeError,
    ArchiveEmpty,
    ContentTooLarge,
    ScratchUnavailable,
}

impl ExtractError {
    /// The error's kind
    pub fn kind(&self) -> ExtractErrorKind {
        match self {
            ExtractError::UnsupportedFormat { .. } => ExtractErrorKind::UnsupportedFormat,
            ExtractError::LegacyFormatUnsupported { .. } => {
                ExtractErrorKind::LegacyFormatUnsupported
            }
            ExtractError::CorruptFile(_) => ExtractErrorKind::CorruptFile,
            ExtractError::EmptyContent(_) => ExtractErrorKind::EmptyContent,
            ExtractError::DecodeError(_) => ExtractErrorKind::DecodeError,
            ExtractError::ArchiveEmpty(_) => ExtractErrorKind::ArchiveEmpty,
            ExtractError::ContentTooLarge { .. } => ExtractErrorKind::ContentTooLarge,
            ExtractError::ScratchUnavailable(_) => ExtractErrorKind::ScratchUnavailable,
        }
    }

    pub(crate) fn unsupported(content_type: impl Into<String>) -> Self {
        ExtractError::UnsupportedFormat {
            content_type: content_type.into(),
            remediation: None,
        }
    }
}

impl From<lopdf::Error> for ExtractError {
    fn from(err: lopdf::Error) -> Self {
        ExtractError::CorruptFile(format!("PDF: {}", err))
    }
}

impl From<zip::result::ZipError> for ExtractError {
    fn from(err: zip::result::ZipError) -> Self {
        ExtractError::CorruptFile(format!("zip container: {}", err))
    }
}

impl From<quick_xml::Error> for ExtractError {
    fn from(err: quick_xml::Error) -> Self {
        ExtractError::CorruptFile(format!("XML: {}", err))
    }
}

impl From<calamine::Error> for ExtractError {
    fn from(err: calamine::Error) -> Self {
        ExtractError::CorruptFile(format!("spreadsheet: {}", err))
    }
}

/// Why a URL produced no text
#[derive(Error, Debug)]
pub enum FetchError {
    /// The URL could not be parsed or is not http(s)
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// Connection, TLS or protocol failure
    #[error("network error: {0}")]
    Network(String),

    /// The server answered with something other than 200
    #[error("HTTP status {0}")]
    HttpStatus(u16),

    /// The attempt ran past its deadline
    #[error("timed out after {0} seconds")]
    Timeout(u64),

    /// The page is an anti-bot challenge rather than content
    #[error("challenge page detected: {0}")]
    ChallengePageDetected(String),

    /// The cleaned text was empty or too short to accept
    #[error("insufficient content: {chars} characters")]
    InsufficientContent { chars: usize },

    /// The headless browser failed to start or drive the page
    #[error("browser error: {0}")]
    Browser(String),

    /// Response body exceeds the configured size limit
    #[error("content too large: {size} bytes exceeds max {max} bytes")]
    ContentTooLarge { size: usize, max: usize },

    /// Every tier failed
    #[error("all {} fetch tiers failed", .attempts.len())]
    Exhausted { attempts: Vec<FetchAttempt> },
}

/// Discriminant of [`FetchError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FetchErrorKind {
    InvalidUrl,
    NetworkError,
    HttpStatus,
    Timeout,
    ChallengePageDetected,
    InsufficientContent,
    BrowserError,
    ContentTooLarge,
    FetchError,
}

impl FetchError {
    /// The error's kind
    pub fn kind(&self) -> FetchErrorKind {
        match self {
            FetchError::InvalidUrl(_) => FetchErrorKind::InvalidUrl,
            FetchError::Network(_) => FetchErrorKind::NetworkError,
            FetchError::HttpStatus(_) => FetchErrorKind::HttpStatus,
            FetchError::Timeout(_) => FetchErrorKind::Timeout,
            FetchError::ChallengePageDetected(_) => FetchErrorKind::ChallengePageDetected,
            FetchError::InsufficientContent { .. } => FetchErrorKind::InsufficientContent,
            FetchError::Browser(_) => FetchErrorKind::BrowserError,
            FetchError::ContentTooLarge { .. } => FetchErrorKind::ContentTooLarge,
            FetchError::Exhausted { .. } => FetchErrorKind::FetchError,
        }
    }

    /// Whether this failure was a deadline overrun
    pub fn is_timeout(&self) -> bool {
        matches!(self, FetchError::Timeout(_))
    }
}

impl From<url::ParseError> for FetchError {
    fn from(err: url::ParseError) -> Self {
        FetchError::InvalidUrl(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_display_includes_remediation() {
        let err = ExtractError::UnsupportedFormat {
            content_type: "application/x-rar-compressed".to_string(),
            remediation: Some("please convert the archive to .zip"),
        };
        assert_eq!(
            err.to_string(),
            "unsupported format: application/x-rar-compressed (please convert the archive to .zip)"
        );
        assert_eq!(ExtractError::unsupported("image/png").to_string(), "unsupported format: image/png");
    }

    #[test]
    fn test_kinds() {
        assert_eq!(
            ExtractError::CorruptFile("x".into()).kind(),
            ExtractErrorKind::CorruptFile
        );
        assert_eq!(
            FetchError::Exhausted { attempts: vec![] }.kind(),
            FetchErrorKind::FetchError
        );
        assert!(FetchError::Timeout(5).is_timeout());
        assert!(!FetchError::HttpStatus(403).is_timeout());
    }
}
