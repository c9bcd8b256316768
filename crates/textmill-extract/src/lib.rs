//! # Textmill Extract
//!
//! Turns user-supplied artifacts into clean plain text: uploaded documents,
//! archives of documents, and web links.
//!
//! ## Features
//!
//! - **Documents**: PDF, plain text, DOCX, ODT, spreadsheets (xls, xlsx,
//!   ods), presentations (pptx, odp), Markdown, HTML and MHTML
//! - **Archives**: zip, 7z and tar (plain, gzip, bzip2), walked one level deep
//! - **Links**: Static, Evasive and Dynamic (headless Chromium) fetch tiers,
//!   escalated until one returns enough text
//! - **Typed failures**: every call returns text or one error value
//!
//! ## Example
//!
//! ```rust,ignore
//! use textmill_extract::{Pipeline, PipelineConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let pipeline = Pipeline::new(PipelineConfig::default())?;
//!
//!     let text = pipeline.extract_from_bytes(b"hello", "text/plain")?;
//!     println!("{}", text);
//!
//!     let page = pipeline.extract_from_url("https://example.com").await?;
//!     println!("{}", page);
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐     ┌────────────────┐     ┌─────────────────┐
//! │ bytes + type │ ──► │ FormatRegistry │ ──► │ DocumentFormat  │ ──► text
//! └──────────────┘     └────────────────┘     └─────────────────┘
//!                              │                       ▲
//!                              ▼                       │ per member
//!                      ┌────────────────┐              │
//!                      │ ArchiveWalker  │ ─────────────┘
//!                      └────────────────┘
//!
//! ┌──────────────┐     ┌────────────────┐     ┌─────────────────┐
//! │     URL      │ ──► │  LinkFetcher   │ ──► │   normalize     │ ──► text
//! └──────────────┘     └────────────────┘     └─────────────────┘
//! ```

pub mod archive;
pub mod artifact;
pub mod config;
pub mod document;
pub mod error;
pub mod html;
pub mod link;
pub mod pipeline;
pub mod registry;

pub use archive::{ArchiveKind, ArchiveWalker};
pub use artifact::{ArchiveMember, SourceArtifact};
pub use config::{ConfigError, PipelineConfig};
pub use document::DocumentFormat;
pub use error::{ExtractError, ExtractErrorKind, FetchError, FetchErrorKind, Result};
pub use link::{
    first_url_in, is_good_enough, AttemptOutcome, FetchAttempt, FetchTier, FetcherPolicy,
    LinkFetcher, Tier,
};
pub use pipeline::Pipeline;
pub use registry::{content_type_for_name, FormatRegistry, Handler};
