//! Container formats: zip, 7z and the tar family
//!
//! The walker opens an archive, reads its regular-file members into memory
//! and sends each one back through the format registry by file extension.
//! Walking is flat: a member that is itself an archive is skipped.

mod sevenz;
mod tarball;
mod zipfile;

use crate::artifact::ArchiveMember;
use crate::config::PipelineConfig;
use crate::error::{ExtractError, Result};
use crate::registry::{FormatRegistry, Handler, RAR};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info, warn};

const RAR_REMEDIATION: &str = "please convert the archive to .zip";

/// A registered container format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArchiveKind {
    Zip,
    SevenZip,
    /// Plain, gzip or bzip2 compressed tar, told apart by magic bytes
    Tar,
    /// Never extracted
    Rar,
}

/// Bounds applied while reading members out of an archive
#[derive(Debug, Clone)]
pub(crate) struct ArchiveLimits {
    pub max_members: usize,
    pub max_member_bytes: usize,
    pub scratch_dir: Option<PathBuf>,
}

/// Members read from an archive, plus how many were passed over
#[derive(Debug, Default)]
pub(crate) struct Listing {
    pub members: Vec<ArchiveMember>,
    pub skipped: usize,
}

/// What to do with the next member of an archive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Admission {
    Read,
    Skip,
    Stop,
}

impl ArchiveLimits {
    /// Decide whether the member `name` of `size` bytes is read, given how
    /// many members were already admitted. Skips are counted in `skipped`.
    pub(crate) fn admit(
        &self,
        admitted: usize,
        skipped: &mut usize,
        name: &str,
        size: u64,
    ) -> Admission {
        if admitted >= self.max_members {
            warn!(max = self.max_members, "archive member limit reached, ignoring the rest");
            return Admission::Stop;
        }
        if size > self.max_member_bytes as u64 {
            warn!(member = name, size, max = self.max_member_bytes, "skipping oversized archive member");
            *skipped += 1;
            return Admission::Skip;
        }
        Admission::Read
    }
}

/// Extracts text from every supported member of an archive
#[derive(Debug, Clone)]
pub struct ArchiveWalker {
    registry: Arc<FormatRegistry>,
    limits: ArchiveLimits,
}

impl ArchiveWalker {
    pub fn new(registry: Arc<FormatRegistry>, config: &PipelineConfig) -> Self {
        Self {
            registry,
            limits: ArchiveLimits {
                max_members: config.max_archive_members,
                max_member_bytes: config.max_member_bytes,
                scratch_dir: config.scratch_dir.clone(),
            },
        }
    }

    /// Text of all members that extract cleanly, newline separated, in
    /// archive order.
    ///
    /// Unsupported or failing members are logged and skipped. The walk only
    /// fails when the archive cannot be opened ([`ExtractError::CorruptFile`])
    /// or when no member produced text ([`ExtractError::ArchiveEmpty`]).
    pub fn walk(&self, bytes: &[u8], kind: ArchiveKind) -> Result<String> {
        self.walk_named(bytes, kind, None)
    }

    pub(crate) fn walk_named(
        &self,
        bytes: &[u8],
        kind: ArchiveKind,
        origin: Option<&str>,
    ) -> Result<String> {
        let listing = match kind {
            ArchiveKind::Zip => zipfile::list(bytes, &self.limits)?,
            ArchiveKind::Tar => tarball::list(bytes, &self.limits)?,
            ArchiveKind::SevenZip => sevenz::list(bytes, &self.limits)?,
            ArchiveKind::Rar => {
                return Err(ExtractError::UnsupportedFormat {
                    content_type: RAR.to_string(),
                    remediation: Some(RAR_REMEDIATION),
                })
            }
        };

        if listing.members.is_empty() && listing.skipped == 0 {
            return Err(ExtractError::ArchiveEmpty("archive has no members".to_string()));
        }

        let total = listing.members.len() + listing.skipped;
        let mut texts = Vec::new();
        for mut member in listing.members {
            member.archive_origin_name = origin.map(str::to_string);
            if let Some(text) = self.extract_member(&member) {
                texts.push(text);
            }
        }

        info!(
            archive = origin.unwrap_or("<unnamed>"),
            members = total,
            extracted = texts.len(),
            "archive walked"
        );

        if texts.is_empty() {
            return Err(ExtractError::ArchiveEmpty(format!(
                "none of {} members yielded text",
                total
            )));
        }
        Ok(texts.join("\n"))
    }

    fn extract_member(&self, member: &ArchiveMember) -> Option<String> {
        let handler = match self.registry.resolve(member.inferred_content_type) {
            Ok(handler) => handler,
            Err(err) => {
                debug!(member = %member.name, error = %err, "skipping unsupported archive member");
                return None;
            }
        };

        match handler {
            Handler::Document(format) => match format.extract(&member.bytes) {
                Ok(text) => Some(text),
                Err(err) => {
                    warn!(member = %member.name, error = %err, "archive member failed to extract");
                    None
                }
            },
            Handler::Archive(_) => {
                warn!(member = %member.name, "nested archives are not walked");
                None
            }
        }
    }
}
