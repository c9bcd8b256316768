//! Tar archives, optionally gzip or bzip2 compressed

use super::{Admission, ArchiveLimits, Listing};
use crate::artifact::ArchiveMember;
use crate::error::{ExtractError, Result};
use bzip2::read::BzDecoder;
use flate2::read::GzDecoder;
use std::io::Read;
use tar::Archive;
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Compression {
    None,
    Gzip,
    Bzip2,
}

fn detect_compression(data: &[u8]) -> Compression {
    match data {
        [0x1F, 0x8B, ..] => Compression::Gzip,
        [b'B', b'Z', b'h', ..] => Compression::Bzip2,
        _ => Compression::None,
    }
}

fn wrap_reader<'a>(data: &'a [u8], codec: Compression) -> Box<dyn Read + 'a> {
    match codec {
        Compression::None => Box::new(data),
        Compression::Gzip => Box::new(GzDecoder::new(data)),
        Compression::Bzip2 => Box::new(BzDecoder::new(data)),
    }
}

pub(super) fn list(bytes: &[u8], limits: &ArchiveLimits) -> Result<Listing> {
    let mut archive = Archive::new(wrap_reader(bytes, detect_compression(bytes)));
    let entries = archive
        .entries()
        .map_err(|err| ExtractError::CorruptFile(format!("tar: {}", err)))?;

    let mut listing = Listing::default();
    let mut seen = 0usize;
    for entry in entries {
        let mut entry = match entry {
            Ok(entry) => entry,
            Err(err) if seen == 0 => {
                return Err(ExtractError::CorruptFile(format!("tar: {}", err)));
            }
            Err(err) => {
                warn!(error = %err, "tar stream damaged, keeping members read so far");
                break;
            }
        };
        seen += 1;

        if !entry.header().entry_type().is_file() {
            continue;
        }
        let name = match entry.path() {
            Ok(path) => path.to_string_lossy().into_owned(),
            Err(err) => {
                warn!(error = %err, "tar member with unreadable path");
                listing.skipped += 1;
                continue;
            }
        };

        match limits.admit(listing.members.len(), &mut listing.skipped, &name, entry.size()) {
            Admission::Stop => break,
            Admission::Skip => continue,
            Admission::Read => {}
        }

        let mut data = Vec::new();
        if let Err(err) = (&mut entry)
            .take(limits.max_member_bytes as u64)
            .read_to_end(&mut data)
        {
            warn!(member = %name, error = %err, "tar member truncated");
            listing.skipped += 1;
            continue;
        }
        listing.members.push(ArchiveMember::new(name, data));
    }

    Ok(listing)
}
