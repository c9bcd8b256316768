//! 7-zip archives, unpacked into a scratch directory

use super::{Admission, ArchiveLimits, Listing};
use crate::artifact::ArchiveMember;
use crate::error::{ExtractError, Result};
use std::fs::File;
use std::io::{Cursor, Read};
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::warn;

/// A member written to scratch, under a numbered file name
struct Staged {
    name: String,
    path: PathBuf,
}

/// Unpack admitted entries into a fresh scratch directory, then read them
/// back in archive order. Member limits apply while unpacking, so nothing
/// past them ever reaches the disk. The directory is removed when this
/// returns.
pub(super) fn list(bytes: &[u8], limits: &ArchiveLimits) -> Result<Listing> {
    let scratch = scratch_dir(limits)?;
    let mut staged: Vec<Staged> = Vec::new();
    let mut skipped = 0;

    sevenz_rust::decompress_with_extract_fn(Cursor::new(bytes), scratch.path(), |entry, reader, _| {
        if entry.is_directory() {
            return Ok(true);
        }
        let name = entry.name().to_string();
        match limits.admit(staged.len(), &mut skipped, &name, entry.size()) {
            Admission::Stop => return Ok(false),
            Admission::Skip => {
                drain(reader);
                return Ok(true);
            }
            Admission::Read => {}
        }

        let path = scratch.path().join(staged.len().to_string());
        match stage(reader, &path, limits.max_member_bytes) {
            Ok(true) => staged.push(Staged { name, path }),
            Ok(false) => {
                warn!(member = %name, max = limits.max_member_bytes, "7z member larger than its header claims, skipping");
                skipped += 1;
                let _ = std::fs::remove_file(&path);
                drain(reader);
            }
            Err(err) => {
                warn!(member = %name, error = %err, "unreadable 7z member, skipping");
                skipped += 1;
                let _ = std::fs::remove_file(&path);
            }
        }
        Ok(true)
    })
    .map_err(|err| ExtractError::CorruptFile(format!("7z: {}", err)))?;

    let mut listing = Listing {
        members: Vec::with_capacity(staged.len()),
        skipped,
    };
    for Staged { name, path } in staged {
        match std::fs::read(&path) {
            Ok(data) => listing.members.push(ArchiveMember::new(name, data)),
            Err(err) => {
                warn!(member = %name, error = %err, "unpacked 7z member unreadable");
                listing.skipped += 1;
            }
        }
    }
    Ok(listing)
}

fn scratch_dir(limits: &ArchiveLimits) -> Result<TempDir> {
    let mut builder = tempfile::Builder::new();
    builder.prefix("textmill-7z-");
    let dir = match &limits.scratch_dir {
        Some(parent) => builder.tempdir_in(parent),
        None => builder.tempdir(),
    };
    dir.map_err(|err| ExtractError::ScratchUnavailable(err.to_string()))
}

/// Copy at most `max_bytes` of the entry to `path`. `Ok(false)` means the
/// entry holds more than that.
fn stage(reader: &mut dyn Read, path: &Path, max_bytes: usize) -> std::io::Result<bool> {
    let mut file = File::create(path)?;
    let written = std::io::copy(&mut reader.take(max_bytes as u64 + 1), &mut file)?;
    Ok(written <= max_bytes as u64)
}

/// Solid blocks are decoded in sequence, so skipped entries are still read
fn drain(reader: &mut dyn Read) {
    let _ = std::io::copy(reader, &mut std::io::sink());
}
