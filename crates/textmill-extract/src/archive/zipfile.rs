//! Zip archives

use super::{Admission, ArchiveLimits, Listing};
use crate::artifact::ArchiveMember;
use crate::error::Result;
use std::io::{Cursor, Read};
use tracing::warn;
use zip::ZipArchive;

pub(super) fn list(bytes: &[u8], limits: &ArchiveLimits) -> Result<Listing> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))?;
    let mut listing = Listing::default();

    for index in 0..archive.len() {
        let mut file = match archive.by_index(index) {
            Ok(file) => file,
            Err(err) => {
                warn!(index, error = %err, "unreadable zip entry");
                listing.skipped += 1;
                continue;
            }
        };
        if file.is_dir() {
            continue;
        }

        let name = file.name().to_string();
        match limits.admit(listing.members.len(), &mut listing.skipped, &name, file.size()) {
            Admission::Stop => break,
            Admission::Skip => continue,
            Admission::Read => {}
        }

        let mut data = Vec::new();
        if let Err(err) = (&mut file)
            .take(limits.max_member_bytes as u64 + 1)
            .read_to_end(&mut data)
        {
            warn!(member = %name, error = %err, "unreadable zip member, skipping");
            listing.skipped += 1;
            continue;
        }
        if data.len() > limits.max_member_bytes {
            warn!(member = %name, "zip member larger than its header claims, skipping");
            listing.skipped += 1;
            continue;
        }
        listing.members.push(ArchiveMember::new(name, data));
    }

    Ok(listing)
}
