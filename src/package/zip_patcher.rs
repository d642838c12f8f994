//! Build a new archive from an existing one with some entries replaced.
//!
//! Unmodified entries are copied via `raw_copy_file` (zero recompression cost).
//! Only replaced entries are written anew.

use std::collections::HashSet;
use std::io::{Cursor, Write};

use zip::write::FileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use super::Replacements;
use crate::error::Result;

/// Copy `original_data` entry by entry, substituting names found in `replacements`.
///
/// Replaced entries keep their original compression method and timestamp.
/// Replacements for names the archive lacks are appended in key order.
pub(super) fn patch_zip(original_data: &[u8], replacements: &Replacements) -> Result<Vec<u8>> {
    let mut archive = ZipArchive::new(Cursor::new(original_data))?;

    let buf: Vec<u8> = Vec::with_capacity(original_data.len());
    let mut writer = ZipWriter::new(Cursor::new(buf));
    let mut written: HashSet<String> = HashSet::new();

    // Copy all entries, replacing the listed ones
    for i in 0..archive.len() {
        let entry = archive.by_index_raw(i)?;
        let name = entry.name().to_string();

        if let Some(content) = replacements.get(&name) {
            let options = FileOptions::default()
                .compression_method(entry.compression())
                .last_modified_time(entry.last_modified());
            writer.start_file(name.as_str(), options)?;
            writer.write_all(content)?;
            written.insert(name);
            continue;
        }

        // Pass through unmodified entry (raw copy, no re-compression)
        writer.raw_copy_file(entry)?;
    }

    for (name, content) in replacements {
        if written.contains(name) {
            continue;
        }
        let options = FileOptions::default().compression_method(CompressionMethod::Deflated);
        writer.start_file(name.as_str(), options)?;
        writer.write_all(content)?;
    }

    let cursor = writer.finish()?;
    Ok(cursor.into_inner())
}
