//! Atomic replacement of the package file:
//! - write to a temp file in the same directory (avoids cross-device renames)
//! - carry over the destination's permissions
//! - flush + `sync_all`
//! - rename into place with replace semantics

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::Path;

use tempfile::NamedTempFile;

fn parent_dir_or_dot(path: &Path) -> &Path {
    // `Path::parent` returns `Some("")` for bare relative file names like `book.xlsx`.
    path.parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."))
}

/// Write `bytes` to `dest` so readers see either the old or the new file.
///
/// On error the destination is left untouched and the temp file is removed.
pub(super) fn atomic_write_bytes(dest: &Path, bytes: &[u8]) -> io::Result<()> {
    let dir = parent_dir_or_dot(dest);

    let mut tmp = NamedTempFile::new_in(dir)?;
    // Temp files are created owner-only; the package keeps its own mode.
    if let Ok(meta) = fs::metadata(dest) {
        tmp.as_file().set_permissions(meta.permissions())?;
    }
    tmp.as_file_mut().write_all(bytes)?;
    tmp.as_file_mut().flush()?;
    tmp.as_file().sync_all()?;

    tmp.persist(dest).map_err(|e| e.error)?;

    // Best-effort: the file is already in place if the directory sync fails.
    let _ = File::open(dir).and_then(|d| d.sync_all());
    Ok(())
}
