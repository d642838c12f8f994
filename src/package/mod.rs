//! Archive access layer.
//!
//! A [`Package`] is an immutable snapshot of an XLSX file: the raw archive
//! bytes plus the ordered list of entry names. The file is read in full when
//! the snapshot is taken and the OS handle is closed right away, so no
//! descriptor outlives the call that opened it.
//!
//! Mutation never happens in place. [`Package::rewrite`] builds a new archive,
//! moves it over the original path and returns a fresh snapshot; callers swap
//! to it explicitly.

mod atomic;
mod zip_patcher;

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::io::{Cursor, Read};
use std::path::{Path, PathBuf};

use zip::result::ZipError;
use zip::ZipArchive;

use crate::error::{Result, SheetpatchError};

/// Part name -> replacement bytes for [`Package::rewrite`].
pub type Replacements = BTreeMap<String, Vec<u8>>;

/// Immutable snapshot of an on-disk package.
#[derive(Debug, Clone)]
pub struct Package {
    path: PathBuf,
    data: Vec<u8>,
    entries: Vec<String>,
}

impl Package {
    /// Read the archive at `path` into a snapshot.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let data = fs::read(path)?;
        log::debug!("opened package {} ({} bytes)", path.display(), data.len());
        Self::from_bytes(path, data)
    }

    /// Wrap already-loaded archive bytes. `path` is where rewrites will land.
    pub fn from_bytes(path: impl Into<PathBuf>, data: Vec<u8>) -> Result<Self> {
        let entries = {
            let mut archive = ZipArchive::new(Cursor::new(data.as_slice()))?;
            let mut names = Vec::with_capacity(archive.len());
            for i in 0..archive.len() {
                names.push(archive.by_index_raw(i)?.name().to_string());
            }
            names
        };

        Ok(Self {
            path: path.into(),
            data,
            entries,
        })
    }

    /// Location of the package on disk.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Raw archive bytes of this snapshot.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Entry names in archive order.
    pub fn list_entries(&self) -> &[String] {
        &self.entries
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|e| e == name)
    }

    /// Every folder prefix implied by the entry paths (`xl/worksheets/sheet1.xml`
    /// implies `xl` and `xl/worksheets`).
    pub fn folders(&self) -> BTreeSet<String> {
        let mut folders = BTreeSet::new();
        for entry in &self.entries {
            for (end, _) in entry.match_indices('/') {
                if let Some(folder) = entry.get(..end).filter(|f| !f.is_empty()) {
                    folders.insert(folder.to_string());
                }
            }
        }
        folders
    }

    /// Decompressed bytes of one entry. Fails with `PartNotFound` if absent.
    pub fn read_entry(&self, name: &str) -> Result<Vec<u8>> {
        let mut archive = ZipArchive::new(Cursor::new(self.data.as_slice()))?;
        let mut file = archive.by_name(name).map_err(|e| match e {
            ZipError::FileNotFound => SheetpatchError::PartNotFound(name.to_string()),
            other => SheetpatchError::Zip(other),
        })?;

        let capacity = usize::try_from(file.size()).unwrap_or(0);
        let mut out = Vec::with_capacity(capacity);
        file.read_to_end(&mut out)?;
        log::trace!("read {name} ({} bytes)", out.len());
        Ok(out)
    }

    /// One entry decoded as UTF-8 markup text.
    pub fn read_text(&self, name: &str) -> Result<String> {
        let bytes = self.read_entry(name)?;
        String::from_utf8(bytes)
            .map_err(|e| SheetpatchError::Parse(format!("{name} is not valid UTF-8: {e}")))
    }

    /// Produce a new package with the entries in `replacements` substituted.
    ///
    /// Every original entry is carried over in order; untouched entries are
    /// raw-copied with their compression and timestamps intact. Names in
    /// `replacements` that the package does not contain yet are appended. The
    /// result is written to a temporary file next to the original and renamed
    /// over it, so the on-disk package is either fully old or fully new.
    ///
    /// The returned snapshot supersedes `self`.
    pub fn rewrite(&self, replacements: &Replacements) -> Result<Package> {
        let write_failure = |reason: String| SheetpatchError::Write {
            path: self.path.clone(),
            reason,
        };

        let data = zip_patcher::patch_zip(&self.data, replacements)
            .map_err(|e| write_failure(e.to_string()))?;
        atomic::atomic_write_bytes(&self.path, &data).map_err(|e| write_failure(e.to_string()))?;

        log::debug!(
            "rewrote {} ({} parts replaced, {} bytes)",
            self.path.display(),
            replacements.len(),
            data.len()
        );
        Self::from_bytes(self.path.clone(), data)
    }
}
