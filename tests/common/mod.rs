//! Common test utilities for inspecting packages on disk.
#![allow(
    dead_code,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::panic
)]

use std::fs::File;
use std::io::Read;
use std::path::Path;

use zip::{CompressionMethod, ZipArchive};

// Re-export fixtures for convenience
pub use super::fixtures::*;

/// Entry names in archive order.
pub fn entry_names(path: &Path) -> Vec<String> {
    let mut archive = ZipArchive::new(File::open(path).unwrap()).unwrap();
    (0..archive.len())
        .map(|i| archive.by_index_raw(i).unwrap().name().to_string())
        .collect()
}

/// Decompressed text of one entry.
pub fn read_entry(path: &Path, name: &str) -> String {
    let mut archive = ZipArchive::new(File::open(path).unwrap()).unwrap();
    let mut body = String::new();
    archive
        .by_name(name)
        .unwrap_or_else(|e| panic!("missing entry {name}: {e}"))
        .read_to_string(&mut body)
        .unwrap();
    body
}

/// An entry exactly as stored: compression method, CRC and compressed bytes.
#[derive(Debug, PartialEq, Eq)]
pub struct RawEntry {
    pub compression: CompressionMethod,
    pub crc32: u32,
    pub bytes: Vec<u8>,
}

pub fn raw_entry(path: &Path, name: &str) -> RawEntry {
    let mut archive = ZipArchive::new(File::open(path).unwrap()).unwrap();
    let index = (0..archive.len())
        .find(|&i| archive.by_index_raw(i).unwrap().name() == name)
        .unwrap_or_else(|| panic!("missing entry {name}"));
    let mut file = archive.by_index_raw(index).unwrap();
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes).unwrap();
    RawEntry {
        compression: file.compression(),
        crc32: file.crc32(),
        bytes,
    }
}

/// Non-overlapping occurrences of `needle` in `haystack`.
pub fn count(haystack: &str, needle: &str) -> usize {
    haystack.matches(needle).count()
}

/// Number of `<tag ` or `<tag>` / `<tag/>` openings, with or without a prefix.
pub fn count_elements(xml: &str, local: &str) -> usize {
    xml.split('<')
        .skip(1)
        .filter(|chunk| {
            let name = chunk
                .split(|c: char| c.is_whitespace() || c == '>' || c == '/')
                .next()
                .unwrap_or("");
            name.rsplit(':').next() == Some(local) && !name.is_empty()
        })
        .count()
}
