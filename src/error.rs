//! Structured error types for sheetpatch.
//!
//! Every fallible operation in the crate returns [`Result`], so callers can
//! match on the failure category instead of parsing messages.

use std::path::PathBuf;

/// All errors that can occur while opening, reading or rewriting a package.
#[derive(Debug, thiserror::Error)]
pub enum SheetpatchError {
    /// The input path was rejected before the package was opened.
    #[error("Invalid path {}: {reason}", path.display())]
    Path { path: PathBuf, reason: String },

    /// A required folder or part is missing from the package.
    #[error("File corrupted: {0}")]
    StructuralCorruption(String),

    /// Malformed markup or part content.
    #[error("Parse error: {0}")]
    Parse(String),

    /// XML parsing error from quick-xml.
    #[error("XML parsing: {0}")]
    Xml(#[from] quick_xml::Error),

    /// ZIP archive error.
    #[error("ZIP archive: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// A part that was asked for does not exist in the package.
    #[error("Part not found: {0}")]
    PartNotFound(String),

    /// Invalid cell reference, or a zero row/column handed to the encoder.
    #[error("Invalid cell address: {0}")]
    InvalidAddress(String),

    /// Unknown sheet name or out-of-range sheet index.
    #[error("Invalid sheet reference: {0}")]
    InvalidReference(String),

    /// The package rewrite could not be completed. The file on disk is unchanged.
    #[error("Failed to rewrite {}: {reason}", path.display())]
    Write { path: PathBuf, reason: String },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, SheetpatchError>;

impl SheetpatchError {
    /// True for every error that stems from malformed part content.
    #[must_use]
    pub fn is_parse(&self) -> bool {
        matches!(self, Self::Parse(_) | Self::Xml(_) | Self::Zip(_))
    }
}

impl From<quick_xml::events::attributes::AttrError> for SheetpatchError {
    fn from(e: quick_xml::events::attributes::AttrError) -> Self {
        Self::Xml(quick_xml::Error::from(e))
    }
}
