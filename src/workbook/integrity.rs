//! Checks run before a package is accepted as a workbook.

use std::path::Path;

use super::OpenOptions;
use crate::error::{Result, SheetpatchError};
use crate::package::Package;
use crate::parser::{
    APP_PROPS_PART, CONTENT_TYPES_PART, CORE_PROPS_PART, WORKBOOK_PART, WORKBOOK_RELS_PART,
};

/// Folders every workbook package must contain.
pub const REQUIRED_FOLDERS: [&str; 4] = ["docProps", "xl", "xl/theme", "xl/worksheets"];

/// Parts every workbook package must contain.
pub const REQUIRED_PARTS: [&str; 5] = [
    CORE_PROPS_PART,
    APP_PROPS_PART,
    WORKBOOK_PART,
    WORKBOOK_RELS_PART,
    CONTENT_TYPES_PART,
];

/// Accepted file extensions (case-sensitive).
const EXTENSIONS: [&str; 2] = ["xlsx", "xlsm"];

/// Reject paths that cannot name a workbook before touching the file.
pub(crate) fn validate_path(path: &Path, options: OpenOptions) -> Result<()> {
    let reject = |reason: &str| SheetpatchError::Path {
        path: path.to_path_buf(),
        reason: reason.to_string(),
    };

    if options.validate_extension {
        let extension = path.extension().and_then(|e| e.to_str());
        if !extension.is_some_and(|e| EXTENSIONS.contains(&e)) {
            return Err(reject("unsupported file extension, expected .xlsx or .xlsm"));
        }
    }
    if !path.exists() {
        return Err(reject("file not found"));
    }
    if !path.is_file() {
        return Err(reject("not a regular file"));
    }
    Ok(())
}

/// Fail with `StructuralCorruption` if a required folder or part is missing.
pub(crate) fn check_integrity(package: &Package) -> Result<()> {
    let folders = package.folders();
    if let Some(missing) = REQUIRED_FOLDERS.iter().find(|f| !folders.contains(**f)) {
        return Err(SheetpatchError::StructuralCorruption(format!(
            "missing folder '{missing}'"
        )));
    }
    if let Some(missing) = REQUIRED_PARTS.iter().find(|p| !package.contains(p)) {
        return Err(SheetpatchError::StructuralCorruption(format!(
            "missing part '{missing}'"
        )));
    }
    Ok(())
}
