//! Package write paths.
//!
//! Every write is a copy-on-write rewrite of the archive: only the parts an
//! operation touches are re-serialized, everything else is passed through
//! byte-identical, and all touched parts land in a single rewrite.

pub(crate) mod provision;
pub(crate) mod sheet_writer;

use crate::error::Result;
use crate::package::{Package, Replacements};
use crate::parser::load_part;
use crate::shared_strings::{SharedStringTable, SHARED_STRINGS_PART};
use crate::types::CellValue;

/// Replace the grid of the sheet stored at `part_path`.
///
/// The sheet part and the shared string part are committed together; the
/// shared string part is left untouched when the grid adds no new strings.
/// Returns the snapshot that supersedes `package`.
pub(crate) fn write_sheet(
    package: &Package,
    part_path: &str,
    grid: &[Vec<CellValue>],
) -> Result<Package> {
    let mut strings = SharedStringTable::load(package)?;
    let (mut sheet, namespaces) = load_part(package, part_path)?;

    sheet_writer::write_grid(&mut sheet, &namespaces, grid, &mut strings)?;

    let mut replacements = Replacements::new();
    if strings.is_dirty() {
        replacements.insert(SHARED_STRINGS_PART.to_string(), strings.to_xml()?);
    }
    replacements.insert(part_path.to_string(), sheet.to_xml()?);

    package.rewrite(&replacements)
}
