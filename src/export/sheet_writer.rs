//! Regenerates a worksheet's `sheetData` from a grid.
//!
//! The rest of the part (views, columns, merges, page setup and so on) is
//! kept as parsed. Text cells go through the shared string table; literal
//! cells are written as plain values.

use crate::cell_ref::{dimension_ref, encode};
use crate::error::{Result, SheetpatchError};
use crate::markup::{select_first_mut, Document, Element};
use crate::namespaces::{Namespaces, DEFAULT_PREFIX, NS_SPREADSHEET, NS_X14AC};
use crate::shared_strings::SharedStringTable;
use crate::types::CellValue;

/// Row height descent written by current spreadsheet tools for default rows.
const DEFAULT_DY_DESCENT: &str = "0.25";

fn count(n: usize, what: &str) -> Result<u32> {
    u32::try_from(n).map_err(|_| SheetpatchError::InvalidAddress(format!("too many {what}: {n}")))
}

/// Replace the sheet's rows with `grid` and update its dimension.
///
/// New strings are appended to `strings`; the caller persists both parts.
pub(crate) fn write_grid(
    doc: &mut Document,
    ns: &Namespaces,
    grid: &[Vec<CellValue>],
    strings: &mut SharedStringTable,
) -> Result<()> {
    let uri = doc
        .root()
        .namespace()
        .unwrap_or(NS_SPREADSHEET)
        .to_string();
    let names = ElementNames::new(ns, &uri);

    let rows = count(grid.len(), "rows")?;
    let cols = count(grid.iter().map(Vec::len).max().unwrap_or(0), "columns")?;
    // A dimension cannot describe rows without columns; such a grid would read back empty.
    if rows > 0 && cols == 0 {
        return Err(SheetpatchError::InvalidAddress(format!(
            "grid has {rows} rows but no columns"
        )));
    }
    let dimension = dimension_ref(rows, cols)?;
    set_dimension(doc, ns, &names, &dimension)?;

    let sheet_data_path = ns.path_step(&uri, "sheetData");
    let sheet_data = select_first_mut(doc.root_mut(), &sheet_data_path, ns)?
        .ok_or_else(|| SheetpatchError::Parse("worksheet has no sheetData".to_string()))?;
    sheet_data.clear_children();

    for (row_idx, values) in grid.iter().enumerate() {
        let row_num = count(row_idx + 1, "rows")?;
        sheet_data.push(write_row(&names, row_num, values, strings)?);
    }

    log::debug!("wrote {rows}x{cols} grid, dimension {dimension}");
    Ok(())
}

/// Qualified names for the elements a sheet rewrite emits.
struct ElementNames<'a> {
    uri: &'a str,
    ns: &'a Namespaces,
    dy_descent: Option<String>,
}

impl<'a> ElementNames<'a> {
    fn new(ns: &'a Namespaces, uri: &'a str) -> Self {
        // Only emitted when the part already declares the x14ac prefix.
        let dy_descent = match ns.prefix_for(NS_X14AC) {
            Some(prefix) if prefix != DEFAULT_PREFIX => Some(format!("{prefix}:dyDescent")),
            _ => None,
        };
        Self { uri, ns, dy_descent }
    }

    fn element(&self, local: &str) -> Element {
        Element::new(self.ns.qualified_name(self.uri, local), Some(self.uri))
    }
}

fn set_dimension(
    doc: &mut Document,
    ns: &Namespaces,
    names: &ElementNames,
    dimension: &str,
) -> Result<()> {
    let path = ns.path_step(names.uri, "dimension");
    if let Some(existing) = select_first_mut(doc.root_mut(), &path, ns)? {
        existing.set_attribute("ref", dimension);
        return Ok(());
    }

    // `dimension` follows `sheetPr` when present, otherwise it comes first.
    let root = doc.root_mut();
    let index = root.position_of("sheetPr").map_or(0, |i| i + 1);
    root.insert(index, names.element("dimension").with_attribute("ref", dimension));
    Ok(())
}

fn write_row(
    names: &ElementNames,
    row_num: u32,
    values: &[CellValue],
    strings: &mut SharedStringTable,
) -> Result<Element> {
    let mut row = names.element("row").with_attribute("r", row_num.to_string());
    if !values.is_empty() {
        row.set_attribute("spans", format!("1:{}", values.len()));
    }
    if let Some(attr) = &names.dy_descent {
        row.set_attribute(attr, DEFAULT_DY_DESCENT);
    }

    for (col_idx, value) in values.iter().enumerate() {
        let col_num = count(col_idx + 1, "columns")?;
        row.push(write_cell(names, encode(row_num, col_num)?, value, strings));
    }
    Ok(row)
}

/// One `<c>` element. Empty cells are kept as bare references.
fn write_cell(
    names: &ElementNames,
    label: String,
    value: &CellValue,
    strings: &mut SharedStringTable,
) -> Element {
    let mut cell = names.element("c").with_attribute("r", label);
    let text = match value {
        CellValue::Text(text) => {
            cell.set_attribute("t", "s");
            strings.intern(text).to_string()
        }
        CellValue::Literal(literal) => literal.clone(),
        CellValue::Empty => return cell,
    };

    let mut v = names.element("v");
    if !text.is_empty() {
        v.push_text(text);
    }
    cell.push(v);
    cell
}
