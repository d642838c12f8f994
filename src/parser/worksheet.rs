//! Worksheet read path: sheet part markup to a rectangular string grid.

use crate::cell_ref::{decode, range_end};
use crate::error::{Result, SheetpatchError};
use crate::markup::{select, Document, Element};
use crate::namespaces::{harvest_namespaces, Namespaces, NS_SPREADSHEET};
use crate::shared_strings::{run_text, SharedStringTable};
use crate::types::Grid;

/// Cell type tag from the `t` attribute of a `<c>` element.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum CellTypeTag {
    /// `t="s"`: the value is an index into the shared string table.
    Shared,
    /// `t="inlineStr"`: the text lives in an `is` child.
    Inline,
    /// Anything else: the `v` text is taken as is.
    Literal,
}

pub(crate) fn parse_cell_type_tag(value: Option<&str>) -> CellTypeTag {
    match value {
        Some("s") => CellTypeTag::Shared,
        Some("inlineStr") => CellTypeTag::Inline,
        _ => CellTypeTag::Literal,
    }
}

/// A positioned cell as found in `sheetData` (1-based coordinates).
struct RawCell {
    row: u32,
    col: u32,
    value: Option<String>,
}

/// Build the grid of a sheet part.
///
/// The shape is the declared dimension (upper-left fixed at `A1`), or the
/// furthest cell when the part has no `dimension`. Cells without a value
/// stay empty; cells outside the shape are skipped.
pub(crate) fn parse_grid(xml: &str, strings: &SharedStringTable) -> Result<Grid> {
    let ns = harvest_namespaces(xml)?;
    let doc = Document::parse(xml)?;
    let root = doc.root();

    let cells = collect_cells(root, &ns, strings)?;

    let (rows, cols) = match declared_dimension(root, &ns)? {
        // A single-cell dimension on a sheet with no cells marks an empty sheet.
        Some(dim) if cells.is_empty() && !dim.contains(':') => (0, 0),
        Some(dim) => decode(range_end(&dim))?,
        None => cells
            .iter()
            .fold((0, 0), |(r, c), cell| (r.max(cell.row), c.max(cell.col))),
    };

    let mut grid: Grid = vec![vec![String::new(); to_index(cols)]; to_index(rows)];
    for cell in cells {
        let Some(value) = cell.value else { continue };
        let slot = grid
            .get_mut(to_index(cell.row.saturating_sub(1)))
            .and_then(|r| r.get_mut(to_index(cell.col.saturating_sub(1))));
        match slot {
            Some(slot) => *slot = value,
            None => log::warn!(
                "cell at row {} column {} lies outside the {rows}x{cols} dimension, skipped",
                cell.row,
                cell.col
            ),
        }
    }
    Ok(grid)
}

fn to_index(n: u32) -> usize {
    usize::try_from(n).unwrap_or(usize::MAX)
}

/// The `ref` of the part's `dimension` element, if any.
fn declared_dimension(root: &Element, ns: &Namespaces) -> Result<Option<String>> {
    let path = ns.path_step(NS_SPREADSHEET, "dimension");
    Ok(select(root, &path, ns)?
        .into_iter()
        .find_map(|dim| dim.attribute("ref"))
        .map(str::to_string))
}

/// Every `c` under `sheetData/row`, with positions resolved.
///
/// Rows and cells that omit their `r` reference continue from the previous
/// one, as spreadsheet writers are allowed to do.
fn collect_cells(
    root: &Element,
    ns: &Namespaces,
    strings: &SharedStringTable,
) -> Result<Vec<RawCell>> {
    let path = format!(
        "{}/{}",
        ns.path_step(NS_SPREADSHEET, "sheetData"),
        ns.path_step(NS_SPREADSHEET, "row")
    );

    let mut cells = Vec::new();
    let mut row_num = 0u32;
    for row in select(root, &path, ns)? {
        row_num = match row.attribute("r") {
            Some(r) => r
                .trim()
                .parse()
                .map_err(|_| SheetpatchError::Parse(format!("invalid row number '{r}'")))?,
            None => row_num.saturating_add(1),
        };

        let mut col_num = 0u32;
        for cell in row.child_elements().filter(|e| e.local_name() == "c") {
            let (r, c) = match cell.attribute("r") {
                Some(label) => decode(label)?,
                None => (row_num, col_num.saturating_add(1)),
            };
            col_num = c;
            if r == 0 {
                return Err(SheetpatchError::Parse("cell in row 0".to_string()));
            }
            cells.push(RawCell {
                row: r,
                col: c,
                value: cell_value(cell, strings)?,
            });
        }
    }
    Ok(cells)
}

fn child<'a>(element: &'a Element, local: &str) -> Option<&'a Element> {
    element.child_elements().find(|e| e.local_name() == local)
}

/// The display string of one cell, `None` when it carries no value.
fn cell_value(cell: &Element, strings: &SharedStringTable) -> Result<Option<String>> {
    match parse_cell_type_tag(cell.attribute("t")) {
        CellTypeTag::Inline => Ok(child(cell, "is").map(run_text)),
        CellTypeTag::Literal => Ok(child(cell, "v").map(Element::text)),
        CellTypeTag::Shared => {
            let Some(v) = child(cell, "v") else {
                return Ok(None);
            };
            let raw = v.text();
            let index: usize = raw.trim().parse().map_err(|_| {
                SheetpatchError::Parse(format!("invalid shared string index '{raw}'"))
            })?;
            strings.get(index).map(|s| Some(s.to_string())).ok_or_else(|| {
                SheetpatchError::Parse(format!(
                    "shared string index {index} out of range ({} entries)",
                    strings.len()
                ))
            })
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SST: &str = r#"<sst xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><si><t>name</t></si><si><t>qty</t></si><si><t>apple</t></si></sst>"#;

    fn sheet(dimension: Option<&str>, rows: &str) -> String {
        let dim = dimension
            .map(|d| format!(r#"<dimension ref="{d}"/>"#))
            .unwrap_or_default();
        format!(
            r#"<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">{dim}<sheetData>{rows}</sheetData></worksheet>"#
        )
    }

    fn table() -> SharedStringTable {
        SharedStringTable::parse(SST).unwrap()
    }

    #[test]
    fn test_shared_and_literal_cells() {
        let xml = sheet(
            Some("A1:B2"),
            r#"<row r="1"><c r="A1" t="s"><v>0</v></c><c r="B1" t="s"><v>1</v></c></row><row r="2"><c r="A2" t="s"><v>2</v></c><c r="B2"><v>12.5</v></c></row>"#,
        );
        let grid = parse_grid(&xml, &table()).unwrap();
        assert_eq!(grid, vec![vec!["name", "qty"], vec!["apple", "12.5"]]);
    }

    #[test]
    fn test_dimension_bounds_grid_and_fills_gaps() {
        let xml = sheet(Some("A1:C3"), r#"<row r="2"><c r="B2"><v>x</v></c><c r="C2"/></row>"#);
        let grid = parse_grid(&xml, &table()).unwrap();
        assert_eq!(
            grid,
            vec![vec!["", "", ""], vec!["", "x", ""], vec!["", "", ""]]
        );
    }

    #[test]
    fn test_cells_outside_dimension_are_skipped() {
        let xml = sheet(Some("A1:A1"), r#"<row r="1"><c r="A1"><v>in</v></c><c r="B1"><v>out</v></c></row>"#);
        assert_eq!(parse_grid(&xml, &table()).unwrap(), vec![vec!["in"]]);
    }

    #[test]
    fn test_missing_dimension_uses_furthest_cell() {
        let xml = sheet(None, r#"<row r="3"><c r="B3"><v>z</v></c></row>"#);
        let grid = parse_grid(&xml, &table()).unwrap();
        assert_eq!(grid.len(), 3);
        assert_eq!(grid[2], vec!["", "z"]);
    }

    #[test]
    fn test_inline_string_and_implicit_positions() {
        let xml = sheet(
            Some("A1:B1"),
            r#"<row><c t="inlineStr"><is><r><t>in</t></r><r><t>line</t></r></is></c><c t="str"><v>f</v></c></row>"#,
        );
        assert_eq!(parse_grid(&xml, &table()).unwrap(), vec![vec!["inline", "f"]]);
    }

    #[test]
    fn test_empty_sheet() {
        let xml = sheet(Some("A1"), "");
        assert!(parse_grid(&xml, &table()).unwrap().is_empty());
    }

    #[test]
    fn test_shared_index_out_of_range_is_parse_error() {
        let xml = sheet(Some("A1"), r#"<row r="1"><c r="A1" t="s"><v>7</v></c></row>"#);
        assert!(parse_grid(&xml, &table()).unwrap_err().is_parse());
    }

    #[test]
    fn test_bad_cell_reference_is_rejected() {
        let xml = sheet(Some("A1"), r#"<row r="1"><c r="a1"><v>1</v></c></row>"#);
        assert!(matches!(
            parse_grid(&xml, &table()),
            Err(SheetpatchError::InvalidAddress(_))
        ));
    }
}
