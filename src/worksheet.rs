//! A sheet's cell grid, as last read from or written to the package.
//!
//! A [`Worksheet`] is a plain value: it owns its grid and the identifiers
//! needed to find its part again, and holds no reference to the workbook it
//! came from. The workbook produces a fresh one on every read or upload.

use serde::Serialize;

use crate::error::Result;
use crate::package::Package;
use crate::parser::worksheet::parse_grid;
use crate::shared_strings::SharedStringTable;
use crate::types::{CellValue, Grid};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Worksheet {
    name: String,
    relationship_id: String,
    path: String,
    grid: Grid,
}

impl Worksheet {
    /// Read the sheet part at `path` into a grid.
    pub(crate) fn read(
        package: &Package,
        name: &str,
        relationship_id: &str,
        path: &str,
    ) -> Result<Self> {
        let strings = SharedStringTable::load_or_empty(package)?;
        let grid = parse_grid(&package.read_text(path)?, &strings)?;
        log::debug!("read sheet '{name}' from {path}: {} rows", grid.len());

        Ok(Self {
            name: name.to_string(),
            relationship_id: relationship_id.to_string(),
            path: path.to_string(),
            grid,
        })
    }

    /// A worksheet holding a grid that was just written, without re-reading it.
    pub(crate) fn with_grid(
        name: &str,
        relationship_id: &str,
        path: &str,
        grid: &[Vec<CellValue>],
    ) -> Self {
        Self {
            name: name.to_string(),
            relationship_id: relationship_id.to_string(),
            path: path.to_string(),
            grid: grid
                .iter()
                .map(|row| row.iter().map(|v| v.as_str().to_string()).collect())
                .collect(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn relationship_id(&self) -> &str {
        &self.relationship_id
    }

    /// Package path of the sheet part.
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn into_grid(self) -> Grid {
        self.grid
    }

    pub fn row_count(&self) -> usize {
        self.grid.len()
    }

    /// Width of the widest row.
    pub fn col_count(&self) -> usize {
        self.grid.iter().map(Vec::len).max().unwrap_or(0)
    }

    /// Replace the first row with `headers` when the lengths agree.
    ///
    /// Returns whether the override was applied; a mismatch leaves the grid
    /// as read.
    pub fn apply_headers(&mut self, headers: &[&str]) -> bool {
        let width = self.col_count();
        match self.grid.first_mut() {
            Some(first) if headers.len() == width => {
                *first = headers.iter().map(|h| (*h).to_string()).collect();
                true
            }
            _ => {
                log::debug!(
                    "header override ignored for '{}': {} headers for {width} columns",
                    self.name,
                    headers.len()
                );
                false
            }
        }
    }
}
