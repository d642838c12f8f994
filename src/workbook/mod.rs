//! The workbook facade: open a package, inspect its sheets, read and replace
//! sheet grids.
//!
//! ```no_run
//! use sheetpatch::{row, Workbook};
//!
//! let mut book = Workbook::open("report.xlsx")?;
//! let grid = book.read_sheet("Data", None)?;
//! book.upload_sheet("Summary", &[row!["total", grid.len()]])?;
//! book.close();
//! # Ok::<(), sheetpatch::SheetpatchError>(())
//! ```

mod integrity;
mod options;

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

use crate::error::{Result, SheetpatchError};
use crate::export::provision::provision_shared_strings;
use crate::export::write_sheet;
use crate::package::Package;
use crate::parser::WorkbookMeta;
use crate::types::{CellValue, Grid, Relationship, SheetEntry, SheetId};
use crate::worksheet::Worksheet;

pub use integrity::{REQUIRED_FOLDERS, REQUIRED_PARTS};
pub use options::OpenOptions;

/// An open workbook package.
///
/// The package is held as an in-memory snapshot; no file handle stays open
/// between calls. Each mutation rewrites the file and swaps in the new
/// snapshot before returning.
///
/// After [`close`](Workbook::close) the metadata accessors return empty
/// values, [`read_sheet`](Workbook::read_sheet) and
/// [`read_all`](Workbook::read_all) return no grids and
/// [`upload_sheet`](Workbook::upload_sheet) does nothing.
pub struct Workbook {
    path: PathBuf,
    options: OpenOptions,
    package: Option<Package>,
    meta: WorkbookMeta,
    sheets: HashMap<String, Worksheet>,
}

impl Workbook {
    /// Open with [`OpenOptions::default`].
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::open_with(path, OpenOptions::default())
    }

    /// Validate, check and (optionally) provision the package at `path`.
    ///
    /// Fails with `Path` for a bad path, `StructuralCorruption` when required
    /// folders or parts are missing, and a parse error for malformed parts.
    pub fn open_with(path: impl AsRef<Path>, options: OpenOptions) -> Result<Self> {
        let path = path.as_ref();
        integrity::validate_path(path, options)?;

        let mut package = Package::open(path)?;
        integrity::check_integrity(&package)?;

        if options.provision_shared_strings {
            if let Some(next) = provision_shared_strings(&package)? {
                package = next;
            }
        }

        let meta = WorkbookMeta::read(&package)?;
        log::debug!(
            "opened workbook {} with {} sheets",
            path.display(),
            meta.sheets.len()
        );

        Ok(Self {
            path: path.to_path_buf(),
            options,
            package: Some(package),
            meta,
            sheets: HashMap::new(),
        })
    }

    /// Release the package snapshot. Calling it again has no effect.
    pub fn close(&mut self) {
        if self.package.take().is_some() {
            log::debug!("closed workbook {}", self.path.display());
        }
        self.meta = WorkbookMeta::default();
        self.sheets.clear();
    }

    pub fn is_open(&self) -> bool {
        self.package.is_some()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn options(&self) -> OpenOptions {
        self.options
    }

    /// The current package snapshot, `None` once closed.
    pub fn package(&self) -> Option<&Package> {
        self.package.as_ref()
    }

    // =========================================================================
    // Metadata
    // =========================================================================

    /// `dcterms:modified` from the core properties.
    pub fn modification_date(&self) -> Option<DateTime<Utc>> {
        self.meta.modification_date
    }

    /// `AppVersion` of the application that produced the file.
    pub fn version(&self) -> Option<&str> {
        self.meta.version.as_deref()
    }

    /// Sheet names in declaration order.
    pub fn sheet_names(&self) -> Vec<&str> {
        self.meta.sheets.iter().map(|s| s.name.as_str()).collect()
    }

    /// Declared sheets with their relationship ids.
    pub fn sheets(&self) -> &[SheetEntry] {
        &self.meta.sheets
    }

    pub fn sheet_count(&self) -> usize {
        self.meta.sheets.len()
    }

    /// Workbook relationships with their types.
    pub fn relationships(&self) -> &[Relationship] {
        &self.meta.relationships
    }

    /// Relationship id -> target, as written in the relationships part.
    pub fn relationship_targets(&self) -> BTreeMap<&str, &str> {
        self.meta
            .relationships
            .iter()
            .map(|r| (r.id.as_str(), r.target.as_str()))
            .collect()
    }

    // =========================================================================
    // Sheets
    // =========================================================================

    /// Canonical name of a sheet given by name or zero-based index.
    pub fn resolve<'a>(&self, id: impl Into<SheetId<'a>>) -> Result<String> {
        let id = id.into();
        let entry = match id {
            SheetId::Name(name) => self.meta.sheet(name),
            SheetId::Index(index) => self.meta.sheets.get(index),
        };
        entry
            .map(|e| e.name.clone())
            .ok_or_else(|| SheetpatchError::InvalidReference(format!("no sheet {id}")))
    }

    /// Package path of a sheet's part.
    pub fn sheet_path<'a>(&self, id: impl Into<SheetId<'a>>) -> Result<String> {
        let name = self.resolve(id)?;
        self.locate(&name).map(|(_, path)| path)
    }

    /// Relationship id and part path of a resolved sheet.
    fn locate(&self, name: &str) -> Result<(String, String)> {
        let entry = self
            .meta
            .sheet(name)
            .ok_or_else(|| SheetpatchError::InvalidReference(format!("no sheet {name}")))?;
        let rel = self.meta.relationship(&entry.relationship_id).ok_or_else(|| {
            SheetpatchError::StructuralCorruption(format!(
                "sheet '{name}' refers to missing relationship '{}'",
                entry.relationship_id
            ))
        })?;
        Ok((entry.relationship_id.clone(), rel.part_path()))
    }

    /// Read a sheet's grid.
    ///
    /// `headers` replaces the first row when its length equals the grid's
    /// column count and is ignored otherwise.
    pub fn read_sheet<'a>(
        &mut self,
        id: impl Into<SheetId<'a>>,
        headers: Option<&[&str]>,
    ) -> Result<Grid> {
        let Some(package) = &self.package else {
            return Ok(Vec::new());
        };
        let name = self.resolve(id)?;
        let (relationship_id, path) = self.locate(&name)?;

        let mut sheet = Worksheet::read(package, &name, &relationship_id, &path)?;
        if let Some(headers) = headers {
            sheet.apply_headers(headers);
        }
        let grid = sheet.grid().clone();
        self.sheets.insert(name, sheet);
        Ok(grid)
    }

    /// Every sheet's grid, in declaration order.
    pub fn read_all(&mut self) -> Result<Vec<Grid>> {
        let names: Vec<String> = self.meta.sheets.iter().map(|s| s.name.clone()).collect();
        names
            .iter()
            .map(|name| self.read_sheet(name, None))
            .collect()
    }

    /// Replace a sheet's grid with `grid`.
    ///
    /// Text cells are stored through the shared string table, literal cells
    /// as plain values, empty cells as bare references. The sheet part and
    /// the shared string part are committed in one rewrite. A grid that has
    /// rows but no columns fails with `InvalidAddress`.
    pub fn upload_sheet<'a>(
        &mut self,
        id: impl Into<SheetId<'a>>,
        grid: &[Vec<CellValue>],
    ) -> Result<()> {
        if !self.is_open() {
            return Ok(());
        }
        let name = self.resolve(id)?;
        let (relationship_id, path) = self.locate(&name)?;

        self.ensure_shared_strings()?;
        let Some(package) = &self.package else {
            return Ok(());
        };
        let next = write_sheet(package, &path, grid)?;
        self.package = Some(next);

        self.sheets.insert(
            name.clone(),
            Worksheet::with_grid(&name, &relationship_id, &path, grid),
        );
        log::debug!("uploaded {} rows to sheet '{name}'", grid.len());
        Ok(())
    }

    /// The worksheet produced by the last read or upload of a sheet.
    pub fn worksheet<'a>(&self, id: impl Into<SheetId<'a>>) -> Option<&Worksheet> {
        let name = self.resolve(id).ok()?;
        self.sheets.get(&name)
    }

    /// Provision the shared string part if opening did not.
    fn ensure_shared_strings(&mut self) -> Result<()> {
        let Some(package) = &self.package else {
            return Ok(());
        };
        if let Some(next) = provision_shared_strings(package)? {
            self.meta = WorkbookMeta::read(&next)?;
            self.package = Some(next);
        }
        Ok(())
    }
}

impl std::fmt::Debug for Workbook {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Workbook")
            .field("path", &self.path)
            .field("open", &self.is_open())
            .field("sheets", &self.sheet_names())
            .finish_non_exhaustive()
    }
}
