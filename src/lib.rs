//! sheetpatch - read and rewrite XLSX sheet grids at the package level
//!
//! Works directly on the zip container and its XML parts instead of going
//! through a spreadsheet object model:
//! - Open a package and validate its structure
//! - List sheets, relationships, modification date and producer version
//! - Read a sheet as a rectangular grid of strings
//! - Replace a sheet's grid, deduplicating text through the shared string table
//! - Every other part is carried over byte-identical; each write is atomic
//!
//! # Usage
//!
//! ```no_run
//! use sheetpatch::{row, Workbook};
//!
//! let mut book = Workbook::open("inventory.xlsx")?;
//! for name in book.sheet_names() {
//!     println!("{name}");
//! }
//! book.upload_sheet(0usize, &[row!["item", "qty"], row!["bolts", 120]])?;
//! assert_eq!(book.read_sheet(0usize, None)?[1], ["bolts", "120"]);
//! # Ok::<(), sheetpatch::SheetpatchError>(())
//! ```

pub mod cell_ref;
pub mod error;
pub mod markup;
pub mod namespaces;
pub mod package;
pub mod shared_strings;
pub mod types;
pub mod workbook;
pub mod worksheet;

mod export;
mod parser;
mod xml_helpers;

pub use error::{Result, SheetpatchError};
pub use package::Package;
pub use shared_strings::SharedStringTable;
pub use types::*;
pub use workbook::{OpenOptions, Workbook};
pub use worksheet::Worksheet;

/// Get the library version
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
