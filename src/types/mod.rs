//! Data types shared across the workbook, worksheet and export layers.

mod cell;
mod workbook;

pub use cell::*;
pub use workbook::*;
