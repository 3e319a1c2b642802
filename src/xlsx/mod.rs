//! Minimal XLSX reading support.
//!
//! Only what mail-merge input needs: the sheet manifest, the shared
//! string table and dense cell grids. Styles, formulas and themes are
//! ignored.

mod shared_strings;
mod workbook;

pub use workbook::{CellValue, Workbook};
