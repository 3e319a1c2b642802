//! Maesil - positional mail merge for HWPX application forms
//!
//! This library fills Hangul word processor (.hwpx) form templates from
//! spreadsheet data. Cells are addressed by position (table, row, cell)
//! and new text is spliced directly into the section XML, so everything
//! the edit does not touch survives byte for byte. That matters for HWPX
//! templates, whose layout elements carry pre-computed geometry that a
//! parse-and-reserialize round trip would disturb.
//!
//! # Features
//!
//! - **Byte-preserving edits**: Text is written into cells without
//!   re-serializing the document
//! - **Positional addressing**: Cells are found by counting tables, rows
//!   and cells, never by id
//! - **Silent no-ops**: Out-of-range addresses and cells with no usable
//!   text slot leave the document unchanged
//! - **XLSX input**: Reads the parcel worksheet straight out of the
//!   spreadsheet file
//! - **Form layouts**: Ships the cell map of the rice subsidy
//!   application form, with a single-page and an annex variant
//!
//! # Example - Rewriting one cell
//!
//! ```
//! use maesil::markup::{CellAddress, TableEditor};
//!
//! let editor = TableEditor::hwpx();
//! let body = "<hp:tbl><hp:tr><hp:tc><hp:p><hp:run><hp:t>old</hp:t></hp:run></hp:p></hp:tc></hp:tr></hp:tbl>";
//!
//! let updated = editor.set_table_cell(body, CellAddress::new(0, 0, 0), "new");
//! assert_eq!(
//!     updated,
//!     "<hp:tbl><hp:tr><hp:tc><hp:p><hp:run><hp:t>new</hp:t></hp:run></hp:p></hp:tc></hp:tr></hp:tbl>"
//! );
//!
//! // Addresses that do not exist are silent no-ops.
//! assert_eq!(editor.set_table_cell(body, CellAddress::new(5, 0, 0), "new"), body);
//! ```
//!
//! # Example - Filling a form from a worksheet
//!
//! ```no_run
//! use maesil::hwpx::{Package, TemplateKind};
//! use maesil::markup::TableEditor;
//! use maesil::record::{self, Applicant};
//! use maesil::report::output_filename;
//! use maesil::xlsx::Workbook;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let workbook = Workbook::open("필지정보.xlsx")?;
//! let rows = workbook.rows("메일머지 작업전(전략작물,타작물추가)")?;
//! let groups = record::group_by_business(record::parcel_rows(&rows));
//!
//! let editor = TableEditor::hwpx();
//! for parcels in groups.values() {
//!     let layout = TemplateKind::select(parcels.len()).layout();
//!     let Some(applicant) = Applicant::from_rows(parcels, layout.capacity()) else {
//!         continue;
//!     };
//!
//!     let mut package = Package::open("Form.hwpx")?;
//!     let body = package.section_xml(0)?;
//!     package.set_section_xml(0, layout.fill(&editor, body, &applicant));
//!     package.save(format!("output/{}", output_filename(&applicant)))?;
//! }
//! # Ok(())
//! # }
//! ```

/// Shared error and result types
pub mod common;

/// Formatting of spreadsheet fields into form text
pub mod format;

/// HWPX package IO and the application form layout
pub mod hwpx;

/// Positional cell addressing and byte-preserving markup edits
pub mod markup;

/// Parcel row model, grouping and applicant assembly
pub mod record;

/// JSON mapping report for generated documents
pub mod report;

/// Minimal XLSX reading
pub mod xlsx;

// Re-export commonly used types for convenience
pub use common::{Error, Result};
pub use hwpx::{FormLayout, Package, TemplateKind};
pub use markup::{CellAddress, CellEdit, CellShape, SignatureLine, TableEditor, Tag, TagSet};
pub use record::{Applicant, Parcel};
pub use report::FillReport;
pub use xlsx::{CellValue, Workbook};
