//! Cell layout of the rice subsidy application form.
//!
//! The form is a fixed HWPX template. Applicant identity goes into
//! named cells of the first table, parcels fill a run of rows, and a
//! backpage variant adds a second parcel table for large growers.

use std::borrow::Cow;

use log::debug;

use crate::format;
use crate::markup::{CellAddress, CellEdit, SignatureLine, TableEditor};
use crate::record::Applicant;

/// Written into the account cell when no account number is known.
pub const ACCOUNT_PLACEHOLDER: &str = "계좌번호 미기입";

/// Parcel rows on the first page.
pub const SINGLE_PAGE_SLOTS: usize = 12;

/// Parcel rows on the backpage annex table.
pub const BACKPAGE_SLOTS: usize = 27;

// Column positions inside a parcel row.
const TOWNSHIP_COL: usize = 0;
const VILLAGE_COL: usize = 1;
const LOT_COL: usize = 2;
const AREA_COL: usize = 6;

/// A run of form rows that each hold one parcel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParcelTable {
    pub table: usize,
    pub first_row: usize,
    pub slots: usize,
}

/// Where each piece of applicant data lands in the template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormLayout {
    pub name: CellAddress,
    pub birth_date: CellAddress,
    pub address: CellAddress,
    pub phone: CellAddress,
    pub parcel_tables: Vec<ParcelTable>,
    pub total_area: CellAddress,
    pub account: CellAddress,
    pub account_holder: CellAddress,
}

impl FormLayout {
    /// Layout of the one-page template.
    pub fn single_page() -> Self {
        Self {
            name: CellAddress::new(0, 1, 2),
            birth_date: CellAddress::new(0, 1, 4),
            address: CellAddress::new(0, 2, 1),
            phone: CellAddress::new(0, 3, 1),
            parcel_tables: vec![ParcelTable {
                table: 0,
                first_row: 6,
                slots: SINGLE_PAGE_SLOTS,
            }],
            total_area: CellAddress::new(0, 18, 3),
            account: CellAddress::new(0, 19, 3),
            account_holder: CellAddress::new(0, 19, 5),
        }
    }

    /// Layout of the template with the parcel annex page.
    pub fn with_backpage() -> Self {
        let mut layout = Self::single_page();
        layout.parcel_tables.push(ParcelTable {
            table: 1,
            first_row: 2,
            slots: BACKPAGE_SLOTS,
        });
        layout
    }

    /// How many parcels this layout can hold.
    pub fn capacity(&self) -> usize {
        self.parcel_tables.iter().map(|table| table.slots).sum()
    }

    /// Cell edits that write `applicant` into the form.
    ///
    /// Parcel rows beyond the applicant's parcel list are left alone,
    /// and parcels beyond [`capacity`] never produce an edit.
    ///
    /// [`capacity`]: FormLayout::capacity
    pub fn edits_for(&self, applicant: &Applicant) -> Vec<CellEdit> {
        let mut edits = vec![
            CellEdit::new(self.name, &applicant.name),
            CellEdit::new(self.birth_date, &applicant.birth_date),
            CellEdit::new(self.address, &applicant.address),
            CellEdit::new(self.phone, &applicant.phone),
        ];

        let mut parcels = applicant.parcels.iter();
        'tables: for parcel_table in &self.parcel_tables {
            for slot in 0..parcel_table.slots {
                let Some(parcel) = parcels.next() else {
                    break 'tables;
                };
                let row = parcel_table.first_row + slot;
                let at = |cell| CellAddress::new(parcel_table.table, row, cell);
                edits.push(CellEdit::new(at(TOWNSHIP_COL), &parcel.township));
                edits.push(CellEdit::new(at(VILLAGE_COL), &parcel.village));
                edits.push(CellEdit::new(at(LOT_COL), &parcel.lot_number));
                edits.push(CellEdit::new(at(AREA_COL), format::area(parcel.area)));
            }
        }

        edits.push(CellEdit::new(
            self.total_area,
            format::area(applicant.total_area),
        ));
        edits.push(CellEdit::new(
            self.account,
            applicant.account.as_deref().unwrap_or(ACCOUNT_PLACEHOLDER),
        ));
        edits.push(CellEdit::new(self.account_holder, &applicant.name));

        edits
    }

    /// Write `applicant` into a section body and sign it.
    pub fn fill(&self, editor: &TableEditor, body: String, applicant: &Applicant) -> String {
        let mut body = editor.apply_edits(body, &self.edits_for(applicant));
        match SignatureLine::default().fill(&body, &applicant.name) {
            Cow::Owned(updated) => body = updated,
            Cow::Borrowed(_) => debug!("no signature line found for {}", applicant.name),
        }
        body
    }
}

/// Which template file a parcel count needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateKind {
    SinglePage,
    WithBackpage,
}

impl TemplateKind {
    /// Parcels beyond the first page force the backpage template.
    pub fn select(parcel_count: usize) -> Self {
        if parcel_count > SINGLE_PAGE_SLOTS {
            Self::WithBackpage
        } else {
            Self::SinglePage
        }
    }

    pub fn layout(self) -> FormLayout {
        match self {
            Self::SinglePage => FormLayout::single_page(),
            Self::WithBackpage => FormLayout::with_backpage(),
        }
    }
}
