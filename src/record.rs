//! Row model for the parcel spreadsheet.
//!
//! The input worksheet lists one rice parcel per row, keyed by the
//! grower's business registration number. Rows are grouped by that id
//! and folded into one [`Applicant`] per grower.

use indexmap::IndexMap;
use log::{debug, warn};
use serde::Serialize;

use crate::format;
use crate::xlsx::CellValue;

/// Column layout of the parcel worksheet.
mod col {
    pub const DISTRICT: usize = 0;
    pub const VILLAGE_NAME: usize = 1;
    pub const BIRTH_DATE: usize = 2;
    pub const BUSINESS_ID: usize = 3;
    pub const NAME: usize = 4;
    pub const ADDRESS: usize = 5;
    pub const TOWNSHIP: usize = 6;
    pub const VILLAGE: usize = 7;
    pub const LOT_MAIN: usize = 8;
    pub const LOT_SUB: usize = 9;
    pub const AREA: usize = 10;
    pub const PHONE: usize = 11;
}

/// One data row from the parcel worksheet, as raw text.
///
/// Formatting (birth dates, phone numbers, lot numbers) happens when
/// rows are folded into an [`Applicant`], not here.
#[derive(Debug, Clone, PartialEq)]
pub struct ParcelRow {
    pub district: String,
    pub village_name: String,
    pub birth_date: String,
    pub business_id: String,
    pub name: String,
    pub address: String,
    pub township: String,
    pub village: String,
    pub lot_main: String,
    pub lot_sub: String,
    pub area: f64,
    pub phone: String,
}

/// One parcel as it appears on the application form.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Parcel {
    #[serde(rename = "읍면")]
    pub township: String,
    #[serde(rename = "리")]
    pub village: String,
    #[serde(rename = "지번")]
    pub lot_number: String,
    #[serde(rename = "벼재배면적")]
    pub area: f64,
}

/// Everything the form needs for one grower.
///
/// Serializes with the Korean field names used by the mapping report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Applicant {
    #[serde(rename = "성명")]
    pub name: String,
    #[serde(rename = "생년월일")]
    pub birth_date: String,
    #[serde(rename = "주소")]
    pub address: String,
    #[serde(rename = "연락처")]
    pub phone: String,
    #[serde(rename = "경영체등록번호")]
    pub business_id: String,
    #[serde(rename = "계좌번호", skip_serializing_if = "Option::is_none")]
    pub account: Option<String>,
    #[serde(rename = "필지목록")]
    pub parcels: Vec<Parcel>,
    #[serde(rename = "합계")]
    pub total_area: f64,
}

impl Applicant {
    /// Fold one grower's parcel rows into form data.
    ///
    /// Identity fields come from the first row. At most `max_parcels`
    /// parcels are kept and the area total covers only the kept ones.
    /// Returns `None` for an empty group.
    pub fn from_rows(rows: &[ParcelRow], max_parcels: usize) -> Option<Self> {
        let first = rows.first()?;

        if rows.len() > max_parcels {
            warn!(
                "{} has {} parcels but the form holds {max_parcels}, extras dropped",
                first.name,
                rows.len()
            );
        }

        let mut parcels = Vec::with_capacity(rows.len().min(max_parcels));
        let mut total_area = 0.0;
        for row in rows.iter().take(max_parcels) {
            total_area += row.area;
            parcels.push(Parcel {
                township: row.township.clone(),
                village: row.village.clone(),
                lot_number: format::lot_number(&row.lot_main, &row.lot_sub),
                area: row.area,
            });
        }

        Some(Self {
            name: first.name.clone(),
            birth_date: format::birth_date(&first.birth_date),
            address: first.address.clone(),
            phone: format::phone(&first.phone),
            business_id: first.business_id.clone(),
            account: None,
            parcels,
            total_area,
        })
    }
}

/// Read parcel rows out of a worksheet grid.
///
/// The first row is the header. Rows without a business registration
/// number are skipped.
pub fn parcel_rows(rows: &[Vec<CellValue>]) -> Vec<ParcelRow> {
    let mut parcels = Vec::new();
    for row in rows.iter().skip(1) {
        let business_id = cell_text(row, col::BUSINESS_ID);
        if business_id.is_empty() {
            debug!("skipping row without a business id");
            continue;
        }
        parcels.push(ParcelRow {
            district: cell_text(row, col::DISTRICT),
            village_name: cell_text(row, col::VILLAGE_NAME),
            birth_date: cell_text(row, col::BIRTH_DATE),
            business_id,
            name: cell_text(row, col::NAME),
            address: cell_text(row, col::ADDRESS),
            township: cell_text(row, col::TOWNSHIP),
            village: fix_village_name(cell_text(row, col::VILLAGE)),
            lot_main: cell_text(row, col::LOT_MAIN),
            lot_sub: cell_text(row, col::LOT_SUB),
            area: cell_area(row, col::AREA),
            phone: cell_text(row, col::PHONE),
        });
    }
    parcels
}

/// Group parcel rows by business registration number.
///
/// Groups keep the order in which each id first appears in the sheet.
pub fn group_by_business(parcels: Vec<ParcelRow>) -> IndexMap<String, Vec<ParcelRow>> {
    let mut groups: IndexMap<String, Vec<ParcelRow>> = IndexMap::new();
    for parcel in parcels {
        groups
            .entry(parcel.business_id.clone())
            .or_default()
            .push(parcel);
    }
    groups
}

fn cell_text(row: &[CellValue], column: usize) -> String {
    row.get(column).map_or_else(String::new, ToString::to_string)
}

fn cell_area(row: &[CellValue], column: usize) -> f64 {
    row.get(column).and_then(CellValue::as_f64).unwrap_or(0.0)
}

// The source sheet misspells one village name.
fn fix_village_name(name: String) -> String {
    if name == "마랑리" {
        "마룡리".to_string()
    } else {
        name
    }
}
