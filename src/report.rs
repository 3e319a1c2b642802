//! JSON mapping report for generated documents.
//!
//! Records which file was written for each applicant and the data
//! that went into it, for checking the merge afterwards.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::common::Result;
use crate::record::Applicant;

/// One generated document and the data written into it.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MappingEntry {
    pub file: PathBuf,
    pub business_id: String,
    pub data: Applicant,
}

/// Collects mapping entries and saves them as a pretty-printed array.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct FillReport {
    entries: Vec<MappingEntry>,
}

impl FillReport {
    pub fn push(&mut self, file: PathBuf, data: Applicant) {
        self.entries.push(MappingEntry {
            file,
            business_id: data.business_id.clone(),
            data,
        });
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(&mut writer, &self.entries)?;
        writer.flush()?;
        Ok(())
    }
}

/// Output filename for one applicant's document.
pub fn output_filename(applicant: &Applicant) -> String {
    format!("신청서_{}_{}.hwpx", applicant.name, applicant.business_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Parcel;

    fn sample_applicant() -> Applicant {
        Applicant {
            name: "강호태".to_string(),
            birth_date: "1970.12.31".to_string(),
            address: "전남 준양군 준양읍 12".to_string(),
            phone: "010-1234-5678".to_string(),
            business_id: "1234567".to_string(),
            account: None,
            parcels: vec![Parcel {
                township: "준양읍".to_string(),
                village: "학동리".to_string(),
                lot_number: "0096-0003".to_string(),
                area: 1500.0,
            }],
            total_area: 1500.0,
        }
    }

    #[test]
    fn test_output_filename() {
        assert_eq!(
            output_filename(&sample_applicant()),
            "신청서_강호태_1234567.hwpx"
        );
    }

    #[test]
    fn test_report_saves_a_json_array() {
        let mut report = FillReport::default();
        assert!(report.is_empty());
        report.push(
            PathBuf::from("output/신청서_강호태_1234567.hwpx"),
            sample_applicant(),
        );
        assert_eq!(report.len(), 1);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cell_mappings.json");
        report.save(&path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let json: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(json[0]["businessId"], "1234567");
        assert_eq!(json[0]["file"], "output/신청서_강호태_1234567.hwpx");
        assert_eq!(json[0]["data"]["성명"], "강호태");
        assert_eq!(json[0]["data"]["필지목록"][0]["벼재배면적"], 1500.0);
    }
}
