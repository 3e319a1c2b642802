//! Workbook reader for Excel (.xlsx) files.
//!
//! Reads the workbook manifest, resolves worksheet relationships and
//! parses sheet data into a dense row-major grid. Cell references and
//! numeric payloads go through `atoi_simd` / `fast_float2` rather than
//! the stdlib parsers.

use std::collections::HashMap;
use std::fmt;
use std::fs::File;
use std::io::{BufReader, Cursor, Read, Seek};
use std::path::Path;

use log::warn;
use quick_xml::Reader;
use quick_xml::events::attributes::Attribute;
use quick_xml::events::{BytesStart, Event};
use zip::ZipArchive;
use zip::result::ZipError;

use super::shared_strings::{SharedStrings, resolve_entity, unescape_text};
use crate::common::{Error, Result};

/// Types of data that can be stored in a cell.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    /// Empty cell
    Empty,
    /// Boolean value
    Bool(bool),
    /// 64-bit signed integer
    Int(i64),
    /// 64-bit floating point number
    Float(f64),
    /// String value
    String(String),
    /// Error value
    Error(String),
}

impl CellValue {
    /// Numeric view of the cell, parsing strings when possible.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(value) => Some(*value as f64),
            Self::Float(value) => Some(*value),
            Self::String(value) => fast_float2::parse(value.trim()).ok(),
            _ => None,
        }
    }

    /// Whether the cell holds no data at all.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Empty => true,
            Self::String(value) => value.is_empty(),
            _ => false,
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => Ok(()),
            Self::Bool(value) => write!(f, "{value}"),
            Self::Int(value) => write!(f, "{value}"),
            Self::Float(value) => write!(f, "{value}"),
            Self::String(value) | Self::Error(value) => f.write_str(value),
        }
    }
}

/// How a `<c>` element declares its payload via the `t` attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CellType {
    Number,
    SharedString,
    InlineString,
    Boolean,
    Error,
    FormulaString,
}

impl CellType {
    fn from_attr(value: &[u8]) -> Self {
        match value {
            b"s" => Self::SharedString,
            b"str" => Self::FormulaString,
            b"inlineStr" => Self::InlineString,
            b"b" => Self::Boolean,
            b"e" => Self::Error,
            _ => Self::Number,
        }
    }
}

#[derive(Debug)]
struct Sheet {
    name: String,
    xml: String,
}

/// Read-only Excel workbook.
///
/// Worksheet XML is kept verbatim and parsed on demand by [`rows`],
/// so opening a workbook only pays for the manifest and the shared
/// string table.
///
/// [`rows`]: Workbook::rows
#[derive(Debug)]
pub struct Workbook {
    sheets: Vec<Sheet>,
    shared: SharedStrings,
}

impl Workbook {
    /// Open a workbook from a path.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file))
    }

    /// Open a workbook from an in-memory buffer.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Self::from_reader(Cursor::new(bytes))
    }

    /// Open a workbook from any seekable reader.
    pub fn from_reader<R: Read + Seek>(reader: R) -> Result<Self> {
        let mut archive = ZipArchive::new(reader)?;

        let workbook_xml = read_entry(&mut archive, "xl/workbook.xml")?;
        let rels_xml = read_entry(&mut archive, "xl/_rels/workbook.xml.rels")?;
        let shared = match read_entry_opt(&mut archive, "xl/sharedStrings.xml")? {
            Some(xml) => SharedStrings::parse(&xml)?,
            None => SharedStrings::default(),
        };

        let declarations = parse_sheet_declarations(&workbook_xml)?;
        let targets = parse_relationship_targets(&rels_xml)?;

        let mut sheets = Vec::with_capacity(declarations.len());
        for (name, relationship_id) in declarations {
            let Some(target) = targets.get(&relationship_id) else {
                warn!("sheet {name:?} references missing relationship {relationship_id}");
                continue;
            };
            let xml = read_entry(&mut archive, &sheet_entry_path(target))?;
            sheets.push(Sheet { name, xml });
        }

        Ok(Self { sheets, shared })
    }

    /// Worksheet names in workbook order.
    pub fn sheet_names(&self) -> Vec<&str> {
        self.sheets.iter().map(|sheet| sheet.name.as_str()).collect()
    }

    /// Parse a worksheet into a dense grid of cell values.
    ///
    /// Rows and columns skipped in the file are padded with
    /// [`CellValue::Empty`] so positional indexing works.
    pub fn rows(&self, sheet_name: &str) -> Result<Vec<Vec<CellValue>>> {
        let Some(sheet) = self.sheets.iter().find(|sheet| sheet.name == sheet_name) else {
            return Err(Error::SheetNotFound(format!(
                "{sheet_name} (available: {})",
                self.sheet_names().join(", ")
            )));
        };
        self.parse_worksheet(&sheet.xml)
    }

    fn parse_worksheet(&self, xml: &str) -> Result<Vec<Vec<CellValue>>> {
        let mut reader = Reader::from_reader(xml.as_bytes());
        let mut buf = Vec::new();

        let mut grid: Vec<Vec<CellValue>> = Vec::new();
        let mut row: Vec<CellValue> = Vec::new();
        // 1-based positions; `next_column` covers cells without an `r` attribute.
        let mut row_number = 0usize;
        let mut next_column = 1usize;
        let mut column = 1usize;
        let mut cell_type = CellType::Number;
        let mut raw = String::new();
        let mut in_value = false;
        let mut in_inline = false;
        let mut in_phonetic = false;

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(e)) => match e.local_name().as_ref() {
                    b"row" => {
                        row_number = row_attr(&e).unwrap_or(row_number + 1);
                        next_column = 1;
                    }
                    b"c" => {
                        let (reference, declared) = cell_attrs(&e);
                        column = reference.unwrap_or(next_column);
                        cell_type = declared;
                        raw.clear();
                    }
                    b"v" => in_value = true,
                    b"is" => in_inline = true,
                    b"t" if in_inline && !in_phonetic => in_value = true,
                    b"rPh" => in_phonetic = true,
                    _ => {}
                },
                Ok(Event::Empty(e)) => match e.local_name().as_ref() {
                    b"row" => {
                        row_number = row_attr(&e).unwrap_or(row_number + 1);
                        push_row(&mut grid, row_number, Vec::new());
                    }
                    b"c" => {
                        let (reference, _) = cell_attrs(&e);
                        next_column = reference.unwrap_or(next_column) + 1;
                    }
                    _ => {}
                },
                Ok(Event::End(e)) => match e.local_name().as_ref() {
                    b"row" => push_row(&mut grid, row_number, std::mem::take(&mut row)),
                    b"c" => {
                        let value = self.finish_cell(cell_type, &raw);
                        if !value.is_empty() {
                            place(&mut row, column, value);
                        }
                        next_column = column + 1;
                    }
                    b"v" | b"t" => in_value = false,
                    b"is" => in_inline = false,
                    b"rPh" => in_phonetic = false,
                    _ => {}
                },
                Ok(Event::Text(e)) if in_value => raw.push_str(&unescape_text(&e)?),
                Ok(Event::GeneralRef(e)) if in_value => raw.push_str(&resolve_entity(e.as_ref())?),
                Ok(Event::Eof) => break,
                Err(e) => return Err(Error::XmlError(e.to_string())),
                _ => {}
            }
            buf.clear();
        }

        Ok(grid)
    }

    fn finish_cell(&self, cell_type: CellType, raw: &str) -> CellValue {
        match cell_type {
            CellType::SharedString => match atoi_simd::parse::<usize>(raw.as_bytes()) {
                Ok(index) => self
                    .shared
                    .get(index)
                    .map_or(CellValue::Empty, |text| CellValue::String(text.to_string())),
                Err(_) => CellValue::Empty,
            },
            CellType::InlineString | CellType::FormulaString => {
                if raw.is_empty() {
                    CellValue::Empty
                } else {
                    CellValue::String(raw.to_string())
                }
            }
            CellType::Boolean => match raw {
                "1" => CellValue::Bool(true),
                "0" => CellValue::Bool(false),
                _ => CellValue::Error("invalid boolean value".to_string()),
            },
            CellType::Error => CellValue::Error(raw.to_string()),
            CellType::Number => parse_number(raw),
        }
    }
}

fn parse_number(raw: &str) -> CellValue {
    if raw.is_empty() {
        return CellValue::Empty;
    }
    if let Ok(value) = atoi_simd::parse(raw.as_bytes()) {
        return CellValue::Int(value);
    }
    match fast_float2::parse(raw) {
        Ok(value) => CellValue::Float(value),
        Err(_) => CellValue::String(raw.to_string()),
    }
}

fn row_attr(e: &BytesStart<'_>) -> Option<usize> {
    e.attributes()
        .flatten()
        .find(|attr| attr.key.as_ref() == b"r")
        .and_then(|attr| atoi_simd::parse(attr.value.as_ref()).ok())
}

fn cell_attrs(e: &BytesStart<'_>) -> (Option<usize>, CellType) {
    let mut column = None;
    let mut cell_type = CellType::Number;
    for attr in e.attributes().flatten() {
        match attr.key.as_ref() {
            b"r" => {
                if let Ok(reference) = std::str::from_utf8(&attr.value) {
                    column = parse_reference(reference).map(|(col, _)| col);
                }
            }
            b"t" => cell_type = CellType::from_attr(&attr.value),
            _ => {}
        }
    }
    (column, cell_type)
}

/// Convert an A1-style reference to 1-based (column, row) coordinates.
fn parse_reference(reference: &str) -> Option<(usize, usize)> {
    let bytes = reference.as_bytes();
    let split = bytes.iter().position(|byte| byte.is_ascii_digit())?;
    if split == 0 {
        return None;
    }

    let mut column = 0usize;
    for &byte in &bytes[..split] {
        if !byte.is_ascii_alphabetic() {
            return None;
        }
        column = column * 26 + (byte.to_ascii_uppercase() - b'A' + 1) as usize;
    }

    let row = atoi_simd::parse(&bytes[split..]).ok()?;
    Some((column, row))
}

fn push_row(grid: &mut Vec<Vec<CellValue>>, number: usize, cells: Vec<CellValue>) {
    if number == 0 {
        return;
    }
    while grid.len() < number - 1 {
        grid.push(Vec::new());
    }
    if grid.len() == number - 1 {
        grid.push(cells);
    } else if let Some(slot) = grid.get_mut(number - 1) {
        *slot = cells;
    }
}

fn place(row: &mut Vec<CellValue>, column: usize, value: CellValue) {
    if column == 0 {
        return;
    }
    while row.len() < column {
        row.push(CellValue::Empty);
    }
    row[column - 1] = value;
}

fn parse_sheet_declarations(xml: &str) -> Result<Vec<(String, String)>> {
    let mut reader = Reader::from_reader(xml.as_bytes());
    let mut buf = Vec::new();
    let mut declarations = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e)) => {
                if e.local_name().as_ref() == b"sheet" {
                    let mut name = None;
                    let mut relationship_id = None;
                    for attr in e.attributes().flatten() {
                        if attr.key.as_ref() == b"name" {
                            name = Some(attr_string(&attr)?);
                        } else if attr.key.local_name().as_ref() == b"id" {
                            relationship_id = Some(attr_string(&attr)?);
                        }
                    }
                    if let (Some(name), Some(relationship_id)) = (name, relationship_id) {
                        declarations.push((name, relationship_id));
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(Error::XmlError(e.to_string())),
            _ => {}
        }
        buf.clear();
    }

    Ok(declarations)
}

fn parse_relationship_targets(xml: &str) -> Result<HashMap<String, String>> {
    let mut reader = Reader::from_reader(xml.as_bytes());
    let mut buf = Vec::new();
    let mut targets = HashMap::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e)) => {
                if e.local_name().as_ref() == b"Relationship" {
                    let mut id = None;
                    let mut target = None;
                    for attr in e.attributes().flatten() {
                        match attr.key.as_ref() {
                            b"Id" => id = Some(attr_string(&attr)?),
                            b"Target" => target = Some(attr_string(&attr)?),
                            _ => {}
                        }
                    }
                    if let (Some(id), Some(target)) = (id, target) {
                        targets.insert(id, target);
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(Error::XmlError(e.to_string())),
            _ => {}
        }
        buf.clear();
    }

    Ok(targets)
}

fn attr_string(attr: &Attribute<'_>) -> Result<String> {
    let value = attr
        .unescape_value()
        .map_err(|err| Error::XmlError(err.to_string()))?;
    Ok(value.into_owned())
}

/// Relationship targets are relative to `xl/` unless they start with `/`.
fn sheet_entry_path(target: &str) -> String {
    match target.strip_prefix('/') {
        Some(absolute) => absolute.to_string(),
        None => format!("xl/{target}"),
    }
}

fn read_entry<R: Read + Seek>(archive: &mut ZipArchive<R>, name: &str) -> Result<String> {
    match read_entry_opt(archive, name)? {
        Some(content) => Ok(content),
        None => Err(Error::EntryNotFound(name.to_string())),
    }
}

fn read_entry_opt<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    name: &str,
) -> Result<Option<String>> {
    let mut file = match archive.by_name(name) {
        Ok(file) => file,
        Err(ZipError::FileNotFound) => return Ok(None),
        Err(err) => return Err(err.into()),
    };
    let mut content = String::new();
    file.read_to_string(&mut content)?;
    Ok(Some(content))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::ZipWriter;
    use zip::write::SimpleFileOptions;

    const SHEET_NAME: &str = "메일머지 작업전(전략작물,타작물추가)";

    const WORKBOOK_XML: &str = concat!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
        r#"<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main""#,
        r#" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">"#,
        r#"<sheets>"#,
        r#"<sheet name="메일머지 작업전(전략작물,타작물추가)" sheetId="1" r:id="rId1"/>"#,
        r#"<sheet name="기타" sheetId="2" r:id="rId2"/>"#,
        r#"</sheets>"#,
        r#"</workbook>"#,
    );

    const RELS_XML: &str = concat!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
        r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
        r#"<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/>"#,
        r#"<Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet2.xml"/>"#,
        r#"</Relationships>"#,
    );

    const SHARED_XML: &str = concat!(
        r#"<sst xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" count="3" uniqueCount="3">"#,
        r#"<si><t>읍면동</t></si>"#,
        r#"<si><t>홍길동</t></si>"#,
        r#"<si><t>서울 &amp; 부산</t></si>"#,
        r#"</sst>"#,
    );

    const SHEET1_XML: &str = concat!(
        r#"<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">"#,
        r#"<sheetData>"#,
        r#"<row r="1">"#,
        r#"<c r="A1" t="s"><v>0</v></c>"#,
        r#"<c r="B1" t="s"><v>1</v></c>"#,
        r#"<c r="C1"><v>42</v></c>"#,
        r#"<c r="D1"><v>1234.5</v></c>"#,
        r#"</row>"#,
        r#"<row r="2"/>"#,
        r#"<row r="4">"#,
        r#"<c r="A4" t="s"><v>2</v></c>"#,
        r#"<c r="D4" t="b"><v>1</v></c>"#,
        r#"<c r="E4" t="inlineStr"><is><t>그대로</t></is></c>"#,
        r#"</row>"#,
        r#"</sheetData>"#,
        r#"</worksheet>"#,
    );

    const SHEET2_XML: &str = concat!(
        r#"<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">"#,
        r#"<sheetData>"#,
        r#"<row><c><v>7</v></c><c><v>8</v></c></row>"#,
        r#"<row><c t="str"><v>SUM</v></c></row>"#,
        r#"</sheetData>"#,
        r#"</worksheet>"#,
    );

    fn build_archive(entries: &[(&str, &str)]) -> Vec<u8> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default();
        for (name, content) in entries {
            writer.start_file(*name, options).unwrap();
            writer.write_all(content.as_bytes()).unwrap();
        }
        writer.finish().unwrap().into_inner()
    }

    fn sample_workbook() -> Workbook {
        let bytes = build_archive(&[
            ("xl/workbook.xml", WORKBOOK_XML),
            ("xl/_rels/workbook.xml.rels", RELS_XML),
            ("xl/sharedStrings.xml", SHARED_XML),
            ("xl/worksheets/sheet1.xml", SHEET1_XML),
            ("xl/worksheets/sheet2.xml", SHEET2_XML),
        ]);
        Workbook::from_bytes(&bytes).unwrap()
    }

    #[test]
    fn test_sheet_names_in_workbook_order() {
        let workbook = sample_workbook();
        assert_eq!(workbook.sheet_names(), vec![SHEET_NAME, "기타"]);
    }

    #[test]
    fn test_rows_resolve_types_and_shared_strings() {
        let workbook = sample_workbook();
        let rows = workbook.rows(SHEET_NAME).unwrap();

        assert_eq!(rows.len(), 4);
        assert_eq!(rows[0][0], CellValue::String("읍면동".to_string()));
        assert_eq!(rows[0][1], CellValue::String("홍길동".to_string()));
        assert_eq!(rows[0][2], CellValue::Int(42));
        assert_eq!(rows[0][3], CellValue::Float(1234.5));
    }

    #[test]
    fn test_missing_rows_and_columns_are_padded() {
        let workbook = sample_workbook();
        let rows = workbook.rows(SHEET_NAME).unwrap();

        // Self-closing row 2 and absent row 3 both come back empty.
        assert!(rows[1].is_empty());
        assert!(rows[2].is_empty());

        // Row 4 skips columns B and C.
        assert_eq!(rows[3][0], CellValue::String("서울 & 부산".to_string()));
        assert_eq!(rows[3][1], CellValue::Empty);
        assert_eq!(rows[3][2], CellValue::Empty);
        assert_eq!(rows[3][3], CellValue::Bool(true));
        assert_eq!(rows[3][4], CellValue::String("그대로".to_string()));
    }

    #[test]
    fn test_cells_without_references_use_running_positions() {
        let workbook = sample_workbook();
        let rows = workbook.rows("기타").unwrap();

        assert_eq!(rows[0], vec![CellValue::Int(7), CellValue::Int(8)]);
        assert_eq!(rows[1], vec![CellValue::String("SUM".to_string())]);
    }

    #[test]
    fn test_unknown_sheet_name_lists_alternatives() {
        let workbook = sample_workbook();
        let err = workbook.rows("없는 시트").unwrap_err();
        let Error::SheetNotFound(message) = err else {
            panic!("expected SheetNotFound, got {err:?}");
        };
        assert!(message.starts_with("없는 시트"));
        assert!(message.contains(SHEET_NAME));
        assert!(message.contains("기타"));
    }

    #[test]
    fn test_workbook_without_shared_strings() {
        let bytes = build_archive(&[
            ("xl/workbook.xml", WORKBOOK_XML),
            ("xl/_rels/workbook.xml.rels", RELS_XML),
            ("xl/worksheets/sheet1.xml", SHEET2_XML),
            ("xl/worksheets/sheet2.xml", SHEET2_XML),
        ]);
        let workbook = Workbook::from_bytes(&bytes).unwrap();
        let rows = workbook.rows(SHEET_NAME).unwrap();
        assert_eq!(rows[0][0], CellValue::Int(7));
    }

    #[test]
    fn test_missing_manifest_entry() {
        let bytes = build_archive(&[("xl/workbook.xml", WORKBOOK_XML)]);
        let err = Workbook::from_bytes(&bytes).unwrap_err();
        assert!(matches!(err, Error::EntryNotFound(name) if name == "xl/_rels/workbook.xml.rels"));
    }

    #[test]
    fn test_parse_reference() {
        assert_eq!(parse_reference("A1"), Some((1, 1)));
        assert_eq!(parse_reference("L7"), Some((12, 7)));
        assert_eq!(parse_reference("AB12"), Some((28, 12)));
        assert_eq!(parse_reference("123"), None);
        assert_eq!(parse_reference(""), None);
    }

    #[test]
    fn test_cell_value_display_and_views() {
        assert_eq!(CellValue::Empty.to_string(), "");
        assert_eq!(CellValue::Int(215).to_string(), "215");
        assert_eq!(CellValue::Float(1234.5).to_string(), "1234.5");
        assert_eq!(CellValue::Float(1234.0).to_string(), "1234");
        assert_eq!(CellValue::Bool(true).to_string(), "true");

        assert_eq!(CellValue::Int(3).as_f64(), Some(3.0));
        assert_eq!(CellValue::String(" 2.5 ".to_string()).as_f64(), Some(2.5));
        assert_eq!(CellValue::String("면적".to_string()).as_f64(), None);
        assert!(CellValue::Empty.is_empty());
        assert!(!CellValue::Int(0).is_empty());
    }
}
