//! Shared string table for XLSX workbooks.
//!
//! Worksheets store text cells as indexes into `xl/sharedStrings.xml`.
//! Plain and rich-text entries both collapse to their concatenated text
//! runs. Phonetic guide runs (`rPh`) are skipped so workbooks touched by
//! a Korean or Japanese IME read back only the visible text.

use quick_xml::Reader;
use quick_xml::events::{BytesText, Event};

use crate::common::{Error, Result};

/// Unescaped text of an event, with entity references resolved.
pub(crate) fn unescape_text(event: &BytesText<'_>) -> Result<String> {
    event
        .decode()
        .map(|text| text.into_owned())
        .map_err(|err| Error::XmlError(err.to_string()))
}

/// Resolved text of a general entity reference (the `name` between `&`
/// and `;`). Character references and the five predefined entities
/// resolve to their character; unknown names come back in their
/// original `&name;` form so no input bytes are dropped.
pub(crate) fn resolve_entity(name: &[u8]) -> Result<String> {
    let name = std::str::from_utf8(name).map_err(|err| Error::XmlError(err.to_string()))?;
    let resolved = match name {
        "amp" => '&',
        "lt" => '<',
        "gt" => '>',
        "apos" => '\'',
        "quot" => '"',
        _ => match parse_char_ref(name) {
            Some(ch) => ch,
            None => return Ok(format!("&{name};")),
        },
    };
    Ok(resolved.to_string())
}

/// Decimal `#NN` and hex `#xNN` character references.
fn parse_char_ref(name: &str) -> Option<char> {
    let digits = name.strip_prefix('#')?;
    let code = match digits.strip_prefix(['x', 'X']) {
        Some(hex) => u32::from_str_radix(hex, 16).ok()?,
        None => digits.parse().ok()?,
    };
    char::from_u32(code)
}

/// Parsed `xl/sharedStrings.xml` table.
#[derive(Debug, Default)]
pub(crate) struct SharedStrings {
    strings: Vec<String>,
}

impl SharedStrings {
    /// Parses the shared string table document.
    ///
    /// Text is taken as stored; no trimming, so padded strings survive
    /// the way the producer wrote them.
    pub(crate) fn parse(xml: &str) -> Result<Self> {
        let mut reader = Reader::from_reader(xml.as_bytes());
        let mut buf = Vec::with_capacity(256);
        let mut strings = Vec::new();
        let mut current = String::new();
        let mut in_item = false;
        let mut in_text = false;
        let mut in_phonetic = false;
        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(e)) => match e.local_name().as_ref() {
                    b"si" => {
                        in_item = true;
                        current.clear();
                    }
                    b"t" if in_item && !in_phonetic => in_text = true,
                    b"rPh" => in_phonetic = true,
                    _ => {}
                },
                Ok(Event::Empty(e)) if e.local_name().as_ref() == b"si" => {
                    strings.push(String::new());
                }
                Ok(Event::End(e)) => match e.local_name().as_ref() {
                    b"si" => {
                        in_item = false;
                        strings.push(std::mem::take(&mut current));
                    }
                    b"t" => in_text = false,
                    b"rPh" => in_phonetic = false,
                    _ => {}
                },
                Ok(Event::Text(e)) if in_text => current.push_str(&unescape_text(&e)?),
                Ok(Event::GeneralRef(e)) if in_text => {
                    current.push_str(&resolve_entity(e.as_ref())?);
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(Error::XmlError(e.to_string())),
                _ => {}
            }
            buf.clear();
        }
        Ok(Self { strings })
    }

    /// String at `index`, if the table has one.
    pub(crate) fn get(&self, index: usize) -> Option<&str> {
        self.strings.get(index).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_strings() {
        let xml = r#"<sst xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" count="2" uniqueCount="2"><si><t>읍면동</t></si><si><t>성명</t></si></sst>"#;
        let table = SharedStrings::parse(xml).unwrap();
        assert_eq!(table.get(0), Some("읍면동"));
        assert_eq!(table.get(1), Some("성명"));
        assert_eq!(table.get(2), None);
    }

    #[test]
    fn test_rich_text_runs_concatenate() {
        let xml = "<sst><si><r><rPr><b/></rPr><t >김</t></r><r><t>제동</t></r></si></sst>";
        let table = SharedStrings::parse(xml).unwrap();
        assert_eq!(table.get(0), Some("김제동"));
    }

    #[test]
    fn test_phonetic_runs_are_skipped() {
        let xml = "<sst><si><t>漢字</t><rPh sb=\"0\" eb=\"2\"><t>かんじ</t></rPh><phoneticPr fontId=\"1\"/></si></sst>";
        let table = SharedStrings::parse(xml).unwrap();
        assert_eq!(table.get(0), Some("漢字"));
    }

    #[test]
    fn test_empty_items_keep_their_index() {
        let xml = "<sst><si><t/></si><si/><si><t>셋</t></si></sst>";
        let table = SharedStrings::parse(xml).unwrap();
        assert_eq!(table.get(0), Some(""));
        assert_eq!(table.get(1), Some(""));
        assert_eq!(table.get(2), Some("셋"));
    }

    #[test]
    fn test_entities_unescape() {
        let xml = "<sst><si><t>A &amp; B &lt;C&gt;</t></si></sst>";
        let table = SharedStrings::parse(xml).unwrap();
        assert_eq!(table.get(0), Some("A & B <C>"));
    }

    #[test]
    fn test_character_references() {
        let xml = "<sst><si><t>&#44032;&#xB098;다</t></si></sst>";
        let table = SharedStrings::parse(xml).unwrap();
        assert_eq!(table.get(0), Some("가나다"));
    }

    #[test]
    fn test_resolve_entity() {
        assert_eq!(resolve_entity(b"amp").unwrap(), "&");
        assert_eq!(resolve_entity(b"quot").unwrap(), "\"");
        assert_eq!(resolve_entity(b"#38").unwrap(), "&");
        assert_eq!(resolve_entity(b"#xB098").unwrap(), "나");
        assert_eq!(resolve_entity(b"nbsp").unwrap(), "&nbsp;");
    }

    #[test]
    fn test_preserved_whitespace_survives() {
        let xml = "<sst><si><t xml:space=\"preserve\">  앞뒤  </t></si></sst>";
        let table = SharedStrings::parse(xml).unwrap();
        assert_eq!(table.get(0), Some("  앞뒤  "));
    }
}
