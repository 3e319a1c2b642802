//! Structural tag vocabulary for positional cell addressing.
//!
//! A [`TagSet`] names the five element kinds the rewrite engine scans for.
//! Search strings are precomputed once per tag so the scanners run plain
//! byte searches without per-call formatting.

/// A qualified element name with its precomputed search strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    name: String,
    open: String,
    close: String,
}

impl Tag {
    /// Creates a tag for a qualified element name such as `hp:tc`.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let open = format!("<{name}");
        let close = format!("</{name}>");
        Self { name, open, close }
    }

    /// Element name without angle brackets.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Start-tag prefix `<name`, shared by every opening form of the element.
    #[inline]
    pub(crate) fn open_prefix(&self) -> &str {
        &self.open
    }

    /// The exact end tag `</name>`.
    #[inline]
    pub(crate) fn close_tag(&self) -> &str {
        &self.close
    }
}

/// The element names that make up one table dialect.
///
/// A dialect is any markup where tables nest rows, rows nest cells, and
/// cells hold runs with text nodes. Custom vocabularies are built from
/// five [`Tag::new`] calls; two stock presets cover the common cases.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagSet {
    /// Table element containing rows.
    pub table: Tag,
    /// Row element containing cells.
    pub row: Tag,
    /// Cell element containing runs.
    pub cell: Tag,
    /// Run element containing text nodes.
    pub run: Tag,
    /// Text node element carrying the character payload.
    pub text: Tag,
}

impl TagSet {
    /// Tag names used by OWPML section documents inside HWPX packages.
    pub fn hwpx() -> Self {
        Self {
            table: Tag::new("hp:tbl"),
            row: Tag::new("hp:tr"),
            cell: Tag::new("hp:tc"),
            run: Tag::new("hp:run"),
            text: Tag::new("hp:t"),
        }
    }

    /// Tag names used by WordprocessingML document bodies.
    pub fn wordml() -> Self {
        Self {
            table: Tag::new("w:tbl"),
            row: Tag::new("w:tr"),
            cell: Tag::new("w:tc"),
            run: Tag::new("w:r"),
            text: Tag::new("w:t"),
        }
    }
}

impl Default for TagSet {
    fn default() -> Self {
        Self::hwpx()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_precomputes_search_strings() {
        let tag = Tag::new("hp:tc");
        assert_eq!(tag.name(), "hp:tc");
        assert_eq!(tag.open_prefix(), "<hp:tc");
        assert_eq!(tag.close_tag(), "</hp:tc>");
    }

    #[test]
    fn test_default_tag_set_is_hwpx() {
        let tags = TagSet::default();
        assert_eq!(tags.table.name(), "hp:tbl");
        assert_eq!(tags.run.name(), "hp:run");
        assert_eq!(tags.text.name(), "hp:t");
    }

    #[test]
    fn test_wordml_tag_set() {
        let tags = TagSet::wordml();
        assert_eq!(tags.row.open_prefix(), "<w:tr");
        assert_eq!(tags.cell.close_tag(), "</w:tc>");
    }

    #[test]
    fn test_custom_tag_set() {
        let tags = TagSet {
            table: Tag::new("table"),
            row: Tag::new("tr"),
            cell: Tag::new("td"),
            run: Tag::new("span"),
            text: Tag::new("b"),
        };
        assert_eq!(tags.cell.open_prefix(), "<td");
        assert_eq!(tags.cell.close_tag(), "</td>");
    }
}
