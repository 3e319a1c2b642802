//! Positional cell addressing over raw markup.
//!
//! [`TableEditor`] drills from a document body down to one cell by
//! counting structural elements: table N within the body, row R within
//! that table, cell C within that row. Out-of-range indexes,
//! unrecognized cell shapes, and malformed regions all leave the input
//! unchanged; a batch of edits never fails loudly halfway through a
//! document.

use std::borrow::Cow;

use log::debug;

use super::cell::{self, CellShape};
use super::segment::{self, Segment};
use super::tags::{Tag, TagSet};

/// Zero-based position of one cell in a document body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellAddress {
    /// Table index within the body.
    pub table: usize,
    /// Row index within the table.
    pub row: usize,
    /// Cell index within the row.
    pub cell: usize,
}

impl CellAddress {
    /// Creates an address from `(table, row, cell)` indexes.
    pub const fn new(table: usize, row: usize, cell: usize) -> Self {
        Self { table, row, cell }
    }
}

/// One pending cell write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellEdit {
    /// Which cell to write.
    pub address: CellAddress,
    /// Replacement text, spliced in verbatim.
    pub value: String,
}

impl CellEdit {
    pub fn new(address: CellAddress, value: impl Into<String>) -> Self {
        Self {
            address,
            value: value.into(),
        }
    }
}

/// Rewrites table cells addressed by position.
///
/// The editor is a thin wrapper around a [`TagSet`]. It holds no document
/// state, so one instance serves any number of documents.
#[derive(Debug, Clone, Default)]
pub struct TableEditor {
    tags: TagSet,
}

impl TableEditor {
    /// Creates an editor over a custom tag vocabulary.
    pub fn new(tags: TagSet) -> Self {
        Self { tags }
    }

    /// Editor for OWPML section documents (HWPX).
    pub fn hwpx() -> Self {
        Self::new(TagSet::hwpx())
    }

    /// The tag vocabulary this editor scans for.
    pub fn tags(&self) -> &TagSet {
        &self.tags
    }

    /// Classifies how cell content stores its text.
    pub fn classify(&self, cell_inner: &str) -> CellShape {
        cell::classify(cell_inner, &self.tags)
    }

    /// Writes `value` directly into cell content, no addressing involved.
    ///
    /// Returns `Cow::Borrowed` when the content has no recognizable text
    /// slot; see [`CellShape`] for the recognized shapes.
    pub fn write_text<'a>(&self, cell_inner: &'a str, value: &str) -> Cow<'a, str> {
        cell::write_text(cell_inner, value, &self.tags)
    }

    /// Writes `value` into the `cell`-th cell of row content.
    pub fn set_cell<'a>(&self, row_inner: &'a str, cell: usize, value: &str) -> Cow<'a, str> {
        self.rewrite_nth(row_inner, &self.tags.cell, cell, |inner| {
            owned(cell::write_text(inner, value, &self.tags))
        })
    }

    /// Writes `value` into the `(row, cell)` position of table content.
    pub fn set_row_cell<'a>(
        &self,
        table_inner: &'a str,
        row: usize,
        cell: usize,
        value: &str,
    ) -> Cow<'a, str> {
        self.rewrite_nth(table_inner, &self.tags.row, row, |inner| {
            owned(self.set_cell(inner, cell, value))
        })
    }

    /// Writes `value` into `address` within a whole document body.
    pub fn set_table_cell<'a>(
        &self,
        body: &'a str,
        address: CellAddress,
        value: &str,
    ) -> Cow<'a, str> {
        self.rewrite_nth(body, &self.tags.table, address.table, |inner| {
            owned(self.set_row_cell(inner, address.row, address.cell, value))
        })
    }

    /// Applies edits left to right; later writes to the same address win.
    /// Edits that land nowhere are dropped without disturbing the rest.
    pub fn apply_edits(&self, mut body: String, edits: &[CellEdit]) -> String {
        for edit in edits {
            match self.set_table_cell(&body, edit.address, &edit.value) {
                Cow::Owned(updated) => body = updated,
                Cow::Borrowed(_) => {
                    debug!("edit at {:?} left the document unchanged", edit.address);
                }
            }
        }
        body
    }

    /// Rewrites the inner content of the `index`-th `tag` element through
    /// `rewrite`, reassembling every other segment verbatim. Returns the
    /// input when the element does not exist or `rewrite` declines.
    fn rewrite_nth<'a, F>(&self, content: &'a str, tag: &Tag, index: usize, rewrite: F) -> Cow<'a, str>
    where
        F: FnOnce(&str) -> Option<String>,
    {
        let segs = segment::segments(content, tag);
        let mut nth = 0usize;
        let mut hit = None;
        for (at, seg) in segs.iter().enumerate() {
            if let Segment::Element { inner, .. } = *seg {
                if nth == index {
                    hit = Some((at, inner));
                    break;
                }
                nth += 1;
            }
        }
        let Some((hit, inner)) = hit else {
            return Cow::Borrowed(content);
        };
        // Inner no-ops bubble up without reallocating the document.
        let Some(rewritten) = rewrite(inner) else {
            return Cow::Borrowed(content);
        };
        let mut out = String::with_capacity(content.len() + rewritten.len());
        for (at, seg) in segs.iter().enumerate() {
            match *seg {
                Segment::Filler(raw) => out.push_str(raw),
                Segment::Element {
                    start_tag,
                    inner,
                    end_tag,
                } => {
                    out.push_str(start_tag);
                    out.push_str(if at == hit { &rewritten } else { inner });
                    out.push_str(end_tag);
                }
            }
        }
        Cow::Owned(out)
    }
}

/// Collapses a borrowed result to `None` so no-ops propagate upward.
fn owned(result: Cow<'_, str>) -> Option<String> {
    match result {
        Cow::Owned(updated) => Some(updated),
        Cow::Borrowed(_) => None,
    }
}
