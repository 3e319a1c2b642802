//! Structural segment scanner.
//!
//! Splits element content into an alternating sequence of structural
//! child elements and the raw markup between them. The scan is purely
//! textual: every segment borrows from the input, and reassembling the
//! segments in order reproduces the input byte for byte. That identity is
//! what lets a cell edit leave the rest of a document untouched.
//!
//! Matching is deliberately shallow. The first end tag after a start tag
//! closes the element, so same-name nesting is not paired up; the table
//! documents this crate targets never nest the structural tags.

use memchr::{memchr, memmem};
use smallvec::SmallVec;

use super::tags::Tag;

/// One piece of scanned content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Segment<'a> {
    /// A structural child element split into start tag, inner content,
    /// and end tag.
    Element {
        start_tag: &'a str,
        inner: &'a str,
        end_tag: &'a str,
    },
    /// Raw markup between structural elements, preserved verbatim.
    Filler(&'a str),
}

/// Bytes that may legally follow an element name inside a start tag.
#[inline]
fn is_name_boundary(byte: u8) -> bool {
    matches!(byte, b' ' | b'\t' | b'\r' | b'\n' | b'/' | b'>')
}

/// Finds the next start tag of `tag` at or after `from`.
///
/// Returns the byte range of the whole start tag including the closing
/// `>`. Candidates whose element name merely begins with the wanted name
/// (`<hp:tbl` when scanning for `hp:t`) are skipped.
pub(crate) fn find_start_tag(content: &str, from: usize, tag: &Tag) -> Option<(usize, usize)> {
    let bytes = content.as_bytes();
    let prefix = tag.open_prefix().as_bytes();
    let mut pos = from;
    while let Some(found) = memmem::find(&bytes[pos..], prefix) {
        let start = pos + found;
        let name_end = start + prefix.len();
        match bytes.get(name_end) {
            Some(&next) if is_name_boundary(next) => {
                // The '>' search starts at the boundary byte so a bare
                // `<name>` start tag terminates immediately. No '>' in the
                // remainder means no later candidate can terminate either.
                let gt = memchr(b'>', &bytes[name_end..])?;
                return Some((start, name_end + gt + 1));
            }
            Some(_) => pos = start + 1,
            None => return None,
        }
    }
    None
}

/// True if `content` contains a start tag of `tag` anywhere.
#[inline]
pub(crate) fn contains_start_tag(content: &str, tag: &Tag) -> bool {
    find_start_tag(content, 0, tag).is_some()
}

/// Finds the next complete `tag` element at or after `from`.
///
/// Returns `(start, inner_start, inner_end, end)` byte offsets. The first
/// end tag after the start tag wins; a start tag with no end tag after it
/// matches nothing.
fn find_element(content: &str, from: usize, tag: &Tag) -> Option<(usize, usize, usize, usize)> {
    let (start, inner_start) = find_start_tag(content, from, tag)?;
    let close = tag.close_tag().as_bytes();
    let found = memmem::find(&content.as_bytes()[inner_start..], close)?;
    let inner_end = inner_start + found;
    Some((start, inner_start, inner_end, inner_end + close.len()))
}

/// Splits `content` into elements of `tag` and the filler between them.
///
/// Filler segments appear only where markup actually sits between
/// elements. Content with no matching element comes back as a single
/// filler segment; empty content yields no segments at all.
pub(crate) fn segments<'a>(content: &'a str, tag: &Tag) -> SmallVec<[Segment<'a>; 16]> {
    let mut out = SmallVec::new();
    let mut pos = 0;
    while let Some((start, inner_start, inner_end, end)) = find_element(content, pos, tag) {
        if start > pos {
            out.push(Segment::Filler(&content[pos..start]));
        }
        out.push(Segment::Element {
            start_tag: &content[start..inner_start],
            inner: &content[inner_start..inner_end],
            end_tag: &content[inner_end..end],
        });
        pos = end;
    }
    if pos < content.len() {
        out.push(Segment::Filler(&content[pos..]));
    }
    out
}
