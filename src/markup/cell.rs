//! Cell content rewriting.
//!
//! A table cell's inner markup holds paragraphs, runs, text nodes, and
//! layout elements. Writing a value means finding the one place the
//! cell's text lives and replacing it while keeping every other byte as
//! it was. Three shapes are recognized, tried in order:
//!
//! 1. a text node with a plain character payload: replace the payload;
//! 2. a self-closing run: expand it into an open run holding a new text
//!    node;
//! 3. an open run with no text node in its body: insert a new text node
//!    right after the run's start tag.
//!
//! Anything else leaves the cell untouched. Values are spliced in
//! verbatim; callers own any escaping of markup-significant characters.

use std::borrow::Cow;

use memchr::{memchr, memmem};

use super::segment::{contains_start_tag, find_start_tag};
use super::tags::{Tag, TagSet};

/// How a cell's inner markup stores its text, if recognizably at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellShape {
    /// A text node with a plain character payload.
    HasText,
    /// A self-closing run and no usable text node.
    SelfClosingRun,
    /// An open run whose body carries no text node.
    OpenRun,
    /// None of the recognized shapes; writes are dropped.
    Unrecognized,
}

/// Rewrite target located inside cell content.
enum Target {
    /// Replace the payload byte range of an existing text node.
    Text { payload_start: usize, payload_end: usize },
    /// Expand the self-closing run whose `/` sits at `slash` and whose
    /// start tag ends at `tag_end`.
    SelfClose { slash: usize, tag_end: usize },
    /// Insert a fresh text node at `insert_at`.
    Open { insert_at: usize },
}

fn find_target(inner: &str, tags: &TagSet) -> Option<Target> {
    if let Some((payload_start, payload_end)) = find_text_payload(inner, tags) {
        return Some(Target::Text {
            payload_start,
            payload_end,
        });
    }
    if let Some((slash, tag_end)) = find_self_closing_run(inner, tags) {
        return Some(Target::SelfClose { slash, tag_end });
    }
    find_open_run(inner, tags).map(|insert_at| Target::Open { insert_at })
}

/// First text node whose payload runs to its own end tag without any
/// intervening markup. Returns the payload byte range.
fn find_text_payload(inner: &str, tags: &TagSet) -> Option<(usize, usize)> {
    let bytes = inner.as_bytes();
    let mut pos = 0;
    while let Some((tag_start, tag_end)) = find_start_tag(inner, pos, &tags.text) {
        match memchr(b'<', &bytes[tag_end..]) {
            Some(found) => {
                let lt = tag_end + found;
                if inner[lt..].starts_with(tags.text.close_tag()) {
                    return Some((tag_end, lt));
                }
                pos = tag_start + 1;
            }
            // No markup after the start tag at all, so no end tag either.
            None => return None,
        }
    }
    None
}

/// First start tag of the run element that closes itself with `/>`.
/// Returns the position of the `/` and the end of the start tag.
fn find_self_closing_run(inner: &str, tags: &TagSet) -> Option<(usize, usize)> {
    let bytes = inner.as_bytes();
    let mut pos = 0;
    while let Some((tag_start, tag_end)) = find_start_tag(inner, pos, &tags.run) {
        if bytes[tag_end - 2] == b'/' {
            return Some((tag_end - 2, tag_end));
        }
        pos = tag_start + 1;
    }
    None
}

/// Insertion point inside the first open run, provided its body (up to
/// the first run end tag) carries no text node of its own.
fn find_open_run(inner: &str, tags: &TagSet) -> Option<usize> {
    let (_, tag_end) = find_start_tag(inner, 0, &tags.run)?;
    let close = tags.run.close_tag().as_bytes();
    let found = memmem::find(&inner.as_bytes()[tag_end..], close)?;
    let body = &inner[tag_end..tag_end + found];
    if contains_start_tag(body, &tags.text) {
        return None;
    }
    Some(tag_end)
}

/// Classifies `inner` without modifying it.
pub(crate) fn classify(inner: &str, tags: &TagSet) -> CellShape {
    match find_target(inner, tags) {
        Some(Target::Text { .. }) => CellShape::HasText,
        Some(Target::SelfClose { .. }) => CellShape::SelfClosingRun,
        Some(Target::Open { .. }) => CellShape::OpenRun,
        None => CellShape::Unrecognized,
    }
}

/// Writes `value` into `inner` following the shape rules, or returns the
/// input unchanged when no shape matches.
pub(crate) fn write_text<'a>(inner: &'a str, value: &str, tags: &TagSet) -> Cow<'a, str> {
    let Some(target) = find_target(inner, tags) else {
        return Cow::Borrowed(inner);
    };
    let mut out = String::with_capacity(inner.len() + value.len() + 16);
    match target {
        Target::Text {
            payload_start,
            payload_end,
        } => {
            out.push_str(&inner[..payload_start]);
            out.push_str(value);
            out.push_str(&inner[payload_end..]);
        }
        Target::SelfClose { slash, tag_end } => {
            // Everything up to the '/' is the start tag with its
            // attributes, kept verbatim.
            out.push_str(&inner[..slash]);
            out.push('>');
            push_text_node(&mut out, &tags.text, value);
            out.push_str(tags.run.close_tag());
            out.push_str(&inner[tag_end..]);
        }
        Target::Open { insert_at } => {
            out.push_str(&inner[..insert_at]);
            push_text_node(&mut out, &tags.text, value);
            out.push_str(&inner[insert_at..]);
        }
    }
    Cow::Owned(out)
}

/// Appends `<text>value</text>`.
fn push_text_node(out: &mut String, text: &Tag, value: &str) {
    out.push_str(text.open_prefix());
    out.push('>');
    out.push_str(value);
    out.push_str(text.close_tag());
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tags() -> TagSet {
        TagSet::hwpx()
    }

    #[test]
    fn test_replace_text_payload() {
        let inner = "<hp:subList><hp:p><hp:run charPrIDRef=\"7\"><hp:t>이름</hp:t></hp:run></hp:p></hp:subList>";
        let out = write_text(inner, "홍길동", &tags());
        assert_eq!(
            out.as_ref(),
            "<hp:subList><hp:p><hp:run charPrIDRef=\"7\"><hp:t>홍길동</hp:t></hp:run></hp:p></hp:subList>"
        );
        assert_eq!(classify(inner, &tags()), CellShape::HasText);
    }

    #[test]
    fn test_replace_empty_text_payload() {
        let out = write_text("<hp:t></hp:t>", "v", &tags());
        assert_eq!(out.as_ref(), "<hp:t>v</hp:t>");
    }

    #[test]
    fn test_text_node_attributes_survive() {
        let out = write_text("<hp:t charStyleIDRef=\"0\">old</hp:t>", "new", &tags());
        assert_eq!(out.as_ref(), "<hp:t charStyleIDRef=\"0\">new</hp:t>");
    }

    #[test]
    fn test_first_text_node_wins() {
        let out = write_text("<hp:t>a</hp:t><hp:t>b</hp:t>", "v", &tags());
        assert_eq!(out.as_ref(), "<hp:t>v</hp:t><hp:t>b</hp:t>");
    }

    #[test]
    fn test_markup_payload_skipped_for_later_plain_one() {
        // The first text node nests markup, so the plain second one is the
        // payload that gets replaced.
        let inner = "<hp:t><hp:fwSpace/>x</hp:t><hp:t>y</hp:t>";
        let out = write_text(inner, "v", &tags());
        assert_eq!(out.as_ref(), "<hp:t><hp:fwSpace/>x</hp:t><hp:t>v</hp:t>");
    }

    #[test]
    fn test_expand_self_closing_run() {
        let inner = "<hp:p><hp:run charPrIDRef=\"7\"/></hp:p>";
        let out = write_text(inner, "값", &tags());
        assert_eq!(
            out.as_ref(),
            "<hp:p><hp:run charPrIDRef=\"7\"><hp:t>값</hp:t></hp:run></hp:p>"
        );
        assert_eq!(classify(inner, &tags()), CellShape::SelfClosingRun);
    }

    #[test]
    fn test_self_closing_run_keeps_attribute_bytes() {
        // The space before the slash belongs to the attribute region and
        // is carried over as-is.
        let out = write_text("<hp:run />", "v", &tags());
        assert_eq!(out.as_ref(), "<hp:run ><hp:t>v</hp:t></hp:run>");
    }

    #[test]
    fn test_insert_into_open_run() {
        let inner = "<hp:run charPrIDRef=\"1\"><hp:ctrl/></hp:run>";
        let out = write_text(inner, "v", &tags());
        assert_eq!(
            out.as_ref(),
            "<hp:run charPrIDRef=\"1\"><hp:t>v</hp:t><hp:ctrl/></hp:run>"
        );
        assert_eq!(classify(inner, &tags()), CellShape::OpenRun);
    }

    #[test]
    fn test_tab_element_does_not_block_insertion() {
        // `<hp:tab/>` is not a text node; insertion still happens.
        let inner = "<hp:run charPrIDRef=\"0\"><hp:tab/></hp:run>";
        let out = write_text(inner, "v", &tags());
        assert_eq!(
            out.as_ref(),
            "<hp:run charPrIDRef=\"0\"><hp:t>v</hp:t><hp:tab/></hp:run>"
        );
    }

    #[test]
    fn test_self_closed_text_node_blocks_insertion() {
        // `<hp:t/>` has no payload to replace, yet it still counts as a
        // text node, so nothing is written.
        let inner = "<hp:run><hp:t/></hp:run>";
        let out = write_text(inner, "v", &tags());
        assert!(matches!(out, Cow::Borrowed(_)));
        assert_eq!(classify(inner, &tags()), CellShape::Unrecognized);
    }

    #[test]
    fn test_unrecognized_cell_is_untouched() {
        let inner = "<hp:cellAddr colAddr=\"0\" rowAddr=\"0\"/><hp:cellSz width=\"4500\"/>";
        let out = write_text(inner, "v", &tags());
        assert!(matches!(out, Cow::Borrowed(_)));
        assert_eq!(out.as_ref(), inner);
    }

    #[test]
    fn test_malformed_markup_is_untouched() {
        let inner = "<hp:t>a<hp:t>b";
        let out = write_text(inner, "v", &tags());
        assert!(matches!(out, Cow::Borrowed(_)));
        assert_eq!(out.as_ref(), inner);
    }

    #[test]
    fn test_value_is_spliced_verbatim() {
        let out = write_text("<hp:t>x</hp:t>", "a<b&c", &tags());
        assert_eq!(out.as_ref(), "<hp:t>a<b&c</hp:t>");
    }

    #[test]
    fn test_open_run_with_nested_text_is_untouched() {
        // Shape 1 fails on the nested markup, shape 3 sees the text node
        // and declines.
        let inner = "<hp:run><hp:t><hp:fwSpace/></hp:t></hp:run>";
        let out = write_text(inner, "v", &tags());
        assert!(matches!(out, Cow::Borrowed(_)));
    }
}
