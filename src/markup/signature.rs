//! Signature line substitution.
//!
//! Application forms close with a line like `신청인   성명   (인)`: a role
//! label, a name placeholder, and a seal mark, set apart by runs of
//! whitespace. Filling swaps the placeholder for the actual name and
//! renormalizes the gaps to the printed form's fixed layout, wherever in
//! the document the phrase happens to sit.

use std::borrow::Cow;

/// Space run printed between the label and the name.
const LABEL_GAP: &str = "       ";
/// Space run printed between the name and the suffix.
const SUFFIX_GAP: &str = "      ";

/// The three fixed phrases of a signature line.
///
/// Matching requires at least one whitespace character between phrases
/// and accepts any amount and kind of whitespace, including the
/// ideographic spaces Korean forms pad with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureLine {
    label: String,
    placeholder: String,
    suffix: String,
}

impl Default for SignatureLine {
    /// The stock application form phrase `신청인 … 성명 … (인)`.
    fn default() -> Self {
        Self::new("신청인", "성명", "(인)")
    }
}

impl SignatureLine {
    /// Creates a signature line from its label, placeholder, and suffix
    /// phrases.
    pub fn new(
        label: impl Into<String>,
        placeholder: impl Into<String>,
        suffix: impl Into<String>,
    ) -> Self {
        Self {
            label: label.into(),
            placeholder: placeholder.into(),
            suffix: suffix.into(),
        }
    }

    /// Replaces the first occurrence of the phrase with the filled-in
    /// layout: label, seven spaces, `name`, six spaces, suffix. Bodies
    /// without the phrase come back unchanged.
    pub fn fill<'a>(&self, body: &'a str, name: &str) -> Cow<'a, str> {
        let Some((start, end)) = self.locate(body) else {
            return Cow::Borrowed(body);
        };
        let mut out = String::with_capacity(body.len() + name.len());
        out.push_str(&body[..start]);
        out.push_str(&self.label);
        out.push_str(LABEL_GAP);
        out.push_str(name);
        out.push_str(SUFFIX_GAP);
        out.push_str(&self.suffix);
        out.push_str(&body[end..]);
        Cow::Owned(out)
    }

    /// Byte range of the first `label ws+ placeholder ws+ suffix` match.
    fn locate(&self, body: &str) -> Option<(usize, usize)> {
        let mut from = 0;
        while from <= body.len() {
            let Some(found) = body[from..].find(&self.label) else {
                break;
            };
            let start = from + found;
            let after_label = start + self.label.len();
            let placeholder_at = skip_whitespace(body, after_label);
            if placeholder_at > after_label
                && body[placeholder_at..].starts_with(&self.placeholder)
            {
                let after_placeholder = placeholder_at + self.placeholder.len();
                let suffix_at = skip_whitespace(body, after_placeholder);
                if suffix_at > after_placeholder && body[suffix_at..].starts_with(&self.suffix) {
                    return Some((start, suffix_at + self.suffix.len()));
                }
            }
            // Resume one character past the failed candidate.
            match body[start..].chars().next() {
                Some(ch) => from = start + ch.len_utf8(),
                None => break,
            }
        }
        None
    }
}

/// Index just past the run of Unicode whitespace starting at `from`.
fn skip_whitespace(s: &str, from: usize) -> usize {
    let rest = &s[from..];
    from + (rest.len() - rest.trim_start().len())
}
