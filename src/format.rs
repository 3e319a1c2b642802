//! Display formatting for spreadsheet-sourced values.
//!
//! The parcel workbook stores birth dates as bare digit runs, phone
//! numbers with or without separators, and lot numbers split into main
//! and sub parts. These helpers produce the strings the printed form
//! expects. Inputs that fit no recognized pattern pass through (or fall
//! back to a stated default) instead of failing, the same stance the
//! cell writer takes.

/// Formats an eight-digit birth date as `YYYY.MM.DD`.
///
/// Anything that is not exactly eight ASCII digits after trimming comes
/// back trimmed but otherwise unchanged.
pub fn birth_date(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.len() == 8 && trimmed.bytes().all(|b| b.is_ascii_digit()) {
        format!("{}.{}.{}", &trimmed[..4], &trimmed[4..6], &trimmed[6..8])
    } else {
        trimmed.to_string()
    }
}

/// Formats a phone number by digit count: eleven digits as `3-4-4`, ten
/// digits as `3-3-4`. Non-digits are stripped first; other digit counts
/// come back stripped but unformatted.
pub fn phone(raw: &str) -> String {
    let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
    match digits.len() {
        11 => format!("{}-{}-{}", &digits[..3], &digits[3..7], &digits[7..]),
        10 => format!("{}-{}-{}", &digits[..3], &digits[3..6], &digits[6..]),
        _ => digits,
    }
}

/// Joins lot-number parts as zero-padded four-digit main and sub
/// numbers, `0123-0004`. Empty parts count as `0`.
pub fn lot_number(main: &str, sub: &str) -> String {
    format!("{}-{}", pad_lot_part(main), pad_lot_part(sub))
}

fn pad_lot_part(part: &str) -> String {
    let part = if part.is_empty() { "0" } else { part };
    format!("{part:0>4}")
}

/// Formats an area value; whole numbers print without a decimal point.
pub fn area(value: f64) -> String {
    value.to_string()
}
