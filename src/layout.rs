//! Fixed-width record layout: field spans and field decoding.
//!
//! Extract lines are Latin-1, so byte offsets and character offsets agree
//! and every field can be sliced straight out of the raw line bytes. Spans
//! follow the layout sheet's 1-based inclusive column convention; ranges
//! past the end of a short line clip to whatever is present.

use chrono::NaiveDate;
use thiserror::Error;

/// 1-based inclusive `(start, end)` column range.
pub type Span = (usize, usize);

pub mod span {
    //! Column ranges from the PTSTMT layout sheet.

    use super::Span;

    pub const RECORD_TYPE: Span = (1, 2);
    pub const CUSTOMER: Span = (3, 18);
    /// Card number, carried at the same columns by header and detail records.
    pub const CARD: Span = (28, 43);

    // Header ("02") balance fields.
    pub const MIN_DUE: Span = (264, 277);
    pub const CREDIT_LIMIT: Span = (279, 292);
    pub const AVAILABLE_CREDIT: Span = (294, 308);
    pub const PREVIOUS_BALANCE: Span = (324, 338);
    pub const TOTAL_PAYMENT: Span = (354, 367);
    pub const INTEREST: Span = (399, 413);
    pub const NEW_BALANCE: Span = (414, 428);
    pub const INSTALLMENT: Span = (891, 900);

    // Detail ("03") transaction fields.
    pub const POSTING_DATE: Span = (82, 89);
    pub const TRX_DETAIL: Span = (90, 129);
    pub const TRX_AMOUNT: Span = (149, 162);
    pub const TRX_DIRECTION: Span = (163, 164);
}

/// Raised when a detail record's posting date cannot be read. Unlike the
/// lenient amount fields, a bad date poisons window filtering for the whole
/// run, so it aborts processing.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum DateError {
    #[error("malformed posting date {value:?}: expected YYYYMMDD")]
    Malformed { value: String },
    #[error("impossible calendar date {value:?}")]
    OutOfRange { value: String },
}

/// Slices a 1-based inclusive column range out of a raw line, clipping to
/// the line's actual length.
pub fn slice_field(line: &[u8], (start, end): Span) -> &[u8] {
    let from = start.saturating_sub(1).min(line.len());
    let to = end.min(line.len());
    if from >= to {
        &[]
    } else {
        &line[from..to]
    }
}

/// Decodes Latin-1 bytes to a `String`. Every byte maps to the Unicode
/// code point of the same value, so this never fails.
pub fn decode_latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| char::from(b)).collect()
}

/// Extracts a span as a whitespace-trimmed string.
pub fn field_str(line: &[u8], span: Span) -> String {
    decode_latin1(slice_field(line, span)).trim().to_string()
}

/// Extracts a span as a signed amount in minor currency units.
///
/// Amount fields are lenient: blank or non-numeric content reads as zero
/// rather than failing, since padded and malformed amounts are an expected
/// feature of these extracts (the zero-amount report surfaces them). A
/// trailing `-` marks a negative amount.
pub fn field_amount(line: &[u8], span: Span) -> i64 {
    decode_amount(decode_latin1(slice_field(line, span)).trim())
}

fn decode_amount(text: &str) -> i64 {
    if text.is_empty() {
        return 0;
    }
    if let Some(core) = text.strip_suffix('-') {
        let core = core.trim();
        return -parse_digits(core);
    }
    parse_digits(text)
}

/// Parses an all-ASCII-digit string, yielding 0 for anything else.
fn parse_digits(text: &str) -> i64 {
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
        return 0;
    }
    text.parse().unwrap_or(0)
}

/// Parses a `YYYYMMDD` posting date field.
pub fn parse_yyyymmdd(text: &str) -> Result<NaiveDate, DateError> {
    let bytes = text.as_bytes();
    if bytes.len() != 8 || !bytes.iter().all(|b| b.is_ascii_digit()) {
        return Err(DateError::Malformed {
            value: text.to_string(),
        });
    }
    let year = ascii_num(&bytes[0..4]) as i32;
    let month = ascii_num(&bytes[4..6]);
    let day = ascii_num(&bytes[6..8]);
    NaiveDate::from_ymd_opt(year, month, day).ok_or_else(|| DateError::OutOfRange {
        value: text.to_string(),
    })
}

fn ascii_num(digits: &[u8]) -> u32 {
    digits
        .iter()
        .fold(0u32, |acc, &b| acc * 10 + u32::from(b - b'0'))
}
