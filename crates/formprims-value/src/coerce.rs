//! Coercion from raw backing values into scalar edit buffers.
//!
//! Each function returns `None` when the raw value does not fit the target
//! kind. Coercion never fails loudly: a malformed backing value degrades to
//! an empty field.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

use crate::file::FileBlob;
use crate::number::{format_number, parse_numeric};
use crate::value::{format_date, Value};

/// Earliest/latest representable date offset, in ms from the epoch.
const MAX_TIMESTAMP_MILLIS: f64 = 8.64e15;

const NAIVE_DATETIME_FORMATS: [&str; 3] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
];

/// Strings, numbers and dates are stringified.
pub fn coerce_string(raw: &Value) -> Option<String> {
    match raw {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(format_number(*n)),
        Value::Date(d) => Some(format_date(d)),
        _ => None,
    }
}

/// Numbers are stringified; strings are kept verbatim so long digit runs
/// survive until extraction.
pub fn coerce_number(raw: &Value) -> Option<String> {
    match raw {
        Value::Number(n) => Some(format_number(*n)),
        Value::String(s) => Some(s.clone()),
        _ => None,
    }
}

pub fn coerce_boolean(raw: &Value) -> Option<bool> {
    raw.as_bool()
}

/// Dates pass through; numbers and numeric strings are read as epoch
/// milliseconds; other strings go through [`parse_date`].
pub fn coerce_date(raw: &Value) -> Option<DateTime<Utc>> {
    match raw {
        Value::Date(d) => Some(*d),
        Value::Number(n) => from_timestamp_millis(*n),
        Value::String(s) => match parse_numeric(s) {
            Some(n) => from_timestamp_millis(n),
            None => parse_date(s),
        },
        _ => None,
    }
}

pub fn coerce_file(raw: &Value) -> Option<FileBlob> {
    raw.as_file().cloned()
}

fn from_timestamp_millis(millis: f64) -> Option<DateTime<Utc>> {
    if !millis.is_finite() || millis.abs() > MAX_TIMESTAMP_MILLIS {
        return None;
    }
    DateTime::from_timestamp_millis(millis.trunc() as i64)
}

/// Parse a date string: RFC 3339, RFC 2822, a bare `YYYY-MM-DD` (midnight
/// UTC) or a local-less `YYYY-MM-DDTHH:MM[:SS[.fff]]` read as UTC.
pub fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
    let text = raw.trim();
    if text.is_empty() {
        return None;
    }

    if let Ok(date) = DateTime::parse_from_rfc3339(text) {
        return Some(date.with_timezone(&Utc));
    }
    if let Ok(date) = DateTime::parse_from_rfc2822(text) {
        return Some(date.with_timezone(&Utc));
    }
    if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0).map(|naive| naive.and_utc());
    }

    NAIVE_DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
        .map(|naive| naive.and_utc())
}
