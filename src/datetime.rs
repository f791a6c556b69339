//! Date/time utilities for postbox.
//!
//! Timestamps are stored as UTC TEXT in SQLite format. These helpers parse
//! them back out for display and for expiry checks done on the Rust side.

use chrono::{DateTime, NaiveDateTime, Utc};

/// Parse a stored datetime string into a UTC timestamp.
///
/// Accepts RFC3339 or SQLite format (YYYY-MM-DD HH:MM:SS, assumed UTC).
/// Returns `None` if the string matches neither.
pub fn parse_datetime(datetime_str: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(datetime_str) {
        return Some(dt.with_timezone(&Utc));
    }

    if let Ok(naive) = NaiveDateTime::parse_from_str(datetime_str, "%Y-%m-%d %H:%M:%S") {
        return Some(naive.and_utc());
    }

    None
}

/// Format a stored datetime string for display.
///
/// Returns the original string if parsing fails.
pub fn format_datetime(datetime_str: &str, format: &str) -> String {
    match parse_datetime(datetime_str) {
        Some(dt) => dt.format(format).to_string(),
        None => datetime_str.to_string(),
    }
}

/// Format a stored datetime string with the default display format.
pub fn format_datetime_default(datetime_str: &str) -> String {
    format_datetime(datetime_str, "%Y/%m/%d %H:%M")
}

/// Check whether a stored datetime lies strictly before the reference instant.
///
/// Unparseable strings compare as not-past, so malformed rows are never
/// silently treated as expired.
pub fn is_past(datetime_str: &str, reference: DateTime<Utc>) -> bool {
    match parse_datetime(datetime_str) {
        Some(dt) => dt < reference,
        None => false,
    }
}
