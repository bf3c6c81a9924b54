//! Timestamp encoding for the SQLite store.
//!
//! Every timestamp column holds fixed-width UTC text
//! (`YYYY-MM-DDTHH:MM:SS.mmmZ`). Because the width never varies, SQLite's
//! text comparison orders rows chronologically, which the reminder window
//! query relies on.

use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};

/// Encode an instant for storage.
pub fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Decode a stored or client-supplied timestamp.
///
/// Accepts RFC 3339 with any offset (normalised to UTC) and the naive
/// `YYYY-MM-DDTHH:MM[:SS]` form emitted by HTML `datetime-local` inputs,
/// which is taken to be UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    const NAIVE_FORMATS: [&str; 4] = [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%d %H:%M",
    ];
    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
}
