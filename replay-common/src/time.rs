//! Timestamp utilities
//!
//! `played_at` values are stored in SQLite as RFC 3339 UTC text with a
//! fixed millisecond precision and `Z` suffix. The format is fixed-width,
//! so SQL `MAX()` and `>` comparisons on the column are chronologically
//! correct without any type affinity tricks.

use crate::{Error, Result};
use chrono::{DateTime, SecondsFormat, TimeZone, Utc};

/// Format a timestamp for storage (fixed-width RFC 3339, millis, `Z`)
pub fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Parse an RFC 3339 timestamp (any offset) into UTC
pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| Error::InvalidInput(format!("bad timestamp '{}': {}", raw, e)))
}

/// Beginning-of-time sentinel: the high-water mark of an empty store
pub fn beginning_of_time() -> DateTime<Utc> {
    Utc.timestamp_opt(0, 0).single().expect("unix epoch is representable")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_is_fixed_width() {
        let a = format_timestamp(parse_timestamp("2024-01-01T00:00:00Z").unwrap());
        let b = format_timestamp(parse_timestamp("2024-12-31T23:59:59.999Z").unwrap());
        assert_eq!(a.len(), b.len());
        assert!(a.ends_with('Z'));
    }

    #[test]
    fn test_lexicographic_order_matches_chronological() {
        let earlier = format_timestamp(parse_timestamp("2024-01-01T10:00:00Z").unwrap());
        let later = format_timestamp(parse_timestamp("2024-01-02T09:00:00Z").unwrap());
        assert!(earlier < later);
    }

    #[test]
    fn test_parse_accepts_offset_form() {
        let from_z = parse_timestamp("2023-02-01T10:00:00Z").unwrap();
        let from_offset = parse_timestamp("2023-02-01T11:00:00+01:00").unwrap();
        assert_eq!(from_z, from_offset);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(parse_timestamp("not-a-timestamp").is_err());
        assert!(parse_timestamp("2023-02-30T10:00:00Z").is_err());
    }

    #[test]
    fn test_beginning_of_time_precedes_everything() {
        let epoch = beginning_of_time();
        let ts = parse_timestamp("1971-01-01T00:00:00Z").unwrap();
        assert!(epoch < ts);
        assert_eq!(epoch.timestamp(), 0);
    }

    #[test]
    fn test_round_trip() {
        let ts = parse_timestamp("2024-03-01T11:00:00.250Z").unwrap();
        assert_eq!(parse_timestamp(&format_timestamp(ts)).unwrap(), ts);
    }
}
