// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Timestamp helpers for rows exchanged with the data store.

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};

/// Format a UTC timestamp as RFC3339 with a `Z` suffix (`created_at` columns).
pub fn format_utc_rfc3339(date: DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Parse an event date: full RFC3339, or a bare `YYYY-MM-DD` taken as midnight UTC.
pub fn parse_event_date(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(date) = DateTime::parse_from_rfc3339(value) {
        return Some(date.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|d| d.and_utc())
}

/// Whether an event starting at `start_date` has not started before `now`.
///
/// Unparseable dates count as upcoming so they stay visible.
pub fn is_upcoming(start_date: &str, now: DateTime<Utc>) -> bool {
    parse_event_date(start_date).map_or(true, |start| start >= now)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_parse_event_date_formats() {
        let expected = Utc.with_ymd_and_hms(2026, 3, 1, 18, 0, 0).unwrap();
        assert_eq!(parse_event_date("2026-03-01T18:00:00Z"), Some(expected));
        assert_eq!(parse_event_date("2026-03-01T10:00:00-08:00"), Some(expected));
        assert_eq!(
            parse_event_date("2026-03-01"),
            Some(Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap())
        );
        assert_eq!(parse_event_date("next tuesday"), None);
    }

    #[test]
    fn test_is_upcoming() {
        let now = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();
        assert!(is_upcoming("2026-03-02T00:00:00Z", now));
        assert!(!is_upcoming("2026-02-28T00:00:00Z", now));
        assert!(is_upcoming("TBD", now));
    }

    #[test]
    fn test_format_uses_z_suffix() {
        let date = Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap();
        assert_eq!(format_utc_rfc3339(date), "2026-01-02T03:04:05Z");
    }
}
