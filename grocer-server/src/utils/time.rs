//! Store-time helpers
//!
//! Everything stored is UTC Unix millis; the store timezone only matters for
//! cutoffs and for text shown to customers.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use chrono_tz::Tz;

/// Default store timezone
pub const DEFAULT_TIMEZONE: Tz = chrono_tz::Asia::Bangkok;

/// Parse an IANA timezone name, falling back to [`DEFAULT_TIMEZONE`]
pub fn parse_timezone(name: &str) -> Tz {
    name.parse::<Tz>().unwrap_or_else(|e| {
        tracing::warn!(
            "Failed to parse timezone '{}': {}, falling back to {}",
            name,
            e,
            DEFAULT_TIMEZONE
        );
        DEFAULT_TIMEZONE
    })
}

/// Parse a cutoff time string (HH:MM), falling back to `default`
pub fn parse_cutoff(cutoff: &str, default: NaiveTime) -> NaiveTime {
    NaiveTime::parse_from_str(cutoff, "%H:%M").unwrap_or_else(|e| {
        tracing::warn!(
            "Failed to parse cutoff '{}': {}, falling back to {}",
            cutoff,
            e,
            default.format("%H:%M")
        );
        default
    })
}

/// Local date + wall-clock time → Unix millis (store timezone)
///
/// Ambiguous local times resolve to the later instant; nonexistent ones
/// (DST gap) fall back to UTC.
pub fn date_cutoff_millis(date: NaiveDate, cutoff: NaiveTime, tz: Tz) -> i64 {
    let naive = date.and_time(cutoff);
    naive
        .and_local_timezone(tz)
        .latest()
        .map(|dt| dt.timestamp_millis())
        .unwrap_or_else(|| naive.and_utc().timestamp_millis())
}

/// Unix millis → `DateTime<Utc>`
pub fn millis_to_utc(millis: i64) -> Option<DateTime<Utc>> {
    DateTime::<Utc>::from_timestamp_millis(millis)
}

/// Unix millis → RFC 3339 (UTC)
pub fn millis_to_rfc3339(millis: i64) -> Option<String> {
    millis_to_utc(millis).map(|dt| dt.to_rfc3339())
}

/// Unix millis → `dd/mm/yyyy HH:MM` in the store timezone
pub fn format_store_time(millis: i64, tz: Tz) -> String {
    match millis_to_utc(millis) {
        Some(dt) => dt.with_timezone(&tz).format("%d/%m/%Y %H:%M").to_string(),
        None => millis.to_string(),
    }
}
