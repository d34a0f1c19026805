//! Pickup deadline
//!
//! `now + window`, unless that lands after today's cutoff (store local
//! time), in which case the deadline is tomorrow's cutoff.

use chrono::Duration;

use crate::core::StoreConfig;
use crate::utils::time::{date_cutoff_millis, millis_to_utc};

/// Deadline in Unix millis for an order placed at `now_millis`
pub fn compute_pickup_deadline(now_millis: i64, store: &StoreConfig) -> i64 {
    let candidate = now_millis + Duration::hours(store.pickup_window_hours).num_milliseconds();

    let Some(now) = millis_to_utc(now_millis) else {
        return candidate;
    };
    let today = now.with_timezone(&store.timezone).date_naive();

    let cutoff_today = date_cutoff_millis(today, store.pickup_cutoff, store.timezone);
    if candidate <= cutoff_today {
        return candidate;
    }

    match today.succ_opt() {
        Some(tomorrow) => date_cutoff_millis(tomorrow, store.pickup_cutoff, store.timezone),
        None => candidate,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn bangkok(y: i32, m: u32, d: u32, h: u32, min: u32) -> i64 {
        chrono_tz::Asia::Bangkok
            .with_ymd_and_hms(y, m, d, h, min, 0)
            .unwrap()
            .timestamp_millis()
    }

    #[test]
    fn test_morning_order_gets_full_window() {
        let store = StoreConfig::default();
        let now = bangkok(2025, 3, 10, 9, 0);
        assert_eq!(
            compute_pickup_deadline(now, &store),
            bangkok(2025, 3, 10, 17, 0)
        );
    }

    #[test]
    fn test_exactly_at_cutoff_stays_today() {
        let store = StoreConfig::default();
        let now = bangkok(2025, 3, 10, 11, 30);
        assert_eq!(
            compute_pickup_deadline(now, &store),
            bangkok(2025, 3, 10, 19, 30)
        );
    }

    #[test]
    fn test_afternoon_order_rolls_to_next_cutoff() {
        let store = StoreConfig::default();
        let now = bangkok(2025, 3, 10, 11, 31);
        assert_eq!(
            compute_pickup_deadline(now, &store),
            bangkok(2025, 3, 11, 19, 30)
        );
    }

    #[test]
    fn test_late_night_uses_local_date() {
        // 23:00 ICT on the 10th is still the 10th locally (16:00 UTC)
        let store = StoreConfig::default();
        let now = bangkok(2025, 3, 10, 23, 0);
        assert_eq!(
            compute_pickup_deadline(now, &store),
            bangkok(2025, 3, 11, 19, 30)
        );

        // 01:00 ICT on the 11th is the 10th in UTC but the 11th locally
        let now = bangkok(2025, 3, 11, 1, 0);
        assert_eq!(
            compute_pickup_deadline(now, &store),
            bangkok(2025, 3, 11, 9, 0)
        );
    }

    #[test]
    fn test_month_end_rollover() {
        let store = StoreConfig::default();
        let now = bangkok(2025, 1, 31, 18, 0);
        assert_eq!(
            compute_pickup_deadline(now, &store),
            bangkok(2025, 2, 1, 19, 30)
        );
    }

    #[test]
    fn test_other_timezone() {
        let store = StoreConfig {
            timezone: chrono_tz::UTC,
            ..StoreConfig::default()
        };
        let now = Utc.with_ymd_and_hms(2025, 3, 10, 12, 0, 0).unwrap();
        let expected = Utc.with_ymd_and_hms(2025, 3, 11, 19, 30, 0).unwrap();
        assert_eq!(
            compute_pickup_deadline(now.timestamp_millis(), &store),
            expected.timestamp_millis()
        );
    }
}
