use std::sync::OnceLock;
use std::sync::atomic::{AtomicI64, Ordering};

/// Current UTC timestamp in milliseconds
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Snowflake-style i64 resource ID.
///
/// Layout (53 bits, safe as a JSON number in browsers):
///   - 41 bits: milliseconds since 2024-01-01 UTC
///   - 12 bits: per-process sequence, seeded randomly
pub fn snowflake_id() -> i64 {
    // Custom epoch: 2024-01-01 00:00:00 UTC
    const EPOCH_MS: i64 = 1_704_067_200_000;
    static SEQUENCE: OnceLock<AtomicI64> = OnceLock::new();

    let seq = SEQUENCE.get_or_init(|| {
        use rand::Rng;
        AtomicI64::new(rand::thread_rng().gen_range(0..0x1000))
    });
    let ts = (now_millis() - EPOCH_MS) & 0x1FF_FFFF_FFFF; // 41 bits
    let low = seq.fetch_add(1, Ordering::Relaxed) & 0xFFF; // 12 bits
    (ts << 12) | low
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_snowflake_unique_and_positive() {
        let ids: HashSet<i64> = (0..2000).map(|_| snowflake_id()).collect();
        assert_eq!(ids.len(), 2000);
        assert!(ids.iter().all(|id| *id > 0));
        assert!(ids.iter().all(|id| *id < (1_i64 << 53)));
    }
}
