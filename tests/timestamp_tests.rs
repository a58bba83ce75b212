use fmtlog::timestamp_cache::{append_cached_timestamp, thread_timestamp_refreshes, TimestampCache, TIMESTAMP_LEN};
use fmtlog::TimeZone;

#[test]
fn test_same_second_is_byte_identical() {
    let mut first = Vec::new();
    let mut second = Vec::new();
    let before = thread_timestamp_refreshes();

    append_cached_timestamp(&mut first, 1_700_000_000, TimeZone::Local);
    append_cached_timestamp(&mut second, 1_700_000_000, TimeZone::Local);

    assert_eq!(first, second);
    assert_eq!(first.len(), TIMESTAMP_LEN);
    assert_eq!(thread_timestamp_refreshes(), before + 1);
}

#[test]
fn test_next_second_changes_only_the_time() {
    let mut cache = TimestampCache::new();
    let earlier = cache.get(1_700_000_000, TimeZone::Utc).to_string();
    let later = cache.get(1_700_000_001, TimeZone::Utc).to_string();

    assert_ne!(earlier, later);
    assert_eq!(earlier[..11], later[..11]);
    assert_eq!(&later[11..], "22:13:21");
}

#[test]
fn test_day_rollover() {
    let mut cache = TimestampCache::new();
    assert_eq!(cache.get(86_399, TimeZone::Utc), "1970-01-01 23:59:59");
    assert_eq!(cache.get(86_400, TimeZone::Utc), "1970-01-02 00:00:00");
}
