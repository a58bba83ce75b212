//! Wall-clock timestamps for log lines, formatted at most once per second.
//!
//! Formatting a calendar date is far more expensive than reading the clock,
//! and log lines only show whole seconds. Each thread therefore keeps the
//! last second it formatted together with the resulting text, and only
//! formats again when the second changes.

use std::cell::RefCell;
use std::fmt::Write as _;
use std::sync::atomic::{AtomicI64, Ordering};

use chrono::{DateTime, Local, Utc};

/// `strftime`-style layout of the timestamp, e.g. `2023-11-14 22:13:20`.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Byte length of a formatted timestamp.
pub const TIMESTAMP_LEN: usize = 19;

/// Source of the current time at one-second granularity.
pub trait Clock: Send + Sync {
    /// Seconds since the Unix epoch.
    fn now_secs(&self) -> i64;
}

/// The system wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    #[inline]
    fn now_secs(&self) -> i64 {
        Utc::now().timestamp()
    }
}

/// A clock that only moves when told to.
///
/// Useful for deterministic output in tests and replays.
///
/// ```
/// # use fmtlog::timestamp_cache::{Clock, ManualClock};
/// let clock = ManualClock::new(1_700_000_000);
/// clock.advance(2);
/// assert_eq!(clock.now_secs(), 1_700_000_002);
/// ```
#[derive(Debug, Default)]
pub struct ManualClock {
    secs: AtomicI64,
}

impl ManualClock {
    pub const fn new(secs: i64) -> Self {
        Self {
            secs: AtomicI64::new(secs),
        }
    }

    pub fn set(&self, secs: i64) {
        self.secs.store(secs, Ordering::Relaxed);
    }

    pub fn advance(&self, secs: i64) {
        self.secs.fetch_add(secs, Ordering::Relaxed);
    }
}

impl Clock for ManualClock {
    fn now_secs(&self) -> i64 {
        self.secs.load(Ordering::Relaxed)
    }
}

impl<C: Clock + ?Sized> Clock for std::sync::Arc<C> {
    fn now_secs(&self) -> i64 {
        (**self).now_secs()
    }
}

/// Zone the timestamp is shown in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimeZone {
    #[default]
    Local,
    Utc,
}

/// Last formatted second and its text.
///
/// # Examples
///
/// ```
/// # use fmtlog::timestamp_cache::{TimeZone, TimestampCache};
/// let mut cache = TimestampCache::new();
///
/// assert_eq!(cache.get(1_700_000_000, TimeZone::Utc), "2023-11-14 22:13:20");
/// assert_eq!(cache.get(1_700_000_000, TimeZone::Utc), "2023-11-14 22:13:20");
/// assert_eq!(cache.refreshes(), 1);
///
/// assert_eq!(cache.get(1_700_000_001, TimeZone::Utc), "2023-11-14 22:13:21");
/// assert_eq!(cache.refreshes(), 2);
/// ```
#[derive(Debug, Default)]
pub struct TimestampCache {
    key: Option<(i64, TimeZone)>,
    text: String,
    refreshes: u64,
}

impl TimestampCache {
    pub const fn new() -> Self {
        Self {
            key: None,
            text: String::new(),
            refreshes: 0,
        }
    }

    /// Text for `secs` in `zone`, reformatted only if either changed since
    /// the previous call.
    pub fn get(&mut self, secs: i64, zone: TimeZone) -> &str {
        if self.key != Some((secs, zone)) {
            self.refresh(secs, zone);
        }
        &self.text
    }

    /// How many times the text has been reformatted.
    pub fn refreshes(&self) -> u64 {
        self.refreshes
    }

    fn refresh(&mut self, secs: i64, zone: TimeZone) {
        self.text.clear();
        match DateTime::<Utc>::from_timestamp(secs, 0) {
            Some(utc) => {
                let _ = match zone {
                    TimeZone::Utc => write!(self.text, "{}", utc.format(TIMESTAMP_FORMAT)),
                    TimeZone::Local => write!(self.text, "{}", utc.with_timezone(&Local).format(TIMESTAMP_FORMAT)),
                };
            }
            // Out of chrono's range; keep the column width.
            None => self.text.push_str("0000-00-00 00:00:00"),
        }
        self.key = Some((secs, zone));
        self.refreshes += 1;
    }
}

thread_local! {
    static CACHE: RefCell<TimestampCache> = const { RefCell::new(TimestampCache::new()) };
}

/// Appends the timestamp for `secs` using the calling thread's cache.
pub fn append_cached_timestamp(out: &mut Vec<u8>, secs: i64, zone: TimeZone) {
    let cached = CACHE.try_with(|cache| match cache.try_borrow_mut() {
        Ok(mut cache) => {
            out.extend_from_slice(cache.get(secs, zone).as_bytes());
            true
        }
        Err(_) => false,
    });
    if !matches!(cached, Ok(true)) {
        out.extend_from_slice(TimestampCache::new().get(secs, zone).as_bytes());
    }
}

/// Refreshes performed so far by the calling thread's cache.
pub fn thread_timestamp_refreshes() -> u64 {
    CACHE
        .try_with(|cache| cache.try_borrow().map(|c| c.refreshes()).unwrap_or(0))
        .unwrap_or(0)
}
