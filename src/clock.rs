//! Fixed-offset local clock used for day boundaries.
//!
//! Bars carry native UTC epoch seconds. Day boundaries are measured on a
//! UTC+3 wall clock; the shift lives here and nowhere else.

use chrono::{DateTime, Datelike, NaiveTime};

/// Offset of the day-boundary clock from UTC.
pub const LOCAL_UTC_OFFSET_SECS: i64 = 3 * 3_600;

pub const SECS_PER_DAY: i64 = 86_400;

/// `None` when the shifted value does not fit in an `i64`.
pub fn to_local(native_ts: i64) -> Option<i64> {
    native_ts.checked_add(LOCAL_UTC_OFFSET_SECS)
}

pub fn to_native(local_ts: i64) -> Option<i64> {
    local_ts.checked_sub(LOCAL_UTC_OFFSET_SECS)
}

/// Calendar day on the local clock, packed as `year*10000 + month*100 + day`.
///
/// Only meant for equality checks between bars; never do arithmetic on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DayKey(i64);

impl DayKey {
    /// `None` when the timestamp falls outside chrono's representable range.
    pub fn of(native_ts: i64) -> Option<Self> {
        let local = DateTime::from_timestamp(to_local(native_ts)?, 0)?;
        Some(Self(
            i64::from(local.year()) * 10_000 + i64::from(local.month()) * 100 + i64::from(local.day()),
        ))
    }

    pub fn packed(self) -> i64 {
        self.0
    }
}

/// Native timestamp of local midnight on the local day containing `native_ts`.
pub fn local_day_start(native_ts: i64) -> Option<i64> {
    let local = DateTime::from_timestamp(to_local(native_ts)?, 0)?;
    let midnight = local.date_naive().and_time(NaiveTime::MIN).and_utc();
    to_native(midnight.timestamp())
}
