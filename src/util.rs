//! Clock helpers used across the API.

use time::{Date, OffsetDateTime};

pub fn current_time() -> OffsetDateTime {
    OffsetDateTime::now_utc()
}

/// Unix timestamp in milliseconds, the precision stored documents carry.
pub fn now_millis() -> i64 {
    (current_time().unix_timestamp_nanos() / 1_000_000) as i64
}

pub fn today() -> Date {
    current_time().date()
}
