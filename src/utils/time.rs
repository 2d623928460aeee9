//! Timestamp utilities: the on-disk format, parsing, "now", whole-minute spans.

use crate::errors::{AppError, AppResult};
use chrono::{Local, NaiveDateTime, Timelike, TimeDelta};

/// Storage format shared by every timestamp column.
/// SQLite's `strftime('%s', …)` understands it natively.
pub const TS_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub fn format_ts(ts: &NaiveDateTime) -> String {
    ts.format(TS_FORMAT).to_string()
}

pub fn parse_ts(s: &str) -> AppResult<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s.trim(), TS_FORMAT)
        .or_else(|_| NaiveDateTime::parse_from_str(s.trim(), "%Y-%m-%dT%H:%M:%S"))
        .map_err(|_| AppError::InvalidTimestamp(s.to_string()))
}

/// Drop sub-second precision so values survive a round-trip through the DB.
pub fn truncate_to_second(ts: NaiveDateTime) -> NaiveDateTime {
    ts.with_nanosecond(0).unwrap_or(ts)
}

/// Local wall-clock time, whole seconds.
pub fn now_local() -> NaiveDateTime {
    truncate_to_second(Local::now().naive_local())
}

/// Whole minutes in `[start, end]`, floored.
pub fn whole_minutes(start: NaiveDateTime, end: NaiveDateTime) -> i64 {
    floor_minutes(end - start)
}

pub fn floor_minutes(delta: TimeDelta) -> i64 {
    let secs = delta.num_seconds();
    // num_seconds truncates toward zero; step down for negative fractional spans
    let secs = if delta < TimeDelta::seconds(secs) { secs - 1 } else { secs };
    secs.div_euclid(60)
}

