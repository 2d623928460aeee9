//! Close-time reconciliation: net worked minutes of one session.
//!
//! Single pass over the chronologically sorted event stream:
//! - `sleep` opens an interval unless one is already open (the earliest
//!   anchor wins, later duplicates are ignored);
//! - `resume` closes the open interval and adds its floored minutes;
//!   a `resume` with nothing open is ignored;
//! - an interval still open at the end contributes nothing.
//!
//! The result is `floor(span / 60s) - sleep` and is never clamped.

use crate::errors::{AppError, AppResult};
use crate::models::event_kind::EventKind;
use crate::models::sleep_event::SleepEvent;
use crate::utils::time::{format_ts, whole_minutes};
use chrono::NaiveDateTime;

/// Breakdown of one reconciliation, anomalies included.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Reconciliation {
    pub span_minutes: i64,
    pub sleep_minutes: i64,
    pub total_minutes: i64,
    /// Complete sleep→resume pairs that were counted.
    pub pairs: usize,
    /// `sleep` events seen while another sleep was already open.
    pub duplicate_sleeps: usize,
    /// `resume` events with no open sleep.
    pub orphan_resumes: usize,
    /// A sleep was still open when the stream ended.
    pub trailing_sleep: bool,
}

impl Reconciliation {
    pub fn is_clean(&self) -> bool {
        self.duplicate_sleeps == 0 && self.orphan_resumes == 0 && !self.trailing_sleep
    }
}

#[derive(Debug, Default, Clone, Copy)]
struct SleepScan {
    minutes: i64,
    pairs: usize,
    duplicate_sleeps: usize,
    orphan_resumes: usize,
    trailing_sleep: bool,
}

fn scan(events: &[SleepEvent]) -> SleepScan {
    // stable: equal timestamps keep their input order
    let mut ordered: Vec<&SleepEvent> = events.iter().collect();
    ordered.sort_by_key(|e| e.event_time);

    let mut out = SleepScan::default();
    let mut open: Option<NaiveDateTime> = None;

    for ev in ordered {
        match ev.kind {
            EventKind::Sleep => {
                if open.is_some() {
                    out.duplicate_sleeps += 1;
                } else {
                    open = Some(ev.event_time);
                }
            }
            EventKind::Resume => match open.take() {
                Some(start) => {
                    out.minutes += whole_minutes(start, ev.event_time);
                    out.pairs += 1;
                }
                None => out.orphan_resumes += 1,
            },
        }
    }

    out.trailing_sleep = open.is_some();
    out
}

/// Minutes subtracted for complete sleep→resume pairs.
pub fn sleep_minutes(events: &[SleepEvent]) -> i64 {
    scan(events).minutes
}

/// Full breakdown; fails only when `clock_out < clock_in`.
pub fn reconcile_detailed(
    clock_in: NaiveDateTime,
    clock_out: NaiveDateTime,
    events: &[SleepEvent],
) -> AppResult<Reconciliation> {
    if clock_out < clock_in {
        return Err(AppError::InvalidBounds {
            clock_in: format_ts(&clock_in),
            clock_out: format_ts(&clock_out),
        });
    }

    let span_minutes = whole_minutes(clock_in, clock_out);
    let s = scan(events);

    Ok(Reconciliation {
        span_minutes,
        sleep_minutes: s.minutes,
        total_minutes: span_minutes - s.minutes,
        pairs: s.pairs,
        duplicate_sleeps: s.duplicate_sleeps,
        orphan_resumes: s.orphan_resumes,
        trailing_sleep: s.trailing_sleep,
    })
}

/// Drop events stamped after `clock_out`; they are kept in the store but
/// never count toward a closed session.
pub fn events_until(mut events: Vec<SleepEvent>, clock_out: NaiveDateTime) -> Vec<SleepEvent> {
    events.retain(|e| e.event_time <= clock_out);
    events
}

/// Net worked minutes for a session bounded by `clock_in`/`clock_out`.
pub fn reconcile(
    clock_in: NaiveDateTime,
    clock_out: NaiveDateTime,
    events: &[SleepEvent],
) -> AppResult<i64> {
    Ok(reconcile_detailed(clock_in, clock_out, events)?.total_minutes)
}
