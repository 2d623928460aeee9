//! Persistence seams used by the session core and the watchdog.

use crate::db::pool::DbPool;
use crate::db::{feedback, queries};
use crate::errors::AppResult;
use crate::models::event_kind::EventKind;
use crate::models::event_source::EventSource;
use crate::models::feedback::Mood;
use crate::models::session::{Session, SessionBounds};
use crate::models::sleep_event::SleepEvent;
use crate::utils::time::{now_local, truncate_to_second};
use chrono::NaiveDateTime;

/// Session ledger + event log.
///
/// Implementations must be callable from any thread; event logging in
/// particular may race with closing the session it refers to.
pub trait SessionStore: Send + Sync {
    /// Create an open session; errors if the account already has one.
    fn open_session(&self, account_id: i64, clock_in: NaiveDateTime) -> AppResult<i64>;

    /// Conditionally close: returns false when the session was already closed.
    fn close_session(
        &self,
        session_id: i64,
        clock_out: NaiveDateTime,
        total_minutes: i64,
    ) -> AppResult<bool>;

    fn read_session(&self, session_id: i64) -> AppResult<Session>;

    fn read_session_bounds(&self, session_id: i64) -> AppResult<SessionBounds> {
        Ok(self.read_session(session_id)?.bounds())
    }

    /// Events ordered by time, ties in insertion order.
    fn read_session_events(&self, session_id: i64) -> AppResult<Vec<SleepEvent>>;

    fn log_sleep_event(
        &self,
        account_id: i64,
        session_id: i64,
        kind: EventKind,
        source: EventSource,
        at: NaiveDateTime,
    ) -> AppResult<i64>;

    fn find_open_session(&self, account_id: i64) -> AppResult<Option<Session>>;
}

/// Whoever owns persistence accepts employee feedback through this.
pub trait FeedbackSink {
    fn submit_feedback(
        &self,
        account_id: i64,
        mood: Mood,
        comment: &str,
        anonymous: bool,
    ) -> AppResult<i64>;
}

impl SessionStore for DbPool {
    fn open_session(&self, account_id: i64, clock_in: NaiveDateTime) -> AppResult<i64> {
        let clock_in = truncate_to_second(clock_in);
        self.with_conn(|conn| queries::insert_session(conn, account_id, clock_in))
    }

    fn close_session(
        &self,
        session_id: i64,
        clock_out: NaiveDateTime,
        total_minutes: i64,
    ) -> AppResult<bool> {
        let clock_out = truncate_to_second(clock_out);
        self.with_conn(|conn| {
            queries::close_session_if_open(conn, session_id, clock_out, total_minutes)
        })
    }

    fn read_session(&self, session_id: i64) -> AppResult<Session> {
        self.with_conn(|conn| queries::load_session(conn, session_id))
    }

    fn read_session_events(&self, session_id: i64) -> AppResult<Vec<SleepEvent>> {
        self.with_conn(|conn| queries::load_events_for_session(conn, session_id))
    }

    fn log_sleep_event(
        &self,
        account_id: i64,
        session_id: i64,
        kind: EventKind,
        source: EventSource,
        at: NaiveDateTime,
    ) -> AppResult<i64> {
        let ev = SleepEvent::new(account_id, session_id, kind, truncate_to_second(at), source);
        self.with_conn(|conn| queries::insert_event(conn, &ev))
    }

    fn find_open_session(&self, account_id: i64) -> AppResult<Option<Session>> {
        self.with_conn(|conn| queries::find_open_session(conn, account_id))
    }
}

impl FeedbackSink for DbPool {
    fn submit_feedback(
        &self,
        account_id: i64,
        mood: Mood,
        comment: &str,
        anonymous: bool,
    ) -> AppResult<i64> {
        self.with_conn(|conn| {
            feedback::insert_feedback(conn, account_id, mood, comment, anonymous, now_local())
        })
    }
}
