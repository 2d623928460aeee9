//! Session lifecycle: clock-in, event capture, clock-out, stale sweep.

use crate::core::reconcile::{events_until, reconcile_detailed};
use crate::db::accounts;
use crate::db::log::ttlog_quiet;
use crate::db::pool::DbPool;
use crate::db::queries;
use crate::db::store::SessionStore;
use crate::errors::{AppError, AppResult};
use crate::models::account::Account;
use crate::models::event_kind::EventKind;
use crate::models::event_source::EventSource;
use crate::models::session::{CloseOutcome, Session};
use chrono::{NaiveDateTime, TimeDelta};
use tracing::{debug, info, warn};

/// Reconcile a session's events and persist clock_out + total exactly once.
///
/// If the session is already closed (or gets closed by a concurrent writer
/// between the read and the write), nothing is overwritten and the persisted
/// values are returned as `CloseOutcome::AlreadyClosed`.
pub fn close_and_reconcile<S: SessionStore + ?Sized>(
    store: &S,
    session_id: i64,
    clock_out: NaiveDateTime,
) -> AppResult<CloseOutcome> {
    let session = store.read_session(session_id)?;
    if let Some(existing) = session.clock_out {
        return Ok(CloseOutcome::AlreadyClosed {
            clock_out: existing,
            total_minutes: session.total_work_minutes,
        });
    }

    let events = events_until(store.read_session_events(session_id)?, clock_out);
    let rec = reconcile_detailed(session.clock_in, clock_out, &events)?;

    if !rec.is_clean() {
        warn!(
            session_id,
            duplicate_sleeps = rec.duplicate_sleeps,
            orphan_resumes = rec.orphan_resumes,
            trailing_sleep = rec.trailing_sleep,
            "malformed sleep/resume stream"
        );
    }

    if store.close_session(session_id, clock_out, rec.total_minutes)? {
        debug!(
            session_id,
            span = rec.span_minutes,
            sleep = rec.sleep_minutes,
            total = rec.total_minutes,
            "session closed"
        );
        return Ok(CloseOutcome::Closed {
            total_minutes: rec.total_minutes,
        });
    }

    // lost the race against another writer
    let current = store.read_session(session_id)?;
    info!(session_id, "session was closed concurrently; keeping persisted values");
    Ok(CloseOutcome::AlreadyClosed {
        clock_out: current.clock_out.unwrap_or(clock_out),
        total_minutes: current.total_work_minutes,
    })
}

pub struct SessionLogic;

impl SessionLogic {
    fn active_account(pool: &DbPool, username: &str) -> AppResult<Account> {
        let account = pool.with_conn(|conn| accounts::get_account(conn, username))?;
        if !account.is_active {
            return Err(AppError::AccountInactive(username.to_string()));
        }
        Ok(account)
    }

    fn audit(pool: &DbPool, operation: &str, target: &str, message: &str) {
        let _ = pool.with_conn(|conn| {
            ttlog_quiet(conn, operation, target, message);
            Ok(())
        });
    }

    /// Open a new session for an active account.
    ///
    /// A stale open session (older than `max_duration`) is closed first;
    /// a fresh one makes the call fail with `SessionAlreadyOpen`.
    pub fn clock_in(
        pool: &DbPool,
        username: &str,
        now: NaiveDateTime,
        max_duration: TimeDelta,
    ) -> AppResult<Session> {
        let account = Self::active_account(pool, username)?;

        Self::sweep_stale(pool, now, max_duration, Some(account.id))?;

        let session_id = pool
            .open_session(account.id, now)
            .map_err(|e| match e {
                AppError::SessionAlreadyOpen { session_id, .. } => AppError::SessionAlreadyOpen {
                    account: username.to_string(),
                    session_id,
                },
                other => other,
            })?;

        info!(username, session_id, "clocked in");
        Self::audit(
            pool,
            "clock_in",
            username,
            &format!("Opened session {}", session_id),
        );

        pool.read_session(session_id)
    }

    /// Close the account's open session at `now`.
    pub fn clock_out(
        pool: &DbPool,
        username: &str,
        now: NaiveDateTime,
    ) -> AppResult<(Session, CloseOutcome)> {
        let account = pool.with_conn(|conn| accounts::get_account(conn, username))?;
        let open = pool
            .find_open_session(account.id)?
            .ok_or_else(|| AppError::NoOpenSession(username.to_string()))?;

        Self::close_by_id(pool, username, open.id, now)
    }

    /// Close a known session at `now`; a session already closed elsewhere
    /// (e.g. by the watchdog) is reported as `AlreadyClosed`.
    pub fn close_by_id(
        pool: &DbPool,
        username: &str,
        session_id: i64,
        now: NaiveDateTime,
    ) -> AppResult<(Session, CloseOutcome)> {
        let outcome = close_and_reconcile(pool, session_id, now)?;

        if outcome.was_closed_here() {
            info!(username, session_id, ?outcome, "clocked out");
            Self::audit(
                pool,
                "clock_out",
                username,
                &format!(
                    "Closed session {} ({} min)",
                    session_id,
                    outcome.total_minutes().unwrap_or(0)
                ),
            );
        }

        let closed = pool.read_session(session_id)?;
        Ok((closed, outcome))
    }

    /// Audit line for a session the watchdog closed.
    pub fn record_timeout(pool: &DbPool, username: &str, session_id: i64, outcome: &CloseOutcome) {
        Self::audit(
            pool,
            "timeout",
            username,
            &format!(
                "Session {} closed by watchdog ({} min)",
                session_id,
                outcome.total_minutes().unwrap_or(0)
            ),
        );
    }

    /// Append a sleep/resume event to the account's open session.
    pub fn record_event(
        pool: &DbPool,
        username: &str,
        kind: EventKind,
        source: EventSource,
        at: NaiveDateTime,
    ) -> AppResult<i64> {
        let account = pool.with_conn(|conn| accounts::get_account(conn, username))?;
        let open = pool
            .find_open_session(account.id)?
            .ok_or_else(|| AppError::NoOpenSession(username.to_string()))?;

        let id = pool.log_sleep_event(account.id, open.id, kind, source, at)?;
        debug!(
            username,
            session_id = open.id,
            kind = kind.to_db_str(),
            source = source.to_db_str(),
            "sleep event recorded"
        );
        Ok(id)
    }

    /// Close every open session older than `max_duration`, optionally for one
    /// account only. Clock-out is set to `clock_in + max_duration`.
    pub fn sweep_stale(
        pool: &DbPool,
        now: NaiveDateTime,
        max_duration: TimeDelta,
        account_id: Option<i64>,
    ) -> AppResult<Vec<(Session, CloseOutcome)>> {
        let open = pool.with_conn(|conn| queries::list_open_sessions(conn))?;

        let mut closed = Vec::new();
        for s in open
            .into_iter()
            .filter(|s| account_id.is_none_or(|id| s.account_id == id))
            .filter(|s| now - s.clock_in > max_duration)
        {
            let cutoff = s.clock_in + max_duration;
            let outcome = close_and_reconcile(pool, s.id, cutoff)?;
            if outcome.was_closed_here() {
                warn!(session_id = s.id, clock_in = %s.clock_in, "stale session closed by sweep");
                let username = pool.with_conn(|conn| accounts::username_of(conn, s.account_id))?;
                Self::audit(
                    pool,
                    "sweep",
                    &username,
                    &format!(
                        "Closed stale session {} at {} ({} min)",
                        s.id,
                        cutoff,
                        outcome.total_minutes().unwrap_or(0)
                    ),
                );
            }
            closed.push((s, outcome));
        }

        Ok(closed)
    }

    pub fn today(pool: &DbPool, username: &str, today: chrono::NaiveDate) -> AppResult<Vec<Session>> {
        pool.with_conn(|conn| {
            let account = accounts::get_account(conn, username)?;
            queries::sessions_for_account_on(conn, account.id, &today)
        })
    }
}
