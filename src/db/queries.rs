//! Session and sleep-event queries.

use crate::errors::{AppError, AppResult};
use crate::models::event_kind::EventKind;
use crate::models::event_source::EventSource;
use crate::models::session::Session;
use crate::models::sleep_event::SleepEvent;
use crate::utils::time::{TS_FORMAT, format_ts};
use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::{Connection, OptionalExtension, Result, Row, TransactionBehavior, params};

const SESSION_COLUMNS: &str =
    "id, account_id, clock_in, clock_out, session_date, total_work_minutes";

fn conversion_error(col: usize, err: AppError) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(col, rusqlite::types::Type::Text, Box::new(err))
}

pub(crate) fn parse_ts_col(row: &Row, idx: usize) -> Result<NaiveDateTime> {
    let raw: String = row.get(idx)?;
    NaiveDateTime::parse_from_str(&raw, TS_FORMAT)
        .map_err(|_| conversion_error(idx, AppError::InvalidTimestamp(raw.clone())))
}

pub(crate) fn parse_opt_ts_col(row: &Row, idx: usize) -> Result<Option<NaiveDateTime>> {
    match row.get::<_, Option<String>>(idx)? {
        Some(raw) => NaiveDateTime::parse_from_str(&raw, TS_FORMAT)
            .map(Some)
            .map_err(|_| conversion_error(idx, AppError::InvalidTimestamp(raw.clone()))),
        None => Ok(None),
    }
}

pub(crate) fn parse_date_col(row: &Row, idx: usize) -> Result<NaiveDate> {
    let raw: String = row.get(idx)?;
    NaiveDate::parse_from_str(&raw, "%Y-%m-%d")
        .map_err(|_| conversion_error(idx, AppError::InvalidDate(raw.clone())))
}

pub fn map_session_row(row: &Row) -> Result<Session> {
    Ok(Session {
        id: row.get(0)?,
        account_id: row.get(1)?,
        clock_in: parse_ts_col(row, 2)?,
        clock_out: parse_opt_ts_col(row, 3)?,
        session_date: parse_date_col(row, 4)?,
        total_work_minutes: row.get(5)?,
    })
}

pub fn map_event_row(row: &Row) -> Result<SleepEvent> {
    let kind_str: String = row.get(3)?;
    let kind = EventKind::from_db_str(&kind_str)
        .ok_or_else(|| conversion_error(3, AppError::InvalidEventType(kind_str.clone())))?;

    let source_str: String = row.get(5)?;
    let source = EventSource::from_db_str(&source_str)
        .ok_or_else(|| conversion_error(5, AppError::InvalidEventSource(source_str.clone())))?;

    Ok(SleepEvent {
        id: row.get(0)?,
        account_id: row.get(1)?,
        session_id: row.get(2)?,
        kind,
        event_time: parse_ts_col(row, 4)?,
        source,
    })
}

pub fn load_session(conn: &Connection, session_id: i64) -> AppResult<Session> {
    let sql = format!("SELECT {} FROM sessions WHERE id = ?1", SESSION_COLUMNS);
    conn.query_row(&sql, [session_id], map_session_row)
        .optional()?
        .ok_or(AppError::SessionNotFound(session_id))
}

pub fn find_open_session(conn: &Connection, account_id: i64) -> AppResult<Option<Session>> {
    let sql = format!(
        "SELECT {} FROM sessions
         WHERE account_id = ?1 AND clock_out IS NULL
         ORDER BY clock_in DESC
         LIMIT 1",
        SESSION_COLUMNS
    );
    Ok(conn.query_row(&sql, [account_id], map_session_row).optional()?)
}

/// Open sessions across all accounts, oldest first.
pub fn list_open_sessions(conn: &Connection) -> AppResult<Vec<Session>> {
    let sql = format!(
        "SELECT {} FROM sessions WHERE clock_out IS NULL ORDER BY clock_in ASC",
        SESSION_COLUMNS
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map([], map_session_row)?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

pub fn sessions_for_account_on(
    conn: &Connection,
    account_id: i64,
    date: &NaiveDate,
) -> AppResult<Vec<Session>> {
    let sql = format!(
        "SELECT {} FROM sessions
         WHERE account_id = ?1 AND session_date = ?2
         ORDER BY clock_in ASC",
        SESSION_COLUMNS
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(
        params![account_id, date.format("%Y-%m-%d").to_string()],
        map_session_row,
    )?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

/// Insert a new open session. Fails with `SessionAlreadyOpen` if the account
/// already has one; the check and the insert share one IMMEDIATE transaction.
pub fn insert_session(
    conn: &mut Connection,
    account_id: i64,
    clock_in: NaiveDateTime,
) -> AppResult<i64> {
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

    if let Some(open) = find_open_session(&tx, account_id)? {
        return Err(AppError::SessionAlreadyOpen {
            account: account_id.to_string(),
            session_id: open.id,
        });
    }

    tx.execute(
        "INSERT INTO sessions (account_id, clock_in, session_date)
         VALUES (?1, ?2, ?3)",
        params![
            account_id,
            format_ts(&clock_in),
            clock_in.date().format("%Y-%m-%d").to_string(),
        ],
    )?;
    let id = tx.last_insert_rowid();
    tx.commit()?;
    Ok(id)
}

/// Set clock_out and the total only if the session is still open.
/// Returns false when another writer closed it first.
pub fn close_session_if_open(
    conn: &Connection,
    session_id: i64,
    clock_out: NaiveDateTime,
    total_minutes: i64,
) -> AppResult<bool> {
    let changed = conn.execute(
        "UPDATE sessions
         SET clock_out = ?1, total_work_minutes = ?2
         WHERE id = ?3 AND clock_out IS NULL",
        params![format_ts(&clock_out), total_minutes, session_id],
    )?;
    Ok(changed == 1)
}

/// Events of one session in chronological order; ties keep insertion order.
pub fn load_events_for_session(conn: &Connection, session_id: i64) -> AppResult<Vec<SleepEvent>> {
    let mut stmt = conn.prepare_cached(
        "SELECT id, account_id, session_id, event_type, event_time, source
         FROM sleep_events
         WHERE session_id = ?1
         ORDER BY event_time ASC, id ASC",
    )?;
    let rows = stmt.query_map([session_id], map_event_row)?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

pub fn insert_event(conn: &Connection, ev: &SleepEvent) -> AppResult<i64> {
    conn.execute(
        "INSERT INTO sleep_events (account_id, session_id, event_type, event_time, source)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            ev.account_id,
            ev.session_id,
            ev.kind.to_db_str(),
            format_ts(&ev.event_time),
            ev.source.to_db_str(),
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn count_rows(conn: &Connection, table: &str) -> AppResult<i64> {
    let sql = format!("SELECT COUNT(*) FROM {}", table);
    Ok(conn.query_row(&sql, [], |row| row.get(0))?)
}
