//! Set-based sleep-minute aggregation.
//!
//! Pairs every `sleep` event with the earliest later `resume` of the same
//! session, provided no other `sleep` lies strictly between them, and sums the
//! floored minute spans. Events are ordered by `(event_time, id)`, which is the
//! order the close-time reducer sees after its stable sort. An unmatched
//! trailing sleep contributes nothing.
//!
//! Streams with two sleeps and no resume in between pair differently from the
//! reducer: the aggregate anchors on the *latest* sleep, the reducer keeps the
//! *earliest*. `core::report::verify_totals` surfaces sessions where this shows.

use crate::errors::AppResult;
use crate::models::report_row::ReportRow;
use crate::db::queries::{parse_date_col, parse_opt_ts_col, parse_ts_col};
use crate::utils::date::DateRange;
use rusqlite::{Connection, params_from_iter};

/// Correlated scalar subquery; `{session}` is the outer session id expression.
/// Aliases are prefixed `se`/`ss` so they never shadow the outer query's.
/// On a closed session only resumes up to `clock_out` pair.
const SLEEP_MINUTES_SUBQUERY: &str = r#"
    SELECT COALESCE(SUM(
        (CAST(strftime('%s', se_r.event_time) AS INTEGER)
         - CAST(strftime('%s', se_s.event_time) AS INTEGER)) / 60
    ), 0)
    FROM sleep_events se_s
    JOIN sessions ss ON ss.id = se_s.session_id
    JOIN sleep_events se_r
      ON se_r.session_id = se_s.session_id
     AND se_r.event_type = 'resume'
     AND (se_r.event_time > se_s.event_time
          OR (se_r.event_time = se_s.event_time AND se_r.id > se_s.id))
    WHERE se_s.session_id = {session}
      AND se_s.event_type = 'sleep'
      AND (ss.clock_out IS NULL OR se_r.event_time <= ss.clock_out)
      -- se_r is the first resume after se_s
      AND NOT EXISTS (
          SELECT 1 FROM sleep_events se_r2
          WHERE se_r2.session_id = se_s.session_id
            AND se_r2.event_type = 'resume'
            AND (se_r2.event_time > se_s.event_time
                 OR (se_r2.event_time = se_s.event_time AND se_r2.id > se_s.id))
            AND (se_r2.event_time < se_r.event_time
                 OR (se_r2.event_time = se_r.event_time AND se_r2.id < se_r.id))
      )
      -- and no other sleep sits between se_s and se_r
      AND NOT EXISTS (
          SELECT 1 FROM sleep_events se_x
          WHERE se_x.session_id = se_s.session_id
            AND se_x.event_type = 'sleep'
            AND (se_x.event_time > se_s.event_time
                 OR (se_x.event_time = se_s.event_time AND se_x.id > se_s.id))
            AND (se_x.event_time < se_r.event_time
                 OR (se_x.event_time = se_r.event_time AND se_x.id < se_r.id))
      )
"#;

fn sleep_minutes_subquery(session_expr: &str) -> String {
    SLEEP_MINUTES_SUBQUERY.replace("{session}", session_expr)
}

/// Sleep minutes of one session, computed entirely in SQL.
pub fn aggregate_sleep_minutes(conn: &Connection, session_id: i64) -> AppResult<i64> {
    let sql = sleep_minutes_subquery("?1");
    Ok(conn.query_row(&sql, [session_id], |row| row.get(0))?)
}

/// All sessions (optionally restricted to `session_date` in `range`) with
/// their aggregated sleep minutes, newest first.
pub fn bulk_report(conn: &Connection, range: Option<&DateRange>) -> AppResult<Vec<ReportRow>> {
    bulk_report_for(conn, range, None)
}

/// `bulk_report` narrowed to usernames containing `user` (case-insensitive).
pub fn bulk_report_for(
    conn: &Connection,
    range: Option<&DateRange>,
    user: Option<&str>,
) -> AppResult<Vec<ReportRow>> {
    let mut sql = format!(
        r#"
        SELECT
            s.id,
            a.username,
            s.clock_in,
            s.clock_out,
            s.session_date,
            IFNULL(s.total_work_minutes, 0),
            ({}) AS sleep_minutes
        FROM sessions s
        JOIN accounts a ON s.account_id = a.id
        "#,
        sleep_minutes_subquery("s.id")
    );

    sql.push_str(" WHERE 1=1");
    let mut params: Vec<String> = Vec::new();
    if let Some(r) = range {
        sql.push_str(" AND s.session_date BETWEEN ? AND ?");
        params.push(r.from.format("%Y-%m-%d").to_string());
        params.push(r.to.format("%Y-%m-%d").to_string());
    }
    if let Some(u) = user {
        sql.push_str(" AND a.username LIKE ?");
        params.push(format!("%{}%", u));
    }
    sql.push_str(" ORDER BY s.session_date DESC, s.clock_in DESC, s.id DESC");

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params_from_iter(params.iter()), |row| {
        Ok(ReportRow {
            session_id: row.get(0)?,
            username: row.get(1)?,
            clock_in: parse_ts_col(row, 2)?,
            clock_out: parse_opt_ts_col(row, 3)?,
            session_date: parse_date_col(row, 4)?,
            total_work_minutes: row.get(5)?,
            sleep_minutes: row.get(6)?,
        })
    })?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}
