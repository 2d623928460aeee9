use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;

/// One row of the bulk session report.
#[derive(Debug, Clone, Serialize)]
pub struct ReportRow {
    pub session_id: i64,
    pub username: String,
    pub clock_in: NaiveDateTime,
    pub clock_out: Option<NaiveDateTime>,
    pub session_date: NaiveDate,
    /// 0 while the session is still open.
    pub total_work_minutes: i64,
    /// Computed by the SQL pairing aggregate at query time.
    pub sleep_minutes: i64,
}

/// A closed session whose persisted total disagrees with the aggregate.
#[derive(Debug, Clone, Serialize)]
pub struct Discrepancy {
    pub session_id: i64,
    pub username: String,
    pub stored_total: i64,
    pub reducer_total: i64,
    pub aggregate_total: i64,
}
