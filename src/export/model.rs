// src/export/model.rs

use crate::models::report_row::ReportRow;
use crate::utils::time::format_ts;
use serde::Serialize;

/// Flat session record for CSV / JSON export.
#[derive(Serialize, Clone, Debug)]
pub struct SessionExport {
    pub session_id: i64,
    pub username: String,
    pub session_date: String,
    pub clock_in: String,
    /// Empty while the session is open.
    pub clock_out: String,
    pub total_work_minutes: i64,
    pub sleep_minutes: i64,
}

impl From<&ReportRow> for SessionExport {
    fn from(r: &ReportRow) -> Self {
        Self {
            session_id: r.session_id,
            username: r.username.clone(),
            session_date: r.session_date.format("%Y-%m-%d").to_string(),
            clock_in: format_ts(&r.clock_in),
            clock_out: r.clock_out.as_ref().map(format_ts).unwrap_or_default(),
            total_work_minutes: r.total_work_minutes,
            sleep_minutes: r.sleep_minutes,
        }
    }
}
