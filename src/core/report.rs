//! Bulk reporting on top of the SQL aggregate, plus a cross-check against
//! the close-time reducer.

use crate::core::reconcile::{events_until, reconcile};
use crate::db::aggregate::bulk_report_for;
use crate::db::pool::DbPool;
use crate::db::queries::load_events_for_session;
use crate::errors::AppResult;
use crate::models::report_row::{Discrepancy, ReportRow};
use crate::utils::date::DateRange;
use crate::utils::time::whole_minutes;
use tracing::debug;

pub struct ReportLogic;

impl ReportLogic {
    pub fn rows(
        pool: &DbPool,
        range: Option<&DateRange>,
        user: Option<&str>,
    ) -> AppResult<Vec<ReportRow>> {
        pool.with_conn(|conn| bulk_report_for(conn, range, user))
    }

    /// Closed sessions whose stored total differs from either the reducer
    /// replayed now or `span - aggregate sleep`. Events stamped after
    /// clock-out are left out of both.
    pub fn verify_totals(
        pool: &DbPool,
        range: Option<&DateRange>,
        user: Option<&str>,
    ) -> AppResult<Vec<Discrepancy>> {
        pool.with_conn(|conn| {
            let rows = bulk_report_for(conn, range, user)?;
            let mut out = Vec::new();

            for row in rows {
                let Some(clock_out) = row.clock_out else {
                    continue;
                };

                let events = events_until(load_events_for_session(conn, row.session_id)?, clock_out);
                let reducer_total = reconcile(row.clock_in, clock_out, &events)?;
                let aggregate_total = whole_minutes(row.clock_in, clock_out) - row.sleep_minutes;

                if reducer_total != row.total_work_minutes || aggregate_total != reducer_total {
                    debug!(
                        session_id = row.session_id,
                        stored = row.total_work_minutes,
                        reducer_total,
                        aggregate_total,
                        "session totals disagree"
                    );
                    out.push(Discrepancy {
                        session_id: row.session_id,
                        username: row.username.clone(),
                        stored_total: row.total_work_minutes,
                        reducer_total,
                        aggregate_total,
                    });
                }
            }

            Ok(out)
        })
    }
}
