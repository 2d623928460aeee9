use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct Session {
    pub id: i64,
    pub account_id: i64,
    pub clock_in: NaiveDateTime,
    pub clock_out: Option<NaiveDateTime>, // None ⇔ open
    pub session_date: NaiveDate,          // clock_in.date(), never updated
    pub total_work_minutes: Option<i64>,  // set together with clock_out
}

impl Session {
    pub fn is_open(&self) -> bool {
        self.clock_out.is_none()
    }

    pub fn bounds(&self) -> SessionBounds {
        SessionBounds {
            clock_in: self.clock_in,
            clock_out: self.clock_out,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionBounds {
    pub clock_in: NaiveDateTime,
    pub clock_out: Option<NaiveDateTime>,
}

/// Result of trying to close a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CloseOutcome {
    /// This call set clock_out and the total.
    Closed { total_minutes: i64 },
    /// Someone else closed the row first; values are the persisted ones.
    AlreadyClosed {
        clock_out: NaiveDateTime,
        total_minutes: Option<i64>,
    },
}

impl CloseOutcome {
    pub fn total_minutes(&self) -> Option<i64> {
        match self {
            CloseOutcome::Closed { total_minutes } => Some(*total_minutes),
            CloseOutcome::AlreadyClosed { total_minutes, .. } => *total_minutes,
        }
    }

    pub fn was_closed_here(&self) -> bool {
        matches!(self, CloseOutcome::Closed { .. })
    }
}
