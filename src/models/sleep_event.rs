use super::{event_kind::EventKind, event_source::EventSource};
use chrono::NaiveDateTime;
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct SleepEvent {
    pub id: i64,
    pub account_id: i64,
    pub session_id: i64,
    pub kind: EventKind,          // ⇔ sleep_events.event_type ('sleep' | 'resume')
    pub event_time: NaiveDateTime, // ⇔ sleep_events.event_time (TEXT "YYYY-MM-DD HH:MM:SS")
    pub source: EventSource,      // ⇔ sleep_events.source ('system' | 'user')
}

impl SleepEvent {
    /// Build an event that has not been persisted yet (`id = 0`).
    pub fn new(
        account_id: i64,
        session_id: i64,
        kind: EventKind,
        event_time: NaiveDateTime,
        source: EventSource,
    ) -> Self {
        Self {
            id: 0,
            account_id,
            session_id,
            kind,
            event_time,
            source,
        }
    }
}
