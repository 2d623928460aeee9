use super::event_source::EventSource;
use serde::Serialize;

/// Kind of a captured power/lock transition.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Sleep,
    Resume,
}

impl EventKind {
    /// Convert enum → DB string
    pub fn to_db_str(&self) -> &'static str {
        match self {
            EventKind::Sleep => "sleep",
            EventKind::Resume => "resume",
        }
    }

    /// Convert DB string → enum
    pub fn from_db_str(s: &str) -> Option<Self> {
        match s {
            "sleep" => Some(EventKind::Sleep),
            "resume" => Some(EventKind::Resume),
            _ => None,
        }
    }
}

/// Map an input signal name to the event it records.
///
/// `sleep`/`resume` are power transitions (`system`), `lock`/`unlock` are
/// session lock transitions (`user`).
pub fn parse_signal(s: &str) -> Option<(EventKind, EventSource)> {
    match s.trim().to_lowercase().as_str() {
        "sleep" | "suspend" => Some((EventKind::Sleep, EventSource::System)),
        "resume" | "wake" => Some((EventKind::Resume, EventSource::System)),
        "lock" => Some((EventKind::Sleep, EventSource::User)),
        "unlock" => Some((EventKind::Resume, EventSource::User)),
        _ => None,
    }
}
