use serde::Serialize;

/// Where a sleep/resume event came from.
/// `System` is an OS suspend/resume, `User` a session lock/unlock.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum EventSource {
    #[default]
    System,
    User,
}

impl EventSource {
    pub fn to_db_str(&self) -> &'static str {
        match self {
            EventSource::System => "system",
            EventSource::User => "user",
        }
    }

    pub fn from_db_str(s: &str) -> Option<Self> {
        match s {
            "system" => Some(EventSource::System),
            "user" => Some(EventSource::User),
            _ => None,
        }
    }
}
