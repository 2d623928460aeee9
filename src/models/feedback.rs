use chrono::NaiveDateTime;
use serde::Serialize;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub enum Mood {
    Terrible,
    Poor,
    Good,
    Great,
    Excellent,
}

impl Mood {
    pub const ALL: [Mood; 5] = [
        Mood::Terrible,
        Mood::Poor,
        Mood::Good,
        Mood::Great,
        Mood::Excellent,
    ];

    pub fn to_db_str(&self) -> &'static str {
        match self {
            Mood::Terrible => "Terrible",
            Mood::Poor => "Poor",
            Mood::Good => "Good",
            Mood::Great => "Great",
            Mood::Excellent => "Excellent",
        }
    }

    pub fn from_db_str(s: &str) -> Option<Self> {
        Mood::ALL.into_iter().find(|m| m.to_db_str() == s)
    }

    /// Helper: parse CLI input (case-insensitive)
    pub fn from_code(code: &str) -> Option<Self> {
        Mood::ALL
            .into_iter()
            .find(|m| m.to_db_str().eq_ignore_ascii_case(code.trim()))
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Feedback {
    pub id: i64,
    /// None when submitted anonymously or when the author was deleted.
    pub username: Option<String>,
    pub mood: Mood,
    pub comment: String,
    pub anonymous: bool,
    pub submitted_at: NaiveDateTime,
}
