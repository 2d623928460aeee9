use serde::Serialize;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Employee,
    Admin,
}

impl Role {
    pub fn to_db_str(&self) -> &'static str {
        match self {
            Role::Employee => "employee",
            Role::Admin => "admin",
        }
    }

    pub fn from_db_str(s: &str) -> Option<Self> {
        match s {
            "employee" => Some(Role::Employee),
            "admin" => Some(Role::Admin),
            _ => None,
        }
    }

    /// Helper: parse CLI input (case-insensitive)
    pub fn from_code(code: &str) -> Option<Self> {
        Role::from_db_str(&code.to_lowercase())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Account {
    pub id: i64,
    pub username: String,
    pub role: Role,
    pub is_active: bool,
    pub created_at: String,
}

impl Account {
    pub fn status_label(&self) -> &'static str {
        if self.is_active { "Active" } else { "Disabled" }
    }
}
