use crate::db::queries::parse_ts_col;
use crate::errors::{AppError, AppResult};
use crate::models::feedback::{Feedback, Mood};
use crate::utils::date::DateRange;
use crate::utils::time::format_ts;
use chrono::NaiveDateTime;
use rusqlite::{Connection, params, params_from_iter};

pub fn insert_feedback(
    conn: &Connection,
    account_id: i64,
    mood: Mood,
    comment: &str,
    anonymous: bool,
    submitted_at: NaiveDateTime,
) -> AppResult<i64> {
    conn.execute(
        "INSERT INTO feedback (account_id, mood, comment, is_anonymous, submitted_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            account_id,
            mood.to_db_str(),
            comment,
            if anonymous { 1 } else { 0 },
            format_ts(&submitted_at),
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Filters for `load_feedback`; all optional.
#[derive(Debug, Default, Clone)]
pub struct FeedbackFilter {
    pub range: Option<DateRange>,
    pub mood: Option<Mood>,
    /// Substring matched against username or comment.
    pub keyword: Option<String>,
}

pub fn load_feedback(conn: &Connection, filter: &FeedbackFilter) -> AppResult<Vec<Feedback>> {
    let mut sql = String::from(
        "SELECT f.id, a.username, f.mood, f.comment, f.is_anonymous, f.submitted_at
         FROM feedback f
         LEFT JOIN accounts a ON f.account_id = a.id
         WHERE 1=1",
    );
    let mut params: Vec<String> = Vec::new();

    if let Some(r) = &filter.range {
        sql.push_str(" AND date(f.submitted_at) BETWEEN ? AND ?");
        params.push(r.from.format("%Y-%m-%d").to_string());
        params.push(r.to.format("%Y-%m-%d").to_string());
    }

    if let Some(m) = filter.mood {
        sql.push_str(" AND f.mood = ?");
        params.push(m.to_db_str().to_string());
    }

    if let Some(k) = filter.keyword.as_deref().map(str::trim).filter(|k| !k.is_empty()) {
        // anonymous rows must not be discoverable by their author's name
        sql.push_str(
            " AND ((a.username LIKE ? AND f.is_anonymous = 0) OR f.comment LIKE ?)",
        );
        let pattern = format!("%{}%", k);
        params.push(pattern.clone());
        params.push(pattern);
    }

    sql.push_str(" ORDER BY f.submitted_at DESC, f.id DESC");

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params_from_iter(params.iter()), |row| {
        let mood_str: String = row.get(2)?;
        let mood = Mood::from_db_str(&mood_str).ok_or_else(|| {
            rusqlite::Error::FromSqlConversionFailure(
                2,
                rusqlite::types::Type::Text,
                Box::new(AppError::InvalidMood(mood_str.clone())),
            )
        })?;
        let anonymous = row.get::<_, i64>(4)? == 1;
        let username: Option<String> = row.get(1)?;

        Ok(Feedback {
            id: row.get(0)?,
            username: if anonymous { None } else { username },
            mood,
            comment: row.get(3)?,
            anonymous,
            submitted_at: parse_ts_col(row, 5)?,
        })
    })?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}
