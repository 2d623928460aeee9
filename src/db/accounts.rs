//! Account CRUD, including the transactional cascade delete.

use crate::errors::{AppError, AppResult};
use crate::models::account::{Account, Role};
use crate::utils::time::{format_ts, now_local};
use rusqlite::{Connection, OptionalExtension, Row, params};

fn map_account_row(row: &Row) -> rusqlite::Result<Account> {
    let role_str: String = row.get(2)?;
    let role = Role::from_db_str(&role_str).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            2,
            rusqlite::types::Type::Text,
            Box::new(AppError::InvalidRole(role_str.clone())),
        )
    })?;

    Ok(Account {
        id: row.get(0)?,
        username: row.get(1)?,
        role,
        is_active: row.get::<_, i64>(3)? == 1,
        created_at: row.get(4)?,
    })
}

pub fn insert_account(
    conn: &Connection,
    username: &str,
    role: Role,
    active: bool,
) -> AppResult<i64> {
    if find_account(conn, username)?.is_some() {
        return Err(AppError::AccountExists(username.to_string()));
    }

    conn.execute(
        "INSERT INTO accounts (username, role, is_active, created_at)
         VALUES (?1, ?2, ?3, ?4)",
        params![
            username,
            role.to_db_str(),
            if active { 1 } else { 0 },
            format_ts(&now_local())
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn find_account(conn: &Connection, username: &str) -> AppResult<Option<Account>> {
    Ok(conn
        .query_row(
            "SELECT id, username, role, is_active, created_at
             FROM accounts WHERE username = ?1",
            [username],
            map_account_row,
        )
        .optional()?)
}

pub fn username_of(conn: &Connection, account_id: i64) -> AppResult<String> {
    conn.query_row(
        "SELECT username FROM accounts WHERE id = ?1",
        [account_id],
        |row| row.get(0),
    )
    .optional()?
    .ok_or_else(|| AppError::AccountNotFound(format!("#{}", account_id)))
}

pub fn get_account(conn: &Connection, username: &str) -> AppResult<Account> {
    find_account(conn, username)?.ok_or_else(|| AppError::AccountNotFound(username.to_string()))
}

pub fn list_accounts(conn: &Connection) -> AppResult<Vec<Account>> {
    let mut stmt = conn.prepare(
        "SELECT id, username, role, is_active, created_at
         FROM accounts ORDER BY username ASC",
    )?;
    let rows = stmt.query_map([], map_account_row)?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

pub fn set_active(conn: &Connection, username: &str, active: bool) -> AppResult<()> {
    let changed = conn.execute(
        "UPDATE accounts SET is_active = ?1 WHERE username = ?2",
        params![if active { 1 } else { 0 }, username],
    )?;
    if changed == 0 {
        return Err(AppError::AccountNotFound(username.to_string()));
    }
    Ok(())
}

/// Rows removed by a cascade delete.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DeleteStats {
    pub sleep_events: usize,
    pub sessions: usize,
    pub feedback: usize,
}

/// Delete an account and everything it owns in one transaction.
/// Any failing step rolls the whole cascade back.
pub fn delete_account(conn: &mut Connection, username: &str) -> AppResult<DeleteStats> {
    let tx = conn.transaction()?;

    let account_id: i64 = tx
        .query_row(
            "SELECT id FROM accounts WHERE username = ?1",
            [username],
            |row| row.get(0),
        )
        .optional()?
        .ok_or_else(|| AppError::AccountNotFound(username.to_string()))?;

    let sleep_events = tx.execute(
        "DELETE FROM sleep_events
         WHERE account_id = ?1
            OR session_id IN (SELECT id FROM sessions WHERE account_id = ?1)",
        [account_id],
    )?;
    let sessions = tx.execute("DELETE FROM sessions WHERE account_id = ?1", [account_id])?;
    let feedback = tx.execute("DELETE FROM feedback WHERE account_id = ?1", [account_id])?;

    let deleted = tx.execute("DELETE FROM accounts WHERE id = ?1", [account_id])?;
    if deleted == 0 {
        // dropping `tx` rolls back
        return Err(AppError::AccountNotFound(username.to_string()));
    }

    tx.commit()?;

    Ok(DeleteStats {
        sleep_events,
        sessions,
        feedback,
    })
}
