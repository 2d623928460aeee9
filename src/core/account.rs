use crate::db::accounts::{self, DeleteStats};
use crate::db::log::ttlog_quiet;
use crate::db::pool::DbPool;
use crate::errors::AppResult;
use crate::models::account::{Account, Role};
use tracing::info;

pub struct AccountLogic;

impl AccountLogic {
    pub fn create(pool: &DbPool, username: &str, role: Role, active: bool) -> AppResult<i64> {
        pool.with_conn(|conn| {
            let id = accounts::insert_account(conn, username, role, active)?;
            ttlog_quiet(
                conn,
                "account_add",
                username,
                &format!("Created {} account (active={})", role.to_db_str(), active),
            );
            Ok(id)
        })
    }

    pub fn list(pool: &DbPool) -> AppResult<Vec<Account>> {
        pool.with_conn(|conn| accounts::list_accounts(conn))
    }

    pub fn set_active(pool: &DbPool, username: &str, active: bool) -> AppResult<()> {
        pool.with_conn(|conn| {
            accounts::set_active(conn, username, active)?;
            let op = if active { "account_enable" } else { "account_disable" };
            ttlog_quiet(conn, op, username, "Account status changed");
            Ok(())
        })
    }

    /// Cascade delete; all-or-nothing.
    pub fn delete(pool: &DbPool, username: &str) -> AppResult<DeleteStats> {
        pool.with_conn(|conn| {
            let stats = accounts::delete_account(conn, username)?;
            info!(username, ?stats, "account deleted");
            ttlog_quiet(
                conn,
                "account_del",
                username,
                &format!(
                    "Deleted account with {} sessions, {} sleep events, {} feedback",
                    stats.sessions, stats.sleep_events, stats.feedback
                ),
            );
            Ok(stats)
        })
    }
}
