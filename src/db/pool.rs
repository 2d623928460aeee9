//! SQLite connection wrapper shared between the CLI thread and background tasks.

use crate::db::initialize::init_db;
use crate::errors::{AppError, AppResult};
use rusqlite::Connection;
use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;

pub struct DbPool {
    conn: Mutex<Connection>,
    path: String,
}

impl DbPool {
    /// Open (or create) the database at `path` and bring the schema up to date.
    pub fn new(path: &str) -> AppResult<Self> {
        let conn = Connection::open(Path::new(path))?;
        Self::from_connection(conn, path)
    }

    /// Private in-memory database, mostly for tests.
    pub fn in_memory() -> AppResult<Self> {
        let conn = Connection::open_in_memory()?;
        Self::from_connection(conn, ":memory:")
    }

    fn from_connection(conn: Connection, path: &str) -> AppResult<Self> {
        conn.busy_timeout(Duration::from_secs(5))?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        init_db(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
            path: path.to_string(),
        })
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Helper to execute a closure with a mutable connection reference.
    pub fn with_conn<F, T>(&self, func: F) -> AppResult<T>
    where
        F: FnOnce(&mut Connection) -> AppResult<T>,
    {
        let mut guard = self.conn.lock().map_err(|_| AppError::LockPoisoned)?;
        func(&mut guard)
    }
}
