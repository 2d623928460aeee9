use crate::errors::{AppError, AppResult};
use rusqlite::{Connection, OptionalExtension};
use tracing::{debug, info};

/// Ensure that the `log` table exists. It doubles as the migration ledger.
fn ensure_log_table(conn: &Connection) -> AppResult<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS log (
            id        INTEGER PRIMARY KEY AUTOINCREMENT,
            date      TEXT NOT NULL,
            operation TEXT NOT NULL,
            target    TEXT DEFAULT '',
            message   TEXT NOT NULL
        );
        "#,
    )?;
    Ok(())
}

struct Migration {
    version: &'static str,
    description: &'static str,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[
    Migration {
        version: "20250301_0001_create_accounts",
        description: "Created accounts table",
        sql: r#"
        CREATE TABLE IF NOT EXISTS accounts (
            id         INTEGER PRIMARY KEY AUTOINCREMENT,
            username   TEXT NOT NULL UNIQUE,
            role       TEXT NOT NULL DEFAULT 'employee' CHECK(role IN ('employee','admin')),
            is_active  INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL
        );
        "#,
    },
    Migration {
        version: "20250301_0002_create_sessions",
        description: "Created sessions table",
        sql: r#"
        CREATE TABLE IF NOT EXISTS sessions (
            id                 INTEGER PRIMARY KEY AUTOINCREMENT,
            account_id         INTEGER NOT NULL REFERENCES accounts(id) ON DELETE CASCADE,
            clock_in           TEXT NOT NULL,
            clock_out          TEXT,
            session_date       TEXT NOT NULL,
            total_work_minutes INTEGER,
            CHECK (clock_out IS NULL OR clock_out >= clock_in)
        );

        CREATE INDEX IF NOT EXISTS idx_sessions_date ON sessions(session_date, clock_in);
        CREATE INDEX IF NOT EXISTS idx_sessions_account ON sessions(account_id, clock_in);
        "#,
    },
    Migration {
        version: "20250301_0003_create_sleep_events",
        description: "Created sleep_events table",
        sql: r#"
        CREATE TABLE IF NOT EXISTS sleep_events (
            id         INTEGER PRIMARY KEY AUTOINCREMENT,
            account_id INTEGER NOT NULL REFERENCES accounts(id) ON DELETE CASCADE,
            session_id INTEGER NOT NULL REFERENCES sessions(id) ON DELETE CASCADE,
            event_type TEXT NOT NULL CHECK(event_type IN ('sleep','resume')),
            event_time TEXT NOT NULL,
            source     TEXT NOT NULL DEFAULT 'system' CHECK(source IN ('system','user'))
        );

        CREATE INDEX IF NOT EXISTS idx_sleep_events_session
            ON sleep_events(session_id, event_type, event_time, id);
        "#,
    },
    Migration {
        version: "20250301_0004_create_feedback",
        description: "Created feedback table",
        sql: r#"
        CREATE TABLE IF NOT EXISTS feedback (
            id           INTEGER PRIMARY KEY AUTOINCREMENT,
            account_id   INTEGER REFERENCES accounts(id) ON DELETE CASCADE,
            mood         TEXT NOT NULL
                         CHECK(mood IN ('Terrible','Poor','Good','Great','Excellent')),
            comment      TEXT NOT NULL DEFAULT '',
            is_anonymous INTEGER NOT NULL DEFAULT 0,
            submitted_at TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_feedback_submitted ON feedback(submitted_at);
        "#,
    },
    Migration {
        version: "20250318_0005_one_open_session_per_account",
        description: "Enforced a single open session per account",
        sql: r#"
        CREATE UNIQUE INDEX IF NOT EXISTS idx_sessions_one_open
            ON sessions(account_id) WHERE clock_out IS NULL;
        "#,
    },
];

fn is_applied(conn: &Connection, version: &str) -> AppResult<bool> {
    let mut chk = conn.prepare_cached(
        "SELECT 1 FROM log
         WHERE operation = 'migration_applied' AND target = ?1
         LIMIT 1",
    )?;
    Ok(chk.query_row([version], |_| Ok(())).optional()?.is_some())
}

fn apply(conn: &Connection, m: &Migration) -> AppResult<()> {
    let batch = format!(
        "BEGIN;\n{}\nINSERT INTO log (date, operation, target, message)
         VALUES (datetime('now'), 'migration_applied', '{}', '{}');\nCOMMIT;",
        m.sql, m.version, m.description
    );

    if let Err(e) = conn.execute_batch(&batch) {
        let _ = conn.execute_batch("ROLLBACK;");
        return Err(AppError::Migration(format!("{}: {}", m.version, e)));
    }
    Ok(())
}

/// Public entry point: run all pending migrations.
///
/// Invoked by db::init_db(). Returns the number of migrations applied.
pub fn run_pending_migrations(conn: &Connection) -> AppResult<usize> {
    ensure_log_table(conn)?;

    let mut applied = 0;
    for m in MIGRATIONS {
        if is_applied(conn, m.version)? {
            debug!(version = m.version, "migration already applied");
            continue;
        }
        apply(conn, m)?;
        info!(version = m.version, "migration applied");
        applied += 1;
    }

    Ok(applied)
}

pub fn latest_version() -> &'static str {
    MIGRATIONS.last().map(|m| m.version).unwrap_or("none")
}
