//! Foreground tracking: clock in, watch the session, read event lines from
//! stdin until the user clocks out or the watchdog closes the session.

use crate::cli::commands::clock::report_close;
use crate::config::Config;
use crate::core::session::SessionLogic;
use crate::core::watchdog::{SessionWatchdog, WatchTarget, WatchdogConfig, WatchdogExit};
use crate::db::pool::DbPool;
use crate::db::store::SessionStore;
use crate::errors::{AppError, AppResult};
use crate::models::event_kind::parse_signal;
use crate::models::session::Session;
use crate::ui::messages::{info, success, warning};
use crate::utils::time::{format_ts, now_local};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info as trace_info};

#[derive(Debug)]
enum Stop {
    Requested,
    EndOfInput,
    InputError,
    Interrupted,
    Watchdog,
}

pub fn handle(user: &str, cfg: &Config) -> AppResult<()> {
    let pool = Arc::new(DbPool::new(&cfg.database)?);
    let session = SessionLogic::clock_in(&pool, user, now_local(), cfg.max_session())?;

    success(format!(
        "{} clocked in at {} (session {}).",
        user,
        format_ts(&session.clock_in),
        session.id
    ));
    info("Type sleep, resume, lock or unlock to record events; out, Ctrl-C or EOF clocks out.");

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    let result = runtime.block_on(track_session(
        pool,
        user.to_string(),
        session,
        WatchdogConfig::from(cfg),
    ));

    // a pending stdin read must not keep the process alive
    runtime.shutdown_background();
    result
}

async fn track_session(
    pool: Arc<DbPool>,
    user: String,
    session: Session,
    config: WatchdogConfig,
) -> AppResult<()> {
    let store: Arc<dyn SessionStore> = pool.clone();
    let mut watchdog = SessionWatchdog::spawn(
        store,
        WatchTarget {
            account_id: session.account_id,
            session_id: session.id,
            clock_in: session.clock_in,
        },
        config,
    );

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    let stop = loop {
        tokio::select! {
            _ = watchdog.wait() => break Stop::Watchdog,
            _ = &mut ctrl_c => break Stop::Interrupted,
            line = lines.next_line() => {
                let line = match line {
                    Ok(Some(line)) => line,
                    Ok(None) => break Stop::EndOfInput,
                    Err(e) => {
                        warning(format!("Cannot read input: {}", e));
                        break Stop::InputError;
                    }
                };
                let word = line.trim().to_lowercase();
                if word.is_empty() {
                    continue;
                }
                if word == "out" {
                    break Stop::Requested;
                }
                record_line(&pool, &user, &word).await?;
            }
        }
    };

    trace_info!(session_id = session.id, reason = ?stop, "tracking stopped");

    match watchdog.shutdown().await {
        WatchdogExit::TimedOut(outcome) => {
            if outcome.was_closed_here() {
                SessionLogic::record_timeout(&pool, &user, session.id, &outcome);
            }
            warning(format!(
                "Session {} exceeded {} minutes and was closed automatically.",
                session.id,
                config.max_duration.num_minutes()
            ));
        }
        WatchdogExit::Failed(msg) => warning(format!("Watchdog could not close the session: {}", msg)),
        WatchdogExit::Cancelled => {}
    }

    let session_id = session.id;
    let owner = user.clone();
    let (closed, outcome) = tokio::task::spawn_blocking(move || {
        SessionLogic::close_by_id(&pool, &owner, session_id, now_local())
    })
    .await
    .map_err(|e| AppError::Task(e.to_string()))??;

    report_close(&user, &closed, &outcome);
    debug!(session_id = closed.id, ?outcome, "tracked session finished");
    Ok(())
}

async fn record_line(pool: &Arc<DbPool>, user: &str, word: &str) -> AppResult<()> {
    let Some((kind, source)) = parse_signal(word) else {
        warning(format!("Unknown input '{}': expected sleep, resume, lock, unlock or out.", word));
        return Ok(());
    };

    let pool = Arc::clone(pool);
    let owner = user.to_string();
    let result = tokio::task::spawn_blocking(move || {
        SessionLogic::record_event(&pool, &owner, kind, source, now_local())
    })
    .await
    .map_err(|e| AppError::Task(e.to_string()))?;

    match result {
        Ok(_) => info(format!("{} ({})", kind.to_db_str(), source.to_db_str())),
        // the watchdog may have closed the session in the meantime
        Err(e) => warning(format!("Event not recorded: {}", e)),
    }
    Ok(())
}
