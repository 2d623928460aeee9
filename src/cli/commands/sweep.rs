use crate::config::Config;
use crate::core::session::SessionLogic;
use crate::db::pool::DbPool;
use crate::errors::AppResult;
use crate::ui::messages::{detail, info, success};
use crate::utils::time::{format_ts, now_local};

pub fn handle(cfg: &Config) -> AppResult<()> {
    let pool = DbPool::new(&cfg.database)?;
    let swept = SessionLogic::sweep_stale(&pool, now_local(), cfg.max_session(), None)?;

    let closed: Vec<_> = swept
        .iter()
        .filter(|(_, outcome)| outcome.was_closed_here())
        .collect();

    if closed.is_empty() {
        info(format!(
            "No sessions open longer than {} minutes.",
            cfg.max_session_minutes
        ));
        return Ok(());
    }

    for (session, outcome) in &closed {
        detail(format!(
            "session {} (account {}) opened {} → {} min",
            session.id,
            session.account_id,
            format_ts(&session.clock_in),
            outcome.total_minutes().unwrap_or(0)
        ));
    }
    success(format!("Closed {} stale session(s).", closed.len()));
    Ok(())
}
