use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::session::SessionLogic;
use crate::db::pool::DbPool;
use crate::errors::{AppError, AppResult};
use crate::models::event_kind::parse_signal;
use crate::models::session::{CloseOutcome, Session};
use crate::ui::messages::{info, success, warning};
use crate::utils::colors::{GREY, RESET, color_for_total};
use crate::utils::date;
use crate::utils::formatting::mins2readable;
use crate::utils::table::{Column, Table};
use crate::utils::time::{format_ts, now_local};

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    let pool = DbPool::new(&cfg.database)?;

    match cmd {
        Commands::ClockIn { user } => {
            let session = SessionLogic::clock_in(&pool, user, now_local(), cfg.max_session())?;
            success(format!(
                "{} clocked in at {} (session {}).",
                user,
                format_ts(&session.clock_in),
                session.id
            ));
        }

        Commands::ClockOut { user } => {
            let (session, outcome) = SessionLogic::clock_out(&pool, user, now_local())?;
            report_close(user, &session, &outcome);
        }

        Commands::Event { user, kind } => {
            let (kind, source) =
                parse_signal(kind).ok_or_else(|| AppError::InvalidEventType(kind.clone()))?;
            SessionLogic::record_event(&pool, user, kind, source, now_local())?;
            success(format!(
                "Recorded {} ({}) for {}.",
                kind.to_db_str(),
                source.to_db_str(),
                user
            ));
        }

        Commands::Today { user } => {
            let sessions = SessionLogic::today(&pool, user, date::today())?;
            print_today(user, &sessions);
        }

        _ => {}
    }

    Ok(())
}

/// Shared by `clock-out` and `track`.
pub(crate) fn report_close(user: &str, session: &Session, outcome: &CloseOutcome) {
    let total = outcome.total_minutes().unwrap_or(0);
    let clock_out = session
        .clock_out
        .map(|t| format_ts(&t))
        .unwrap_or_else(|| "--".to_string());

    match outcome {
        CloseOutcome::Closed { .. } => success(format!(
            "{} clocked out at {} (session {}): worked {}{}{} ({} min).",
            user,
            clock_out,
            session.id,
            color_for_total(total),
            mins2readable(total, false, false),
            RESET,
            total
        )),
        CloseOutcome::AlreadyClosed { .. } => warning(format!(
            "Session {} was already closed at {}: worked {} ({} min).",
            session.id,
            clock_out,
            mins2readable(total, false, false),
            total
        )),
    }
}

fn print_today(user: &str, sessions: &[Session]) {
    if sessions.is_empty() {
        info(format!("No sessions today for {}.", user));
        return;
    }

    let mut table = Table::new(vec![
        Column::new("ID", 5),
        Column::new("IN", 19),
        Column::new("OUT", 19),
        Column::new("WORKED", 9),
    ]);

    let mut sum = 0;
    for s in sessions {
        let (out, worked) = match (s.clock_out, s.total_work_minutes) {
            (Some(out), Some(total)) => {
                sum += total;
                (format_ts(&out), mins2readable(total, false, true))
            }
            _ => (format!("{GREY}open{RESET}"), format!("{GREY}--:--{RESET}")),
        };
        table.add_row(vec![s.id.to_string(), format_ts(&s.clock_in), out, worked]);
    }

    println!("📅 {} on {}\n", user, date::today());
    print!("{}", table.render());
    println!("\nTotal worked: {}", mins2readable(sum, false, false));
}
