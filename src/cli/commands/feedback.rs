use crate::cli::parser::FeedbackAction;
use crate::config::Config;
use crate::core::feedback::FeedbackLogic;
use crate::db::feedback::FeedbackFilter;
use crate::db::pool::DbPool;
use crate::errors::{AppError, AppResult};
use crate::models::feedback::Mood;
use crate::ui::messages::{info, success};
use crate::utils::colors::{GREY, RESET};
use crate::utils::date::parse_period;
use crate::utils::formatting::truncate;
use crate::utils::table::{Column, Table};
use crate::utils::time::format_ts;

fn parse_mood(code: &str) -> AppResult<Mood> {
    Mood::from_code(code).ok_or_else(|| AppError::InvalidMood(code.to_string()))
}

pub fn handle(action: &FeedbackAction, cfg: &Config) -> AppResult<()> {
    let pool = DbPool::new(&cfg.database)?;

    match action {
        FeedbackAction::Submit {
            user,
            mood,
            comment,
            anonymous,
        } => {
            let mood = parse_mood(mood)?;
            let id = FeedbackLogic::submit(&pool, user, mood, comment, *anonymous)?;
            success(format!(
                "Feedback #{} recorded{}.",
                id,
                if *anonymous { " anonymously" } else { "" }
            ));
        }

        FeedbackAction::List {
            period,
            mood,
            keyword,
        } => {
            let filter = FeedbackFilter {
                range: period.as_deref().map(parse_period).transpose()?,
                mood: mood.as_deref().map(parse_mood).transpose()?,
                keyword: keyword.clone(),
            };

            let entries = FeedbackLogic::list(&pool, &filter)?;
            if entries.is_empty() {
                info("No feedback found.");
                return Ok(());
            }

            let mut table = Table::new(vec![
                Column::new("ID", 4),
                Column::new("DATE", 19),
                Column::new("USER", 14),
                Column::new("MOOD", 9),
                Column::new("COMMENT", 40),
            ]);
            for f in &entries {
                let who = f
                    .username
                    .clone()
                    .unwrap_or_else(|| format!("{GREY}anonymous{RESET}"));
                table.add_row(vec![
                    f.id.to_string(),
                    format_ts(&f.submitted_at),
                    who,
                    f.mood.to_db_str().to_string(),
                    truncate(&f.comment, 40),
                ]);
            }
            print!("{}", table.render());
        }
    }

    Ok(())
}
