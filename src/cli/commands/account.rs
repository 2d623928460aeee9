use crate::cli::commands::ask_confirmation;
use crate::cli::parser::AccountAction;
use crate::config::Config;
use crate::core::account::AccountLogic;
use crate::db::pool::DbPool;
use crate::errors::{AppError, AppResult};
use crate::models::account::Role;
use crate::ui::messages::{info, success};
use crate::utils::colors::{GREEN, GREY, RESET};
use crate::utils::table::{Column, Table};

pub fn handle(action: &AccountAction, cfg: &Config) -> AppResult<()> {
    let pool = DbPool::new(&cfg.database)?;

    match action {
        AccountAction::Add {
            username,
            role,
            active,
        } => {
            let role = Role::from_code(role).ok_or_else(|| AppError::InvalidRole(role.clone()))?;
            let id = AccountLogic::create(&pool, username, role, *active)?;
            success(format!(
                "Account '{}' created (id {}, {}, {}).",
                username,
                id,
                role.to_db_str(),
                if *active { "active" } else { "disabled" }
            ));
        }

        AccountAction::List => {
            let accounts = AccountLogic::list(&pool)?;
            if accounts.is_empty() {
                info("No accounts found.");
                return Ok(());
            }

            let mut table = Table::new(vec![
                Column::new("ID", 4),
                Column::new("USERNAME", 20),
                Column::new("ROLE", 9),
                Column::new("STATUS", 9),
                Column::new("CREATED", 19),
            ]);
            for a in &accounts {
                let color = if a.is_active { GREEN } else { GREY };
                table.add_row(vec![
                    a.id.to_string(),
                    a.username.clone(),
                    a.role.to_db_str().to_string(),
                    format!("{}{}{}", color, a.status_label(), RESET),
                    a.created_at.clone(),
                ]);
            }
            print!("{}", table.render());
        }

        AccountAction::Enable { username } => {
            AccountLogic::set_active(&pool, username, true)?;
            success(format!("Account '{}' enabled.", username));
        }

        AccountAction::Disable { username } => {
            AccountLogic::set_active(&pool, username, false)?;
            success(format!("Account '{}' disabled.", username));
        }

        AccountAction::Del { username, yes } => {
            let prompt = format!(
                "Delete account '{}' with ALL its sessions, events and feedback? This action is irreversible.",
                username
            );
            if !*yes && !ask_confirmation(&prompt) {
                info("Operation cancelled.");
                return Ok(());
            }

            let stats = AccountLogic::delete(&pool, username)?;
            success(format!(
                "Account '{}' deleted ({} sessions, {} sleep events, {} feedback).",
                username, stats.sessions, stats.sleep_events, stats.feedback
            ));
        }
    }

    Ok(())
}
