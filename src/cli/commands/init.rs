use crate::cli::parser::Cli;
use crate::config::Config;
use crate::db::log;
use crate::db::pool::DbPool;
use crate::errors::AppResult;
use crate::ui::messages::warning;

/// Handle the `init` command
///
/// This initializes:
///  - the config directory and file (skipped in test mode)
///  - the SQLite database and its pending migrations
pub fn handle(cli: &Cli) -> AppResult<()> {
    let cfg = Config::init_all(cli.db.clone(), cli.test)?;
    let db_path = cfg.database.clone();

    println!("⚙️  Initializing rTimeclock…");
    if !cli.test {
        println!("📄 Config file : {}", Config::config_file().display());
    }
    println!("🗄️  Database   : {}", &db_path);

    let pool = DbPool::new(&db_path)?;

    println!("✅ Database initialized at {}", &db_path);

    let logged = pool.with_conn(|conn| {
        log::ttlog(
            conn,
            "init",
            "",
            &format!("Database initialized at {}", &db_path),
        )
    });
    if let Err(e) = logged {
        warning(format!("Failed to write internal log: {}", e));
    }

    println!("🎉 rTimeclock initialization completed!");
    Ok(())
}
