use crate::db::migrate::latest_version;
use crate::db::pool::DbPool;
use crate::db::queries::count_rows;
use crate::errors::AppResult;
use crate::utils::colors::{CYAN, GREEN, GREY, RESET, YELLOW};
use rusqlite::OptionalExtension;
use std::fs;

pub fn print_db_info(pool: &DbPool) -> AppResult<()> {
    println!();

    //
    // 1) FILE SIZE
    //
    let db_path = pool.path();
    let file_size = fs::metadata(db_path).map(|m| m.len()).unwrap_or(0);
    let file_mb = (file_size as f64) / (1024.0 * 1024.0);

    println!("{}• File:{} {}{}{}", CYAN, RESET, YELLOW, db_path, RESET);
    println!("{}• Size:{} {:.2} MB", CYAN, RESET, file_mb);
    println!("{}• Schema:{} {}", CYAN, RESET, latest_version());

    pool.with_conn(|conn| {
        //
        // 2) ROW COUNTS
        //
        for table in ["accounts", "sessions", "sleep_events", "feedback"] {
            let count = count_rows(conn, table)?;
            println!("{}• {}:{} {}{}{}", CYAN, table, RESET, GREEN, count, RESET);
        }

        let open: i64 = conn.query_row(
            "SELECT COUNT(*) FROM sessions WHERE clock_out IS NULL",
            [],
            |row| row.get(0),
        )?;
        println!("{}• open sessions:{} {}", CYAN, RESET, open);

        //
        // 3) DATE RANGE
        //
        let range: Option<(Option<String>, Option<String>)> = conn
            .query_row(
                "SELECT MIN(session_date), MAX(session_date) FROM sessions",
                [],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;

        let (first, last) = range.unwrap_or((None, None));
        let grey = format!("{GREY}--{RESET}");
        println!("{}• Date range:{}", CYAN, RESET);
        println!("    from: {}", first.unwrap_or_else(|| grey.clone()));
        println!("    to:   {}", last.unwrap_or(grey));

        Ok(())
    })?;

    println!();
    Ok(())
}
