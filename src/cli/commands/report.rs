use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::report::ReportLogic;
use crate::db::pool::DbPool;
use crate::errors::{AppError, AppResult};
use crate::export::ExportLogic;
use crate::models::report_row::ReportRow;
use crate::ui::messages::{info, success, warning};
use crate::utils::colors::{GREY, RESET, color_for_total};
use crate::utils::date::{DateRange, parse_period};
use crate::utils::formatting::mins2readable;
use crate::utils::table::{Column, Table};
use tracing::debug;

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Report {
        period,
        user,
        verify,
        export,
        file,
        force,
        json,
    } = cmd
    {
        let range: Option<DateRange> = period.as_deref().map(parse_period).transpose()?;
        let pool = DbPool::new(&cfg.database)?;

        if let Some(format) = export {
            let file = file
                .as_deref()
                .ok_or_else(|| AppError::Other("--export requires --file".to_string()))?;
            let count = ExportLogic::export(
                &pool,
                *format,
                file,
                range.as_ref(),
                user.as_deref(),
                *force,
            )?;
            debug!(count, format = format.as_str(), "report exported");
            return Ok(());
        }

        if *verify {
            return print_discrepancies(&pool, range.as_ref(), user.as_deref(), *json);
        }

        let rows = ReportLogic::rows(&pool, range.as_ref(), user.as_deref())?;

        if *json {
            println!("{}", serde_json::to_string_pretty(&rows)?);
            return Ok(());
        }

        print_rows(&rows);
    }

    Ok(())
}

fn print_rows(rows: &[ReportRow]) {
    if rows.is_empty() {
        info("No sessions found for selected period.");
        return;
    }

    let mut table = Table::new(vec![
        Column::new("ID", 5),
        Column::new("USER", 14),
        Column::new("DATE", 10),
        Column::new("IN", 8),
        Column::new("OUT", 8),
        Column::new("SLEEP", 6),
        Column::new("WORKED", 6),
    ]);

    let mut total = 0;
    for r in rows {
        let out = match r.clock_out {
            Some(t) => t.format("%H:%M:%S").to_string(),
            None => format!("{GREY}open{RESET}    "),
        };
        total += r.total_work_minutes;
        table.add_row(vec![
            r.session_id.to_string(),
            r.username.clone(),
            r.session_date.to_string(),
            r.clock_in.format("%H:%M:%S").to_string(),
            out,
            mins2readable(r.sleep_minutes, false, true),
            format!(
                "{}{}{}",
                color_for_total(r.total_work_minutes),
                mins2readable(r.total_work_minutes, false, true),
                RESET
            ),
        ]);
    }

    print!("{}", table.render());
    println!(
        "\n{} session(s), total worked {}",
        rows.len(),
        mins2readable(total, false, false)
    );
}

fn print_discrepancies(
    pool: &DbPool,
    range: Option<&DateRange>,
    user: Option<&str>,
    json: bool,
) -> AppResult<()> {
    let found = ReportLogic::verify_totals(pool, range, user)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&found)?);
        return Ok(());
    }

    if found.is_empty() {
        success("All closed sessions agree with the aggregate.");
        return Ok(());
    }

    warning(format!("{} session(s) disagree:", found.len()));
    let mut table = Table::new(vec![
        Column::new("ID", 5),
        Column::new("USER", 14),
        Column::new("STORED", 7),
        Column::new("REDUCER", 7),
        Column::new("AGGREGATE", 9),
    ]);
    for d in &found {
        table.add_row(vec![
            d.session_id.to_string(),
            d.username.clone(),
            d.stored_total.to_string(),
            d.reducer_total.to_string(),
            d.aggregate_total.to_string(),
        ]);
    }
    print!("{}", table.render());
    Ok(())
}

