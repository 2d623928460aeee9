// src/export/logic.rs

use crate::core::report::ReportLogic;
use crate::db::pool::DbPool;
use crate::errors::{AppError, AppResult};
use crate::export::ExportFormat;
use crate::export::fs_utils::ensure_writable;
use crate::export::json_csv::{export_csv, export_json};
use crate::export::model::SessionExport;
use crate::ui::messages::warning;
use crate::utils::date::DateRange;
use std::io;
use std::path::Path;

pub struct ExportLogic;

impl ExportLogic {
    /// Export the session report for `range` (all sessions when None),
    /// optionally narrowed to matching usernames.
    pub fn export(
        pool: &DbPool,
        format: ExportFormat,
        file: &str,
        range: Option<&DateRange>,
        user: Option<&str>,
        force: bool,
    ) -> AppResult<usize> {
        let path = Path::new(file);

        if !path.is_absolute() {
            return Err(AppError::from(io::Error::other(format!(
                "Output file path must be absolute: {file}"
            ))));
        }

        ensure_writable(path, force)?;

        let rows: Vec<SessionExport> = ReportLogic::rows(pool, range, user)?
            .iter()
            .map(SessionExport::from)
            .collect();

        if rows.is_empty() {
            warning("No sessions found for selected range.");
            return Ok(0);
        }

        match format {
            ExportFormat::Csv => export_csv(&rows, path)?,
            ExportFormat::Json => export_json(&rows, path)?,
        }

        Ok(rows.len())
    }
}
