use crate::errors::{AppError, AppResult};
use chrono::{Datelike, NaiveDate};

/// Inclusive calendar range used by report and feedback filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl DateRange {
    pub fn new(from: NaiveDate, to: NaiveDate) -> AppResult<Self> {
        if to < from {
            return Err(AppError::InvalidPeriod(format!("{} is after {}", from, to)));
        }
        Ok(Self { from, to })
    }

    pub fn single(day: NaiveDate) -> Self {
        Self { from: day, to: day }
    }

    pub fn contains(&self, day: NaiveDate) -> bool {
        self.from <= day && day <= self.to
    }
}

pub fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

pub fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
}

/// Resolve a period expression into an inclusive range.
///
/// Accepted: `YYYY-MM-DD`, `YYYY-MM`, `YYYY`, or two of those joined by `:`.
pub fn parse_period(p: &str) -> AppResult<DateRange> {
    let p = p.trim();
    if let Some((start, end)) = p.split_once(':') {
        let s = period_bounds(start)?;
        let e = period_bounds(end)?;
        return DateRange::new(s.from, e.to);
    }
    period_bounds(p)
}

fn period_bounds(p: &str) -> AppResult<DateRange> {
    // YYYY-MM-DD
    if let Some(d) = parse_date(p) {
        return Ok(DateRange::single(d));
    }

    // YYYY-MM
    if let Ok(first) = NaiveDate::parse_from_str(&format!("{}-01", p), "%Y-%m-%d") {
        return Ok(DateRange {
            from: first,
            to: last_day_of_month(first.year(), first.month()),
        });
    }

    // YYYY
    if p.len() == 4
        && let Ok(year) = p.parse::<i32>()
        && let (Some(from), Some(to)) = (
            NaiveDate::from_ymd_opt(year, 1, 1),
            NaiveDate::from_ymd_opt(year, 12, 31),
        )
    {
        return Ok(DateRange { from, to });
    }

    Err(AppError::InvalidPeriod(p.to_string()))
}

pub fn last_day_of_month(year: i32, month: u32) -> NaiveDate {
    let (ny, nm) = if month == 12 { (year + 1, 1) } else { (year, month + 1) };
    NaiveDate::from_ymd_opt(ny, nm, 1)
        .and_then(|d| d.pred_opt())
        .unwrap_or(NaiveDate::MAX)
}
