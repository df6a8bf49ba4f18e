//! Calendar projection: date parsing, record lookup, flow levels, month grids
//! and the annotated month view built on top of them.
//!
//! Everything in here is synchronous and pure. Callers pass `today` / `now`
//! explicitly; nothing reads the process clock.

pub mod flow;
pub mod grid;
pub mod record_index;
pub mod view;

use chrono::{Datelike, NaiveDate};
use thiserror::Error;

pub use flow::{classify_flow, FlowLevel};
pub use grid::{build_month_grid, CalendarCell};
pub use record_index::{find_record, find_record_str, DatedEntry, RecordIndex};
pub use view::{DayView, EventBadge, MonthView};

/// Wire format for calendar dates.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CalendarError {
    #[error("Invalid month {0} (expected 1-12)")]
    InvalidMonth(u32),

    #[error("Year {0} is out of range")]
    InvalidYear(i32),
}

pub type CalendarResult<T> = Result<T, CalendarError>;

/// Parse a `YYYY-MM-DD` calendar date.
///
/// A full timestamp such as `2024-03-05T23:30:00-08:00` is accepted too, but
/// only its leading date is read: no timezone conversion happens, so the
/// date the user picked is the date that gets matched.
pub fn parse_calendar_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    let head = match raw.find(['T', ' ']) {
        Some(idx) => &raw[..idx],
        None => raw,
    };
    if head.len() != 10 {
        return None;
    }
    NaiveDate::parse_from_str(head, DATE_FORMAT).ok()
}

/// First day of the given month.
pub fn first_of_month(year: i32, month: u32) -> CalendarResult<NaiveDate> {
    if !(1..=12).contains(&month) {
        return Err(CalendarError::InvalidMonth(month));
    }
    NaiveDate::from_ymd_opt(year, month, 1).ok_or(CalendarError::InvalidYear(year))
}

/// Number of days in the given month.
pub fn days_in_month(year: i32, month: u32) -> CalendarResult<u32> {
    let first = first_of_month(year, month)?;
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    }
    .ok_or(CalendarError::InvalidYear(year))?;
    Ok(next.signed_duration_since(first).num_days() as u32)
}

/// Inclusive first/last day of a month, used to bound store queries.
pub fn month_bounds(year: i32, month: u32) -> CalendarResult<(NaiveDate, NaiveDate)> {
    let first = first_of_month(year, month)?;
    let last = first
        .with_day(days_in_month(year, month)?)
        .ok_or(CalendarError::InvalidMonth(month))?;
    Ok((first, last))
}
