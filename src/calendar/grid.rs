//! Month grid: Sunday-first weeks of seven cells.

use chrono::{Datelike, Duration, NaiveDate};
use serde::Serialize;

use super::{days_in_month, first_of_month, CalendarResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CalendarCell {
    /// `None` for padding before the 1st and after the last day.
    pub date: Option<NaiveDate>,
    pub is_current_month: bool,
    pub is_today: bool,
}

impl CalendarCell {
    const PADDING: CalendarCell = CalendarCell {
        date: None,
        is_current_month: false,
        is_today: false,
    };
}

/// Cells for `year`/`month`, always a whole number of weeks.
pub fn build_month_grid(year: i32, month: u32, today: NaiveDate) -> CalendarResult<Vec<CalendarCell>> {
    let first = first_of_month(year, month)?;
    let days = days_in_month(year, month)? as usize;
    let leading = first.weekday().num_days_from_sunday() as usize;
    let total = (leading + days).div_ceil(7) * 7;

    let mut cells = Vec::with_capacity(total);
    cells.resize(leading, CalendarCell::PADDING);
    for offset in 0..days {
        let date = first + Duration::days(offset as i64);
        cells.push(CalendarCell {
            date: Some(date),
            is_current_month: true,
            is_today: date == today,
        });
    }
    cells.resize(total, CalendarCell::PADDING);
    Ok(cells)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::CalendarError;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn leading_padding(cells: &[CalendarCell]) -> usize {
        cells.iter().take_while(|c| c.date.is_none()).count()
    }

    fn trailing_padding(cells: &[CalendarCell]) -> usize {
        cells.iter().rev().take_while(|c| c.date.is_none()).count()
    }

    #[test]
    fn march_2024() {
        let cells = build_month_grid(2024, 3, date(2024, 3, 15)).unwrap();
        assert_eq!(leading_padding(&cells), 5);
        assert_eq!(cells.iter().filter(|c| c.is_current_month).count(), 31);
        assert_eq!(cells.len(), 42);
        assert_eq!(cells[5].date, Some(date(2024, 3, 1)));
        assert_eq!(cells[35].date, Some(date(2024, 3, 31)));

        let today: Vec<_> = cells.iter().filter(|c| c.is_today).collect();
        assert_eq!(today.len(), 1);
        assert_eq!(today[0].date, Some(date(2024, 3, 15)));
    }

    #[test]
    fn sunday_start_has_no_leading_padding() {
        // September 2024 starts on a Sunday.
        let cells = build_month_grid(2024, 9, date(2024, 1, 1)).unwrap();
        assert_eq!(leading_padding(&cells), 0);
        assert_eq!(cells[0].date, Some(date(2024, 9, 1)));
    }

    #[test]
    fn saturday_end_has_no_trailing_padding() {
        // August 2024 ends on a Saturday.
        let cells = build_month_grid(2024, 8, date(2024, 1, 1)).unwrap();
        assert_eq!(trailing_padding(&cells), 0);
        assert_eq!(cells.last().unwrap().date, Some(date(2024, 8, 31)));
    }

    #[test]
    fn february_can_fill_exactly_four_weeks() {
        // February 2015: 28 days starting on a Sunday.
        let cells = build_month_grid(2015, 2, date(2015, 2, 1)).unwrap();
        assert_eq!(cells.len(), 28);
        assert!(cells.iter().all(|c| c.is_current_month));
    }

    #[test]
    fn today_outside_month_marks_nothing() {
        let cells = build_month_grid(2024, 3, date(2024, 4, 1)).unwrap();
        assert!(cells.iter().all(|c| !c.is_today));
    }

    #[test]
    fn every_month_is_whole_weeks() {
        for year in [1999, 2000, 2023, 2024, 2100] {
            for month in 1..=12 {
                let cells = build_month_grid(year, month, date(2000, 1, 1)).unwrap();
                assert_eq!(cells.len() % 7, 0, "{year}-{month}");
                assert_eq!(
                    cells.iter().filter(|c| c.is_current_month).count() as u32,
                    days_in_month(year, month).unwrap(),
                    "{year}-{month}"
                );
                assert!(leading_padding(&cells) < 7);
                assert!(trailing_padding(&cells) < 7);
            }
        }
    }

    #[test]
    fn deterministic() {
        let a = build_month_grid(2024, 3, date(2024, 3, 5)).unwrap();
        let b = build_month_grid(2024, 3, date(2024, 3, 5)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn rejects_invalid_month() {
        assert_eq!(
            build_month_grid(2024, 13, date(2024, 1, 1)),
            Err(CalendarError::InvalidMonth(13))
        );
    }
}
