//! Calendar helpers - Half-open datetime ranges for days and months.

use crate::errors::{Error, Result};
use chrono::{Datelike, Months, NaiveDate, NaiveDateTime, NaiveTime};

/// One calendar month as dates and as a half-open datetime range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthRange {
    /// First day of the month
    pub first_day: NaiveDate,
    /// Last day of the month
    pub last_day: NaiveDate,
    /// Midnight of the first day
    pub start: NaiveDateTime,
    /// Midnight of the first day of the next month (exclusive)
    pub end: NaiveDateTime,
}

impl MonthRange {
    /// Builds the range for a month (1-12) of a year.
    pub fn new(month: u32, year: i32) -> Result<Self> {
        let first_day =
            NaiveDate::from_ymd_opt(year, month, 1).ok_or(Error::InvalidMonth { month, year })?;
        Self::containing(first_day).ok_or(Error::InvalidMonth { month, year })
    }

    /// The month a date falls in. `None` only at the edge of chrono's date range.
    #[must_use]
    pub fn containing(date: NaiveDate) -> Option<Self> {
        let first_day = date.with_day(1)?;
        let next_first = first_day.checked_add_months(Months::new(1))?;
        let last_day = next_first.pred_opt()?;

        Some(Self {
            first_day,
            last_day,
            start: first_day.and_time(NaiveTime::MIN),
            end: next_first.and_time(NaiveTime::MIN),
        })
    }

    /// The following month.
    #[must_use]
    pub fn next(&self) -> Option<Self> {
        self.last_day.succ_opt().and_then(Self::containing)
    }

    /// Month number (1-12).
    #[must_use]
    pub fn month(&self) -> u32 {
        self.first_day.month()
    }

    /// Calendar year.
    #[must_use]
    pub fn year(&self) -> i32 {
        self.first_day.year()
    }

    /// Display label such as `"March 2025"`.
    #[must_use]
    pub fn label(&self) -> String {
        self.first_day.format("%B %Y").to_string()
    }
}

/// Half-open datetime range `[midnight, next midnight)` of one day.
#[must_use]
pub fn day_bounds(date: NaiveDate) -> (NaiveDateTime, NaiveDateTime) {
    let start = date.and_time(NaiveTime::MIN);
    let end = date
        .succ_opt()
        .map_or(NaiveDateTime::MAX, |next| next.and_time(NaiveTime::MIN));
    (start, end)
}
