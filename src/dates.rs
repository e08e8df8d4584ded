// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Calendar arithmetic used by the dashboard windows.

use chrono::{Datelike, Duration, NaiveDate};

use crate::errors::{Error, Result};

/// Inclusive date range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }

    /// The whole calendar month starting at `month_start`.
    pub fn month(month_start: NaiveDate) -> Result<Self> {
        Ok(Self::new(month_start, last_day_of_month(month_start)?))
    }
}

pub fn first_day_of_month(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(date.day0()))
}

/// First day of the month `delta` months away from the month containing `date`.
pub fn shift_months(date: NaiveDate, delta: i32) -> Result<NaiveDate> {
    let index = date.year() * 12 + date.month0() as i32 + delta;
    let year = index.div_euclid(12);
    let month = index.rem_euclid(12) as u32 + 1;
    NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or_else(|| Error::invalid(format!("Month out of range: {}-{:02}", year, month)))
}

pub fn last_day_of_month(date: NaiveDate) -> Result<NaiveDate> {
    Ok(shift_months(date, 1)? - Duration::days(1))
}

pub fn days_in_month(date: NaiveDate) -> Result<u32> {
    Ok(last_day_of_month(date)?.day())
}

/// `day` of the month containing `date`, clamped to that month's length
/// (e.g. day 31 in February 2024 gives 2024-02-29).
pub fn clamp_day(date: NaiveDate, day: u32) -> Result<NaiveDate> {
    let last = last_day_of_month(date)?;
    let day = day.clamp(1, last.day());
    Ok(first_day_of_month(date) + Duration::days(i64::from(day - 1)))
}

/// `YYYY-MM` key of the month containing `date`.
pub fn month_key(date: NaiveDate) -> String {
    date.format("%Y-%m").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn shift_months_crosses_year_boundaries() {
        assert_eq!(shift_months(d(2024, 3, 15), -11).unwrap(), d(2023, 4, 1));
        assert_eq!(shift_months(d(2024, 1, 31), -1).unwrap(), d(2023, 12, 1));
        assert_eq!(shift_months(d(2023, 12, 5), 1).unwrap(), d(2024, 1, 1));
        assert_eq!(shift_months(d(2024, 6, 1), 0).unwrap(), d(2024, 6, 1));
    }

    #[test]
    fn month_end_handles_leap_years() {
        assert_eq!(last_day_of_month(d(2024, 2, 10)).unwrap(), d(2024, 2, 29));
        assert_eq!(last_day_of_month(d(2023, 2, 10)).unwrap(), d(2023, 2, 28));
        assert_eq!(last_day_of_month(d(2024, 12, 1)).unwrap(), d(2024, 12, 31));
        assert_eq!(days_in_month(d(2024, 4, 30)).unwrap(), 30);
    }

    #[test]
    fn clamp_day_never_overflows_the_month() {
        assert_eq!(clamp_day(d(2024, 2, 1), 31).unwrap(), d(2024, 2, 29));
        assert_eq!(clamp_day(d(2023, 2, 1), 30).unwrap(), d(2023, 2, 28));
        assert_eq!(clamp_day(d(2024, 1, 1), 15).unwrap(), d(2024, 1, 15));
    }

    #[test]
    fn range_is_inclusive() {
        let r = DateRange::month(d(2024, 2, 1)).unwrap();
        assert!(r.contains(d(2024, 2, 1)));
        assert!(r.contains(d(2024, 2, 29)));
        assert!(!r.contains(d(2024, 3, 1)));
        assert_eq!(month_key(d(2024, 2, 29)), "2024-02");
        assert_eq!(first_day_of_month(d(2024, 2, 29)), d(2024, 2, 1));
    }
}
