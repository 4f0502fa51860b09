//! calendar helpers mirroring the spreadsheet date functions (EOMONTH, EDATE)

use chrono::{Datelike, Months, NaiveDate};

use crate::errors::{LeaseError, Result};

pub fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || (year % 400 == 0)
}

pub fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 => {
            if is_leap_year(year) {
                29
            } else {
                28
            }
        }
        _ => 30,
    }
}

pub fn is_month_end(date: NaiveDate) -> bool {
    date.day() == days_in_month(date.year(), date.month())
}

/// running month number (year * 12 + zero-based month)
pub fn month_index(date: NaiveDate) -> i32 {
    date.year() * 12 + date.month0() as i32
}

/// date in the month identified by `index`, with the day clamped to the month length
pub fn date_in_month(index: i32, day: u32) -> Result<NaiveDate> {
    let year = index.div_euclid(12);
    let month = index.rem_euclid(12) as u32 + 1;
    let day = day.clamp(1, days_in_month(year, month));
    NaiveDate::from_ymd_opt(year, month, day)
        .ok_or_else(|| LeaseError::computation(format!("date out of range: {year}-{month}-{day}")))
}

/// last calendar day of the month identified by `index`
pub fn month_end(index: i32) -> Result<NaiveDate> {
    date_in_month(index, 31)
}

/// last day of the month `months` months away, like EOMONTH
pub fn end_of_month(date: NaiveDate, months: i32) -> Result<NaiveDate> {
    month_end(month_index(date) + months)
}

/// same day `months` months away, clamped to the month end, like EDATE
pub fn edate(date: NaiveDate, months: i32) -> Result<NaiveDate> {
    let shifted = if months >= 0 {
        date.checked_add_months(Months::new(months as u32))
    } else {
        date.checked_sub_months(Months::new(months.unsigned_abs()))
    };
    shifted.ok_or_else(|| LeaseError::computation(format!("date out of range: {date} + {months} months")))
}

/// the previous calendar day
pub fn day_before(date: NaiveDate) -> NaiveDate {
    date.pred_opt().unwrap_or(NaiveDate::MIN)
}

/// actual days from `from` to `to`
pub fn days_between(from: NaiveDate, to: NaiveDate) -> i64 {
    (to - from).num_days()
}

/// whole months elapsed, counted the EDATE way: the largest `m` with `edate(from, m) <= to`
pub fn whole_months_between(from: NaiveDate, to: NaiveDate) -> u32 {
    if to <= from {
        return 0;
    }
    let mut months = (month_index(to) - month_index(from)).max(0);
    while months > 0 {
        match edate(from, months) {
            Ok(shifted) if shifted <= to => break,
            _ => months -= 1,
        }
    }
    months as u32
}
