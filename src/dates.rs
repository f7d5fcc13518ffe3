// src/dates.rs
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Calendar helpers for order and line item dates
//!
//! Generators work with encoded dates `BASE_DATE + day_offset`, which keeps
//! date arithmetic a plain integer addition. The offset is only turned into
//! `YYYY-MM-DD` text when a row is emitted.

use std::sync::OnceLock;

use crate::constants::{BASE_DATE, CURRENT_DATE, DATE_RANGE};
use crate::error::{GenError, Result};

const FIRST_YEAR: i64 = 1992;

/// Day of year at which each month starts, non-leap
const MONTH_STARTS: [i64; 13] = [0, 31, 59, 90, 120, 151, 181, 212, 243, 273, 304, 334, 365];

static DATE_STRINGS: OnceLock<Vec<String>> = OnceLock::new();

/// Divisible by 4 and not by 100
pub fn is_leap_year(year: i64) -> bool {
    year % 4 == 0 && year % 100 != 0
}

fn days_in_year(year: i64) -> i64 {
    365 + is_leap_year(year) as i64
}

/// Calendar year and 1-based day of year of a day offset
fn year_and_day(mut offset: i64) -> (i64, i64) {
    let mut year = FIRST_YEAR;
    while offset >= days_in_year(year) {
        offset -= days_in_year(year);
        year += 1;
    }
    (year, offset + 1)
}

/// Calendar form `yyddd` of an encoded date, e.g. 1993-01-01 is 93001
pub fn julian(date: i64) -> i64 {
    let (year, day) = year_and_day(date - BASE_DATE);
    (year - 1900) * 1000 + day
}

fn format_offset(offset: i64) -> String {
    let (year, day) = year_and_day(offset);
    let leap = is_leap_year(year) as i64;
    let month_end = |m: usize| MONTH_STARTS[m] + if m >= 2 { leap } else { 0 };
    let month_start = |m: usize| MONTH_STARTS[m - 1] + if m >= 3 { leap } else { 0 };

    let mut month = 1;
    while day > month_end(month) {
        month += 1;
    }
    format!("{:04}-{:02}-{:02}", year, month, day - month_start(month))
}

fn date_strings() -> &'static [String] {
    DATE_STRINGS.get_or_init(|| (0..DATE_RANGE).map(format_offset).collect())
}

/// `YYYY-MM-DD` text of an encoded date
pub fn date_to_string(date: i64) -> Result<&'static str> {
    usize::try_from(date - BASE_DATE)
        .ok()
        .and_then(|offset| date_strings().get(offset))
        .map(String::as_str)
        .ok_or(GenError::InvalidDate(date))
}

/// Whether an encoded date lies on or before the generation's "today"
pub fn is_past(date: i64) -> bool {
    julian(date) <= CURRENT_DATE
}

/// Spread order keys: only the first 8 of every 32 keys are used
pub fn make_order_key(order_index: i64) -> i64 {
    ((order_index >> 3) << 2 << 3) + (order_index & 0b111)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_date_strings() {
        let cases = [
            (0, "1992-01-01"),
            (30, "1992-01-31"),
            (31, "1992-02-01"),
            (59, "1992-02-29"),
            (60, "1992-03-01"),
            (365, "1992-12-31"),
            (366, "1993-01-01"),
            (366 + 59, "1993-03-01"),
            (DATE_RANGE - 1, "1998-12-31"),
        ];
        for (offset, expected) in cases {
            assert_eq!(date_to_string(BASE_DATE + offset).unwrap(), expected);
        }
    }

    #[test]
    fn test_dates_outside_calendar() {
        assert_eq!(
            date_to_string(BASE_DATE - 1),
            Err(GenError::InvalidDate(BASE_DATE - 1))
        );
        assert!(date_to_string(BASE_DATE + DATE_RANGE).is_err());
    }

    #[test]
    fn test_julian_and_is_past() {
        assert_eq!(julian(BASE_DATE), 92_001);
        assert_eq!(julian(BASE_DATE + 366), 93_001);
        // 1995-06-17 is the last day in the past
        let today = BASE_DATE + 366 + 365 + 365 + 167;
        assert_eq!(date_to_string(today).unwrap(), "1995-06-17");
        assert_eq!(julian(today), CURRENT_DATE);
        assert!(is_past(today));
        assert!(!is_past(today + 1));
    }

    #[test]
    fn test_order_keys_are_sparse() {
        let keys: Vec<i64> = (1..=10).map(make_order_key).collect();
        assert_eq!(keys, vec![1, 2, 3, 4, 5, 6, 7, 32, 33, 34]);
        assert_eq!(make_order_key(16), 64);
    }
}
