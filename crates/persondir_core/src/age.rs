//! Calendar age arithmetic.
//!
//! # Invariants
//! - Age is the count of completed year cycles, compared on (month, day);
//!   it is never derived from elapsed days.
//! - A Feb 29 birth completes its year on Mar 1 in non-leap years.
//! - A birth date after `today` yields a negative age truncated toward zero.

use chrono::{Datelike, NaiveDate};

/// Returns whole elapsed years from `birth_date` to `today`.
pub fn age_in_years(birth_date: NaiveDate, today: NaiveDate) -> i32 {
    if birth_date > today {
        return -completed_years(today, birth_date);
    }
    completed_years(birth_date, today)
}

/// Returns whether a person born on `birth_date` may be written to the
/// directory on `today`.
pub fn is_age_allowed(birth_date: NaiveDate, today: NaiveDate, min_allowed_age: u32) -> bool {
    birth_date <= today && i64::from(age_in_years(birth_date, today)) >= i64::from(min_allowed_age)
}

fn completed_years(start: NaiveDate, end: NaiveDate) -> i32 {
    let mut years = end.year() - start.year();
    if (end.month(), end.day()) < (start.month(), start.day()) {
        years -= 1;
    }
    years
}
