//! Age and date arithmetic for the vaccine engines.
//!
//! Every function takes an explicit reference date instead of reading the
//! clock, so both derivation engines stay deterministic and testable. All
//! comparisons work at calendar-day granularity; there is no time-of-day
//! component anywhere in this module.

use chrono::NaiveDate;

use super::DomainError;

/// Weeks per year and weeks per month used for display conversion.
/// Display-only constants, never used in status comparisons.
const WEEKS_PER_YEAR: i64 = 52;
const WEEKS_PER_MONTH: f64 = 4.33;

/// Parse a stored date value.
///
/// Accepts a plain ISO 8601 date ("2025-06-13") or the date part of an
/// RFC 3339 timestamp ("2025-06-13T09:00:00-04:00"). Anything else is an
/// `InvalidDate` error; bad data is propagated, not coerced.
pub fn parse_date(value: &str) -> Result<NaiveDate, DomainError> {
    let date_part = value.split('T').next().unwrap_or(value);
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d")
        .map_err(|_| DomainError::InvalidDate(value.to_string()))
}

/// Format a date back into the ISO 8601 form used throughout the API.
pub fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Pet age in whole weeks as of a given date.
///
/// Whole days between the dates divided by 7, floored. A birth date in the
/// future clamps to zero rather than producing a negative age; the original
/// design left this case undefined.
pub fn age_in_weeks(birth_date: NaiveDate, as_of: NaiveDate) -> i64 {
    let days = (as_of - birth_date).num_days();
    if days < 0 {
        return 0;
    }
    days / 7
}

/// Calendar days from `as_of` until `target`.
///
/// Negative means the target is in the past (overdue), zero means due today.
pub fn days_until(target: NaiveDate, as_of: NaiveDate) -> i64 {
    (target - as_of).num_days()
}

/// Convert a week count to display text: "2 years 3 months", "5 months",
/// or "6 weeks". Months are derived at 4.33 weeks per month.
pub fn age_weeks_to_text(weeks: i64) -> String {
    let years = weeks / WEEKS_PER_YEAR;
    let months = ((weeks % WEEKS_PER_YEAR) as f64 / WEEKS_PER_MONTH).floor() as i64;

    if years > 0 {
        if months > 0 {
            format!("{} {} {} {}", years, plural(years, "year"), months, plural(months, "month"))
        } else {
            format!("{} {}", years, plural(years, "year"))
        }
    } else if months > 0 {
        format!("{} {}", months, plural(months, "month"))
    } else {
        format!("{} {}", weeks, plural(weeks, "week"))
    }
}

fn plural(n: i64, unit: &str) -> String {
    if n == 1 {
        unit.to_string()
    } else {
        format!("{}s", unit)
    }
}
