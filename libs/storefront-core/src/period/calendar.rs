//! Calendar arithmetic for reporting periods
//!
//! All helpers work on wall-clock (`Naive*`) values in the caller's local
//! calendar. Months are zero-based (0 = January) to match the period picker.

use crate::error::{Result, StorefrontError};
use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime};

/// Midnight at the start of `date`
#[must_use]
pub fn start_of_day(date: NaiveDate) -> NaiveDateTime {
    date.and_time(chrono::NaiveTime::MIN)
}

/// The last millisecond of `date` (23:59:59.999)
///
/// # Errors
/// Never fails for a valid date; the `Result` mirrors the other helpers
pub fn end_of_day(date: NaiveDate) -> Result<NaiveDateTime> {
    date.and_hms_milli_opt(23, 59, 59, 999)
        .ok_or_else(|| StorefrontError::invalid_argument(format!("no end of day for {date}")))
}

/// Check that a zero-based month index is within 0-11
///
/// # Errors
/// Returns `InvalidArgument` for any month above 11
pub fn validate_month(month0: u32) -> Result<()> {
    if month0 > 11 {
        return Err(StorefrontError::invalid_argument(format!(
            "month {month0} is outside 0-11"
        )));
    }
    Ok(())
}

/// First day of a zero-based month
///
/// # Errors
/// Returns `InvalidArgument` for a month outside 0-11 or an unrepresentable year
pub fn first_day_of_month(year: i32, month0: u32) -> Result<NaiveDate> {
    validate_month(month0)?;
    NaiveDate::from_ymd_opt(year, month0 + 1, 1)
        .ok_or_else(|| StorefrontError::invalid_argument(format!("year {year} is out of range")))
}

/// Last day of a zero-based month, taken as the day before the first of the
/// following month so leap years fall out of the calendar itself
///
/// # Errors
/// Returns `InvalidArgument` for a month outside 0-11 or an unrepresentable year
pub fn last_day_of_month(year: i32, month0: u32) -> Result<NaiveDate> {
    validate_month(month0)?;
    let (next_year, next_month0) = if month0 == 11 {
        (year.checked_add(1), 0)
    } else {
        (Some(year), month0 + 1)
    };
    next_year
        .and_then(|y| first_day_of_month(y, next_month0).ok())
        .and_then(|first| first.pred_opt())
        .ok_or_else(|| StorefrontError::invalid_argument(format!("year {year} is out of range")))
}

/// The Sunday starting the week that contains `date` (`date` itself on Sundays)
///
/// # Errors
/// Returns `InvalidArgument` if the week start falls before the supported calendar
pub fn week_start(date: NaiveDate) -> Result<NaiveDate> {
    let offset = i64::from(date.weekday().num_days_from_sunday());
    add_days(date, -offset)
}

/// Add days to a date with overflow checking
///
/// # Errors
/// Returns `InvalidArgument` if the result would leave the supported calendar
pub fn add_days(date: NaiveDate, days: i64) -> Result<NaiveDate> {
    date.checked_add_signed(Duration::days(days))
        .ok_or_else(|| StorefrontError::invalid_argument(format!("{date} + {days} days overflows")))
}
