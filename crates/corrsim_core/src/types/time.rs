//! Calendar helpers for stepping simulations through real months.
//!
//! Day-level draws (for example a gated spending event per calendar day) are
//! aggregated into month-level totals. The number of days in each month comes
//! from the calendar, not from a fixed 30-day convention.
//!
//! # Examples
//!
//! ```
//! use corrsim_core::types::time::{month_windows, parse_date};
//!
//! let start = parse_date("2024-01-01").unwrap();
//! let windows = month_windows(start, 3).unwrap();
//! assert_eq!(windows, vec![31, 29, 31]); // 2024 is a leap year
//! ```

use chrono::{Months, NaiveDate};

use super::error::DateError;

/// Parses an ISO 8601 date string (YYYY-MM-DD).
///
/// # Examples
///
/// ```
/// use corrsim_core::types::time::parse_date;
///
/// assert!(parse_date("2024-06-15").is_ok());
/// assert!(parse_date("not-a-date").is_err());
/// ```
pub fn parse_date(s: &str) -> Result<NaiveDate, DateError> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|e| DateError::ParseError(e.to_string()))
}

/// Adds `months` calendar months to `start`.
///
/// Month-end dates clamp to the end of the target month (Jan 31 + 1M = Feb 29
/// in a leap year), following chrono's `checked_add_months`.
fn add_months(start: NaiveDate, months: usize) -> Result<NaiveDate, DateError> {
    let overflow = || DateError::Overflow {
        start: start.to_string(),
        months,
    };
    let months_u32 = u32::try_from(months).map_err(|_| overflow())?;
    start
        .checked_add_months(Months::new(months_u32))
        .ok_or_else(overflow)
}

/// Returns the dates labelling `periods` consecutive monthly steps.
///
/// Step `t` is labelled with `start + (t + 1)` months: the end of the period
/// in which its growth was applied.
///
/// # Examples
///
/// ```
/// use corrsim_core::types::time::{parse_date, period_dates};
///
/// let start = parse_date("2024-01-15").unwrap();
/// let dates = period_dates(start, 2).unwrap();
/// assert_eq!(dates[0].to_string(), "2024-02-15");
/// assert_eq!(dates[1].to_string(), "2024-03-15");
/// ```
pub fn period_dates(start: NaiveDate, periods: usize) -> Result<Vec<NaiveDate>, DateError> {
    (1..=periods).map(|k| add_months(start, k)).collect()
}

/// Returns the number of calendar days in each of `months` consecutive months
/// starting at `start`.
///
/// Window `k` spans `[start + k months, start + (k + 1) months)`, so the
/// windows tile the calendar without gaps and their sum is the total number of
/// days simulated.
pub fn month_windows(start: NaiveDate, months: usize) -> Result<Vec<usize>, DateError> {
    let mut windows = Vec::with_capacity(months);
    let mut window_start = start;

    for k in 1..=months {
        let window_end = add_months(start, k)?;
        // Consecutive month starts are strictly increasing.
        let days = (window_end - window_start).num_days() as usize;
        windows.push(days);
        window_start = window_end;
    }

    Ok(windows)
}
