//! Raw expiry date arithmetic.
//!
//! Everything here is pure calendar math on a reference date and a target
//! weekday. Holidays and weekends are not considered; see
//! [`crate::domain::trading_day`] for adjustment and
//! [`crate::domain::expiry`] for the combined resolution.

use crate::domain::error::QuantkitError;
use chrono::{Datelike, Days, NaiveDate, Weekday};

/// Calendar-week matrix for a month, Monday first. Days outside the month
/// are zero, matching the usual `monthcalendar` layout.
pub fn month_matrix(year: i32, month: u32) -> Result<Vec<[u32; 7]>, QuantkitError> {
    let first = first_of_month(year, month)?;
    let offset = first.weekday().num_days_from_monday();
    let days = days_in_month(year, month)?;

    let mut rows: Vec<[u32; 7]> = Vec::with_capacity(6);
    for day in 1..=days {
        let slot = offset + day - 1;
        let row = (slot / 7) as usize;
        if row == rows.len() {
            rows.push([0; 7]);
        }
        rows[row][(slot % 7) as usize] = day;
    }
    Ok(rows)
}

/// Last occurrence of `weekday` in the given month.
///
/// Takes the weekday column of the final matrix row, or of the row before
/// it when the final (partial) week does not reach that weekday.
pub fn last_weekday_of_month(
    year: i32,
    month: u32,
    weekday: Weekday,
) -> Result<NaiveDate, QuantkitError> {
    let rows = month_matrix(year, month)?;
    let col = weekday.num_days_from_monday() as usize;

    // A month always spans at least four rows.
    let last = rows[rows.len() - 1][col];
    let day = if last != 0 { last } else { rows[rows.len() - 2][col] };

    NaiveDate::from_ymd_opt(year, month, day).ok_or(QuantkitError::DateOutOfRange { year, month })
}

/// Next occurrence of `weekday` on or after `reference`.
pub fn current_week_expiry(reference: NaiveDate, weekday: Weekday) -> Result<NaiveDate, QuantkitError> {
    let target = weekday.num_days_from_monday();
    let today = reference.weekday().num_days_from_monday();
    let days_until = (target + 7 - today) % 7;
    add_days(reference, u64::from(days_until))
}

/// One week after [`current_week_expiry`].
pub fn next_week_expiry(reference: NaiveDate, weekday: Weekday) -> Result<NaiveDate, QuantkitError> {
    add_days(current_week_expiry(reference, weekday)?, 7)
}

/// Last `weekday` of the reference month, or of the following month once
/// that date has passed.
pub fn current_month_expiry(reference: NaiveDate, weekday: Weekday) -> Result<NaiveDate, QuantkitError> {
    let last = last_weekday_of_month(reference.year(), reference.month(), weekday)?;
    if last >= reference {
        return Ok(last);
    }
    let (year, month) = following_month(reference.year(), reference.month());
    last_weekday_of_month(year, month, weekday)
}

/// Last `weekday` of the month after the one holding the current monthly
/// expiry.
pub fn next_month_expiry(reference: NaiveDate, weekday: Weekday) -> Result<NaiveDate, QuantkitError> {
    let current = current_month_expiry(reference, weekday)?;
    let (mut year, mut month) = following_month(current.year(), current.month());
    let mut candidate = last_weekday_of_month(year, month, weekday)?;
    if candidate <= current {
        (year, month) = following_month(year, month);
        candidate = last_weekday_of_month(year, month, weekday)?;
    }
    Ok(candidate)
}

/// (year, month) after the given one, rolling December into January.
pub fn following_month(year: i32, month: u32) -> (i32, u32) {
    if month >= 12 { (year + 1, 1) } else { (year, month + 1) }
}

pub fn days_in_month(year: i32, month: u32) -> Result<u32, QuantkitError> {
    let first = first_of_month(year, month)?;
    let (next_year, next_month) = following_month(year, month);
    let next_first = first_of_month(next_year, next_month)?;
    Ok(next_first.signed_duration_since(first).num_days() as u32)
}

fn first_of_month(year: i32, month: u32) -> Result<NaiveDate, QuantkitError> {
    NaiveDate::from_ymd_opt(year, month, 1).ok_or(QuantkitError::DateOutOfRange { year, month })
}

fn add_days(date: NaiveDate, days: u64) -> Result<NaiveDate, QuantkitError> {
    date.checked_add_days(Days::new(days))
        .ok_or(QuantkitError::DateOutOfRange {
            year: date.year(),
            month: date.month(),
        })
}
