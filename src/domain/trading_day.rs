//! Trading-day validation and adjustment.

use crate::domain::error::QuantkitError;
use crate::domain::weekday::is_weekend;
use crate::ports::holiday_port::HolidayCalendar;
use chrono::{Datelike, Days, NaiveDate};
use std::fmt;
use std::str::FromStr;

/// Upper bound on single-day steps when searching for a trading day.
pub const MAX_ADJUST_STEPS: u32 = 10;

/// Direction in which a non-trading date is moved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AdjustDirection {
    /// Move to the previous trading day (exchange convention for expiries).
    #[default]
    Backward,
    Forward,
}

impl FromStr for AdjustDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "backward" | "back" | "previous" => Ok(AdjustDirection::Backward),
            "forward" | "next" => Ok(AdjustDirection::Forward),
            other => Err(format!("unknown adjust direction '{other}' (expected backward or forward)")),
        }
    }
}

impl fmt::Display for AdjustDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AdjustDirection::Backward => write!(f, "backward"),
            AdjustDirection::Forward => write!(f, "forward"),
        }
    }
}

/// Checks dates against weekends and a holiday calendar.
///
/// Holidays and weekends are treated identically: a date is shifted one day
/// at a time in the validator's direction until it is a trading day.
pub struct TradingDayValidator<'a> {
    calendar: &'a dyn HolidayCalendar,
    direction: AdjustDirection,
}

impl<'a> TradingDayValidator<'a> {
    pub fn new(calendar: &'a dyn HolidayCalendar, direction: AdjustDirection) -> Self {
        Self { calendar, direction }
    }

    pub fn direction(&self) -> AdjustDirection {
        self.direction
    }

    pub fn is_trading_day(&self, date: NaiveDate) -> Result<bool, QuantkitError> {
        if is_weekend(date.weekday()) {
            return Ok(false);
        }
        let holidays = self.calendar.holidays_for(date.year())?;
        Ok(!holidays.contains(date))
    }

    /// Adjust using the validator's configured direction.
    pub fn adjust(&self, date: NaiveDate) -> Result<NaiveDate, QuantkitError> {
        self.adjust_to_trading_day(date, self.direction)
    }

    /// Step from `date` in `direction` until a trading day is reached.
    /// Returns `date` unchanged when it already is one.
    pub fn adjust_to_trading_day(
        &self,
        date: NaiveDate,
        direction: AdjustDirection,
    ) -> Result<NaiveDate, QuantkitError> {
        let mut current = date;
        for _ in 0..=MAX_ADJUST_STEPS {
            if self.is_trading_day(current)? {
                if current != date {
                    tracing::debug!(from = %date, to = %current, %direction, "adjusted to trading day");
                }
                return Ok(current);
            }
            current = step(current, direction).ok_or(QuantkitError::DateOutOfRange {
                year: current.year(),
                month: current.month(),
            })?;
        }
        tracing::error!(%date, %direction, steps = MAX_ADJUST_STEPS, "no trading day found");
        Err(QuantkitError::Validation {
            date,
            steps: MAX_ADJUST_STEPS,
        })
    }
}

fn step(date: NaiveDate, direction: AdjustDirection) -> Option<NaiveDate> {
    match direction {
        AdjustDirection::Backward => date.checked_sub_days(Days::new(1)),
        AdjustDirection::Forward => date.checked_add_days(Days::new(1)),
    }
}
