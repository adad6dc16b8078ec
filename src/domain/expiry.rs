//! Expiry resolution: raw expiry arithmetic combined with trading-day
//! validation.
//!
//! The resolver owns a [`TradingDayValidator`] rather than extending it, so
//! the holiday source and adjustment direction can be swapped per exchange.

use crate::domain::error::QuantkitError;
use crate::domain::expiry_finder::{
    current_month_expiry, current_week_expiry, following_month, last_weekday_of_month,
};
use crate::domain::trading_day::TradingDayValidator;
use chrono::{Datelike, Days, NaiveDate, Weekday};
use std::fmt;
use std::str::FromStr;

/// Which contract series to resolve relative to a reference date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpiryCycle {
    CurrentWeek,
    NextWeek,
    CurrentMonth,
    NextMonth,
}

impl ExpiryCycle {
    pub fn is_weekly(&self) -> bool {
        matches!(self, ExpiryCycle::CurrentWeek | ExpiryCycle::NextWeek)
    }

    pub fn is_monthly(&self) -> bool {
        !self.is_weekly()
    }
}

impl FromStr for ExpiryCycle {
    type Err = QuantkitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('_', "-").as_str() {
            "current-week" | "week" => Ok(ExpiryCycle::CurrentWeek),
            "next-week" => Ok(ExpiryCycle::NextWeek),
            "current-month" | "month" => Ok(ExpiryCycle::CurrentMonth),
            "next-month" => Ok(ExpiryCycle::NextMonth),
            _ => Err(QuantkitError::InvalidCycle(s.to_string())),
        }
    }
}

impl fmt::Display for ExpiryCycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ExpiryCycle::CurrentWeek => "current-week",
            ExpiryCycle::NextWeek => "next-week",
            ExpiryCycle::CurrentMonth => "current-month",
            ExpiryCycle::NextMonth => "next-month",
        };
        write!(f, "{name}")
    }
}

/// A trading-day adjusted expiry. Only produced by [`ExpiryResolver`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ExpiryDate(NaiveDate);

impl ExpiryDate {
    pub fn date(&self) -> NaiveDate {
        self.0
    }
}

impl fmt::Display for ExpiryDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// All four resolved expiries for one reference date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpirySchedule {
    pub reference: NaiveDate,
    pub weekday: Weekday,
    pub current_week: ExpiryDate,
    pub next_week: ExpiryDate,
    pub current_month: ExpiryDate,
    pub next_month: ExpiryDate,
}

/// Raw expiry that produced a resolved date, kept so the following cycle
/// can be derived from it.
struct Resolved {
    raw: NaiveDate,
    expiry: ExpiryDate,
}

pub struct ExpiryResolver<'a> {
    validator: TradingDayValidator<'a>,
}

impl<'a> ExpiryResolver<'a> {
    pub fn new(validator: TradingDayValidator<'a>) -> Self {
        Self { validator }
    }

    pub fn validator(&self) -> &TradingDayValidator<'a> {
        &self.validator
    }

    pub fn resolve(
        &self,
        cycle: ExpiryCycle,
        reference: NaiveDate,
        weekday: Weekday,
    ) -> Result<ExpiryDate, QuantkitError> {
        let expiry = match cycle {
            ExpiryCycle::CurrentWeek => self.current_week(reference, weekday)?.expiry,
            ExpiryCycle::NextWeek => self.next_week(&self.current_week(reference, weekday)?)?,
            ExpiryCycle::CurrentMonth => self.current_month(reference, weekday)?.expiry,
            ExpiryCycle::NextMonth => {
                self.next_month(&self.current_month(reference, weekday)?, weekday)?
            }
        };
        tracing::debug!(%cycle, %reference, ?weekday, %expiry, "resolved expiry");
        Ok(expiry)
    }

    pub fn schedule(&self, reference: NaiveDate, weekday: Weekday) -> Result<ExpirySchedule, QuantkitError> {
        let week = self.current_week(reference, weekday)?;
        let month = self.current_month(reference, weekday)?;
        Ok(ExpirySchedule {
            reference,
            weekday,
            current_week: week.expiry,
            next_week: self.next_week(&week)?,
            current_month: month.expiry,
            next_month: self.next_month(&month, weekday)?,
        })
    }

    // An adjusted expiry before the reference date means this week's
    // contract has already expired; the live contract is next week's.
    fn current_week(&self, reference: NaiveDate, weekday: Weekday) -> Result<Resolved, QuantkitError> {
        let raw = current_week_expiry(reference, weekday)?;
        let adjusted = self.validator.adjust(raw)?;
        if adjusted >= reference {
            return Ok(Resolved {
                raw,
                expiry: ExpiryDate(adjusted),
            });
        }
        let raw = plus_days(raw, 7)?;
        Ok(Resolved {
            raw,
            expiry: ensure_live(self.validator.adjust(raw)?, reference)?,
        })
    }

    fn next_week(&self, current: &Resolved) -> Result<ExpiryDate, QuantkitError> {
        let adjusted = self.validator.adjust(plus_days(current.raw, 7)?)?;
        ensure_after(adjusted, current.expiry)
    }

    fn current_month(&self, reference: NaiveDate, weekday: Weekday) -> Result<Resolved, QuantkitError> {
        let raw = current_month_expiry(reference, weekday)?;
        let adjusted = self.validator.adjust(raw)?;
        if adjusted >= reference {
            return Ok(Resolved {
                raw,
                expiry: ExpiryDate(adjusted),
            });
        }
        let (year, month) = following_month(raw.year(), raw.month());
        let raw = last_weekday_of_month(year, month, weekday)?;
        Ok(Resolved {
            raw,
            expiry: ensure_live(self.validator.adjust(raw)?, reference)?,
        })
    }

    fn next_month(&self, current: &Resolved, weekday: Weekday) -> Result<ExpiryDate, QuantkitError> {
        let (year, month) = following_month(current.raw.year(), current.raw.month());
        let raw = last_weekday_of_month(year, month, weekday)?;
        let adjusted = self.validator.adjust(raw)?;
        ensure_after(adjusted, current.expiry)
    }
}

fn plus_days(date: NaiveDate, days: u64) -> Result<NaiveDate, QuantkitError> {
    date.checked_add_days(Days::new(days))
        .ok_or(QuantkitError::DateOutOfRange {
            year: date.year(),
            month: date.month(),
        })
}

/// The rolled contract must not have expired before `reference` as well.
fn ensure_live(adjusted: NaiveDate, reference: NaiveDate) -> Result<ExpiryDate, QuantkitError> {
    if adjusted >= reference {
        Ok(ExpiryDate(adjusted))
    } else {
        Err(QuantkitError::Validation {
            date: adjusted,
            steps: crate::domain::trading_day::MAX_ADJUST_STEPS,
        })
    }
}

fn ensure_after(next: NaiveDate, current: ExpiryDate) -> Result<ExpiryDate, QuantkitError> {
    if next > current.date() {
        Ok(ExpiryDate(next))
    } else {
        Err(QuantkitError::Validation {
            date: next,
            steps: crate::domain::trading_day::MAX_ADJUST_STEPS,
        })
    }
}
