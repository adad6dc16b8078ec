//! In-memory holiday calendar.

use crate::domain::error::QuantkitError;
use crate::domain::holiday::HolidaySet;
use crate::ports::holiday_port::HolidayCalendar;
use chrono::NaiveDate;

/// A fixed list of holidays, typically from tests or the `[holidays] extra`
/// config key.
#[derive(Debug, Clone, Default)]
pub struct StaticHolidayCalendar {
    holidays: HolidaySet,
}

impl StaticHolidayCalendar {
    pub fn new(dates: Vec<NaiveDate>) -> Self {
        Self {
            holidays: dates.into_iter().collect(),
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// Parse a comma separated list of `YYYY-MM-DD` dates.
    pub fn parse_list(input: &str) -> Result<Self, String> {
        let mut dates = Vec::new();
        for token in input.split(',') {
            let token = token.trim();
            if token.is_empty() {
                continue;
            }
            let date = NaiveDate::parse_from_str(token, "%Y-%m-%d")
                .map_err(|e| format!("invalid holiday date '{token}': {e}"))?;
            dates.push(date);
        }
        Ok(Self::new(dates))
    }
}

impl HolidayCalendar for StaticHolidayCalendar {
    fn holidays_for(&self, year: i32) -> Result<HolidaySet, QuantkitError> {
        Ok(self.holidays.for_year(year))
    }

    fn describe(&self) -> String {
        format!("static list ({} dates)", self.holidays.len())
    }
}
