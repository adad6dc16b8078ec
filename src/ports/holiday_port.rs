//! Holiday calendar port trait.

use crate::domain::error::QuantkitError;
use crate::domain::holiday::HolidaySet;

/// Source of exchange holidays, queried one calendar year at a time.
///
/// Implementations must return `DataUnavailable` when the source itself
/// fails. An `Ok` empty set means the source was read and listed no
/// holidays for that year.
pub trait HolidayCalendar {
    fn holidays_for(&self, year: i32) -> Result<HolidaySet, QuantkitError>;

    /// Short label used in log lines.
    fn describe(&self) -> String {
        "holiday calendar".to_string()
    }
}

impl<T: HolidayCalendar + ?Sized> HolidayCalendar for Box<T> {
    fn holidays_for(&self, year: i32) -> Result<HolidaySet, QuantkitError> {
        (**self).holidays_for(year)
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}
