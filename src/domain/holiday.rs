//! Non-trading date sets.

use chrono::{Datelike, NaiveDate};
use std::collections::BTreeSet;

/// Immutable set of exchange holidays.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HolidaySet {
    dates: BTreeSet<NaiveDate>,
}

impl HolidaySet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.dates.contains(&date)
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &NaiveDate> {
        self.dates.iter()
    }

    /// Subset falling in `year`.
    pub fn for_year(&self, year: i32) -> HolidaySet {
        self.dates.iter().copied().filter(|d| d.year() == year).collect()
    }

    /// Union of two sets.
    pub fn merged(&self, other: &HolidaySet) -> HolidaySet {
        self.dates.union(&other.dates).copied().collect()
    }
}

impl FromIterator<NaiveDate> for HolidaySet {
    fn from_iter<I: IntoIterator<Item = NaiveDate>>(iter: I) -> Self {
        Self {
            dates: iter.into_iter().collect(),
        }
    }
}
