//! Data access port trait.

use crate::domain::error::QuantkitError;
use crate::domain::ohlcv::OhlcvBar;
use chrono::{NaiveDate, NaiveDateTime};

/// Where a series read (or delete) starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SeriesStart {
    /// From the first stored bar.
    #[default]
    Earliest,
    /// From midnight of the given date.
    On(NaiveDate),
    /// The last `n` calendar days before the most recent bar.
    LastDays(u32),
}

pub trait DataPort {
    /// Every symbol with a series in the store, sorted.
    fn list_available_symbols(&self) -> Result<Vec<String>, QuantkitError>;

    fn symbol_exists(&self, symbol: &str) -> Result<bool, QuantkitError> {
        Ok(self
            .list_available_symbols()?
            .iter()
            .any(|s| s == symbol))
    }

    /// Bars ordered by timestamp. Unknown symbols are `UnknownSymbol`.
    fn read_series(&self, symbol: &str, start: SeriesStart) -> Result<Vec<OhlcvBar>, QuantkitError>;

    /// First timestamp, last timestamp and bar count, or `None` for an
    /// empty series.
    fn get_data_range(
        &self,
        symbol: &str,
    ) -> Result<Option<(NaiveDateTime, NaiveDateTime, usize)>, QuantkitError>;
}
