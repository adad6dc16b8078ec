//! Data integrity checks over a store of symbol series.

use crate::domain::error::QuantkitError;
use crate::ports::data_port::DataPort;
use chrono::{NaiveDate, NaiveDateTime};
use std::io::Write;

/// A series that does not reach back to the cutoff date.
#[derive(Debug, Clone, PartialEq)]
pub struct ShortHistory {
    pub symbol: String,
    /// `None` for an empty series.
    pub first: Option<NaiveDateTime>,
    pub last: Option<NaiveDateTime>,
    pub bars: usize,
}

/// Symbols whose first bar falls on a day after `cutoff`, in symbol order.
/// Empty series are always reported.
pub fn find_short_histories(
    port: &dyn DataPort,
    cutoff: NaiveDate,
) -> Result<Vec<ShortHistory>, QuantkitError> {
    let symbols = port.list_available_symbols()?;
    let mut short = Vec::new();

    for symbol in symbols {
        match port.get_data_range(&symbol)? {
            Some((first, last, bars)) if first.date() > cutoff => {
                tracing::info!(symbol = %symbol, %first, "history starts after cutoff");
                short.push(ShortHistory {
                    symbol,
                    first: Some(first),
                    last: Some(last),
                    bars,
                });
            }
            Some(_) => {}
            None => {
                tracing::warn!(symbol = %symbol, "empty series");
                short.push(ShortHistory {
                    symbol,
                    first: None,
                    last: None,
                    bars: 0,
                });
            }
        }
    }

    Ok(short)
}

/// Write the report as CSV with a `symbol,first,last,bars` header.
pub fn write_report<W: Write>(writer: W, rows: &[ShortHistory]) -> Result<(), QuantkitError> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(["symbol", "first", "last", "bars"])
        .map_err(std::io::Error::from)?;

    for row in rows {
        let first = row.first.map(|t| t.to_string()).unwrap_or_default();
        let last = row.last.map(|t| t.to_string()).unwrap_or_default();
        wtr.write_record([row.symbol.as_str(), &first, &last, &row.bars.to_string()])
            .map_err(std::io::Error::from)?;
    }

    wtr.flush()?;
    Ok(())
}
