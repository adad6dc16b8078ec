#![allow(dead_code)]

use chrono::{NaiveDate, NaiveDateTime};
pub use quantkit::domain::ohlcv::OhlcvBar;
use quantkit::domain::error::QuantkitError;
use quantkit::ports::data_port::{DataPort, SeriesStart};
use std::collections::BTreeMap;
use std::io::Write;
use std::path::Path;

/// In-memory store keyed by symbol.
pub struct MockDataPort {
    pub data: BTreeMap<String, Vec<OhlcvBar>>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            data: BTreeMap::new(),
        }
    }

    pub fn with_bars(mut self, symbol: &str, bars: Vec<OhlcvBar>) -> Self {
        self.data.insert(symbol.to_string(), bars);
        self
    }
}

impl DataPort for MockDataPort {
    fn list_available_symbols(&self) -> Result<Vec<String>, QuantkitError> {
        Ok(self.data.keys().cloned().collect())
    }

    fn read_series(&self, symbol: &str, start: SeriesStart) -> Result<Vec<OhlcvBar>, QuantkitError> {
        let bars = self
            .data
            .get(symbol)
            .ok_or_else(|| QuantkitError::UnknownSymbol(symbol.to_string()))?;
        let from = match start {
            SeriesStart::Earliest => None,
            SeriesStart::On(date) => Some(date.and_hms_opt(0, 0, 0).unwrap()),
            SeriesStart::LastDays(days) => bars
                .last()
                .map(|b| b.timestamp.date() - chrono::Duration::days(i64::from(days)))
                .map(|d| d.and_hms_opt(0, 0, 0).unwrap()),
        };
        Ok(bars
            .iter()
            .filter(|b| from.is_none_or(|f| b.timestamp >= f))
            .cloned()
            .collect())
    }

    fn get_data_range(
        &self,
        symbol: &str,
    ) -> Result<Option<(NaiveDateTime, NaiveDateTime, usize)>, QuantkitError> {
        let bars = self
            .data
            .get(symbol)
            .ok_or_else(|| QuantkitError::UnknownSymbol(symbol.to_string()))?;
        match (bars.first(), bars.last()) {
            (Some(first), Some(last)) => Ok(Some((first.timestamp, last.timestamp, bars.len()))),
            _ => Ok(None),
        }
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn make_bar(date_str: &str, close: f64) -> OhlcvBar {
    let timestamp = NaiveDate::parse_from_str(date_str, "%Y-%m-%d")
        .unwrap()
        .and_hms_opt(9, 15, 0)
        .unwrap();
    OhlcvBar {
        timestamp,
        open: close - 5.0,
        high: close + 10.0,
        low: close - 10.0,
        close,
        volume: 10_000,
        oi: Some(2_500),
    }
}

/// Daily bars from `start` for `days` consecutive days.
pub fn daily_bars(start: NaiveDate, days: u32, base_close: f64) -> Vec<OhlcvBar> {
    (0..days)
        .map(|i| {
            let d = start + chrono::Duration::days(i64::from(i));
            make_bar(&d.format("%Y-%m-%d").to_string(), base_close + f64::from(i))
        })
        .collect()
}

pub fn write_temp_ini(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

/// Write `holidays_{year}.csv` in the exchange download layout.
pub fn write_holiday_csv(dir: &Path, year: i32, dates: &[&str]) {
    let mut content = String::from("sr_no,str_date,day,description\n");
    for (i, d) in dates.iter().enumerate() {
        content.push_str(&format!("{},\"{}\",X,Holiday {}\n", i + 1, d, i + 1));
    }
    std::fs::write(dir.join(format!("holidays_{year}.csv")), content).unwrap();
}
