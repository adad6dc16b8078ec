//! CSV holiday file adapter.
//!
//! Reads `holidays_{year}.csv` from a directory. The date column is named
//! `str_date` (or `date`); values are `YYYY-MM-DD` or the long form used by
//! exchange holiday pages (`January 26, 2025`).

use crate::domain::error::QuantkitError;
use crate::domain::holiday::HolidaySet;
use crate::ports::holiday_port::HolidayCalendar;
use chrono::NaiveDate;
use std::fs;
use std::path::PathBuf;

const DATE_COLUMNS: [&str; 2] = ["str_date", "date"];
const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%B %d, %Y"];

pub struct CsvHolidayAdapter {
    base_path: PathBuf,
}

impl CsvHolidayAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    pub fn csv_path(&self, year: i32) -> PathBuf {
        self.base_path.join(format!("holidays_{year}.csv"))
    }
}

fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(value, fmt).ok())
}

impl HolidayCalendar for CsvHolidayAdapter {
    fn holidays_for(&self, year: i32) -> Result<HolidaySet, QuantkitError> {
        let path = self.csv_path(year);
        let unavailable = |reason: String| QuantkitError::DataUnavailable { year, reason };

        let content = fs::read_to_string(&path)
            .map_err(|e| unavailable(format!("failed to read {}: {}", path.display(), e)))?;

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let headers = rdr
            .headers()
            .map_err(|e| unavailable(format!("CSV header error in {}: {}", path.display(), e)))?
            .clone();

        let column = DATE_COLUMNS
            .iter()
            .find_map(|name| headers.iter().position(|h| h.trim() == *name))
            .ok_or_else(|| {
                unavailable(format!(
                    "{} has no str_date or date column",
                    path.display()
                ))
            })?;

        let mut dates = Vec::new();
        for result in rdr.records() {
            let record = result
                .map_err(|e| unavailable(format!("CSV parse error in {}: {}", path.display(), e)))?;
            let raw = record
                .get(column)
                .ok_or_else(|| unavailable("missing date column".into()))?;
            let date = parse_date(raw)
                .ok_or_else(|| unavailable(format!("invalid holiday date '{raw}'")))?;
            dates.push(date);
        }

        tracing::debug!(path = %path.display(), count = dates.len(), "loaded holiday file");
        Ok(dates.into_iter().collect())
    }

    fn describe(&self) -> String {
        format!("csv files in {}", self.base_path.display())
    }
}
