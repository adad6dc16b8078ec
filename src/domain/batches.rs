//! Splitting a date range into download-sized windows.

use chrono::{Days, NaiveDate};

/// Default window length, in days, for bulk history downloads.
pub const DEFAULT_BATCH_DAYS: u32 = 95;

/// Inclusive date window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateBatch {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateBatch {
    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }
}

/// Consecutive, non-overlapping windows covering `start..=end`, each at
/// most `batch_days` long. Empty when `start > end`.
pub fn date_batches(start: NaiveDate, end: NaiveDate, batch_days: u32) -> Vec<DateBatch> {
    let span = u64::from(batch_days.max(1) - 1);
    let mut batches = Vec::new();
    let mut cursor = start;

    while cursor <= end {
        let window_end = cursor
            .checked_add_days(Days::new(span))
            .map_or(end, |d| d.min(end));
        batches.push(DateBatch {
            start: cursor,
            end: window_end,
        });
        match window_end.succ_opt() {
            Some(next) => cursor = next,
            None => break,
        }
    }

    batches
}
