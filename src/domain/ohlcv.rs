//! OHLCV bar representation.

use chrono::NaiveDateTime;

/// Timestamp format used by the symbol tables.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone, PartialEq)]
pub struct OhlcvBar {
    pub timestamp: NaiveDateTime,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: i64,
    /// Open interest, only present for derivatives.
    pub oi: Option<i64>,
}

impl OhlcvBar {
    pub fn timestamp_string(&self) -> String {
        self.timestamp.format(TIMESTAMP_FORMAT).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn sample_bar() -> OhlcvBar {
        OhlcvBar {
            timestamp: NaiveDate::from_ymd_opt(2024, 1, 15)
                .unwrap()
                .and_hms_opt(9, 15, 0)
                .unwrap(),
            open: 100.0,
            high: 110.0,
            low: 90.0,
            close: 105.0,
            volume: 50_000,
            oi: None,
        }
    }

    #[test]
    fn timestamp_uses_table_format() {
        assert_eq!(sample_bar().timestamp_string(), "2024-01-15 09:15:00");
    }

    #[test]
    fn open_interest_is_optional() {
        let bar = OhlcvBar {
            oi: Some(1_200),
            ..sample_bar()
        };
        assert_eq!(bar.oi, Some(1_200));
        assert_eq!(sample_bar().oi, None);
    }
}
