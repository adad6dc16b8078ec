//! Weekday parsing for expiry calculations.
//!
//! Accepts full names (`Thursday`), three-letter abbreviations (`thu`) and
//! numeric indices where 0 is Monday and 6 is Sunday.

use crate::domain::error::QuantkitError;
use chrono::Weekday;

const WEEKDAY_NAMES: [(&str, Weekday); 14] = [
    ("monday", Weekday::Mon),
    ("tuesday", Weekday::Tue),
    ("wednesday", Weekday::Wed),
    ("thursday", Weekday::Thu),
    ("friday", Weekday::Fri),
    ("saturday", Weekday::Sat),
    ("sunday", Weekday::Sun),
    ("mon", Weekday::Mon),
    ("tue", Weekday::Tue),
    ("wed", Weekday::Wed),
    ("thu", Weekday::Thu),
    ("fri", Weekday::Fri),
    ("sat", Weekday::Sat),
    ("sun", Weekday::Sun),
];

/// Parse a weekday from a name, abbreviation or 0-based index.
pub fn parse_weekday(input: &str) -> Result<Weekday, QuantkitError> {
    let key = input.trim().to_lowercase();

    if let Ok(index) = key.parse::<u8>() {
        return weekday_from_index(index)
            .ok_or_else(|| QuantkitError::InvalidWeekday(input.to_string()));
    }

    WEEKDAY_NAMES
        .iter()
        .find(|(name, _)| *name == key)
        .map(|(_, day)| *day)
        .ok_or_else(|| QuantkitError::InvalidWeekday(input.to_string()))
}

/// 0 = Monday .. 6 = Sunday.
pub fn weekday_from_index(index: u8) -> Option<Weekday> {
    match index {
        0 => Some(Weekday::Mon),
        1 => Some(Weekday::Tue),
        2 => Some(Weekday::Wed),
        3 => Some(Weekday::Thu),
        4 => Some(Weekday::Fri),
        5 => Some(Weekday::Sat),
        6 => Some(Weekday::Sun),
        _ => None,
    }
}

pub fn is_weekend(day: Weekday) -> bool {
    matches!(day, Weekday::Sat | Weekday::Sun)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_names_case_insensitive() {
        assert_eq!(parse_weekday("Thursday").unwrap(), Weekday::Thu);
        assert_eq!(parse_weekday("TUESDAY").unwrap(), Weekday::Tue);
        assert_eq!(parse_weekday("  sunday ").unwrap(), Weekday::Sun);
    }

    #[test]
    fn parses_abbreviations() {
        assert_eq!(parse_weekday("Thu").unwrap(), Weekday::Thu);
        assert_eq!(parse_weekday("mon").unwrap(), Weekday::Mon);
        assert_eq!(parse_weekday("SAT").unwrap(), Weekday::Sat);
    }

    #[test]
    fn parses_indices() {
        assert_eq!(parse_weekday("0").unwrap(), Weekday::Mon);
        assert_eq!(parse_weekday("3").unwrap(), Weekday::Thu);
        assert_eq!(parse_weekday("6").unwrap(), Weekday::Sun);
    }

    #[test]
    fn rejects_unknown_names() {
        for input in ["thurs", "", "7", "-1", "weekday"] {
            match parse_weekday(input) {
                Err(QuantkitError::InvalidWeekday(got)) => assert_eq!(got, input),
                other => panic!("expected InvalidWeekday for {input:?}, got {other:?}"),
            }
        }
    }

    #[test]
    fn index_matches_chrono_numbering() {
        for i in 0..7u8 {
            let day = weekday_from_index(i).unwrap();
            assert_eq!(day.num_days_from_monday(), i as u32);
        }
        assert!(weekday_from_index(7).is_none());
    }

    #[test]
    fn weekend_detection() {
        assert!(is_weekend(Weekday::Sat));
        assert!(is_weekend(Weekday::Sun));
        assert!(!is_weekend(Weekday::Fri));
    }
}
