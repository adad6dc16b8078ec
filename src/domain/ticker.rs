//! Contract ticker formatting.
//!
//! Monthly futures:  `{underlying}{YY}{MMM}FUT`          e.g. `NSE:NIFTY20OCTFUT`
//! Monthly options:  `{underlying}{YY}{MMM}{strike}{CE|PE}` e.g. `NSE:BANKNIFTY20NOV25000PE`
//! Weekly options:   `{underlying}{YY}{M}{DD}{strike}{CE|PE}` e.g. `NSE:NIFTY20O0811000CE`
//!
//! `M` is a single character month code: `1`-`9` for January to September,
//! then `O`, `N`, `D`.

use crate::domain::error::QuantkitError;
use chrono::{Datelike, NaiveDate, Weekday};
use std::fmt;
use std::str::FromStr;

const MONTH_ABBR: [&str; 12] = [
    "JAN", "FEB", "MAR", "APR", "MAY", "JUN", "JUL", "AUG", "SEP", "OCT", "NOV", "DEC",
];

const WEEKLY_MONTH_CODES: [char; 12] = ['1', '2', '3', '4', '5', '6', '7', '8', '9', 'O', 'N', 'D'];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OptionType {
    Call,
    Put,
}

impl OptionType {
    pub fn code(&self) -> &'static str {
        match self {
            OptionType::Call => "CE",
            OptionType::Put => "PE",
        }
    }
}

impl FromStr for OptionType {
    type Err = QuantkitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "CE" => Ok(OptionType::Call),
            "PE" => Ok(OptionType::Put),
            _ => Err(QuantkitError::InvalidOptionType(s.to_string())),
        }
    }
}

impl fmt::Display for OptionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Expiry weekday per exchange family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpiryWeekdays {
    pub default: Weekday,
    pub bse: Weekday,
}

impl Default for ExpiryWeekdays {
    fn default() -> Self {
        Self {
            default: Weekday::Thu,
            bse: Weekday::Tue,
        }
    }
}

impl ExpiryWeekdays {
    /// Weekday for a symbol or underlying, keyed off its exchange prefix.
    pub fn for_symbol(&self, symbol: &str) -> Weekday {
        let exchange = symbol.split(':').next().unwrap_or_default();
        if exchange.trim().eq_ignore_ascii_case("BSE") {
            self.bse
        } else {
            self.default
        }
    }
}

/// Three-letter upper-case month, 1-based.
pub fn month_abbr(month: u32) -> &'static str {
    MONTH_ABBR[(month.clamp(1, 12) - 1) as usize]
}

/// Single-character weekly month code, 1-based.
pub fn weekly_month_code(month: u32) -> char {
    WEEKLY_MONTH_CODES[(month.clamp(1, 12) - 1) as usize]
}

fn two_digit_year(date: NaiveDate) -> String {
    format!("{:02}", date.year().rem_euclid(100))
}

pub fn futures_ticker(underlying: &str, expiry: NaiveDate) -> String {
    format!(
        "{}{}{}FUT",
        underlying,
        two_digit_year(expiry),
        month_abbr(expiry.month())
    )
}

pub fn monthly_option_ticker(
    underlying: &str,
    expiry: NaiveDate,
    strike: u32,
    option_type: OptionType,
) -> String {
    format!(
        "{}{}{}{}{}",
        underlying,
        two_digit_year(expiry),
        month_abbr(expiry.month()),
        strike,
        option_type
    )
}

pub fn weekly_option_ticker(
    underlying: &str,
    expiry: NaiveDate,
    strike: u32,
    option_type: OptionType,
) -> String {
    format!(
        "{}{}{}{:02}{}{}",
        underlying,
        two_digit_year(expiry),
        weekly_month_code(expiry.month()),
        expiry.day(),
        strike,
        option_type
    )
}

/// Year and month encoded in a monthly futures or options ticker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContractMonth {
    pub year: u32,
    pub month: u32,
}

/// Year, month and day encoded in a weekly options ticker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContractDay {
    pub year: u32,
    pub month: u32,
    pub day: u32,
}

fn strip_underlying<'t>(ticker: &'t str, underlying: &str) -> Option<&'t str> {
    ticker.strip_prefix(underlying)
}

fn parse_year(rest: &str) -> Option<u32> {
    let yy = rest.get(..2)?;
    if !yy.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    yy.parse().ok()
}

/// Decode `{YY}{MMM}` after `underlying` in a monthly ticker.
pub fn decode_monthly_ticker(ticker: &str, underlying: &str) -> Option<ContractMonth> {
    let rest = strip_underlying(ticker, underlying)?;
    let year = parse_year(rest)?;
    let abbr = rest.get(2..5)?;
    let month = MONTH_ABBR.iter().position(|m| *m == abbr)? as u32 + 1;
    Some(ContractMonth { year, month })
}

/// Decode `{YY}{M}{DD}` after `underlying` in a weekly ticker.
pub fn decode_weekly_ticker(ticker: &str, underlying: &str) -> Option<ContractDay> {
    let rest = strip_underlying(ticker, underlying)?;
    let year = parse_year(rest)?;
    let code = rest.get(2..3)?.chars().next()?;
    let month = WEEKLY_MONTH_CODES.iter().position(|c| *c == code)? as u32 + 1;
    let day: u32 = rest.get(3..5)?.parse().ok()?;
    if !(1..=31).contains(&day) {
        return None;
    }
    Some(ContractDay { year, month, day })
}
