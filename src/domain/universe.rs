//! Security classes and symbol lists.
//!
//! Each class of security lives in its own SQLite file, configured under
//! `[database]`.

use crate::domain::error::QuantkitError;
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SecurityClass {
    Index,
    Futures,
    Stocks,
}

impl SecurityClass {
    pub const ALL: [SecurityClass; 3] = [Self::Index, Self::Futures, Self::Stocks];

    /// Key under `[database]` holding this class's database path.
    pub fn config_key(&self) -> &'static str {
        match self {
            Self::Index => "index_path",
            Self::Futures => "futures_path",
            Self::Stocks => "stocks_path",
        }
    }
}

impl FromStr for SecurityClass {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "index" | "indices" => Ok(Self::Index),
            "futures" | "future" | "fut" => Ok(Self::Futures),
            "stocks" | "stock" | "equity" | "eq" => Ok(Self::Stocks),
            other => Err(format!(
                "unknown security class '{other}' (expected index, futures or stocks)"
            )),
        }
    }
}

impl fmt::Display for SecurityClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Index => "index",
            Self::Futures => "futures",
            Self::Stocks => "stocks",
        };
        write!(f, "{name}")
    }
}

/// Parse a comma separated symbol list, uppercasing each entry.
/// Empty entries and duplicates are rejected.
pub fn parse_symbols(input: &str) -> Result<Vec<String>, QuantkitError> {
    let mut symbols = Vec::new();
    let mut seen = HashSet::new();

    for token in input.split(',') {
        let trimmed = token.trim();
        if trimmed.is_empty() {
            return Err(QuantkitError::InvalidSymbol {
                symbol: input.to_string(),
                reason: "empty entry in symbol list".into(),
            });
        }
        let symbol = trimmed.to_uppercase();
        if !seen.insert(symbol.clone()) {
            return Err(QuantkitError::InvalidSymbol {
                symbol,
                reason: "duplicate symbol".into(),
            });
        }
        symbols.push(symbol);
    }

    Ok(symbols)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_symbols_basic() {
        let result = parse_symbols("NSE:NIFTY-FUT-I, nse:sbin-eq ,NSE:NIFTY50-INDEX").unwrap();
        assert_eq!(result, vec!["NSE:NIFTY-FUT-I", "NSE:SBIN-EQ", "NSE:NIFTY50-INDEX"]);
    }

    #[test]
    fn parse_symbols_single() {
        assert_eq!(parse_symbols("NSE:TCS-EQ").unwrap(), vec!["NSE:TCS-EQ"]);
    }

    #[test]
    fn parse_symbols_empty_token() {
        assert!(matches!(
            parse_symbols("NSE:TCS-EQ,,NSE:INFY-EQ"),
            Err(QuantkitError::InvalidSymbol { .. })
        ));
    }

    #[test]
    fn parse_symbols_duplicate() {
        let result = parse_symbols("NSE:TCS-EQ,nse:tcs-eq");
        assert!(matches!(result, Err(QuantkitError::InvalidSymbol { symbol, .. }) if symbol == "NSE:TCS-EQ"));
    }

    #[test]
    fn class_names_and_keys() {
        assert_eq!("Futures".parse::<SecurityClass>().unwrap(), SecurityClass::Futures);
        assert_eq!("eq".parse::<SecurityClass>().unwrap(), SecurityClass::Stocks);
        assert!("bonds".parse::<SecurityClass>().is_err());
        let keys: Vec<_> = SecurityClass::ALL.iter().map(|c| c.config_key()).collect();
        assert_eq!(keys, vec!["index_path", "futures_path", "stocks_path"]);
        assert_eq!(SecurityClass::Index.to_string(), "index");
    }
}
