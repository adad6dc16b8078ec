//! Security symbols as stored in the databases.
//!
//! Symbols look like `NSE:NIFTY-FUT-I` (near-month future), `NSE:NIFTY-FUT-II`
//! (next-month future), `NSE:NIFTY50-INDEX` or `NSE:SBIN-EQ`. The underlying
//! is everything before the first `-`, exchange prefix included.

use crate::domain::error::QuantkitError;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FutureSeries {
    Near,
    Next,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecurityKind {
    Future { series: FutureSeries },
    Index,
    Equity,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecuritySymbol {
    pub raw: String,
    pub exchange: String,
    pub underlying: String,
    pub kind: SecurityKind,
}

impl SecuritySymbol {
    pub fn parse(input: &str) -> Result<Self, QuantkitError> {
        let raw = input.trim().to_uppercase();
        let invalid = |reason: &str| QuantkitError::InvalidSymbol {
            symbol: input.to_string(),
            reason: reason.to_string(),
        };

        let (exchange, rest) = raw
            .split_once(':')
            .ok_or_else(|| invalid("missing exchange prefix (e.g. NSE:)"))?;
        if exchange.is_empty() {
            return Err(invalid("empty exchange prefix"));
        }

        let mut parts = rest.split('-');
        let name = parts.next().unwrap_or_default();
        if name.is_empty() {
            return Err(invalid("empty underlying name"));
        }
        let suffix: Vec<&str> = parts.collect();

        let kind = match suffix.iter().position(|p| *p == "FUT") {
            Some(i) => {
                let series = match suffix.get(i + 1).copied() {
                    None | Some("I") => FutureSeries::Near,
                    Some("II") => FutureSeries::Next,
                    Some(_) => return Err(invalid("unknown futures series, expected I or II")),
                };
                SecurityKind::Future { series }
            }
            None if suffix.contains(&"INDEX") => SecurityKind::Index,
            None => SecurityKind::Equity,
        };

        Ok(Self {
            exchange: exchange.to_string(),
            underlying: format!("{exchange}:{name}"),
            kind,
            raw,
        })
    }

    pub fn is_future(&self) -> bool {
        matches!(self.kind, SecurityKind::Future { .. })
    }

    pub fn is_index(&self) -> bool {
        self.kind == SecurityKind::Index
    }
}

impl fmt::Display for SecuritySymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.raw)
    }
}
