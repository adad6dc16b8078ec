//! Domain error types.

use chrono::NaiveDate;

/// Top-level error type for quantkit.
#[derive(Debug, thiserror::Error)]
pub enum QuantkitError {
    #[error("holiday data unavailable for {year}: {reason}")]
    DataUnavailable { year: i32, reason: String },

    #[error("invalid weekday '{0}': use a full name (Monday), an abbreviation (Mon) or an index 0-6")]
    InvalidWeekday(String),

    #[error("invalid symbol {symbol}: {reason}")]
    InvalidSymbol { symbol: String, reason: String },

    #[error("invalid option type '{0}': expected CE or PE")]
    InvalidOptionType(String),

    #[error("invalid expiry cycle '{0}': expected current-week, next-week, current-month or next-month")]
    InvalidCycle(String),

    #[error("no trading day within {steps} days of {date}")]
    Validation { date: NaiveDate, steps: u32 },

    #[error("date out of range for {year}-{month:02}")]
    DateOutOfRange { year: i32, month: u32 },

    #[error("database error: {reason}")]
    Database { reason: String },

    #[error("database query error: {reason}")]
    DatabaseQuery { reason: String },

    #[error("no table for symbol {0}")]
    UnknownSymbol(String),

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl QuantkitError {
    /// Process exit status reported by the CLI for this error.
    pub fn exit_status(&self) -> u8 {
        match self {
            QuantkitError::Io(_) => 1,
            QuantkitError::ConfigParse { .. }
            | QuantkitError::ConfigMissing { .. }
            | QuantkitError::ConfigInvalid { .. } => 2,
            QuantkitError::Database { .. }
            | QuantkitError::DatabaseQuery { .. }
            | QuantkitError::UnknownSymbol(_) => 3,
            QuantkitError::InvalidWeekday(_)
            | QuantkitError::InvalidSymbol { .. }
            | QuantkitError::InvalidOptionType(_)
            | QuantkitError::InvalidCycle(_) => 4,
            QuantkitError::DataUnavailable { .. }
            | QuantkitError::Validation { .. }
            | QuantkitError::DateOutOfRange { .. } => 5,
        }
    }
}

impl From<&QuantkitError> for std::process::ExitCode {
    fn from(err: &QuantkitError) -> Self {
        std::process::ExitCode::from(err.exit_status())
    }
}
