//! Configuration validation.
//!
//! Each section is checked up front so commands fail before touching any
//! database or holiday file. The typed accessors here are also what the CLI
//! uses to build its components.

use crate::domain::error::QuantkitError;
use crate::domain::holiday::HolidaySet;
use crate::domain::ticker::ExpiryWeekdays;
use crate::domain::trading_day::AdjustDirection;
use crate::domain::weekday::parse_weekday;
use crate::ports::config_port::ConfigPort;
use crate::wrappers::RetryPolicy;
use chrono::NaiveDate;
use std::time::Duration;

pub fn validate_config(config: &dyn ConfigPort) -> Result<(), QuantkitError> {
    sqlite_pool_size(config)?;
    retry_policy(config)?;
    adjust_direction(config)?;
    extra_holidays(config)?;
    expiry_weekdays(config)?;
    log_level(config)?;
    Ok(())
}

fn invalid(section: &str, key: &str, reason: impl Into<String>) -> QuantkitError {
    QuantkitError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.into(),
    }
}

/// `[sqlite] pool_size`, default 4.
pub fn sqlite_pool_size(config: &dyn ConfigPort) -> Result<u32, QuantkitError> {
    let value = config.get_int("sqlite", "pool_size", 4);
    if !(1..=64).contains(&value) {
        return Err(invalid("sqlite", "pool_size", "pool_size must be between 1 and 64"));
    }
    Ok(value as u32)
}

/// `[sqlite] connect_attempts` (default 1) and `retry_delay_ms` (default 500).
pub fn retry_policy(config: &dyn ConfigPort) -> Result<RetryPolicy, QuantkitError> {
    let attempts = config.get_int("sqlite", "connect_attempts", 1);
    if !(1..=100).contains(&attempts) {
        return Err(invalid(
            "sqlite",
            "connect_attempts",
            "connect_attempts must be between 1 and 100",
        ));
    }
    let delay_ms = config.get_int("sqlite", "retry_delay_ms", 500);
    if delay_ms < 0 {
        return Err(invalid("sqlite", "retry_delay_ms", "retry_delay_ms must be non-negative"));
    }
    Ok(RetryPolicy::new(
        attempts as u32,
        Duration::from_millis(delay_ms as u64),
    ))
}

/// `[holidays] adjust`, default backward.
pub fn adjust_direction(config: &dyn ConfigPort) -> Result<AdjustDirection, QuantkitError> {
    match config.get_string("holidays", "adjust") {
        None => Ok(AdjustDirection::default()),
        Some(s) => s.parse().map_err(|e: String| invalid("holidays", "adjust", e)),
    }
}

/// `[holidays] extra`, a comma separated list of `YYYY-MM-DD` dates.
pub fn extra_holidays(config: &dyn ConfigPort) -> Result<HolidaySet, QuantkitError> {
    config
        .get_list("holidays", "extra")
        .iter()
        .map(|s| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|_| {
                invalid(
                    "holidays",
                    "extra",
                    format!("invalid date '{s}', expected YYYY-MM-DD"),
                )
            })
        })
        .collect()
}

/// `[expiry] default_weekday` and `bse_weekday`.
pub fn expiry_weekdays(config: &dyn ConfigPort) -> Result<ExpiryWeekdays, QuantkitError> {
    let mut weekdays = ExpiryWeekdays::default();
    if let Some(s) = config.get_string("expiry", "default_weekday") {
        weekdays.default =
            parse_weekday(&s).map_err(|e| invalid("expiry", "default_weekday", e.to_string()))?;
    }
    if let Some(s) = config.get_string("expiry", "bse_weekday") {
        weekdays.bse =
            parse_weekday(&s).map_err(|e| invalid("expiry", "bse_weekday", e.to_string()))?;
    }
    Ok(weekdays)
}

/// `[logging] level`, if set.
pub fn log_level(config: &dyn ConfigPort) -> Result<Option<tracing::Level>, QuantkitError> {
    match config.get_string("logging", "level") {
        None => Ok(None),
        Some(s) => s.trim().parse().map(Some).map_err(|_| {
            invalid(
                "logging",
                "level",
                format!("unknown level '{s}' (expected error, warn, info, debug or trace)"),
            )
        }),
    }
}
