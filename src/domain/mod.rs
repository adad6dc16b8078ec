//! Core domain types and logic.

pub mod error;
pub mod weekday;
pub mod holiday;
pub mod trading_day;
pub mod expiry_finder;
pub mod expiry;
pub mod ticker;
pub mod symbol;
pub mod contracts;
pub mod ohlcv;
pub mod universe;
pub mod batches;
pub mod integrity;
pub mod config_validation;
