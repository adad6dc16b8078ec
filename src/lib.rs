//! quantkit: F&O expiry resolution, contract tickers and OHLCV store
//! maintenance for Indian exchanges.
//!
//! Hexagonal architecture: domain logic in [`domain`], port traits in [`ports`],
//! concrete implementations in [`adapters`].

pub mod domain;
pub mod ports;
pub mod adapters;
pub mod wrappers;
pub mod cli;
