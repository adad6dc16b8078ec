//! Concrete adapter implementations for ports.

#[cfg(feature = "sqlite")]
pub mod sqlite_adapter;
pub mod csv_holiday_adapter;
pub mod memory_holiday_adapter;
pub mod holiday_chain;
pub mod file_config_adapter;
