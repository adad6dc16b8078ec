//! SQLite data adapter.
//!
//! One table per security symbol:
//!
//! | datetime (TEXT, PK) | open | high | low | close | volume | oi (optional) |
//!
//! Timestamps are stored as `YYYY-MM-DD HH:MM:SS` so text ordering matches
//! time ordering.

use crate::domain::config_validation::{retry_policy, sqlite_pool_size};
use crate::domain::error::QuantkitError;
use crate::domain::ohlcv::{OhlcvBar, TIMESTAMP_FORMAT};
use crate::domain::universe::SecurityClass;
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::{DataPort, SeriesStart};
use chrono::{Days, NaiveDate, NaiveDateTime};
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{params, params_from_iter, Connection};
use std::path::{Path, PathBuf};

type SqliteConn = PooledConnection<SqliteConnectionManager>;

pub struct SqliteAdapter {
    pool: Pool<SqliteConnectionManager>,
    path: Option<PathBuf>,
}

fn pool_error(e: r2d2::Error) -> QuantkitError {
    QuantkitError::Database {
        reason: e.to_string(),
    }
}

fn query_error(e: rusqlite::Error) -> QuantkitError {
    QuantkitError::DatabaseQuery {
        reason: e.to_string(),
    }
}

/// Quote a symbol for use as a table name.
fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Parse a stored timestamp; date-only rows are taken as midnight.
fn parse_timestamp(value: &str) -> Result<NaiveDateTime, chrono::ParseError> {
    NaiveDateTime::parse_from_str(value, TIMESTAMP_FORMAT).or_else(|e| {
        NaiveDate::parse_from_str(value, "%Y-%m-%d")
            .map(|d| d.and_time(chrono::NaiveTime::MIN))
            .map_err(|_| e)
    })
}

/// Lower bound for bars on or after `date`. The bare date sorts before both
/// the date-only and the full timestamp form of that day.
fn format_day_start(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

impl SqliteAdapter {
    /// Open (creating if needed) the database file at `path`.
    pub fn open<P: AsRef<Path>>(path: P, pool_size: u32) -> Result<Self, QuantkitError> {
        let path = path.as_ref().to_path_buf();
        let manager = SqliteConnectionManager::file(&path);
        let pool = Pool::builder()
            .max_size(pool_size.max(1))
            .build(manager)
            .map_err(pool_error)?;

        Ok(Self {
            pool,
            path: Some(path),
        })
    }

    /// Open the existing database configured for `class` under `[database]`.
    pub fn from_config(config: &dyn ConfigPort, class: SecurityClass) -> Result<Self, QuantkitError> {
        let key = class.config_key();
        let db_path = config
            .get_string("database", key)
            .ok_or_else(|| QuantkitError::ConfigMissing {
                section: "database".into(),
                key: key.into(),
            })?;

        if !Self::database_exists(&db_path) {
            return Err(QuantkitError::Database {
                reason: format!("database file not found: {db_path}"),
            });
        }

        let pool_size = sqlite_pool_size(config)?;
        let policy = retry_policy(config)?;
        tracing::debug!(path = %db_path, pool_size, class = %class, "opening sqlite database");
        policy.retry("open sqlite database", || Self::open(&db_path, pool_size))
    }

    pub fn in_memory() -> Result<Self, QuantkitError> {
        let manager = SqliteConnectionManager::memory();
        let pool = Pool::builder().max_size(1).build(manager).map_err(pool_error)?;

        Ok(Self { pool, path: None })
    }

    /// Whether a database file is present at `path`.
    pub fn database_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().is_file()
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn conn(&self) -> Result<SqliteConn, QuantkitError> {
        self.pool.get().map_err(pool_error)
    }

    /// Create the table for `symbol` if it does not exist.
    pub fn create_series(&self, symbol: &str) -> Result<(), QuantkitError> {
        let conn = self.conn()?;
        conn.execute_batch(&format!(
            "CREATE TABLE IF NOT EXISTS {} (
                datetime TEXT PRIMARY KEY NOT NULL,
                open REAL NOT NULL,
                high REAL NOT NULL,
                low REAL NOT NULL,
                close REAL NOT NULL,
                volume INTEGER NOT NULL,
                oi INTEGER
            );",
            quote_ident(symbol)
        ))
        .map_err(query_error)
    }

    /// Insert or replace bars for `symbol`, creating its table if needed.
    /// Returns the number of rows written.
    pub fn insert_bars(&self, symbol: &str, bars: &[OhlcvBar]) -> Result<usize, QuantkitError> {
        self.create_series(symbol)?;
        let mut conn = self.conn()?;
        let with_oi = has_oi_column(&conn, symbol)?;
        let table = quote_ident(symbol);

        let tx = conn.transaction().map_err(query_error)?;
        {
            let sql = if with_oi {
                format!(
                    "INSERT OR REPLACE INTO {table} (datetime, open, high, low, close, volume, oi)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)"
                )
            } else {
                format!(
                    "INSERT OR REPLACE INTO {table} (datetime, open, high, low, close, volume)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6)"
                )
            };
            let mut stmt = tx.prepare(&sql).map_err(query_error)?;
            for bar in bars {
                let ts = bar.timestamp_string();
                let written = if with_oi {
                    stmt.execute(params![ts, bar.open, bar.high, bar.low, bar.close, bar.volume, bar.oi])
                } else {
                    stmt.execute(params![ts, bar.open, bar.high, bar.low, bar.close, bar.volume])
                };
                written.map_err(query_error)?;
            }
        }
        tx.commit().map_err(query_error)?;

        tracing::debug!(symbol, rows = bars.len(), "ingested bars");
        Ok(bars.len())
    }

    /// Drop the table for `symbol`. Returns `false` if there was none.
    pub fn delete_security(&self, symbol: &str) -> Result<bool, QuantkitError> {
        if !self.symbol_exists(symbol)? {
            tracing::warn!(symbol, "no table to delete");
            return Ok(false);
        }
        let conn = self.conn()?;
        conn.execute_batch(&format!("DROP TABLE IF EXISTS {};", quote_ident(symbol)))
            .map_err(query_error)?;
        tracing::info!(symbol, "deleted security");
        Ok(true)
    }

    /// Delete bars at or after `start`. Returns the number of rows removed.
    pub fn delete_series_from(&self, symbol: &str, start: SeriesStart) -> Result<usize, QuantkitError> {
        if !self.symbol_exists(symbol)? {
            return Err(QuantkitError::UnknownSymbol(symbol.to_string()));
        }
        let conn = self.conn()?;
        let table = quote_ident(symbol);
        let removed = match lower_bound(&conn, symbol, start)? {
            Some(bound) => conn
                .execute(&format!("DELETE FROM {table} WHERE datetime >= ?1"), params![bound])
                .map_err(query_error)?,
            None => conn
                .execute(&format!("DELETE FROM {table}"), [])
                .map_err(query_error)?,
        };
        tracing::info!(symbol, removed, "deleted bars");
        Ok(removed)
    }
}

fn has_oi_column(conn: &Connection, symbol: &str) -> Result<bool, QuantkitError> {
    let count: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM pragma_table_info(?1) WHERE name = 'oi'",
            params![symbol],
            |row| row.get(0),
        )
        .map_err(query_error)?;
    Ok(count > 0)
}

/// Inclusive lower timestamp bound for `start`, or `None` for no bound.
fn lower_bound(conn: &Connection, symbol: &str, start: SeriesStart) -> Result<Option<String>, QuantkitError> {
    match start {
        SeriesStart::Earliest => Ok(None),
        SeriesStart::On(date) => Ok(Some(format_day_start(date))),
        SeriesStart::LastDays(days) => {
            let latest: Option<String> = conn
                .query_row(
                    &format!("SELECT MAX(datetime) FROM {}", quote_ident(symbol)),
                    [],
                    |row| row.get(0),
                )
                .map_err(query_error)?;
            let Some(latest) = latest else {
                return Ok(None);
            };
            let latest = parse_timestamp(&latest).map_err(|e| QuantkitError::Database {
                reason: format!("invalid timestamp '{latest}': {e}"),
            })?;
            let from = latest
                .date()
                .checked_sub_days(Days::new(u64::from(days)))
                .unwrap_or(NaiveDate::MIN);
            Ok(Some(format_day_start(from)))
        }
    }
}

impl DataPort for SqliteAdapter {
    fn list_available_symbols(&self) -> Result<Vec<String>, QuantkitError> {
        let conn = self.conn()?;

        let query = "SELECT name FROM sqlite_master
                     WHERE type = 'table' AND name NOT LIKE 'sqlite_%'
                     ORDER BY name";

        let mut stmt = conn.prepare(query).map_err(query_error)?;
        let rows = stmt.query_map([], |row| row.get(0)).map_err(query_error)?;

        let mut symbols = Vec::new();
        for row in rows {
            symbols.push(row.map_err(query_error)?);
        }

        Ok(symbols)
    }

    fn symbol_exists(&self, symbol: &str) -> Result<bool, QuantkitError> {
        let conn = self.conn()?;
        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
                params![symbol],
                |row| row.get(0),
            )
            .map_err(query_error)?;
        Ok(count > 0)
    }

    fn read_series(&self, symbol: &str, start: SeriesStart) -> Result<Vec<OhlcvBar>, QuantkitError> {
        if !self.symbol_exists(symbol)? {
            return Err(QuantkitError::UnknownSymbol(symbol.to_string()));
        }
        let conn = self.conn()?;

        let oi_column = if has_oi_column(&conn, symbol)? { "oi" } else { "NULL" };
        let bound = lower_bound(&conn, symbol, start)?;
        let filter = if bound.is_some() { "WHERE datetime >= ?1" } else { "" };

        let query = format!(
            "SELECT datetime, open, high, low, close, volume, {oi_column}
             FROM {}
             {filter}
             ORDER BY datetime ASC",
            quote_ident(symbol)
        );

        let mut stmt = conn.prepare(&query).map_err(query_error)?;
        let rows = stmt
            .query_map(params_from_iter(bound.iter()), |row| {
                let ts_str: String = row.get(0)?;
                let timestamp = parse_timestamp(&ts_str).map_err(|e| {
                    rusqlite::Error::FromSqlConversionFailure(
                        ts_str.len(),
                        rusqlite::types::Type::Text,
                        Box::new(e),
                    )
                })?;
                Ok(OhlcvBar {
                    timestamp,
                    open: row.get(1)?,
                    high: row.get(2)?,
                    low: row.get(3)?,
                    close: row.get(4)?,
                    volume: row.get(5)?,
                    oi: row.get(6)?,
                })
            })
            .map_err(query_error)?;

        let mut bars = Vec::new();
        for row in rows {
            bars.push(row.map_err(query_error)?);
        }

        Ok(bars)
    }

    fn get_data_range(
        &self,
        symbol: &str,
    ) -> Result<Option<(NaiveDateTime, NaiveDateTime, usize)>, QuantkitError> {
        if !self.symbol_exists(symbol)? {
            return Err(QuantkitError::UnknownSymbol(symbol.to_string()));
        }
        let conn = self.conn()?;

        let query = format!(
            "SELECT MIN(datetime), MAX(datetime), COUNT(*) FROM {}",
            quote_ident(symbol)
        );

        let result: (Option<String>, Option<String>, i64) = conn
            .query_row(&query, [], |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)))
            .map_err(query_error)?;

        match result {
            (Some(min_str), Some(max_str), count) if count > 0 => {
                let min = parse_timestamp(&min_str).map_err(|e| QuantkitError::Database {
                    reason: e.to_string(),
                })?;
                let max = parse_timestamp(&max_str).map_err(|e| QuantkitError::Database {
                    reason: e.to_string(),
                })?;
                Ok(Some((min, max, count as usize)))
            }
            _ => Ok(None),
        }
    }
}
