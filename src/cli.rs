//! CLI definition and dispatch.

use chrono::{Datelike, Local, NaiveDate, Weekday};
use clap::{Args, Parser, Subcommand};
use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::Level;

use crate::adapters::csv_holiday_adapter::CsvHolidayAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::holiday_chain::{
    CachedHolidayCalendar, ExtendedHolidayCalendar, FallbackHolidayCalendar,
};
use crate::adapters::memory_holiday_adapter::StaticHolidayCalendar;
use crate::domain::batches::{date_batches, DEFAULT_BATCH_DAYS};
use crate::domain::config_validation::{
    adjust_direction, expiry_weekdays, extra_holidays, log_level, validate_config,
};
use crate::domain::contracts::ContractBuilder;
use crate::domain::error::QuantkitError;
use crate::domain::expiry::{ExpiryCycle, ExpiryResolver, ExpirySchedule};
use crate::domain::integrity::{find_short_histories, write_report, ShortHistory};
use crate::domain::ticker::OptionType;
use crate::domain::trading_day::TradingDayValidator;
use crate::domain::universe::{parse_symbols, SecurityClass};
use crate::domain::weekday::parse_weekday;
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::{DataPort, SeriesStart};
use crate::ports::holiday_port::HolidayCalendar;
use crate::wrappers::timed;

pub type SharedHolidayCalendar = CachedHolidayCalendar<Box<dyn HolidayCalendar + Send + Sync>>;

#[derive(Parser, Debug)]
#[command(
    name = "quantkit",
    version,
    about = "F&O expiry calendars, contract tickers and OHLCV store maintenance"
)]
pub struct Cli {
    /// INI configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
    /// Log level: error, warn, info, debug or trace
    #[arg(long, global = true)]
    pub log_level: Option<Level>,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show expiry dates for a reference date
    Expiry {
        /// Reference date (default: today)
        #[arg(long)]
        date: Option<NaiveDate>,
        /// Expiry weekday; overrides the exchange rule
        #[arg(long)]
        weekday: Option<String>,
        /// Pick the expiry weekday from this symbol's exchange
        #[arg(long)]
        symbol: Option<String>,
        /// Print only this cycle
        #[arg(long)]
        cycle: Option<ExpiryCycle>,
    },
    /// Convert database symbols to contract tickers
    Ticker {
        #[arg(required = true)]
        symbols: Vec<String>,
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Build an option contract ticker
    #[command(name = "option")]
    OptionTicker {
        /// Index symbol for monthly cycles, underlying for weekly ones
        symbol: String,
        #[arg(long)]
        cycle: ExpiryCycle,
        #[arg(long)]
        strike: u32,
        /// CE or PE
        #[arg(long = "type")]
        option_type: OptionType,
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Split a date range into download windows
    Batches {
        #[arg(long)]
        start: NaiveDate,
        /// Last day (default: today)
        #[arg(long)]
        end: Option<NaiveDate>,
        #[arg(long, default_value_t = DEFAULT_BATCH_DAYS)]
        size: u32,
    },
    #[command(flatten)]
    Store(StoreCommand),
}

#[derive(Subcommand, Debug)]
pub enum StoreCommand {
    /// List symbols stored for a security class
    ListSymbols {
        #[command(flatten)]
        store: StoreArgs,
    },
    /// Show data range for symbol(s)
    Info {
        #[command(flatten)]
        store: StoreArgs,
        /// Comma separated symbols (default: all)
        #[arg(long)]
        symbols: Option<String>,
    },
    /// Print a symbol's bars as CSV
    Series {
        #[command(flatten)]
        store: StoreArgs,
        symbol: String,
        #[command(flatten)]
        range: RangeArgs,
    },
    /// Delete a symbol, or its bars from a start point onward
    Delete {
        #[command(flatten)]
        store: StoreArgs,
        symbol: String,
        #[command(flatten)]
        range: RangeArgs,
    },
    /// Report symbols whose history starts after a cutoff date
    CheckIntegrity {
        #[command(flatten)]
        store: StoreArgs,
        #[arg(long)]
        cutoff: NaiveDate,
        /// Write the report as CSV
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Drop the reported symbols
        #[arg(long)]
        delete: bool,
    },
}

#[derive(Args, Debug, Clone)]
pub struct StoreArgs {
    /// Security class: index, futures or stocks
    #[arg(long, default_value = "futures")]
    pub class: SecurityClass,
}

#[derive(Args, Debug, Clone, Default)]
pub struct RangeArgs {
    /// Start at midnight of this date
    #[arg(long, conflicts_with = "last_days")]
    pub from: Option<NaiveDate>,
    /// Only the last N days before the latest bar
    #[arg(long)]
    pub last_days: Option<u32>,
}

impl RangeArgs {
    pub fn series_start(&self) -> SeriesStart {
        match (self.from, self.last_days) {
            (Some(date), _) => SeriesStart::On(date),
            (None, Some(days)) => SeriesStart::LastDays(days),
            (None, None) => SeriesStart::Earliest,
        }
    }

    pub fn is_unbounded(&self) -> bool {
        self.from.is_none() && self.last_days.is_none()
    }
}

pub fn run(cli: Cli) -> ExitCode {
    let config = match load_config(cli.config.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    let level = match cli.log_level {
        Some(level) => level,
        None => match log_level(&config) {
            Ok(level) => level.unwrap_or(Level::INFO),
            Err(e) => {
                eprintln!("error: {e}");
                return (&e).into();
            }
        },
    };
    init_logging(level);

    if let Err(e) = validate_config(&config) {
        eprintln!("error: {e}");
        return (&e).into();
    }

    let stdout = io::stdout();
    let mut out = stdout.lock();

    let result = match cli.command {
        Command::Expiry {
            date,
            weekday,
            symbol,
            cycle,
        } => run_expiry(
            &config,
            reference_date(date),
            weekday.as_deref(),
            symbol.as_deref(),
            cycle,
            &mut out,
        ),
        Command::Ticker { symbols, date } => {
            run_ticker(&config, &symbols, reference_date(date), &mut out)
        }
        Command::OptionTicker {
            symbol,
            cycle,
            strike,
            option_type,
            date,
        } => run_option(
            &config,
            &symbol,
            cycle,
            strike,
            option_type,
            reference_date(date),
            &mut out,
        ),
        Command::Batches { start, end, size } => {
            run_batches(start, reference_date(end), size, &mut out)
        }
        Command::Store(command) => run_store_command(&config, command, &mut out),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

/// Install the stderr fmt subscriber. Later calls are no-ops.
pub fn init_logging(level: Level) {
    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}

/// Load the INI file at `path`, or an empty configuration when no file is
/// given.
pub fn load_config(path: Option<&Path>) -> Result<FileConfigAdapter, QuantkitError> {
    match path {
        Some(path) => FileConfigAdapter::from_file(path),
        None => FileConfigAdapter::from_string("").map_err(|reason| QuantkitError::ConfigParse {
            file: "<default>".into(),
            reason,
        }),
    }
}

pub fn reference_date(date: Option<NaiveDate>) -> NaiveDate {
    date.unwrap_or_else(|| Local::now().date_naive())
}

/// Holiday source chain from `[holidays]`: CSV directory (with optional
/// fallback directory), plus configured extras, cached per year.
pub fn build_holiday_calendar(config: &dyn ConfigPort) -> Result<SharedHolidayCalendar, QuantkitError> {
    let base: Box<dyn HolidayCalendar + Send + Sync> = match (
        config.get_string("holidays", "dir"),
        config.get_string("holidays", "fallback_dir"),
    ) {
        (Some(dir), Some(fallback)) => Box::new(FallbackHolidayCalendar::new(
            Box::new(CsvHolidayAdapter::new(PathBuf::from(dir))),
            Box::new(CsvHolidayAdapter::new(PathBuf::from(fallback))),
        )),
        (Some(dir), None) | (None, Some(dir)) => Box::new(CsvHolidayAdapter::new(PathBuf::from(dir))),
        (None, None) => {
            tracing::warn!("no holiday directory configured, only weekends are skipped");
            Box::new(StaticHolidayCalendar::empty())
        }
    };

    let extra = extra_holidays(config)?;
    let calendar: Box<dyn HolidayCalendar + Send + Sync> = if extra.is_empty() {
        base
    } else {
        Box::new(ExtendedHolidayCalendar::new(base, extra))
    };

    tracing::debug!(source = %calendar.describe(), "holiday calendar ready");
    Ok(CachedHolidayCalendar::new(calendar))
}

pub fn build_contracts<'a>(
    calendar: &'a dyn HolidayCalendar,
    config: &dyn ConfigPort,
) -> Result<ContractBuilder<'a>, QuantkitError> {
    let validator = TradingDayValidator::new(calendar, adjust_direction(config)?);
    Ok(ContractBuilder::new(
        ExpiryResolver::new(validator),
        expiry_weekdays(config)?,
    ))
}

pub fn run_expiry(
    config: &dyn ConfigPort,
    reference: NaiveDate,
    weekday: Option<&str>,
    symbol: Option<&str>,
    cycle: Option<ExpiryCycle>,
    out: &mut dyn Write,
) -> Result<(), QuantkitError> {
    let calendar = build_holiday_calendar(config)?;
    let contracts = build_contracts(&calendar, config)?;

    let weekday = match (weekday, symbol) {
        (Some(w), _) => parse_weekday(w)?,
        (None, Some(s)) => contracts.weekdays().for_symbol(s),
        (None, None) => contracts.weekdays().default,
    };

    match cycle {
        Some(cycle) => {
            let expiry = contracts.resolver().resolve(cycle, reference, weekday)?;
            writeln!(out, "{expiry}")?;
        }
        None => {
            let schedule = contracts.resolver().schedule(reference, weekday)?;
            write_schedule(&schedule, out)?;
        }
    }
    Ok(())
}

pub fn write_schedule(schedule: &ExpirySchedule, out: &mut dyn Write) -> io::Result<()> {
    writeln!(
        out,
        "reference:     {} ({})",
        schedule.reference,
        weekday_name(schedule.reference.weekday())
    )?;
    writeln!(out, "weekday:       {}", weekday_name(schedule.weekday))?;
    writeln!(out, "current-week:  {}", schedule.current_week)?;
    writeln!(out, "next-week:     {}", schedule.next_week)?;
    writeln!(out, "current-month: {}", schedule.current_month)?;
    writeln!(out, "next-month:    {}", schedule.next_month)
}

fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

pub fn run_ticker(
    config: &dyn ConfigPort,
    symbols: &[String],
    reference: NaiveDate,
    out: &mut dyn Write,
) -> Result<(), QuantkitError> {
    let calendar = build_holiday_calendar(config)?;
    let contracts = build_contracts(&calendar, config)?;

    for symbol in parse_symbols(&symbols.join(","))? {
        let ticker = contracts.symbol_to_ticker(&symbol, reference)?;
        writeln!(out, "{symbol} -> {ticker}")?;
    }
    Ok(())
}

pub fn run_option(
    config: &dyn ConfigPort,
    symbol: &str,
    cycle: ExpiryCycle,
    strike: u32,
    option_type: OptionType,
    reference: NaiveDate,
    out: &mut dyn Write,
) -> Result<(), QuantkitError> {
    let calendar = build_holiday_calendar(config)?;
    let contracts = build_contracts(&calendar, config)?;

    let ticker = if cycle.is_weekly() {
        contracts.weekly_option(symbol, cycle, strike, option_type, reference)?
    } else {
        contracts.index_month_option(symbol, cycle, strike, option_type, reference)?
    };
    writeln!(out, "{ticker}")?;
    Ok(())
}

pub fn run_batches(
    start: NaiveDate,
    end: NaiveDate,
    size: u32,
    out: &mut dyn Write,
) -> Result<(), QuantkitError> {
    let batches = date_batches(start, end, size);
    if batches.is_empty() {
        eprintln!("No batches: start {start} is after end {end}");
    }
    for batch in &batches {
        writeln!(out, "{},{}", batch.start, batch.end)?;
    }
    Ok(())
}

pub fn list_symbols(port: &dyn DataPort, out: &mut dyn Write) -> Result<usize, QuantkitError> {
    let symbols = port.list_available_symbols()?;
    for symbol in &symbols {
        writeln!(out, "{symbol}")?;
    }
    Ok(symbols.len())
}

pub fn print_info(
    port: &dyn DataPort,
    symbols: Option<&str>,
    out: &mut dyn Write,
) -> Result<(), QuantkitError> {
    let symbols = match symbols {
        Some(list) => parse_symbols(list)?,
        None => port.list_available_symbols()?,
    };

    for symbol in &symbols {
        match port.get_data_range(symbol) {
            Ok(Some((first, last, count))) => {
                writeln!(out, "{symbol}: {count} bars, {first} to {last}")?;
            }
            Ok(None) => {
                writeln!(out, "{symbol}: no data")?;
            }
            Err(QuantkitError::UnknownSymbol(_)) => {
                eprintln!("{symbol}: not found");
            }
            Err(e) => return Err(e),
        }
    }
    Ok(())
}

/// Bars as CSV: `datetime,open,high,low,close,volume,oi`.
pub fn write_series(
    port: &dyn DataPort,
    symbol: &str,
    start: SeriesStart,
    out: &mut dyn Write,
) -> Result<usize, QuantkitError> {
    let bars = timed("read series", || port.read_series(symbol, start))?;

    let mut wtr = csv::Writer::from_writer(out);
    wtr.write_record(["datetime", "open", "high", "low", "close", "volume", "oi"])
        .map_err(io::Error::from)?;
    for bar in &bars {
        wtr.write_record([
            bar.timestamp_string(),
            bar.open.to_string(),
            bar.high.to_string(),
            bar.low.to_string(),
            bar.close.to_string(),
            bar.volume.to_string(),
            bar.oi.map(|oi| oi.to_string()).unwrap_or_default(),
        ])
        .map_err(io::Error::from)?;
    }
    wtr.flush()?;
    Ok(bars.len())
}

pub fn report_short_histories(
    port: &dyn DataPort,
    cutoff: NaiveDate,
    output: Option<&Path>,
    out: &mut dyn Write,
) -> Result<Vec<ShortHistory>, QuantkitError> {
    let short = timed("check integrity", || find_short_histories(port, cutoff))?;

    for row in &short {
        match (row.first, row.last) {
            (Some(first), Some(last)) => {
                writeln!(out, "{}: {} bars, {} to {}", row.symbol, row.bars, first, last)?
            }
            _ => writeln!(out, "{}: empty", row.symbol)?,
        }
    }

    if let Some(path) = output {
        write_report(File::create(path)?, &short)?;
        eprintln!("Report written to: {}", path.display());
    }

    eprintln!("{} symbols start after {}", short.len(), cutoff);
    Ok(short)
}

#[cfg(feature = "sqlite")]
fn run_store_command(
    config: &dyn ConfigPort,
    command: StoreCommand,
    out: &mut dyn Write,
) -> Result<(), QuantkitError> {
    use crate::adapters::sqlite_adapter::SqliteAdapter;

    match command {
        StoreCommand::ListSymbols { store } => {
            let adapter = SqliteAdapter::from_config(config, store.class)?;
            let count = list_symbols(&adapter, out)?;
            if count == 0 {
                eprintln!("No symbols found in {} database", store.class);
            } else {
                eprintln!("{count} symbols found");
            }
            Ok(())
        }
        StoreCommand::Info { store, symbols } => {
            let adapter = SqliteAdapter::from_config(config, store.class)?;
            print_info(&adapter, symbols.as_deref(), out)
        }
        StoreCommand::Series {
            store,
            symbol,
            range,
        } => {
            let adapter = SqliteAdapter::from_config(config, store.class)?;
            let count = write_series(&adapter, &symbol.to_uppercase(), range.series_start(), out)?;
            eprintln!("{count} bars");
            Ok(())
        }
        StoreCommand::Delete {
            store,
            symbol,
            range,
        } => {
            let adapter = SqliteAdapter::from_config(config, store.class)?;
            let symbol = symbol.to_uppercase();
            if range.is_unbounded() {
                if adapter.delete_security(&symbol)? {
                    writeln!(out, "Deleted {symbol}")?;
                } else {
                    writeln!(out, "{symbol} not found")?;
                }
            } else {
                let removed = adapter.delete_series_from(&symbol, range.series_start())?;
                writeln!(out, "Deleted {removed} bars from {symbol}")?;
            }
            Ok(())
        }
        StoreCommand::CheckIntegrity {
            store,
            cutoff,
            output,
            delete,
        } => {
            let adapter = SqliteAdapter::from_config(config, store.class)?;
            let short = report_short_histories(&adapter, cutoff, output.as_deref(), out)?;
            if delete {
                for row in &short {
                    adapter.delete_security(&row.symbol)?;
                }
                eprintln!("Deleted {} symbols", short.len());
            }
            Ok(())
        }
    }
}

#[cfg(not(feature = "sqlite"))]
fn run_store_command(
    _config: &dyn ConfigPort,
    _command: StoreCommand,
    _out: &mut dyn Write,
) -> Result<(), QuantkitError> {
    Err(QuantkitError::Database {
        reason: "sqlite feature is required for data commands".into(),
    })
}
