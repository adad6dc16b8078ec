//! Symbol-aware contract ticker generation.
//!
//! Combines symbol parsing, exchange weekday selection, expiry resolution
//! and ticker formatting.

use crate::domain::error::QuantkitError;
use crate::domain::expiry::{ExpiryCycle, ExpiryResolver};
use crate::domain::symbol::{FutureSeries, SecurityKind, SecuritySymbol};
use crate::domain::ticker::{
    futures_ticker, monthly_option_ticker, weekly_option_ticker, ExpiryWeekdays, OptionType,
};
use chrono::NaiveDate;

pub struct ContractBuilder<'a> {
    resolver: ExpiryResolver<'a>,
    weekdays: ExpiryWeekdays,
}

impl<'a> ContractBuilder<'a> {
    pub fn new(resolver: ExpiryResolver<'a>, weekdays: ExpiryWeekdays) -> Self {
        Self { resolver, weekdays }
    }

    pub fn resolver(&self) -> &ExpiryResolver<'a> {
        &self.resolver
    }

    pub fn weekdays(&self) -> ExpiryWeekdays {
        self.weekdays
    }

    pub fn current_month_future(&self, symbol: &str, reference: NaiveDate) -> Result<String, QuantkitError> {
        self.future(symbol, ExpiryCycle::CurrentMonth, reference)
    }

    pub fn next_month_future(&self, symbol: &str, reference: NaiveDate) -> Result<String, QuantkitError> {
        self.future(symbol, ExpiryCycle::NextMonth, reference)
    }

    fn future(&self, symbol: &str, cycle: ExpiryCycle, reference: NaiveDate) -> Result<String, QuantkitError> {
        let parsed = SecuritySymbol::parse(symbol)?;
        if !parsed.is_future() {
            return Err(QuantkitError::InvalidSymbol {
                symbol: symbol.to_string(),
                reason: "not a futures symbol".into(),
            });
        }
        let weekday = self.weekdays.for_symbol(&parsed.underlying);
        let expiry = self.resolver.resolve(cycle, reference, weekday)?;
        Ok(futures_ticker(&parsed.underlying, expiry.date()))
    }

    /// Monthly option on an index symbol such as `NSE:NIFTYBANK-INDEX`.
    pub fn index_month_option(
        &self,
        symbol: &str,
        cycle: ExpiryCycle,
        strike: u32,
        option_type: OptionType,
        reference: NaiveDate,
    ) -> Result<String, QuantkitError> {
        if !cycle.is_monthly() {
            return Err(QuantkitError::InvalidCycle(cycle.to_string()));
        }
        let parsed = SecuritySymbol::parse(symbol)?;
        if !parsed.is_index() {
            return Err(QuantkitError::InvalidSymbol {
                symbol: symbol.to_string(),
                reason: "not an index symbol".into(),
            });
        }
        let weekday = self.weekdays.for_symbol(&parsed.underlying);
        let expiry = self.resolver.resolve(cycle, reference, weekday)?;
        Ok(monthly_option_ticker(
            &parsed.underlying,
            expiry.date(),
            strike,
            option_type,
        ))
    }

    /// Weekly option on `underlying`, e.g. `NSE:NIFTY` or `BSE:SENSEX`.
    pub fn weekly_option(
        &self,
        underlying: &str,
        cycle: ExpiryCycle,
        strike: u32,
        option_type: OptionType,
        reference: NaiveDate,
    ) -> Result<String, QuantkitError> {
        if !cycle.is_weekly() {
            return Err(QuantkitError::InvalidCycle(cycle.to_string()));
        }
        let underlying = underlying.trim().to_uppercase();
        if !underlying.contains(':') {
            return Err(QuantkitError::InvalidSymbol {
                symbol: underlying,
                reason: "missing exchange prefix (e.g. NSE:)".into(),
            });
        }
        let weekday = self.weekdays.for_symbol(&underlying);
        let expiry = self.resolver.resolve(cycle, reference, weekday)?;
        Ok(weekly_option_ticker(&underlying, expiry.date(), strike, option_type))
    }

    /// Futures symbols become their dated contract ticker; everything else
    /// is returned unchanged.
    pub fn symbol_to_ticker(&self, symbol: &str, reference: NaiveDate) -> Result<String, QuantkitError> {
        let parsed = SecuritySymbol::parse(symbol)?;
        match parsed.kind {
            SecurityKind::Future {
                series: FutureSeries::Near,
            } => self.future(symbol, ExpiryCycle::CurrentMonth, reference),
            SecurityKind::Future {
                series: FutureSeries::Next,
            } => self.future(symbol, ExpiryCycle::NextMonth, reference),
            SecurityKind::Index | SecurityKind::Equity => Ok(symbol.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory_holiday_adapter::StaticHolidayCalendar;
    use crate::domain::trading_day::{AdjustDirection, TradingDayValidator};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn builder(calendar: &StaticHolidayCalendar) -> ContractBuilder<'_> {
        ContractBuilder::new(
            ExpiryResolver::new(TradingDayValidator::new(calendar, AdjustDirection::Backward)),
            ExpiryWeekdays::default(),
        )
    }

    #[test]
    fn futures_for_january_2025() {
        let calendar = StaticHolidayCalendar::empty();
        let b = builder(&calendar);
        let reference = date(2025, 1, 23);
        assert_eq!(
            b.current_month_future("NSE:NIFTY-FUT-I", reference).unwrap(),
            "NSE:NIFTY25JANFUT"
        );
        assert_eq!(
            b.next_month_future("NSE:NIFTY-FUT-II", reference).unwrap(),
            "NSE:NIFTY25FEBFUT"
        );
    }

    #[test]
    fn futures_roll_after_monthly_expiry() {
        let calendar = StaticHolidayCalendar::empty();
        let b = builder(&calendar);
        assert_eq!(
            b.current_month_future("NSE:BANKNIFTY-FUT-I", date(2025, 1, 31)).unwrap(),
            "NSE:BANKNIFTY25FEBFUT"
        );
    }

    #[test]
    fn bse_futures_use_tuesday() {
        // Last Tuesday of Sept 2025 is the 30th, last Thursday the 25th:
        // on the 26th only the Tuesday rule is still in September
        let calendar = StaticHolidayCalendar::empty();
        let b = builder(&calendar);
        assert_eq!(
            b.current_month_future("BSE:SENSEX-FUT-I", date(2025, 9, 26)).unwrap(),
            "BSE:SENSEX25SEPFUT"
        );
        assert_eq!(
            b.current_month_future("NSE:NIFTY-FUT-I", date(2025, 9, 26)).unwrap(),
            "NSE:NIFTY25OCTFUT"
        );
    }

    #[test]
    fn futures_reject_non_futures_symbol() {
        let calendar = StaticHolidayCalendar::empty();
        let b = builder(&calendar);
        assert!(matches!(
            b.current_month_future("NSE:NIFTY50-INDEX", date(2025, 1, 1)),
            Err(QuantkitError::InvalidSymbol { .. })
        ));
    }

    #[test]
    fn index_options_current_and_next_month() {
        let calendar = StaticHolidayCalendar::empty();
        let b = builder(&calendar);
        let reference = date(2025, 1, 23);
        assert_eq!(
            b.index_month_option(
                "NSE:NIFTYBANK-INDEX",
                ExpiryCycle::CurrentMonth,
                50000,
                OptionType::Call,
                reference
            )
            .unwrap(),
            "NSE:NIFTYBANK25JAN50000CE"
        );
        assert_eq!(
            b.index_month_option(
                "NSE:NIFTYBANK-INDEX",
                ExpiryCycle::NextMonth,
                50000,
                OptionType::Put,
                reference
            )
            .unwrap(),
            "NSE:NIFTYBANK25FEB50000PE"
        );
    }

    #[test]
    fn index_options_reject_equities_and_weekly_cycles() {
        let calendar = StaticHolidayCalendar::empty();
        let b = builder(&calendar);
        let reference = date(2025, 1, 23);
        assert!(matches!(
            b.index_month_option("NSE:SBIN-EQ", ExpiryCycle::CurrentMonth, 800, OptionType::Call, reference),
            Err(QuantkitError::InvalidSymbol { .. })
        ));
        assert!(matches!(
            b.index_month_option("NSE:NIFTY50-INDEX", ExpiryCycle::NextWeek, 800, OptionType::Call, reference),
            Err(QuantkitError::InvalidCycle(_))
        ));
    }

    #[test]
    fn weekly_option_scenario() {
        let calendar = StaticHolidayCalendar::empty();
        let b = builder(&calendar);
        assert_eq!(
            b.weekly_option("NSE:NIFTY", ExpiryCycle::CurrentWeek, 24000, OptionType::Put, date(2025, 4, 28))
                .unwrap(),
            "NSE:NIFTY2550124000PE"
        );
        assert_eq!(
            b.weekly_option("NSE:NIFTY", ExpiryCycle::NextWeek, 24000, OptionType::Put, date(2025, 4, 28))
                .unwrap(),
            "NSE:NIFTY2550824000PE"
        );
    }

    #[test]
    fn weekly_option_keeps_its_own_underlying() {
        // 2025-04-28 is a Monday; Tuesday expiry is the next day
        let calendar = StaticHolidayCalendar::empty();
        let b = builder(&calendar);
        assert_eq!(
            b.weekly_option("BSE:SENSEX", ExpiryCycle::CurrentWeek, 80000, OptionType::Call, date(2025, 4, 28))
                .unwrap(),
            "BSE:SENSEX2542980000CE"
        );
    }

    #[test]
    fn weekly_option_with_holiday() {
        // 2025-05-01 (Maharashtra Day) moves the weekly to Wednesday
        let calendar = StaticHolidayCalendar::new(vec![date(2025, 5, 1)]);
        let b = builder(&calendar);
        assert_eq!(
            b.weekly_option("NSE:NIFTY", ExpiryCycle::CurrentWeek, 24000, OptionType::Put, date(2025, 4, 28))
                .unwrap(),
            "NSE:NIFTY2543024000PE"
        );
    }

    #[test]
    fn weekly_option_requires_exchange() {
        let calendar = StaticHolidayCalendar::empty();
        let b = builder(&calendar);
        assert!(matches!(
            b.weekly_option("NIFTY", ExpiryCycle::CurrentWeek, 24000, OptionType::Put, date(2025, 4, 28)),
            Err(QuantkitError::InvalidSymbol { .. })
        ));
        assert!(matches!(
            b.weekly_option("NSE:NIFTY", ExpiryCycle::CurrentMonth, 24000, OptionType::Put, date(2025, 4, 28)),
            Err(QuantkitError::InvalidCycle(_))
        ));
    }

    #[test]
    fn symbol_to_ticker_matches_january_run() {
        let calendar = StaticHolidayCalendar::empty();
        let b = builder(&calendar);
        let reference = date(2025, 1, 23);
        let cases = [
            ("NSE:INDIAVIX-INDEX", "NSE:INDIAVIX-INDEX"),
            ("NSE:NIFTY-FUT-I", "NSE:NIFTY25JANFUT"),
            ("NSE:NIFTY-FUT-II", "NSE:NIFTY25FEBFUT"),
            ("NSE:FINNIFTY-FUT-I", "NSE:FINNIFTY25JANFUT"),
            ("NSE:MIDCPNIFTY-FUT-II", "NSE:MIDCPNIFTY25FEBFUT"),
            ("NSE:NIFTYNXT50-FUT-I", "NSE:NIFTYNXT5025JANFUT"),
        ];
        for (symbol, expected) in cases {
            assert_eq!(b.symbol_to_ticker(symbol, reference).unwrap(), expected);
        }
    }
}
