//! Composite holiday calendars: primary/fallback chaining and per-year
//! caching.

use crate::domain::error::QuantkitError;
use crate::domain::holiday::HolidaySet;
use crate::ports::holiday_port::HolidayCalendar;
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Tries `primary` once, then `fallback` once.
pub struct FallbackHolidayCalendar {
    primary: Box<dyn HolidayCalendar + Send + Sync>,
    fallback: Box<dyn HolidayCalendar + Send + Sync>,
}

impl FallbackHolidayCalendar {
    pub fn new(
        primary: Box<dyn HolidayCalendar + Send + Sync>,
        fallback: Box<dyn HolidayCalendar + Send + Sync>,
    ) -> Self {
        Self { primary, fallback }
    }
}

impl HolidayCalendar for FallbackHolidayCalendar {
    fn holidays_for(&self, year: i32) -> Result<HolidaySet, QuantkitError> {
        let primary_err = match self.primary.holidays_for(year) {
            Ok(set) => return Ok(set),
            Err(e) => e,
        };
        tracing::warn!(
            year,
            source = %self.primary.describe(),
            error = %primary_err,
            "primary holiday source failed, trying fallback"
        );

        self.fallback.holidays_for(year).map_err(|fallback_err| {
            QuantkitError::DataUnavailable {
                year,
                reason: format!(
                    "{} failed ({}); {} failed ({})",
                    self.primary.describe(),
                    primary_err,
                    self.fallback.describe(),
                    fallback_err
                ),
            }
        })
    }

    fn describe(&self) -> String {
        format!(
            "{} with fallback {}",
            self.primary.describe(),
            self.fallback.describe()
        )
    }
}

/// Adds a fixed set of extra holidays on top of another calendar.
pub struct ExtendedHolidayCalendar<C> {
    inner: C,
    extra: HolidaySet,
}

impl<C> ExtendedHolidayCalendar<C> {
    pub fn new(inner: C, extra: HolidaySet) -> Self {
        Self { inner, extra }
    }
}

impl<C: HolidayCalendar> HolidayCalendar for ExtendedHolidayCalendar<C> {
    fn holidays_for(&self, year: i32) -> Result<HolidaySet, QuantkitError> {
        let base = self.inner.holidays_for(year)?;
        Ok(base.merged(&self.extra.for_year(year)))
    }

    fn describe(&self) -> String {
        format!("{} + {} extra", self.inner.describe(), self.extra.len())
    }
}

/// Memoizes holiday sets per calendar year. Failed lookups are not cached.
pub struct CachedHolidayCalendar<C> {
    inner: C,
    cache: RwLock<HashMap<i32, HolidaySet>>,
}

impl<C: HolidayCalendar> CachedHolidayCalendar<C> {
    pub fn new(inner: C) -> Self {
        Self {
            inner,
            cache: RwLock::new(HashMap::new()),
        }
    }

    // The map holds plain data, so a writer that panicked cannot leave it
    // half-updated; recover the guard instead of bypassing the cache.
    fn read_cache(&self) -> RwLockReadGuard<'_, HashMap<i32, HolidaySet>> {
        self.cache.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_cache(&self) -> RwLockWriteGuard<'_, HashMap<i32, HolidaySet>> {
        self.cache.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Drop every cached year.
    pub fn invalidate(&self) {
        self.write_cache().clear();
    }

    /// Drop one cached year, e.g. at year rollover.
    pub fn invalidate_year(&self, year: i32) {
        self.write_cache().remove(&year);
    }

    pub fn cached_years(&self) -> Vec<i32> {
        let mut years: Vec<i32> = self.read_cache().keys().copied().collect();
        years.sort_unstable();
        years
    }
}

impl<C: HolidayCalendar> HolidayCalendar for CachedHolidayCalendar<C> {
    fn holidays_for(&self, year: i32) -> Result<HolidaySet, QuantkitError> {
        if let Some(set) = self.read_cache().get(&year) {
            return Ok(set.clone());
        }

        let set = self.inner.holidays_for(year)?;
        self.write_cache().entry(year).or_insert_with(|| set.clone());
        Ok(set)
    }

    fn describe(&self) -> String {
        format!("cached {}", self.inner.describe())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory_holiday_adapter::StaticHolidayCalendar;
    use chrono::NaiveDate;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    struct FailingCalendar(&'static str);

    impl HolidayCalendar for FailingCalendar {
        fn holidays_for(&self, year: i32) -> Result<HolidaySet, QuantkitError> {
            Err(QuantkitError::DataUnavailable {
                year,
                reason: self.0.to_string(),
            })
        }

        fn describe(&self) -> String {
            self.0.to_string()
        }
    }

    struct CountingCalendar {
        calls: Arc<AtomicUsize>,
    }

    impl HolidayCalendar for CountingCalendar {
        fn holidays_for(&self, year: i32) -> Result<HolidaySet, QuantkitError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok([date(year, 1, 26)].into_iter().collect())
        }
    }

    #[test]
    fn primary_success_skips_fallback() {
        let chain = FallbackHolidayCalendar::new(
            Box::new(StaticHolidayCalendar::new(vec![date(2025, 3, 14)])),
            Box::new(FailingCalendar("fallback")),
        );
        let set = chain.holidays_for(2025).unwrap();
        assert!(set.contains(date(2025, 3, 14)));
    }

    #[test]
    fn primary_failure_uses_fallback() {
        let chain = FallbackHolidayCalendar::new(
            Box::new(FailingCalendar("remote")),
            Box::new(StaticHolidayCalendar::new(vec![date(2025, 2, 26)])),
        );
        let set = chain.holidays_for(2025).unwrap();
        assert!(set.contains(date(2025, 2, 26)));
    }

    #[test]
    fn both_failing_is_data_unavailable_with_both_reasons() {
        let chain = FallbackHolidayCalendar::new(
            Box::new(FailingCalendar("remote")),
            Box::new(FailingCalendar("local file")),
        );
        match chain.holidays_for(2025) {
            Err(QuantkitError::DataUnavailable { year, reason }) => {
                assert_eq!(year, 2025);
                assert!(reason.contains("remote"));
                assert!(reason.contains("local file"));
            }
            other => panic!("expected DataUnavailable, got {other:?}"),
        }
    }

    #[test]
    fn empty_primary_is_not_a_failure() {
        let chain = FallbackHolidayCalendar::new(
            Box::new(StaticHolidayCalendar::empty()),
            Box::new(StaticHolidayCalendar::new(vec![date(2025, 2, 26)])),
        );
        assert!(chain.holidays_for(2025).unwrap().is_empty());
    }

    #[test]
    fn cache_hits_inner_once_per_year() {
        let calls = Arc::new(AtomicUsize::new(0));
        let cached = CachedHolidayCalendar::new(CountingCalendar {
            calls: Arc::clone(&calls),
        });

        cached.holidays_for(2025).unwrap();
        cached.holidays_for(2025).unwrap();
        cached.holidays_for(2026).unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(cached.cached_years(), vec![2025, 2026]);
    }

    #[test]
    fn invalidate_forces_reload() {
        let calls = Arc::new(AtomicUsize::new(0));
        let cached = CachedHolidayCalendar::new(CountingCalendar {
            calls: Arc::clone(&calls),
        });

        cached.holidays_for(2025).unwrap();
        cached.invalidate_year(2025);
        cached.holidays_for(2025).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);

        cached.invalidate();
        assert!(cached.cached_years().is_empty());
    }

    #[test]
    fn poisoned_cache_keeps_working() {
        let calls = Arc::new(AtomicUsize::new(0));
        let cached = CachedHolidayCalendar::new(CountingCalendar {
            calls: Arc::clone(&calls),
        });
        cached.holidays_for(2025).unwrap();

        std::thread::scope(|s| {
            let result = s
                .spawn(|| {
                    let _guard = cached.cache.write().unwrap();
                    panic!("writer died holding the lock");
                })
                .join();
            assert!(result.is_err());
        });
        assert!(cached.cache.is_poisoned());

        cached.holidays_for(2025).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        cached.holidays_for(2026).unwrap();
        assert_eq!(cached.cached_years(), vec![2025, 2026]);

        cached.invalidate();
        assert!(cached.cached_years().is_empty());
    }

    #[test]
    fn failures_are_not_cached() {
        let cached = CachedHolidayCalendar::new(FailingCalendar("offline"));
        assert!(cached.holidays_for(2025).is_err());
        assert!(cached.cached_years().is_empty());
    }

    #[test]
    fn extra_holidays_are_merged_per_year() {
        let extended = ExtendedHolidayCalendar::new(
            StaticHolidayCalendar::new(vec![date(2025, 1, 26)]),
            [date(2025, 3, 14), date(2026, 3, 4)].into_iter().collect(),
        );
        let set = extended.holidays_for(2025).unwrap();
        assert_eq!(set.len(), 2);
        assert!(set.contains(date(2025, 3, 14)));
        assert!(!set.contains(date(2026, 3, 4)));
    }

    #[test]
    fn extra_holidays_do_not_mask_failures() {
        let extended = ExtendedHolidayCalendar::new(
            FailingCalendar("offline"),
            [date(2025, 3, 14)].into_iter().collect(),
        );
        assert!(extended.holidays_for(2025).is_err());
    }

    #[test]
    fn boxed_calendars_can_be_cached() {
        let boxed: Box<dyn HolidayCalendar + Send + Sync> =
            Box::new(StaticHolidayCalendar::new(vec![date(2025, 8, 15)]));
        let cached = CachedHolidayCalendar::new(boxed);
        assert!(cached.holidays_for(2025).unwrap().contains(date(2025, 8, 15)));
        assert_eq!(cached.cached_years(), vec![2025]);
    }
}
