//! Injectable source of the current wall-clock time

use chrono::{Local, NaiveDate, NaiveDateTime};

/// Source of "now" for resolving relative reporting periods
///
/// Implemented for [`SystemClock`], [`FixedClock`] and any
/// `Fn() -> NaiveDateTime` closure.
pub trait Clock: Send + Sync {
    /// Current local wall-clock time
    fn now(&self) -> NaiveDateTime;
}

/// Clock backed by the host's local time zone
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// Clock frozen at a single instant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock {
    now: NaiveDateTime,
}

impl FixedClock {
    /// Freeze the clock at `now`
    #[must_use]
    pub const fn new(now: NaiveDateTime) -> Self {
        Self { now }
    }

    /// Freeze the clock at the given calendar date and time of day
    #[must_use]
    pub fn at(year: i32, month: u32, day: u32, hour: u32, minute: u32, second: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day)
            .and_then(|date| date.and_hms_opt(hour, minute, second))
            .map(Self::new)
    }
}

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.now
    }
}

impl<F> Clock for F
where
    F: Fn() -> NaiveDateTime + Send + Sync,
{
    fn now(&self) -> NaiveDateTime {
        self()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_fixed_clock_never_moves() {
        let clock = FixedClock::at(2026, 1, 18, 15, 30, 0).unwrap();
        assert_eq!(clock.now(), clock.now());
        assert_eq!(clock.now().to_string(), "2026-01-18 15:30:00");
    }

    #[test]
    fn test_fixed_clock_rejects_invalid_dates() {
        assert!(FixedClock::at(2025, 2, 29, 0, 0, 0).is_none());
        assert!(FixedClock::at(2026, 1, 18, 24, 0, 0).is_none());
    }

    #[test]
    fn test_closure_clock() {
        let calls = AtomicUsize::new(0);
        let fixed = FixedClock::at(2026, 6, 1, 9, 0, 0).unwrap().now();
        let clock = || {
            calls.fetch_add(1, Ordering::SeqCst);
            fixed
        };

        assert_eq!(Clock::now(&clock), fixed);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_system_clock_is_close_to_local_now() {
        let before = Local::now().naive_local();
        let now = SystemClock.now();
        let after = Local::now().naive_local();
        assert!(before <= now && now <= after);
    }
}
