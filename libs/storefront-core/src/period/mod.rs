//! Reporting periods and their resolution into concrete date ranges
//!
//! Every list and report screen narrows its rows with the same period picker:
//! a [`PeriodSelector`] is resolved by a [`DateRangeResolver`] into an
//! inclusive [`DateRange`] on the local calendar, which the screen then hands
//! to the row store as a timestamp filter.
//!
//! ```
//! use storefront_core::period::{DateRangeResolver, FixedClock, PeriodSelector};
//!
//! let clock = FixedClock::at(2026, 1, 18, 15, 30, 0).unwrap();
//! let resolver = DateRangeResolver::with_clock(clock);
//!
//! let range = resolver.resolve(&PeriodSelector::Weekly).unwrap();
//! let (start, end) = range.bounds().unwrap();
//! assert_eq!(start.to_string(), "2026-01-18 00:00:00");
//! assert_eq!(end.to_string(), "2026-01-24 23:59:59.999");
//! ```

pub mod calendar;
pub mod clock;
pub mod form;

pub use clock::{Clock, FixedClock, SystemClock};
pub use form::PeriodForm;

use crate::error::{Result, StorefrontError};
use chrono::{
    DateTime, Datelike, LocalResult, NaiveDate, NaiveDateTime, SecondsFormat, TimeZone, Utc,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// The options offered by the period picker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PeriodKind {
    All,
    Daily,
    Weekly,
    Monthly,
    Yearly,
    SpecificMonth,
    SpecificDate,
}

impl PeriodKind {
    /// Every option, in picker order
    pub const ALL: [Self; 7] = [
        Self::All,
        Self::Daily,
        Self::Weekly,
        Self::Monthly,
        Self::Yearly,
        Self::SpecificMonth,
        Self::SpecificDate,
    ];

    /// The option key used by the picker
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
            Self::Yearly => "yearly",
            Self::SpecificMonth => "specific_month",
            Self::SpecificDate => "specific_date",
        }
    }

    /// Whether the option is anchored to the current time
    #[must_use]
    pub const fn is_relative(self) -> bool {
        matches!(
            self,
            Self::Daily | Self::Weekly | Self::Monthly | Self::Yearly
        )
    }
}

impl fmt::Display for PeriodKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PeriodKind {
    type Err = StorefrontError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| StorefrontError::invalid_argument(format!("unknown period '{s}'")))
    }
}

/// A named reporting window
///
/// `SpecificMonth` carries a zero-based month (0 = January).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "period", rename_all = "snake_case")]
pub enum PeriodSelector {
    All,
    Daily,
    Weekly,
    Monthly,
    Yearly,
    SpecificMonth { month: u32, year: i32 },
    SpecificDate { date: NaiveDate },
}

impl PeriodSelector {
    /// Build a `SpecificDate` selector from a `YYYY-MM-DD` string
    ///
    /// # Errors
    /// Returns `InvalidArgument` if the string is not a calendar date
    pub fn specific_date_str(date: &str) -> Result<Self> {
        storefront_common::parse_date(date)
            .map(|date| Self::SpecificDate { date })
            .map_err(|e| {
                StorefrontError::invalid_argument(format!("unparseable date '{date}': {e}"))
            })
    }

    /// The picker option this selector corresponds to
    #[must_use]
    pub const fn kind(&self) -> PeriodKind {
        match self {
            Self::All => PeriodKind::All,
            Self::Daily => PeriodKind::Daily,
            Self::Weekly => PeriodKind::Weekly,
            Self::Monthly => PeriodKind::Monthly,
            Self::Yearly => PeriodKind::Yearly,
            Self::SpecificMonth { .. } => PeriodKind::SpecificMonth,
            Self::SpecificDate { .. } => PeriodKind::SpecificDate,
        }
    }
}

impl fmt::Display for PeriodSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SpecificMonth { month, year } => {
                match storefront_common::month_name(*month) {
                    Some(name) => write!(f, "{name} {year}"),
                    None => write!(f, "month {month} {year}"),
                }
            }
            Self::SpecificDate { date } => write!(f, "{}", storefront_common::format_date(date)),
            other => f.write_str(other.kind().as_str()),
        }
    }
}

/// Inclusive pair of local timestamps, or unbounded
///
/// Both ends are present together with `start <= end`, or both are absent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawDateRange")]
pub struct DateRange {
    start: Option<NaiveDateTime>,
    end: Option<NaiveDateTime>,
}

#[derive(Deserialize)]
struct RawDateRange {
    start: Option<NaiveDateTime>,
    end: Option<NaiveDateTime>,
}

impl TryFrom<RawDateRange> for DateRange {
    type Error = StorefrontError;

    fn try_from(raw: RawDateRange) -> Result<Self> {
        match (raw.start, raw.end) {
            (None, None) => Ok(Self::unbounded()),
            (Some(start), Some(end)) => Self::between(start, end),
            _ => Err(StorefrontError::invalid_argument(
                "date range bounds must both be set or both be null",
            )),
        }
    }
}

/// A bounded range converted to UTC instants for transport
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UtcBounds {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl UtcBounds {
    /// Start as an ISO-8601 string with millisecond precision
    #[must_use]
    pub fn start_iso(&self) -> String {
        self.start.to_rfc3339_opts(SecondsFormat::Millis, true)
    }

    /// End as an ISO-8601 string with millisecond precision
    #[must_use]
    pub fn end_iso(&self) -> String {
        self.end.to_rfc3339_opts(SecondsFormat::Millis, true)
    }
}

impl DateRange {
    /// The all-time range
    #[must_use]
    pub const fn unbounded() -> Self {
        Self {
            start: None,
            end: None,
        }
    }

    /// A bounded range
    ///
    /// # Errors
    /// Returns `InvalidArgument` if `start` is after `end`
    pub fn between(start: NaiveDateTime, end: NaiveDateTime) -> Result<Self> {
        if start > end {
            return Err(StorefrontError::invalid_argument(format!(
                "range start {start} is after end {end}"
            )));
        }
        Ok(Self {
            start: Some(start),
            end: Some(end),
        })
    }

    #[must_use]
    pub const fn start(&self) -> Option<NaiveDateTime> {
        self.start
    }

    #[must_use]
    pub const fn end(&self) -> Option<NaiveDateTime> {
        self.end
    }

    /// Both bounds, if the range is bounded
    #[must_use]
    pub fn bounds(&self) -> Option<(NaiveDateTime, NaiveDateTime)> {
        self.start.zip(self.end)
    }

    #[must_use]
    pub const fn is_unbounded(&self) -> bool {
        self.start.is_none()
    }

    /// Whether a local timestamp falls inside the range (always true when unbounded)
    #[must_use]
    pub fn contains(&self, at: NaiveDateTime) -> bool {
        self.bounds()
            .map_or(true, |(start, end)| start <= at && at <= end)
    }

    /// Convert the local bounds to UTC instants in the given time zone
    ///
    /// An ambiguous local start takes the earlier instant and an ambiguous end
    /// the later one, so the window never shrinks. A local time that falls in a
    /// DST gap is moved forward by one hour.
    ///
    /// # Errors
    /// Returns `InvalidArgument` if a bound cannot be placed in the time zone
    pub fn to_utc<Tz: TimeZone>(&self, tz: &Tz) -> Result<Option<UtcBounds>> {
        let Some((start, end)) = self.bounds() else {
            return Ok(None);
        };
        Ok(Some(UtcBounds {
            start: local_to_utc(tz, start, false)?,
            end: local_to_utc(tz, end, true)?,
        }))
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.bounds() {
            Some((start, end)) => write!(
                f,
                "{} .. {}",
                storefront_common::format_datetime(&start),
                storefront_common::format_datetime(&end)
            ),
            None => f.write_str("all time"),
        }
    }
}

fn local_to_utc<Tz: TimeZone>(
    tz: &Tz,
    naive: NaiveDateTime,
    prefer_latest: bool,
) -> Result<DateTime<Utc>> {
    let mapped = match tz.from_local_datetime(&naive) {
        LocalResult::Single(dt) => Some(dt),
        LocalResult::Ambiguous(earliest, latest) => {
            Some(if prefer_latest { latest } else { earliest })
        }
        LocalResult::None => naive
            .checked_add_signed(chrono::Duration::hours(1))
            .and_then(|shifted| tz.from_local_datetime(&shifted).earliest()),
    };
    mapped
        .map(|dt| dt.with_timezone(&Utc))
        .ok_or_else(|| {
            StorefrontError::invalid_argument(format!("{naive} does not exist in the time zone"))
        })
}

/// Resolves period selectors against an injected clock
#[derive(Debug, Clone, Default)]
pub struct DateRangeResolver<C = SystemClock> {
    clock: C,
}

impl DateRangeResolver<SystemClock> {
    /// Resolver on the host's local clock
    #[must_use]
    pub const fn new() -> Self {
        Self { clock: SystemClock }
    }
}

impl<C: Clock> DateRangeResolver<C> {
    /// Resolver on a caller-supplied clock
    #[must_use]
    pub const fn with_clock(clock: C) -> Self {
        Self { clock }
    }

    #[must_use]
    pub const fn clock(&self) -> &C {
        &self.clock
    }

    /// Resolve a selector into a concrete range
    ///
    /// The clock is read once, and only for `Daily`, `Weekly`, `Monthly` and `Yearly`.
    ///
    /// # Errors
    /// Returns `InvalidArgument` for a month outside 0-11 or a year the calendar cannot represent
    pub fn resolve(&self, selector: &PeriodSelector) -> Result<DateRange> {
        let range = if selector.kind().is_relative() {
            resolve_at(selector, self.clock.now())
        } else {
            resolve_absolute(selector)
        }?;
        debug!(period = %selector, range = %range, "resolved reporting period");
        Ok(range)
    }
}

/// Resolve a selector relative to an explicit "now"
///
/// # Errors
/// Returns `InvalidArgument` for a month outside 0-11 or a year the calendar cannot represent
pub fn resolve_at(selector: &PeriodSelector, now: NaiveDateTime) -> Result<DateRange> {
    let today = now.date();
    match *selector {
        PeriodSelector::Daily => day_range(today, today),
        PeriodSelector::Weekly => {
            let sunday = calendar::week_start(today)?;
            day_range(sunday, calendar::add_days(sunday, 6)?)
        }
        PeriodSelector::Monthly => month_range(today.month0(), today.year()),
        PeriodSelector::Yearly => day_range(
            calendar::first_day_of_month(today.year(), 0)?,
            calendar::last_day_of_month(today.year(), 11)?,
        ),
        _ => resolve_absolute(selector),
    }
}

fn resolve_absolute(selector: &PeriodSelector) -> Result<DateRange> {
    match *selector {
        PeriodSelector::SpecificMonth { month, year } => month_range(month, year),
        PeriodSelector::SpecificDate { date } => day_range(date, date),
        PeriodSelector::All => Ok(DateRange::unbounded()),
        relative => Err(StorefrontError::invalid_argument(format!(
            "period '{relative}' needs a clock"
        ))),
    }
}

fn month_range(month0: u32, year: i32) -> Result<DateRange> {
    day_range(
        calendar::first_day_of_month(year, month0)?,
        calendar::last_day_of_month(year, month0)?,
    )
}

fn day_range(first: NaiveDate, last: NaiveDate) -> Result<DateRange> {
    DateRange::between(calendar::start_of_day(first), calendar::end_of_day(last)?)
}
