//! State behind the period picker control

use super::{Clock, DateRange, DateRangeResolver, PeriodKind, PeriodSelector};
use crate::error::{Result, StorefrontError};
use chrono::Datelike;
use serde::{Deserialize, Serialize};

/// The picker's selected option plus its auxiliary month, year and date fields
///
/// The auxiliary fields are kept even when the selected option ignores them,
/// so switching back to "specific month" restores the previous choice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodForm {
    pub kind: PeriodKind,
    /// Zero-based month (0 = January)
    pub selected_month: u32,
    pub selected_year: i32,
    /// Calendar date as typed into the date input, `YYYY-MM-DD`
    pub selected_date: String,
}

impl PeriodForm {
    /// A form on `kind` whose auxiliary fields default to the clock's current date
    #[must_use]
    pub fn new(kind: PeriodKind, clock: &impl Clock) -> Self {
        let today = clock.now().date();
        Self {
            kind,
            selected_month: today.month0(),
            selected_year: today.year(),
            selected_date: storefront_common::format_date(&today),
        }
    }

    /// Choose a specific month
    #[must_use]
    pub fn with_month(mut self, month0: u32, year: i32) -> Self {
        self.kind = PeriodKind::SpecificMonth;
        self.selected_month = month0;
        self.selected_year = year;
        self
    }

    /// Choose a specific date
    #[must_use]
    pub fn with_date(mut self, date: impl Into<String>) -> Self {
        self.kind = PeriodKind::SpecificDate;
        self.selected_date = date.into();
        self
    }

    /// The selector described by the form
    ///
    /// # Errors
    /// Returns `InvalidArgument` if the selected month is outside 0-11 or the
    /// selected date does not parse
    pub fn selector(&self) -> Result<PeriodSelector> {
        Ok(match self.kind {
            PeriodKind::All => PeriodSelector::All,
            PeriodKind::Daily => PeriodSelector::Daily,
            PeriodKind::Weekly => PeriodSelector::Weekly,
            PeriodKind::Monthly => PeriodSelector::Monthly,
            PeriodKind::Yearly => PeriodSelector::Yearly,
            PeriodKind::SpecificMonth => {
                if self.selected_month > 11 {
                    return Err(StorefrontError::invalid_argument(format!(
                        "month {} is outside 0-11",
                        self.selected_month
                    )));
                }
                PeriodSelector::SpecificMonth {
                    month: self.selected_month,
                    year: self.selected_year,
                }
            }
            PeriodKind::SpecificDate => PeriodSelector::specific_date_str(&self.selected_date)?,
        })
    }

    /// Resolve the form into a range in one step
    ///
    /// # Errors
    /// Returns `InvalidArgument` for invalid auxiliary fields
    pub fn resolve<C: Clock>(&self, resolver: &DateRangeResolver<C>) -> Result<DateRange> {
        resolver.resolve(&self.selector()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::period::FixedClock;

    fn clock() -> FixedClock {
        FixedClock::at(2026, 1, 18, 15, 30, 0).unwrap()
    }

    #[test]
    fn test_defaults_follow_the_clock() {
        let form = PeriodForm::new(PeriodKind::All, &clock());
        assert_eq!(form.selected_month, 0);
        assert_eq!(form.selected_year, 2026);
        assert_eq!(form.selected_date, "2026-01-18");
        assert_eq!(form.selector().unwrap(), PeriodSelector::All);
    }

    #[test]
    fn test_with_month() {
        let form = PeriodForm::new(PeriodKind::All, &clock()).with_month(1, 2024);
        assert_eq!(
            form.selector().unwrap(),
            PeriodSelector::SpecificMonth { month: 1, year: 2024 }
        );
    }

    #[test]
    fn test_invalid_month_fails() {
        let form = PeriodForm::new(PeriodKind::All, &clock()).with_month(12, 2024);
        assert!(matches!(
            form.selector(),
            Err(StorefrontError::InvalidArgument { .. })
        ));
    }

    #[test]
    fn test_unparseable_date_fails() {
        let form = PeriodForm::new(PeriodKind::All, &clock()).with_date("18/01/2026");
        assert!(matches!(
            form.selector(),
            Err(StorefrontError::InvalidArgument { .. })
        ));
    }

    #[test]
    fn test_switching_kind_keeps_aux_fields() {
        let mut form = PeriodForm::new(PeriodKind::All, &clock()).with_month(5, 2025);
        form.kind = PeriodKind::Daily;
        assert_eq!(form.selector().unwrap(), PeriodSelector::Daily);
        form.kind = PeriodKind::SpecificMonth;
        assert_eq!(
            form.selector().unwrap(),
            PeriodSelector::SpecificMonth { month: 5, year: 2025 }
        );
    }

    #[test]
    fn test_resolve_specific_date() {
        let resolver = DateRangeResolver::with_clock(clock());
        let range = PeriodForm::new(PeriodKind::All, &clock())
            .with_date("2026-03-10")
            .resolve(&resolver)
            .unwrap();
        assert_eq!(range.start().unwrap().to_string(), "2026-03-10 00:00:00");
        assert_eq!(range.end().unwrap().to_string(), "2026-03-10 23:59:59.999");
    }
}
