//! Calendar months that budgets are scoped to.

use std::{fmt::Display, ops::RangeInclusive};

use serde::{Deserialize, Serialize};
use time::{Date, Month};

use crate::Error;

/// A calendar month, e.g. October 2026.
///
/// Internally a period is its first day, so every constructed period is a
/// valid date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "RawPeriod", try_from = "RawPeriod")]
pub struct BudgetPeriod {
    first_day: Date,
}

/// The wire format of a [BudgetPeriod].
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct RawPeriod {
    year: i32,
    month: u8,
}

impl BudgetPeriod {
    /// Create the period for `month` (1-12) of `year`.
    ///
    /// # Errors
    /// Returns [Error::InvalidMonth] if `month` is not in 1-12 or `year` is
    /// outside the supported calendar range.
    pub fn new(year: i32, month: u8) -> Result<Self, Error> {
        let invalid = || Error::InvalidMonth { year, month };
        let calendar_month = Month::try_from(month).map_err(|_| invalid())?;
        let first_day = Date::from_calendar_date(year, calendar_month, 1).map_err(|_| invalid())?;

        Ok(Self { first_day })
    }

    /// The period containing `date`.
    pub fn containing(date: Date) -> Self {
        // Subtracting `day - 1` days from a valid date cannot leave the calendar.
        let first_day = date - time::Duration::days(i64::from(date.day()) - 1);

        Self { first_day }
    }

    /// The calendar year.
    pub fn year(&self) -> i32 {
        self.first_day.year()
    }

    /// The month number, 1-12.
    pub fn month(&self) -> u8 {
        self.first_day.month() as u8
    }

    /// The first day of the month.
    pub fn first_day(&self) -> Date {
        self.first_day
    }

    /// The last day of the month.
    pub fn last_day(&self) -> Date {
        match self.next() {
            Some(next) => next.first_day - time::Duration::days(1),
            // Only December of the last supported year has no successor.
            None => Date::MAX,
        }
    }

    /// All days in the month.
    pub fn date_range(&self) -> RangeInclusive<Date> {
        self.first_day..=self.last_day()
    }

    /// Whether `date` falls in this month.
    pub fn contains(&self, date: Date) -> bool {
        self.date_range().contains(&date)
    }

    /// The month before this one, if it is in the supported calendar range.
    pub fn previous(&self) -> Option<Self> {
        self.first_day.previous_day().map(Self::containing)
    }

    /// The month after this one, if it is in the supported calendar range.
    pub fn next(&self) -> Option<Self> {
        let (year, month) = match self.first_day.month() {
            Month::December => (self.year().checked_add(1)?, Month::January),
            month => (self.year(), month.next()),
        };

        Date::from_calendar_date(year, month, 1)
            .ok()
            .map(|first_day| Self { first_day })
    }

    /// Up to `count` months immediately before this one, most recent first.
    pub fn trailing(&self, count: usize) -> Vec<Self> {
        std::iter::successors(self.previous(), |period| period.previous())
            .take(count)
            .collect()
    }
}

impl Display for BudgetPeriod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}-{:02}", self.year(), self.month())
    }
}

impl From<BudgetPeriod> for RawPeriod {
    fn from(period: BudgetPeriod) -> Self {
        Self {
            year: period.year(),
            month: period.month(),
        }
    }
}

impl TryFrom<RawPeriod> for BudgetPeriod {
    type Error = Error;

    fn try_from(raw: RawPeriod) -> Result<Self, Self::Error> {
        BudgetPeriod::new(raw.year, raw.month)
    }
}
