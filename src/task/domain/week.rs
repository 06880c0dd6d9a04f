//! ISO 8601 planning weeks.
//!
//! Every weekly task is scheduled into a `(year, week)` pair from the ISO
//! week-date calendar: weeks run Monday to Sunday, week 1 contains the year's
//! first Thursday, and a year has 52 or 53 weeks.

use super::TaskDomainError;
use chrono::{Datelike, Days, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::fmt;

/// An ISO week-numbering `(year, week)` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PlanningWeek {
    year: i32,
    week: u32,
}

impl PlanningWeek {
    /// Creates a validated planning week.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::InvalidWeek`] when `week` is zero or past the
    /// last ISO week of `year`.
    pub fn new(year: i32, week: u32) -> Result<Self, TaskDomainError> {
        let last = weeks_in_year(year).ok_or(TaskDomainError::InvalidWeek { year, week })?;
        if week == 0 || week > last {
            return Err(TaskDomainError::InvalidWeek { year, week });
        }
        Ok(Self { year, week })
    }

    /// Returns the planning week that contains `date`.
    #[must_use]
    pub fn containing(date: NaiveDate) -> Self {
        let iso = date.iso_week();
        Self {
            year: iso.year(),
            week: iso.week(),
        }
    }

    /// Returns the ISO week-numbering year.
    #[must_use]
    pub const fn year(self) -> i32 {
        self.year
    }

    /// Returns the week number within the ISO year.
    #[must_use]
    pub const fn week(self) -> u32 {
        self.week
    }

    /// Returns the Monday that opens this week.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::WeekOutOfRange`] when the date cannot be
    /// represented.
    pub fn monday(self) -> Result<NaiveDate, TaskDomainError> {
        NaiveDate::from_isoywd_opt(self.year, self.week, Weekday::Mon)
            .ok_or(TaskDomainError::WeekOutOfRange)
    }

    /// Returns the planning week seven days later.
    ///
    /// The year increments only after the ISO year's final week, so week 52
    /// of a 53-week year advances to week 53.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::WeekOutOfRange`] at the end of the supported
    /// calendar.
    pub fn next(self) -> Result<Self, TaskDomainError> {
        let following = self
            .monday()?
            .checked_add_days(Days::new(7))
            .ok_or(TaskDomainError::WeekOutOfRange)?;
        Ok(Self::containing(following))
    }

    /// Iterates every week from `self` through `last` inclusive.
    ///
    /// The iterator is empty when `last` precedes `self`.
    #[must_use]
    pub const fn through(self, last: Self) -> WeekRange {
        WeekRange {
            current: Some(self),
            last,
        }
    }
}

impl fmt::Display for PlanningWeek {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-W{:02}", self.year, self.week)
    }
}

/// Returns how many ISO weeks `year` has (52 or 53).
///
/// Returns `None` for years outside the supported calendar.
#[must_use]
pub fn weeks_in_year(year: i32) -> Option<u32> {
    // 28 December always falls in the final ISO week of its year.
    NaiveDate::from_ymd_opt(year, 12, 28).map(|date| date.iso_week().week())
}

/// Inclusive iterator over consecutive planning weeks.
#[derive(Debug, Clone)]
pub struct WeekRange {
    current: Option<PlanningWeek>,
    last: PlanningWeek,
}

impl Iterator for WeekRange {
    type Item = PlanningWeek;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.current.filter(|week| *week <= self.last)?;
        self.current = current.next().ok();
        Some(current)
    }
}
