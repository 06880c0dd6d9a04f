//! Shared clocks and calendar helpers for integration tests.

use chrono::{DateTime, Duration, Local, NaiveDate, TimeZone, Utc};
use mockable::Clock;
use std::sync::{Mutex, PoisonError};
use weekplan::task::domain::PlanningWeek;

/// Clock frozen at a chosen instant that tests can move forward.
#[derive(Debug)]
pub struct FixedClock {
    now: Mutex<DateTime<Utc>>,
}

impl FixedClock {
    /// Freezes the clock at `now`.
    pub const fn new(now: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    /// Moves the clock forward by `by`.
    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap_or_else(PoisonError::into_inner);
        *now += by;
    }
}

impl Clock for FixedClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Builds a UTC timestamp, panicking on impossible input.
pub fn at(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, hour, minute, 0)
        .single()
        .expect("valid timestamp")
}

/// Builds a calendar date, panicking on impossible input.
pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

/// Builds a planning week, panicking when the year lacks it.
pub fn week(year: i32, number: u32) -> PlanningWeek {
    PlanningWeek::new(year, number).expect("valid week")
}

/// Returns `hour:00` UTC on the Monday of `planning_week`.
pub fn monday_at(planning_week: PlanningWeek, hour: u32) -> DateTime<Utc> {
    let monday = planning_week.monday().expect("week has a Monday");
    let time = monday.and_hms_opt(hour, 0, 0).expect("valid hour");
    Utc.from_utc_datetime(&time)
}
