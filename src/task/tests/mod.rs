//! Unit tests for weekly task domain types and services.


use crate::task::domain::{PlanningWeek, TaskDraft, TaskSource, UserId};
use chrono::{DateTime, Duration, Local, TimeZone, Utc};
use mockable::Clock;
use std::sync::Mutex;

/// Clock frozen at a chosen instant that tests can move forward.
#[derive(Debug)]
pub(crate) struct FixedClock {
    now: Mutex<DateTime<Utc>>,
}

impl FixedClock {
    pub(crate) const fn new(now: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    pub(crate) fn advance(&self, by: Duration) {
        let mut now = self.now.lock().expect("clock lock");
        *now += by;
    }
}

impl Clock for FixedClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        *self.now.lock().expect("clock lock")
    }
}

/// Builds a UTC timestamp, panicking on impossible input.
pub(crate) fn at(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, hour, minute, 0)
        .single()
        .expect("valid timestamp")
}

/// Monday of 2025-W01, 08:00 UTC.
pub(crate) fn week_one_monday() -> DateTime<Utc> {
    at(2024, 12, 30, 8, 0)
}

pub(crate) fn week_one() -> PlanningWeek {
    PlanningWeek::new(2025, 1).expect("valid week")
}

/// Personal two-hour task on the Monday of 2025-W01.
pub(crate) fn personal_draft(owner_id: UserId) -> TaskDraft {
    TaskDraft {
        owner_id,
        assigned_by: None,
        week: week_one(),
        title: "Write quarterly plan".to_owned(),
        description: None,
        source: TaskSource::Personal,
        task_type_id: None,
        is_key_task: false,
        planned_start: at(2024, 12, 30, 9, 0),
        planned_end: at(2024, 12, 30, 11, 0),
    }
}
