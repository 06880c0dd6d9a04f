//! Shared fixtures for in-memory integration tests.

use std::sync::Arc;

use crate::test_helpers::{FixedClock, monday_at};
use chrono::{DateTime, Utc};
use rstest::fixture;
use weekplan::report::{ReportCommentService, ReportService};
use weekplan::task::{
    adapters::memory::InMemoryTaskRepository,
    domain::{PlanningWeek, TaskSource},
    services::{CreateTaskRequest, RolloverService, TaskLifecycleService, TaskReviewService},
};

/// Every service wired to one in-memory store and one clock.
pub struct Planner {
    pub repository: Arc<InMemoryTaskRepository>,
    pub clock: Arc<FixedClock>,
    pub lifecycle: TaskLifecycleService<InMemoryTaskRepository, FixedClock>,
    pub reviews: TaskReviewService<InMemoryTaskRepository, FixedClock>,
    pub rollover: RolloverService<InMemoryTaskRepository, FixedClock>,
    pub reports: ReportService<InMemoryTaskRepository>,
    pub comments: ReportCommentService<InMemoryTaskRepository, FixedClock>,
}

impl Planner {
    /// Wires the services with the clock frozen at `now`.
    pub fn starting_at(now: DateTime<Utc>) -> Self {
        let repository = Arc::new(InMemoryTaskRepository::new());
        let clock = Arc::new(FixedClock::new(now));
        Self {
            lifecycle: TaskLifecycleService::new(Arc::clone(&repository), Arc::clone(&clock)),
            reviews: TaskReviewService::new(Arc::clone(&repository), Arc::clone(&clock)),
            rollover: RolloverService::new(Arc::clone(&repository), Arc::clone(&clock)),
            reports: ReportService::new(Arc::clone(&repository)),
            comments: ReportCommentService::new(Arc::clone(&repository), Arc::clone(&clock)),
            repository,
            clock,
        }
    }
}

/// Planner whose clock sits on the Monday of 2025-W01.
#[fixture]
pub fn planner() -> Planner {
    Planner::starting_at(monday_at(crate::test_helpers::week(2025, 1), 8))
}

/// Personal two-hour task starting at `hour` on the Monday of `planning_week`.
pub fn personal_request(title: &str, planning_week: PlanningWeek, hour: u32) -> CreateTaskRequest {
    CreateTaskRequest::new(
        title,
        planning_week.year(),
        planning_week.week(),
        monday_at(planning_week, hour),
        monday_at(planning_week, hour + 2),
    )
    .with_source(TaskSource::Personal)
}
