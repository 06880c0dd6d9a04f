//! Shared world state for weekly cycle BDD scenarios.

use std::sync::Arc;

use mockable::DefaultClock;
use rstest::fixture;
use weekplan::report::{Report, ReportService};
use weekplan::task::{
    adapters::memory::InMemoryTaskRepository,
    domain::{Task, UserId},
    services::{
        ReviewSubmission, RolloverOutcome, RolloverService, TaskLifecycleService,
        TaskReviewService, TaskServiceError,
    },
};

/// Scenario world wiring every service to one in-memory store.
pub struct WeeklyCycleWorld {
    pub repository: Arc<InMemoryTaskRepository>,
    pub lifecycle: TaskLifecycleService<InMemoryTaskRepository, DefaultClock>,
    pub reviews: TaskReviewService<InMemoryTaskRepository, DefaultClock>,
    pub rollover: RolloverService<InMemoryTaskRepository, DefaultClock>,
    pub reports: ReportService<InMemoryTaskRepository>,
    pub owner: UserId,
    pub last_task: Option<Task>,
    pub last_review: Option<Result<ReviewSubmission, TaskServiceError>>,
    pub last_rollover: Option<Result<RolloverOutcome, TaskServiceError>>,
    pub last_report: Option<Report>,
}

impl WeeklyCycleWorld {
    /// Creates a world for a single task owner.
    #[must_use]
    pub fn new() -> Self {
        let repository = Arc::new(InMemoryTaskRepository::new());
        let clock = Arc::new(DefaultClock);

        Self {
            lifecycle: TaskLifecycleService::new(Arc::clone(&repository), Arc::clone(&clock)),
            reviews: TaskReviewService::new(Arc::clone(&repository), Arc::clone(&clock)),
            rollover: RolloverService::new(Arc::clone(&repository), clock),
            reports: ReportService::new(Arc::clone(&repository)),
            repository,
            owner: UserId::new(),
            last_task: None,
            last_review: None,
            last_rollover: None,
            last_report: None,
        }
    }

    /// Returns the most recently planned task.
    ///
    /// # Errors
    ///
    /// Returns an error when no task has been planned yet.
    pub fn task(&self) -> Result<&Task, eyre::Report> {
        self.last_task
            .as_ref()
            .ok_or_else(|| eyre::eyre!("missing planned task in scenario world"))
    }
}

impl Default for WeeklyCycleWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixture that creates a new scenario world.
#[fixture]
pub fn world() -> WeeklyCycleWorld {
    WeeklyCycleWorld::default()
}

/// Runs an async operation within sync step definitions.
pub fn run_async<T>(future: impl std::future::Future<Output = T>) -> T {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}
