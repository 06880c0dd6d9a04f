//! `PostgreSQL` integration tests for review and rollover services.

use std::sync::Arc;

use super::helpers::{BoxError, TestSchema};
use crate::test_helpers::{FixedClock, at, monday_at, week};
use chrono::Duration;
use weekplan::task::{
    domain::{FollowUpAction, ReviewOrigin, TaskSource, TaskStatus, UserId},
    services::{
        CreateTaskRequest, RolloverService, SubmitReviewRequest, TaskLifecycleService,
        TaskReviewService, TaskServiceError,
    },
};

fn request(title: &str) -> CreateTaskRequest {
    let planning_week = week(2025, 1);
    CreateTaskRequest::new(
        title,
        2025,
        1,
        monday_at(planning_week, 9),
        monday_at(planning_week, 11),
    )
    .with_source(TaskSource::Personal)
}

#[tokio::test(flavor = "multi_thread")]
async fn review_conflict_and_sweep_against_postgres() -> Result<(), BoxError> {
    let Some(schema) = TestSchema::create()? else {
        return Ok(());
    };
    let clock = Arc::new(FixedClock::new(at(2024, 12, 30, 8, 0)));
    let repository = Arc::clone(&schema.repository);
    let lifecycle = TaskLifecycleService::new(Arc::clone(&repository), Arc::clone(&clock));
    let reviews = TaskReviewService::new(Arc::clone(&repository), Arc::clone(&clock));
    let rollover = RolloverService::new(Arc::clone(&repository), Arc::clone(&clock));
    let owner = UserId::new();

    let reviewed = lifecycle.create_task(owner, request("Close books")).await?;
    let forgotten = lifecycle.create_task(owner, request("File expenses")).await?;
    reviews
        .submit_review(
            owner,
            SubmitReviewRequest::incomplete(reviewed.id(), "audit", FollowUpAction::Cancel),
        )
        .await?;
    let conflict = reviews
        .submit_review(owner, SubmitReviewRequest::completed(reviewed.id()))
        .await;
    assert!(matches!(conflict, Err(TaskServiceError::ReviewConflict(_))));

    clock.advance(Duration::days(7));
    let sweep = rollover.sweep_week(week(2025, 1)).await?;

    assert!(sweep.failed_owner_ids.is_empty());
    let created: Vec<_> = sweep
        .per_owner
        .iter()
        .flat_map(|owner_run| owner_run.outcome.created_task_ids.clone())
        .collect();
    assert_eq!(created.len(), 1);
    let rolled = lifecycle.get_task(owner, forgotten.id()).await?;
    assert_eq!(rolled.status(), TaskStatus::Delayed);
    let fallback = reviews.get_review(owner, forgotten.id()).await?;
    assert_eq!(fallback.map(|review| review.origin()), Some(ReviewOrigin::Fallback));

    let next_week = lifecycle.list_week_tasks(owner, 2025, 2, None).await?;
    assert_eq!(next_week.len(), 1);
    assert!(next_week.iter().all(|task| task.original_week() == Some(1)));
    let cancelled = lifecycle.get_task(owner, reviewed.id()).await?;
    assert_eq!(cancelled.status(), TaskStatus::Cancelled);
    Ok(())
}
