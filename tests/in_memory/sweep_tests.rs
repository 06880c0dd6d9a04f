//! In-memory integration tests for the scheduled review fallback.

use super::helpers::{Planner, personal_request, planner};
use crate::test_helpers::week;
use chrono::Duration;
use eyre::{OptionExt, ensure};
use rstest::rstest;
use weekplan::task::{
    domain::{ReviewOrigin, TaskStatus, UserId},
    ports::TaskRepository,
    services::{DEFAULT_FALLBACK_REASON, SubmitReviewRequest},
};

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn sweep_rolls_unreviewed_work_for_every_owner(planner: Planner) -> eyre::Result<()> {
    let alice = UserId::new();
    let bob = UserId::new();
    let forgotten = planner
        .lifecycle
        .create_task(alice, personal_request("Update roadmap", week(2025, 1), 9))
        .await?;
    let reviewed = planner
        .lifecycle
        .create_task(alice, personal_request("Send invoices", week(2025, 1), 13))
        .await?;
    planner
        .lifecycle
        .create_task(bob, personal_request("Renew certificates", week(2025, 1), 9))
        .await?;
    planner
        .reviews
        .submit_review(alice, SubmitReviewRequest::completed(reviewed.id()))
        .await?;
    planner.clock.advance(Duration::days(7));

    let sweep = planner.rollover.sweep_week(week(2025, 1)).await?;

    ensure!(sweep.failed_owner_ids.is_empty());
    ensure!(sweep.per_owner.len() == 2);
    let created: usize = sweep
        .per_owner
        .iter()
        .map(|owner| owner.outcome.created_task_ids.len())
        .sum();
    ensure!(created == 2);

    let rolled = planner.lifecycle.get_task(alice, forgotten.id()).await?;
    ensure!(rolled.status() == TaskStatus::Delayed);
    ensure!(rolled.is_delayed_from_previous());
    let review = planner
        .reviews
        .get_review(alice, forgotten.id())
        .await?
        .ok_or_eyre("fallback review recorded")?;
    ensure!(review.origin() == ReviewOrigin::Fallback);
    ensure!(review.incomplete_reason() == Some(DEFAULT_FALLBACK_REASON));

    let next_week = planner
        .repository
        .find_by_owner_and_week(alice, week(2025, 2))
        .await?;
    ensure!(next_week.len() == 1);
    let successor = next_week.first().ok_or_eyre("alice successor")?;
    ensure!(successor.title() == "Update roadmap");
    ensure!(successor.original_week() == Some(1));
    ensure!(successor.planned().start() == forgotten.planned().start() + Duration::days(7));

    let completed = planner.lifecycle.get_task(alice, reviewed.id()).await?;
    ensure!(completed.status() == TaskStatus::Completed);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn repeated_sweep_is_a_no_op(planner: Planner) -> eyre::Result<()> {
    let owner = UserId::new();
    planner
        .lifecycle
        .create_task(owner, personal_request("Tidy backlog", week(2025, 1), 9))
        .await?;

    planner.rollover.sweep_week(week(2025, 1)).await?;
    let second = planner.rollover.sweep_week(week(2025, 1)).await?;

    ensure!(second.per_owner.is_empty());
    ensure!(second.failed_owner_ids.is_empty());
    let next_week = planner
        .repository
        .find_by_owner_and_week(owner, week(2025, 2))
        .await?;
    ensure!(next_week.len() == 1);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn fallback_crosses_a_53_week_year(planner: Planner) -> eyre::Result<()> {
    let owner = UserId::new();
    let task = planner
        .lifecycle
        .create_task(owner, personal_request("Year-end audit", week(2020, 53), 9))
        .await?;

    let outcome = planner
        .rollover
        .apply_review_fallback(owner, 2020, 53)
        .await?;

    let successor_id = *outcome.created_task_ids.first().ok_or_eyre("successor created")?;
    let successor = planner.lifecycle.get_task(owner, successor_id).await?;
    ensure!(successor.week() == week(2021, 1));
    ensure!(successor.original_week() == Some(53));
    let source = planner.lifecycle.get_task(owner, task.id()).await?;
    ensure!(source.status() == TaskStatus::Delayed);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn swept_task_is_not_offered_for_carry_over_again(planner: Planner) -> eyre::Result<()> {
    let owner = UserId::new();
    let task = planner
        .lifecycle
        .create_task(owner, personal_request("Draft hiring plan", week(2025, 1), 9))
        .await?;
    planner.rollover.sweep_week(week(2025, 1)).await?;

    ensure!(planner.lifecycle.list_delayed_tasks(owner).await?.is_empty());
    let outcome = planner
        .rollover
        .carry_over(owner, &[task.id()], 2025, 2)
        .await?;

    ensure!(outcome.created_task_ids.is_empty());
    ensure!(outcome.failed_task_ids == vec![task.id()]);
    let next_week = planner
        .repository
        .find_by_owner_and_week(owner, week(2025, 2))
        .await?;
    ensure!(next_week.len() == 1);
    Ok(())
}
