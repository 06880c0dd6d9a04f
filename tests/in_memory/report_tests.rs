//! In-memory integration tests for digests and range reports.

use super::helpers::{Planner, personal_request, planner};
use crate::test_helpers::{date, week};
use eyre::{OptionExt, ensure};
use rstest::rstest;
use weekplan::report::{CompletionBand, Rate, ReportError, ReportScope, ReviewStatus};
use weekplan::task::{
    domain::{FollowUpAction, TaskSource, TaskTypeId, UserId},
    services::SubmitReviewRequest,
};

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn weekly_digest_reflects_reviews(planner: Planner) -> eyre::Result<()> {
    let owner = UserId::new();
    let key = planner
        .lifecycle
        .create_task(
            owner,
            personal_request("Close hiring loop", week(2025, 1), 9).as_key_task(),
        )
        .await?;
    let routine = planner
        .lifecycle
        .create_task(owner, personal_request("Expense report", week(2025, 1), 13))
        .await?;
    planner
        .reviews
        .submit_review(owner, SubmitReviewRequest::completed(routine.id()))
        .await?;
    planner
        .reviews
        .submit_review(
            owner,
            SubmitReviewRequest::incomplete(key.id(), "candidate declined", FollowUpAction::Cancel),
        )
        .await?;

    let digest = planner.reports.weekly_digest(owner, 2025, 1).await?;

    ensure!(digest.week == week(2025, 1));
    ensure!(digest.summary.total() == 2);
    ensure!(digest.summary.key_completion_rate == Rate::new(0, 1));
    ensure!(digest.completed_tasks.len() == 1);
    let cancelled = digest.incomplete_tasks.first().ok_or_eyre("cancelled entry")?;
    ensure!(cancelled.task.id() == key.id());
    let review = cancelled.review.as_ref().ok_or_eyre("review attached")?;
    ensure!(review.incomplete_reason() == Some("candidate declined"));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn team_report_breaks_down_members_and_types(planner: Planner) -> eyre::Result<()> {
    let alice = UserId::new();
    let bob = UserId::new();
    let ops = TaskTypeId::new();
    let typed = personal_request("Patch servers", week(2025, 2), 9)
        .with_source(TaskSource::Responsibility)
        .with_task_type(ops);
    let patched = planner.lifecycle.create_task(alice, typed).await?;
    planner
        .reviews
        .submit_review(alice, SubmitReviewRequest::completed(patched.id()))
        .await?;
    planner
        .lifecycle
        .create_task(bob, personal_request("Write postmortem", week(2025, 3), 9))
        .await?;
    planner
        .lifecycle
        .create_task(bob, personal_request("Out of range", week(2025, 5), 9))
        .await?;

    let report = planner
        .reports
        .range_report(&[alice, bob], date(2025, 1, 6), date(2025, 1, 19), ReportScope::Team)
        .await?;

    ensure!(report.summary.total() == 2);
    ensure!(report.summary.completion_rate == Rate::new(1, 2));
    ensure!(report.assessment.completion == CompletionBand::Weak);
    ensure!(report.trend.len() == 2);
    let members = report.members.ok_or_eyre("team members")?;
    ensure!(members.len() == 2);
    ensure!(report.task_types.len() == 2);
    let ops_group = report
        .task_types
        .iter()
        .find(|group| group.task_type_id == Some(ops))
        .ok_or_eyre("ops group")?;
    ensure!(ops_group.status_counts.completed == 1);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn reversed_range_is_rejected(planner: Planner) -> eyre::Result<()> {
    let result = planner
        .reports
        .range_report(
            &[UserId::new()],
            date(2025, 2, 1),
            date(2025, 1, 1),
            ReportScope::Individual,
        )
        .await;

    ensure!(matches!(result, Err(ReportError::InvalidDateRange { .. })));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn manager_signs_off_a_reviewed_week(planner: Planner) -> eyre::Result<()> {
    let manager = UserId::new();
    let member = UserId::new();
    let task = planner
        .lifecycle
        .create_task(member, personal_request("Close sprint", week(2025, 1), 9))
        .await?;

    let before = planner.reports.team_overview(manager, &[member], 2025, 1).await?;
    ensure!(
        before.members.first().and_then(|entry| entry.review_status)
            == Some(ReviewStatus::NotSubmitted)
    );

    planner
        .reviews
        .submit_review(member, SubmitReviewRequest::completed(task.id()))
        .await?;
    let comment = planner
        .comments
        .add_comment(manager, member, 2025, 1, "Clean close-out")
        .await?;
    let submitted = planner.reports.team_overview(manager, &[member], 2025, 1).await?;
    ensure!(
        submitted.members.first().and_then(|entry| entry.review_status)
            == Some(ReviewStatus::Submitted)
    );

    planner.comments.mark_comment_reviewed(manager, comment.id()).await?;
    let reviewed = planner.reports.team_overview(manager, &[member], 2025, 1).await?;
    let entry = reviewed.members.first().ok_or_eyre("member present")?;
    ensure!(entry.review_status == Some(ReviewStatus::Reviewed));
    ensure!(entry.summary.completion_rate == Rate::new(1, 1));

    let listed = planner.comments.list_comments(member, 2025, 1).await?;
    ensure!(listed.len() == 1);
    ensure!(listed.iter().all(|found| found.is_reviewed() && found.manager_id() == manager));
    Ok(())
}
