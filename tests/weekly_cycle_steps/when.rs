//! When steps for weekly cycle BDD scenarios.

use super::world::{WeeklyCycleWorld, run_async};
use chrono::NaiveDate;
use eyre::WrapErr;
use rstest_bdd_macros::when;
use weekplan::report::ReportScope;
use weekplan::task::{domain::FollowUpAction, services::SubmitReviewRequest};

fn review(world: &mut WeeklyCycleWorld, request: SubmitReviewRequest) {
    let result = run_async(world.reviews.submit_review(world.owner, request));
    if let Ok(ref submission) = result {
        world.last_task = Some(submission.task.clone());
    }
    world.last_review = Some(result);
}

#[when(r#"the owner reviews the task as incomplete because "{reason}""#)]
fn owner_reviews_incomplete(
    world: &mut WeeklyCycleWorld,
    reason: String,
) -> Result<(), eyre::Report> {
    let task_id = world.task()?.id();
    review(
        world,
        SubmitReviewRequest::incomplete(task_id, reason, FollowUpAction::RollToNextWeek),
    );
    Ok(())
}

#[when("the owner reviews the task as completed")]
fn owner_reviews_completed(world: &mut WeeklyCycleWorld) -> Result<(), eyre::Report> {
    let task_id = world.task()?.id();
    review(world, SubmitReviewRequest::completed(task_id));
    Ok(())
}

#[when("the owner carries the task over to {year:i32} week {week:u32}")]
fn owner_carries_task_over(
    world: &mut WeeklyCycleWorld,
    year: i32,
    week: u32,
) -> Result<(), eyre::Report> {
    let task_id = world.task()?.id();
    let result = run_async(world.rollover.carry_over(world.owner, &[task_id], year, week));
    world.last_rollover = Some(result);
    Ok(())
}

#[when("the review fallback runs for {year:i32} week {week:u32}")]
fn review_fallback_runs(
    world: &mut WeeklyCycleWorld,
    year: i32,
    week: u32,
) -> Result<(), eyre::Report> {
    let task_id = world.task()?.id();
    let outcome = run_async(world.rollover.apply_review_fallback(world.owner, year, week))
        .wrap_err("run review fallback")?;
    let refreshed = run_async(world.lifecycle.get_task(world.owner, task_id))
        .wrap_err("reload task after fallback")?;
    world.last_task = Some(refreshed);
    world.last_rollover = Some(Ok(outcome));
    Ok(())
}

#[when(r#"a report is built from "{start}" to "{end}""#)]
fn report_is_built(
    world: &mut WeeklyCycleWorld,
    start: String,
    end: String,
) -> Result<(), eyre::Report> {
    let start_date: NaiveDate = start.parse().wrap_err("parse report start")?;
    let end_date: NaiveDate = end.parse().wrap_err("parse report end")?;
    let report = run_async(world.reports.range_report(
        &[world.owner],
        start_date,
        end_date,
        ReportScope::Individual,
    ))
    .wrap_err("build report")?;
    world.last_report = Some(report);
    Ok(())
}
