//! Then steps for weekly cycle BDD scenarios.

use super::world::{WeeklyCycleWorld, run_async};
use rstest_bdd_macros::then;
use weekplan::task::{
    domain::{PlanningWeek, ReviewOrigin, TaskDomainError, TaskStatus},
    ports::TaskRepository,
    services::{RolloverOutcome, TaskServiceError},
};

fn rollover_outcome(world: &WeeklyCycleWorld) -> Result<&RolloverOutcome, eyre::Report> {
    match world.last_rollover.as_ref() {
        Some(Ok(outcome)) => Ok(outcome),
        Some(Err(err)) => Err(eyre::eyre!("rollover failed: {err}")),
        None => Err(eyre::eyre!("missing rollover result")),
    }
}

#[then(r#"the task status is "{status}""#)]
fn task_status_is(world: &WeeklyCycleWorld, status: String) -> Result<(), eyre::Report> {
    let expected = TaskStatus::try_from(status.as_str())
        .map_err(|err| eyre::eyre!("invalid expected status in scenario: {err}"))?;
    let task = world.task()?;
    if task.status() != expected {
        return Err(eyre::eyre!(
            "expected status {}, found {}",
            expected.as_str(),
            task.status().as_str()
        ));
    }
    Ok(())
}

#[then("the planned duration is {minutes:i64} minutes")]
fn planned_duration_is(world: &WeeklyCycleWorld, minutes: i64) -> Result<(), eyre::Report> {
    let actual = world.task()?.planned_duration_minutes();
    eyre::ensure!(actual == minutes, "expected {minutes} minutes, found {actual}");
    Ok(())
}

#[then("the review is rejected as a conflict")]
fn review_is_rejected_as_conflict(world: &WeeklyCycleWorld) -> Result<(), eyre::Report> {
    let result = world
        .last_review
        .as_ref()
        .ok_or_else(|| eyre::eyre!("missing review result"))?;
    if !matches!(result, Err(TaskServiceError::ReviewConflict(_))) {
        return Err(eyre::eyre!("expected ReviewConflict error, got {result:?}"));
    }
    Ok(())
}

#[then("{count:usize} successor task was created")]
fn successors_created(world: &WeeklyCycleWorld, count: usize) -> Result<(), eyre::Report> {
    let outcome = rollover_outcome(world)?;
    eyre::ensure!(
        outcome.created_task_ids.len() == count,
        "expected {count} successors, found {:?}",
        outcome.created_task_ids
    );
    eyre::ensure!(outcome.failed_task_ids.is_empty(), "unexpected failures");
    Ok(())
}

#[then("the successor in {year:i32} week {week:u32} has original week {original:u32}")]
fn successor_has_original_week(
    world: &WeeklyCycleWorld,
    year: i32,
    week: u32,
    original: u32,
) -> Result<(), eyre::Report> {
    let successor_id = *rollover_outcome(world)?
        .created_task_ids
        .first()
        .ok_or_else(|| eyre::eyre!("no successor created"))?;
    let successor = run_async(world.lifecycle.get_task(world.owner, successor_id))?;
    eyre::ensure!(successor.week() == PlanningWeek::new(year, week)?, "wrong target week");
    eyre::ensure!(
        successor.original_week() == Some(original),
        "expected original week {original}, found {:?}",
        successor.original_week()
    );
    eyre::ensure!(successor.is_delayed_from_previous(), "lineage flag missing");
    Ok(())
}

#[then("the carry-over is rejected as an invalid week")]
fn carry_over_rejected(world: &WeeklyCycleWorld) -> Result<(), eyre::Report> {
    let result = world
        .last_rollover
        .as_ref()
        .ok_or_else(|| eyre::eyre!("missing rollover result"))?;
    if !matches!(
        result,
        Err(TaskServiceError::Domain(TaskDomainError::InvalidWeek { .. }))
    ) {
        return Err(eyre::eyre!("expected InvalidWeek error, got {result:?}"));
    }
    Ok(())
}

#[then("the task has a fallback review")]
fn task_has_fallback_review(world: &WeeklyCycleWorld) -> Result<(), eyre::Report> {
    let task_id = world.task()?.id();
    let review = run_async(world.reviews.get_review(world.owner, task_id))?
        .ok_or_else(|| eyre::eyre!("no review recorded"))?;
    eyre::ensure!(review.origin() == ReviewOrigin::Fallback, "review is not a fallback");
    eyre::ensure!(!review.is_completed(), "fallback review marked completed");
    Ok(())
}

#[then("the owner has {count:usize} task in {year:i32} week {week:u32}")]
fn owner_has_tasks_in_week(
    world: &WeeklyCycleWorld,
    count: usize,
    year: i32,
    week: u32,
) -> Result<(), eyre::Report> {
    let planning_week = PlanningWeek::new(year, week)?;
    let tasks = run_async(
        world
            .repository
            .find_by_owner_and_week(world.owner, planning_week),
    )?;
    eyre::ensure!(
        tasks.len() == count,
        "expected {count} tasks in {planning_week}, found {}",
        tasks.len()
    );
    Ok(())
}

#[then(r#"the trend covers "{weeks}""#)]
fn trend_covers(world: &WeeklyCycleWorld, weeks: String) -> Result<(), eyre::Report> {
    let report = world
        .last_report
        .as_ref()
        .ok_or_else(|| eyre::eyre!("missing report"))?;
    let actual: Vec<String> = report
        .trend
        .iter()
        .map(|point| point.week.to_string())
        .collect();
    let expected: Vec<&str> = weeks.split(", ").collect();
    eyre::ensure!(actual == expected, "expected trend {expected:?}, found {actual:?}");
    Ok(())
}

#[then("the report counts {count:u64} tasks")]
fn report_counts_tasks(world: &WeeklyCycleWorld, count: u64) -> Result<(), eyre::Report> {
    let report = world
        .last_report
        .as_ref()
        .ok_or_else(|| eyre::eyre!("missing report"))?;
    eyre::ensure!(
        report.summary.total() == count,
        "expected {count} tasks, found {}",
        report.summary.total()
    );
    Ok(())
}
