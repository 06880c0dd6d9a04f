//! Pure aggregation over task populations.

use super::domain::{
    Assessment, DigestEntry, MemberBreakdown, Rate, Report, ReportError, ReportScope,
    ReportSummary, StatusCounts, TaskTypeBreakdown, WeekTrendPoint, WeeklyDigest,
};
use crate::task::domain::{PlanningWeek, Review, Task, TaskId, TaskStatus, TaskTypeId, UserId};
use chrono::NaiveDate;
use std::collections::{BTreeMap, HashMap};
use std::hash::BuildHasher;

/// Builds a report over the tasks planned between `start` and `end`.
///
/// The population is expected to be pre-filtered by viewer scope. Tasks whose
/// planning week falls outside the weeks containing `start` and `end` are
/// ignored.
///
/// # Errors
///
/// Returns [`ReportError::InvalidDateRange`] when `start` is after `end`.
pub fn build_report(
    population: &[Task],
    start: NaiveDate,
    end: NaiveDate,
    scope: ReportScope,
) -> Result<Report, ReportError> {
    let (first, last) = week_bounds(start, end)?;
    let tasks: Vec<&Task> = population
        .iter()
        .filter(|task| (first..=last).contains(&task.week()))
        .collect();

    let summary = summarise(tasks.iter().copied());
    let members = match scope {
        ReportScope::Individual => None,
        ReportScope::Team => Some(member_breakdowns(&tasks)),
    };

    Ok(Report {
        start_date: start,
        end_date: end,
        scope,
        summary,
        assessment: Assessment::of(&summary),
        trend: weekly_trend(&tasks, first, last),
        task_types: task_type_breakdowns(&tasks),
        members,
    })
}

/// Resolves the planning weeks containing both ends of a date range.
///
/// # Errors
///
/// Returns [`ReportError::InvalidDateRange`] when `start` is after `end`.
pub fn week_bounds(
    start: NaiveDate,
    end: NaiveDate,
) -> Result<(PlanningWeek, PlanningWeek), ReportError> {
    if start > end {
        return Err(ReportError::InvalidDateRange { start, end });
    }
    Ok((PlanningWeek::containing(start), PlanningWeek::containing(end)))
}

/// Computes the headline figures for a set of tasks.
#[must_use]
pub fn summarise<'a>(tasks: impl IntoIterator<Item = &'a Task>) -> ReportSummary {
    let mut status_counts = StatusCounts::default();
    let mut key_total = 0_u64;
    let mut key_completed = 0_u64;

    for task in tasks {
        status_counts.record(task.status());
        if task.is_key_task() {
            key_total += 1;
            if task.status() == TaskStatus::Completed {
                key_completed += 1;
            }
        }
    }

    let total = status_counts.total();
    ReportSummary {
        status_counts,
        key_total,
        key_completed,
        completion_rate: Rate::new(status_counts.completed, total),
        key_completion_rate: Rate::new(key_completed, key_total),
        delay_rate: Rate::new(status_counts.delayed, total),
    }
}

fn weekly_trend(
    tasks: &[&Task],
    first: PlanningWeek,
    last: PlanningWeek,
) -> Vec<WeekTrendPoint> {
    let mut per_week: HashMap<PlanningWeek, (u64, u64)> = HashMap::new();
    for task in tasks {
        let entry = per_week.entry(task.week()).or_default();
        entry.0 += 1;
        if task.status() == TaskStatus::Completed {
            entry.1 += 1;
        }
    }

    first
        .through(last)
        .map(|week| {
            let (total, completed) = per_week.get(&week).copied().unwrap_or_default();
            WeekTrendPoint {
                week,
                total,
                completed,
                completion_rate: Rate::new(completed, total),
            }
        })
        .collect()
}

fn task_type_breakdowns(tasks: &[&Task]) -> Vec<TaskTypeBreakdown> {
    let mut groups: BTreeMap<Option<TaskTypeId>, TaskTypeBreakdown> = BTreeMap::new();
    for task in tasks {
        let group = groups
            .entry(task.task_type_id())
            .or_insert_with(|| TaskTypeBreakdown {
                task_type_id: task.task_type_id(),
                status_counts: StatusCounts::default(),
                completion_minutes: 0,
                timed_completions: 0,
            });
        group.status_counts.record(task.status());
        if let Some(minutes) = completion_minutes(task) {
            group.completion_minutes = group.completion_minutes.saturating_add(minutes);
            group.timed_completions += 1;
        }
    }
    groups.into_values().collect()
}

/// Actual duration of a completed task whose actual bounds are both known.
fn completion_minutes(task: &Task) -> Option<i64> {
    if task.status() != TaskStatus::Completed {
        return None;
    }
    let (start, end) = (task.actual_start()?, task.actual_end()?);
    Some(end.signed_duration_since(start).num_minutes())
}

fn member_breakdowns(tasks: &[&Task]) -> Vec<MemberBreakdown> {
    let mut by_owner: BTreeMap<UserId, Vec<&Task>> = BTreeMap::new();
    for task in tasks {
        by_owner.entry(task.owner_id()).or_default().push(*task);
    }
    by_owner
        .into_iter()
        .map(|(owner_id, owned)| MemberBreakdown {
            owner_id,
            summary: summarise(owned),
            review_status: None,
        })
        .collect()
}

/// Assembles one person's end-of-week digest.
///
/// `tasks` must be the owner's tasks in `week`; `reviews` maps task ids to
/// their recorded reviews.
#[must_use]
pub fn build_weekly_digest<S: BuildHasher>(
    owner_id: UserId,
    week: PlanningWeek,
    tasks: &[Task],
    reviews: &HashMap<TaskId, Review, S>,
) -> WeeklyDigest {
    let entry = |task: &Task| DigestEntry {
        task: task.clone(),
        review: reviews.get(&task.id()).cloned(),
    };

    let mut ordered: Vec<&Task> = tasks.iter().collect();
    ordered.sort_by_key(|task| (!task.is_key_task(), task.created_at()));

    WeeklyDigest {
        owner_id,
        week,
        summary: summarise(ordered.iter().copied()),
        key_tasks: ordered
            .iter()
            .filter(|task| task.is_key_task())
            .map(|&task| entry(task))
            .collect(),
        completed_tasks: ordered
            .iter()
            .filter(|task| task.status() == TaskStatus::Completed)
            .map(|&task| task.clone())
            .collect(),
        incomplete_tasks: ordered
            .iter()
            .filter(|task| matches!(task.status(), TaskStatus::Delayed | TaskStatus::Cancelled))
            .map(|&task| entry(task))
            .collect(),
    }
}
