//! Repository-backed report loading.

use super::{
    builder::{build_report, build_weekly_digest, summarise, week_bounds},
    domain::{
        MemberBreakdown, Report, ReportError, ReportScope, ReviewStatus, TeamOverview,
        WeeklyDigest,
    },
};
use crate::task::{
    domain::{PlanningWeek, UserId},
    ports::TaskRepository,
};
use chrono::NaiveDate;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Read-only reporting over the task store.
#[derive(Clone)]
pub struct ReportService<R>
where
    R: TaskRepository,
{
    repository: Arc<R>,
}

impl<R> ReportService<R>
where
    R: TaskRepository,
{
    /// Creates a new report service.
    #[must_use]
    pub const fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    /// Builds the end-of-week digest for one person.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError::Domain`] for an invalid week and
    /// [`ReportError::Repository`] when loading fails.
    pub async fn weekly_digest(
        &self,
        owner: UserId,
        year: i32,
        week: u32,
    ) -> Result<WeeklyDigest, ReportError> {
        let planning_week = PlanningWeek::new(year, week)?;
        let tasks = self
            .repository
            .find_by_owner_and_week(owner, planning_week)
            .await?;

        let mut reviews = HashMap::with_capacity(tasks.len());
        for task in &tasks {
            if let Some(review) = self.repository.find_review(task.id()).await? {
                reviews.insert(task.id(), review);
            }
        }

        debug!(
            owner_id = %owner,
            week = %planning_week,
            tasks = tasks.len(),
            "built weekly digest"
        );
        Ok(build_weekly_digest(owner, planning_week, &tasks, &reviews))
    }

    /// Loads the owners' tasks in a date range and aggregates them.
    ///
    /// Use [`ReportScope::Team`] to include per-member figures.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError::InvalidDateRange`] when `start` is after `end`
    /// and [`ReportError::Repository`] when loading fails.
    pub async fn range_report(
        &self,
        owners: &[UserId],
        start: NaiveDate,
        end: NaiveDate,
        scope: ReportScope,
    ) -> Result<Report, ReportError> {
        let (first, last) = week_bounds(start, end)?;
        let population = self
            .repository
            .find_by_owners_between(owners, first, last)
            .await?;
        debug!(
            owners = owners.len(),
            first_week = %first,
            last_week = %last,
            tasks = population.len(),
            "loaded report population"
        );
        build_report(&population, start, end, scope)
    }

    /// Summarises each member's week and where it stands with `manager`.
    ///
    /// Members appear once each, in the order given, including members with
    /// no tasks in the week.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError::Domain`] for an invalid week and
    /// [`ReportError::Repository`] when loading fails.
    pub async fn team_overview(
        &self,
        manager: UserId,
        members: &[UserId],
        year: i32,
        week: u32,
    ) -> Result<TeamOverview, ReportError> {
        let planning_week = PlanningWeek::new(year, week)?;
        let mut breakdowns: Vec<MemberBreakdown> = Vec::with_capacity(members.len());

        for &member in members {
            if breakdowns.iter().any(|entry| entry.owner_id == member) {
                continue;
            }
            let tasks = self
                .repository
                .find_by_owner_and_week(member, planning_week)
                .await?;
            let mut has_reviews = false;
            for task in &tasks {
                if self.repository.find_review(task.id()).await?.is_some() {
                    has_reviews = true;
                    break;
                }
            }
            let comments = self.repository.find_comments(member, planning_week).await?;
            breakdowns.push(MemberBreakdown {
                owner_id: member,
                summary: summarise(&tasks),
                review_status: Some(ReviewStatus::for_manager(manager, has_reviews, &comments)),
            });
        }

        debug!(
            manager_id = %manager,
            week = %planning_week,
            members = breakdowns.len(),
            "built team overview"
        );
        Ok(TeamOverview {
            manager_id: manager,
            week: planning_week,
            members: breakdowns,
        })
    }
}
