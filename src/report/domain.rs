//! Report value types.

use crate::task::domain::{
    CommentId, PlanningWeek, ReportComment, Review, Task, TaskStatus, TaskTypeId, UserId,
};
use chrono::NaiveDate;
use serde::Serialize;
use thiserror::Error;

/// Minutes in one day, used to express completion durations in days.
const MINUTES_PER_DAY: i64 = 1_440;

/// Errors raised while building reports.
#[derive(Debug, Error)]
pub enum ReportError {
    /// The range starts after it ends.
    #[error("report range starts on {start} after it ends on {end}")]
    InvalidDateRange {
        /// First day of the requested range.
        start: NaiveDate,
        /// Last day of the requested range.
        end: NaiveDate,
    },

    /// A week argument was invalid.
    #[error(transparent)]
    Domain(#[from] crate::task::domain::TaskDomainError),

    /// Loading the population failed.
    #[error(transparent)]
    Repository(#[from] crate::task::ports::TaskRepositoryError),

    /// The report comment does not exist.
    #[error("report comment not found: {0}")]
    CommentNotFound(CommentId),

    /// Only the author may mark a comment as reviewed.
    #[error("user {actor} did not write report comment {comment_id}")]
    NotCommentAuthor {
        /// Comment the caller tried to change.
        comment_id: CommentId,
        /// Caller identity.
        actor: UserId,
    },
}

/// Exact ratio between two counts.
///
/// An empty denominator reads as zero percent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Rate {
    numerator: u64,
    denominator: u64,
}

impl Rate {
    /// Creates a rate from a count and the population it is drawn from.
    #[must_use]
    pub const fn new(numerator: u64, denominator: u64) -> Self {
        Self {
            numerator,
            denominator,
        }
    }

    /// Returns the counted items.
    #[must_use]
    pub const fn numerator(self) -> u64 {
        self.numerator
    }

    /// Returns the population size.
    #[must_use]
    pub const fn denominator(self) -> u64 {
        self.denominator
    }

    /// Returns the rate as a percentage in `0.0..=100.0`.
    #[must_use]
    #[expect(
        clippy::float_arithmetic,
        clippy::cast_precision_loss,
        reason = "percentages are presentation values derived from exact counts"
    )]
    pub fn percent(self) -> f64 {
        if self.denominator == 0 {
            return 0.0;
        }
        self.numerator as f64 * 100.0 / self.denominator as f64
    }

    /// Returns `true` when the rate is at least `threshold` percent.
    #[must_use]
    pub const fn at_least(self, threshold: u64) -> bool {
        self.numerator.saturating_mul(100) >= threshold.saturating_mul(self.denominator)
            && self.denominator > 0
    }

    /// Returns `true` when the rate exceeds `threshold` percent.
    #[must_use]
    pub const fn above(self, threshold: u64) -> bool {
        self.numerator.saturating_mul(100) > threshold.saturating_mul(self.denominator)
    }
}

/// Task tallies per lifecycle status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    /// Planned, not started.
    pub todo: u64,
    /// Started.
    pub in_progress: u64,
    /// Finished.
    pub completed: u64,
    /// Rolled to a later week.
    pub delayed: u64,
    /// Abandoned.
    pub cancelled: u64,
}

impl StatusCounts {
    /// Counts one task with `status`.
    pub const fn record(&mut self, status: TaskStatus) {
        let slot = match status {
            TaskStatus::Todo => &mut self.todo,
            TaskStatus::InProgress => &mut self.in_progress,
            TaskStatus::Completed => &mut self.completed,
            TaskStatus::Delayed => &mut self.delayed,
            TaskStatus::Cancelled => &mut self.cancelled,
        };
        *slot = slot.saturating_add(1);
    }

    /// Returns the number of counted tasks.
    #[must_use]
    pub const fn total(&self) -> u64 {
        self.todo
            .saturating_add(self.in_progress)
            .saturating_add(self.completed)
            .saturating_add(self.delayed)
            .saturating_add(self.cancelled)
    }
}

/// Headline figures over a task population.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReportSummary {
    /// Tallies per status.
    pub status_counts: StatusCounts,
    /// Number of key tasks.
    pub key_total: u64,
    /// Number of completed key tasks.
    pub key_completed: u64,
    /// Completed over total.
    pub completion_rate: Rate,
    /// Completed key tasks over key tasks.
    pub key_completion_rate: Rate,
    /// Delayed over total.
    pub delay_rate: Rate,
}

impl ReportSummary {
    /// Returns the number of tasks summarised.
    #[must_use]
    pub const fn total(&self) -> u64 {
        self.status_counts.total()
    }
}

/// Completion figures for one week of a trend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WeekTrendPoint {
    /// The week.
    pub week: PlanningWeek,
    /// Tasks planned in the week.
    pub total: u64,
    /// Tasks completed.
    pub completed: u64,
    /// Completed over total.
    pub completion_rate: Rate,
}

/// Figures for tasks sharing a task type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskTypeBreakdown {
    /// Task type, or `None` for tasks without one.
    pub task_type_id: Option<TaskTypeId>,
    /// Tallies per status.
    pub status_counts: StatusCounts,
    /// Summed actual duration of completed tasks with both actual bounds.
    pub completion_minutes: i64,
    /// Completed tasks contributing to `completion_minutes`.
    pub timed_completions: u64,
}

impl TaskTypeBreakdown {
    /// Returns the mean completion duration in days.
    ///
    /// `None` when no completed task has both actual bounds.
    #[must_use]
    #[expect(
        clippy::float_arithmetic,
        clippy::cast_precision_loss,
        reason = "averages are presentation values derived from exact sums"
    )]
    pub fn average_completion_days(&self) -> Option<f64> {
        if self.timed_completions == 0 {
            return None;
        }
        let minutes = self.completion_minutes as f64;
        Some(minutes / MINUTES_PER_DAY as f64 / self.timed_completions as f64)
    }
}

/// Where a member's weekly report stands with their manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewStatus {
    /// None of the member's tasks in the week has a review yet.
    NotSubmitted,
    /// The member reviewed their week; the manager has not signed it off.
    Submitted,
    /// The manager marked one of their comments on the week as reviewed.
    Reviewed,
}

impl ReviewStatus {
    /// Derives the status seen by `manager`.
    ///
    /// `has_reviews` tells whether any of the member's tasks in the week was
    /// reviewed; `comments` are the comments left on that week.
    #[must_use]
    pub fn for_manager(manager: UserId, has_reviews: bool, comments: &[ReportComment]) -> Self {
        if !has_reviews {
            return Self::NotSubmitted;
        }
        let signed_off = comments
            .iter()
            .any(|comment| comment.is_authored_by(manager) && comment.is_reviewed());
        if signed_off {
            Self::Reviewed
        } else {
            Self::Submitted
        }
    }
}

/// Figures for one team member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MemberBreakdown {
    /// Team member.
    pub owner_id: UserId,
    /// The member's headline figures.
    pub summary: ReportSummary,
    /// Sign-off state of a single week; absent from range reports.
    pub review_status: Option<ReviewStatus>,
}

/// A manager's view of the team for one week.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TeamOverview {
    /// Manager the review statuses are computed for.
    pub manager_id: UserId,
    /// Week covered.
    pub week: PlanningWeek,
    /// One entry per requested member, in request order.
    pub members: Vec<MemberBreakdown>,
}

/// Which population a report describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportScope {
    /// One person's own tasks.
    Individual,
    /// A manager's team; adds per-member figures.
    Team,
}

/// Overall completion band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CompletionBand {
    /// At least 80% completed.
    Strong,
    /// At least 60% completed.
    Moderate,
    /// Below 60% completed.
    Weak,
}

/// Qualitative reading of a summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Assessment {
    /// Completion band.
    pub completion: CompletionBand,
    /// Key tasks are at least 80% complete, or there are none.
    pub key_tasks_on_track: bool,
    /// More than 20% of tasks were delayed.
    pub delay_elevated: bool,
}

impl Assessment {
    /// Derives the assessment for `summary`.
    #[must_use]
    pub const fn of(summary: &ReportSummary) -> Self {
        let completion = if summary.completion_rate.at_least(80) {
            CompletionBand::Strong
        } else if summary.completion_rate.at_least(60) {
            CompletionBand::Moderate
        } else {
            CompletionBand::Weak
        };
        Self {
            completion,
            key_tasks_on_track: summary.key_total == 0 || summary.key_completion_rate.at_least(80),
            delay_elevated: summary.delay_rate.above(20),
        }
    }
}

/// Aggregate report over a date range.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    /// First day requested.
    pub start_date: NaiveDate,
    /// Last day requested.
    pub end_date: NaiveDate,
    /// Scope of the population.
    pub scope: ReportScope,
    /// Headline figures.
    pub summary: ReportSummary,
    /// Qualitative reading of the summary.
    pub assessment: Assessment,
    /// One point per week in the range.
    pub trend: Vec<WeekTrendPoint>,
    /// Figures per task type.
    pub task_types: Vec<TaskTypeBreakdown>,
    /// Figures per member; present only for team reports.
    pub members: Option<Vec<MemberBreakdown>>,
}

/// A task shown in a digest together with its review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DigestEntry {
    /// The task.
    pub task: Task,
    /// Its review, if one was recorded.
    pub review: Option<Review>,
}

/// One person's end-of-week report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WeeklyDigest {
    /// Person the digest belongs to.
    pub owner_id: UserId,
    /// Week covered.
    pub week: PlanningWeek,
    /// Headline figures for the week.
    pub summary: ReportSummary,
    /// Key tasks, listed first.
    pub key_tasks: Vec<DigestEntry>,
    /// Completed tasks.
    pub completed_tasks: Vec<Task>,
    /// Delayed or cancelled tasks.
    pub incomplete_tasks: Vec<DigestEntry>,
}
