//! Error types for task domain validation and parsing.

use super::{TaskId, TaskStatus};
use chrono::{DateTime, Utc};
use thiserror::Error;

/// Errors returned while constructing or mutating domain task values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TaskDomainError {
    /// A start/end pair is not strictly ordered.
    #[error("invalid interval: start {start} must be before end {end}")]
    InvalidInterval {
        /// Start of the rejected interval.
        start: DateTime<Utc>,
        /// End of the rejected interval.
        end: DateTime<Utc>,
    },

    /// The ISO week number does not exist in the given ISO year.
    #[error("week {week} does not exist in ISO year {year}")]
    InvalidWeek {
        /// ISO week-numbering year.
        year: i32,
        /// Rejected week number.
        week: u32,
    },

    /// Week arithmetic left the supported calendar range.
    #[error("week arithmetic overflowed the supported calendar range")]
    WeekOutOfRange,

    /// The task title is empty after trimming.
    #[error("task title must not be empty")]
    EmptyTitle,

    /// The task title exceeds the stored column width.
    #[error("task title is {length} characters; at most {max} are allowed")]
    TitleTooLong {
        /// Character count of the rejected title.
        length: usize,
        /// Maximum accepted character count.
        max: usize,
    },

    /// Responsibility-derived tasks must reference a catalog task type.
    #[error("responsibility tasks must reference a task type")]
    MissingTaskType,

    /// The requested status change is not permitted by the state machine.
    #[error("task {task_id} cannot transition from {from} to {to}")]
    InvalidStateTransition {
        /// Task being transitioned.
        task_id: TaskId,
        /// Current status.
        from: TaskStatus,
        /// Requested status.
        to: TaskStatus,
    },

    /// Delayed and cancelled states are only reachable through a review or a
    /// rollover.
    #[error("task {task_id} cannot be set to {to} directly; submit a review instead")]
    ManualEscapeTransition {
        /// Task being updated.
        task_id: TaskId,
        /// Requested escape status.
        to: TaskStatus,
    },

    /// An incomplete review must explain why the work was not finished.
    #[error("an incomplete review requires a non-empty reason")]
    MissingIncompleteReason,

    /// The incomplete reason exceeds the stored column width.
    #[error("incomplete reason is {length} characters; at most {max} are allowed")]
    ReasonTooLong {
        /// Character count of the rejected reason.
        length: usize,
        /// Maximum accepted character count.
        max: usize,
    },

    /// Report comments must carry text.
    #[error("report comment must not be empty")]
    EmptyComment,

    /// An incomplete review must choose what happens to the work next.
    #[error("an incomplete review requires a follow-up action")]
    MissingFollowUpAction,
}

/// Error returned while parsing task statuses from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown task status: {0}")]
pub struct ParseTaskStatusError(pub String);

/// Error returned while parsing task sources from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown task source: {0}")]
pub struct ParseTaskSourceError(pub String);

/// Error returned while parsing review enumerations from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown review value: {0}")]
pub struct ParseReviewValueError(pub String);
