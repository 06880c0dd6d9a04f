//! Service-level error taxonomy shared by the task services.

use crate::task::{
    domain::{PlanningWeek, Task, TaskDomainError, TaskId, TaskStatus, UserId},
    ports::{TaskRepository, TaskRepositoryError},
};
use thiserror::Error;

/// Transport-agnostic classification of service failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Malformed or missing caller input; never retried.
    Validation,
    /// A start/end pair is misordered.
    InvalidInterval,
    /// The task or review does not exist.
    NotFound,
    /// The caller does not own the task.
    Forbidden,
    /// The operation collides with existing state, such as a second review.
    Conflict,
    /// Persistence failed; the caller decides whether to retry.
    Internal,
}

/// Service-level errors for task operations.
#[derive(Debug, Error)]
pub enum TaskServiceError {
    /// Domain validation failed.
    #[error(transparent)]
    Domain(#[from] TaskDomainError),

    /// Repository operation failed.
    #[error(transparent)]
    Repository(#[from] TaskRepositoryError),

    /// The task does not exist.
    #[error("task not found: {0}")]
    NotFound(TaskId),

    /// The caller is not the task owner.
    #[error("user {actor} does not own task {task_id}")]
    Forbidden {
        /// Task the caller tried to access.
        task_id: TaskId,
        /// Caller identity.
        actor: UserId,
    },

    /// The task already has a review.
    #[error("task {0} has already been reviewed")]
    ReviewConflict(TaskId),

    /// Only delayed tasks can be carried over.
    #[error("task {task_id} is {status}; only delayed tasks can be carried over")]
    NotDelayed {
        /// Task the caller tried to carry over.
        task_id: TaskId,
        /// Its current status.
        status: TaskStatus,
    },

    /// The automatic fallback already created this task's successor.
    #[error("task {0} was already rolled forward by the review fallback")]
    AlreadyRolledForward(TaskId),

    /// Carry-over must move work into a later week.
    #[error("task {task_id} belongs to {week}; cannot carry it over to {target}")]
    TargetNotLater {
        /// Task the caller tried to carry over.
        task_id: TaskId,
        /// Week the task is planned in.
        week: PlanningWeek,
        /// Requested target week.
        target: PlanningWeek,
    },
}

impl TaskServiceError {
    /// Classifies the error for transports and callers.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Domain(TaskDomainError::InvalidInterval { .. }) => ErrorKind::InvalidInterval,
            Self::Domain(_) | Self::NotDelayed { .. } | Self::TargetNotLater { .. } => {
                ErrorKind::Validation
            }
            Self::NotFound(_)
            | Self::Repository(
                TaskRepositoryError::NotFound(_) | TaskRepositoryError::CommentNotFound(_),
            ) => ErrorKind::NotFound,
            Self::Forbidden { .. } => ErrorKind::Forbidden,
            Self::ReviewConflict(_)
            | Self::AlreadyRolledForward(_)
            | Self::Repository(
                TaskRepositoryError::DuplicateReview(_) | TaskRepositoryError::DuplicateTask(_),
            ) => ErrorKind::Conflict,
            Self::Repository(TaskRepositoryError::Persistence(_)) => ErrorKind::Internal,
        }
    }
}

/// Result type for task service operations.
pub type TaskServiceResult<T> = Result<T, TaskServiceError>;

/// Loads a task and evaluates the owner precondition.
pub(super) async fn load_owned_task<R>(
    repository: &R,
    task_id: TaskId,
    actor: UserId,
) -> TaskServiceResult<Task>
where
    R: TaskRepository + ?Sized,
{
    let task = repository
        .find_by_id(task_id)
        .await?
        .ok_or(TaskServiceError::NotFound(task_id))?;
    if !task.is_owned_by(actor) {
        return Err(TaskServiceError::Forbidden { task_id, actor });
    }
    Ok(task)
}
