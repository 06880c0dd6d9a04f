//! Repository port for weekly task, review, and report comment persistence.

use crate::task::domain::{
    CommentId, PlanningWeek, ReportComment, Review, Task, TaskId, TaskStatus, UserId,
};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for task repository operations.
pub type TaskRepositoryResult<T> = Result<T, TaskRepositoryError>;

/// Task, review, and report comment persistence contract.
///
/// Lookups that return several tasks or comments order them by creation
/// time.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// Stores a new task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::DuplicateTask`] when the task ID already
    /// exists.
    async fn store(&self, task: &Task) -> TaskRepositoryResult<()>;

    /// Persists changes to an existing task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::NotFound`] when the task does not exist.
    async fn update(&self, task: &Task) -> TaskRepositoryResult<()>;

    /// Finds a task by identifier.
    ///
    /// Returns `None` when the task does not exist.
    async fn find_by_id(&self, id: TaskId) -> TaskRepositoryResult<Option<Task>>;

    /// Returns the owner's tasks scheduled in `week`.
    async fn find_by_owner_and_week(
        &self,
        owner: UserId,
        week: PlanningWeek,
    ) -> TaskRepositoryResult<Vec<Task>>;

    /// Returns the owner's tasks currently in `status`.
    async fn find_by_owner_and_status(
        &self,
        owner: UserId,
        status: TaskStatus,
    ) -> TaskRepositoryResult<Vec<Task>>;

    /// Returns every task of the given owners scheduled from `first` through
    /// `last` inclusive.
    async fn find_by_owners_between(
        &self,
        owners: &[UserId],
        first: PlanningWeek,
        last: PlanningWeek,
    ) -> TaskRepositoryResult<Vec<Task>>;

    /// Returns the distinct owners with `Todo` or `InProgress` tasks in `week`.
    async fn owners_with_open_tasks(&self, week: PlanningWeek) -> TaskRepositoryResult<Vec<UserId>>;

    /// Stores a review together with the reviewed task's new state.
    ///
    /// Both writes succeed or neither does.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::DuplicateReview`] when the task already
    /// has a review, or [`TaskRepositoryError::NotFound`] when the task does
    /// not exist.
    async fn record_review(&self, review: &Review, task: &Task) -> TaskRepositoryResult<()>;

    /// Finds the review recorded for a task.
    ///
    /// Returns `None` when the task has not been reviewed.
    async fn find_review(&self, task_id: TaskId) -> TaskRepositoryResult<Option<Review>>;

    /// Stores a new report comment.
    async fn store_comment(&self, comment: &ReportComment) -> TaskRepositoryResult<()>;

    /// Persists changes to an existing report comment.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::CommentNotFound`] when the comment does
    /// not exist.
    async fn update_comment(&self, comment: &ReportComment) -> TaskRepositoryResult<()>;

    /// Finds a report comment by identifier.
    async fn find_comment(&self, id: CommentId) -> TaskRepositoryResult<Option<ReportComment>>;

    /// Returns every comment left on `member`'s report for `week`.
    async fn find_comments(
        &self,
        member: UserId,
        week: PlanningWeek,
    ) -> TaskRepositoryResult<Vec<ReportComment>>;
}

/// Errors returned by task repository implementations.
#[derive(Debug, Clone, Error)]
pub enum TaskRepositoryError {
    /// A task with the same identifier already exists.
    #[error("duplicate task identifier: {0}")]
    DuplicateTask(TaskId),

    /// The task already has a review.
    #[error("task {0} has already been reviewed")]
    DuplicateReview(TaskId),

    /// The task was not found.
    #[error("task not found: {0}")]
    NotFound(TaskId),

    /// The report comment was not found.
    #[error("report comment not found: {0}")]
    CommentNotFound(CommentId),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl TaskRepositoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
