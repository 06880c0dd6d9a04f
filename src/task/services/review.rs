//! Service layer for end-of-week task reviews.

use super::error::{TaskServiceError, TaskServiceResult, load_owned_task};
use crate::task::{
    domain::{FollowUpAction, Review, ReviewVerdict, Task, TaskId, UserId},
    ports::{TaskRepository, TaskRepositoryError},
};
use mockable::Clock;
use std::sync::Arc;
use tracing::info;

/// Request payload for reviewing a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitReviewRequest {
    task_id: TaskId,
    verdict: ReviewVerdict,
}

impl SubmitReviewRequest {
    /// Creates a verdict stating the work was finished.
    #[must_use]
    pub const fn completed(task_id: TaskId) -> Self {
        Self {
            task_id,
            verdict: ReviewVerdict {
                is_completed: true,
                incomplete_reason: None,
                follow_up_action: None,
                notes: None,
            },
        }
    }

    /// Creates a verdict stating the work was not finished.
    #[must_use]
    pub fn incomplete(
        task_id: TaskId,
        reason: impl Into<String>,
        follow_up_action: FollowUpAction,
    ) -> Self {
        Self {
            task_id,
            verdict: ReviewVerdict {
                is_completed: false,
                incomplete_reason: Some(reason.into()),
                follow_up_action: Some(follow_up_action),
                notes: None,
            },
        }
    }

    /// Creates a request from a raw verdict, leaving validation to the
    /// service.
    #[must_use]
    pub const fn from_verdict(task_id: TaskId, verdict: ReviewVerdict) -> Self {
        Self { task_id, verdict }
    }

    /// Attaches free-text notes.
    #[must_use]
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.verdict.notes = Some(notes.into());
        self
    }

    /// Returns the reviewed task identifier.
    #[must_use]
    pub const fn task_id(&self) -> TaskId {
        self.task_id
    }
}

/// Review together with the task state it produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewSubmission {
    /// The recorded review.
    pub review: Review,
    /// The task after the verdict was applied.
    pub task: Task,
}

/// Owner-driven task review service.
#[derive(Clone)]
pub struct TaskReviewService<R, C>
where
    R: TaskRepository,
    C: Clock + Send + Sync,
{
    repository: Arc<R>,
    clock: Arc<C>,
}

impl<R, C> TaskReviewService<R, C>
where
    R: TaskRepository,
    C: Clock + Send + Sync,
{
    /// Creates a new review service.
    #[must_use]
    pub const fn new(repository: Arc<R>, clock: Arc<C>) -> Self {
        Self { repository, clock }
    }

    /// Records the owner's verdict and moves the task to the matching status.
    ///
    /// Preconditions are checked in order: the task exists, the actor owns
    /// it, it has not been reviewed, and the verdict is well formed.
    ///
    /// # Errors
    ///
    /// Returns [`TaskServiceError::NotFound`], [`TaskServiceError::Forbidden`],
    /// [`TaskServiceError::ReviewConflict`], or
    /// [`TaskServiceError::Domain`] when the verdict is incomplete or cannot
    /// follow the task's status.
    pub async fn submit_review(
        &self,
        actor: UserId,
        request: SubmitReviewRequest,
    ) -> TaskServiceResult<ReviewSubmission> {
        let SubmitReviewRequest { task_id, verdict } = request;
        let mut task = load_owned_task(&*self.repository, task_id, actor).await?;
        if self.repository.find_review(task_id).await?.is_some() {
            return Err(TaskServiceError::ReviewConflict(task_id));
        }

        let review = Review::submit(task_id, verdict, &*self.clock)?;
        task.apply_review(&review, &*self.clock)?;

        match self.repository.record_review(&review, &task).await {
            Ok(()) => {}
            Err(TaskRepositoryError::DuplicateReview(id)) => {
                return Err(TaskServiceError::ReviewConflict(id));
            }
            Err(err) => return Err(err.into()),
        }

        info!(
            task_id = %task_id,
            review_id = %review.id(),
            completed = review.is_completed(),
            status = %task.status(),
            "recorded task review"
        );
        Ok(ReviewSubmission { review, task })
    }

    /// Fetches the review recorded for a task the actor owns.
    ///
    /// # Errors
    ///
    /// Returns [`TaskServiceError::NotFound`] or
    /// [`TaskServiceError::Forbidden`] for the task, or
    /// [`TaskServiceError::Repository`] when lookup fails.
    pub async fn get_review(
        &self,
        actor: UserId,
        task_id: TaskId,
    ) -> TaskServiceResult<Option<Review>> {
        load_owned_task(&*self.repository, task_id, actor).await?;
        Ok(self.repository.find_review(task_id).await?)
    }
}
