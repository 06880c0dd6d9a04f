//! Carry-over and automatic fallback rollover of unfinished weekly work.

use super::error::{TaskServiceError, TaskServiceResult, load_owned_task};
use crate::task::{
    domain::{PlanningWeek, Review, ReviewOrigin, Task, TaskId, TaskStatus, UserId},
    ports::{TaskRepository, TaskRepositoryError},
};
use mockable::Clock;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Reason recorded on reviews synthesised for unreviewed tasks.
pub const DEFAULT_FALLBACK_REASON: &str = "deadline passed without review";

/// Per-item result of a rollover batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RolloverOutcome {
    /// Successor tasks created in the target week.
    pub created_task_ids: Vec<TaskId>,
    /// Source tasks that could not be rolled over.
    pub failed_task_ids: Vec<TaskId>,
    /// Source tasks left alone because a review already existed.
    pub skipped_task_ids: Vec<TaskId>,
}

impl RolloverOutcome {
    /// Returns `true` when the batch touched no task at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.created_task_ids.is_empty()
            && self.failed_task_ids.is_empty()
            && self.skipped_task_ids.is_empty()
    }
}

/// Fallback result for one owner inside a sweep.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OwnerRollover {
    /// Owner whose week was swept.
    pub owner_id: UserId,
    /// What happened to the owner's open tasks.
    pub outcome: RolloverOutcome,
}

/// Result of running the fallback for every owner with open work in a week.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SweepOutcome {
    /// Week that was swept.
    pub week: PlanningWeek,
    /// Per-owner outcomes, in owner order.
    pub per_owner: Vec<OwnerRollover>,
    /// Owners whose tasks could not be listed.
    pub failed_owner_ids: Vec<UserId>,
}

enum FallbackStep {
    Created(TaskId),
    Skipped,
}

/// Moves unfinished work into later weeks.
#[derive(Clone)]
pub struct RolloverService<R, C>
where
    R: TaskRepository,
    C: Clock + Send + Sync,
{
    repository: Arc<R>,
    clock: Arc<C>,
    fallback_reason: String,
}

impl<R, C> RolloverService<R, C>
where
    R: TaskRepository,
    C: Clock + Send + Sync,
{
    /// Creates a rollover service using [`DEFAULT_FALLBACK_REASON`].
    #[must_use]
    pub fn new(repository: Arc<R>, clock: Arc<C>) -> Self {
        Self {
            repository,
            clock,
            fallback_reason: DEFAULT_FALLBACK_REASON.to_owned(),
        }
    }

    /// Overrides the reason recorded on synthesised reviews.
    #[must_use]
    pub fn with_fallback_reason(mut self, reason: impl Into<String>) -> Self {
        self.fallback_reason = reason.into();
        self
    }

    /// Returns the reason recorded on synthesised reviews.
    #[must_use]
    pub fn fallback_reason(&self) -> &str {
        &self.fallback_reason
    }

    /// Creates successors in the target week for the actor's delayed tasks.
    ///
    /// Each id is processed independently. Unknown ids, tasks the actor does
    /// not own, tasks that are not delayed, tasks the fallback already rolled
    /// forward, targets not after the task's own week, and persistence
    /// failures land in `failed_task_ids`; the batch itself never aborts.
    ///
    /// # Errors
    ///
    /// Returns [`TaskServiceError::Domain`] only when the target week is not a
    /// valid ISO week.
    pub async fn carry_over(
        &self,
        actor: UserId,
        task_ids: &[TaskId],
        target_year: i32,
        target_week: u32,
    ) -> TaskServiceResult<RolloverOutcome> {
        let target = PlanningWeek::new(target_year, target_week)?;
        let mut outcome = RolloverOutcome::default();

        for &task_id in task_ids {
            match self.carry_over_one(actor, task_id, target).await {
                Ok(successor_id) => outcome.created_task_ids.push(successor_id),
                Err(err) => {
                    warn!(
                        task_id = %task_id,
                        target_week = %target,
                        error = %err,
                        "failed to carry task over"
                    );
                    outcome.failed_task_ids.push(task_id);
                }
            }
        }

        info!(
            owner_id = %actor,
            target_week = %target,
            created = outcome.created_task_ids.len(),
            failed = outcome.failed_task_ids.len(),
            "carry-over finished"
        );
        Ok(outcome)
    }

    async fn carry_over_one(
        &self,
        actor: UserId,
        task_id: TaskId,
        target: PlanningWeek,
    ) -> TaskServiceResult<TaskId> {
        let task = load_owned_task(&*self.repository, task_id, actor).await?;
        if task.status() != TaskStatus::Delayed {
            return Err(TaskServiceError::NotDelayed {
                task_id,
                status: task.status(),
            });
        }
        let rolled_by_fallback = self
            .repository
            .find_review(task_id)
            .await?
            .is_some_and(|review| review.origin() == ReviewOrigin::Fallback);
        if rolled_by_fallback {
            return Err(TaskServiceError::AlreadyRolledForward(task_id));
        }
        if target <= task.week() {
            return Err(TaskServiceError::TargetNotLater {
                task_id,
                week: task.week(),
                target,
            });
        }
        let successor = task.successor(target, &*self.clock)?;
        self.repository.store(&successor).await?;
        Ok(successor.id())
    }

    /// Rolls the owner's unreviewed open tasks in a week into the next week.
    ///
    /// Tasks that already carry a review are skipped. Every other `Todo` or
    /// `InProgress` task receives a synthesised review, becomes `Delayed`, and
    /// gains a successor in the following ISO week.
    ///
    /// # Errors
    ///
    /// Returns [`TaskServiceError::Domain`] for an invalid week and
    /// [`TaskServiceError::Repository`] when the owner's tasks cannot be
    /// listed. Per-task failures are reported in the outcome.
    pub async fn apply_review_fallback(
        &self,
        owner: UserId,
        year: i32,
        week: u32,
    ) -> TaskServiceResult<RolloverOutcome> {
        let planning_week = PlanningWeek::new(year, week)?;
        self.fallback_for_week(owner, planning_week).await
    }

    /// Runs the fallback for every owner with open tasks in `week`.
    ///
    /// An owner whose tasks cannot be listed is recorded in
    /// `failed_owner_ids` and the sweep moves on.
    ///
    /// # Errors
    ///
    /// Returns [`TaskServiceError::Repository`] when the owners cannot be
    /// enumerated.
    pub async fn sweep_week(&self, week: PlanningWeek) -> TaskServiceResult<SweepOutcome> {
        let owners = self.repository.owners_with_open_tasks(week).await?;
        let mut sweep = SweepOutcome {
            week,
            per_owner: Vec::with_capacity(owners.len()),
            failed_owner_ids: Vec::new(),
        };

        for owner_id in owners {
            match self.fallback_for_week(owner_id, week).await {
                Ok(outcome) => sweep.per_owner.push(OwnerRollover { owner_id, outcome }),
                Err(err) => {
                    warn!(
                        owner_id = %owner_id,
                        week = %week,
                        error = %err,
                        "fallback sweep failed for owner"
                    );
                    sweep.failed_owner_ids.push(owner_id);
                }
            }
        }

        info!(
            week = %week,
            owners = sweep.per_owner.len(),
            failed_owners = sweep.failed_owner_ids.len(),
            "fallback sweep finished"
        );
        Ok(sweep)
    }

    async fn fallback_for_week(
        &self,
        owner: UserId,
        week: PlanningWeek,
    ) -> TaskServiceResult<RolloverOutcome> {
        let next = week.next()?;
        let open_tasks: Vec<Task> = self
            .repository
            .find_by_owner_and_week(owner, week)
            .await?
            .into_iter()
            .filter(|task| task.status().is_open())
            .collect();
        let mut outcome = RolloverOutcome::default();

        for task in open_tasks {
            let task_id = task.id();
            match self.fallback_task(task, next).await {
                Ok(FallbackStep::Created(successor_id)) => {
                    outcome.created_task_ids.push(successor_id);
                }
                Ok(FallbackStep::Skipped) => {
                    debug!(task_id = %task_id, "task already reviewed; fallback skipped");
                    outcome.skipped_task_ids.push(task_id);
                }
                Err(err) => {
                    warn!(
                        task_id = %task_id,
                        week = %week,
                        error = %err,
                        "fallback rollover failed"
                    );
                    outcome.failed_task_ids.push(task_id);
                }
            }
        }

        if !outcome.is_empty() {
            info!(
                owner_id = %owner,
                week = %week,
                created = outcome.created_task_ids.len(),
                skipped = outcome.skipped_task_ids.len(),
                failed = outcome.failed_task_ids.len(),
                "review fallback applied"
            );
        }
        Ok(outcome)
    }

    async fn fallback_task(
        &self,
        mut task: Task,
        next: PlanningWeek,
    ) -> TaskServiceResult<FallbackStep> {
        if self.repository.find_review(task.id()).await?.is_some() {
            return Ok(FallbackStep::Skipped);
        }

        let review = Review::unreviewed_fallback(task.id(), &self.fallback_reason, &*self.clock);
        task.roll_forward_unreviewed(&review, &*self.clock)?;
        match self.repository.record_review(&review, &task).await {
            Ok(()) => {}
            Err(TaskRepositoryError::DuplicateReview(_)) => return Ok(FallbackStep::Skipped),
            Err(err) => return Err(err.into()),
        }

        let successor = task.successor(next, &*self.clock)?;
        self.repository.store(&successor).await?;
        Ok(FallbackStep::Created(successor.id()))
    }
}
