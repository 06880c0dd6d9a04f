//! Service layer for weekly task planning and owner updates.

use super::error::{TaskServiceResult, load_owned_task};
use crate::task::{
    domain::{
        PlanningWeek, ReviewOrigin, Task, TaskChanges, TaskDraft, TaskId, TaskSource, TaskStatus,
        TaskTypeId, UserId,
    },
    ports::TaskRepository,
};
use chrono::{DateTime, Utc};
use mockable::Clock;
use std::sync::Arc;
use tracing::{debug, info};

/// Request payload for planning a weekly task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateTaskRequest {
    title: String,
    year: i32,
    week: u32,
    planned_start: DateTime<Utc>,
    planned_end: DateTime<Utc>,
    description: Option<String>,
    source: TaskSource,
    task_type_id: Option<TaskTypeId>,
    is_key_task: bool,
}

impl CreateTaskRequest {
    /// Creates a request with required scheduling fields.
    ///
    /// The source defaults to [`TaskSource::Responsibility`], which requires
    /// a task type reference.
    #[must_use]
    pub fn new(
        title: impl Into<String>,
        year: i32,
        week: u32,
        planned_start: DateTime<Utc>,
        planned_end: DateTime<Utc>,
    ) -> Self {
        Self {
            title: title.into(),
            year,
            week,
            planned_start,
            planned_end,
            description: None,
            source: TaskSource::Responsibility,
            task_type_id: None,
            is_key_task: false,
        }
    }

    /// Sets the task description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the task source.
    #[must_use]
    pub const fn with_source(mut self, source: TaskSource) -> Self {
        self.source = source;
        self
    }

    /// Links the task to a catalog task type.
    #[must_use]
    pub const fn with_task_type(mut self, task_type_id: TaskTypeId) -> Self {
        self.task_type_id = Some(task_type_id);
        self
    }

    /// Flags the task as key work.
    #[must_use]
    pub const fn as_key_task(mut self) -> Self {
        self.is_key_task = true;
        self
    }

    fn into_draft(
        self,
        owner_id: UserId,
        assigned_by: Option<UserId>,
    ) -> TaskServiceResult<TaskDraft> {
        let week = PlanningWeek::new(self.year, self.week)?;
        Ok(TaskDraft {
            owner_id,
            assigned_by,
            week,
            title: self.title,
            description: self.description,
            source: self.source,
            task_type_id: self.task_type_id,
            is_key_task: self.is_key_task,
            planned_start: self.planned_start,
            planned_end: self.planned_end,
        })
    }
}

/// Request payload for a partial task update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateTaskRequest {
    task_id: TaskId,
    changes: TaskChanges,
}

impl UpdateTaskRequest {
    /// Creates an update that changes nothing yet.
    #[must_use]
    pub fn new(task_id: TaskId) -> Self {
        Self {
            task_id,
            changes: TaskChanges::default(),
        }
    }

    /// Replaces the title.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.changes.title = Some(title.into());
        self
    }

    /// Replaces the description; a blank value clears it.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.changes.description = Some(description.into());
        self
    }

    /// Sets or clears the key-task flag.
    #[must_use]
    pub const fn with_key_task(mut self, is_key_task: bool) -> Self {
        self.changes.is_key_task = Some(is_key_task);
        self
    }

    /// Moves the planned start.
    #[must_use]
    pub const fn with_planned_start(mut self, start: DateTime<Utc>) -> Self {
        self.changes.planned_start = Some(start);
        self
    }

    /// Moves the planned end.
    #[must_use]
    pub const fn with_planned_end(mut self, end: DateTime<Utc>) -> Self {
        self.changes.planned_end = Some(end);
        self
    }

    /// Records when work actually started.
    #[must_use]
    pub const fn with_actual_start(mut self, start: DateTime<Utc>) -> Self {
        self.changes.actual_start = Some(start);
        self
    }

    /// Records when work actually ended.
    #[must_use]
    pub const fn with_actual_end(mut self, end: DateTime<Utc>) -> Self {
        self.changes.actual_end = Some(end);
        self
    }

    /// Requests a status change.
    #[must_use]
    pub const fn with_status(mut self, status: TaskStatus) -> Self {
        self.changes.status = Some(status);
        self
    }
}

/// Weekly task planning and update service.
#[derive(Clone)]
pub struct TaskLifecycleService<R, C>
where
    R: TaskRepository,
    C: Clock + Send + Sync,
{
    repository: Arc<R>,
    clock: Arc<C>,
}

impl<R, C> TaskLifecycleService<R, C>
where
    R: TaskRepository,
    C: Clock + Send + Sync,
{
    /// Creates a new task lifecycle service.
    #[must_use]
    pub const fn new(repository: Arc<R>, clock: Arc<C>) -> Self {
        Self { repository, clock }
    }

    /// Plans a task owned by `owner`.
    ///
    /// # Errors
    ///
    /// Returns [`super::TaskServiceError::Domain`] for an invalid week, blank
    /// title, misordered window, or missing task type, and
    /// [`super::TaskServiceError::Repository`] when persistence fails.
    pub async fn create_task(
        &self,
        owner: UserId,
        request: CreateTaskRequest,
    ) -> TaskServiceResult<Task> {
        let draft = request.into_draft(owner, None)?;
        self.persist_new(draft).await
    }

    /// Plans a task on behalf of a subordinate.
    ///
    /// The reporting line between `manager` and `owner` is verified by the
    /// caller; the task is recorded as manager-assigned.
    ///
    /// # Errors
    ///
    /// Returns the same errors as [`Self::create_task`].
    pub async fn assign_task(
        &self,
        manager: UserId,
        owner: UserId,
        request: CreateTaskRequest,
    ) -> TaskServiceResult<Task> {
        let draft = request
            .with_source(TaskSource::ManagerAssigned)
            .into_draft(owner, Some(manager))?;
        self.persist_new(draft).await
    }

    async fn persist_new(&self, draft: TaskDraft) -> TaskServiceResult<Task> {
        let task = Task::plan(draft, &*self.clock)?;
        self.repository.store(&task).await?;
        info!(
            task_id = %task.id(),
            owner_id = %task.owner_id(),
            week = %task.week(),
            source = %task.source(),
            planned_minutes = task.planned_duration_minutes(),
            "planned weekly task"
        );
        Ok(task)
    }

    /// Applies a partial update to a task the actor owns.
    ///
    /// # Errors
    ///
    /// Returns [`super::TaskServiceError::NotFound`],
    /// [`super::TaskServiceError::Forbidden`], or
    /// [`super::TaskServiceError::Domain`] when the change violates interval or
    /// state machine rules.
    pub async fn update_task(
        &self,
        actor: UserId,
        request: UpdateTaskRequest,
    ) -> TaskServiceResult<Task> {
        let UpdateTaskRequest { task_id, changes } = request;
        let mut task = load_owned_task(&*self.repository, task_id, actor).await?;
        let previous_status = task.status();

        task.apply_changes(changes, &*self.clock)?;
        self.repository.update(&task).await?;

        if task.status() == previous_status {
            debug!(task_id = %task_id, "updated weekly task");
        } else {
            info!(
                task_id = %task_id,
                from = %previous_status,
                to = %task.status(),
                "weekly task changed status"
            );
        }
        Ok(task)
    }

    /// Fetches a task the actor owns.
    ///
    /// # Errors
    ///
    /// Returns [`super::TaskServiceError::NotFound`] or
    /// [`super::TaskServiceError::Forbidden`].
    pub async fn get_task(&self, actor: UserId, task_id: TaskId) -> TaskServiceResult<Task> {
        load_owned_task(&*self.repository, task_id, actor).await
    }

    /// Lists the owner's tasks for a week, key tasks first, then by creation
    /// time.
    ///
    /// `key_tasks` narrows the list to key (`Some(true)`) or non-key
    /// (`Some(false)`) tasks.
    ///
    /// # Errors
    ///
    /// Returns [`super::TaskServiceError::Domain`] for an invalid week or
    /// [`super::TaskServiceError::Repository`] when lookup fails.
    pub async fn list_week_tasks(
        &self,
        owner: UserId,
        year: i32,
        week: u32,
        key_tasks: Option<bool>,
    ) -> TaskServiceResult<Vec<Task>> {
        let planning_week = PlanningWeek::new(year, week)?;
        let mut tasks: Vec<Task> = self
            .repository
            .find_by_owner_and_week(owner, planning_week)
            .await?
            .into_iter()
            .filter(|task| key_tasks.is_none_or(|wanted| task.is_key_task() == wanted))
            .collect();
        tasks.sort_by_key(|task| (!task.is_key_task(), task.created_at()));
        Ok(tasks)
    }

    /// Lists the owner's delayed tasks still waiting to be carried over.
    ///
    /// Tasks the review fallback rolled forward already have a successor and
    /// are left out.
    ///
    /// # Errors
    ///
    /// Returns [`super::TaskServiceError::Repository`] when lookup fails.
    pub async fn list_delayed_tasks(&self, owner: UserId) -> TaskServiceResult<Vec<Task>> {
        let delayed = self
            .repository
            .find_by_owner_and_status(owner, TaskStatus::Delayed)
            .await?;
        let mut waiting = Vec::with_capacity(delayed.len());
        for task in delayed {
            let review = self.repository.find_review(task.id()).await?;
            if review.is_none_or(|found| found.origin() != ReviewOrigin::Fallback) {
                waiting.push(task);
            }
        }
        Ok(waiting)
    }
}
