//! In-memory repository for weekly tasks, their reviews, and report comments.

use async_trait::async_trait;
use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::task::{
    domain::{CommentId, PlanningWeek, ReportComment, Review, Task, TaskId, TaskStatus, UserId},
    ports::{TaskRepository, TaskRepositoryError, TaskRepositoryResult},
};

/// Thread-safe in-memory task repository.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTaskRepository {
    state: Arc<RwLock<InMemoryTaskState>>,
}

#[derive(Debug, Default)]
struct InMemoryTaskState {
    tasks: HashMap<TaskId, Task>,
    owner_index: HashMap<UserId, Vec<TaskId>>,
    reviews: HashMap<TaskId, Review>,
    comments: HashMap<CommentId, ReportComment>,
}

impl InMemoryTaskRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> TaskRepositoryResult<RwLockReadGuard<'_, InMemoryTaskState>> {
        self.state.read().map_err(|err| {
            TaskRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })
    }

    fn write(&self) -> TaskRepositoryResult<RwLockWriteGuard<'_, InMemoryTaskState>> {
        self.state.write().map_err(|err| {
            TaskRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })
    }
}

/// Collects the owner's tasks matching `predicate`, oldest first.
fn owner_tasks(
    state: &InMemoryTaskState,
    owner: UserId,
    predicate: impl Fn(&Task) -> bool,
) -> Vec<Task> {
    let mut tasks: Vec<Task> = state
        .owner_index
        .get(&owner)
        .map(|ids| {
            ids.iter()
                .filter_map(|id| state.tasks.get(id))
                .filter(|&task| predicate(task))
                .cloned()
                .collect()
        })
        .unwrap_or_default();
    tasks.sort_by_key(|task| (task.created_at(), task.id()));
    tasks
}

#[async_trait]
impl TaskRepository for InMemoryTaskRepository {
    async fn store(&self, task: &Task) -> TaskRepositoryResult<()> {
        let mut state = self.write()?;
        if state.tasks.contains_key(&task.id()) {
            return Err(TaskRepositoryError::DuplicateTask(task.id()));
        }
        state
            .owner_index
            .entry(task.owner_id())
            .or_default()
            .push(task.id());
        state.tasks.insert(task.id(), task.clone());
        Ok(())
    }

    async fn update(&self, task: &Task) -> TaskRepositoryResult<()> {
        let mut state = self.write()?;
        let stored = state
            .tasks
            .get_mut(&task.id())
            .ok_or(TaskRepositoryError::NotFound(task.id()))?;
        *stored = task.clone();
        Ok(())
    }

    async fn find_by_id(&self, id: TaskId) -> TaskRepositoryResult<Option<Task>> {
        let state = self.read()?;
        Ok(state.tasks.get(&id).cloned())
    }

    async fn find_by_owner_and_week(
        &self,
        owner: UserId,
        week: PlanningWeek,
    ) -> TaskRepositoryResult<Vec<Task>> {
        let state = self.read()?;
        Ok(owner_tasks(&state, owner, |task| task.week() == week))
    }

    async fn find_by_owner_and_status(
        &self,
        owner: UserId,
        status: TaskStatus,
    ) -> TaskRepositoryResult<Vec<Task>> {
        let state = self.read()?;
        Ok(owner_tasks(&state, owner, |task| task.status() == status))
    }

    async fn find_by_owners_between(
        &self,
        owners: &[UserId],
        first: PlanningWeek,
        last: PlanningWeek,
    ) -> TaskRepositoryResult<Vec<Task>> {
        let state = self.read()?;
        let distinct: BTreeSet<UserId> = owners.iter().copied().collect();
        let mut tasks: Vec<Task> = distinct
            .into_iter()
            .flat_map(|owner| {
                owner_tasks(&state, owner, |task| (first..=last).contains(&task.week()))
            })
            .collect();
        tasks.sort_by_key(|task| (task.created_at(), task.id()));
        Ok(tasks)
    }

    async fn owners_with_open_tasks(
        &self,
        week: PlanningWeek,
    ) -> TaskRepositoryResult<Vec<UserId>> {
        let state = self.read()?;
        let owners: BTreeSet<UserId> = state
            .tasks
            .values()
            .filter(|task| task.week() == week && task.status().is_open())
            .map(Task::owner_id)
            .collect();
        Ok(owners.into_iter().collect())
    }

    async fn record_review(&self, review: &Review, task: &Task) -> TaskRepositoryResult<()> {
        let mut state = self.write()?;
        if state.reviews.contains_key(&task.id()) {
            return Err(TaskRepositoryError::DuplicateReview(task.id()));
        }
        let stored = state
            .tasks
            .get_mut(&task.id())
            .ok_or(TaskRepositoryError::NotFound(task.id()))?;
        *stored = task.clone();
        state.reviews.insert(task.id(), review.clone());
        Ok(())
    }

    async fn find_review(&self, task_id: TaskId) -> TaskRepositoryResult<Option<Review>> {
        let state = self.read()?;
        Ok(state.reviews.get(&task_id).cloned())
    }

    async fn store_comment(&self, comment: &ReportComment) -> TaskRepositoryResult<()> {
        let mut state = self.write()?;
        state.comments.insert(comment.id(), comment.clone());
        Ok(())
    }

    async fn update_comment(&self, comment: &ReportComment) -> TaskRepositoryResult<()> {
        let mut state = self.write()?;
        let stored = state
            .comments
            .get_mut(&comment.id())
            .ok_or(TaskRepositoryError::CommentNotFound(comment.id()))?;
        *stored = comment.clone();
        Ok(())
    }

    async fn find_comment(&self, id: CommentId) -> TaskRepositoryResult<Option<ReportComment>> {
        let state = self.read()?;
        Ok(state.comments.get(&id).cloned())
    }

    async fn find_comments(
        &self,
        member: UserId,
        week: PlanningWeek,
    ) -> TaskRepositoryResult<Vec<ReportComment>> {
        let state = self.read()?;
        let mut comments: Vec<ReportComment> = state
            .comments
            .values()
            .filter(|comment| comment.member_id() == member && comment.week() == week)
            .cloned()
            .collect();
        comments.sort_by_key(|comment| (comment.created_at(), comment.id()));
        Ok(comments)
    }
}
