//! Weekly task aggregate root and its lifecycle types.

use super::{
    ParseTaskSourceError, ParseTaskStatusError, PlanningWeek, Review, TaskDomainError, TaskId,
    TaskTypeId, TimeWindow, UserId, duration::minutes_between,
};
use chrono::{DateTime, Duration, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Longest task title accepted, in characters.
pub const MAX_TITLE_CHARS: usize = 500;

/// Offset applied to the planned window when work rolls into a later week.
const ROLLOVER_OFFSET_DAYS: i64 = 7;

/// Task lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Task is planned but work has not started.
    Todo,
    /// Task is being worked on.
    InProgress,
    /// Task has been finished.
    Completed,
    /// Task was not finished and its work moves to a later week.
    Delayed,
    /// Task was abandoned.
    Cancelled,
}

impl TaskStatus {
    /// Every status, in lifecycle order.
    pub const ALL: [Self; 5] = [
        Self::Todo,
        Self::InProgress,
        Self::Completed,
        Self::Delayed,
        Self::Cancelled,
    ];

    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Todo => "todo",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Delayed => "delayed",
            Self::Cancelled => "cancelled",
        }
    }

    /// Returns whether the task is still awaiting a review outcome.
    #[must_use]
    pub const fn is_open(self) -> bool {
        matches!(self, Self::Todo | Self::InProgress)
    }

    /// Returns whether ordinary mutation can no longer change the status.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        !self.is_open()
    }

    /// Returns whether the state machine permits moving to `target`.
    #[must_use]
    pub const fn can_transition_to(self, target: Self) -> bool {
        matches!(
            (self, target),
            (
                Self::Todo,
                Self::InProgress | Self::Completed | Self::Delayed | Self::Cancelled
            ) | (
                Self::InProgress,
                Self::Completed | Self::Delayed | Self::Cancelled
            )
        )
    }

    /// Returns whether callers may request this status through an update.
    const fn is_escape(self) -> bool {
        matches!(self, Self::Delayed | Self::Cancelled)
    }
}

impl TryFrom<&str> for TaskStatus {
    type Error = ParseTaskStatusError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == normalized)
            .ok_or_else(|| ParseTaskStatusError(value.to_owned()))
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a weekly task came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskSource {
    /// Derived from one of the owner's job responsibilities.
    Responsibility,
    /// Assigned by a manager.
    ManagerAssigned,
    /// Ad hoc personal work.
    Personal,
}

impl TaskSource {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Responsibility => "responsibility",
            Self::ManagerAssigned => "manager_assigned",
            Self::Personal => "personal",
        }
    }
}

impl TryFrom<&str> for TaskSource {
    type Error = ParseTaskSourceError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "responsibility" => Ok(Self::Responsibility),
            "manager_assigned" => Ok(Self::ManagerAssigned),
            "personal" => Ok(Self::Personal),
            _ => Err(ParseTaskSourceError(value.to_owned())),
        }
    }
}

impl fmt::Display for TaskSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parameter object for planning a new task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskDraft {
    /// Person who owns and executes the task.
    pub owner_id: UserId,
    /// Manager who assigned the task, if any.
    pub assigned_by: Option<UserId>,
    /// Week the task is scheduled in.
    pub week: PlanningWeek,
    /// Short task title.
    pub title: String,
    /// Optional longer description.
    pub description: Option<String>,
    /// Task origin.
    pub source: TaskSource,
    /// Catalog task type reference.
    pub task_type_id: Option<TaskTypeId>,
    /// Whether the task is flagged as key work.
    pub is_key_task: bool,
    /// Planned start timestamp.
    pub planned_start: DateTime<Utc>,
    /// Planned end timestamp.
    pub planned_end: DateTime<Utc>,
}

/// Partial set of caller-editable task fields.
///
/// `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskChanges {
    /// Replacement title.
    pub title: Option<String>,
    /// Replacement description; a blank value clears it.
    pub description: Option<String>,
    /// Replacement key-task flag.
    pub is_key_task: Option<bool>,
    /// Replacement planned start.
    pub planned_start: Option<DateTime<Utc>>,
    /// Replacement planned end.
    pub planned_end: Option<DateTime<Utc>>,
    /// Explicit actual start.
    pub actual_start: Option<DateTime<Utc>>,
    /// Explicit actual end.
    pub actual_end: Option<DateTime<Utc>>,
    /// Requested status.
    pub status: Option<TaskStatus>,
}

/// Weekly task aggregate root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    id: TaskId,
    owner_id: UserId,
    assigned_by: Option<UserId>,
    week: PlanningWeek,
    title: String,
    description: Option<String>,
    source: TaskSource,
    task_type_id: Option<TaskTypeId>,
    is_key_task: bool,
    planned: TimeWindow,
    planned_duration_minutes: i64,
    actual_start: Option<DateTime<Utc>>,
    actual_end: Option<DateTime<Utc>>,
    actual_duration_minutes: Option<i64>,
    status: TaskStatus,
    completed_at: Option<DateTime<Utc>>,
    is_delayed_from_previous: bool,
    original_week: Option<u32>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted task aggregate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedTaskData {
    /// Persisted task identifier.
    pub id: TaskId,
    /// Persisted owner.
    pub owner_id: UserId,
    /// Persisted assigning manager.
    pub assigned_by: Option<UserId>,
    /// Persisted planning week.
    pub week: PlanningWeek,
    /// Persisted title.
    pub title: String,
    /// Persisted description.
    pub description: Option<String>,
    /// Persisted source.
    pub source: TaskSource,
    /// Persisted task type reference.
    pub task_type_id: Option<TaskTypeId>,
    /// Persisted key-task flag.
    pub is_key_task: bool,
    /// Persisted planned window.
    pub planned: TimeWindow,
    /// Persisted actual start.
    pub actual_start: Option<DateTime<Utc>>,
    /// Persisted actual end.
    pub actual_end: Option<DateTime<Utc>>,
    /// Persisted status.
    pub status: TaskStatus,
    /// Persisted completion timestamp.
    pub completed_at: Option<DateTime<Utc>>,
    /// Persisted rollover flag.
    pub is_delayed_from_previous: bool,
    /// Persisted lineage week.
    pub original_week: Option<u32>,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Persisted latest mutation timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Plans a new task in the `Todo` state.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::EmptyTitle`] for a blank title,
    /// [`TaskDomainError::TitleTooLong`] past [`MAX_TITLE_CHARS`],
    /// [`TaskDomainError::MissingTaskType`] when a responsibility task has no
    /// task type, or [`TaskDomainError::InvalidInterval`] when the planned
    /// window is not ordered.
    pub fn plan(draft: TaskDraft, clock: &impl Clock) -> Result<Self, TaskDomainError> {
        let title = normalize_title(draft.title)?;
        if draft.source == TaskSource::Responsibility && draft.task_type_id.is_none() {
            return Err(TaskDomainError::MissingTaskType);
        }
        let planned = TimeWindow::new(draft.planned_start, draft.planned_end)?;
        let timestamp = clock.utc();

        Ok(Self {
            id: TaskId::new(),
            owner_id: draft.owner_id,
            assigned_by: draft.assigned_by,
            week: draft.week,
            title,
            description: normalize_description(draft.description),
            source: draft.source,
            task_type_id: draft.task_type_id,
            is_key_task: draft.is_key_task,
            planned,
            planned_duration_minutes: planned.minutes(),
            actual_start: None,
            actual_end: None,
            actual_duration_minutes: None,
            status: TaskStatus::Todo,
            completed_at: None,
            is_delayed_from_previous: false,
            original_week: None,
            created_at: timestamp,
            updated_at: timestamp,
        })
    }

    /// Reconstructs a task from persisted storage.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::InvalidInterval`] when the persisted actual
    /// timestamps are misordered.
    pub fn from_persisted(data: PersistedTaskData) -> Result<Self, TaskDomainError> {
        let actual_duration_minutes = actual_minutes(data.actual_start, data.actual_end)?;
        Ok(Self {
            id: data.id,
            owner_id: data.owner_id,
            assigned_by: data.assigned_by,
            week: data.week,
            title: data.title,
            description: data.description,
            source: data.source,
            task_type_id: data.task_type_id,
            is_key_task: data.is_key_task,
            planned_duration_minutes: data.planned.minutes(),
            planned: data.planned,
            actual_start: data.actual_start,
            actual_end: data.actual_end,
            actual_duration_minutes,
            status: data.status,
            completed_at: data.completed_at,
            is_delayed_from_previous: data.is_delayed_from_previous,
            original_week: data.original_week,
            created_at: data.created_at,
            updated_at: data.updated_at,
        })
    }

    /// Returns the task identifier.
    #[must_use]
    pub const fn id(&self) -> TaskId {
        self.id
    }

    /// Returns the owning person.
    #[must_use]
    pub const fn owner_id(&self) -> UserId {
        self.owner_id
    }

    /// Returns whether `user` owns this task.
    #[must_use]
    pub fn is_owned_by(&self, user: UserId) -> bool {
        self.owner_id == user
    }

    /// Returns the assigning manager, if any.
    #[must_use]
    pub const fn assigned_by(&self) -> Option<UserId> {
        self.assigned_by
    }

    /// Returns the planning week.
    #[must_use]
    pub const fn week(&self) -> PlanningWeek {
        self.week
    }

    /// Returns the task title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns the task description, if any.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns the task source.
    #[must_use]
    pub const fn source(&self) -> TaskSource {
        self.source
    }

    /// Returns the catalog task type reference, if any.
    #[must_use]
    pub const fn task_type_id(&self) -> Option<TaskTypeId> {
        self.task_type_id
    }

    /// Returns whether the task is key work.
    #[must_use]
    pub const fn is_key_task(&self) -> bool {
        self.is_key_task
    }

    /// Returns the planned window.
    #[must_use]
    pub const fn planned(&self) -> TimeWindow {
        self.planned
    }

    /// Returns the planned duration in minutes.
    #[must_use]
    pub const fn planned_duration_minutes(&self) -> i64 {
        self.planned_duration_minutes
    }

    /// Returns when work actually started.
    #[must_use]
    pub const fn actual_start(&self) -> Option<DateTime<Utc>> {
        self.actual_start
    }

    /// Returns when work actually ended.
    #[must_use]
    pub const fn actual_end(&self) -> Option<DateTime<Utc>> {
        self.actual_end
    }

    /// Returns the actual duration in minutes once both bounds are known.
    #[must_use]
    pub const fn actual_duration_minutes(&self) -> Option<i64> {
        self.actual_duration_minutes
    }

    /// Returns the lifecycle status.
    #[must_use]
    pub const fn status(&self) -> TaskStatus {
        self.status
    }

    /// Returns when the task was completed.
    #[must_use]
    pub const fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    /// Returns whether this task carries work from an earlier week.
    #[must_use]
    pub const fn is_delayed_from_previous(&self) -> bool {
        self.is_delayed_from_previous
    }

    /// Returns the week number this work was scheduled in one hop back.
    #[must_use]
    pub const fn original_week(&self) -> Option<u32> {
        self.original_week
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the latest mutation timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Applies a caller-supplied partial update.
    ///
    /// The update is all-or-nothing: on error the task is left untouched.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::InvalidInterval`] when the effective planned
    /// or actual pair is misordered, [`TaskDomainError::EmptyTitle`] for a
    /// blank title, [`TaskDomainError::ManualEscapeTransition`] when the
    /// update asks for `Delayed` or `Cancelled`, and
    /// [`TaskDomainError::InvalidStateTransition`] for other forbidden moves.
    pub fn apply_changes(
        &mut self,
        changes: TaskChanges,
        clock: &impl Clock,
    ) -> Result<(), TaskDomainError> {
        let now = clock.utc();
        let mut next = self.clone();

        if let Some(title) = changes.title {
            next.title = normalize_title(title)?;
        }
        if let Some(description) = changes.description {
            next.description = normalize_description(Some(description));
        }
        if let Some(is_key_task) = changes.is_key_task {
            next.is_key_task = is_key_task;
        }
        if changes.planned_start.is_some() || changes.planned_end.is_some() {
            let start = changes.planned_start.unwrap_or_else(|| self.planned.start());
            let end = changes.planned_end.unwrap_or_else(|| self.planned.end());
            next.planned = TimeWindow::new(start, end)?;
            next.planned_duration_minutes = next.planned.minutes();
        }
        if changes.actual_start.is_some() {
            next.actual_start = changes.actual_start;
        }
        if changes.actual_end.is_some() {
            next.actual_end = changes.actual_end;
        }

        if let Some(target) = changes.status.filter(|status| *status != self.status) {
            if target.is_escape() {
                return Err(TaskDomainError::ManualEscapeTransition {
                    task_id: self.id,
                    to: target,
                });
            }
            next.ensure_transition(target)?;
            match target {
                TaskStatus::InProgress => {
                    next.actual_start.get_or_insert(now);
                }
                TaskStatus::Completed => {
                    next.completed_at = Some(now);
                    if changes.actual_end.is_none()
                        && next.actual_start.is_none_or(|start| start < now)
                    {
                        next.actual_end = Some(now);
                    }
                }
                TaskStatus::Todo | TaskStatus::Delayed | TaskStatus::Cancelled => {}
            }
            next.status = target;
        }

        next.actual_duration_minutes = actual_minutes(next.actual_start, next.actual_end)?;
        next.updated_at = now;
        *self = next;
        Ok(())
    }

    /// Maps a review verdict onto the task status.
    ///
    /// A completed verdict on a task that is already completed keeps the
    /// original completion stamp. The review time becomes the actual end only
    /// when it falls after a recorded actual start.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::InvalidStateTransition`] when the verdict
    /// cannot follow the current status.
    pub fn apply_review(
        &mut self,
        review: &Review,
        clock: &impl Clock,
    ) -> Result<(), TaskDomainError> {
        let target = review.resulting_status();
        let now = clock.utc();
        if self.status == TaskStatus::Completed && target == TaskStatus::Completed {
            self.updated_at = now;
            return Ok(());
        }
        self.ensure_transition(target)?;

        let mut next = self.clone();
        if target == TaskStatus::Completed {
            next.completed_at = Some(now);
            if next.actual_end.is_none() && next.actual_start.is_none_or(|start| start < now) {
                next.actual_end = Some(now);
            }
            next.actual_duration_minutes = actual_minutes(next.actual_start, next.actual_end)?;
        }
        next.status = target;
        next.updated_at = now;
        *self = next;
        Ok(())
    }

    /// Marks an unreviewed task as rolled forward by the automatic fallback.
    ///
    /// Applies the synthesised review and records this task's own week as its
    /// lineage.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::InvalidStateTransition`] when the task is no
    /// longer open.
    pub fn roll_forward_unreviewed(
        &mut self,
        review: &Review,
        clock: &impl Clock,
    ) -> Result<(), TaskDomainError> {
        self.apply_review(review, clock)?;
        self.is_delayed_from_previous = true;
        self.original_week = Some(self.week.week());
        Ok(())
    }

    /// Builds the successor that carries this task's work into `target`.
    ///
    /// The successor keeps the descriptive and ownership fields, restarts at
    /// `Todo`, shifts the planned window by exactly seven days, and points its
    /// lineage one hop back at this task's week.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::WeekOutOfRange`] when the shifted window
    /// cannot be represented.
    pub fn successor(
        &self,
        target: PlanningWeek,
        clock: &impl Clock,
    ) -> Result<Self, TaskDomainError> {
        let planned = self
            .planned
            .shifted(Duration::days(ROLLOVER_OFFSET_DAYS))?;
        let timestamp = clock.utc();

        Ok(Self {
            id: TaskId::new(),
            owner_id: self.owner_id,
            assigned_by: self.assigned_by,
            week: target,
            title: self.title.clone(),
            description: self.description.clone(),
            source: self.source,
            task_type_id: self.task_type_id,
            is_key_task: self.is_key_task,
            planned,
            planned_duration_minutes: planned.minutes(),
            actual_start: None,
            actual_end: None,
            actual_duration_minutes: None,
            status: TaskStatus::Todo,
            completed_at: None,
            is_delayed_from_previous: true,
            original_week: Some(self.week.week()),
            created_at: timestamp,
            updated_at: timestamp,
        })
    }

    fn ensure_transition(&self, target: TaskStatus) -> Result<(), TaskDomainError> {
        if self.status.can_transition_to(target) {
            Ok(())
        } else {
            Err(TaskDomainError::InvalidStateTransition {
                task_id: self.id,
                from: self.status,
                to: target,
            })
        }
    }
}

fn normalize_title(title: String) -> Result<String, TaskDomainError> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(TaskDomainError::EmptyTitle);
    }
    let length = trimmed.chars().count();
    if length > MAX_TITLE_CHARS {
        return Err(TaskDomainError::TitleTooLong {
            length,
            max: MAX_TITLE_CHARS,
        });
    }
    Ok(trimmed.to_owned())
}

fn normalize_description(description: Option<String>) -> Option<String> {
    description
        .map(|text| text.trim().to_owned())
        .filter(|text| !text.is_empty())
}

fn actual_minutes(
    start: Option<DateTime<Utc>>,
    end: Option<DateTime<Utc>>,
) -> Result<Option<i64>, TaskDomainError> {
    match (start, end) {
        (Some(from), Some(to)) => minutes_between(from, to).map(Some),
        _ => Ok(None),
    }
}
