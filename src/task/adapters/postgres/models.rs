//! Diesel row models for weekly task, review, and comment persistence.

use super::schema::{report_comments, task_reviews, weekly_tasks};
use chrono::{DateTime, Utc};
use diesel::prelude::*;

/// Query result row for weekly task records.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = weekly_tasks)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct TaskRow {
    /// Internal task identifier.
    pub id: uuid::Uuid,
    /// Owning person.
    pub owner_id: uuid::Uuid,
    /// Assigning manager.
    pub assigned_by: Option<uuid::Uuid>,
    /// ISO week-numbering year.
    pub year: i32,
    /// ISO week number.
    pub week_number: i32,
    /// Task title.
    pub title: String,
    /// Optional description.
    pub description: Option<String>,
    /// Task source.
    pub source: String,
    /// Catalog task type reference.
    pub task_type_id: Option<uuid::Uuid>,
    /// Key-task flag.
    pub is_key_task: bool,
    /// Planned start.
    pub planned_start: DateTime<Utc>,
    /// Planned end.
    pub planned_end: DateTime<Utc>,
    /// Planned duration in minutes.
    pub planned_duration_minutes: i64,
    /// Actual start.
    pub actual_start: Option<DateTime<Utc>>,
    /// Actual end.
    pub actual_end: Option<DateTime<Utc>>,
    /// Actual duration in minutes.
    pub actual_duration_minutes: Option<i64>,
    /// Lifecycle status.
    pub status: String,
    /// Completion timestamp.
    pub completed_at: Option<DateTime<Utc>>,
    /// Rollover flag.
    pub is_delayed_from_previous: bool,
    /// Week number one rollover hop back.
    pub original_week: Option<i32>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Insert and update model for weekly task records.
///
/// `None` values overwrite stored columns with `NULL` on update.
#[derive(Debug, Clone, Insertable, AsChangeset)]
#[diesel(table_name = weekly_tasks)]
#[diesel(treat_none_as_null = true)]
pub struct NewTaskRow {
    /// Internal task identifier.
    pub id: uuid::Uuid,
    /// Owning person.
    pub owner_id: uuid::Uuid,
    /// Assigning manager.
    pub assigned_by: Option<uuid::Uuid>,
    /// ISO week-numbering year.
    pub year: i32,
    /// ISO week number.
    pub week_number: i32,
    /// Task title.
    pub title: String,
    /// Optional description.
    pub description: Option<String>,
    /// Task source.
    pub source: String,
    /// Catalog task type reference.
    pub task_type_id: Option<uuid::Uuid>,
    /// Key-task flag.
    pub is_key_task: bool,
    /// Planned start.
    pub planned_start: DateTime<Utc>,
    /// Planned end.
    pub planned_end: DateTime<Utc>,
    /// Planned duration in minutes.
    pub planned_duration_minutes: i64,
    /// Actual start.
    pub actual_start: Option<DateTime<Utc>>,
    /// Actual end.
    pub actual_end: Option<DateTime<Utc>>,
    /// Actual duration in minutes.
    pub actual_duration_minutes: Option<i64>,
    /// Lifecycle status.
    pub status: String,
    /// Completion timestamp.
    pub completed_at: Option<DateTime<Utc>>,
    /// Rollover flag.
    pub is_delayed_from_previous: bool,
    /// Week number one rollover hop back.
    pub original_week: Option<i32>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Query result and insert row for task reviews.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = task_reviews)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ReviewRow {
    /// Internal review identifier.
    pub id: uuid::Uuid,
    /// Reviewed task.
    pub task_id: uuid::Uuid,
    /// Whether the work was finished.
    pub is_completed: bool,
    /// Why the work was not finished.
    pub incomplete_reason: Option<String>,
    /// Follow-up action for unfinished work.
    pub follow_up_action: Option<String>,
    /// Free-text notes.
    pub notes: Option<String>,
    /// Review origin.
    pub origin: String,
    /// Review timestamp.
    pub reviewed_at: DateTime<Utc>,
}

/// Query result, insert, and update row for report comments.
#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = report_comments)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct CommentRow {
    /// Internal comment identifier.
    pub id: uuid::Uuid,
    /// Member whose week is commented on.
    pub member_id: uuid::Uuid,
    /// ISO week-numbering year.
    pub year: i32,
    /// ISO week number.
    pub week_number: i32,
    /// Comment author.
    pub manager_id: uuid::Uuid,
    /// Comment text.
    pub content: String,
    /// Reviewed flag.
    pub is_reviewed: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}
