//! Manager comments on a team member's weekly report.

use super::{CommentId, PlanningWeek, TaskDomainError, UserId};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// Coaching comment a manager leaves on one member's week.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportComment {
    id: CommentId,
    member_id: UserId,
    week: PlanningWeek,
    manager_id: UserId,
    content: String,
    is_reviewed: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted comment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedCommentData {
    /// Persisted comment identifier.
    pub id: CommentId,
    /// Member whose week is commented on.
    pub member_id: UserId,
    /// Commented week.
    pub week: PlanningWeek,
    /// Author of the comment.
    pub manager_id: UserId,
    /// Comment text.
    pub content: String,
    /// Whether the manager marked the week as reviewed.
    pub is_reviewed: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl ReportComment {
    /// Writes a new, not yet reviewed comment.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::EmptyComment`] when `content` is blank.
    pub fn new(
        manager_id: UserId,
        member_id: UserId,
        week: PlanningWeek,
        content: impl Into<String>,
        clock: &impl Clock,
    ) -> Result<Self, TaskDomainError> {
        let now = clock.utc();
        Ok(Self {
            id: CommentId::new(),
            member_id,
            week,
            manager_id,
            content: normalize_content(content.into())?,
            is_reviewed: false,
            created_at: now,
            updated_at: now,
        })
    }

    /// Reconstructs a comment from persisted storage.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::EmptyComment`] when the stored text is blank.
    pub fn from_persisted(data: PersistedCommentData) -> Result<Self, TaskDomainError> {
        Ok(Self {
            id: data.id,
            member_id: data.member_id,
            week: data.week,
            manager_id: data.manager_id,
            content: normalize_content(data.content)?,
            is_reviewed: data.is_reviewed,
            created_at: data.created_at,
            updated_at: data.updated_at,
        })
    }

    /// Marks the member's week as reviewed by the author.
    ///
    /// Marking twice keeps the flag set and only refreshes `updated_at`.
    pub fn mark_reviewed(&mut self, clock: &impl Clock) {
        self.is_reviewed = true;
        self.updated_at = clock.utc();
    }

    /// Returns `true` when `user` wrote this comment.
    #[must_use]
    pub fn is_authored_by(&self, user: UserId) -> bool {
        self.manager_id == user
    }

    /// Returns the comment identifier.
    #[must_use]
    pub const fn id(&self) -> CommentId {
        self.id
    }

    /// Returns the member whose week is commented on.
    #[must_use]
    pub const fn member_id(&self) -> UserId {
        self.member_id
    }

    /// Returns the commented week.
    #[must_use]
    pub const fn week(&self) -> PlanningWeek {
        self.week
    }

    /// Returns the author.
    #[must_use]
    pub const fn manager_id(&self) -> UserId {
        self.manager_id
    }

    /// Returns the comment text.
    #[must_use]
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Returns whether the week was marked as reviewed.
    #[must_use]
    pub const fn is_reviewed(&self) -> bool {
        self.is_reviewed
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the last update timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}

fn normalize_content(content: String) -> Result<String, TaskDomainError> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return Err(TaskDomainError::EmptyComment);
    }
    Ok(trimmed.to_owned())
}
