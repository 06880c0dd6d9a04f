//! Review records rendered once per weekly task.

use super::{ParseReviewValueError, ReviewId, TaskDomainError, TaskId, TaskStatus};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Longest incomplete reason accepted, in characters.
pub const MAX_REASON_CHARS: usize = 500;

/// What happens to unfinished work after an incomplete review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FollowUpAction {
    /// Carry the work into a later week.
    RollToNextWeek,
    /// Abandon the work.
    Cancel,
}

impl FollowUpAction {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::RollToNextWeek => "roll_to_next_week",
            Self::Cancel => "cancel",
        }
    }
}

impl TryFrom<&str> for FollowUpAction {
    type Error = ParseReviewValueError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "roll_to_next_week" => Ok(Self::RollToNextWeek),
            "cancel" => Ok(Self::Cancel),
            _ => Err(ParseReviewValueError(value.to_owned())),
        }
    }
}

impl fmt::Display for FollowUpAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Who produced a review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewOrigin {
    /// Submitted by the task owner.
    Manual,
    /// Synthesised by the automatic rollover fallback.
    Fallback,
}

impl ReviewOrigin {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Manual => "manual",
            Self::Fallback => "fallback",
        }
    }
}

impl TryFrom<&str> for ReviewOrigin {
    type Error = ParseReviewValueError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "manual" => Ok(Self::Manual),
            "fallback" => Ok(Self::Fallback),
            _ => Err(ParseReviewValueError(value.to_owned())),
        }
    }
}

/// Caller-supplied review verdict before validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewVerdict {
    /// Whether the work was finished.
    pub is_completed: bool,
    /// Why the work was not finished.
    pub incomplete_reason: Option<String>,
    /// What happens to unfinished work.
    pub follow_up_action: Option<FollowUpAction>,
    /// Free-text notes.
    pub notes: Option<String>,
}

/// Immutable judgement rendered on exactly one task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Review {
    id: ReviewId,
    task_id: TaskId,
    is_completed: bool,
    incomplete_reason: Option<String>,
    follow_up_action: Option<FollowUpAction>,
    notes: Option<String>,
    origin: ReviewOrigin,
    reviewed_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted review.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedReviewData {
    /// Persisted review identifier.
    pub id: ReviewId,
    /// Reviewed task.
    pub task_id: TaskId,
    /// Persisted verdict.
    pub verdict: ReviewVerdict,
    /// Persisted origin.
    pub origin: ReviewOrigin,
    /// Persisted review timestamp.
    pub reviewed_at: DateTime<Utc>,
}

impl Review {
    /// Validates a manual review submitted by the task owner.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::MissingIncompleteReason`] or
    /// [`TaskDomainError::MissingFollowUpAction`] when an incomplete verdict
    /// lacks either field, and [`TaskDomainError::ReasonTooLong`] when the
    /// reason exceeds [`MAX_REASON_CHARS`].
    pub fn submit(
        task_id: TaskId,
        verdict: ReviewVerdict,
        clock: &impl Clock,
    ) -> Result<Self, TaskDomainError> {
        Self::build(task_id, verdict, ReviewOrigin::Manual, clock.utc())
    }

    /// Synthesises the review recorded when a task passes its week unreviewed.
    #[must_use]
    pub fn unreviewed_fallback(task_id: TaskId, reason: &str, clock: &impl Clock) -> Self {
        Self {
            id: ReviewId::new(),
            task_id,
            is_completed: false,
            incomplete_reason: Some(reason.to_owned()),
            follow_up_action: Some(FollowUpAction::RollToNextWeek),
            notes: None,
            origin: ReviewOrigin::Fallback,
            reviewed_at: clock.utc(),
        }
    }

    /// Reconstructs a review from persisted storage.
    ///
    /// # Errors
    ///
    /// Returns the same validation errors as [`Review::submit`] when the
    /// stored verdict is inconsistent.
    pub fn from_persisted(data: PersistedReviewData) -> Result<Self, TaskDomainError> {
        let mut review = Self::build(data.task_id, data.verdict, data.origin, data.reviewed_at)?;
        review.id = data.id;
        Ok(review)
    }

    fn build(
        task_id: TaskId,
        verdict: ReviewVerdict,
        origin: ReviewOrigin,
        reviewed_at: DateTime<Utc>,
    ) -> Result<Self, TaskDomainError> {
        let incomplete_reason = verdict
            .incomplete_reason
            .map(|reason| reason.trim().to_owned())
            .filter(|reason| !reason.is_empty());
        if let Some(length) = incomplete_reason
            .as_deref()
            .map(|reason| reason.chars().count())
            .filter(|length| *length > MAX_REASON_CHARS)
        {
            return Err(TaskDomainError::ReasonTooLong {
                length,
                max: MAX_REASON_CHARS,
            });
        }
        if !verdict.is_completed {
            if incomplete_reason.is_none() {
                return Err(TaskDomainError::MissingIncompleteReason);
            }
            if verdict.follow_up_action.is_none() {
                return Err(TaskDomainError::MissingFollowUpAction);
            }
        }

        Ok(Self {
            id: ReviewId::new(),
            task_id,
            is_completed: verdict.is_completed,
            incomplete_reason,
            follow_up_action: verdict.follow_up_action,
            notes: verdict.notes,
            origin,
            reviewed_at,
        })
    }

    /// Returns the review identifier.
    #[must_use]
    pub const fn id(&self) -> ReviewId {
        self.id
    }

    /// Returns the reviewed task.
    #[must_use]
    pub const fn task_id(&self) -> TaskId {
        self.task_id
    }

    /// Returns whether the work was finished.
    #[must_use]
    pub const fn is_completed(&self) -> bool {
        self.is_completed
    }

    /// Returns why the work was not finished.
    #[must_use]
    pub fn incomplete_reason(&self) -> Option<&str> {
        self.incomplete_reason.as_deref()
    }

    /// Returns the chosen follow-up action.
    #[must_use]
    pub const fn follow_up_action(&self) -> Option<FollowUpAction> {
        self.follow_up_action
    }

    /// Returns the free-text notes.
    #[must_use]
    pub fn notes(&self) -> Option<&str> {
        self.notes.as_deref()
    }

    /// Returns who produced the review.
    #[must_use]
    pub const fn origin(&self) -> ReviewOrigin {
        self.origin
    }

    /// Returns when the review was recorded.
    #[must_use]
    pub const fn reviewed_at(&self) -> DateTime<Utc> {
        self.reviewed_at
    }

    /// Returns the status the reviewed task moves to.
    #[must_use]
    pub const fn resulting_status(&self) -> TaskStatus {
        match (self.is_completed, self.follow_up_action) {
            (true, _) => TaskStatus::Completed,
            (false, Some(FollowUpAction::Cancel)) => TaskStatus::Cancelled,
            (false, _) => TaskStatus::Delayed,
        }
    }
}
