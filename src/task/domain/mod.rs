//! Domain model for weekly task planning, review, and rollover.
//!
//! The domain owns the status state machine, duration derivation, ISO week
//! arithmetic, and review validation while keeping all infrastructure
//! concerns outside of the domain boundary.

mod comment;
mod duration;
mod error;
mod ids;
mod review;
mod task;
mod week;

pub use comment::{PersistedCommentData, ReportComment};
pub use duration::{TimeWindow, minutes_between};
pub use error::{ParseReviewValueError, ParseTaskSourceError, ParseTaskStatusError, TaskDomainError};
pub use ids::{CommentId, ReviewId, TaskId, TaskTypeId, UserId};
pub use review::{
    FollowUpAction, MAX_REASON_CHARS, PersistedReviewData, Review, ReviewOrigin, ReviewVerdict,
};
pub use task::{
    MAX_TITLE_CHARS, PersistedTaskData, Task, TaskChanges, TaskDraft, TaskSource, TaskStatus,
};
pub use week::{PlanningWeek, WeekRange, weeks_in_year};
