//! Application services for weekly task planning, review, and rollover.

mod error;
mod lifecycle;
mod review;
mod rollover;

pub use error::{ErrorKind, TaskServiceError, TaskServiceResult};
pub use lifecycle::{CreateTaskRequest, TaskLifecycleService, UpdateTaskRequest};
pub use review::{ReviewSubmission, SubmitReviewRequest, TaskReviewService};
pub use rollover::{
    DEFAULT_FALLBACK_REASON, OwnerRollover, RolloverOutcome, RolloverService, SweepOutcome,
};
