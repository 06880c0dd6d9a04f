//! Completion reporting over weekly tasks.
//!
//! [`build_report`] aggregates an already-scoped task population into a
//! summary, a week-by-week trend, and per task type and per member figures.
//! [`ReportService`] loads populations from a [`crate::task::ports::TaskRepository`].
//! [`ReportCommentService`] lets managers comment on and sign off a member's
//! week.

mod builder;
mod comments;
mod domain;
mod service;

pub use builder::{build_report, build_weekly_digest, summarise, week_bounds};
pub use comments::ReportCommentService;
pub use domain::{
    Assessment, CompletionBand, DigestEntry, MemberBreakdown, Rate, Report, ReportError,
    ReportScope, ReportSummary, ReviewStatus, StatusCounts, TaskTypeBreakdown, TeamOverview,
    WeekTrendPoint, WeeklyDigest,
};
pub use service::ReportService;
