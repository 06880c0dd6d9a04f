//! Manager comments on members' weekly reports.

use super::domain::ReportError;
use crate::task::{
    domain::{CommentId, PlanningWeek, ReportComment, UserId},
    ports::TaskRepository,
};
use mockable::Clock;
use std::sync::Arc;
use tracing::info;

/// Adds, signs off, and lists report comments.
#[derive(Clone)]
pub struct ReportCommentService<R, C>
where
    R: TaskRepository,
    C: Clock + Send + Sync,
{
    repository: Arc<R>,
    clock: Arc<C>,
}

impl<R, C> ReportCommentService<R, C>
where
    R: TaskRepository,
    C: Clock + Send + Sync,
{
    /// Creates a new comment service.
    #[must_use]
    pub const fn new(repository: Arc<R>, clock: Arc<C>) -> Self {
        Self { repository, clock }
    }

    /// Leaves a comment on `member`'s report for the given week.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError::Domain`] for an invalid week or blank content
    /// and [`ReportError::Repository`] when the comment cannot be stored.
    pub async fn add_comment(
        &self,
        manager: UserId,
        member: UserId,
        year: i32,
        week: u32,
        content: &str,
    ) -> Result<ReportComment, ReportError> {
        let planning_week = PlanningWeek::new(year, week)?;
        let comment = ReportComment::new(manager, member, planning_week, content, &*self.clock)?;
        self.repository.store_comment(&comment).await?;
        info!(
            comment_id = %comment.id(),
            manager_id = %manager,
            member_id = %member,
            week = %planning_week,
            "report comment added"
        );
        Ok(comment)
    }

    /// Marks the member's week as reviewed through one of the actor's
    /// comments.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError::CommentNotFound`] for an unknown comment,
    /// [`ReportError::NotCommentAuthor`] when `actor` did not write it, and
    /// [`ReportError::Repository`] when loading or saving fails.
    pub async fn mark_comment_reviewed(
        &self,
        actor: UserId,
        comment_id: CommentId,
    ) -> Result<ReportComment, ReportError> {
        let mut comment = self
            .repository
            .find_comment(comment_id)
            .await?
            .ok_or(ReportError::CommentNotFound(comment_id))?;
        if !comment.is_authored_by(actor) {
            return Err(ReportError::NotCommentAuthor { comment_id, actor });
        }
        comment.mark_reviewed(&*self.clock);
        self.repository.update_comment(&comment).await?;
        info!(
            comment_id = %comment_id,
            member_id = %comment.member_id(),
            week = %comment.week(),
            "weekly report marked as reviewed"
        );
        Ok(comment)
    }

    /// Lists the comments left on `member`'s report for the given week,
    /// oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError::Domain`] for an invalid week and
    /// [`ReportError::Repository`] when loading fails.
    pub async fn list_comments(
        &self,
        member: UserId,
        year: i32,
        week: u32,
    ) -> Result<Vec<ReportComment>, ReportError> {
        let planning_week = PlanningWeek::new(year, week)?;
        Ok(self.repository.find_comments(member, planning_week).await?)
    }
}
