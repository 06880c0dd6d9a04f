//! `PostgreSQL` repository implementation for weekly task storage.

use super::{
    models::{CommentRow, NewTaskRow, ReviewRow, TaskRow},
    schema::{report_comments, task_reviews, weekly_tasks},
};
use crate::config::DatabaseConfig;
use crate::task::{
    domain::{
        CommentId, FollowUpAction, PersistedCommentData, PersistedReviewData, PersistedTaskData,
        PlanningWeek, ReportComment, Review, ReviewId, ReviewOrigin, ReviewVerdict, Task, TaskId,
        TaskSource, TaskStatus, TaskTypeId, TimeWindow, UserId,
    },
    ports::{TaskRepository, TaskRepositoryError, TaskRepositoryResult},
};
use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::result::{DatabaseErrorKind, Error as DieselError};

/// `PostgreSQL` connection pool type used by task adapters.
pub type TaskPgPool = Pool<ConnectionManager<PgConnection>>;

/// `PostgreSQL`-backed task repository.
#[derive(Debug, Clone)]
pub struct PostgresTaskRepository {
    pool: TaskPgPool,
}

/// Failure inside a Diesel transaction closure.
#[derive(Debug)]
enum TransactionError {
    Repository(TaskRepositoryError),
    Database(DieselError),
}

impl From<DieselError> for TransactionError {
    fn from(err: DieselError) -> Self {
        Self::Database(err)
    }
}

impl From<TransactionError> for TaskRepositoryError {
    fn from(err: TransactionError) -> Self {
        match err {
            TransactionError::Repository(inner) => inner,
            TransactionError::Database(inner) => Self::persistence(inner),
        }
    }
}

impl PostgresTaskRepository {
    /// Creates a new repository from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: TaskPgPool) -> Self {
        Self { pool }
    }

    /// Builds a connection pool from configuration and wraps it.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::Persistence`] when the pool cannot
    /// establish its initial connections.
    pub fn connect(config: &DatabaseConfig) -> TaskRepositoryResult<Self> {
        let manager = ConnectionManager::<PgConnection>::new(config.url.as_str());
        let pool = Pool::builder()
            .max_size(config.max_connections)
            .build(manager)
            .map_err(TaskRepositoryError::persistence)?;
        Ok(Self::new(pool))
    }

    async fn run_blocking<F, T>(&self, f: F) -> TaskRepositoryResult<T>
    where
        F: FnOnce(&mut PgConnection) -> TaskRepositoryResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(TaskRepositoryError::persistence)?;
            f(&mut connection)
        })
        .await
        .map_err(TaskRepositoryError::persistence)?
    }
}

#[async_trait]
impl TaskRepository for PostgresTaskRepository {
    async fn store(&self, task: &Task) -> TaskRepositoryResult<()> {
        let task_id = task.id();
        let new_row = to_new_row(task)?;

        self.run_blocking(move |connection| {
            diesel::insert_into(weekly_tasks::table)
                .values(&new_row)
                .execute(connection)
                .map_err(|err| match err {
                    DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                        TaskRepositoryError::DuplicateTask(task_id)
                    }
                    _ => TaskRepositoryError::persistence(err),
                })?;
            Ok(())
        })
        .await
    }

    async fn update(&self, task: &Task) -> TaskRepositoryResult<()> {
        let task_id = task.id();
        let row = to_new_row(task)?;

        self.run_blocking(move |connection| {
            let affected =
                update_task_row(connection, &row).map_err(TaskRepositoryError::persistence)?;
            if affected == 0 {
                return Err(TaskRepositoryError::NotFound(task_id));
            }
            Ok(())
        })
        .await
    }

    async fn find_by_id(&self, id: TaskId) -> TaskRepositoryResult<Option<Task>> {
        self.run_blocking(move |connection| {
            let row = weekly_tasks::table
                .filter(weekly_tasks::id.eq(id.into_inner()))
                .select(TaskRow::as_select())
                .first::<TaskRow>(connection)
                .optional()
                .map_err(TaskRepositoryError::persistence)?;
            row.map(row_to_task).transpose()
        })
        .await
    }

    async fn find_by_owner_and_week(
        &self,
        owner: UserId,
        week: PlanningWeek,
    ) -> TaskRepositoryResult<Vec<Task>> {
        let (year, week_number) = week_columns(week)?;
        self.run_blocking(move |connection| {
            let rows = weekly_tasks::table
                .filter(weekly_tasks::owner_id.eq(owner.into_inner()))
                .filter(weekly_tasks::year.eq(year))
                .filter(weekly_tasks::week_number.eq(week_number))
                .order((weekly_tasks::created_at.asc(), weekly_tasks::id.asc()))
                .select(TaskRow::as_select())
                .load::<TaskRow>(connection)
                .map_err(TaskRepositoryError::persistence)?;
            rows.into_iter().map(row_to_task).collect()
        })
        .await
    }

    async fn find_by_owner_and_status(
        &self,
        owner: UserId,
        status: TaskStatus,
    ) -> TaskRepositoryResult<Vec<Task>> {
        self.run_blocking(move |connection| {
            let rows = weekly_tasks::table
                .filter(weekly_tasks::owner_id.eq(owner.into_inner()))
                .filter(weekly_tasks::status.eq(status.as_str()))
                .order((weekly_tasks::created_at.asc(), weekly_tasks::id.asc()))
                .select(TaskRow::as_select())
                .load::<TaskRow>(connection)
                .map_err(TaskRepositoryError::persistence)?;
            rows.into_iter().map(row_to_task).collect()
        })
        .await
    }

    async fn find_by_owners_between(
        &self,
        owners: &[UserId],
        first: PlanningWeek,
        last: PlanningWeek,
    ) -> TaskRepositoryResult<Vec<Task>> {
        let owner_ids: Vec<uuid::Uuid> = owners.iter().map(|owner| owner.into_inner()).collect();
        let (first_year, first_week) = week_columns(first)?;
        let (last_year, last_week) = week_columns(last)?;

        self.run_blocking(move |connection| {
            let rows = weekly_tasks::table
                .filter(weekly_tasks::owner_id.eq_any(owner_ids))
                .filter(
                    weekly_tasks::year.gt(first_year).or(weekly_tasks::year
                        .eq(first_year)
                        .and(weekly_tasks::week_number.ge(first_week))),
                )
                .filter(
                    weekly_tasks::year.lt(last_year).or(weekly_tasks::year
                        .eq(last_year)
                        .and(weekly_tasks::week_number.le(last_week))),
                )
                .order((weekly_tasks::created_at.asc(), weekly_tasks::id.asc()))
                .select(TaskRow::as_select())
                .load::<TaskRow>(connection)
                .map_err(TaskRepositoryError::persistence)?;
            rows.into_iter().map(row_to_task).collect()
        })
        .await
    }

    async fn owners_with_open_tasks(
        &self,
        week: PlanningWeek,
    ) -> TaskRepositoryResult<Vec<UserId>> {
        let (year, week_number) = week_columns(week)?;
        self.run_blocking(move |connection| {
            let owners = weekly_tasks::table
                .filter(weekly_tasks::year.eq(year))
                .filter(weekly_tasks::week_number.eq(week_number))
                .filter(weekly_tasks::status.eq_any([
                    TaskStatus::Todo.as_str(),
                    TaskStatus::InProgress.as_str(),
                ]))
                .select(weekly_tasks::owner_id)
                .distinct()
                .order(weekly_tasks::owner_id.asc())
                .load::<uuid::Uuid>(connection)
                .map_err(TaskRepositoryError::persistence)?;
            Ok(owners.into_iter().map(UserId::from_uuid).collect())
        })
        .await
    }

    async fn record_review(&self, review: &Review, task: &Task) -> TaskRepositoryResult<()> {
        let task_id = task.id();
        let task_row = to_new_row(task)?;
        let review_row = to_review_row(review);

        self.run_blocking(move |connection| {
            connection
                .transaction::<_, TransactionError, _>(|tx| {
                    diesel::insert_into(task_reviews::table)
                        .values(&review_row)
                        .execute(tx)
                        .map_err(|err| match err {
                            DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                                TransactionError::Repository(TaskRepositoryError::DuplicateReview(
                                    task_id,
                                ))
                            }
                            DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, _) => {
                                TransactionError::Repository(TaskRepositoryError::NotFound(task_id))
                            }
                            _ => TransactionError::Database(err),
                        })?;
                    let affected = update_task_row(tx, &task_row)?;
                    if affected == 0 {
                        return Err(TransactionError::Repository(TaskRepositoryError::NotFound(
                            task_id,
                        )));
                    }
                    Ok(())
                })
                .map_err(TaskRepositoryError::from)
        })
        .await
    }

    async fn find_review(&self, task_id: TaskId) -> TaskRepositoryResult<Option<Review>> {
        self.run_blocking(move |connection| {
            let row = task_reviews::table
                .filter(task_reviews::task_id.eq(task_id.into_inner()))
                .select(ReviewRow::as_select())
                .first::<ReviewRow>(connection)
                .optional()
                .map_err(TaskRepositoryError::persistence)?;
            row.map(row_to_review).transpose()
        })
        .await
    }

    async fn store_comment(&self, comment: &ReportComment) -> TaskRepositoryResult<()> {
        let row = to_comment_row(comment)?;
        self.run_blocking(move |connection| {
            diesel::insert_into(report_comments::table)
                .values(&row)
                .execute(connection)
                .map_err(TaskRepositoryError::persistence)?;
            Ok(())
        })
        .await
    }

    async fn update_comment(&self, comment: &ReportComment) -> TaskRepositoryResult<()> {
        let comment_id = comment.id();
        let row = to_comment_row(comment)?;
        self.run_blocking(move |connection| {
            let affected =
                diesel::update(report_comments::table.filter(report_comments::id.eq(row.id)))
                    .set(&row)
                    .execute(connection)
                    .map_err(TaskRepositoryError::persistence)?;
            if affected == 0 {
                return Err(TaskRepositoryError::CommentNotFound(comment_id));
            }
            Ok(())
        })
        .await
    }

    async fn find_comment(&self, id: CommentId) -> TaskRepositoryResult<Option<ReportComment>> {
        self.run_blocking(move |connection| {
            let row = report_comments::table
                .filter(report_comments::id.eq(id.into_inner()))
                .select(CommentRow::as_select())
                .first::<CommentRow>(connection)
                .optional()
                .map_err(TaskRepositoryError::persistence)?;
            row.map(row_to_comment).transpose()
        })
        .await
    }

    async fn find_comments(
        &self,
        member: UserId,
        week: PlanningWeek,
    ) -> TaskRepositoryResult<Vec<ReportComment>> {
        let (year, week_number) = week_columns(week)?;
        self.run_blocking(move |connection| {
            let rows = report_comments::table
                .filter(report_comments::member_id.eq(member.into_inner()))
                .filter(report_comments::year.eq(year))
                .filter(report_comments::week_number.eq(week_number))
                .order((report_comments::created_at.asc(), report_comments::id.asc()))
                .select(CommentRow::as_select())
                .load::<CommentRow>(connection)
                .map_err(TaskRepositoryError::persistence)?;
            rows.into_iter().map(row_to_comment).collect()
        })
        .await
    }
}

fn update_task_row(connection: &mut PgConnection, row: &NewTaskRow) -> QueryResult<usize> {
    diesel::update(weekly_tasks::table.filter(weekly_tasks::id.eq(row.id)))
        .set(row)
        .execute(connection)
}

fn week_columns(week: PlanningWeek) -> TaskRepositoryResult<(i32, i32)> {
    let week_number = i32::try_from(week.week()).map_err(TaskRepositoryError::persistence)?;
    Ok((week.year(), week_number))
}

fn to_new_row(task: &Task) -> TaskRepositoryResult<NewTaskRow> {
    let (year, week_number) = week_columns(task.week())?;
    let original_week = task
        .original_week()
        .map(i32::try_from)
        .transpose()
        .map_err(TaskRepositoryError::persistence)?;

    Ok(NewTaskRow {
        id: task.id().into_inner(),
        owner_id: task.owner_id().into_inner(),
        assigned_by: task.assigned_by().map(UserId::into_inner),
        year,
        week_number,
        title: task.title().to_owned(),
        description: task.description().map(str::to_owned),
        source: task.source().as_str().to_owned(),
        task_type_id: task.task_type_id().map(TaskTypeId::into_inner),
        is_key_task: task.is_key_task(),
        planned_start: task.planned().start(),
        planned_end: task.planned().end(),
        planned_duration_minutes: task.planned_duration_minutes(),
        actual_start: task.actual_start(),
        actual_end: task.actual_end(),
        actual_duration_minutes: task.actual_duration_minutes(),
        status: task.status().as_str().to_owned(),
        completed_at: task.completed_at(),
        is_delayed_from_previous: task.is_delayed_from_previous(),
        original_week,
        created_at: task.created_at(),
        updated_at: task.updated_at(),
    })
}

fn row_to_task(row: TaskRow) -> TaskRepositoryResult<Task> {
    let week_number = u32::try_from(row.week_number).map_err(TaskRepositoryError::persistence)?;
    let week =
        PlanningWeek::new(row.year, week_number).map_err(TaskRepositoryError::persistence)?;
    let original_week = row
        .original_week
        .map(u32::try_from)
        .transpose()
        .map_err(TaskRepositoryError::persistence)?;
    let planned = TimeWindow::new(row.planned_start, row.planned_end)
        .map_err(TaskRepositoryError::persistence)?;
    let source =
        TaskSource::try_from(row.source.as_str()).map_err(TaskRepositoryError::persistence)?;
    let status =
        TaskStatus::try_from(row.status.as_str()).map_err(TaskRepositoryError::persistence)?;

    let data = PersistedTaskData {
        id: TaskId::from_uuid(row.id),
        owner_id: UserId::from_uuid(row.owner_id),
        assigned_by: row.assigned_by.map(UserId::from_uuid),
        week,
        title: row.title,
        description: row.description,
        source,
        task_type_id: row.task_type_id.map(TaskTypeId::from_uuid),
        is_key_task: row.is_key_task,
        planned,
        actual_start: row.actual_start,
        actual_end: row.actual_end,
        status,
        completed_at: row.completed_at,
        is_delayed_from_previous: row.is_delayed_from_previous,
        original_week,
        created_at: row.created_at,
        updated_at: row.updated_at,
    };
    Task::from_persisted(data).map_err(TaskRepositoryError::persistence)
}

fn to_review_row(review: &Review) -> ReviewRow {
    ReviewRow {
        id: review.id().into_inner(),
        task_id: review.task_id().into_inner(),
        is_completed: review.is_completed(),
        incomplete_reason: review.incomplete_reason().map(str::to_owned),
        follow_up_action: review
            .follow_up_action()
            .map(|action| action.as_str().to_owned()),
        notes: review.notes().map(str::to_owned),
        origin: review.origin().as_str().to_owned(),
        reviewed_at: review.reviewed_at(),
    }
}

fn row_to_review(row: ReviewRow) -> TaskRepositoryResult<Review> {
    let follow_up_action = row
        .follow_up_action
        .as_deref()
        .map(FollowUpAction::try_from)
        .transpose()
        .map_err(TaskRepositoryError::persistence)?;
    let origin =
        ReviewOrigin::try_from(row.origin.as_str()).map_err(TaskRepositoryError::persistence)?;

    let data = PersistedReviewData {
        id: ReviewId::from_uuid(row.id),
        task_id: TaskId::from_uuid(row.task_id),
        verdict: ReviewVerdict {
            is_completed: row.is_completed,
            incomplete_reason: row.incomplete_reason,
            follow_up_action,
            notes: row.notes,
        },
        origin,
        reviewed_at: row.reviewed_at,
    };
    Review::from_persisted(data).map_err(TaskRepositoryError::persistence)
}

fn to_comment_row(comment: &ReportComment) -> TaskRepositoryResult<CommentRow> {
    let (year, week_number) = week_columns(comment.week())?;
    Ok(CommentRow {
        id: comment.id().into_inner(),
        member_id: comment.member_id().into_inner(),
        year,
        week_number,
        manager_id: comment.manager_id().into_inner(),
        content: comment.content().to_owned(),
        is_reviewed: comment.is_reviewed(),
        created_at: comment.created_at(),
        updated_at: comment.updated_at(),
    })
}

fn row_to_comment(row: CommentRow) -> TaskRepositoryResult<ReportComment> {
    let week_number = u32::try_from(row.week_number).map_err(TaskRepositoryError::persistence)?;
    let week =
        PlanningWeek::new(row.year, week_number).map_err(TaskRepositoryError::persistence)?;
    let data = PersistedCommentData {
        id: CommentId::from_uuid(row.id),
        member_id: UserId::from_uuid(row.member_id),
        week,
        manager_id: UserId::from_uuid(row.manager_id),
        content: row.content,
        is_reviewed: row.is_reviewed,
        created_at: row.created_at,
        updated_at: row.updated_at,
    };
    ReportComment::from_persisted(data).map_err(TaskRepositoryError::persistence)
}
