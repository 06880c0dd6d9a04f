//! Shared test helpers for `PostgreSQL` integration tests.

use std::sync::Arc;

use diesel::connection::SimpleConnection;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, CustomizeConnection, Pool};
use uuid::Uuid;
use weekplan::task::adapters::postgres::{PostgresTaskRepository, TaskPgPool};

/// Environment variable naming the server used by these tests.
pub const DATABASE_URL_ENV: &str = "WEEKPLAN_TEST_DATABASE_URL";

/// SQL creating the task and review tables.
pub const CREATE_TABLES_SQL: &str =
    include_str!("../../migrations/2025-01-06-000000_create_weekly_tasks/up.sql");

/// SQL creating the report comment table.
pub const CREATE_COMMENTS_SQL: &str =
    include_str!("../../migrations/2025-01-13-000000_create_report_comments/up.sql");

/// Boxed error type used by database setup.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Pins every pooled connection to one schema.
#[derive(Debug)]
struct SearchPath(String);

impl CustomizeConnection<PgConnection, diesel::r2d2::Error> for SearchPath {
    fn on_acquire(&self, conn: &mut PgConnection) -> Result<(), diesel::r2d2::Error> {
        conn.batch_execute(&format!("SET search_path TO {}", self.0))
            .map_err(diesel::r2d2::Error::QueryError)
    }
}

/// Migrated schema that is dropped again when the value goes out of scope.
pub struct TestSchema {
    url: String,
    name: String,
    /// Repository bound to the schema.
    pub repository: Arc<PostgresTaskRepository>,
}

impl TestSchema {
    /// Creates and migrates a fresh schema, or returns `None` when no test
    /// server is configured.
    ///
    /// # Errors
    ///
    /// Returns an error if the schema cannot be created or migrated.
    pub fn create() -> Result<Option<Self>, BoxError> {
        let Ok(url) = std::env::var(DATABASE_URL_ENV) else {
            return Ok(None);
        };
        let name = format!("weekplan_test_{}", Uuid::new_v4().simple());

        let mut conn = PgConnection::establish(&url)?;
        conn.batch_execute(&format!(
            "CREATE SCHEMA {name}; SET search_path TO {name}; {CREATE_TABLES_SQL} \
             {CREATE_COMMENTS_SQL}"
        ))?;

        let manager = ConnectionManager::<PgConnection>::new(url.as_str());
        let pool: TaskPgPool = Pool::builder()
            .max_size(2)
            .connection_customizer(Box::new(SearchPath(name.clone())))
            .build(manager)?;

        Ok(Some(Self {
            url,
            name,
            repository: Arc::new(PostgresTaskRepository::new(pool)),
        }))
    }
}

impl Drop for TestSchema {
    fn drop(&mut self) {
        let dropped = PgConnection::establish(&self.url)
            .map_err(BoxError::from)
            .and_then(|mut conn| {
                conn.batch_execute(&format!("DROP SCHEMA IF EXISTS {} CASCADE", self.name))
                    .map_err(BoxError::from)
            });
        if let Err(err) = dropped {
            tracing::warn!(schema = %self.name, error = %err, "failed to drop test schema");
        }
    }
}
