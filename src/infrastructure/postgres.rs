//! `PostgreSQL` repository implementations.
//!
//! Documents are stored whole in a JSONB column, which gives the
//! schema-flexible behaviour of a document store on top of `sqlx`.
//!
//! # Features
//!
//! - Connection pooling with `sqlx::PgPool`
//! - JSONB storage; updates are a top-level JSONB merge
//! - Task push returns the pre-update document in a single statement
//!
//! # Table Schema
//!
//! ```sql
//! CREATE TABLE IF NOT EXISTS projects (
//!     id TEXT PRIMARY KEY,
//!     data JSONB NOT NULL,
//!     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
//!     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
//! );
//!
//! CREATE TABLE IF NOT EXISTS tasks (
//!     id TEXT PRIMARY KEY,
//!     data JSONB NOT NULL,
//!     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
//! );
//! ```

use serde::de::DeserializeOwned;
use sqlx::PgPool;

use futures::FutureExt;

use crate::domain::{Project, ProjectId, ProjectPatch, Task, TaskId};
use crate::infrastructure::{
    ProjectRepository, RepositoryError, RepositoryFuture, TaskRepository,
};

const CREATE_PROJECTS_TABLE: &str = "CREATE TABLE IF NOT EXISTS projects (\
     id TEXT PRIMARY KEY, \
     data JSONB NOT NULL, \
     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(), \
     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW())";

const CREATE_TASKS_TABLE: &str = "CREATE TABLE IF NOT EXISTS tasks (\
     id TEXT PRIMARY KEY, \
     data JSONB NOT NULL, \
     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW())";

const PUSH_TASK: &str = "UPDATE projects AS target \
     SET data = jsonb_set(target.data, '{tasks}', \
         COALESCE(target.data->'tasks', '[]'::jsonb) || to_jsonb($2::text)), \
         updated_at = NOW() \
     FROM (SELECT id, data FROM projects WHERE id = $1 FOR UPDATE) AS previous \
     WHERE target.id = previous.id \
     RETURNING previous.data";

// =============================================================================
// Helper Functions
// =============================================================================

#[allow(clippy::needless_pass_by_value)]
fn database_error(error: sqlx::Error) -> RepositoryError {
    RepositoryError::DatabaseError(error.to_string())
}

fn decode<T: DeserializeOwned>(data: serde_json::Value) -> Result<T, RepositoryError> {
    serde_json::from_value(data)
        .map_err(|error| RepositoryError::SerializationError(error.to_string()))
}

fn encode<T: serde::Serialize>(value: &T) -> Result<serde_json::Value, RepositoryError> {
    serde_json::to_value(value)
        .map_err(|error| RepositoryError::SerializationError(error.to_string()))
}

/// Creates the document tables if they do not exist yet.
///
/// # Errors
///
/// Returns `RepositoryError::DatabaseError` if a statement fails.
pub async fn ensure_schema(pool: &PgPool) -> Result<(), RepositoryError> {
    for statement in [CREATE_PROJECTS_TABLE, CREATE_TASKS_TABLE] {
        sqlx::query(statement)
            .execute(pool)
            .await
            .map_err(database_error)?;
    }
    Ok(())
}

// =============================================================================
// PostgreSQL Project Repository
// =============================================================================

/// `PostgreSQL` implementation of `ProjectRepository`.
#[derive(Debug, Clone)]
pub struct PostgresProjectRepository {
    /// Connection pool for `PostgreSQL`.
    pool: PgPool,
}

impl PostgresProjectRepository {
    /// Creates a new `PostgreSQL` project repository with the given connection pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Returns the underlying connection pool.
    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }
}

impl ProjectRepository for PostgresProjectRepository {
    fn create(&self, project: &Project) -> RepositoryFuture<Project> {
        let pool = self.pool.clone();
        let project = project.clone();

        async move {
            let data = encode(&project)?;
            sqlx::query("INSERT INTO projects (id, data) VALUES ($1, $2)")
                .bind(project.project_id.to_string())
                .bind(&data)
                .execute(&pool)
                .await
                .map_err(database_error)?;
            Ok(project)
        }
        .boxed()
    }

    fn find_all(&self) -> RepositoryFuture<Vec<Project>> {
        let pool = self.pool.clone();

        async move {
            let rows: Vec<(serde_json::Value,)> =
                sqlx::query_as("SELECT data FROM projects ORDER BY created_at ASC, id ASC")
                    .fetch_all(&pool)
                    .await
                    .map_err(database_error)?;

            rows.into_iter().map(|(data,)| decode(data)).collect()
        }
        .boxed()
    }

    fn find_by_id(&self, id: &ProjectId) -> RepositoryFuture<Option<Project>> {
        let pool = self.pool.clone();
        let project_id = id.to_string();

        async move {
            let row: Option<(serde_json::Value,)> =
                sqlx::query_as("SELECT data FROM projects WHERE id = $1")
                    .bind(project_id)
                    .fetch_optional(&pool)
                    .await
                    .map_err(database_error)?;

            row.map(|(data,)| decode(data)).transpose()
        }
        .boxed()
    }

    fn find_by_id_and_update(
        &self,
        id: &ProjectId,
        patch: &ProjectPatch,
    ) -> RepositoryFuture<Option<Project>> {
        let pool = self.pool.clone();
        let project_id = id.to_string();
        let patch = patch.clone();

        async move {
            let changes = encode(&patch)?;
            let row: Option<(serde_json::Value,)> = sqlx::query_as(
                "UPDATE projects SET data = data || $2, updated_at = NOW() \
                 WHERE id = $1 RETURNING data",
            )
            .bind(project_id)
            .bind(&changes)
            .fetch_optional(&pool)
            .await
            .map_err(database_error)?;

            row.map(|(data,)| decode(data)).transpose()
        }
        .boxed()
    }

    fn find_by_id_and_remove(&self, id: &ProjectId) -> RepositoryFuture<Option<Project>> {
        let pool = self.pool.clone();
        let project_id = id.to_string();

        async move {
            let row: Option<(serde_json::Value,)> =
                sqlx::query_as("DELETE FROM projects WHERE id = $1 RETURNING data")
                    .bind(project_id)
                    .fetch_optional(&pool)
                    .await
                    .map_err(database_error)?;

            row.map(|(data,)| decode(data)).transpose()
        }
        .boxed()
    }

    fn push_task(&self, id: &ProjectId, task_id: &TaskId) -> RepositoryFuture<Option<Project>> {
        let pool = self.pool.clone();
        let project_id = id.to_string();
        let task_id = task_id.to_string();

        async move {
            let row: Option<(serde_json::Value,)> = sqlx::query_as(PUSH_TASK)
                .bind(project_id)
                .bind(task_id)
                .fetch_optional(&pool)
                .await
                .map_err(database_error)?;

            row.map(|(data,)| decode(data)).transpose()
        }
        .boxed()
    }
}

// =============================================================================
// PostgreSQL Task Repository
// =============================================================================

/// `PostgreSQL` implementation of `TaskRepository`.
#[derive(Debug, Clone)]
pub struct PostgresTaskRepository {
    /// Connection pool for `PostgreSQL`.
    pool: PgPool,
}

impl PostgresTaskRepository {
    /// Creates a new `PostgreSQL` task repository with the given connection pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Returns the underlying connection pool.
    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }
}

impl TaskRepository for PostgresTaskRepository {
    fn create(&self, task: &Task) -> RepositoryFuture<Task> {
        let pool = self.pool.clone();
        let task = task.clone();

        async move {
            let data = encode(&task)?;
            sqlx::query("INSERT INTO tasks (id, data) VALUES ($1, $2)")
                .bind(task.task_id.to_string())
                .bind(&data)
                .execute(&pool)
                .await
                .map_err(database_error)?;
            Ok(task)
        }
        .boxed()
    }

    fn find_by_ids(&self, ids: &[TaskId]) -> RepositoryFuture<Vec<Task>> {
        let pool = self.pool.clone();
        let task_ids: Vec<String> = ids.iter().map(ToString::to_string).collect();

        async move {
            if task_ids.is_empty() {
                return Ok(Vec::new());
            }

            let rows: Vec<(serde_json::Value,)> =
                sqlx::query_as("SELECT data FROM tasks WHERE id = ANY($1)")
                    .bind(&task_ids)
                    .fetch_all(&pool)
                    .await
                    .map_err(database_error)?;

            rows.into_iter().map(|(data,)| decode(data)).collect()
        }
        .boxed()
    }

    fn find_by_id_and_remove(&self, id: &TaskId) -> RepositoryFuture<Option<Task>> {
        let pool = self.pool.clone();
        let task_id = id.to_string();

        async move {
            let row: Option<(serde_json::Value,)> =
                sqlx::query_as("DELETE FROM tasks WHERE id = $1 RETURNING data")
                    .bind(task_id)
                    .fetch_optional(&pool)
                    .await
                    .map_err(database_error)?;

            row.map(|(data,)| decode(data)).transpose()
        }
        .boxed()
    }
}

// =============================================================================
// Tests
// =============================================================================
