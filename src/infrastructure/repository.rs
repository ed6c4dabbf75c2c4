//! Repository traits for domain documents.
//!
//! Every method returns a boxed future that performs the store call when
//! awaited. The traits are object safe so the backend can be chosen at
//! runtime and shared as `Arc<dyn …>`.

use futures::future::BoxFuture;
use thiserror::Error;

use crate::domain::{Project, ProjectId, ProjectPatch, Task, TaskId};

// =============================================================================
// Repository Error
// =============================================================================

/// Errors that can occur during repository operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    /// Database connection or query error.
    #[error("Database error: {0}")]
    DatabaseError(String),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// A reference could not be cast to a document identifier.
    #[error("Invalid identifier: {0}")]
    InvalidIdentifier(String),
}

/// Future returned by every repository operation.
pub type RepositoryFuture<T> = BoxFuture<'static, Result<T, RepositoryError>>;

// =============================================================================
// Project Repository
// =============================================================================

/// Repository trait for Project documents.
pub trait ProjectRepository: Send + Sync {
    /// Inserts a new project and returns the stored document.
    fn create(&self, project: &Project) -> RepositoryFuture<Project>;

    /// Returns every project in store order.
    fn find_all(&self) -> RepositoryFuture<Vec<Project>>;

    /// Finds a project by its ID.
    ///
    /// Returns `Ok(None)` if no project matches.
    fn find_by_id(&self, id: &ProjectId) -> RepositoryFuture<Option<Project>>;

    /// Replaces the fields present in `patch` and returns the updated document.
    ///
    /// Returns `Ok(None)` if no project matches.
    fn find_by_id_and_update(
        &self,
        id: &ProjectId,
        patch: &ProjectPatch,
    ) -> RepositoryFuture<Option<Project>>;

    /// Removes a project and returns the removed document.
    ///
    /// Returns `Ok(None)` if no project matches.
    fn find_by_id_and_remove(&self, id: &ProjectId) -> RepositoryFuture<Option<Project>>;

    /// Appends `task_id` to the project's task list.
    ///
    /// Returns the document as it was **before** the append, or `Ok(None)`
    /// if no project matches.
    fn push_task(&self, id: &ProjectId, task_id: &TaskId) -> RepositoryFuture<Option<Project>>;
}

// =============================================================================
// Task Repository
// =============================================================================

/// Repository trait for Task documents.
pub trait TaskRepository: Send + Sync {
    /// Inserts a new task and returns the stored document.
    fn create(&self, task: &Task) -> RepositoryFuture<Task>;

    /// Returns the tasks whose IDs appear in `ids`.
    ///
    /// IDs with no matching task are skipped; no ordering is guaranteed.
    fn find_by_ids(&self, ids: &[TaskId]) -> RepositoryFuture<Vec<Task>>;

    /// Removes a task and returns the removed document.
    ///
    /// Returns `Ok(None)` if no task matches.
    fn find_by_id_and_remove(&self, id: &TaskId) -> RepositoryFuture<Option<Task>>;
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn test_repository_error_display() {
        let error = RepositoryError::DatabaseError("connection refused".to_string());
        assert_eq!(format!("{error}"), "Database error: connection refused");

        let error = RepositoryError::SerializationError("missing field `_id`".to_string());
        assert_eq!(format!("{error}"), "Serialization error: missing field `_id`");

        let error = RepositoryError::InvalidIdentifier("abc".to_string());
        assert_eq!(format!("{error}"), "Invalid identifier: abc");
    }
}
