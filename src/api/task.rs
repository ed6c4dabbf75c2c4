//! Task creation handler.
//!
//! Creating a task is two writes: insert the task, then append its id to
//! the owning project. When the second write does not land, the inserted
//! task is removed again so no unlinked task is left behind.

use axum::{Json, extract::State};

use super::auth::TaskCreationGate;
use super::dto::CreateTaskRequest;
use super::error::ApiErrorResponse;
use super::extract::ValidJson;
use super::handlers::AppState;
use crate::domain::{Project, ProjectId, Task, TaskId};
use crate::infrastructure::RepositoryError;

const CREATE_FAILED: &str = "error creating a new task";

/// Appends `task_id` to the project named by `raw_project_id`.
///
/// Returns the project as it was before the append, or `None` when no
/// project matches.
async fn link_to_project(
    state: &AppState,
    raw_project_id: &str,
    task_id: &TaskId,
) -> Result<Option<Project>, RepositoryError> {
    let project_id = ProjectId::parse_str(raw_project_id)
        .map_err(|error| RepositoryError::InvalidIdentifier(error.to_string()))?;
    state
        .project_repository
        .push_task(&project_id, task_id)
        .await
}

/// Removes a task whose link step failed. Failures are only logged.
async fn compensate(state: &AppState, task_id: &TaskId) {
    match state.task_repository.find_by_id_and_remove(task_id).await {
        Ok(_) => tracing::warn!(%task_id, "Removed task that could not be linked to a project"),
        Err(error) => {
            tracing::error!(%task_id, %error, "Failed to remove unlinked task");
        }
    }
}

// =============================================================================
// POST /api/tasks Handler
// =============================================================================

/// Creates a task and links it to its project.
///
/// # Request Body
///
/// ```json
/// { "title": "Plan", "description": "write plan", "projectId": "65a1f0c2e4b0a1b2c3d4e5f6" }
/// ```
///
/// # Response
///
/// - **200 OK**: The project as it was before the task was appended, or
///   `null` when the project does not exist
/// - **401 Unauthorized**: Only when task creation is gated
/// - **500 Internal Server Error**: Store error, including a malformed `projectId`
///
/// # Errors
///
/// Returns [`ApiErrorResponse`] when either write fails.
pub async fn create_task(
    _: TaskCreationGate,
    State(state): State<AppState>,
    ValidJson(request): ValidJson<CreateTaskRequest>,
) -> Result<Json<Option<Project>>, ApiErrorResponse> {
    let task = Task::new(
        TaskId::generate(),
        request.title,
        request.description,
        request.project_id,
    );

    let task = state
        .task_repository
        .create(&task)
        .await
        .map_err(|error| ApiErrorResponse::store_failure(CREATE_FAILED, &error))?;

    match link_to_project(&state, &task.project, &task.task_id).await {
        Ok(Some(previous)) => {
            tracing::debug!(task_id = %task.task_id, project_id = %previous.project_id, "Task created");
            Ok(Json(Some(previous)))
        }
        Ok(None) => {
            compensate(&state, &task.task_id).await;
            Ok(Json(None))
        }
        Err(error) => {
            compensate(&state, &task.task_id).await;
            Err(ApiErrorResponse::store_failure(CREATE_FAILED, &error))
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
