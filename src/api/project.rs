//! Project collection handlers.
//!
//! Each handler validates the path identifier, makes one store call (plus
//! one batched task lookup when tasks are expanded) and returns the result
//! as JSON. A project that does not exist is answered with `null`, not 404.

use std::collections::HashMap;

use axum::{Json, extract::State};

use super::auth::Authenticated;
use super::dto::{CreateProjectRequest, DeleteProjectResponse, UpdateProjectRequest};
use super::error::ApiErrorResponse;
use super::extract::{ValidJson, ValidProjectId};
use super::handlers::AppState;
use crate::domain::{PopulatedProject, Project, ProjectId, ProjectPatch, Task, TaskId};
use crate::infrastructure::RepositoryError;

const CREATE_FAILED: &str = "error creating a new project";
const LIST_FAILED: &str = "error getting list of projects";
const DETAILS_FAILED: &str = "error getting project details";
const UPDATE_FAILED: &str = "error updating project";
const DELETE_FAILED: &str = "error deleting project";

// =============================================================================
// Helpers
// =============================================================================

/// Expands the task identifiers of `projects` with one batched lookup.
async fn populate(
    state: &AppState,
    projects: Vec<Project>,
) -> Result<Vec<PopulatedProject>, RepositoryError> {
    let mut task_ids: Vec<TaskId> = projects
        .iter()
        .flat_map(|project| project.tasks.iter().copied())
        .collect();
    task_ids.sort_unstable();
    task_ids.dedup();

    let lookup: HashMap<TaskId, Task> = if task_ids.is_empty() {
        HashMap::new()
    } else {
        state
            .task_repository
            .find_by_ids(&task_ids)
            .await?
            .into_iter()
            .map(|task| (task.task_id, task))
            .collect()
    };

    Ok(projects
        .into_iter()
        .map(|project| PopulatedProject::populate(project, &lookup))
        .collect())
}

// =============================================================================
// POST /api/projects Handler
// =============================================================================

/// Creates a new project with an empty task list.
///
/// # Request Body
///
/// ```json
/// { "title": "Launch", "description": "Q1" }
/// ```
///
/// # Response
///
/// - **200 OK**: The stored project
/// - **401 Unauthorized**: Missing or refused token
/// - **500 Internal Server Error**: Store error
///
/// # Errors
///
/// Returns [`ApiErrorResponse`] when the store call fails.
pub async fn create_project(
    _: Authenticated,
    State(state): State<AppState>,
    ValidJson(request): ValidJson<CreateProjectRequest>,
) -> Result<Json<Project>, ApiErrorResponse> {
    let project = Project::new(ProjectId::generate(), request.title, request.description);

    let stored = state
        .project_repository
        .create(&project)
        .await
        .map_err(|error| ApiErrorResponse::store_failure(CREATE_FAILED, &error))?;

    tracing::debug!(project_id = %stored.project_id, "Project created");
    Ok(Json(stored))
}

// =============================================================================
// GET /api/projects Handler
// =============================================================================

/// Lists every project with its tasks expanded.
///
/// # Errors
///
/// Returns [`ApiErrorResponse`] when a store call fails.
pub async fn list_projects(
    State(state): State<AppState>,
) -> Result<Json<Vec<PopulatedProject>>, ApiErrorResponse> {
    let projects = state
        .project_repository
        .find_all()
        .await
        .map_err(|error| ApiErrorResponse::store_failure(LIST_FAILED, &error))?;

    let populated = populate(&state, projects)
        .await
        .map_err(|error| ApiErrorResponse::store_failure(LIST_FAILED, &error))?;

    Ok(Json(populated))
}

// =============================================================================
// GET /api/projects/{projectId} Handler
// =============================================================================

/// Gets one project with its tasks expanded.
///
/// # Response
///
/// - **200 OK**: The project, or `null` if none matches
/// - **400 Bad Request**: Malformed identifier
/// - **500 Internal Server Error**: Store error
///
/// # Errors
///
/// Returns [`ApiErrorResponse`] for a malformed identifier or a store failure.
pub async fn get_project(
    project_id: ValidProjectId,
    State(state): State<AppState>,
) -> Result<Json<Option<PopulatedProject>>, ApiErrorResponse> {
    let Some(project) = state
        .project_repository
        .find_by_id(project_id.project_id())
        .await
        .map_err(|error| ApiErrorResponse::store_failure(DETAILS_FAILED, &error))?
    else {
        return Ok(Json(None));
    };

    let mut populated = populate(&state, vec![project])
        .await
        .map_err(|error| ApiErrorResponse::store_failure(DETAILS_FAILED, &error))?;

    Ok(Json(populated.pop()))
}

// =============================================================================
// PUT /api/projects/{projectId} Handler
// =============================================================================

/// Replaces the fields present in the body and returns the updated project.
///
/// `tasks` can be overwritten here directly; nothing checks it against the
/// stored tasks.
///
/// # Response
///
/// - **200 OK**: The updated project (tasks as identifiers), or `null`
/// - **400 Bad Request**: Malformed identifier
/// - **401 Unauthorized**: Missing or refused token
/// - **500 Internal Server Error**: Store error
///
/// # Errors
///
/// Returns [`ApiErrorResponse`] for a malformed identifier or a store failure.
pub async fn update_project(
    _: Authenticated,
    project_id: ValidProjectId,
    State(state): State<AppState>,
    ValidJson(request): ValidJson<UpdateProjectRequest>,
) -> Result<Json<Option<Project>>, ApiErrorResponse> {
    let patch = ProjectPatch::from(request);

    let updated = state
        .project_repository
        .find_by_id_and_update(project_id.project_id(), &patch)
        .await
        .map_err(|error| ApiErrorResponse::store_failure(UPDATE_FAILED, &error))?;

    Ok(Json(updated))
}

// =============================================================================
// DELETE /api/projects/{projectId} Handler
// =============================================================================

/// Removes a project. Tasks that referenced it are left untouched.
///
/// # Response
///
/// - **200 OK**: Confirmation message, whether or not the project existed
/// - **400 Bad Request**: Malformed identifier
/// - **401 Unauthorized**: Missing or refused token
/// - **500 Internal Server Error**: Store error
///
/// # Errors
///
/// Returns [`ApiErrorResponse`] for a malformed identifier or a store failure.
pub async fn delete_project(
    _: Authenticated,
    project_id: ValidProjectId,
    State(state): State<AppState>,
) -> Result<Json<DeleteProjectResponse>, ApiErrorResponse> {
    let removed = state
        .project_repository
        .find_by_id_and_remove(project_id.project_id())
        .await
        .map_err(|error| ApiErrorResponse::store_failure(DELETE_FAILED, &error))?;

    if removed.is_none() {
        tracing::debug!(project_id = %project_id.as_str(), "Delete requested for missing project");
    }

    Ok(Json(DeleteProjectResponse::for_project(project_id.as_str())))
}

// =============================================================================
// Tests
// =============================================================================
