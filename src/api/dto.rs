//! Data Transfer Objects for API requests and responses.
//!
//! Request bodies are typed and reject unknown fields, so a payload that
//! does not match the contract never reaches a handler.

use serde::de::IgnoredAny;
use serde::{Deserialize, Serialize};

use crate::domain::{ProjectPatch, TaskId};

// =============================================================================
// Project DTOs
// =============================================================================

/// Request DTO for creating a project.
///
/// `_id` and `tasks` are accepted so clients may send a whole document, but
/// their values are discarded: a new project always gets a fresh id and an
/// empty task list.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateProjectRequest {
    /// Title of the project.
    #[serde(default)]
    pub title: Option<String>,
    /// Description of the project.
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, rename = "_id")]
    pub ignored_id: Option<IgnoredAny>,
    #[serde(default, rename = "tasks")]
    pub ignored_tasks: Option<IgnoredAny>,
}

/// Request DTO for updating a project.
///
/// Every present field replaces the stored one, including `tasks`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateProjectRequest {
    /// New title.
    #[serde(default)]
    pub title: Option<String>,
    /// New description.
    #[serde(default)]
    pub description: Option<String>,
    /// New task list.
    #[serde(default)]
    pub tasks: Option<Vec<TaskId>>,
    #[serde(default, rename = "_id")]
    pub ignored_id: Option<IgnoredAny>,
}

impl From<UpdateProjectRequest> for ProjectPatch {
    fn from(request: UpdateProjectRequest) -> Self {
        Self {
            title: request.title,
            description: request.description,
            tasks: request.tasks,
        }
    }
}

/// Response DTO for a deleted project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteProjectResponse {
    /// Confirmation message.
    pub message: String,
}

impl DeleteProjectResponse {
    /// Builds the confirmation for `project_id` as the client wrote it.
    #[must_use]
    pub fn for_project(project_id: &str) -> Self {
        Self {
            message: format!("Project with {project_id} is removed successfully."),
        }
    }
}

// =============================================================================
// Task DTOs
// =============================================================================

/// Request DTO for creating a task.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateTaskRequest {
    /// Title of the task.
    #[serde(default)]
    pub title: Option<String>,
    /// Description of the task.
    #[serde(default)]
    pub description: Option<String>,
    /// Raw reference to the project the task belongs to.
    #[serde(rename = "projectId")]
    pub project_id: String,
}

// =============================================================================
// Tests
// =============================================================================
