//! API module for HTTP handlers.
//!
//! This module contains route definitions, the authentication gate and
//! request/response handlers.

pub mod auth;
pub mod dto;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod project;
pub mod routes;
pub mod task;

pub use auth::{AuthPolicy, Authenticated, Authenticator, BearerTokenAuthenticator, TaskCreationGate};
pub use dto::{CreateProjectRequest, CreateTaskRequest, DeleteProjectResponse, UpdateProjectRequest};
pub use error::{ApiError, ApiErrorResponse, INVALID_ID_MESSAGE};
pub use extract::{ValidJson, ValidProjectId};
pub use handlers::{AppConfig, AppState, HealthResponse, health_check};
pub use project::{create_project, delete_project, get_project, list_projects, update_project};
pub use routes::create_router;
pub use task::create_task;
