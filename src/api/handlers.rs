//! Shared application state and the health endpoint.

use std::sync::Arc;

use axum::Json;

use super::auth::{AuthPolicy, Authenticator, BearerTokenAuthenticator};
use crate::infrastructure::{ConfigurationError, ProjectRepository, Repositories, TaskRepository};

// =============================================================================
// Application Configuration
// =============================================================================

/// Application configuration for runtime settings.
#[derive(Clone, Debug, Default)]
pub struct AppConfig {
    /// Which routes beyond the project mutations require authentication.
    pub auth_policy: AuthPolicy,
}

impl AppConfig {
    /// Reads the application configuration from the environment.
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError` if a setting has an invalid value.
    pub fn from_env() -> Result<Self, ConfigurationError> {
        Ok(Self {
            auth_policy: AuthPolicy::from_env()?,
        })
    }
}

// =============================================================================
// Application State
// =============================================================================

/// Shared application dependencies.
///
/// The store handles are created once at startup and injected here; handlers
/// never reach for a global connection.
#[derive(Clone)]
pub struct AppState {
    /// Project repository.
    pub project_repository: Arc<dyn ProjectRepository + Send + Sync>,
    /// Task repository.
    pub task_repository: Arc<dyn TaskRepository + Send + Sync>,
    /// Authentication gate.
    pub authenticator: Arc<dyn Authenticator + Send + Sync>,
    /// Application configuration.
    pub config: AppConfig,
}

impl AppState {
    /// Creates a new `AppState` from initialized repositories.
    #[must_use]
    pub fn new(
        repositories: Repositories,
        authenticator: Arc<dyn Authenticator + Send + Sync>,
        config: AppConfig,
    ) -> Self {
        Self {
            project_repository: repositories.project_repository,
            task_repository: repositories.task_repository,
            authenticator,
            config,
        }
    }

    /// Creates an `AppState` backed by fresh in-memory repositories that
    /// accepts the given bearer tokens.
    #[must_use]
    pub fn in_memory<I, T>(tokens: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        Self::new(
            Repositories::in_memory(),
            Arc::new(BearerTokenAuthenticator::new(tokens)),
            AppConfig::default(),
        )
    }

    /// Returns a copy of this state using `config`.
    #[must_use]
    pub fn with_config(mut self, config: AppConfig) -> Self {
        self.config = config;
        self
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("AppState")
            .field("project_repository", &"Arc<dyn ProjectRepository>")
            .field("task_repository", &"Arc<dyn TaskRepository>")
            .field("authenticator", &"Arc<dyn Authenticator>")
            .field("config", &self.config)
            .finish()
    }
}

// =============================================================================
// GET /health Handler
// =============================================================================

/// Health check response body.
#[derive(Debug, Clone, serde::Serialize)]
pub struct HealthResponse {
    /// Service status.
    pub status: &'static str,
    /// Service version.
    pub version: &'static str,
}

/// Health check endpoint.
///
/// # Response
///
/// - **200 OK**: Service is healthy
///
/// ```json
/// {
///   "status": "healthy",
///   "version": "0.1.0"
/// }
/// ```
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[tokio::test]
    async fn test_health_check_reports_version() {
        let Json(response) = health_check().await;
        assert_eq!(response.status, "healthy");
        assert_eq!(response.version, env!("CARGO_PKG_VERSION"));
    }

    #[rstest]
    fn test_with_config_replaces_policy() {
        let config = AppConfig {
            auth_policy: AuthPolicy {
                require_auth_for_task_create: true,
            },
        };
        let state = AppState::in_memory(["token"]).with_config(config);
        assert!(state.config.auth_policy.require_auth_for_task_create);
        assert!(state.authenticator.authenticate("token"));
    }
}
