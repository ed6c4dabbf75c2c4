//! Common test helpers for integration tests.
//!
//! This module provides shared utilities for building `AppState` instances,
//! sending requests through the router and wrapping repositories so tests
//! can observe or break store access.
//!
//! # Note
//!
//! The `#![allow(dead_code)]` attribute is necessary because Rust compiles each
//! integration test file as a separate crate.

#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use axum::Router;
use axum::body::Body;
use axum::http::{Request, Response, StatusCode, header};
use futures::FutureExt;
use http_body_util::BodyExt;
use tower::ServiceExt;

use project_task_api::api::{AppConfig, AppState, AuthPolicy, BearerTokenAuthenticator, create_router};
use project_task_api::domain::{Project, ProjectId, ProjectPatch, Task, TaskId};
use project_task_api::infrastructure::{
    InMemoryProjectRepository, InMemoryTaskRepository, ProjectRepository, Repositories,
    RepositoryError, RepositoryFuture, TaskRepository,
};

/// Token accepted by every state built here.
pub const TEST_TOKEN: &str = "test-token";

// =============================================================================
// Repository Wrappers
// =============================================================================

/// Error text every failing repository call reports.
pub const STORE_FAILURE: &str = "connection refused";

/// Which calls of an [`ObservedProjectRepository`] fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailureMode {
    #[default]
    Never,
    /// Only the link step of task creation fails.
    Push,
    /// Every call fails.
    All,
}

fn store_failure<T: Send + 'static>(message: &str) -> RepositoryFuture<T> {
    let error = RepositoryError::DatabaseError(message.to_string());
    async move { Err::<T, _>(error) }.boxed()
}

/// Project repository that counts calls and can be told to fail.
#[derive(Debug, Clone, Default)]
pub struct ObservedProjectRepository {
    inner: InMemoryProjectRepository,
    calls: Arc<AtomicUsize>,
    failure_mode: FailureMode,
}

impl ObservedProjectRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(failure_mode: FailureMode) -> Self {
        Self {
            failure_mode,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Counts the call and reports whether it must fail.
    fn record(&self) -> bool {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.failure_mode == FailureMode::All
    }
}

impl ProjectRepository for ObservedProjectRepository {
    fn create(&self, project: &Project) -> RepositoryFuture<Project> {
        if self.record() {
            return store_failure(STORE_FAILURE);
        }
        self.inner.create(project)
    }

    fn find_all(&self) -> RepositoryFuture<Vec<Project>> {
        if self.record() {
            return store_failure(STORE_FAILURE);
        }
        self.inner.find_all()
    }

    fn find_by_id(&self, id: &ProjectId) -> RepositoryFuture<Option<Project>> {
        if self.record() {
            return store_failure(STORE_FAILURE);
        }
        self.inner.find_by_id(id)
    }

    fn find_by_id_and_update(
        &self,
        id: &ProjectId,
        patch: &ProjectPatch,
    ) -> RepositoryFuture<Option<Project>> {
        if self.record() {
            return store_failure(STORE_FAILURE);
        }
        self.inner.find_by_id_and_update(id, patch)
    }

    fn find_by_id_and_remove(&self, id: &ProjectId) -> RepositoryFuture<Option<Project>> {
        if self.record() {
            return store_failure(STORE_FAILURE);
        }
        self.inner.find_by_id_and_remove(id)
    }

    fn push_task(&self, id: &ProjectId, task_id: &TaskId) -> RepositoryFuture<Option<Project>> {
        if self.record() || self.failure_mode == FailureMode::Push {
            return store_failure("write conflict");
        }
        self.inner.push_task(id, task_id)
    }
}

/// Task repository that counts calls.
#[derive(Debug, Clone, Default)]
pub struct ObservedTaskRepository {
    inner: InMemoryTaskRepository,
    calls: Arc<AtomicUsize>,
}

impl ObservedTaskRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub async fn stored(&self) -> usize {
        self.inner.len().await
    }
}

impl TaskRepository for ObservedTaskRepository {
    fn create(&self, task: &Task) -> RepositoryFuture<Task> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.create(task)
    }

    fn find_by_ids(&self, ids: &[TaskId]) -> RepositoryFuture<Vec<Task>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.find_by_ids(ids)
    }

    fn find_by_id_and_remove(&self, id: &TaskId) -> RepositoryFuture<Option<Task>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.find_by_id_and_remove(id)
    }
}

// =============================================================================
// Test Application
// =============================================================================

/// Router plus handles on the repositories behind it.
pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub projects: ObservedProjectRepository,
    pub tasks: ObservedTaskRepository,
}

impl TestApp {
    /// Builds an app with the default auth policy.
    pub fn new() -> Self {
        Self::with_parts(ObservedProjectRepository::new(), AppConfig::default())
    }

    /// Builds an app whose task creation is also gated.
    pub fn gated_task_creation() -> Self {
        Self::with_parts(
            ObservedProjectRepository::new(),
            AppConfig {
                auth_policy: AuthPolicy {
                    require_auth_for_task_create: true,
                },
            },
        )
    }

    /// Builds an app whose project repository fails every link step.
    pub fn failing_push() -> Self {
        Self::with_parts(
            ObservedProjectRepository::failing(FailureMode::Push),
            AppConfig::default(),
        )
    }

    /// Builds an app whose project repository fails every call.
    pub fn failing_store() -> Self {
        Self::with_parts(
            ObservedProjectRepository::failing(FailureMode::All),
            AppConfig::default(),
        )
    }

    fn with_parts(projects: ObservedProjectRepository, config: AppConfig) -> Self {
        let tasks = ObservedTaskRepository::new();
        let state = AppState::new(
            Repositories {
                project_repository: Arc::new(projects.clone()),
                task_repository: Arc::new(tasks.clone()),
            },
            Arc::new(BearerTokenAuthenticator::new([TEST_TOKEN])),
            config,
        );
        Self {
            router: create_router(state.clone()),
            state,
            projects,
            tasks,
        }
    }

    /// Total store calls made so far.
    pub fn store_calls(&self) -> usize {
        self.projects.calls() + self.tasks.calls()
    }

    /// Sends a request and returns status and parsed JSON body.
    pub async fn send(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<serde_json::Value>,
    ) -> (StatusCode, serde_json::Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        read_json(response).await
    }

    /// Creates a project through the API and returns its id.
    pub async fn create_project(&self, title: &str) -> String {
        let (status, body) = self
            .send(
                "POST",
                "/api/projects",
                Some(TEST_TOKEN),
                Some(serde_json::json!({ "title": title })),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        body["_id"].as_str().unwrap().to_string()
    }

    /// Creates a task through the API.
    pub async fn create_task(&self, title: &str, project_id: &str) -> (StatusCode, serde_json::Value) {
        self.send(
            "POST",
            "/api/tasks",
            None,
            Some(serde_json::json!({ "title": title, "projectId": project_id })),
        )
        .await
    }
}

/// Reads a response body as JSON; an empty body reads as `Null`.
pub async fn read_json(response: Response<Body>) -> (StatusCode, serde_json::Value) {
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null)
    };
    (status, json)
}
