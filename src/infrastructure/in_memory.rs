//! In-memory repository implementations.
//!
//! Documents are kept in `BTreeMap`s keyed by identifier. Identifiers sort in
//! generation order, so iterating a map yields documents in insertion order,
//! matching the natural order of the document store.
//!
//! # Features
//!
//! - Thread-safe with `Arc<RwLock<...>>`
//! - All operations return boxed futures and do no work until awaited

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use futures::FutureExt;
use tokio::sync::RwLock;

use crate::domain::{Project, ProjectId, ProjectPatch, Task, TaskId};
use crate::infrastructure::{ProjectRepository, RepositoryFuture, TaskRepository};

// =============================================================================
// In-Memory Project Repository
// =============================================================================

/// In-memory implementation of `ProjectRepository`.
///
/// # Example
///
/// ```
/// use project_task_api::domain::{Project, ProjectId};
/// use project_task_api::infrastructure::{InMemoryProjectRepository, ProjectRepository};
///
/// # tokio::runtime::Runtime::new().unwrap().block_on(async {
/// let repository = InMemoryProjectRepository::new();
/// let project = Project::new(ProjectId::generate(), Some("Launch".into()), None);
///
/// repository.create(&project).await.unwrap();
/// let found = repository.find_by_id(&project.project_id).await.unwrap();
/// assert_eq!(found, Some(project));
/// # });
/// ```
#[derive(Debug, Clone, Default)]
pub struct InMemoryProjectRepository {
    projects: Arc<RwLock<BTreeMap<ProjectId, Project>>>,
}

impl InMemoryProjectRepository {
    /// Creates a new empty in-memory project repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[allow(clippy::significant_drop_tightening)]
impl ProjectRepository for InMemoryProjectRepository {
    fn create(&self, project: &Project) -> RepositoryFuture<Project> {
        let projects = Arc::clone(&self.projects);
        let project = project.clone();
        async move {
            let mut guard = projects.write().await;
            guard.insert(project.project_id, project.clone());
            Ok(project)
        }
        .boxed()
    }

    fn find_all(&self) -> RepositoryFuture<Vec<Project>> {
        let projects = Arc::clone(&self.projects);
        async move {
            let guard = projects.read().await;
            Ok(guard.values().cloned().collect())
        }
        .boxed()
    }

    fn find_by_id(&self, id: &ProjectId) -> RepositoryFuture<Option<Project>> {
        let projects = Arc::clone(&self.projects);
        let id = *id;
        async move {
            let guard = projects.read().await;
            Ok(guard.get(&id).cloned())
        }
        .boxed()
    }

    fn find_by_id_and_update(
        &self,
        id: &ProjectId,
        patch: &ProjectPatch,
    ) -> RepositoryFuture<Option<Project>> {
        let projects = Arc::clone(&self.projects);
        let id = *id;
        let patch = patch.clone();
        async move {
            let mut guard = projects.write().await;
            let Some(existing) = guard.get(&id).cloned() else {
                return Ok(None);
            };
            let updated = existing.apply(&patch);
            guard.insert(id, updated.clone());
            Ok(Some(updated))
        }
        .boxed()
    }

    fn find_by_id_and_remove(&self, id: &ProjectId) -> RepositoryFuture<Option<Project>> {
        let projects = Arc::clone(&self.projects);
        let id = *id;
        async move {
            let mut guard = projects.write().await;
            Ok(guard.remove(&id))
        }
        .boxed()
    }

    fn push_task(&self, id: &ProjectId, task_id: &TaskId) -> RepositoryFuture<Option<Project>> {
        let projects = Arc::clone(&self.projects);
        let id = *id;
        let task_id = *task_id;
        async move {
            let mut guard = projects.write().await;
            let Some(previous) = guard.get(&id).cloned() else {
                return Ok(None);
            };
            guard.insert(id, previous.clone().with_task(task_id));
            Ok(Some(previous))
        }
        .boxed()
    }
}

// =============================================================================
// In-Memory Task Repository
// =============================================================================

/// In-memory implementation of `TaskRepository`.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTaskRepository {
    tasks: Arc<RwLock<BTreeMap<TaskId, Task>>>,
}

impl InMemoryTaskRepository {
    /// Creates a new empty in-memory task repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored tasks.
    pub async fn len(&self) -> usize {
        self.tasks.read().await.len()
    }

    /// Returns true if no task is stored.
    pub async fn is_empty(&self) -> bool {
        self.tasks.read().await.is_empty()
    }
}

#[allow(clippy::significant_drop_tightening)]
impl TaskRepository for InMemoryTaskRepository {
    fn create(&self, task: &Task) -> RepositoryFuture<Task> {
        let tasks = Arc::clone(&self.tasks);
        let task = task.clone();
        async move {
            let mut guard = tasks.write().await;
            guard.insert(task.task_id, task.clone());
            Ok(task)
        }
        .boxed()
    }

    fn find_by_ids(&self, ids: &[TaskId]) -> RepositoryFuture<Vec<Task>> {
        let tasks = Arc::clone(&self.tasks);
        let ids: HashSet<TaskId> = ids.iter().copied().collect();
        async move {
            let guard = tasks.read().await;
            Ok(ids.iter().filter_map(|id| guard.get(id).cloned()).collect())
        }
        .boxed()
    }

    fn find_by_id_and_remove(&self, id: &TaskId) -> RepositoryFuture<Option<Task>> {
        let tasks = Arc::clone(&self.tasks);
        let id = *id;
        async move {
            let mut guard = tasks.write().await;
            Ok(guard.remove(&id))
        }
        .boxed()
    }
}

// =============================================================================
// Tests
// =============================================================================
