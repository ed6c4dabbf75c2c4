//! Project domain model.
//!
//! A project keeps an ordered array of task identifiers. The array is
//! appended to when a task is created for the project and can be replaced
//! wholesale through an update; nothing keeps it in sync with the tasks'
//! own back-references.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::object_id::{ObjectId, ObjectIdError};
use super::task::{Task, TaskId};

// =============================================================================
// Value Objects - Newtypes
// =============================================================================

/// Unique identifier for a project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProjectId(ObjectId);

impl ProjectId {
    /// Wraps an existing identifier.
    #[must_use]
    pub const fn from_object_id(object_id: ObjectId) -> Self {
        Self(object_id)
    }

    /// Returns the inner identifier.
    #[must_use]
    pub const fn as_object_id(&self) -> &ObjectId {
        &self.0
    }

    /// Generates a new `ProjectId`.
    ///
    /// **Note**: This is an impure function (side effects: clock, counter).
    #[must_use]
    pub fn generate() -> Self {
        Self(ObjectId::generate())
    }

    /// Parses a project identifier from its hexadecimal form.
    ///
    /// # Errors
    ///
    /// Returns [`ObjectIdError`] if the input is not a well-formed identifier.
    pub fn parse_str(value: &str) -> Result<Self, ObjectIdError> {
        ObjectId::parse_str(value).map(Self)
    }
}

impl std::fmt::Display for ProjectId {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

// =============================================================================
// Project
// =============================================================================

/// A project document with its task references as identifiers.
///
/// # Examples
///
/// ```
/// use project_task_api::domain::{Project, ProjectId, TaskId};
///
/// let project = Project::new(ProjectId::generate(), Some("Launch".into()), None);
/// assert!(project.tasks.is_empty());
///
/// let task_id = TaskId::generate();
/// let project = project.with_task(task_id);
/// assert_eq!(project.tasks, vec![task_id]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    /// Store-generated identifier.
    #[serde(rename = "_id")]
    pub project_id: ProjectId,
    /// Title of the project, stored as given.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Free-form description, stored as given.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Task identifiers in creation order.
    #[serde(default)]
    pub tasks: Vec<TaskId>,
}

impl Project {
    /// Creates a new project with an empty task list.
    ///
    /// This is a pure function.
    #[must_use]
    pub const fn new(
        project_id: ProjectId,
        title: Option<String>,
        description: Option<String>,
    ) -> Self {
        Self {
            project_id,
            title,
            description,
            tasks: Vec::new(),
        }
    }

    /// Returns a copy with `task_id` appended to the task list.
    #[must_use]
    pub fn with_task(mut self, task_id: TaskId) -> Self {
        self.tasks.push(task_id);
        self
    }

    /// Returns a copy with every field present in `patch` replaced.
    #[must_use]
    pub fn apply(mut self, patch: &ProjectPatch) -> Self {
        if let Some(title) = &patch.title {
            self.title = Some(title.clone());
        }
        if let Some(description) = &patch.description {
            self.description = Some(description.clone());
        }
        if let Some(tasks) = &patch.tasks {
            self.tasks.clone_from(tasks);
        }
        self
    }
}

// =============================================================================
// ProjectPatch
// =============================================================================

/// Top-level field replacement applied by an update.
///
/// Fields left as `None` keep their stored value. Serializing a patch yields
/// only the present fields, which is the shape a JSON merge expects.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectPatch {
    /// Replacement title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Replacement description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Replacement task list.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tasks: Option<Vec<TaskId>>,
}

impl ProjectPatch {
    /// Returns true if the patch changes nothing.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.title.is_none() && self.description.is_none() && self.tasks.is_none()
    }
}

// =============================================================================
// PopulatedProject
// =============================================================================

/// A project whose task identifiers have been expanded into full tasks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PopulatedProject {
    /// Store-generated identifier.
    #[serde(rename = "_id")]
    pub project_id: ProjectId,
    /// Title of the project.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Description of the project.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Referenced tasks, in the order of the identifier array.
    pub tasks: Vec<Task>,
}

impl PopulatedProject {
    /// Expands `project` using the tasks found in `lookup`.
    ///
    /// Identifiers with no matching task are dropped.
    #[must_use]
    pub fn populate(project: Project, lookup: &HashMap<TaskId, Task>) -> Self {
        let tasks = project
            .tasks
            .iter()
            .filter_map(|task_id| lookup.get(task_id).cloned())
            .collect();

        Self {
            project_id: project.project_id,
            title: project.title,
            description: project.description,
            tasks,
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
