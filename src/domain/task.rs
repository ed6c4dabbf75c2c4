//! Task domain model.
//!
//! A task records the project it was created for as a raw back-reference.
//! The reference is not validated and carries no ownership: deleting the
//! project leaves it dangling.

use serde::{Deserialize, Serialize};

use super::object_id::{ObjectId, ObjectIdError};

// =============================================================================
// Value Objects - Newtypes
// =============================================================================

/// Unique identifier for a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(ObjectId);

impl TaskId {
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

    /// Generates a new `TaskId`.
    ///
    /// **Note**: This is an impure function (side effects: clock, counter).
    #[must_use]
    pub fn generate() -> Self {
        Self(ObjectId::generate())
    }

    /// Parses a task identifier from its hexadecimal form.
    ///
    /// # Errors
    ///
    /// Returns [`ObjectIdError`] if the input is not a well-formed identifier.
    pub fn parse_str(value: &str) -> Result<Self, ObjectIdError> {
        ObjectId::parse_str(value).map(Self)
    }
}

impl std::fmt::Display for TaskId {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

// =============================================================================
// Task
// =============================================================================

/// A task document as stored and returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Store-generated identifier.
    #[serde(rename = "_id")]
    pub task_id: TaskId,
    /// Title of the task, stored as given.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Free-form description, stored as given.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Raw reference to the owning project.
    pub project: String,
}

impl Task {
    /// Creates a new task.
    ///
    /// This is a pure function.
    #[must_use]
    pub fn new(
        task_id: TaskId,
        title: Option<String>,
        description: Option<String>,
        project: impl Into<String>,
    ) -> Self {
        Self {
            task_id,
            title,
            description,
            project: project.into(),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
