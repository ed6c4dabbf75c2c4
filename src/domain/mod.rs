//! Domain module for projects and tasks.
//!
//! This module contains the document types and their identifiers.

pub mod object_id;
pub mod project;
pub mod task;

pub use object_id::{ObjectId, ObjectIdError};
pub use project::{PopulatedProject, Project, ProjectId, ProjectPatch};
pub use task::{Task, TaskId};
