//! Infrastructure module for the document store.
//!
//! This module contains the repository traits, their in-memory and
//! `PostgreSQL` implementations, and the factory that picks one at startup.

pub mod factory;
pub mod in_memory;
pub mod postgres;
pub mod repository;

pub use factory::{
    ConfigurationError, FactoryError, Repositories, RepositoryConfig, RepositoryFactory,
    StorageMode, parse_flag,
};
pub use in_memory::{InMemoryProjectRepository, InMemoryTaskRepository};
pub use postgres::{PostgresProjectRepository, PostgresTaskRepository};
pub use repository::{ProjectRepository, RepositoryError, RepositoryFuture, TaskRepository};
