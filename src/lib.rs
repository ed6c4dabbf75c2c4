//! Project and Task API Library
//!
//! A small REST service that keeps projects and tasks in a document store.
//! A project owns an ordered list of task references; reads expand those
//! references into full tasks.
//!
//! - [`domain`]: documents and identifiers
//! - [`infrastructure`]: repositories and the storage backends behind them
//! - [`api`]: HTTP handlers, the authentication gate and the router

pub mod api;
pub mod domain;
pub mod infrastructure;
