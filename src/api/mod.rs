//! Remote-service seam for a PyBossa-style API.
//!
//! This module provides a trait-based abstraction over the three listing
//! endpoints the pipeline needs, with [`PybossaClient`] as the blocking HTTP
//! implementation. Sessions only ever see the trait, so tests can substitute
//! an in-memory fake.

mod client;
mod error;
pub(crate) mod paging;

pub use client::PybossaClient;
pub use error::{classify_http_status, ApiError, ApiErrorKind};

use crate::model::{Project, Task, TaskRun};

/// Filters for one page of tasks.
#[derive(Debug, Clone, Default)]
pub struct TaskQuery {
    pub project_id: i64,
    /// Narrow the listing to a single task.
    pub task_id: Option<i64>,
    /// Server-side state filter, e.g. "completed".
    pub state: Option<String>,
    pub limit: usize,
    pub offset: usize,
}

/// Filters for one page of task runs.
#[derive(Debug, Clone, Default)]
pub struct TaskRunQuery {
    pub project_id: i64,
    pub task_id: i64,
    pub limit: usize,
    pub offset: usize,
}

/// Trait for PyBossa-style API clients.
///
/// Each call returns one page in server order; an empty page means the
/// listing is exhausted. Calls block the caller and are never retried.
pub trait ProjectApi {
    /// All projects whose short name matches exactly.
    fn find_projects(&self, short_name: &str) -> Result<Vec<Project>, ApiError>;

    /// One page of tasks matching the query.
    fn find_tasks(&self, query: &TaskQuery) -> Result<Vec<Task>, ApiError>;

    /// One page of task runs matching the query.
    fn find_task_runs(&self, query: &TaskRunQuery) -> Result<Vec<TaskRun>, ApiError>;
}
