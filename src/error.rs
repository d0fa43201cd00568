//! Crate-wide error type.
//!
//! All errors are fatal to the operation that raised them; nothing is
//! retried. File-loading IO and JSON errors pass through unwrapped.

use thiserror::Error;

use crate::api::ApiError;
use crate::config::ConfigError;

#[derive(Debug, Error)]
pub enum Error {
    /// Project resolution returned zero or more than one match for the
    /// given short name.
    #[error("project not found: {0}")]
    ProjectNotFound(String),

    /// Task loading produced an empty task collection.
    #[error("project has no tasks")]
    ProjectWithoutTasks,

    /// Task-run loading produced zero runs across all tasks.
    #[error("project has no task runs")]
    ProjectWithoutTaskRuns,

    /// An operation that needs loaded tasks ran before `load_tasks`
    /// succeeded.
    #[error("tasks are not loaded; call load_tasks first")]
    TasksNotLoaded,

    /// `describe("task_runs")` ran before `load_task_runs` succeeded.
    #[error("task runs are not loaded; call load_task_runs first")]
    TaskRunsNotLoaded,

    /// `describe` was asked for an element it does not know.
    #[error("unknown element: {0} (expected \"tasks\" or \"task_runs\")")]
    UnknownElement(String),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
