//! Source selection for tasks and task runs.
//!
//! Both entity kinds load either from the live service or from a JSON export
//! file. The session picks an implementation per call via [`TaskSource`] /
//! [`RunSource`], so the pagination and grouping logic never branches on a
//! nullable file path.

mod json;
mod server;

pub use json::{JsonTaskRunsLoader, JsonTasksLoader};
pub use server::{ServerTaskRunsLoader, ServerTasksLoader, TASK_PAGE_SIZE, TASK_RUN_PAGE_SIZE};

use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::error::Error;
use crate::model::{Task, TaskRun};

/// Where to load tasks from.
#[derive(Debug, Clone)]
pub enum TaskSource {
    /// Live service, paged. `task_id` narrows the load to a single task;
    /// `state` filters server-side.
    Server {
        task_id: Option<i64>,
        state: Option<String>,
    },
    /// JSON export file. The whole array is the result set; server-side
    /// filters do not apply.
    File(PathBuf),
}

impl Default for TaskSource {
    /// All tasks the server considers completed.
    fn default() -> Self {
        TaskSource::Server {
            task_id: None,
            state: Some("completed".to_string()),
        }
    }
}

/// Where to load task runs from.
#[derive(Debug, Clone, Default)]
pub enum RunSource {
    /// Live service, paged per task.
    #[default]
    Server,
    /// JSON export file, grouped per task after loading.
    File(PathBuf),
}

/// Loads the task collection for one project.
pub trait TasksLoader {
    fn load(&self) -> Result<Vec<Task>, Error>;
}

/// Loads task runs grouped by task id.
///
/// Implementations guarantee that `group[task.id]` only holds runs with
/// `task_id == task.id` and the session's project id, and that every loaded
/// task has an entry (possibly empty).
pub trait TaskRunsLoader {
    fn load(&self) -> Result<BTreeMap<i64, Vec<TaskRun>>, Error>;
}
