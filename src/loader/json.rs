//! Loaders backed by a JSON export file.
//!
//! Export files hold a single JSON array of record objects. The whole file
//! is read in one scoped acquisition (the handle is released whether or not
//! parsing succeeds) and parsed in one pass; there is no pagination.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::Error;
use crate::model::{Task, TaskRun};

use super::{TaskRunsLoader, TasksLoader};

/// Reads a task export file.
pub struct JsonTasksLoader {
    path: PathBuf,
}

impl JsonTasksLoader {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl TasksLoader for JsonTasksLoader {
    fn load(&self) -> Result<Vec<Task>, Error> {
        let body = fs::read_to_string(&self.path)?;
        let tasks: Vec<Task> = serde_json::from_str(&body)?;

        tracing::info!("Loaded {} tasks from {}", tasks.len(), self.path.display());
        Ok(tasks)
    }
}

/// Reads a task-run export file and groups it per loaded task.
pub struct JsonTaskRunsLoader<'a> {
    path: PathBuf,
    project_id: i64,
    tasks: &'a [Task],
}

impl<'a> JsonTaskRunsLoader<'a> {
    pub fn new(path: impl AsRef<Path>, project_id: i64, tasks: &'a [Task]) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            project_id,
            tasks,
        }
    }
}

impl TaskRunsLoader for JsonTaskRunsLoader<'_> {
    fn load(&self) -> Result<BTreeMap<i64, Vec<TaskRun>>, Error> {
        let body = fs::read_to_string(&self.path)?;
        let runs: Vec<TaskRun> = serde_json::from_str(&body)?;

        let mut groups: BTreeMap<i64, Vec<TaskRun>> = BTreeMap::new();
        for task in self.tasks {
            groups.insert(task.id, Vec::new());
        }

        // Runs referencing an unknown task or a foreign project are skipped,
        // not errors.
        let total = runs.len();
        let mut kept = 0usize;
        for run in runs {
            if run.project_id != self.project_id {
                continue;
            }
            if let Some(group) = groups.get_mut(&run.task_id) {
                group.push(run);
                kept += 1;
            }
        }

        if kept < total {
            tracing::warn!(
                "Dropped {} of {} task runs from {} not matching a loaded task",
                total - kept,
                total,
                self.path.display()
            );
        }
        Ok(groups)
    }
}
