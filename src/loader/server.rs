//! Paged loaders backed by the live service.

use std::collections::BTreeMap;

use crate::api::paging::fetch_all;
use crate::api::{ProjectApi, TaskQuery, TaskRunQuery};
use crate::error::Error;
use crate::model::{Task, TaskRun};

use super::{TaskRunsLoader, TasksLoader};

/// Page size for task listings.
pub const TASK_PAGE_SIZE: usize = 100;
/// Page size for task-run listings.
pub const TASK_RUN_PAGE_SIZE: usize = 100;

/// Pages through the task listing for one project.
pub struct ServerTasksLoader<'a> {
    api: &'a dyn ProjectApi,
    project_id: i64,
    task_id: Option<i64>,
    state: Option<String>,
}

impl<'a> ServerTasksLoader<'a> {
    pub fn new(
        api: &'a dyn ProjectApi,
        project_id: i64,
        task_id: Option<i64>,
        state: Option<String>,
    ) -> Self {
        Self {
            api,
            project_id,
            task_id,
            state,
        }
    }
}

impl TasksLoader for ServerTasksLoader<'_> {
    fn load(&self) -> Result<Vec<Task>, Error> {
        // A single requested task needs exactly one call.
        if let Some(task_id) = self.task_id {
            let query = TaskQuery {
                project_id: self.project_id,
                task_id: Some(task_id),
                state: self.state.clone(),
                limit: 1,
                offset: 0,
            };
            return Ok(self.api.find_tasks(&query)?);
        }

        let tasks = fetch_all(TASK_PAGE_SIZE, |limit, offset| {
            self.api.find_tasks(&TaskQuery {
                project_id: self.project_id,
                task_id: None,
                state: self.state.clone(),
                limit,
                offset,
            })
        })?;

        tracing::info!(
            "Loaded {} tasks from server for project {}",
            tasks.len(),
            self.project_id
        );
        Ok(tasks)
    }
}

/// Pages through the task-run listing once per loaded task.
///
/// The fetch is parameterized by task id, so grouping is simply storing each
/// task's page-concatenated sequence under its key.
pub struct ServerTaskRunsLoader<'a> {
    api: &'a dyn ProjectApi,
    project_id: i64,
    tasks: &'a [Task],
}

impl<'a> ServerTaskRunsLoader<'a> {
    pub fn new(api: &'a dyn ProjectApi, project_id: i64, tasks: &'a [Task]) -> Self {
        Self {
            api,
            project_id,
            tasks,
        }
    }
}

impl TaskRunsLoader for ServerTaskRunsLoader<'_> {
    fn load(&self) -> Result<BTreeMap<i64, Vec<TaskRun>>, Error> {
        let mut groups = BTreeMap::new();

        for task in self.tasks {
            let runs = fetch_all(TASK_RUN_PAGE_SIZE, |limit, offset| {
                self.api.find_task_runs(&TaskRunQuery {
                    project_id: self.project_id,
                    task_id: task.id,
                    limit,
                    offset,
                })
            })?;

            tracing::debug!("Loaded {} task runs for task {}", runs.len(), task.id);
            groups.insert(task.id, runs);
        }

        Ok(groups)
    }
}
