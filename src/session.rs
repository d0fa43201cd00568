//! Project session: resolve, load, tabulate, describe.
//!
//! A session walks a fixed state machine: project resolved at construction,
//! then tasks loaded, then task runs loaded. Reloading a step overwrites the
//! state that step owns wholesale; nothing is merged incrementally, and a
//! task reload drops run state so runs always reference loaded tasks.
//! Sessions are single-threaded; callers must serialize access.

use std::collections::BTreeMap;

use crate::api::{ProjectApi, PybossaClient};
use crate::config::Config;
use crate::error::Error;
use crate::frame::{Frame, FrameSummary};
use crate::loader::{
    JsonTaskRunsLoader, JsonTasksLoader, RunSource, ServerTaskRunsLoader, ServerTasksLoader,
    TaskRunsLoader, TaskSource, TasksLoader,
};
use crate::model::{Project, Task, TaskRun};

/// Summary statistics for the loaded tables, per element kind.
#[derive(Debug, Clone, PartialEq)]
pub enum DescribeReport {
    /// Stats over the tasks frame.
    Tasks(FrameSummary),
    /// Stats per task id over the task-run frames.
    TaskRuns(BTreeMap<i64, FrameSummary>),
}

/// Orchestrator for one project's tasks and task runs.
pub struct ProjectSession {
    api: Box<dyn ProjectApi>,
    project: Project,
    tasks: Vec<Task>,
    task_runs: BTreeMap<i64, Vec<TaskRun>>,
    tasks_frame: Option<Frame>,
    task_run_frames: BTreeMap<i64, Frame>,
}

impl std::fmt::Debug for ProjectSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProjectSession")
            .field("project", &self.project)
            .field("tasks", &self.tasks)
            .field("task_runs", &self.task_runs)
            .field("tasks_frame", &self.tasks_frame)
            .field("task_run_frames", &self.task_run_frames)
            .finish_non_exhaustive()
    }
}

impl ProjectSession {
    /// Resolve `short_name` against the live service.
    ///
    /// # Errors
    ///
    /// Returns `Error::ProjectNotFound` unless exactly one project matches.
    pub fn connect(config: Config, short_name: &str) -> Result<Self, Error> {
        Self::with_api(Box::new(PybossaClient::new(config)), short_name)
    }

    /// Resolve `short_name` against an injected API implementation.
    pub fn with_api(api: Box<dyn ProjectApi>, short_name: &str) -> Result<Self, Error> {
        let mut matches = api.find_projects(short_name)?;

        // Exactly one match resolves; zero or several is not found.
        if matches.len() != 1 {
            return Err(Error::ProjectNotFound(short_name.to_string()));
        }
        let project = matches.remove(0);
        tracing::info!(
            "Resolved project {} to id {}",
            project.short_name,
            project.id
        );

        Ok(Self {
            api,
            project,
            tasks: Vec::new(),
            task_runs: BTreeMap::new(),
            tasks_frame: None,
            task_run_frames: BTreeMap::new(),
        })
    }

    /// The project resolved at construction.
    pub fn project(&self) -> &Project {
        &self.project
    }

    /// Tasks from the last successful `load_tasks`.
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// Task runs from the last successful `load_task_runs`, keyed by task id.
    pub fn task_runs(&self) -> &BTreeMap<i64, Vec<TaskRun>> {
        &self.task_runs
    }

    /// The tasks frame, once tasks are loaded.
    pub fn tasks_frame(&self) -> Option<&Frame> {
        self.tasks_frame.as_ref()
    }

    /// One frame per task, once task runs are loaded.
    pub fn task_run_frames(&self) -> &BTreeMap<i64, Frame> {
        &self.task_run_frames
    }

    /// Load the project's tasks and build the tasks frame.
    ///
    /// A successful reload replaces the task collection and drops any task
    /// runs loaded against the previous one.
    ///
    /// # Errors
    ///
    /// Returns `Error::ProjectWithoutTasks` if the source yields no tasks;
    /// file IO/parse errors surface as-is.
    pub fn load_tasks(&mut self, source: &TaskSource) -> Result<(), Error> {
        let tasks = match source {
            TaskSource::Server { task_id, state } => ServerTasksLoader::new(
                self.api.as_ref(),
                self.project.id,
                *task_id,
                state.clone(),
            )
            .load()?,
            TaskSource::File(path) => JsonTasksLoader::new(path).load()?,
        };

        if tasks.is_empty() {
            return Err(Error::ProjectWithoutTasks);
        }

        self.tasks_frame = Some(Frame::from_records(&tasks));
        self.tasks = tasks;
        // A fresh task set invalidates any previously loaded runs: every run
        // kept in the session must reference a currently loaded task.
        self.task_runs.clear();
        self.task_run_frames.clear();
        tracing::info!(
            "Loaded {} tasks for project {}",
            self.tasks.len(),
            self.project.id
        );
        Ok(())
    }

    /// Load task runs for every loaded task and build one frame per task.
    ///
    /// # Errors
    ///
    /// Returns `Error::TasksNotLoaded` before a successful `load_tasks`, and
    /// `Error::ProjectWithoutTaskRuns` if the total run count is zero.
    pub fn load_task_runs(&mut self, source: &RunSource) -> Result<(), Error> {
        if self.tasks.is_empty() {
            return Err(Error::TasksNotLoaded);
        }

        let runs = match source {
            RunSource::Server => {
                ServerTaskRunsLoader::new(self.api.as_ref(), self.project.id, &self.tasks).load()?
            }
            RunSource::File(path) => {
                JsonTaskRunsLoader::new(path, self.project.id, &self.tasks).load()?
            }
        };

        let total: usize = runs.values().map(Vec::len).sum();
        if total == 0 {
            return Err(Error::ProjectWithoutTaskRuns);
        }

        self.task_run_frames = runs
            .iter()
            .map(|(task_id, group)| (*task_id, Frame::from_records(group)))
            .collect();
        self.task_runs = runs;
        tracing::info!(
            "Loaded {} task runs across {} tasks",
            total,
            self.task_runs.len()
        );
        Ok(())
    }

    /// Load tasks then task runs with default sources (live service,
    /// completed tasks).
    pub fn load_all(&mut self) -> Result<(), Error> {
        self.load_tasks(&TaskSource::default())?;
        self.load_task_runs(&RunSource::default())
    }

    /// Summary statistics for `"tasks"` or `"task_runs"`.
    ///
    /// Unknown element names come back as `Error::UnknownElement`, a
    /// descriptive value rather than a panic.
    pub fn describe(&self, element: &str) -> Result<DescribeReport, Error> {
        match element {
            "tasks" => {
                let frame = self.tasks_frame.as_ref().ok_or(Error::TasksNotLoaded)?;
                Ok(DescribeReport::Tasks(frame.describe()))
            }
            "task_runs" => {
                if self.task_run_frames.is_empty() {
                    return Err(Error::TaskRunsNotLoaded);
                }
                Ok(DescribeReport::TaskRuns(
                    self.task_run_frames
                        .iter()
                        .map(|(task_id, frame)| (*task_id, frame.describe()))
                        .collect(),
                ))
            }
            other => Err(Error::UnknownElement(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{ApiError, TaskQuery, TaskRunQuery};
    use serde_json::json;
    use std::cell::Cell;
    use std::rc::Rc;

    /// In-memory service: pages are slices of the stored collections.
    struct FakeApi {
        projects: Vec<Project>,
        tasks: Vec<Task>,
        runs: Vec<TaskRun>,
        task_calls: Rc<Cell<usize>>,
        run_calls: Rc<Cell<usize>>,
    }

    impl FakeApi {
        fn new(projects: Vec<Project>, tasks: Vec<Task>, runs: Vec<TaskRun>) -> Self {
            Self {
                projects,
                tasks,
                runs,
                task_calls: Rc::new(Cell::new(0)),
                run_calls: Rc::new(Cell::new(0)),
            }
        }

        fn page<T: Clone>(records: Vec<T>, limit: usize, offset: usize) -> Vec<T> {
            records.into_iter().skip(offset).take(limit).collect()
        }
    }

    impl ProjectApi for FakeApi {
        fn find_projects(&self, short_name: &str) -> Result<Vec<Project>, ApiError> {
            Ok(self
                .projects
                .iter()
                .filter(|p| p.short_name == short_name)
                .cloned()
                .collect())
        }

        fn find_tasks(&self, query: &TaskQuery) -> Result<Vec<Task>, ApiError> {
            self.task_calls.set(self.task_calls.get() + 1);
            let matching: Vec<Task> = self
                .tasks
                .iter()
                .filter(|t| t.project_id == query.project_id)
                .filter(|t| query.task_id.map_or(true, |id| t.id == id))
                .filter(|t| {
                    query
                        .state
                        .as_deref()
                        .map_or(true, |s| t.state.as_deref() == Some(s))
                })
                .cloned()
                .collect();
            Ok(Self::page(matching, query.limit, query.offset))
        }

        fn find_task_runs(&self, query: &TaskRunQuery) -> Result<Vec<TaskRun>, ApiError> {
            self.run_calls.set(self.run_calls.get() + 1);
            let matching: Vec<TaskRun> = self
                .runs
                .iter()
                .filter(|r| r.project_id == query.project_id && r.task_id == query.task_id)
                .cloned()
                .collect();
            Ok(Self::page(matching, query.limit, query.offset))
        }
    }

    fn project(id: i64, short_name: &str) -> Project {
        Project {
            id,
            short_name: short_name.to_string(),
            name: None,
        }
    }

    fn task(id: i64, project_id: i64) -> Task {
        serde_json::from_value(json!({
            "id": id,
            "project_id": project_id,
            "state": "completed",
            "info": {"url": format!("http://example.com/{id}.jpg")}
        }))
        .unwrap()
    }

    fn run(id: i64, task_id: i64, project_id: i64) -> TaskRun {
        serde_json::from_value(json!({
            "id": id,
            "task_id": task_id,
            "project_id": project_id,
            "info": {"answer": id}
        }))
        .unwrap()
    }

    /// The "cats" fixture: project 42, 3 completed tasks, 7 runs (3/2/2).
    fn cats_api() -> FakeApi {
        let runs = vec![
            run(100, 1, 42),
            run(101, 1, 42),
            run(102, 1, 42),
            run(103, 2, 42),
            run(104, 2, 42),
            run(105, 3, 42),
            run(106, 3, 42),
        ];
        FakeApi::new(
            vec![project(42, "cats")],
            vec![task(1, 42), task(2, 42), task(3, 42)],
            runs,
        )
    }

    #[test]
    fn test_connect_resolves_single_match() {
        let session = ProjectSession::with_api(Box::new(cats_api()), "cats").unwrap();
        assert_eq!(session.project().id, 42);
        assert_eq!(session.project().short_name, "cats");
    }

    #[test]
    fn test_connect_rejects_zero_matches() {
        let err = ProjectSession::with_api(Box::new(cats_api()), "dogs").unwrap_err();
        assert!(matches!(err, Error::ProjectNotFound(name) if name == "dogs"));
    }

    #[test]
    fn test_connect_rejects_multiple_matches() {
        let api = FakeApi::new(
            vec![project(1, "cats"), project(2, "cats")],
            vec![],
            vec![],
        );
        let err = ProjectSession::with_api(Box::new(api), "cats").unwrap_err();
        assert!(matches!(err, Error::ProjectNotFound(_)));
    }

    #[test]
    fn test_end_to_end_cats_scenario() {
        let api = cats_api();
        let task_calls = api.task_calls.clone();
        let run_calls = api.run_calls.clone();

        let mut session = ProjectSession::with_api(Box::new(api), "cats").unwrap();
        session.load_all().unwrap();

        // One page of 3 tasks plus the terminating empty page.
        assert_eq!(task_calls.get(), 2);
        // Each of the 3 tasks: one page of runs plus the empty page.
        assert_eq!(run_calls.get(), 6);

        let frame = session.tasks_frame().unwrap();
        assert_eq!(frame.len(), 3);
        assert_eq!(frame.index(), &[1, 2, 3]);

        let total: usize = session.task_runs().values().map(Vec::len).sum();
        assert_eq!(total, 7);
        assert_eq!(session.task_run_frames().len(), 3);
        let frame_rows: usize = session.task_run_frames().values().map(Frame::len).sum();
        assert_eq!(frame_rows, 7);
    }

    #[test]
    fn test_single_task_load_issues_one_call() {
        let api = cats_api();
        let task_calls = api.task_calls.clone();

        let mut session = ProjectSession::with_api(Box::new(api), "cats").unwrap();
        session
            .load_tasks(&TaskSource::Server {
                task_id: Some(2),
                state: Some("completed".to_string()),
            })
            .unwrap();

        assert_eq!(task_calls.get(), 1);
        assert_eq!(session.tasks().len(), 1);
        assert_eq!(session.tasks()[0].id, 2);
    }

    #[test]
    fn test_empty_task_load_fails() {
        let api = FakeApi::new(vec![project(42, "cats")], vec![], vec![]);
        let mut session = ProjectSession::with_api(Box::new(api), "cats").unwrap();

        let err = session.load_all().unwrap_err();
        assert!(matches!(err, Error::ProjectWithoutTasks));
        assert!(session.tasks_frame().is_none());
    }

    #[test]
    fn test_zero_total_runs_fails() {
        let api = FakeApi::new(vec![project(42, "cats")], vec![task(1, 42)], vec![]);
        let mut session = ProjectSession::with_api(Box::new(api), "cats").unwrap();

        let err = session.load_all().unwrap_err();
        assert!(matches!(err, Error::ProjectWithoutTaskRuns));
    }

    #[test]
    fn test_runs_before_tasks_fails() {
        let mut session = ProjectSession::with_api(Box::new(cats_api()), "cats").unwrap();
        let err = session.load_task_runs(&RunSource::Server).unwrap_err();
        assert!(matches!(err, Error::TasksNotLoaded));
    }

    #[test]
    fn test_grouping_only_holds_matching_runs() {
        let mut session = ProjectSession::with_api(Box::new(cats_api()), "cats").unwrap();
        session.load_all().unwrap();

        for (task_id, group) in session.task_runs() {
            assert!(group.iter().all(|r| r.task_id == *task_id));
            assert!(group.iter().all(|r| r.project_id == 42));
        }
    }

    #[test]
    fn test_reload_overwrites_previous_state() {
        let mut session = ProjectSession::with_api(Box::new(cats_api()), "cats").unwrap();
        session
            .load_tasks(&TaskSource::Server {
                task_id: Some(1),
                state: None,
            })
            .unwrap();
        assert_eq!(session.tasks().len(), 1);

        session.load_tasks(&TaskSource::default()).unwrap();
        assert_eq!(session.tasks().len(), 3);
        assert_eq!(session.tasks_frame().unwrap().len(), 3);
    }

    #[test]
    fn test_task_reload_drops_stale_run_state() {
        let mut session = ProjectSession::with_api(Box::new(cats_api()), "cats").unwrap();
        session.load_all().unwrap();
        assert_eq!(session.task_run_frames().len(), 3);

        session
            .load_tasks(&TaskSource::Server {
                task_id: Some(1),
                state: None,
            })
            .unwrap();

        // Runs from the previous task set are gone until reloaded.
        assert!(session.task_runs().is_empty());
        assert!(session.task_run_frames().is_empty());
        assert!(matches!(
            session.describe("task_runs").unwrap_err(),
            Error::TaskRunsNotLoaded
        ));

        session.load_task_runs(&RunSource::Server).unwrap();
        assert_eq!(session.task_run_frames().len(), 1);
        let total: usize = session.task_runs().values().map(Vec::len).sum();
        assert_eq!(total, 3);
    }

    #[test]
    fn test_describe_tasks_and_task_runs() {
        let mut session = ProjectSession::with_api(Box::new(cats_api()), "cats").unwrap();
        session.load_all().unwrap();

        match session.describe("tasks").unwrap() {
            DescribeReport::Tasks(summary) => {
                assert_eq!(summary.rows, 3);
                assert_eq!(summary.columns["id"].mean, Some(2.0));
            }
            other => panic!("unexpected report: {:?}", other),
        }

        match session.describe("task_runs").unwrap() {
            DescribeReport::TaskRuns(per_task) => {
                assert_eq!(per_task.len(), 3);
                assert_eq!(per_task[&1].rows, 3);
                // Runs 100..=102 answer with their own ids.
                assert_eq!(per_task[&1].columns["answer"].mean, Some(101.0));
            }
            other => panic!("unexpected report: {:?}", other),
        }
    }

    #[test]
    fn test_describe_unknown_element() {
        let session = ProjectSession::with_api(Box::new(cats_api()), "cats").unwrap();
        let err = session.describe("bogus").unwrap_err();
        assert!(matches!(err, Error::UnknownElement(name) if name == "bogus"));
    }

    #[test]
    fn test_describe_before_load_fails() {
        let session = ProjectSession::with_api(Box::new(cats_api()), "cats").unwrap();
        assert!(matches!(
            session.describe("tasks").unwrap_err(),
            Error::TasksNotLoaded
        ));

        let mut session = ProjectSession::with_api(Box::new(cats_api()), "cats").unwrap();
        session.load_tasks(&TaskSource::default()).unwrap();
        assert!(matches!(
            session.describe("task_runs").unwrap_err(),
            Error::TaskRunsNotLoaded
        ));
    }

    #[test]
    fn test_file_sources_end_to_end() {
        use std::io::Write;

        let mut tasks_file = tempfile::NamedTempFile::new().unwrap();
        write!(
            tasks_file,
            "{}",
            json!([
                {"id": 1, "project_id": 42, "state": "completed"},
                {"id": 2, "project_id": 42, "state": "completed"}
            ])
        )
        .unwrap();

        let mut runs_file = tempfile::NamedTempFile::new().unwrap();
        write!(
            runs_file,
            "{}",
            json!([
                {"id": 10, "task_id": 1, "project_id": 42, "info": {"answer": 1}},
                {"id": 11, "task_id": 2, "project_id": 42, "info": {"answer": 2}},
                {"id": 12, "task_id": 9, "project_id": 42, "info": {"answer": 3}}
            ])
        )
        .unwrap();

        let api = FakeApi::new(vec![project(42, "cats")], vec![], vec![]);
        let mut session = ProjectSession::with_api(Box::new(api), "cats").unwrap();

        session
            .load_tasks(&TaskSource::File(tasks_file.path().to_path_buf()))
            .unwrap();
        session
            .load_task_runs(&RunSource::File(runs_file.path().to_path_buf()))
            .unwrap();

        // The run for unknown task 9 is silently dropped.
        let total: usize = session.task_runs().values().map(Vec::len).sum();
        assert_eq!(total, 2);
        assert_eq!(session.task_run_frames()[&1].index(), &[10]);
    }
}
