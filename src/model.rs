//! Typed records for the three entity kinds.
//!
//! # Invariants
//! - A `TaskRun` belongs to exactly one `Task` and one `Project`.
//! - Records never change after loading; the flattened view built in
//!   [`crate::frame`] is a derived copy, not a mutation.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A crowdsourcing campaign container identified by a short name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: i64,
    pub short_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// A unit of work belonging to a project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: i64,
    pub project_id: i64,
    /// Lifecycle state on the server, e.g. "completed" or "ongoing".
    #[serde(default)]
    pub state: Option<String>,
    /// Arbitrary task metadata. Usually an object, but the server accepts
    /// scalars and null.
    #[serde(default)]
    pub info: Value,
    /// Any further server-side fields (priority, quorum, timestamps, ...).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One worker's submitted response to a task (a "task run").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskRun {
    pub id: i64,
    pub task_id: i64,
    pub project_id: i64,
    #[serde(default)]
    pub info: Value,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Uniform view over records that can become frame rows.
pub trait Record {
    /// Stable identifier used as the row index.
    fn id(&self) -> i64;

    /// Top-level attribute mapping, as sent by the server.
    fn attributes(&self) -> Map<String, Value>;
}

impl Record for Task {
    fn id(&self) -> i64 {
        self.id
    }

    fn attributes(&self) -> Map<String, Value> {
        let mut map = Map::new();
        map.insert("id".to_string(), self.id.into());
        map.insert("project_id".to_string(), self.project_id.into());
        map.insert(
            "state".to_string(),
            self.state.as_deref().map_or(Value::Null, Value::from),
        );
        map.insert("info".to_string(), self.info.clone());
        map.extend(self.extra.clone());
        map
    }
}

impl Record for TaskRun {
    fn id(&self) -> i64 {
        self.id
    }

    fn attributes(&self) -> Map<String, Value> {
        let mut map = Map::new();
        map.insert("id".to_string(), self.id.into());
        map.insert("task_id".to_string(), self.task_id.into());
        map.insert("project_id".to_string(), self.project_id.into());
        map.insert("info".to_string(), self.info.clone());
        map.extend(self.extra.clone());
        map
    }
}
