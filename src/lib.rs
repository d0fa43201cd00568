//! # crowdstats
//!
//! Client-side reporting for PyBossa-style crowdsourcing projects.
//!
//! A [`ProjectSession`] resolves a project by its short name, loads the
//! project's tasks and task runs (from the live API or from JSON export
//! files), flattens each record's nested `info` metadata and exposes indexed
//! tabular frames with summary statistics.
//!
//! ## Pipeline
//!
//! ```text
//! resolve project ──▶ load tasks ──▶ load task runs ──▶ frames + describe
//!   (short name)     (paged/file)    (per task, grouped)
//! ```
//!
//! ## Modules
//! - `api`: the remote-service seam (`ProjectApi` trait + blocking client)
//! - `loader`: server/file source selection for tasks and task runs
//! - `frame`: `info` flattening, indexed frames, summary statistics
//! - `session`: the orchestrator state machine
//!
//! ## Example
//!
//! ```no_run
//! use crowdstats::{Config, ProjectSession};
//!
//! fn main() -> Result<(), crowdstats::Error> {
//!     let config = Config::from_env()?;
//!     let mut session = ProjectSession::connect(config, "cats")?;
//!     session.load_all()?;
//!     println!("{:#?}", session.describe("tasks")?);
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod config;
pub mod error;
pub mod frame;
pub mod loader;
pub mod model;
pub mod session;

pub use config::Config;
pub use error::Error;
pub use frame::{explode_info, ColumnStats, Frame, FrameSummary};
pub use loader::{RunSource, TaskSource};
pub use model::{Project, Task, TaskRun};
pub use session::{DescribeReport, ProjectSession};
