//! Blocking HTTP client for a PyBossa-style API.

use reqwest::blocking::Client;
use reqwest::StatusCode;
use url::Url;

use super::error::{classify_http_status, ApiError, ApiErrorKind};
use super::{ProjectApi, TaskQuery, TaskRunQuery};
use crate::config::Config;
use crate::model::{Project, Task, TaskRun};

/// Blocking client for the `/api/project`, `/api/task` and `/api/taskrun`
/// listing endpoints.
pub struct PybossaClient {
    client: Client,
    config: Config,
}

impl PybossaClient {
    /// Create a new client. Credentials and endpoint are fixed for the
    /// client's lifetime.
    pub fn new(config: Config) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    fn resource_url(&self, resource: &str) -> Result<Url, ApiError> {
        self.config
            .endpoint
            .join(&format!("api/{}", resource))
            .map_err(|e| ApiError::parse_error(format!("Invalid URL for {}: {}", resource, e)))
    }

    /// Create an ApiError from HTTP response status and body.
    fn create_error(status: StatusCode, body: &str) -> ApiError {
        let status_code = status.as_u16();
        match classify_http_status(status_code) {
            ApiErrorKind::ClientError => ApiError::client_error(status_code, body.to_string()),
            _ => ApiError::server_error(status_code, body.to_string()),
        }
    }

    /// Execute a GET against a listing endpoint and parse the JSON array.
    fn get_list<T: serde::de::DeserializeOwned>(
        &self,
        resource: &str,
        params: &[(&str, String)],
    ) -> Result<Vec<T>, ApiError> {
        let url = self.resource_url(resource)?;

        let mut request = self.client.get(url).query(params);
        if let Some(ref api_key) = self.config.api_key {
            request = request.query(&[("api_key", api_key.as_str())]);
        }

        let response = match request.send() {
            Ok(r) => r,
            Err(e) => {
                if e.is_timeout() {
                    return Err(ApiError::network_error(format!("Request timeout: {}", e)));
                } else if e.is_connect() {
                    return Err(ApiError::network_error(format!("Connection failed: {}", e)));
                } else {
                    return Err(ApiError::network_error(format!("Request failed: {}", e)));
                }
            }
        };

        let status = response.status();
        let body = match response.text() {
            Ok(body) => body,
            Err(e) => {
                return Err(ApiError::network_error(format!(
                    "Failed to read response body: {}",
                    e
                )))
            }
        };

        if !status.is_success() {
            return Err(Self::create_error(status, &body));
        }

        serde_json::from_str(&body).map_err(|e| {
            ApiError::parse_error(format!(
                "Failed to parse {} listing: {}, body: {}",
                resource,
                e,
                body_preview(&body, 500)
            ))
        })
    }
}

/// Longest prefix of `body` within `max` bytes, cut on a char boundary.
fn body_preview(body: &str, max: usize) -> &str {
    let mut end = body.len().min(max);
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    &body[..end]
}

impl ProjectApi for PybossaClient {
    fn find_projects(&self, short_name: &str) -> Result<Vec<Project>, ApiError> {
        tracing::debug!("Fetching projects: short_name={}", short_name);
        self.get_list("project", &[("short_name", short_name.to_string())])
    }

    fn find_tasks(&self, query: &TaskQuery) -> Result<Vec<Task>, ApiError> {
        let mut params = vec![
            ("project_id", query.project_id.to_string()),
            ("limit", query.limit.to_string()),
            ("offset", query.offset.to_string()),
        ];
        if let Some(task_id) = query.task_id {
            params.push(("id", task_id.to_string()));
        }
        if let Some(ref state) = query.state {
            params.push(("state", state.clone()));
        }

        tracing::debug!(
            "Fetching tasks: project_id={} offset={} limit={}",
            query.project_id,
            query.offset,
            query.limit
        );
        self.get_list("task", &params)
    }

    fn find_task_runs(&self, query: &TaskRunQuery) -> Result<Vec<TaskRun>, ApiError> {
        let params = [
            ("project_id", query.project_id.to_string()),
            ("task_id", query.task_id.to_string()),
            ("limit", query.limit.to_string()),
            ("offset", query.offset.to_string()),
        ];

        tracing::debug!(
            "Fetching task runs: project_id={} task_id={} offset={}",
            query.project_id,
            query.task_id,
            query.offset
        );
        self.get_list("taskrun", &params)
    }
}
