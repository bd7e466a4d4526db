//! Request builders and response parsers for the Todoist REST endpoints.
//!
//! # Design
//! `RestApi` holds only endpoint URLs. Each operation is split into a
//! `build_*` method that produces an `HttpRequest` and a `parse_*` method that
//! consumes an `HttpResponse`. Nothing here does I/O; [`crate::Client`] runs
//! the round trip in between.

use serde::de::DeserializeOwned;

use crate::error::{ClientError, Result};
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{AccessToken, Project, Task};

pub const DEFAULT_API_BASE_URL: &str = "https://api.todoist.com/rest/v1";
pub const DEFAULT_AUTHORIZE_URL: &str = "https://todoist.com/oauth/authorize";
pub const DEFAULT_TOKEN_URL: &str = "https://todoist.com/oauth/access_token";

/// Scope requested in the authorization URL.
pub const READ_SCOPE: &str = "data:read";

/// Which tasks the tasks endpoint should return.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TaskFilter {
    #[default]
    All,
    Project(i64),
}

/// Endpoint set plus the pure build/parse halves of every call.
#[derive(Debug, Clone)]
pub struct RestApi {
    base_url: String,
    authorize_url: String,
    token_url: String,
}

impl Default for RestApi {
    fn default() -> Self {
        Self::new(DEFAULT_API_BASE_URL)
    }
}

impl RestApi {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            authorize_url: DEFAULT_AUTHORIZE_URL.to_string(),
            token_url: DEFAULT_TOKEN_URL.to_string(),
        }
    }

    pub fn with_oauth_urls(mut self, authorize_url: &str, token_url: &str) -> Self {
        self.authorize_url = authorize_url.to_string();
        self.token_url = token_url.to_string();
        self
    }

    pub fn authorization_url(&self, client_id: &str, state: &str) -> String {
        format!(
            "{}?client_id={}&scope={}&state={}",
            self.authorize_url,
            urlencoding::encode(client_id),
            READ_SCOPE,
            urlencoding::encode(state)
        )
    }

    pub fn build_list_projects(&self) -> HttpRequest {
        HttpRequest::get(format!("{}/projects", self.base_url))
    }

    pub fn build_list_tasks(&self, filter: TaskFilter) -> HttpRequest {
        let url = match filter {
            TaskFilter::All => format!("{}/tasks", self.base_url),
            TaskFilter::Project(project_id) => {
                format!("{}/tasks?project_id={project_id}", self.base_url)
            }
        };
        HttpRequest::get(url)
    }

    pub fn build_exchange_code(
        &self,
        client_id: &str,
        client_secret: &str,
        code: &str,
    ) -> HttpRequest {
        let body = [
            ("client_id", client_id),
            ("client_secret", client_secret),
            ("code", code),
        ]
        .iter()
        .map(|(k, v)| format!("{k}={}", urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&");

        HttpRequest {
            method: HttpMethod::Post,
            url: self.token_url.clone(),
            headers: vec![(
                "content-type".to_string(),
                "application/x-www-form-urlencoded".to_string(),
            )],
            body: Some(body),
        }
    }

    pub fn parse_list_projects(&self, response: HttpResponse) -> Result<Vec<Project>> {
        check_status("get projects", &response)?;
        decode("get projects", &response.body)
    }

    pub fn parse_list_tasks(&self, response: HttpResponse) -> Result<Vec<Task>> {
        check_status("get tasks", &response)?;
        decode("get tasks", &response.body)
    }

    pub fn parse_access_token(&self, response: HttpResponse) -> Result<AccessToken> {
        check_status("exchange code", &response)?;
        decode("exchange code", &response.body)
    }
}

/// Anything but 200 is a failure, 2xx included.
pub(crate) fn check_status(operation: &'static str, response: &HttpResponse) -> Result<()> {
    if response.status == 200 {
        return Ok(());
    }
    Err(ClientError::Api {
        operation,
        status: response.status,
        body: response.body_text(),
    })
}

pub(crate) fn decode<T: DeserializeOwned>(operation: &'static str, body: &[u8]) -> Result<T> {
    serde_json::from_slice(body).map_err(|source| ClientError::Decode { operation, source })
}
