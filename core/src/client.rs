//! Async Todoist client.
//!
//! # Design
//! `Client` pairs a [`RestApi`] (pure request building / response parsing)
//! with a reqwest transport. It is immutable after construction and cheap to
//! clone, so one instance can serve any number of concurrent callers. Each
//! call is exactly one HTTP round trip: no retries, no caching.
//!
//! Cancellation is cooperative. Every network call takes a
//! [`CancellationToken`]; when it fires, the in-flight request future is
//! dropped, which aborts the request and releases the connection.

use std::fmt;
use std::time::Duration;

use reqwest::header::{HeaderName, HeaderValue, AUTHORIZATION};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, warn};
use uuid::Uuid;

use crate::api::{
    decode, RestApi, TaskFilter, DEFAULT_API_BASE_URL, DEFAULT_AUTHORIZE_URL, DEFAULT_TOKEN_URL,
};
use crate::error::{ClientError, Result};
use crate::http::{HttpRequest, HttpResponse};
use crate::types::{AccessToken, Project, Task};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// An OAuth consent URL together with the state value embedded in it.
///
/// The caller must compare `state` with the one Todoist echoes back on the
/// redirect before exchanging the code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizationRequest {
    pub url: String,
    pub state: String,
}

/// Client for the Todoist REST API.
#[derive(Clone)]
pub struct Client {
    http: reqwest::Client,
    api: RestApi,
    client_id: String,
    client_secret: String,
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("api", &self.api)
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .finish()
    }
}

impl Client {
    /// Client with the production endpoints and a 5 second timeout.
    ///
    /// Fails with [`ClientError::Configuration`] if either credential is empty.
    pub fn new(client_id: &str, client_secret: &str) -> Result<Self> {
        Self::builder(client_id, client_secret).build()
    }

    pub fn builder(client_id: &str, client_secret: &str) -> ClientBuilder {
        ClientBuilder::new(client_id, client_secret)
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    pub fn api(&self) -> &RestApi {
        &self.api
    }

    /// OAuth consent URL carrying the given `state`. No network call.
    pub fn authorization_url(&self, state: &str) -> String {
        self.api.authorization_url(&self.client_id, state)
    }

    /// OAuth consent URL with a fresh random state.
    pub fn authorization_request(&self) -> AuthorizationRequest {
        let state = Uuid::new_v4().simple().to_string();
        AuthorizationRequest {
            url: self.authorization_url(&state),
            state,
        }
    }

    pub async fn get_projects(
        &self,
        ctx: &CancellationToken,
        access_token: &str,
    ) -> Result<Vec<Project>> {
        let request = self.api.build_list_projects();
        let body = self
            .do_request(ctx, "get projects", access_token, request)
            .await?;
        decode("get projects", &body)
    }

    pub async fn get_tasks(
        &self,
        ctx: &CancellationToken,
        access_token: &str,
    ) -> Result<Vec<Task>> {
        self.get_tasks_filtered(ctx, access_token, TaskFilter::All)
            .await
    }

    /// Tasks of one project. A project the token cannot see yields an empty
    /// list, same as a project without tasks.
    pub async fn get_tasks_by_project(
        &self,
        ctx: &CancellationToken,
        access_token: &str,
        project_id: i64,
    ) -> Result<Vec<Task>> {
        self.get_tasks_filtered(ctx, access_token, TaskFilter::Project(project_id))
            .await
    }

    pub async fn get_tasks_filtered(
        &self,
        ctx: &CancellationToken,
        access_token: &str,
        filter: TaskFilter,
    ) -> Result<Vec<Task>> {
        let request = self.api.build_list_tasks(filter);
        let body = self
            .do_request(ctx, "get tasks", access_token, request)
            .await?;
        decode("get tasks", &body)
    }

    /// Trade an authorization code from the OAuth redirect for an access token.
    pub async fn exchange_code(&self, ctx: &CancellationToken, code: &str) -> Result<AccessToken> {
        let request = self
            .api
            .build_exchange_code(&self.client_id, &self.client_secret, code);
        let response = self.send(ctx, "exchange code", None, request).await?;
        self.api.parse_access_token(response)
    }

    /// One authenticated call. Returns the body of a 200 response.
    pub(crate) async fn do_request(
        &self,
        ctx: &CancellationToken,
        operation: &'static str,
        access_token: &str,
        request: HttpRequest,
    ) -> Result<Vec<u8>> {
        let response = self.send(ctx, operation, Some(access_token), request).await?;
        Ok(response.body)
    }

    /// Round trip that only succeeds on 200. Any other status becomes
    /// [`ClientError::Api`] whether or not its body can be read.
    async fn send(
        &self,
        ctx: &CancellationToken,
        operation: &'static str,
        bearer: Option<&str>,
        request: HttpRequest,
    ) -> Result<HttpResponse> {
        if ctx.is_cancelled() {
            return Err(ClientError::cancelled(operation));
        }

        let request = self.to_reqwest(operation, bearer, request)?;
        let method = request.method().clone();
        let url = request.url().clone();
        debug!(operation, %method, %url, "sending HTTP request");

        let round_trip = async {
            let response = self.http.execute(request).await.map_err(|err| {
                error!(operation, %method, %url, error = %err, "HTTP request failed");
                ClientError::transport(operation, &err)
            })?;
            let status = response.status().as_u16();
            if status != 200 {
                warn!(operation, status, "unexpected HTTP status");
                let body = response.text().await.unwrap_or_default();
                return Err(ClientError::Api {
                    operation,
                    status,
                    body,
                });
            }
            let body = response
                .bytes()
                .await
                .map_err(|err| ClientError::BodyRead {
                    operation,
                    message: err.to_string(),
                })?;
            debug!(operation, status, bytes = body.len(), "received HTTP response");
            Ok::<_, ClientError>(HttpResponse::new(status, body.to_vec()))
        };

        tokio::select! {
            biased;
            _ = ctx.cancelled() => {
                debug!(operation, %url, "HTTP request cancelled");
                Err(ClientError::cancelled(operation))
            }
            result = round_trip => result,
        }
    }

    fn to_reqwest(
        &self,
        operation: &'static str,
        bearer: Option<&str>,
        request: HttpRequest,
    ) -> Result<reqwest::Request> {
        let build_error = |message: String| ClientError::RequestBuild { operation, message };

        let url = reqwest::Url::parse(&request.url)
            .map_err(|err| build_error(format!("invalid url {:?}: {err}", request.url)))?;

        let mut builder = self.http.request(request.method.into(), url);
        for (name, value) in &request.headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|err| build_error(format!("invalid header name {name:?}: {err}")))?;
            let value = HeaderValue::from_str(value)
                .map_err(|err| build_error(format!("invalid header value for {name}: {err}")))?;
            builder = builder.header(name, value);
        }
        if let Some(token) = bearer {
            let mut value = HeaderValue::from_str(&format!("Bearer {token}"))
                .map_err(|_| build_error("access token is not a valid header value".to_string()))?;
            value.set_sensitive(true);
            builder = builder.header(AUTHORIZATION, value);
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        builder.build().map_err(|err| build_error(err.to_string()))
    }
}

/// Builder for [`Client`].
#[derive(Debug)]
pub struct ClientBuilder {
    client_id: String,
    client_secret: String,
    timeout: Duration,
    api_base_url: String,
    authorize_url: String,
    token_url: String,
    user_agent: Option<String>,
}

impl ClientBuilder {
    fn new(client_id: &str, client_secret: &str) -> Self {
        Self {
            client_id: client_id.to_string(),
            client_secret: client_secret.to_string(),
            timeout: DEFAULT_TIMEOUT,
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            authorize_url: DEFAULT_AUTHORIZE_URL.to_string(),
            token_url: DEFAULT_TOKEN_URL.to_string(),
            user_agent: None,
        }
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Base of the REST endpoints, e.g. `http://127.0.0.1:3000/rest/v1`.
    pub fn api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }

    pub fn authorize_url(mut self, url: impl Into<String>) -> Self {
        self.authorize_url = url.into();
        self
    }

    pub fn token_url(mut self, url: impl Into<String>) -> Self {
        self.token_url = url.into();
        self
    }

    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    pub fn build(self) -> Result<Client> {
        if self.client_id.is_empty() {
            return Err(ClientError::Configuration("client id is empty".to_string()));
        }
        if self.client_secret.is_empty() {
            return Err(ClientError::Configuration(
                "client secret is empty".to_string(),
            ));
        }
        for (label, url) in [
            ("api base url", &self.api_base_url),
            ("authorize url", &self.authorize_url),
            ("token url", &self.token_url),
        ] {
            reqwest::Url::parse(url).map_err(|err| {
                ClientError::Configuration(format!("invalid {label} {url:?}: {err}"))
            })?;
        }

        let user_agent = self
            .user_agent
            .unwrap_or_else(|| concat!("todoist-core/", env!("CARGO_PKG_VERSION")).to_string());
        let http = reqwest::Client::builder()
            .timeout(self.timeout)
            .user_agent(user_agent)
            .build()
            .map_err(|err| ClientError::Configuration(format!("http client: {err}")))?;

        let api = RestApi::new(&self.api_base_url)
            .with_oauth_urls(&self.authorize_url, &self.token_url);

        Ok(Client {
            http,
            api,
            client_id: self.client_id,
            client_secret: self.client_secret,
        })
    }
}
