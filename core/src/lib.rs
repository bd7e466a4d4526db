//! Async client for the Todoist REST API.
//!
//! # Overview
//! Lists projects and tasks on behalf of a user, authenticating every call
//! with a bearer token obtained through Todoist's OAuth flow.
//!
//! # Design
//! - [`RestApi`] builds `HttpRequest` values and parses `HttpResponse` values
//!   without touching the network, so hosts with their own HTTP stack can use
//!   it directly.
//! - [`Client`] executes those requests over reqwest with a bounded timeout
//!   and a caller-supplied cancellation token. One call, one round trip.
//! - Records are plain serde structs; the client keeps no cache.

pub mod api;
pub mod client;
pub mod error;
pub mod http;
pub mod types;

pub use api::{RestApi, TaskFilter};
pub use client::{AuthorizationRequest, Client, ClientBuilder, DEFAULT_TIMEOUT};
pub use error::{ClientError, Result, TransportKind};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use tokio_util::sync::CancellationToken;
pub use types::{AccessToken, DueObject, Project, Task};
