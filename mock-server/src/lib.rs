use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    routing::{get, post},
    Form, Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::debug;

pub const DEFAULT_TOKEN: &str = "test-token";

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Project {
    pub id: i64,
    pub name: String,
    pub color: i64,
    pub order: i64,
    pub comment_count: i64,
    pub shared: bool,
    pub favourite: bool,
    pub sync_id: i64,
    pub inbox_project: bool,
    pub url: String,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Due {
    pub string: String,
    pub date: String,
    pub recurring: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub datetime: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Task {
    pub id: i64,
    pub project_id: i64,
    pub section_id: Option<i64>,
    pub content: String,
    pub description: String,
    pub completed: bool,
    pub label_ids: Vec<i64>,
    pub parent_id: Option<i64>,
    pub order: i64,
    pub priority: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due: Option<Due>,
    pub url: String,
    pub comment_count: i64,
    pub assignee: Option<i64>,
}

/// Everything the mock knows about one account.
#[derive(Clone, Debug, Default)]
pub struct Store {
    pub projects: Vec<Project>,
    pub tasks: Vec<Task>,
}

impl Store {
    /// An inbox with two tasks and an empty work project.
    pub fn seeded() -> Self {
        let inbox = Project {
            id: 2187255141,
            name: "Inbox".to_string(),
            color: 48,
            inbox_project: true,
            url: "https://todoist.com/showProject?id=2187255141".to_string(),
            ..Project::default()
        };
        let work = Project {
            id: 2187255142,
            name: "Work".to_string(),
            color: 31,
            order: 1,
            favourite: true,
            url: "https://todoist.com/showProject?id=2187255142".to_string(),
            ..Project::default()
        };
        let tasks = vec![
            Task {
                id: 4701,
                project_id: inbox.id,
                content: "Buy milk".to_string(),
                priority: 1,
                due: Some(Due {
                    string: "Jan 1 2030 00:00".to_string(),
                    date: "2030-01-01".to_string(),
                    datetime: Some("2030-01-01T00:00:00Z".to_string()),
                    timezone: Some("UTC".to_string()),
                    ..Due::default()
                }),
                url: "https://todoist.com/showTask?id=4701".to_string(),
                ..Task::default()
            },
            Task {
                id: 4702,
                project_id: inbox.id,
                content: "Water the plants".to_string(),
                priority: 2,
                label_ids: vec![11],
                due: Some(Due {
                    string: "every day".to_string(),
                    date: "2030-01-02".to_string(),
                    recurring: true,
                    ..Due::default()
                }),
                url: "https://todoist.com/showTask?id=4702".to_string(),
                ..Task::default()
            },
        ];
        Self {
            projects: vec![inbox, work],
            tasks,
        }
    }
}

struct AppState {
    token: String,
    store: Store,
}

type Shared = Arc<AppState>;

#[derive(Deserialize)]
pub struct TaskQuery {
    pub project_id: Option<i64>,
}

#[derive(Deserialize)]
pub struct TokenRequest {
    pub client_id: String,
    pub client_secret: String,
    pub code: String,
}

#[derive(Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
}

/// Router with seeded data, accepting [`DEFAULT_TOKEN`].
pub fn app() -> Router {
    app_with(DEFAULT_TOKEN, Store::seeded())
}

pub fn app_with(token: &str, store: Store) -> Router {
    let state: Shared = Arc::new(AppState {
        token: token.to_string(),
        store,
    });
    Router::new()
        .route("/rest/v1/projects", get(list_projects))
        .route("/rest/v1/tasks", get(list_tasks))
        .route("/oauth/access_token", post(exchange_code))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn run_with(listener: TcpListener, router: Router) -> Result<(), std::io::Error> {
    axum::serve(listener, router).await
}

fn authorize(state: &AppState, headers: &HeaderMap) -> Result<(), StatusCode> {
    let expected = format!("Bearer {}", state.token);
    match headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok()) {
        Some(value) if value == expected => Ok(()),
        _ => Err(StatusCode::UNAUTHORIZED),
    }
}

async fn list_projects(
    State(state): State<Shared>,
    headers: HeaderMap,
) -> Result<Json<Vec<Project>>, StatusCode> {
    authorize(&state, &headers)?;
    Ok(Json(state.store.projects.clone()))
}

/// Unknown or foreign projects produce an empty list, not an error.
async fn list_tasks(
    State(state): State<Shared>,
    headers: HeaderMap,
    Query(query): Query<TaskQuery>,
) -> Result<Json<Vec<Task>>, StatusCode> {
    authorize(&state, &headers)?;
    let tasks: Vec<Task> = state
        .store
        .tasks
        .iter()
        .filter(|t| match query.project_id {
            Some(id) => t.project_id == id,
            None => true,
        })
        .cloned()
        .collect();
    debug!(project_id = ?query.project_id, count = tasks.len(), "listing tasks");
    Ok(Json(tasks))
}

async fn exchange_code(
    State(state): State<Shared>,
    Form(input): Form<TokenRequest>,
) -> Result<Json<TokenResponse>, StatusCode> {
    if input.client_id.is_empty() || input.client_secret.is_empty() || input.code.is_empty() {
        return Err(StatusCode::BAD_REQUEST);
    }
    Ok(Json(TokenResponse {
        access_token: state.token.clone(),
        token_type: "Bearer".to_string(),
    }))
}
