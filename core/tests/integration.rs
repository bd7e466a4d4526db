//! End-to-end run against the in-repo mock server.
//!
//! # Design
//! Starts the mock server on a random port, then exercises every client
//! operation over real HTTP. Catches schema drift between the mock's wire
//! types and the client's records.

use std::net::SocketAddr;

use mock_server::{Due, Project, Store, Task};
use todoist_core::{CancellationToken, Client, ClientError};

const TOKEN: &str = "integration-token";

/// Serve `store` on a random local port from a background thread.
fn spawn_server(store: Store) -> SocketAddr {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::run_with(listener, mock_server::app_with(TOKEN, store)).await
        })
        .unwrap();
    });

    addr
}

fn client(addr: SocketAddr) -> Client {
    Client::builder("clientID", "clientSecret")
        .api_base_url(format!("http://{addr}/rest/v1"))
        .token_url(format!("http://{addr}/oauth/access_token"))
        .build()
        .unwrap()
}

#[tokio::test]
async fn inbox_walkthrough() {
    // Step 1: an account with one inbox project and one timed task.
    let store = Store {
        projects: vec![Project {
            id: 1,
            name: "Inbox".to_string(),
            inbox_project: true,
            ..Project::default()
        }],
        tasks: vec![Task {
            id: 5,
            project_id: 1,
            content: "Buy milk".to_string(),
            due: Some(Due {
                datetime: Some("2030-01-01T00:00:00Z".to_string()),
                ..Due::default()
            }),
            ..Task::default()
        }],
    };
    let client = client(spawn_server(store));
    let ctx = CancellationToken::new();

    // Step 2: projects.
    let projects = client.get_projects(&ctx, TOKEN).await.unwrap();
    assert_eq!(projects.len(), 1);
    assert!(projects[0].inbox_project);
    let inbox = projects.iter().find(|p| p.inbox_project).unwrap();

    // Step 3: tasks of the inbox.
    let tasks = client.get_tasks_by_project(&ctx, TOKEN, inbox.id).await.unwrap();
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].content, "Buy milk");
    let due = tasks[0].due.parse_datetime().unwrap().unwrap();
    assert_eq!(due.timestamp(), 1_893_456_000);

    // Step 4: a project the account cannot see is just empty.
    let tasks = client.get_tasks_by_project(&ctx, TOKEN, 42).await.unwrap();
    assert!(tasks.is_empty());
}

#[tokio::test]
async fn seeded_account_round_trip() {
    let client = client(spawn_server(Store::seeded()));
    let ctx = CancellationToken::new();

    let projects = client.get_projects(&ctx, TOKEN).await.unwrap();
    assert_eq!(projects.len(), 2);
    assert!(projects[1].favorite);

    let tasks = client.get_tasks(&ctx, TOKEN).await.unwrap();
    assert_eq!(tasks.len(), 2);
    assert!(tasks[0].has_due_time());
    assert!(!tasks[1].has_due_time());
    assert!(tasks[1].due.recurring);
    assert_eq!(tasks[1].label_ids, vec![11]);
    assert_eq!(tasks[1].assignee, 0);
}

#[tokio::test]
async fn wrong_token_is_401() {
    let client = client(spawn_server(Store::seeded()));

    let err = client
        .get_projects(&CancellationToken::new(), "not-the-token")
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Api { status: 401, .. }));
}

#[tokio::test]
async fn exchange_code_then_fetch() {
    let client = client(spawn_server(Store::seeded()));
    let ctx = CancellationToken::new();

    let token = client.exchange_code(&ctx, "auth-code").await.unwrap();
    assert_eq!(token.access_token, TOKEN);

    let tasks = client.get_tasks(&ctx, &token.access_token).await.unwrap();
    assert_eq!(tasks.len(), 2);
}
