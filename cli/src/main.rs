mod report;

use std::io::{self, Write};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use todoist_core::{CancellationToken, Client};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// Print Todoist projects and upcoming tasks.
///
/// Examples:
///   todoist                          # inbox tasks with minutes until due
///   todoist tasks --project-id 42    # tasks of one project
///   todoist auth-url                 # OAuth consent URL with a fresh state
#[derive(Debug, Parser)]
#[command(name = "todoist")]
#[command(version)]
#[command(about = "Print Todoist projects and upcoming tasks")]
struct Cli {
    /// OAuth application client id.
    #[arg(long, env = "TODOIST_CLIENT_ID")]
    client_id: String,

    /// OAuth application client secret.
    #[arg(long, env = "TODOIST_CLIENT_SECRET", hide_env_values = true)]
    client_secret: String,

    /// Bearer token for the account to read.
    #[arg(long, env = "TODOIST_ACCESS_TOKEN", hide_env_values = true)]
    access_token: Option<String>,

    /// Override the REST base URL, e.g. to point at the mock server.
    #[arg(long, env = "TODOIST_API_BASE_URL", value_name = "URL")]
    api_base_url: Option<String>,

    /// Per-request timeout.
    #[arg(long, env = "TODOIST_TIMEOUT_SECS", default_value_t = 5, value_name = "SECS")]
    timeout_secs: u64,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Find the inbox project and show minutes until each timed task is due.
    Inbox,
    /// List projects.
    Projects,
    /// List tasks, optionally of one project.
    Tasks {
        #[arg(long)]
        project_id: Option<i64>,
    },
    /// Print an OAuth authorization URL and the state to verify on redirect.
    AuthUrl,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    let mut builder = Client::builder(&cli.client_id, &cli.client_secret)
        .timeout(Duration::from_secs(cli.timeout_secs));
    if let Some(url) = &cli.api_base_url {
        builder = builder.api_base_url(url.as_str());
    }
    let client = builder.build().context("failed to create client")?;

    let ctx = CancellationToken::new();
    let on_interrupt = ctx.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("interrupted, cancelling request");
            on_interrupt.cancel();
        }
    });

    let mut out = io::stdout().lock();
    match cli.command.unwrap_or(Command::Inbox) {
        Command::AuthUrl => {
            let request = client.authorization_request();
            writeln!(out, "{}", request.url)?;
            writeln!(out, "state: {}", request.state)?;
        }
        Command::Inbox => {
            let token = require_token(cli.access_token.as_deref())?;
            inbox(&client, &ctx, token, &mut out).await?;
        }
        Command::Projects => {
            let token = require_token(cli.access_token.as_deref())?;
            let projects = client
                .get_projects(&ctx, token)
                .await
                .context("couldn't get projects")?;
            report::write_projects(&mut out, &projects)?;
        }
        Command::Tasks { project_id } => {
            let token = require_token(cli.access_token.as_deref())?;
            let tasks = match project_id {
                Some(id) => client.get_tasks_by_project(&ctx, token, id).await,
                None => client.get_tasks(&ctx, token).await,
            }
            .context("couldn't get tasks")?;
            report::write_tasks(&mut out, &tasks)?;
        }
    }

    out.flush()?;
    Ok(())
}

fn require_token(token: Option<&str>) -> Result<&str> {
    token.context("an access token is required (--access-token or TODOIST_ACCESS_TOKEN)")
}

async fn inbox(
    client: &Client,
    ctx: &CancellationToken,
    token: &str,
    out: &mut impl Write,
) -> Result<()> {
    let projects = client
        .get_projects(ctx, token)
        .await
        .context("couldn't get projects")?;
    report::write_projects(out, &projects)?;
    writeln!(out)?;

    let inbox = report::find_inbox(&projects).context("inbox project not found")?;
    debug!(project_id = inbox.id, "found inbox project");

    let tasks = client
        .get_tasks_by_project(ctx, token, inbox.id)
        .await
        .context("couldn't get tasks")?;
    report::write_upcoming(out, &tasks, chrono::Utc::now())?;
    Ok(())
}
