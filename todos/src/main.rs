//! Demo for the todo list store.
//!
//! Loads the remote collection the way the app does on mount, then prints
//! the list and the store status. Configure with `TASKLIST_*` environment
//! variables or a `.env` file.

use tasklist_todos::{ClientConfig, TodoStore};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // A missing .env file is fine
    let _ = dotenvy::dotenv();
    init_tracing();

    let config = ClientConfig::from_env()?;
    info!(base_url = %config.base_url, limit = config.page_limit, "Loading todos");

    let store = TodoStore::from_config(&config)?;
    match store.fetch_all().await {
        Ok(todos) => info!(count = todos.len(), "Fetched todos"),
        Err(e) => error!(error = %e, "Fetch failed"),
    }

    let state = store.snapshot().await;
    println!("=== Todos ===\n");
    for todo in &state.items {
        let status = if todo.completed { "✓" } else { " " };
        println!("  [{status}] {:>4}  {}", todo.id, todo.title);
    }
    println!(
        "\nCompleted: {}/{}",
        state.completed_count(),
        state.count()
    );
    if let Some(message) = &state.last_error {
        println!("Error: {message}");
    }

    Ok(())
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tasklist=info,tasklist_todos=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();
}
