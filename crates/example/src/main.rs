//! Example todo CLI.
//!
//! Walks a [`Todo`] through create, update, list and delete while an
//! observation reports every change, then publishes a post for a [`User`].
//!
//! # Usage
//!
//! ```bash
//! RUST_LOG=info,gencrud_store=debug todos
//! ```

use example::{Todo, User};
use futures::StreamExt;
use gencrud_store::{CollectionChange, ExecutionContext, ObjectId, StoreError};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    if let Err(e) = run().await {
        tracing::error!("Error: {e}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), StoreError> {
    let mut changes = Todo::observe(ExecutionContext::current()).await?;
    let watcher = tokio::spawn(async move {
        while let Some(change) = changes.next().await {
            match change {
                CollectionChange::Initial(todos) => {
                    tracing::info!(count = todos.len(), "initial todos");
                }
                CollectionChange::Update {
                    results,
                    deletions,
                    insertions,
                    modifications,
                } => {
                    tracing::info!(
                        count = results.len(),
                        ?deletions,
                        ?insertions,
                        ?modifications,
                        "todos changed"
                    );
                    // Create, update and delete.
                    if !deletions.is_empty() {
                        break;
                    }
                }
                CollectionChange::Error(e) => {
                    tracing::warn!("observation failed: {e}");
                    break;
                }
            }
        }
    });

    let mut todo = Todo::create(
        ObjectId::generate(),
        "Sample name".into(),
        "Sample owner".into(),
        "Sample status".into(),
    )
    .await?;
    tracing::info!(id = %todo.id, "created todo");

    todo.update(None, Some("Updated name".into()), None, None)
        .await?;
    tracing::info!(name = %todo.name, "updated todo");

    let todos = Todo::list().await?;
    tracing::info!(todos = ?todos.as_slice(), "listed todos");

    todo.delete().await?;
    tracing::info!(id = %todo.id, "deleted todo");

    if watcher.await.is_err() {
        tracing::warn!("change watcher panicked");
    }

    let mut user = User::sign_up("ada", "Ada Lovelace").await?;
    let post = user.publish("Hello from gencrud").await?;
    tracing::info!(user = %user.user_id, post = %post.id, posts = user.posts.len(), "published");

    Ok(())
}
