//! Remote-backed todo list built on the tasklist runtime.
//!
//! The list lives in a [`TodoStore`]. Presentation dispatches four intents
//! (fetch-all, create, toggle-complete, delete); each one marks the state as
//! pending, calls the remote collection through [`TodoApi`], and settles as
//! either an applied change or a `last_error` message.
//!
//! # Quick Start
//!
//! ```no_run
//! use tasklist_todos::{ClientConfig, TodoStore};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = TodoStore::from_config(&ClientConfig::from_env()?)?;
//!
//! let todos = store.fetch_all().await?;
//! let created = store.create("Buy milk").await?;
//! store.toggle_complete(&created.id).await?;
//!
//! let state = store.snapshot().await;
//! println!("{} todos, {} done", state.count(), state.completed_count());
//! # let _ = todos;
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod client;
pub mod config;
pub mod error;
pub mod memory;
pub mod reducer;
pub mod store;
pub mod types;

// Re-export commonly used types
pub use api::TodoApi;
pub use client::HttpTodoApi;
pub use config::ClientConfig;
pub use error::{ApiError, ConfigError, IntentError};
pub use memory::InMemoryTodoApi;
pub use reducer::{TodoEnvironment, TodoReducer};
pub use store::TodoStore;
pub use types::{Intent, RequestId, Todo, TodoAction, TodoId, TodosState, non_blank_title};
