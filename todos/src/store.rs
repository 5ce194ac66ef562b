//! Typed facade over the todo store.
//!
//! Presentation either dispatches actions and re-renders from
//! [`TodoStore::subscribe`], or awaits the intent methods, which return the
//! settlement of exactly the request they sent.

use crate::api::TodoApi;
use crate::client::HttpTodoApi;
use crate::config::ClientConfig;
use crate::error::{ConfigError, IntentError};
use crate::reducer::{TodoEnvironment, TodoReducer};
use crate::types::{Intent, Todo, TodoAction, TodoId, TodosState};
use std::sync::Arc;
use std::time::Duration;
use tasklist_runtime::{EffectHandle, Store};
use tokio::sync::watch;

/// How long intent methods wait for a settlement by default
pub const DEFAULT_SETTLE_TIMEOUT: Duration = Duration::from_secs(30);

/// The runtime store specialised to the todo list
pub type TodoRuntime = Store<TodosState, TodoAction, TodoEnvironment, TodoReducer>;

/// Session-long todo list store
///
/// Created once with empty items, `pending = false`, and no error; clones
/// share the same state.
#[derive(Clone)]
pub struct TodoStore {
    store: TodoRuntime,
    settle_timeout: Duration,
}

impl TodoStore {
    /// Create a store backed by `api`
    #[must_use]
    pub fn new(api: Arc<dyn TodoApi>) -> Self {
        Self {
            store: Store::new(
                TodosState::new(),
                TodoReducer::new(),
                TodoEnvironment::new(api),
            ),
            settle_timeout: DEFAULT_SETTLE_TIMEOUT,
        }
    }

    /// Create a store talking to the configured HTTP collection
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the HTTP client cannot be built.
    pub fn from_config(config: &ClientConfig) -> Result<Self, ConfigError> {
        Ok(Self::new(Arc::new(HttpTodoApi::new(config)?)))
    }

    /// Bound how long intent methods wait for their settlement
    #[must_use]
    pub fn with_settle_timeout(mut self, timeout: Duration) -> Self {
        self.settle_timeout = timeout;
        self
    }

    /// Dispatch an action without waiting for it to settle
    pub async fn dispatch(&self, action: TodoAction) -> EffectHandle {
        self.store.send(action).await
    }

    /// Replace the list with the remote collection
    ///
    /// # Errors
    ///
    /// [`IntentError::Rejected`] with "Server Error!" if the remote fails.
    pub async fn fetch_all(&self) -> Result<Vec<Todo>, IntentError> {
        match self.settle(TodoAction::fetch_all()).await? {
            TodoAction::Fetched { todos, .. } => Ok(todos),
            _ => Err(IntentError::UnexpectedSettlement(Intent::FetchAll)),
        }
    }

    /// Create a todo and append it to the list
    ///
    /// The title is sent as given; check it with
    /// [`non_blank_title`](crate::types::non_blank_title) first.
    ///
    /// # Errors
    ///
    /// [`IntentError::Rejected`] with "Something went wrong" if the remote fails.
    pub async fn create(&self, title: impl Into<String>) -> Result<Todo, IntentError> {
        match self.settle(TodoAction::create(title)).await? {
            TodoAction::Created { todo, .. } => Ok(todo),
            _ => Err(IntentError::UnexpectedSettlement(Intent::Create)),
        }
    }

    /// Flip the completed flag of a listed todo
    ///
    /// # Errors
    ///
    /// [`IntentError::Rejected`] with "No such todo in the list" if `id` is not
    /// listed, or "Something went wrong" if the remote fails.
    pub async fn toggle_complete(&self, id: &TodoId) -> Result<Todo, IntentError> {
        match self.settle(TodoAction::toggle_complete(id.clone())).await? {
            TodoAction::Toggled { todo, .. } => Ok(todo),
            _ => Err(IntentError::UnexpectedSettlement(Intent::ToggleComplete)),
        }
    }

    /// Delete a todo
    ///
    /// # Errors
    ///
    /// [`IntentError::Rejected`] with "Something went wrong" if the remote fails.
    pub async fn delete(&self, id: &TodoId) -> Result<TodoId, IntentError> {
        match self.settle(TodoAction::delete(id.clone())).await? {
            TodoAction::Deleted { id, .. } => Ok(id),
            _ => Err(IntentError::UnexpectedSettlement(Intent::Delete)),
        }
    }

    /// Read state via a closure
    pub async fn state<F, T>(&self, f: F) -> T
    where
        F: FnOnce(&TodosState) -> T,
    {
        self.store.state(f).await
    }

    /// Clone the current state
    pub async fn snapshot(&self) -> TodosState {
        self.store.state(Clone::clone).await
    }

    /// Observe state changes; re-read with [`TodoStore::state`] on each change
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.store.subscribe()
    }

    /// Send an intent and wait for its own settlement
    async fn settle(&self, intent: TodoAction) -> Result<TodoAction, IntentError> {
        let request = intent.request();
        let settlement = self
            .store
            .send_and_wait_for(intent, move |a| a.settles(request), self.settle_timeout)
            .await?;

        match settlement {
            TodoAction::IntentFailed { error, .. } => Err(IntentError::Rejected(error)),
            settled => Ok(settled),
        }
    }
}
