//! In-memory remote collection.
//!
//! Behaves like the public collection the HTTP client targets: it assigns
//! sequential numeric ids, echoes deletes of unknown ids, and answers an
//! update of an unknown id with a 404. Useful for tests and offline demos.

use crate::api::{ApiFuture, TodoApi};
use crate::error::ApiError;
use crate::types::{Todo, TodoId};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

#[derive(Debug)]
struct Collection {
    todos: Vec<Todo>,
    next_id: u64,
}

/// A [`TodoApi`] backed by a local vector
#[derive(Debug)]
pub struct InMemoryTodoApi {
    collection: Mutex<Collection>,
    calls: AtomicUsize,
    failing: AtomicBool,
    latency: Option<Duration>,
}

impl InMemoryTodoApi {
    /// Create an empty collection
    #[must_use]
    pub fn new() -> Self {
        Self::with_todos(Vec::new())
    }

    /// Create a collection seeded with `todos`
    ///
    /// New ids continue after the number of seeded items.
    #[must_use]
    pub fn with_todos(todos: Vec<Todo>) -> Self {
        let next_id = todos.len() as u64 + 1;
        Self {
            collection: Mutex::new(Collection { todos, next_id }),
            calls: AtomicUsize::new(0),
            failing: AtomicBool::new(false),
            latency: None,
        }
    }

    /// Delay every call by `latency` before answering
    #[must_use]
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Make every subsequent call fail with a 500 status (or stop failing)
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Number of calls received so far
    #[must_use]
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Snapshot of the stored todos
    #[must_use]
    pub fn todos(&self) -> Vec<Todo> {
        self.lock().todos.clone()
    }

    fn lock(&self) -> MutexGuard<'_, Collection> {
        self.collection.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Count the call, apply latency, and short-circuit if failing
    async fn admit(&self) -> Result<(), ApiError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        if self.failing.load(Ordering::SeqCst) {
            return Err(ApiError::Status { status: 500 });
        }
        Ok(())
    }
}

impl Default for InMemoryTodoApi {
    fn default() -> Self {
        Self::new()
    }
}

impl TodoApi for InMemoryTodoApi {
    fn list_all(&self) -> ApiFuture<'_, Vec<Todo>> {
        Box::pin(async move {
            self.admit().await?;
            Ok(self.todos())
        })
    }

    fn create(&self, title: String) -> ApiFuture<'_, Todo> {
        Box::pin(async move {
            self.admit().await?;
            let mut collection = self.lock();
            let todo = Todo::new(collection.next_id.to_string(), title, false);
            collection.next_id += 1;
            collection.todos.push(todo.clone());
            Ok(todo)
        })
    }

    fn set_completed(&self, id: TodoId, completed: bool) -> ApiFuture<'_, Todo> {
        Box::pin(async move {
            self.admit().await?;
            let mut collection = self.lock();
            let todo = collection
                .todos
                .iter_mut()
                .find(|t| t.id == id)
                .ok_or(ApiError::Status { status: 404 })?;
            todo.completed = completed;
            Ok(todo.clone())
        })
    }

    fn remove(&self, id: TodoId) -> ApiFuture<'_, TodoId> {
        Box::pin(async move {
            self.admit().await?;
            self.lock().todos.retain(|t| t.id != id);
            Ok(id)
        })
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[tokio::test]
    async fn assigns_sequential_ids_after_seed() {
        let api = InMemoryTodoApi::with_todos(vec![Todo::new("1", "A", false)]);

        let created = api.create("B".to_string()).await.unwrap();

        assert_eq!(created, Todo::new("2", "B", false));
        assert_eq!(api.list_all().await.unwrap().len(), 2);
        assert_eq!(api.calls(), 2);
    }

    #[tokio::test]
    async fn default_collection_starts_ids_at_one() {
        let api = InMemoryTodoApi::default();

        let created = api.create("A".to_string()).await.unwrap();

        assert_eq!(created.id, TodoId::from("1"));
    }

    #[tokio::test]
    async fn update_of_unknown_id_is_not_found() {
        let api = InMemoryTodoApi::new();

        let result = api.set_completed(TodoId::from("9"), true).await;

        assert_eq!(result, Err(ApiError::Status { status: 404 }));
    }

    #[tokio::test]
    async fn delete_echoes_unknown_ids() {
        let api = InMemoryTodoApi::new();
        assert_eq!(
            api.remove(TodoId::from("9")).await.unwrap(),
            TodoId::from("9")
        );
    }

    #[tokio::test]
    async fn failing_mode_rejects_every_call() {
        let api = InMemoryTodoApi::with_todos(vec![Todo::new("1", "A", false)]);
        api.set_failing(true);

        assert_eq!(
            api.list_all().await,
            Err(ApiError::Status { status: 500 })
        );
        assert!(api.remove(TodoId::from("1")).await.is_err());
        assert_eq!(api.todos().len(), 1);
    }
}
