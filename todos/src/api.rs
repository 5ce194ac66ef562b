//! Remote collection abstraction.
//!
//! The reducer only ever talks to the remote through [`TodoApi`], so the
//! HTTP client and the in-memory collection are interchangeable.
//!
//! # Dyn Compatibility
//!
//! Methods return `Pin<Box<dyn Future>>` instead of using `async fn` so the
//! environment can hold an `Arc<dyn TodoApi>` and effects can capture it.

use crate::error::ApiError;
use crate::types::{Todo, TodoId};
use std::future::Future;
use std::pin::Pin;

/// Boxed future returned by [`TodoApi`] methods
pub type ApiFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, ApiError>> + Send + 'a>>;

/// The four operations of the remote todo collection
pub trait TodoApi: Send + Sync {
    /// Lists the collection, one bounded page, in server order
    ///
    /// # Errors
    ///
    /// Any transport failure, non-success status, or undecodable body.
    fn list_all(&self) -> ApiFuture<'_, Vec<Todo>>;

    /// Creates a todo; the remote assigns its id
    ///
    /// # Errors
    ///
    /// Any transport failure, non-success status, or undecodable body.
    fn create(&self, title: String) -> ApiFuture<'_, Todo>;

    /// Sets the completed flag of a todo
    ///
    /// # Errors
    ///
    /// Any transport failure, non-success status, or undecodable body.
    fn set_completed(&self, id: TodoId, completed: bool) -> ApiFuture<'_, Todo>;

    /// Deletes a todo, echoing the id on success
    ///
    /// # Errors
    ///
    /// Any transport failure or non-success status.
    fn remove(&self, id: TodoId) -> ApiFuture<'_, TodoId>;
}
