//! HTTP implementation of the remote todo collection

use crate::api::{ApiFuture, TodoApi};
use crate::config::ClientConfig;
use crate::error::{ApiError, ConfigError};
use crate::types::{Todo, TodoId};
use reqwest::{Client, Response, Url};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::Instrument;

/// Body of a create request
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct NewTodo<'a> {
    user_id: u64,
    title: &'a str,
    completed: bool,
}

/// Body of a completed-flag update
#[derive(Debug, Serialize)]
struct CompletedPatch {
    completed: bool,
}

/// Remote todo collection spoken to over JSON/HTTP
///
/// | Operation | Request |
/// |---|---|
/// | `list_all` | `GET {base}?_limit={page_limit}` |
/// | `create` | `POST {base}` with `{userId, title, completed: false}` |
/// | `set_completed` | `PATCH {base}/{id}` with `{completed}` |
/// | `remove` | `DELETE {base}/{id}` |
///
/// Any non-success status is an error, whatever the body says.
#[derive(Clone, Debug)]
pub struct HttpTodoApi {
    client: Client,
    base_url: Url,
    page_limit: u32,
    user_id: u64,
}

impl HttpTodoApi {
    /// Create a client for the configured collection
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the base URL is unusable or the HTTP client
    /// cannot be built.
    pub fn new(config: &ClientConfig) -> Result<Self, ConfigError> {
        let base_url = config.base_url()?;

        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| ConfigError::HttpClient(e.to_string()))?;

        Ok(Self {
            client,
            base_url,
            page_limit: config.page_limit,
            user_id: config.user_id,
        })
    }

    /// The collection endpoint
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn item_url(&self, id: &TodoId) -> Result<Url, ApiError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| ApiError::RequestFailed(format!("{} cannot carry item paths", self.base_url)))?
            .pop_if_empty()
            .push(id.as_str());
        Ok(url)
    }
}

/// Reject non-success responses before touching the body
fn check_status(response: Response) -> Result<Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        tracing::debug!(status = status.as_u16(), "Remote rejected request");
        Err(ApiError::Status {
            status: status.as_u16(),
        })
    }
}

async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    check_status(response)?
        .json::<T>()
        .await
        .map_err(|e| ApiError::ResponseParseFailed(e.to_string()))
}

fn request_failed(error: &reqwest::Error) -> ApiError {
    ApiError::RequestFailed(error.to_string())
}

impl TodoApi for HttpTodoApi {
    fn list_all(&self) -> ApiFuture<'_, Vec<Todo>> {
        let span = tracing::debug_span!("list_all", limit = self.page_limit);
        Box::pin(
            async move {
                let response = self
                    .client
                    .get(self.base_url.clone())
                    .query(&[("_limit", self.page_limit)])
                    .send()
                    .await
                    .map_err(|e| request_failed(&e))?;

                let todos: Vec<Todo> = read_json(response).await?;
                tracing::debug!(count = todos.len(), "Listed todos");
                Ok(todos)
            }
            .instrument(span),
        )
    }

    fn create(&self, title: String) -> ApiFuture<'_, Todo> {
        let span = tracing::debug_span!("create");
        Box::pin(
            async move {
                let body = NewTodo {
                    user_id: self.user_id,
                    title: &title,
                    completed: false,
                };
                let response = self
                    .client
                    .post(self.base_url.clone())
                    .json(&body)
                    .send()
                    .await
                    .map_err(|e| request_failed(&e))?;

                let todo: Todo = read_json(response).await?;
                tracing::debug!(id = %todo.id, "Created todo");
                Ok(todo)
            }
            .instrument(span),
        )
    }

    fn set_completed(&self, id: TodoId, completed: bool) -> ApiFuture<'_, Todo> {
        let span = tracing::debug_span!("set_completed", %id, completed);
        Box::pin(
            async move {
                let response = self
                    .client
                    .patch(self.item_url(&id)?)
                    .json(&CompletedPatch { completed })
                    .send()
                    .await
                    .map_err(|e| request_failed(&e))?;

                read_json(response).await
            }
            .instrument(span),
        )
    }

    fn remove(&self, id: TodoId) -> ApiFuture<'_, TodoId> {
        let span = tracing::debug_span!("remove", %id);
        Box::pin(
            async move {
                let response = self
                    .client
                    .delete(self.item_url(&id)?)
                    .send()
                    .await
                    .map_err(|e| request_failed(&e))?;

                // The body is ignored; the id comes from the request.
                check_status(response)?;
                Ok(id)
            }
            .instrument(span),
        )
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    fn api(base: &str) -> HttpTodoApi {
        HttpTodoApi::new(&ClientConfig::default().with_base_url(base).unwrap()).unwrap()
    }

    #[test]
    fn item_url_appends_id() {
        let api = api("https://example.com/todos");
        let url = api.item_url(&TodoId::from("42")).unwrap();
        assert_eq!(url.as_str(), "https://example.com/todos/42");
    }

    #[test]
    fn item_url_ignores_trailing_slash() {
        let api = api("https://example.com/todos/");
        let url = api.item_url(&TodoId::from("42")).unwrap();
        assert_eq!(url.as_str(), "https://example.com/todos/42");
    }

    #[test]
    fn item_url_escapes_opaque_ids() {
        let api = api("https://example.com/todos");
        let url = api.item_url(&TodoId::from("a/b c")).unwrap();
        assert_eq!(url.as_str(), "https://example.com/todos/a%2Fb%20c");
    }

    #[test]
    fn create_body_matches_wire_shape() {
        let body = NewTodo {
            user_id: 1,
            title: "Buy milk",
            completed: false,
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            serde_json::json!({"userId": 1, "title": "Buy milk", "completed": false})
        );
    }
}
