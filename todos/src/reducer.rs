//! Reducer logic for the todo list.
//!
//! Every intent marks the state as pending and returns one effect that calls
//! the remote collection. The effect always answers with exactly one
//! settlement for the same request, so no intent is left dangling.

use crate::api::TodoApi;
use crate::error::ApiError;
use crate::types::{Intent, NO_SUCH_TODO, RequestId, TodoAction, TodosState};
use std::future::Future;
use std::sync::Arc;
use tasklist_core::{SmallVec, effect::Effect, reducer::Reducer, smallvec};

/// Environment dependencies for the todo reducer
#[derive(Clone)]
pub struct TodoEnvironment {
    /// Remote collection the intents talk to
    pub api: Arc<dyn TodoApi>,
}

impl TodoEnvironment {
    /// Creates a new `TodoEnvironment`
    #[must_use]
    pub fn new(api: Arc<dyn TodoApi>) -> Self {
        Self { api }
    }
}

/// Reducer for the todo list
#[derive(Clone, Debug, Default)]
pub struct TodoReducer;

impl TodoReducer {
    /// Creates a new `TodoReducer`
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Run a remote call and turn its outcome into a settlement
    fn settle_with<T, F, S>(
        request: RequestId,
        intent: Intent,
        call: F,
        on_success: S,
    ) -> Effect<TodoAction>
    where
        F: Future<Output = Result<T, ApiError>> + Send + 'static,
        S: FnOnce(RequestId, T) -> TodoAction + Send + 'static,
    {
        Effect::future(async move {
            let settlement = match call.await {
                Ok(value) => on_success(request, value),
                Err(error) => {
                    tracing::warn!(%request, %intent, %error, "Remote call failed");
                    TodoAction::IntentFailed {
                        request,
                        intent,
                        error: intent.failure_message().to_string(),
                    }
                }
            };
            Some(settlement)
        })
    }
}

impl Reducer for TodoReducer {
    type State = TodosState;
    type Action = TodoAction;
    type Environment = TodoEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            // ========== Intents ==========
            TodoAction::FetchAll { request } => {
                state.begin();
                let api = Arc::clone(&env.api);
                smallvec![Self::settle_with(
                    request,
                    Intent::FetchAll,
                    async move { api.list_all().await },
                    |request, todos| TodoAction::Fetched { request, todos },
                )]
            }

            TodoAction::Create { request, title } => {
                state.begin();
                let api = Arc::clone(&env.api);
                smallvec![Self::settle_with(
                    request,
                    Intent::Create,
                    async move { api.create(title).await },
                    |request, todo| TodoAction::Created { request, todo },
                )]
            }

            TodoAction::ToggleComplete { request, id } => {
                state.begin();
                let Some(current) = state.get(&id) else {
                    tracing::debug!(%request, %id, "Toggle target not in list");
                    return smallvec![Effect::future(async move {
                        Some(TodoAction::IntentFailed {
                            request,
                            intent: Intent::ToggleComplete,
                            error: NO_SUCH_TODO.to_string(),
                        })
                    })];
                };

                let completed = !current.completed;
                let api = Arc::clone(&env.api);
                smallvec![Self::settle_with(
                    request,
                    Intent::ToggleComplete,
                    async move { api.set_completed(id, completed).await },
                    |request, todo| TodoAction::Toggled { request, todo },
                )]
            }

            TodoAction::Delete { request, id } => {
                state.begin();
                let api = Arc::clone(&env.api);
                smallvec![Self::settle_with(
                    request,
                    Intent::Delete,
                    async move { api.remove(id).await },
                    |request, id| TodoAction::Deleted { request, id },
                )]
            }

            // ========== Settlements ==========
            TodoAction::Fetched { todos, .. } => {
                state.items = todos;
                state.settle();
                SmallVec::new()
            }

            TodoAction::Created { todo, .. } => {
                state.items.push(todo);
                state.settle();
                SmallVec::new()
            }

            TodoAction::Toggled { todo, .. } => {
                // Flip in place; the item may have been deleted meanwhile.
                if let Some(item) = state.items.iter_mut().find(|t| t.id == todo.id) {
                    item.completed = !item.completed;
                }
                state.settle();
                SmallVec::new()
            }

            TodoAction::Deleted { id, .. } => {
                state.items.retain(|t| t.id != id);
                state.settle();
                SmallVec::new()
            }

            TodoAction::IntentFailed { error, .. } => {
                state.fail(error);
                SmallVec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use crate::memory::InMemoryTodoApi;
    use crate::types::{Todo, TodoId};
    use tasklist_testing::{ReducerTest, assertions, resolve_effects};

    fn env_with(api: InMemoryTodoApi) -> (TodoEnvironment, Arc<InMemoryTodoApi>) {
        let api = Arc::new(api);
        (TodoEnvironment::new(api.clone()), api)
    }

    fn test_env() -> TodoEnvironment {
        env_with(InMemoryTodoApi::new()).0
    }

    fn listed() -> TodosState {
        TodosState::with_items(vec![
            Todo::new("1", "A", false),
            Todo::new("2", "Buy milk", false),
        ])
    }

    #[test]
    fn intent_marks_pending_and_clears_error() {
        let mut given = TodosState::new();
        given.last_error = Some("Server Error!".to_string());

        ReducerTest::new(TodoReducer::new())
            .with_env(test_env())
            .given_state(given)
            .when_action(TodoAction::fetch_all())
            .then_state(|state| {
                assert!(state.pending);
                assert_eq!(state.in_flight, 1);
                assert_eq!(state.last_error, None);
                assert!(state.items.is_empty());
            })
            .then_effects(|effects| {
                assertions::assert_effects_count(effects, 1);
                assertions::assert_has_future_effect(effects);
            })
            .run();
    }

    #[test]
    fn fetched_replaces_items_wholesale() {
        let fetched = vec![Todo::new("1", "A", false)];
        let expected = fetched.clone();

        ReducerTest::new(TodoReducer::new())
            .with_env(test_env())
            .given_state(listed())
            .when_action(TodoAction::FetchAll {
                request: RequestId::new(),
            })
            .when_action(TodoAction::Fetched {
                request: RequestId::new(),
                todos: fetched,
            })
            .then_state(move |state| {
                assert_eq!(state.items, expected);
                assert!(!state.pending);
                assert_eq!(state.last_error, None);
            })
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn created_appends_to_end() {
        ReducerTest::new(TodoReducer::new())
            .with_env(test_env())
            .given_state(TodosState::with_items(vec![Todo::new("1", "A", false)]))
            .when_action(TodoAction::create("Buy milk"))
            .when_action(TodoAction::Created {
                request: RequestId::new(),
                todo: Todo::new("2", "Buy milk", false),
            })
            .then_state(|state| {
                assert_eq!(state.count(), 2);
                assert_eq!(state.items[1], Todo::new("2", "Buy milk", false));
                assert!(!state.pending);
            })
            .run();
    }

    #[test]
    fn toggled_flips_existing_item() {
        ReducerTest::new(TodoReducer::new())
            .with_env(test_env())
            .given_state(listed())
            .when_action(TodoAction::toggle_complete("1"))
            .when_action(TodoAction::Toggled {
                request: RequestId::new(),
                todo: Todo::new("1", "A", true),
            })
            .then_state(|state| {
                assert!(state.get(&TodoId::from("1")).unwrap().completed);
                assert!(!state.get(&TodoId::from("2")).unwrap().completed);
                assert!(!state.pending);
            })
            .run();
    }

    #[test]
    fn toggled_after_removal_is_ignored() {
        ReducerTest::new(TodoReducer::new())
            .with_env(test_env())
            .given_state(listed())
            .when_action(TodoAction::Toggled {
                request: RequestId::new(),
                todo: Todo::new("9", "Gone", true),
            })
            .then_state(|state| {
                assert_eq!(state.items, listed().items);
            })
            .run();
    }

    #[test]
    fn deleted_removes_matching_item_only() {
        ReducerTest::new(TodoReducer::new())
            .with_env(test_env())
            .given_state(listed())
            .when_action(TodoAction::delete("2"))
            .when_action(TodoAction::Deleted {
                request: RequestId::new(),
                id: TodoId::from("2"),
            })
            .then_state(|state| {
                assert_eq!(state.items, vec![Todo::new("1", "A", false)]);
                assert!(!state.pending);
            })
            .run();
    }

    #[test]
    fn failure_sets_error_and_keeps_items() {
        ReducerTest::new(TodoReducer::new())
            .with_env(test_env())
            .given_state(listed())
            .when_action(TodoAction::delete("1"))
            .when_action(TodoAction::IntentFailed {
                request: RequestId::new(),
                intent: Intent::Delete,
                error: "Something went wrong".to_string(),
            })
            .then_state(|state| {
                assert_eq!(state.items, listed().items);
                assert!(!state.pending);
                assert_eq!(state.last_error.as_deref(), Some("Something went wrong"));
            })
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[tokio::test]
    async fn toggle_unknown_id_fails_without_remote_call() {
        let (env, api) = env_with(InMemoryTodoApi::new());
        let mut state = listed();
        let intent = TodoAction::toggle_complete("404");
        let request = intent.request();

        let effects = TodoReducer::new().reduce(&mut state, intent, &env);
        let settlements = resolve_effects(effects).await;

        assert_eq!(
            settlements,
            vec![TodoAction::IntentFailed {
                request,
                intent: Intent::ToggleComplete,
                error: "No such todo in the list".to_string(),
            }]
        );
        assert_eq!(api.calls(), 0);
    }

    #[tokio::test]
    async fn toggle_sends_negated_flag() {
        let (env, api) = env_with(InMemoryTodoApi::with_todos(vec![Todo::new("1", "A", false)]));
        let mut state = TodosState::with_items(api.todos());

        let effects = TodoReducer::new().reduce(&mut state, TodoAction::toggle_complete("1"), &env);
        let settlements = resolve_effects(effects).await;

        assert!(matches!(
            settlements.as_slice(),
            [TodoAction::Toggled { todo, .. }] if todo.completed
        ));
        assert!(api.todos()[0].completed);
    }

    #[tokio::test]
    async fn remote_failure_maps_to_intent_message() {
        let (env, api) = env_with(InMemoryTodoApi::new());
        api.set_failing(true);
        let mut state = TodosState::new();

        let fetch = TodoReducer::new().reduce(&mut state, TodoAction::fetch_all(), &env);
        let create = TodoReducer::new().reduce(&mut state, TodoAction::create("A"), &env);
        let fetch_failed = resolve_effects(fetch).await;
        let create_failed = resolve_effects(create).await;

        assert!(matches!(
            fetch_failed.as_slice(),
            [TodoAction::IntentFailed { intent: Intent::FetchAll, error, .. }] if error == "Server Error!"
        ));
        assert!(matches!(
            create_failed.as_slice(),
            [TodoAction::IntentFailed { intent: Intent::Create, error, .. }] if error == "Something went wrong"
        ));
    }
}
