//! # Tasklist Testing
//!
//! Testing utilities and helpers for the tasklist architecture.
//!
//! This crate provides:
//! - [`ReducerTest`]: a Given-When-Then builder for exercising reducers
//! - [`assertions`]: helpers for inspecting returned effects
//! - [`resolve_effects`]: drives `Effect::Future` values to their actions
//!   without a store, so a test can feed them back by hand
//!
//! ## Example
//!
//! ```ignore
//! use tasklist_testing::{ReducerTest, assertions};
//!
//! ReducerTest::new(TodoReducer::new())
//!     .with_env(environment)
//!     .given_state(TodosState::new())
//!     .when_action(TodoAction::fetch_all())
//!     .then_state(|state| assert!(state.pending))
//!     .then_effects(assertions::assert_has_future_effect)
//!     .run();
//! ```


pub use reducer_test::{ReducerTest, assertions};

use tasklist_core::effect::Effect;

/// Await every effect in order and collect the actions they produce
///
/// `Effect::None` and futures that resolve to `None` contribute nothing.
pub async fn resolve_effects<A, I>(effects: I) -> Vec<A>
where
    I: IntoIterator<Item = Effect<A>>,
{
    let mut actions = Vec::new();
    for effect in effects {
        if let Effect::Future(fut) = effect {
            actions.extend(fut.await);
        }
    }
    actions
}
