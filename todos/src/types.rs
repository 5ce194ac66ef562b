//! Domain types for the todo list.
//!
//! Items are owned by the remote collection: the client never invents an id,
//! it only keeps the list the server handed back and the status of the
//! intents in flight.

use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

/// Message recorded when a toggle targets an item that is not in the list
pub const NO_SUCH_TODO: &str = "No such todo in the list";

/// Message recorded when reading the collection fails
pub const SERVER_ERROR: &str = "Server Error!";

/// Message recorded when a create, update, or delete fails
pub const WRITE_ERROR: &str = "Something went wrong";

/// Server-assigned identifier of a todo
///
/// The remote may serialize ids as strings or numbers; both are kept as an
/// opaque string key.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct TodoId(String);

impl TodoId {
    /// Creates a `TodoId` from its string form
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the id as a string slice
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl<'de> Deserialize<'de> for TodoId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Text(String),
            Number(serde_json::Number),
        }

        Ok(match RawId::deserialize(deserializer)? {
            RawId::Text(text) => Self(text),
            RawId::Number(number) => Self(number.to_string()),
        })
    }
}

impl From<&str> for TodoId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for TodoId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for TodoId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A single todo item as the remote collection represents it
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Todo {
    /// Server-assigned identifier
    pub id: TodoId,
    /// Title of the todo
    pub title: String,
    /// Whether the todo is completed
    pub completed: bool,
}

impl Todo {
    /// Creates a todo item
    #[must_use]
    pub fn new(id: impl Into<TodoId>, title: impl Into<String>, completed: bool) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            completed,
        }
    }
}

/// Returns the title if it has any non-whitespace content
///
/// Presentation runs this before dispatching a create; the store itself
/// accepts any title. The title is passed through untrimmed.
#[must_use]
pub fn non_blank_title(input: &str) -> Option<&str> {
    if input.trim().is_empty() {
        None
    } else {
        Some(input)
    }
}

/// Authoritative in-memory state of the todo list
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TodosState {
    /// Items in fetch/creation order
    pub items: Vec<Todo>,
    /// True while any intent is waiting on the remote
    pub pending: bool,
    /// Message of the most recent failure, cleared when a new intent starts
    pub last_error: Option<String>,
    /// Number of intents that have started but not settled
    pub in_flight: usize,
}

impl TodosState {
    /// Creates an empty, idle state
    #[must_use]
    pub const fn new() -> Self {
        Self {
            items: Vec::new(),
            pending: false,
            last_error: None,
            in_flight: 0,
        }
    }

    /// Creates an idle state holding `items`
    #[must_use]
    pub const fn with_items(items: Vec<Todo>) -> Self {
        Self {
            items,
            pending: false,
            last_error: None,
            in_flight: 0,
        }
    }

    /// Returns the number of todos
    #[must_use]
    pub fn count(&self) -> usize {
        self.items.len()
    }

    /// Returns the number of completed todos
    #[must_use]
    pub fn completed_count(&self) -> usize {
        self.items.iter().filter(|t| t.completed).count()
    }

    /// Returns a todo by ID
    #[must_use]
    pub fn get(&self, id: &TodoId) -> Option<&Todo> {
        self.items.iter().find(|t| &t.id == id)
    }

    /// Checks if a todo exists
    #[must_use]
    pub fn contains(&self, id: &TodoId) -> bool {
        self.get(id).is_some()
    }

    pub(crate) fn begin(&mut self) {
        self.in_flight += 1;
        self.pending = true;
        self.last_error = None;
    }

    pub(crate) fn settle(&mut self) {
        self.in_flight = self.in_flight.saturating_sub(1);
        self.pending = self.in_flight > 0;
    }

    pub(crate) fn fail(&mut self, message: String) {
        self.settle();
        self.last_error = Some(message);
    }
}

/// Correlates an intent with its settlement
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RequestId(Uuid);

impl RequestId {
    /// Creates a new random `RequestId`
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The four intents presentation can dispatch
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Intent {
    /// Load the whole collection
    FetchAll,
    /// Create a todo
    Create,
    /// Flip a todo's completed flag
    ToggleComplete,
    /// Delete a todo
    Delete,
}

impl Intent {
    /// Message recorded when this intent's remote call fails
    #[must_use]
    pub const fn failure_message(self) -> &'static str {
        match self {
            Self::FetchAll => SERVER_ERROR,
            Self::Create | Self::ToggleComplete | Self::Delete => WRITE_ERROR,
        }
    }
}

impl std::fmt::Display for Intent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::FetchAll => "fetch-all",
            Self::Create => "create",
            Self::ToggleComplete => "toggle-complete",
            Self::Delete => "delete",
        })
    }
}

/// Actions for the todo list: intents and their settlements
///
/// Every intent carries a [`RequestId`]; the effect it starts answers with
/// exactly one settlement carrying the same id.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TodoAction {
    // ========== Intents ==========
    /// Intent: replace the list with the remote collection
    FetchAll {
        /// Correlation id
        request: RequestId,
    },

    /// Intent: create a todo with the given title
    Create {
        /// Correlation id
        request: RequestId,
        /// Title of the new todo
        title: String,
    },

    /// Intent: flip the completed flag of a listed todo
    ToggleComplete {
        /// Correlation id
        request: RequestId,
        /// Todo to toggle
        id: TodoId,
    },

    /// Intent: delete a todo
    Delete {
        /// Correlation id
        request: RequestId,
        /// Todo to delete
        id: TodoId,
    },

    // ========== Settlements ==========
    /// Settlement: the collection was fetched
    Fetched {
        /// Correlation id
        request: RequestId,
        /// Items in server order
        todos: Vec<Todo>,
    },

    /// Settlement: the remote created a todo
    Created {
        /// Correlation id
        request: RequestId,
        /// The created todo, with its server-assigned id
        todo: Todo,
    },

    /// Settlement: the remote accepted a completed-flag update
    Toggled {
        /// Correlation id
        request: RequestId,
        /// The item as the remote returned it
        todo: Todo,
    },

    /// Settlement: the remote deleted a todo
    Deleted {
        /// Correlation id
        request: RequestId,
        /// Id of the deleted todo
        id: TodoId,
    },

    /// Settlement: the intent failed
    IntentFailed {
        /// Correlation id
        request: RequestId,
        /// Which intent failed
        intent: Intent,
        /// Message to surface as `last_error`
        error: String,
    },
}

impl TodoAction {
    /// Fetch-all intent with a fresh request id
    #[must_use]
    pub fn fetch_all() -> Self {
        Self::FetchAll {
            request: RequestId::new(),
        }
    }

    /// Create intent with a fresh request id
    #[must_use]
    pub fn create(title: impl Into<String>) -> Self {
        Self::Create {
            request: RequestId::new(),
            title: title.into(),
        }
    }

    /// Toggle-complete intent with a fresh request id
    #[must_use]
    pub fn toggle_complete(id: impl Into<TodoId>) -> Self {
        Self::ToggleComplete {
            request: RequestId::new(),
            id: id.into(),
        }
    }

    /// Delete intent with a fresh request id
    #[must_use]
    pub fn delete(id: impl Into<TodoId>) -> Self {
        Self::Delete {
            request: RequestId::new(),
            id: id.into(),
        }
    }

    /// Returns the correlation id
    #[must_use]
    pub const fn request(&self) -> RequestId {
        match self {
            Self::FetchAll { request }
            | Self::Create { request, .. }
            | Self::ToggleComplete { request, .. }
            | Self::Delete { request, .. }
            | Self::Fetched { request, .. }
            | Self::Created { request, .. }
            | Self::Toggled { request, .. }
            | Self::Deleted { request, .. }
            | Self::IntentFailed { request, .. } => *request,
        }
    }

    /// Returns `true` for settlements, `false` for intents
    #[must_use]
    pub const fn is_settlement(&self) -> bool {
        !matches!(
            self,
            Self::FetchAll { .. }
                | Self::Create { .. }
                | Self::ToggleComplete { .. }
                | Self::Delete { .. }
        )
    }

    /// Returns `true` if this action settles `request`
    #[must_use]
    pub fn settles(&self, request: RequestId) -> bool {
        self.is_settlement() && self.request() == request
    }
}
