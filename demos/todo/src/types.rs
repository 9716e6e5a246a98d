//! Domain types for the to-do list.
//!
//! The whole application state is one immutable [`AppState`] snapshot. Every
//! dispatch produces a new snapshot; nothing here is mutated in place.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use tidy_redux_macros::Action;
use tidy_redux_runtime::ExecutionScope;

/// A single to-do item
///
/// `id` is the list length at creation time. Items are never deleted, so ids
/// stay unique.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Todo {
    /// What needs doing
    pub text: String,
    /// Whether the item is done
    #[serde(default)]
    pub completed: bool,
    /// Position-derived identifier
    pub id: usize,
}

impl Todo {
    /// Creates a new, not yet completed item
    #[must_use]
    pub fn new(text: impl Into<String>, id: usize) -> Self {
        Self {
            text: text.into(),
            completed: false,
            id,
        }
    }

    /// Same item with its completion flag flipped
    #[must_use]
    pub fn toggled(&self) -> Self {
        Self {
            completed: !self.completed,
            ..self.clone()
        }
    }
}

/// Which items the list shows
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VisibilityFilter {
    /// Every item
    #[default]
    ShowAll,
    /// Completed items only
    ShowCompleted,
    /// Items still to do
    ShowActive,
}

impl VisibilityFilter {
    /// Returns true if `todo` passes this filter
    #[must_use]
    pub const fn matches(self, todo: &Todo) -> bool {
        match self {
            Self::ShowAll => true,
            Self::ShowCompleted => todo.completed,
            Self::ShowActive => !todo.completed,
        }
    }
}

impl std::fmt::Display for VisibilityFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ShowAll => write!(f, "SHOW_ALL"),
            Self::ShowCompleted => write!(f, "SHOW_COMPLETED"),
            Self::ShowActive => write!(f, "SHOW_ACTIVE"),
        }
    }
}

/// State of the to-do application
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppState {
    /// All items, in creation order
    pub todos: Vec<Todo>,
    /// Active visibility filter
    pub visibility_filter: VisibilityFilter,
    /// Message of the last failed fetch, cleared by the next added item
    pub last_error: Option<String>,
}

impl AppState {
    /// Items passing the current visibility filter, in order
    ///
    /// Derived on every call, never stored.
    #[must_use]
    pub fn visible_todos(&self) -> Vec<&Todo> {
        self.todos
            .iter()
            .filter(|todo| self.visibility_filter.matches(todo))
            .collect()
    }

    /// Number of completed items
    #[must_use]
    pub fn completed_count(&self) -> usize {
        self.todos.iter().filter(|todo| todo.completed).count()
    }
}

/// Actions understood by the to-do store
///
/// The two `#[async_action]` variants never reach the reducer: the async
/// middleware turns them into network thunks.
#[derive(Action, Clone, Debug)]
pub enum AppAction {
    /// Append an item
    AddTodo {
        /// Item text
        text: String,
        /// Carried for the requester; new items always start incomplete
        completed: bool,
    },

    /// Flip the completion flag of the item at `index`
    ToggleTodo {
        /// Position in the list; out of range is a no-op
        index: usize,
    },

    /// Change which items are shown
    SetVisibilityFilter {
        /// New filter
        filter: VisibilityFilter,
    },

    /// Fetch an item remotely, bounded by the store's lifetime
    #[async_action]
    AddTodoAsyncWithStoreScope {
        /// Item text
        text: String,
        /// Initial completion flag
        completed: bool,
        /// Simulated network latency
        delay: Duration,
    },

    /// Fetch an item remotely, bounded by a caller-owned scope
    #[async_action]
    AddTodoAsyncWithSuppliedScope {
        /// Item text
        text: String,
        /// Initial completion flag
        completed: bool,
        /// Simulated network latency
        delay: Duration,
        /// Scope the fetch is cancelled with
        scope: ExecutionScope,
    },

    /// A remote fetch failed
    FetchFailed {
        /// Text of the item that could not be fetched
        text: String,
        /// Failure description
        error: String,
    },
}

impl AppAction {
    /// Shorthand for an [`AppAction::AddTodo`] that starts incomplete
    #[must_use]
    pub fn add(text: impl Into<String>) -> Self {
        Self::AddTodo {
            text: text.into(),
            completed: false,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use tidy_redux_core::action::ActionName;

    #[test]
    fn test_visible_todos_follow_filter() {
        let mut state = AppState {
            todos: vec![Todo::new("a", 0), Todo::new("b", 1).toggled()],
            ..AppState::default()
        };

        assert_eq!(state.visible_todos().len(), 2);

        state.visibility_filter = VisibilityFilter::ShowActive;
        assert_eq!(state.visible_todos(), vec![&state.todos[0]]);

        state.visibility_filter = VisibilityFilter::ShowCompleted;
        assert_eq!(state.visible_todos(), vec![&state.todos[1]]);
        assert_eq!(state.completed_count(), 1);
    }

    #[test]
    fn test_filter_serializes_screaming_case() {
        let json = serde_json::to_string(&VisibilityFilter::ShowCompleted).unwrap();
        assert_eq!(json, "\"SHOW_COMPLETED\"");
        assert_eq!(VisibilityFilter::ShowActive.to_string(), "SHOW_ACTIVE");

        let parsed: VisibilityFilter = serde_json::from_str("\"SHOW_ALL\"").unwrap();
        assert_eq!(parsed, VisibilityFilter::ShowAll);
    }

    #[test]
    fn test_todo_completed_defaults_to_false() {
        let todo: Todo = serde_json::from_str(r#"{"text":"milk","id":3}"#).unwrap();
        assert_eq!(todo, Todo::new("milk", 3));
    }

    #[test]
    fn test_async_variants_are_marked() {
        let fetch = AppAction::AddTodoAsyncWithStoreScope {
            text: "remote".to_string(),
            completed: false,
            delay: Duration::from_millis(10),
        };
        assert!(fetch.is_async());
        assert_eq!(fetch.action_name(), "AddTodoAsyncWithStoreScope");
        assert!(!AppAction::add("local").is_async());
    }
}
