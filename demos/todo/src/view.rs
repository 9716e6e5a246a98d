//! Text rendering of the to-do list.
//!
//! The view reads a state snapshot it is handed explicitly; it never reaches
//! for a global store.

use crate::types::AppState;
use std::fmt;

/// Display adapter listing the visible items of a snapshot
#[derive(Debug, Clone, Copy)]
pub struct TodoList<'a>(pub &'a AppState);

impl fmt::Display for TodoList<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.0;
        writeln!(
            f,
            "[{}] {}/{} done",
            state.visibility_filter,
            state.completed_count(),
            state.todos.len()
        )?;

        let visible = state.visible_todos();
        if visible.is_empty() {
            writeln!(f, "  Empty Todo list")?;
        }
        for todo in visible {
            let mark = if todo.completed { 'x' } else { ' ' };
            writeln!(f, "  {} [{mark}] {}", todo.id, todo.text)?;
        }

        if let Some(error) = &state.last_error {
            writeln!(f, "  ! {error}")?;
        }

        Ok(())
    }
}

/// Render the visible items, one per line
///
/// ```
/// use todo::types::{AppState, Todo};
///
/// let state = AppState {
///     todos: vec![Todo::new("Buy milk", 0)],
///     ..AppState::default()
/// };
/// assert_eq!(todo::view::render(&state), "[SHOW_ALL] 0/1 done\n  0 [ ] Buy milk\n");
/// ```
#[must_use]
pub fn render(state: &AppState) -> String {
    TodoList(state).to_string()
}

/// Serialize a snapshot as pretty JSON
///
/// # Errors
///
/// Returns error if serialization fails.
pub fn to_json(state: &AppState) -> serde_json::Result<String> {
    serde_json::to_string_pretty(state)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::types::{Todo, VisibilityFilter};

    #[test]
    fn test_render_empty_list() {
        assert_eq!(render(&AppState::default()), "[SHOW_ALL] 0/0 done\n  Empty Todo list\n");
    }

    #[test]
    fn test_render_respects_filter_and_error() {
        let state = AppState {
            todos: vec![Todo::new("a", 0), Todo::new("b", 1).toggled()],
            visibility_filter: VisibilityFilter::ShowCompleted,
            last_error: Some("offline".to_string()),
        };

        assert_eq!(
            render(&state),
            "[SHOW_COMPLETED] 1/2 done\n  1 [x] b\n  ! offline\n"
        );
    }

    #[test]
    fn test_todo_list_writes_into_a_formatter() {
        let state = AppState {
            todos: vec![Todo::new("a", 0)],
            ..AppState::default()
        };

        let framed = format!(">>\n{}<<", TodoList(&state));

        assert_eq!(framed, format!(">>\n{}<<", render(&state)));
        assert!(framed.contains("  0 [ ] a\n"));
    }

    #[test]
    fn test_json_snapshot() {
        let state = AppState {
            todos: vec![Todo::new("a", 0)],
            ..AppState::default()
        };

        let json = to_json(&state).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["visibility_filter"], "SHOW_ALL");
        assert_eq!(value["todos"][0]["text"], "a");
        assert!(value["last_error"].is_null());
    }
}
