//! Reducers for the to-do application.
//!
//! Each slice of [`AppState`] has its own pure reducer. [`root_reducer`]
//! scopes them onto their slice and runs them in sequence, so every action
//! is offered to every slice reducer.

use crate::types::{AppAction, AppState, Todo, VisibilityFilter};
use tidy_redux_core::composition::{BoxedReducer, CombinedReducer};
use tidy_redux_core::{combine_reducers, reducer_fn, scope_reducer};

/// Reducer for the item list
///
/// `AddTodo` appends a not yet completed item whose id is the current
/// length; the action's `completed` flag is not applied. `ToggleTodo` flips
/// the item at `index`; other items are kept as they are.
#[must_use]
pub fn todos_reducer(todos: &[Todo], action: &AppAction) -> Vec<Todo> {
    match action {
        AppAction::AddTodo { text, .. } => {
            let mut next = todos.to_vec();
            next.push(Todo::new(text.clone(), todos.len()));
            next
        },
        AppAction::ToggleTodo { index } => todos
            .iter()
            .enumerate()
            .map(|(i, todo)| if i == *index { todo.toggled() } else { todo.clone() })
            .collect(),
        _ => todos.to_vec(),
    }
}

/// Reducer for the visibility filter
#[must_use]
pub const fn visibility_filter_reducer(
    filter: &VisibilityFilter,
    action: &AppAction,
) -> VisibilityFilter {
    match action {
        AppAction::SetVisibilityFilter { filter: next } => *next,
        _ => *filter,
    }
}

/// Reducer for the last fetch error
///
/// A failed fetch records its message; the next added item clears it.
#[must_use]
pub fn error_reducer(last_error: &Option<String>, action: &AppAction) -> Option<String> {
    match action {
        AppAction::FetchFailed { text, error } => {
            Some(format!("could not fetch \"{text}\": {error}"))
        },
        AppAction::AddTodo { .. } => None,
        _ => last_error.clone(),
    }
}

fn todos_slice(state: &AppState) -> &Vec<Todo> {
    &state.todos
}

fn with_todos(state: &AppState, todos: Vec<Todo>) -> AppState {
    AppState {
        todos,
        ..state.clone()
    }
}

fn filter_slice(state: &AppState) -> &VisibilityFilter {
    &state.visibility_filter
}

fn with_filter(state: &AppState, visibility_filter: VisibilityFilter) -> AppState {
    AppState {
        visibility_filter,
        ..state.clone()
    }
}

fn error_slice(state: &AppState) -> &Option<String> {
    &state.last_error
}

fn with_error(state: &AppState, last_error: Option<String>) -> AppState {
    AppState {
        last_error,
        ..state.clone()
    }
}

/// The root reducer passed to the store
///
/// Delegates each slice of the state to its own reducer.
#[must_use]
pub fn root_reducer() -> CombinedReducer<AppState, AppAction> {
    let slices: Vec<BoxedReducer<AppState, AppAction>> = vec![
        Box::new(scope_reducer(
            reducer_fn(|todos: &Vec<Todo>, action: &AppAction| todos_reducer(todos, action)),
            todos_slice,
            with_todos,
        )),
        Box::new(scope_reducer(
            reducer_fn(visibility_filter_reducer),
            filter_slice,
            with_filter,
        )),
        Box::new(scope_reducer(reducer_fn(error_reducer), error_slice, with_error)),
    ];

    combine_reducers(slices)
}
