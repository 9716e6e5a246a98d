//! Network thunks fetching to-do items.
//!
//! Each thunk spawns one fetch into an execution scope and returns its task
//! handle. When the fetch ends the result is dispatched as a plain action:
//! `AddTodo` on success, `FetchFailed` otherwise. If the scope is cancelled
//! first, nothing is dispatched.

use crate::repo::AppRepo;
use crate::types::{AppAction, AppState};
use std::sync::Arc;
use std::time::Duration;
use tidy_redux_runtime::{DispatchResult, Dispatched, ExecutionScope, Thunk, ThunkContext};

/// Dependencies handed to every thunk as the extra argument
#[derive(Clone)]
pub struct TodoEnvironment {
    /// Remote item source
    pub repo: Arc<dyn AppRepo>,
}

impl TodoEnvironment {
    /// Creates a new environment
    #[must_use]
    pub fn new(repo: Arc<dyn AppRepo>) -> Self {
        Self { repo }
    }
}

impl std::fmt::Debug for TodoEnvironment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TodoEnvironment").finish_non_exhaustive()
    }
}

/// Thunk type of the to-do store
pub type AppThunk = Thunk<AppState, AppAction, TodoEnvironment>;

type AppThunkContext = ThunkContext<AppState, AppAction, TodoEnvironment>;

/// Fetch an item in the store-lifetime scope
///
/// The fetch keeps running until it completes or the store shuts down.
#[must_use]
pub fn fetch_todo_in_store_scope(text: String, completed: bool, delay: Duration) -> AppThunk {
    Thunk::new("fetch_todo_in_store_scope", move |ctx| {
        let scope = ctx.store_scope()?;
        spawn_fetch(ctx, &scope, text, completed, delay)
    })
}

/// Fetch an item in a caller-owned scope
///
/// Cancelling `scope`, or dropping every handle to it, drops the pending
/// dispatch.
#[must_use]
pub fn fetch_todo_in_scope(
    scope: ExecutionScope,
    text: String,
    completed: bool,
    delay: Duration,
) -> AppThunk {
    Thunk::new("fetch_todo_in_scope", move |ctx| {
        spawn_fetch(ctx, &scope, text, completed, delay)
    })
}

/// The fetch thunk for an async request
///
/// # Errors
///
/// Gives the action back if it is not an async request.
pub fn fetch_for(request: AppAction) -> Result<AppThunk, AppAction> {
    match request {
        AppAction::AddTodoAsyncWithStoreScope {
            text,
            completed,
            delay,
        } => Ok(fetch_todo_in_store_scope(text, completed, delay)),
        AppAction::AddTodoAsyncWithSuppliedScope {
            text,
            completed,
            delay,
            scope,
        } => Ok(fetch_todo_in_scope(scope, text, completed, delay)),
        other => Err(other),
    }
}

fn spawn_fetch(
    ctx: AppThunkContext,
    scope: &ExecutionScope,
    text: String,
    completed: bool,
    delay: Duration,
) -> DispatchResult<AppAction> {
    let (dispatcher, env) = ctx.into_parts();
    let scope_name = scope.name().to_string();

    let task = scope.spawn(async move {
        let action = match env.repo.get_todo(delay).await {
            Ok(true) => AppAction::AddTodo { text, completed },
            Ok(false) => AppAction::FetchFailed {
                text,
                error: "item not available".to_string(),
            },
            Err(error) => AppAction::FetchFailed {
                text,
                error: error.to_string(),
            },
        };

        if let Err(error) = dispatcher.dispatch(action) {
            tracing::warn!(scope = %scope_name, %error, "Could not deliver fetch result");
        }
    })?;

    tracing::debug!(scope = scope.name(), "Fetch scheduled");
    Ok(Dispatched::Task(task))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_for_maps_each_async_request() {
        let store_scope = fetch_for(AppAction::AddTodoAsyncWithStoreScope {
            text: "a".to_string(),
            completed: false,
            delay: Duration::ZERO,
        });
        let supplied = fetch_for(AppAction::AddTodoAsyncWithSuppliedScope {
            text: "b".to_string(),
            completed: false,
            delay: Duration::ZERO,
            scope: ExecutionScope::new("screen"),
        });

        assert!(matches!(store_scope, Ok(thunk) if thunk.name() == "fetch_todo_in_store_scope"));
        assert!(matches!(supplied, Ok(thunk) if thunk.name() == "fetch_todo_in_scope"));
    }

    #[test]
    fn test_fetch_for_returns_plain_actions() {
        let result = fetch_for(AppAction::ToggleTodo { index: 2 });

        assert!(matches!(result, Err(AppAction::ToggleTodo { index: 2 })));
    }
}
